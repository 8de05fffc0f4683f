/// Property-based tests for resolution invariants
///
/// These verify singleton identity, keyed lookup and default selection for
/// arbitrary registration sets.

use proptest::prelude::*;
use wireup::{Constructor, Container, CustomArguments, Injectable};
use std::collections::BTreeSet;
use std::sync::Arc;

#[derive(Debug)]
struct Tagged {
    tag: String,
}

impl Injectable for Tagged {
    fn constructors() -> Vec<Constructor<Self>> {
        vec![Constructor::new(|args| Ok(Tagged { tag: args.value()? })).param::<String>("tag")]
    }
}

fn tagged(tag: impl Into<String>) -> CustomArguments {
    CustomArguments::new().with("tag", tag.into())
}

proptest! {
    #[test]
    fn singleton_identity_across_the_tree(depth in 0usize..5, resolutions in 1usize..10) {
        let root = Container::new();
        root.configure(|c| {
            c.add::<Tagged>().as_singleton().with_custom_constructor(tagged("shared"));
        }).unwrap();

        let mut scope = root.clone();
        for _ in 0..depth {
            scope = scope.create_child();
        }

        let first = root.resolve::<Tagged>().unwrap();
        for _ in 0..resolutions {
            let again = scope.resolve::<Tagged>().unwrap();
            prop_assert!(Arc::ptr_eq(&first, &again));
        }
    }
}

proptest! {
    #[test]
    fn transients_are_always_fresh(resolutions in 2usize..10) {
        let container = Container::new();
        container.configure(|c| {
            c.add::<Tagged>().with_custom_constructor(tagged("fresh"));
        }).unwrap();

        let instances: Vec<_> = (0..resolutions)
            .map(|_| container.resolve::<Tagged>().unwrap())
            .collect();
        for (i, a) in instances.iter().enumerate() {
            for b in &instances[i + 1..] {
                prop_assert!(!Arc::ptr_eq(a, b));
            }
        }
    }
}

proptest! {
    #[test]
    fn keyed_lookup_returns_matching_registration(
        keys in prop::collection::btree_set("[a-z]{1,8}", 1..6)
    ) {
        let keys: BTreeSet<String> = keys;
        let container = Container::new();
        container.configure(|c| {
            for key in &keys {
                c.add_keyed::<Tagged>(key.clone()).with_custom_constructor(tagged(key.clone()));
            }
        }).unwrap();

        for key in &keys {
            let resolved = container.resolve_keyed::<Tagged>(key).unwrap();
            prop_assert_eq!(&resolved.tag, key);
            prop_assert!(container.contains_key(key));
        }
    }
}

proptest! {
    #[test]
    fn default_wins_regardless_of_position(
        (count, default_at) in (2usize..8).prop_flat_map(|n| (Just(n), 0..n))
    ) {
        let container = Container::new();
        container.configure(|c| {
            for i in 0..count {
                if i == default_at {
                    c.add_default::<Tagged, Tagged>().with_custom_constructor(tagged(i.to_string()));
                } else {
                    c.add::<Tagged>().with_custom_constructor(tagged(i.to_string()));
                }
            }
        }).unwrap();

        let resolved = container.resolve::<Tagged>().unwrap();
        prop_assert_eq!(resolved.tag.clone(), default_at.to_string());

        let all: Vec<String> = container
            .resolve_all::<Tagged>()
            .unwrap()
            .iter()
            .map(|t| t.tag.clone())
            .collect();
        let expected: Vec<String> = (0..count).map(|i| i.to_string()).collect();
        prop_assert_eq!(all, expected);
    }
}

proptest! {
    #[test]
    fn child_shadows_only_what_it_registers(child_registers in any::<bool>()) {
        let root = Container::new();
        root.configure(|c| {
            c.add::<Tagged>().with_custom_constructor(tagged("root"));
        }).unwrap();

        let child = root.create_child();
        if child_registers {
            child.configure(|c| {
                c.add::<Tagged>().with_custom_constructor(tagged("child"));
            }).unwrap();
        }

        let expected = if child_registers { "child" } else { "root" };
        let from_child = child.resolve::<Tagged>().unwrap();
        let from_root = root.resolve::<Tagged>().unwrap();
        prop_assert_eq!(from_child.tag.as_str(), expected);
        prop_assert_eq!(from_root.tag.as_str(), "root");
    }
}
