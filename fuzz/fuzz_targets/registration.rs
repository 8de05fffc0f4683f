#![no_main]

use libfuzzer_sys::fuzz_target;
use wireup::{implements, Constructor, Container, CustomArguments, DiError, Injectable};

trait Shape: Send + Sync {
    fn id(&self) -> u8;
}

struct Block {
    id: u8,
}

impl Shape for Block {
    fn id(&self) -> u8 {
        self.id
    }
}

impl Injectable for Block {
    fn constructors() -> Vec<Constructor<Self>> {
        vec![Constructor::new(|args| Ok(Block { id: args.value()? })).param::<u8>("id")]
    }
}

implements!(Block => dyn Shape);

// Each byte is one registration: low bits pick key and lifetime, bit 7 asks
// for a default.
fuzz_target!(|data: &[u8]| {
    let container = Container::new();
    let mut expected = Vec::new();
    let mut default = None;
    let mut duplicate_default = false;

    let result = container.configure(|c| {
        for (i, byte) in data.iter().take(64).enumerate() {
            let id = i as u8;
            let key = format!("k{}", byte & 0x3);
            let args = CustomArguments::new().with("id", id);
            if byte & 0x80 != 0 {
                if default.is_some() {
                    duplicate_default = true;
                } else {
                    default = Some(id);
                }
                c.add_default::<dyn Shape, Block>().with_custom_constructor(args);
            } else if byte & 0x4 != 0 {
                c.add_using_keyed::<dyn Shape, Block>(key).with_custom_constructor(args);
            } else {
                let registration = c.add_using::<dyn Shape, Block>().with_custom_constructor(args);
                if byte & 0x8 != 0 {
                    registration.as_singleton();
                }
            }
            expected.push(id);
        }
    });

    if duplicate_default {
        assert!(matches!(result, Err(DiError::Configuration(_))));
        assert!(!container.contains::<dyn Shape>());
        return;
    }
    assert!(result.is_ok());

    let all: Vec<u8> = container
        .resolve_all::<dyn Shape>()
        .unwrap()
        .iter()
        .map(|s| s.id())
        .collect();
    assert_eq!(all, expected);

    match (default, expected.first()) {
        (Some(id), _) => assert_eq!(container.resolve::<dyn Shape>().unwrap().id(), id),
        (None, Some(first)) => assert_eq!(container.resolve::<dyn Shape>().unwrap().id(), *first),
        (None, None) => assert!(container.resolve::<dyn Shape>().is_err()),
    }
});
