use wireup::{implements, Constructor, Container, DiError, Injectable, Lazy};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

trait Plugin: Send + Sync {
    fn id(&self) -> u32;
}

#[derive(Default)]
struct Alpha;
impl Plugin for Alpha {
    fn id(&self) -> u32 {
        1
    }
}
impl Injectable for Alpha {
    fn constructors() -> Vec<Constructor<Self>> {
        vec![Constructor::from_default()]
    }
}

#[derive(Default)]
struct Beta;
impl Plugin for Beta {
    fn id(&self) -> u32 {
        2
    }
}
impl Injectable for Beta {
    fn constructors() -> Vec<Constructor<Self>> {
        vec![Constructor::from_default()]
    }
}

implements!(Alpha => dyn Plugin);
implements!(Beta => dyn Plugin);

struct Host {
    plugins: Vec<Arc<dyn Plugin>>,
}

impl Injectable for Host {
    fn constructors() -> Vec<Constructor<Self>> {
        vec![Constructor::new(|args| Ok(Host { plugins: args.all()? })).all::<dyn Plugin>("plugins")]
    }
}

#[test]
fn test_sequence_parameter_receives_all_in_order() {
    let container = Container::new();
    container.configure(|c| {
        c.add_using::<dyn Plugin, Beta>();
        c.add_using::<dyn Plugin, Alpha>();
        c.add_using::<dyn Plugin, Beta>();
    }).unwrap();

    let host = container.resolve_concrete::<Host>().unwrap();
    let ids: Vec<_> = host.plugins.iter().map(|p| p.id()).collect();
    assert_eq!(ids, [2, 1, 2]);
}

#[test]
fn test_sequence_parameter_empty_for_unregistered_contract() {
    let container = Container::new();
    let host = container.resolve_concrete::<Host>().unwrap();
    assert!(host.plugins.is_empty());
}

#[test]
fn test_sequence_parameter_from_parent() {
    let root = Container::new();
    root.configure(|c| {
        c.add_using::<dyn Plugin, Alpha>();
    }).unwrap();

    let child = root.create_child();
    child.configure(|c| {
        c.add::<Host>();
    }).unwrap();

    assert_eq!(child.resolve::<Host>().unwrap().plugins.len(), 1);
}

static HEAVY_BUILT: AtomicUsize = AtomicUsize::new(0);

struct Heavy;
impl Injectable for Heavy {
    fn constructors() -> Vec<Constructor<Self>> {
        vec![Constructor::new(|_| {
            HEAVY_BUILT.fetch_add(1, Ordering::SeqCst);
            Ok(Heavy)
        })]
    }
}

struct Deferred {
    heavy: Lazy<Heavy>,
}

impl Injectable for Deferred {
    fn constructors() -> Vec<Constructor<Self>> {
        vec![Constructor::new(|args| Ok(Deferred { heavy: args.lazy()? })).lazy::<Heavy>("heavy")]
    }
}

#[test]
fn test_lazy_parameter_defers_construction() {
    let container = Container::new();
    container.configure(|c| {
        c.add::<Heavy>().as_singleton();
        c.add::<Deferred>();
    }).unwrap();

    let deferred = container.resolve::<Deferred>().unwrap();
    assert_eq!(HEAVY_BUILT.load(Ordering::SeqCst), 0);

    let first = deferred.heavy.get().unwrap();
    let second = deferred.heavy.get().unwrap();
    assert_eq!(HEAVY_BUILT.load(Ordering::SeqCst), 1);
    assert!(Arc::ptr_eq(&first, &second));
}

#[test]
fn test_lazy_resolves_against_current_registrations() {
    let container = Container::new();
    let lazy = container.resolve_lazy::<dyn Plugin>();

    assert!(matches!(lazy.get(), Err(DiError::ResolutionNotFound { .. })));

    container.configure(|c| {
        c.add_using::<dyn Plugin, Beta>();
    }).unwrap();
    assert_eq!(lazy.get().unwrap().id(), 2);
}

#[test]
fn test_lazy_outliving_container_reports_dropped() {
    let lazy = {
        let container = Container::new();
        container.resolve_lazy::<dyn Plugin>()
    };
    assert!(matches!(lazy.get(), Err(DiError::ContainerDropped)));
}

struct Parent {
    child: Arc<Child>,
}

struct Child {
    parent: Lazy<Parent>,
}

impl Injectable for Parent {
    fn constructors() -> Vec<Constructor<Self>> {
        vec![Constructor::new(|args| Ok(Parent { child: args.take()? })).dependency::<Child>("child")]
    }
}

impl Injectable for Child {
    fn constructors() -> Vec<Constructor<Self>> {
        vec![Constructor::new(|args| Ok(Child { parent: args.lazy()? })).lazy::<Parent>("parent")]
    }
}

#[test]
fn test_lazy_breaks_dependency_cycles() {
    let container = Container::new();
    container.configure(|c| {
        c.add::<Parent>().as_singleton();
        c.add::<Child>();
    }).unwrap();

    let parent = container.resolve::<Parent>().unwrap();
    let through_child = parent.child.parent.get().unwrap();
    assert!(Arc::ptr_eq(&parent, &through_child));
}
