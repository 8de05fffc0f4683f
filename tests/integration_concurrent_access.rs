/// Concurrent access integration tests
///
/// These verify at-most-once singleton construction and safe concurrent
/// resolution and messaging.

use wireup::{Constructor, Container, Handle, Injectable, Message, Routes, Subscriber};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Barrier};
use std::thread;
use std::time::Duration;

static SLOW_BUILT: AtomicUsize = AtomicUsize::new(0);

struct SlowSingleton;

impl Injectable for SlowSingleton {
    fn constructors() -> Vec<Constructor<Self>> {
        vec![Constructor::new(|_| {
            SLOW_BUILT.fetch_add(1, Ordering::SeqCst);
            thread::sleep(Duration::from_millis(20));
            Ok(SlowSingleton)
        })]
    }
}

#[test]
fn test_singleton_constructed_once_under_contention() {
    let container = Container::new();
    container.configure(|c| {
        c.add::<SlowSingleton>().as_singleton();
    }).unwrap();

    let threads = 8;
    let barrier = Arc::new(Barrier::new(threads));
    let handles: Vec<_> = (0..threads)
        .map(|i| {
            let barrier = barrier.clone();
            // half the threads go through their own child container
            let scope = if i % 2 == 0 { container.clone() } else { container.create_child() };
            thread::spawn(move || {
                barrier.wait();
                scope.resolve::<SlowSingleton>().unwrap()
            })
        })
        .collect();

    let instances: Vec<_> = handles.into_iter().map(|h| h.join().unwrap()).collect();
    for instance in &instances[1..] {
        assert!(Arc::ptr_eq(&instances[0], instance));
    }
    assert_eq!(SLOW_BUILT.load(Ordering::SeqCst), 1);
}

#[derive(Default)]
struct Listener {
    hits: AtomicUsize,
}

impl Injectable for Listener {
    fn constructors() -> Vec<Constructor<Self>> {
        vec![Constructor::from_default()]
    }
}

struct Beat;
impl Message for Beat {}

impl Handle<Beat> for Listener {
    fn handle(&self, _: &Beat) {
        self.hits.fetch_add(1, Ordering::SeqCst);
    }
}

impl Subscriber for Listener {
    fn subscribe(routes: &mut Routes<Self>) {
        routes.route::<Beat>();
    }
}

#[test]
fn test_send_while_registering() {
    let container = Container::new();
    container.configure(|c| {
        c.add::<Listener>().as_singleton().for_messaging();
        c.add_keyed::<Listener>("transient").for_messaging();
    }).unwrap();

    let singleton = container.resolve::<Listener>().unwrap();

    let registering = {
        let container = container.clone();
        thread::spawn(move || {
            for _ in 0..100 {
                let listener = container.resolve_keyed::<Listener>("transient").unwrap();
                drop(listener);
            }
        })
    };
    let sending = {
        let container = container.clone();
        thread::spawn(move || {
            for _ in 0..100 {
                container.send(Beat).unwrap();
            }
        })
    };

    registering.join().unwrap();
    sending.join().unwrap();

    assert_eq!(singleton.hits.load(Ordering::SeqCst), 100);
    // every transient listener has been dropped
    container.send(Beat).unwrap();
    assert_eq!(container.messaging_count(), 1);
}

#[test]
fn test_concurrent_configure_and_resolve() {
    let container = Container::new();
    let handles: Vec<_> = (0..4)
        .map(|i| {
            let container = container.clone();
            thread::spawn(move || {
                let key = format!("listener-{}", i);
                container.configure(|c| {
                    c.add_keyed::<Listener>(key.clone());
                }).unwrap();
                container.resolve_keyed::<Listener>(&key).unwrap();
            })
        })
        .collect();

    for handle in handles {
        handle.join().unwrap();
    }
    assert_eq!(container.resolve_all::<Listener>().unwrap().len(), 4);
    assert!(container.contains::<Container>());
}
