#![no_main]

use libfuzzer_sys::fuzz_target;
use wireup::{Constructor, Container, DiError, Handle, Injectable, Message, Routes, Subscriber};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

#[derive(Default)]
struct Node {
    seen: AtomicUsize,
}

impl Injectable for Node {
    fn constructors() -> Vec<Constructor<Self>> {
        vec![Constructor::from_default()]
    }
}

struct Poke;
impl Message for Poke {}

impl Handle<Poke> for Node {
    fn handle(&self, _: &Poke) {
        self.seen.fetch_add(1, Ordering::Relaxed);
    }
}

impl Subscriber for Node {
    fn subscribe(routes: &mut Routes<Self>) {
        routes.route::<Poke>();
    }
}

// Bytes drive a walk over a container tree: create children, register,
// resolve, send and drop instances.
fuzz_target!(|data: &[u8]| {
    let root = Container::new();
    root.configure(|c| {
        c.add_keyed::<Node>("shared").as_singleton().for_messaging();
    })
    .unwrap();

    let mut scopes = vec![root.clone()];
    let mut held: Vec<Arc<Node>> = Vec::new();

    for byte in data.iter().take(256) {
        let scope = scopes[(*byte as usize >> 3) % scopes.len()].clone();
        match byte & 0x7 {
            0 => scopes.push(scope.create_child()),
            1 => {
                let rejected = scope.configure(|c| {
                    c.add::<Node>().as_singleton();
                });
                assert_eq!(rejected.is_err(), !scope.is_root());
            }
            2 => {
                scope
                    .configure(|c| {
                        c.add::<Node>().for_messaging();
                    })
                    .unwrap();
            }
            3 => match scope.resolve::<Node>() {
                Ok(node) => held.push(node),
                Err(DiError::ResolutionNotFound { .. }) => {}
                Err(other) => panic!("unexpected error: {}", other),
            },
            4 => {
                let a = scope.resolve_keyed::<Node>("shared").unwrap();
                let b = root.resolve_keyed::<Node>("shared").unwrap();
                assert!(Arc::ptr_eq(&a, &b));
            }
            5 => {
                let delivered = scope.send(Poke).unwrap();
                assert_eq!(delivered, root.messaging_count());
            }
            6 => {
                held.pop();
            }
            _ => {
                assert_eq!(*scope.resolve::<Container>().unwrap(), root);
            }
        }
    }
});
