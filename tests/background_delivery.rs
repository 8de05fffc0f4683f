#![cfg(feature = "async")]
//! Background delivery on the tokio blocking pool

use wireup::{Constructor, Container, Delivery, Handle, Injectable, Message, Routes, Subscriber};
use std::thread::{self, ThreadId};
use std::time::Duration;
use tokio::sync::mpsc::{unbounded_channel, UnboundedSender};
use tokio::time::timeout;

struct Ping {
    delivery: Delivery,
}

impl Message for Ping {
    fn delivery(&self) -> Delivery {
        self.delivery
    }
}

struct Recorder {
    seen: UnboundedSender<ThreadId>,
}

impl Injectable for Recorder {
    fn constructors() -> Vec<Constructor<Self>> {
        vec![Constructor::new(|args| Ok(Recorder { seen: args.value()? }))
            .param::<UnboundedSender<ThreadId>>("seen")]
    }
}

impl Handle<Ping> for Recorder {
    fn handle(&self, _: &Ping) {
        let _ = self.seen.send(thread::current().id());
    }
}

impl Subscriber for Recorder {
    fn subscribe(routes: &mut Routes<Self>) {
        routes.route::<Ping>();
    }
}

fn container_with(seen: UnboundedSender<ThreadId>) -> Container {
    let container = Container::new();
    container.configure(|c| {
        c.add::<Recorder>()
            .as_singleton()
            .for_messaging()
            .with_custom_constructor(wireup::CustomArguments::new().with("seen", seen));
    }).unwrap();
    container
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn test_background_only_runs_off_the_sender() {
    let (tx, mut rx) = unbounded_channel();
    let container = container_with(tx);
    let _recorder = container.resolve::<Recorder>().unwrap();

    let sender = thread::current().id();
    let delivered = container.send(Ping { delivery: Delivery::background_only() }).unwrap();
    assert_eq!(delivered, 1);

    let handled_on = timeout(Duration::from_secs(5), rx.recv()).await.unwrap().unwrap();
    assert_ne!(handled_on, sender);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn test_both_paths_fire() {
    let (tx, mut rx) = unbounded_channel();
    let container = container_with(tx);
    let _recorder = container.resolve::<Recorder>().unwrap();

    let sender = thread::current().id();
    container
        .send(Ping { delivery: Delivery::default().in_background() })
        .unwrap();

    let mut threads = Vec::new();
    for _ in 0..2 {
        threads.push(timeout(Duration::from_secs(5), rx.recv()).await.unwrap().unwrap());
    }
    assert!(threads.contains(&sender));
    assert!(threads.iter().any(|t| *t != sender));
}

#[test]
fn test_background_without_runtime_uses_a_thread() {
    let (tx, mut rx) = unbounded_channel();
    let container = container_with(tx);
    let _recorder = container.resolve::<Recorder>().unwrap();

    container.send(Ping { delivery: Delivery::background_only() }).unwrap();
    let handled_on = rx.blocking_recv().unwrap();
    assert_ne!(handled_on, thread::current().id());
}
