//! # wireup
//!
//! A runtime-configured inversion-of-control container: register
//! implementations against contracts, then let the container build
//! fully-wired object graphs on request.
//!
//! ## Features
//!
//! - **Constructor injection**: implementations describe their constructors;
//!   the container picks one and resolves every parameter recursively
//! - **Contracts as trait objects**: register `T` for `dyn Trait` and
//!   resolve `Arc<dyn Trait>`
//! - **Multiple and keyed registrations**: sequences in registration order,
//!   lookup keys, and per-contract defaults
//! - **Container trees**: child containers overlay their parent; singletons
//!   always live at the root
//! - **Messaging**: instances can opt into a weak-lifetime message bus when
//!   they are constructed
//! - **Cycle detection**: re-entrant construction fails with the full path
//!
//! ## Quick Start
//!
//! ```rust
//! use wireup::{Container, Constructor, Injectable};
//! use std::sync::Arc;
//!
//! struct Database {
//!     connection_string: String,
//! }
//!
//! impl Injectable for Database {
//!     fn constructors() -> Vec<Constructor<Self>> {
//!         vec![Constructor::new(|args| Ok(Database { connection_string: args.value()? }))
//!             .param::<String>("connection_string")]
//!     }
//! }
//!
//! struct UserService {
//!     db: Arc<Database>,
//! }
//!
//! impl Injectable for UserService {
//!     fn constructors() -> Vec<Constructor<Self>> {
//!         vec![Constructor::new(|args| Ok(UserService { db: args.take()? }))
//!             .dependency::<Database>("db")]
//!     }
//! }
//!
//! let container = Container::new();
//! container.configure(|c| {
//!     c.add::<Database>()
//!         .as_singleton()
//!         .with_custom_constructor(wireup::CustomArguments::new()
//!             .with("connection_string", "postgres://localhost".to_string()));
//!     c.add::<UserService>();
//! }).unwrap();
//!
//! let user_service = container.resolve::<UserService>().unwrap();
//! assert_eq!(user_service.db.connection_string, "postgres://localhost");
//! ```
//!
//! ## Lifetimes
//!
//! - **Singleton**: created once and cached at the root container
//! - **Transient**: created fresh on every resolution (the default)
//!
//! ## Messaging
//!
//! ```rust
//! use wireup::{Container, Constructor, Handle, Injectable, Message, Routes, Subscriber};
//! use std::sync::atomic::{AtomicI32, Ordering};
//!
//! struct AddMessage { how_much: i32 }
//! impl Message for AddMessage {}
//!
//! struct Counter { count: AtomicI32 }
//! impl Injectable for Counter {
//!     fn constructors() -> Vec<Constructor<Self>> {
//!         vec![Constructor::new(|_| Ok(Counter { count: AtomicI32::new(1) }))]
//!     }
//! }
//! impl Handle<AddMessage> for Counter {
//!     fn handle(&self, message: &AddMessage) {
//!         self.count.fetch_add(message.how_much, Ordering::SeqCst);
//!     }
//! }
//! impl Subscriber for Counter {
//!     fn subscribe(routes: &mut Routes<Self>) { routes.route::<AddMessage>(); }
//! }
//!
//! let container = Container::new();
//! container.configure(|c| { c.add::<Counter>().for_messaging(); }).unwrap();
//!
//! let counter = container.resolve::<Counter>().unwrap();
//! container.send(AddMessage { how_much: 5 }).unwrap();
//! assert_eq!(counter.count.load(Ordering::SeqCst), 6);
//! ```

pub mod configuration;
pub mod constructor;
pub mod container;
pub mod descriptors;
pub mod error;
pub mod key;
pub mod lifetime;
pub mod messaging;
pub mod observer;
pub mod options;
pub mod traits;

// Internal modules
mod internal;
mod registration;

pub use configuration::{Configuration, Registration, RegistryModule};
pub use constructor::{Arguments, Constructor, CustomArguments, Injectable, Lazy, Parameter};
pub use container::{Container, WeakContainer};
pub use descriptors::DescriptorInfo;
pub use error::{BoxError, DiError, DiResult};
pub use key::{key_of_type, TypeKey};
pub use lifetime::Lifetime;
pub use messaging::{Delivery, Handle, Message, Messenger, Routes, Subscriber};
pub use observer::{DiObserver, LoggingObserver};
pub use options::{ConstructorPolicy, ContainerOptions};
pub use traits::{Dispose, Upcast};
