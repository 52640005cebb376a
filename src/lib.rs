//! # injectable
//!
//! A process-wide service registry with overridable default bindings.
//!
//! Call sites ask the [`Container`] for a service and say how to build it by
//! default. Tests and previews swap that default out by registering an
//! override for the same handle type, without touching the call site.
//!
//! ## Features
//!
//! - **Overrides**: last-writer-wins factories that always beat the default
//! - **Scopes**: application singletons, a resettable cache, and a weak
//!   shared scope that keeps an instance only while someone holds it
//! - **Self-constructing services**: types that build themselves from an
//!   optional opaque argument, with their own override table
//! - **Thread-safe**: one re-entrant lock per table, so factories can
//!   resolve other services on the same thread
//!
//! ## Quick Start
//!
//! ```rust
//! use injectable::{container, Binding, Container};
//! use std::sync::Arc;
//!
//! trait Greeter: Send + Sync {
//!     fn greet(&self) -> String;
//! }
//!
//! struct Service;
//! impl Greeter for Service {
//!     fn greet(&self) -> String { "service".to_string() }
//! }
//!
//! struct Mock;
//! impl Greeter for Mock {
//!     fn greet(&self) -> String { "mock".to_string() }
//! }
//!
//! // The default binding: shared while in use
//! struct GreeterBinding;
//! impl Binding for GreeterBinding {
//!     type Service = Arc<dyn Greeter>;
//!     fn make(c: &Container) -> Self::Service {
//!         c.shared().obtain(|| Arc::new(Service) as Arc<dyn Greeter>)
//!     }
//! }
//!
//! let greeter = container().resolve_binding::<GreeterBinding>();
//! assert_eq!(greeter.greet(), "service");
//!
//! // Override for tests
//! container().register(|| Arc::new(Mock) as Arc<dyn Greeter>);
//! assert_eq!(container().resolve_binding::<GreeterBinding>().greet(), "mock");
//!
//! container().reset();
//! assert_eq!(container().resolve_binding::<GreeterBinding>().greet(), "service");
//! ```
//!
//! ## Scopes
//!
//! - **Application** ([`SingletonScope`]): created once, kept for the process
//! - **Cached** ([`CachedScope`]): kept until the scope is reset
//! - **Shared** ([`SharedScope`]): kept while an external `Arc` exists
//!
//! ```rust
//! use injectable::{container, Scope};
//! use std::sync::Arc;
//!
//! struct Report(u32);
//!
//! let a = container().cached().obtain(|| Arc::new(Report(1)));
//! let b = container().cached().obtain(|| Arc::new(Report(2)));
//! assert!(Arc::ptr_eq(&a, &b));
//!
//! container().cached().reset();
//! let c = container().cached().obtain(|| Arc::new(Report(3)));
//! assert_eq!(c.0, 3);
//! ```

pub mod binding;
pub mod constructing;
pub mod container;
pub mod error;
pub mod injected;
pub mod key;
pub mod observer;
pub mod scope;
pub mod snapshot;

// Re-export core types
pub use binding::Binding;
pub use constructing::{Argument, SelfConstructing};
pub use container::{container, Batch, Container};
pub use error::{DiError, DiResult};
pub use injected::{Injected, LazyInjected};
pub use key::{key_of_type, Key};
pub use observer::{LoggingObserver, ResolutionObserver, ResolutionSource};
pub use scope::{CachedScope, Scope, ScopeKind, SharedScope, SingletonScope};
pub use snapshot::RegistrySnapshot;
