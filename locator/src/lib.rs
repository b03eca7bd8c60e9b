//! # Fibre Locator
//!
//! A thread-safe dependency-injection container built around a service
//! locator.
//!
//! ## Core Concepts
//!
//! - **Identifier**: a type token (`Identifier::of::<T>()`) naming a kind of
//!   service, either a concrete type or a `dyn Trait`.
//! - **Factory**: produces a service, resolving its own dependencies through
//!   the [`ServiceLocator`] it is handed.
//! - **ServiceManager**: the registry. It binds identifiers to factories or to
//!   aliases, and caches singletons.
//! - **`get` vs `build`**: `get` returns the cached singleton (creating it on
//!   first use); `build` always creates a fresh instance.
//! - **Autowiring**: types registered with [`ServiceManager::register`] are
//!   built by the [`AutowireFactory`], which resolves every constructor
//!   parameter through the locator.
//! - **Generated factories**: `fibre_locator_codegen` emits a specialized
//!   factory ahead of time for types marked with [`FactoryGenerated`].
//!
//! Failures are values: every resolution returns a `Result<_, ResolveError>`.
//!
//! ## Quick Start
//!
//! ```
//! use fibre_locator::{introspect, ServiceManager};
//! use std::sync::Arc;
//!
//! trait Logger: Send + Sync {
//!   fn log(&self, message: &str) -> String;
//! }
//!
//! struct ConsoleLogger;
//! impl Logger for ConsoleLogger {
//!   fn log(&self, message: &str) -> String {
//!     format!("[console] {}", message)
//!   }
//! }
//!
//! struct App {
//!   logger: Arc<dyn Logger>,
//! }
//! impl App {
//!   fn new(logger: Arc<dyn Logger>) -> Self {
//!     App { logger }
//!   }
//! }
//! introspect!(App => new(logger: dyn Logger));
//!
//! let manager = ServiceManager::new();
//! manager
//!   .register_fn(|_| Ok(Arc::new(ConsoleLogger) as Arc<dyn Logger>))
//!   .register::<App>();
//!
//! let app = manager.get::<App>().unwrap();
//! assert_eq!(app.logger.log("ready"), "[console] ready");
//! assert!(Arc::ptr_eq(&app, &manager.get::<App>().unwrap()));
//! ```

mod autowire;
mod builder;
mod core;
mod error;
mod factory;
mod global;
mod introspect;
mod locator;
mod macros;
mod manager;

pub use crate::core::{Identifier, Instance};
pub use autowire::{AutowireFactory, FailurePolicy};
pub use builder::ServiceManagerBuilder;
pub use error::{InvocationError, ResolveError};
pub use factory::{DynFactory, Factory, FactoryGenerated, FnFactory};
pub use global::global;
pub use introspect::{
  Arguments, Constructor, ConstructorTable, Introspect, Parameter, TypeIntrospection,
};
pub use locator::{resolve_required, ServiceLocator};
pub use manager::ServiceManager;
