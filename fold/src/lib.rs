//! # Fibre Fold
//!
//! A thread-safe, string-keyed binding container for composing an application
//! out of independent service providers, plus a lazily memoized extension
//! mechanism for per-request context objects.
//!
//! ## Core Concepts
//!
//! - **Container**: string keys mapped to recipes, each tagged `Singleton`
//!   (constructed once, shared) or `Transient` (constructed per resolution).
//!   Keys can be aliased, and recipes resolve their own dependencies.
//! - **Providers**: units that first *register* bindings and, once every
//!   provider has registered, *boot*. Booting may resolve anything.
//! - **Context extensions**: named getters attached to a shared context type
//!   during boot and computed lazily, at most once per request when cached.
//!
//! ## Quick Start
//!
//! ```
//! use fibre_fold::{run_providers, BoxError, Container, Registrar, ServiceProvider};
//! use std::sync::Arc;
//!
//! struct Database {
//!   url: String,
//! }
//!
//! struct DatabaseProvider;
//!
//! impl ServiceProvider for DatabaseProvider {
//!   fn register(&self, app: &Registrar<'_>) -> Result<(), BoxError> {
//!     app.instance("db.url", String::from("postgres://localhost/app"));
//!     app.singleton("db", |c: &Container| {
//!       let url = c.resolve_as::<String>("db.url")?;
//!       Ok(Database { url: (*url).clone() })
//!     });
//!     app.alias("Database", "db");
//!     Ok(())
//!   }
//! }
//!
//! let container = Container::new();
//! run_providers(&container, [Box::new(DatabaseProvider) as Box<dyn ServiceProvider>]).unwrap();
//!
//! let db = container.resolve_as::<Database>("Database").unwrap();
//! assert_eq!(db.url, "postgres://localhost/app");
//! assert!(Arc::ptr_eq(&db, &container.resolve_as::<Database>("db").unwrap()));
//! ```

mod alias;
mod binding;
mod builder;
mod container;
mod context;
mod core;
mod error;
mod key;
mod provider;

pub mod app;

pub use alias::AliasTable;
pub use binding::{Binding, BindingRegistry, Lifecycle};
pub use builder::ContainerBuilder;
pub use container::Container;
pub use context::{Context, Extensions};
pub use crate::core::Instance;
pub use error::{BoxError, BuildError, Error, Result};
pub use key::Key;
pub use provider::{run_providers, Bootstrapper, Phase, Registrar, ServiceProvider};
