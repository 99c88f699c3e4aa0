//! Provider registry and manifest processing for the Quiver framework.
//!
//! The `quiver-registry` crate implements the pluggable-component layer: a
//! two-tier [`ProviderRegistry`] (groups of named provider entries, built on
//! the keyed stores from `quiver-store`) with lazy singleton construction,
//! plus the [`ManifestProcessor`] that normalises declarative manifests into
//! registrations with per-entry failure isolation.
//!
//! # Architecture
//!
//! Providers are opaque [`Provider`] trait objects built by
//! [`ProviderFactory`] implementations. The registry never loads code: a
//! caller-injected [`ModuleResolver`] turns string identifiers into
//! factories ([`StaticResolver`] is the bundled table-backed
//! implementation). An [`Application`] ties the pieces together: it owns a
//! registry bound to the application context, processes a manifest at
//! construction, and answers `get` by [`ProviderRegistry::find`].
//!
//! # Example
//!
//! ```
//! use std::any::Any;
//! use std::sync::Arc;
//! use quiver_registry::{
//!     Application, ApplicationOptions, Manifest, Provider, ProviderConfig,
//!     ProviderFactory, RegistryError, SharedProvider, StaticResolver,
//! };
//! use serde_json::json;
//!
//! struct Database {
//!     path: String,
//! }
//!
//! impl Provider for Database {
//!     fn as_any(&self) -> &dyn Any {
//!         self
//!     }
//! }
//!
//! struct DatabaseFactory;
//!
//! impl ProviderFactory<()> for DatabaseFactory {
//!     fn create(
//!         &self,
//!         _application: &(),
//!         config: &ProviderConfig,
//!     ) -> Result<SharedProvider, RegistryError> {
//!         let path = config
//!             .get("path")
//!             .and_then(serde_json::Value::as_str)
//!             .unwrap_or(":memory:")
//!             .to_owned();
//!         Ok(Arc::new(Database { path }))
//!     }
//! }
//!
//! let mut resolver = StaticResolver::new();
//! resolver.register("sqlite", Arc::new(DatabaseFactory));
//!
//! let manifest = Manifest::from_value(json!({
//!     "db": ["sqlite", {"path": "/tmp/app.db"}],
//! }))
//! .expect("object manifest");
//!
//! let mut app = Application::new((), &resolver, &manifest, ApplicationOptions::default())
//!     .expect("manifest registers cleanly");
//!
//! let db = app.get("db").expect("lookup by group");
//! let database = db.as_any().downcast_ref::<Database>().expect("concrete type");
//! assert_eq!(database.path, "/tmp/app.db");
//! ```

pub mod application;
pub mod error;
pub mod manifest;
pub mod processor;
pub mod provider;
pub mod registry;
pub mod resolver;

#[cfg(test)]
mod tests;

pub use quiver_store::{ErrorHooks, ErrorKind, KeyedStore, StoreError};

pub use self::application::{Application, ApplicationOptions};
pub use self::error::RegistryError;
pub use self::manifest::{Manifest, ManifestEntry, ProviderRef};
pub use self::processor::{LoggingObserver, ManifestObserver, ManifestProcessor};
pub use self::provider::{
    FactoryFn, Provider, ProviderConfig, ProviderEntry, ProviderFactory, SharedFactory,
    SharedProvider, factory_fn,
};
pub use self::registry::{
    DEFAULT_GROUP_NAME, GroupStore, ProviderRegistry, RegisterOptions,
};
pub use self::resolver::{ModuleExport, ModuleResolver, StaticResolver};
