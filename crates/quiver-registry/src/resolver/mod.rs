//! Module resolution for providers referenced by name.
//!
//! Manifests refer to providers by string identifier; turning an identifier
//! into a constructible [`ProviderFactory`] is the job of an injected
//! [`ModuleResolver`]. The resolver abstraction decouples the registry core
//! from any particular module system, and enables test doubles that resolve
//! from a fixture table instead.
//!
//! A resolved module may expose its factory directly or behind a
//! default-export envelope; [`ModuleExport::into_factory`] unwraps both
//! shapes, and an envelope with nothing constructible inside surfaces as
//! [`RegistryError::ModuleNotFound`] at the call site.
//!
//! [`ProviderFactory`]: crate::provider::ProviderFactory

use std::collections::HashMap;
use std::sync::Arc;

use crate::error::RegistryError;
use crate::provider::SharedFactory;

/// The value a module resolver produced for an identifier.
pub enum ModuleExport<A> {
    /// The module itself is the factory.
    Direct(SharedFactory<A>),
    /// The factory sits behind a default-export envelope, which may turn
    /// out to hold nothing constructible.
    DefaultExport(Option<SharedFactory<A>>),
}

impl<A> ModuleExport<A> {
    /// Unwraps the export down to its factory, if one exists.
    #[must_use]
    pub fn into_factory(self) -> Option<SharedFactory<A>> {
        match self {
            Self::Direct(factory) => Some(factory),
            Self::DefaultExport(factory) => factory,
        }
    }
}

impl<A> Clone for ModuleExport<A> {
    fn clone(&self) -> Self {
        match self {
            Self::Direct(factory) => Self::Direct(Arc::clone(factory)),
            Self::DefaultExport(factory) => Self::DefaultExport(factory.clone()),
        }
    }
}

impl<A> std::fmt::Debug for ModuleExport<A> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Direct(_) => f.write_str("ModuleExport::Direct"),
            Self::DefaultExport(Some(_)) => f.write_str("ModuleExport::DefaultExport(Some)"),
            Self::DefaultExport(None) => f.write_str("ModuleExport::DefaultExport(None)"),
        }
    }
}

/// Resolves a provider identifier to a constructible factory.
pub trait ModuleResolver<A> {
    /// Resolves `name` to a module export.
    ///
    /// # Errors
    ///
    /// Returns [`RegistryError::ModuleNotFound`] when no module answers to
    /// the identifier.
    fn resolve(&self, name: &str) -> Result<ModuleExport<A>, RegistryError>;
}

/// A resolver backed by a fixed table of compiled-in factories.
///
/// This is the bundled production implementation for embedders whose
/// provider set is known at build time.
///
/// # Example
///
/// ```
/// use std::any::Any;
/// use std::sync::Arc;
/// use quiver_registry::{
///     ModuleResolver, Provider, ProviderConfig, ProviderFactory, RegistryError,
///     SharedProvider, StaticResolver,
/// };
///
/// struct Noop;
///
/// impl Provider for Noop {
///     fn as_any(&self) -> &dyn Any {
///         self
///     }
/// }
///
/// struct NoopFactory;
///
/// impl ProviderFactory<()> for NoopFactory {
///     fn create(
///         &self,
///         _application: &(),
///         _config: &ProviderConfig,
///     ) -> Result<SharedProvider, RegistryError> {
///         Ok(Arc::new(Noop))
///     }
/// }
///
/// let mut resolver = StaticResolver::new();
/// resolver.register("noop", Arc::new(NoopFactory));
/// let export = resolver.resolve("noop").expect("registered module");
/// assert!(export.into_factory().is_some());
/// ```
pub struct StaticResolver<A> {
    modules: HashMap<String, ModuleExport<A>>,
}

impl<A> StaticResolver<A> {
    /// Creates an empty resolver.
    #[must_use]
    pub fn new() -> Self {
        Self {
            modules: HashMap::new(),
        }
    }

    /// Maps `name` to a factory, replacing any previous mapping.
    pub fn register(&mut self, name: impl Into<String>, factory: SharedFactory<A>) -> &mut Self {
        self.register_export(name, ModuleExport::Direct(factory))
    }

    /// Maps `name` to an arbitrary module export shape.
    pub fn register_export(
        &mut self,
        name: impl Into<String>,
        export: ModuleExport<A>,
    ) -> &mut Self {
        self.modules.insert(name.into(), export);
        self
    }

    /// Returns the number of registered modules.
    #[must_use]
    pub fn len(&self) -> usize {
        self.modules.len()
    }

    /// Returns `true` when no modules are registered.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.modules.is_empty()
    }
}

impl<A> Default for StaticResolver<A> {
    fn default() -> Self {
        Self::new()
    }
}

impl<A> std::fmt::Debug for StaticResolver<A> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StaticResolver")
            .field("modules", &self.modules.keys())
            .finish()
    }
}

impl<A> ModuleResolver<A> for StaticResolver<A> {
    fn resolve(&self, name: &str) -> Result<ModuleExport<A>, RegistryError> {
        self.modules
            .get(name)
            .cloned()
            .ok_or_else(|| RegistryError::ModuleNotFound {
                name: name.to_owned(),
            })
    }
}
