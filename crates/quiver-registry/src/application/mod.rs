//! Application surface owning one provider registry.
//!
//! An [`Application`] binds a caller-supplied context to a
//! [`ProviderRegistry`], runs the [`ManifestProcessor`] over a declarative
//! manifest at construction time, and afterwards answers lookups by
//! delegating to [`ProviderRegistry::find`].
//!
//! [`ManifestProcessor`]: crate::processor::ManifestProcessor

use std::sync::Arc;

use crate::error::RegistryError;
use crate::manifest::Manifest;
use crate::processor::{ManifestObserver, ManifestProcessor};
use crate::provider::SharedProvider;
use crate::registry::ProviderRegistry;
use crate::resolver::ModuleResolver;

/// Options accepted by [`Application::new`].
#[derive(Debug, Clone, Copy, Default)]
pub struct ApplicationOptions {
    /// Skip failing manifest entries instead of aborting construction.
    /// Defaults to `false`.
    pub resume_on_error: bool,
}

/// An application context bound to one provider registry.
///
/// # Example
///
/// ```
/// use std::any::Any;
/// use std::sync::Arc;
/// use quiver_registry::{
///     Application, ApplicationOptions, Manifest, Provider, ProviderConfig,
///     ProviderFactory, RegistryError, SharedProvider, StaticResolver,
/// };
/// use serde_json::json;
///
/// struct Logger;
///
/// impl Provider for Logger {
///     fn as_any(&self) -> &dyn Any {
///         self
///     }
/// }
///
/// struct LoggerFactory;
///
/// impl ProviderFactory<()> for LoggerFactory {
///     fn create(
///         &self,
///         _application: &(),
///         _config: &ProviderConfig,
///     ) -> Result<SharedProvider, RegistryError> {
///         Ok(Arc::new(Logger))
///     }
/// }
///
/// let mut resolver = StaticResolver::new();
/// resolver.register("console", Arc::new(LoggerFactory));
///
/// let manifest = Manifest::from_value(json!({"logger": ["console"]})).expect("object");
/// let mut app = Application::new((), &resolver, &manifest, ApplicationOptions::default())
///     .expect("manifest registers cleanly");
///
/// let logger = app.get("logger").expect("group lookup");
/// assert!(logger.as_any().downcast_ref::<Logger>().is_some());
/// ```
pub struct Application<A> {
    context: Arc<A>,
    registry: ProviderRegistry<A>,
}

impl<A> Application<A> {
    /// Builds an application, registering every manifest entry.
    ///
    /// Skipped entries (under `resume_on_error`) are reported through the
    /// default `tracing`-backed observer.
    ///
    /// # Errors
    ///
    /// Without `resume_on_error`, returns the first manifest failure;
    /// with it, construction only fails if the registry itself cannot be
    /// built (it cannot today, so the call succeeds with a partial
    /// registration).
    pub fn new<R: ModuleResolver<A>>(
        context: A,
        resolver: &R,
        manifest: &Manifest,
        options: ApplicationOptions,
    ) -> Result<Self, RegistryError> {
        Self::with_observer(
            context,
            resolver,
            manifest,
            options,
            crate::processor::LoggingObserver,
        )
    }

    /// Builds an application with a caller-supplied manifest observer.
    ///
    /// # Errors
    ///
    /// See [`Application::new`].
    pub fn with_observer<R: ModuleResolver<A>, O: ManifestObserver>(
        context: A,
        resolver: &R,
        manifest: &Manifest,
        options: ApplicationOptions,
        observer: O,
    ) -> Result<Self, RegistryError> {
        let shared = Arc::new(context);
        let mut registry = ProviderRegistry::new(Arc::clone(&shared));

        ManifestProcessor::new(resolver)
            .with_observer(observer)
            .resume_on_error(options.resume_on_error)
            .process(&mut registry, manifest)?;

        Ok(Self {
            context: shared,
            registry,
        })
    }

    /// Looks up a provider by group or name, constructing it if needed.
    ///
    /// Delegates to [`ProviderRegistry::find`].
    ///
    /// # Errors
    ///
    /// Returns [`RegistryError::ProviderNotFound`] when neither a matching
    /// group nor a matching provider exists, or any error the factory
    /// raises.
    pub fn get(&mut self, name: &str) -> Result<SharedProvider, RegistryError> {
        self.registry.find(name)
    }

    /// Returns the application context shared with provider factories.
    #[must_use]
    pub const fn context(&self) -> &Arc<A> {
        &self.context
    }

    /// Returns the provider registry.
    #[must_use]
    pub const fn registry(&self) -> &ProviderRegistry<A> {
        &self.registry
    }

    /// Returns the provider registry mutably.
    #[must_use]
    pub const fn registry_mut(&mut self) -> &mut ProviderRegistry<A> {
        &mut self.registry
    }
}

impl<A> std::fmt::Debug for Application<A> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Application")
            .field("registry", &self.registry)
            .finish_non_exhaustive()
    }
}
