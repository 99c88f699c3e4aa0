//! Provider contracts and the registry's bookkeeping entry.
//!
//! A provider is a pluggable component instantiated and looked up by name.
//! The registry never constructs providers itself: it calls a
//! [`ProviderFactory`] bound to the application context, and memoizes the
//! produced instance in a [`ProviderEntry`]. Factories are trait objects so
//! they can be resolved dynamically by name; plain closures adapt through
//! [`factory_fn`].

use std::any::Any;
use std::sync::Arc;

use crate::error::RegistryError;

/// Configuration value attached to a registered provider.
///
/// Manifest config shapes are JSON objects, so the config type is the JSON
/// object map.
pub type ProviderConfig = serde_json::Map<String, serde_json::Value>;

/// A pluggable component managed by the registry.
///
/// The trait is deliberately minimal: providers are opaque to the registry,
/// and [`Provider::as_any`] is the hook callers use to downcast a shared
/// instance back to its concrete type.
pub trait Provider: Send + Sync {
    /// Returns `self` for downcasting to the concrete provider type.
    fn as_any(&self) -> &dyn Any;
}

/// A provider instance shared between the registry and its callers.
pub type SharedProvider = Arc<dyn Provider>;

/// Constructs provider instances bound to an application context.
///
/// # Example
///
/// ```
/// use std::any::Any;
/// use std::sync::Arc;
/// use quiver_registry::{
///     Provider, ProviderConfig, ProviderFactory, RegistryError, SharedProvider,
/// };
///
/// struct Greeter {
///     greeting: String,
/// }
///
/// impl Provider for Greeter {
///     fn as_any(&self) -> &dyn Any {
///         self
///     }
/// }
///
/// struct GreeterFactory;
///
/// impl ProviderFactory<()> for GreeterFactory {
///     fn create(
///         &self,
///         _application: &(),
///         config: &ProviderConfig,
///     ) -> Result<SharedProvider, RegistryError> {
///         let greeting = config
///             .get("greeting")
///             .and_then(serde_json::Value::as_str)
///             .unwrap_or("hello")
///             .to_owned();
///         Ok(Arc::new(Greeter { greeting }))
///     }
/// }
/// ```
pub trait ProviderFactory<A>: Send + Sync {
    /// Group the provider registers under when the caller names none.
    fn group_name(&self) -> Option<&str> {
        None
    }

    /// Constructs a provider instance.
    ///
    /// # Errors
    ///
    /// Returns a [`RegistryError`] (typically
    /// [`RegistryError::Factory`]) when the instance cannot be built from
    /// the given config.
    fn create(
        &self,
        application: &A,
        config: &ProviderConfig,
    ) -> Result<SharedProvider, RegistryError>;
}

/// A provider factory shared between the resolver and the registry.
pub type SharedFactory<A> = Arc<dyn ProviderFactory<A>>;

/// Adapts a plain closure into a [`ProviderFactory`].
///
/// Built with [`factory_fn`].
pub struct FactoryFn<F> {
    f: F,
}

impl<F> std::fmt::Debug for FactoryFn<F> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FactoryFn").finish_non_exhaustive()
    }
}

/// Wraps `factory(application, config) -> provider` as a
/// [`ProviderFactory`].
///
/// # Example
///
/// ```
/// use std::any::Any;
/// use std::sync::Arc;
/// use quiver_registry::{
///     Provider, ProviderConfig, ProviderFactory, RegistryError, SharedProvider, factory_fn,
/// };
///
/// struct Marker;
///
/// impl Provider for Marker {
///     fn as_any(&self) -> &dyn Any {
///         self
///     }
/// }
///
/// let factory = factory_fn(
///     |_application: &(), _config: &ProviderConfig| -> Result<SharedProvider, RegistryError> {
///         Ok(Arc::new(Marker))
///     },
/// );
/// let provider = factory.create(&(), &ProviderConfig::new()).expect("builds");
/// assert!(provider.as_any().downcast_ref::<Marker>().is_some());
/// ```
#[must_use]
pub const fn factory_fn<F>(f: F) -> FactoryFn<F> {
    FactoryFn { f }
}

impl<A, F> ProviderFactory<A> for FactoryFn<F>
where
    F: Fn(&A, &ProviderConfig) -> Result<SharedProvider, RegistryError> + Send + Sync,
{
    fn create(
        &self,
        application: &A,
        config: &ProviderConfig,
    ) -> Result<SharedProvider, RegistryError> {
        (self.f)(application, config)
    }
}

/// The registry's bookkeeping record for one registered provider.
///
/// An entry starts uninitialised and transitions exactly once: the first
/// fetch constructs the instance and flips `initialised`, after which the
/// instance is never replaced (short of an overwriting re-registration).
/// Eager registration starts directly in the initialised state.
pub struct ProviderEntry<A> {
    initialised: bool,
    instance: Option<SharedProvider>,
    factory: SharedFactory<A>,
    config: ProviderConfig,
}

impl<A> ProviderEntry<A> {
    /// Creates an uninitialised entry holding the factory and config.
    pub(crate) fn new(factory: SharedFactory<A>, config: ProviderConfig) -> Self {
        Self {
            initialised: false,
            instance: None,
            factory,
            config,
        }
    }

    /// Returns `true` once the entry's singleton instance exists.
    #[must_use]
    pub const fn initialised(&self) -> bool {
        self.initialised
    }

    /// Returns the memoized instance, when one has been constructed.
    #[must_use]
    pub const fn instance(&self) -> Option<&SharedProvider> {
        self.instance.as_ref()
    }

    /// Returns the config captured at registration time.
    #[must_use]
    pub const fn config(&self) -> &ProviderConfig {
        &self.config
    }

    /// Marks the entry initialised with its singleton instance.
    ///
    /// This is the entry's only mutation path; the transition is terminal.
    pub(crate) fn initialise(&mut self, instance: SharedProvider) {
        self.instance = Some(instance);
        self.initialised = true;
    }

    /// Constructs an instance from the entry's own config.
    pub(crate) fn construct(&self, application: &A) -> Result<SharedProvider, RegistryError> {
        self.construct_with(application, &self.config)
    }

    /// Constructs an instance from an explicit config.
    pub(crate) fn construct_with(
        &self,
        application: &A,
        config: &ProviderConfig,
    ) -> Result<SharedProvider, RegistryError> {
        self.factory.create(application, config)
    }
}

impl<A> Clone for ProviderEntry<A> {
    fn clone(&self) -> Self {
        Self {
            initialised: self.initialised,
            instance: self.instance.clone(),
            factory: Arc::clone(&self.factory),
            config: self.config.clone(),
        }
    }
}

impl<A> PartialEq for ProviderEntry<A> {
    /// Entry equality is identity equality: the same factory object, the
    /// same (or equally absent) instance object, and an equal config.
    fn eq(&self, other: &Self) -> bool {
        self.initialised == other.initialised
            && Arc::ptr_eq(&self.factory, &other.factory)
            && match (&self.instance, &other.instance) {
                (Some(mine), Some(theirs)) => Arc::ptr_eq(mine, theirs),
                (None, None) => true,
                _ => false,
            }
            && self.config == other.config
    }
}

impl<A> std::fmt::Debug for ProviderEntry<A> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ProviderEntry")
            .field("initialised", &self.initialised)
            .field("instance", &self.instance.is_some())
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}
