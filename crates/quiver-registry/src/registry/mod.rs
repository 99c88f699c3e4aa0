//! Two-tier provider registry with lazy singleton construction.
//!
//! The [`ProviderRegistry`] is a keyed store of named *groups*, each itself
//! a keyed store of provider entries. Providers register under a group
//! (defaulting to `"default"`) and are constructed lazily: the factory runs
//! the first time an entry is fetched, and the produced instance is memoized
//! so later fetches return the identical singleton for that (group, name)
//! pair. [`ProviderRegistry::get_new`] reuses the same machinery but always
//! hands back a fresh, never-cached instance.
//!
//! The registry is single-ownership and synchronous: every mutating
//! operation takes `&mut self`. The check-then-construct sequence inside
//! `get` is not atomic; an adaptation to a concurrent runtime must guard it
//! with an entry-scoped lock or a compare-and-set on the initialised flag.

use std::sync::Arc;

use quiver_store::{ErrorHooks, KeyedStore};
use tracing::debug;

use crate::error::RegistryError;
use crate::provider::{ProviderConfig, ProviderEntry, SharedFactory, SharedProvider};

/// Group name used when neither the caller nor the factory names one.
pub const DEFAULT_GROUP_NAME: &str = "default";

/// A group's store of provider entries, keyed by provider name.
pub type GroupStore<A> = KeyedStore<ProviderEntry<A>, RegistryError>;

/// Error hooks shared by the registry's outer store and every group store,
/// so all registry paths fail with provider-flavoured errors.
fn provider_hooks() -> ErrorHooks<RegistryError> {
    ErrorHooks {
        not_found: |key, _store| RegistryError::ProviderNotFound {
            name: key.to_owned(),
        },
        conflict: |key, _store| RegistryError::ProviderConflict {
            name: key.to_owned(),
        },
    }
}

/// Options accepted by [`ProviderRegistry::register`].
///
/// # Example
///
/// ```
/// use quiver_registry::RegisterOptions;
///
/// let options = RegisterOptions::default()
///     .with_group("cache")
///     .initialise();
/// assert_eq!(options.group_name(), Some("cache"));
/// ```
#[derive(Debug, Clone, Default)]
pub struct RegisterOptions {
    group_name: Option<String>,
    initialise: bool,
    config: Option<ProviderConfig>,
    allow_overwrite: bool,
}

impl RegisterOptions {
    /// Names the group the provider registers under.
    #[must_use]
    pub fn with_group(mut self, group_name: impl Into<String>) -> Self {
        self.group_name = Some(group_name.into());
        self
    }

    /// Attaches the config handed to the factory at construction time.
    #[must_use]
    pub fn with_config(mut self, config: ProviderConfig) -> Self {
        self.config = Some(config);
        self
    }

    /// Constructs the instance eagerly at registration time.
    #[must_use]
    pub const fn initialise(mut self) -> Self {
        self.initialise = true;
        self
    }

    /// Permits replacing an existing entry that would otherwise conflict.
    #[must_use]
    pub const fn allow_overwrite(mut self) -> Self {
        self.allow_overwrite = true;
        self
    }

    /// Returns the requested group name, if any.
    #[must_use]
    pub fn group_name(&self) -> Option<&str> {
        self.group_name.as_deref()
    }

    /// Returns the config to capture at registration, if any.
    #[must_use]
    pub const fn config(&self) -> Option<&ProviderConfig> {
        self.config.as_ref()
    }

    /// Returns `true` when eager construction was requested.
    #[must_use]
    pub const fn is_eager(&self) -> bool {
        self.initialise
    }
}

/// Registry of named provider groups bound to an application context.
///
/// # Example
///
/// ```
/// use std::any::Any;
/// use std::sync::Arc;
/// use quiver_registry::{
///     Provider, ProviderConfig, ProviderFactory, ProviderRegistry, RegisterOptions,
///     RegistryError, SharedProvider,
/// };
///
/// struct Clock;
///
/// impl Provider for Clock {
///     fn as_any(&self) -> &dyn Any {
///         self
///     }
/// }
///
/// struct ClockFactory;
///
/// impl ProviderFactory<()> for ClockFactory {
///     fn create(
///         &self,
///         _application: &(),
///         _config: &ProviderConfig,
///     ) -> Result<SharedProvider, RegistryError> {
///         Ok(Arc::new(Clock))
///     }
/// }
///
/// let mut registry = ProviderRegistry::new(Arc::new(()));
/// registry
///     .register("clock", Arc::new(ClockFactory), RegisterOptions::default())
///     .expect("fresh registration");
///
/// let first = registry.get("clock").expect("constructs lazily");
/// let second = registry.get("clock").expect("returns the singleton");
/// assert!(Arc::ptr_eq(&first, &second));
/// ```
pub struct ProviderRegistry<A> {
    application: Arc<A>,
    groups: KeyedStore<GroupStore<A>, RegistryError>,
    default_group_name: String,
}

impl<A> ProviderRegistry<A> {
    /// Creates a registry whose default group is [`DEFAULT_GROUP_NAME`].
    ///
    /// The default group exists, empty, as soon as the registry does.
    #[must_use]
    pub fn new(application: Arc<A>) -> Self {
        Self::with_default_group(application, DEFAULT_GROUP_NAME)
    }

    /// Creates a registry with a caller-chosen default group name.
    #[must_use]
    pub fn with_default_group(application: Arc<A>, default_group_name: impl Into<String>) -> Self {
        let group_name = default_group_name.into();
        let mut groups = KeyedStore::with_hooks("providers", provider_hooks());
        groups.replace(
            group_name.clone(),
            KeyedStore::with_hooks(group_name.clone(), provider_hooks()),
        );
        Self {
            application,
            groups,
            default_group_name: group_name,
        }
    }

    /// Returns the application context the registry hands to factories.
    #[must_use]
    pub const fn application(&self) -> &Arc<A> {
        &self.application
    }

    /// Returns the name of the default group.
    #[must_use]
    pub const fn default_group_name(&self) -> &str {
        self.default_group_name.as_str()
    }

    /// Returns the number of registered providers across all groups.
    #[must_use]
    pub fn len(&self) -> usize {
        self.groups.values().map(KeyedStore::len).sum()
    }

    /// Returns `true` when no providers are registered in any group.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Returns the group names in creation order.
    pub fn group_names(&self) -> impl Iterator<Item = &str> {
        self.groups.keys()
    }

    /// Returns a group's store, or `None` when no such group exists.
    #[must_use]
    pub fn group(&self, group_name: &str) -> Option<&GroupStore<A>> {
        self.groups.try_get(group_name)
    }

    /// Returns `true` when any group holds a provider with the given name.
    #[must_use]
    pub fn contains(&self, name: &str) -> bool {
        self.groups.values().any(|group| group.contains(name))
    }

    /// Returns `true` when the named group holds the named provider.
    #[must_use]
    pub fn contains_in(&self, group_name: &str, name: &str) -> bool {
        self.groups
            .try_get(group_name)
            .is_some_and(|group| group.contains(name))
    }

    /// Registers a provider factory under a name.
    ///
    /// The group is chosen by precedence: the explicit
    /// [`RegisterOptions::with_group`] value, else the group the factory
    /// declares through
    /// [`ProviderFactory::group_name`](crate::provider::ProviderFactory::group_name),
    /// else the registry default. Unless eager initialisation is requested
    /// the factory is not invoked here; the entry waits for its first fetch.
    ///
    /// # Errors
    ///
    /// Returns [`RegistryError::MissingParameter`] when `name` is empty,
    /// [`RegistryError::ProviderConflict`] when the name is already taken by
    /// a different entry and overwriting was not permitted, or any error the
    /// factory raises during eager construction (in which case nothing is
    /// registered).
    pub fn register(
        &mut self,
        name: &str,
        factory: SharedFactory<A>,
        options: RegisterOptions,
    ) -> Result<(), RegistryError> {
        if name.is_empty() {
            return Err(RegistryError::MissingParameter {
                name: "name".to_owned(),
            });
        }

        let RegisterOptions {
            group_name: explicit_group,
            initialise,
            config,
            allow_overwrite,
        } = options;

        let group_name = explicit_group
            .as_deref()
            .or_else(|| factory.group_name())
            .unwrap_or(&self.default_group_name)
            .to_owned();

        let mut entry = ProviderEntry::new(factory, config.unwrap_or_default());
        if initialise {
            let instance = entry.construct(&self.application)?;
            entry.initialise(instance);
        }

        debug!(
            provider = name,
            group = group_name.as_str(),
            eager = initialise,
            "registering provider"
        );

        let group = self.group_mut_or_create(&group_name)?;
        if allow_overwrite {
            group.replace(name, entry);
            Ok(())
        } else {
            group.insert(name, entry)
        }
    }

    /// Fetches a provider from the default group.
    ///
    /// # Errors
    ///
    /// See [`ProviderRegistry::get_from`].
    pub fn get(&mut self, name: &str) -> Result<SharedProvider, RegistryError> {
        let group_name = self.default_group_name.clone();
        self.get_from(&group_name, name)
    }

    /// Fetches a provider from a named group, constructing it on first
    /// access.
    ///
    /// Every later fetch of the same (group, name) pair returns the
    /// identical memoized instance.
    ///
    /// # Errors
    ///
    /// Returns [`RegistryError::ProviderNotFound`] when the group or the
    /// provider is absent, or any error the factory raises during lazy
    /// construction.
    pub fn get_from(
        &mut self,
        group_name: &str,
        name: &str,
    ) -> Result<SharedProvider, RegistryError> {
        let entry = self.groups.get(group_name)?.get(name)?.clone();

        if entry.initialised() {
            if let Some(instance) = entry.instance() {
                return Ok(Arc::clone(instance));
            }
        }

        let constructed = entry.construct(&self.application)?;
        debug!(provider = name, group = group_name, "initialised provider");

        let mut initialised_entry = entry;
        initialised_entry.initialise(Arc::clone(&constructed));
        self.groups
            .get_mut(group_name)?
            .replace(name, initialised_entry);

        Ok(constructed)
    }

    /// Constructs a fresh instance of a provider in the default group.
    ///
    /// # Errors
    ///
    /// See [`ProviderRegistry::get_new_from`].
    pub fn get_new(
        &mut self,
        name: &str,
        config_override: Option<ProviderConfig>,
    ) -> Result<SharedProvider, RegistryError> {
        let group_name = self.default_group_name.clone();
        self.get_new_from(&group_name, name, config_override)
    }

    /// Constructs a fresh, never-cached instance of a registered provider.
    ///
    /// The entry's memoized singleton is still created (and kept) as a side
    /// effect of the first call, but the returned instance is always newly
    /// constructed from `config_override`, falling back to the config
    /// captured at registration.
    ///
    /// # Errors
    ///
    /// Returns [`RegistryError::ProviderNotFound`] when the group or the
    /// provider is absent, or any error the factory raises.
    pub fn get_new_from(
        &mut self,
        group_name: &str,
        name: &str,
        config_override: Option<ProviderConfig>,
    ) -> Result<SharedProvider, RegistryError> {
        self.get_from(group_name, name)?;

        let entry = self.groups.get(group_name)?.get(name)?.clone();
        config_override.map_or_else(
            || entry.construct(&self.application),
            |config| entry.construct_with(&self.application, &config),
        )
    }

    /// Finds a provider by group or by name.
    ///
    /// When a non-empty group named `name` exists, its first-registered
    /// entry is fetched. Otherwise every group is scanned in creation order
    /// for an entry named `name`. Either path applies the usual lazy
    /// construction.
    ///
    /// # Errors
    ///
    /// Returns [`RegistryError::ProviderNotFound`] when neither a matching
    /// group nor a matching provider exists, or any error the factory
    /// raises.
    pub fn find(&mut self, name: &str) -> Result<SharedProvider, RegistryError> {
        let first_in_group = self
            .groups
            .try_get(name)
            .and_then(|group| group.keys().next().map(str::to_owned));
        if let Some(provider_name) = first_in_group {
            return self.get_from(name, &provider_name);
        }

        let home_group = self
            .groups
            .iter()
            .find(|(_, group)| group.contains(name))
            .map(|(group_name, _)| group_name.to_owned());
        home_group.map_or_else(
            || {
                Err(RegistryError::ProviderNotFound {
                    name: name.to_owned(),
                })
            },
            |group_name| self.get_from(&group_name, name),
        )
    }

    /// Returns the named group, creating it empty when absent.
    fn group_mut_or_create(&mut self, group_name: &str) -> Result<&mut GroupStore<A>, RegistryError> {
        if !self.groups.contains(group_name) {
            self.groups.replace(
                group_name.to_owned(),
                KeyedStore::with_hooks(group_name, provider_hooks()),
            );
        }
        self.groups.get_mut(group_name)
    }
}

impl<A> std::fmt::Debug for ProviderRegistry<A> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ProviderRegistry")
            .field("default_group_name", &self.default_group_name)
            .field("groups", &self.groups.keys().collect::<Vec<_>>())
            .field("providers", &self.len())
            .finish_non_exhaustive()
    }
}
