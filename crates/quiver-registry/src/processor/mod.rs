//! Manifest processing: normalising declarative entries into registrations.
//!
//! The [`ManifestProcessor`] walks a [`Manifest`] in declaration order and
//! turns each entry into one or more [`ProviderRegistry::register`] calls:
//! classify the entry shape, resolve every referenced factory through the
//! injected [`ModuleResolver`], merge the registration options (the group
//! the factory declares, outranked by the manifest key acting as the group,
//! plus any config the shape carries), and register.
//!
//! Each top-level manifest key is its own failure boundary. With
//! `resume_on_error` a failing key is reported to the [`ManifestObserver`]
//! and processing continues, leaving a partial registration; without it the
//! first failure aborts the remaining keys while registrations from earlier
//! keys stand.

use serde_json::Value;
use tracing::{debug, error};

use crate::error::RegistryError;
use crate::manifest::{Manifest, ManifestEntry, ProviderRef};
use crate::registry::{ProviderRegistry, RegisterOptions};
use crate::resolver::ModuleResolver;

/// Receives the errors skipped while processing a manifest with
/// `resume_on_error` enabled.
pub trait ManifestObserver {
    /// Called once for each manifest entry that was skipped.
    fn entry_skipped(&mut self, error: &RegistryError);
}

/// The default observer: reports skipped entries through `tracing`.
#[derive(Debug, Clone, Copy, Default)]
pub struct LoggingObserver;

impl ManifestObserver for LoggingObserver {
    fn entry_skipped(&mut self, error: &RegistryError) {
        error!(error = %error, "skipped manifest entry");
    }
}

/// Normalises a declarative manifest into registry registrations.
///
/// # Example
///
/// ```
/// use std::any::Any;
/// use std::sync::Arc;
/// use quiver_registry::{
///     Manifest, ManifestProcessor, Provider, ProviderConfig, ProviderFactory,
///     ProviderRegistry, RegistryError, SharedProvider, StaticResolver,
/// };
/// use serde_json::json;
///
/// struct Store;
///
/// impl Provider for Store {
///     fn as_any(&self) -> &dyn Any {
///         self
///     }
/// }
///
/// struct StoreFactory;
///
/// impl ProviderFactory<()> for StoreFactory {
///     fn create(
///         &self,
///         _application: &(),
///         _config: &ProviderConfig,
///     ) -> Result<SharedProvider, RegistryError> {
///         Ok(Arc::new(Store))
///     }
/// }
///
/// let mut resolver = StaticResolver::new();
/// resolver.register("sqlite", Arc::new(StoreFactory));
///
/// let manifest = Manifest::from_value(json!({"db": ["sqlite"]})).expect("object");
/// let mut registry = ProviderRegistry::new(Arc::new(()));
/// ManifestProcessor::new(&resolver)
///     .process(&mut registry, &manifest)
///     .expect("manifest registers cleanly");
///
/// assert!(registry.contains_in("db", "sqlite"));
/// ```
#[derive(Debug)]
pub struct ManifestProcessor<'a, R, O = LoggingObserver> {
    resolver: &'a R,
    observer: O,
    resume_on_error: bool,
}

impl<'a, R> ManifestProcessor<'a, R, LoggingObserver> {
    /// Creates a processor that aborts on the first failure and logs
    /// nothing beyond `tracing`.
    #[must_use]
    pub const fn new(resolver: &'a R) -> Self {
        Self {
            resolver,
            observer: LoggingObserver,
            resume_on_error: false,
        }
    }
}

impl<'a, R, O> ManifestProcessor<'a, R, O> {
    /// Replaces the observer notified of skipped entries.
    #[must_use]
    pub fn with_observer<O2>(self, observer: O2) -> ManifestProcessor<'a, R, O2> {
        ManifestProcessor {
            resolver: self.resolver,
            observer,
            resume_on_error: self.resume_on_error,
        }
    }

    /// Chooses whether a failing entry is skipped (`true`) or fatal
    /// (`false`, the default).
    #[must_use]
    pub const fn resume_on_error(mut self, resume: bool) -> Self {
        self.resume_on_error = resume;
        self
    }
}

impl<R, O: ManifestObserver> ManifestProcessor<'_, R, O> {
    /// Processes every manifest entry against the registry.
    ///
    /// # Errors
    ///
    /// Without `resume_on_error`, returns the first classification,
    /// resolution, or registration failure; entries after the failing key
    /// are not processed, while earlier registrations remain. With
    /// `resume_on_error`, failures are reported to the observer instead and
    /// this method only returns `Ok`.
    pub fn process<A>(
        &mut self,
        registry: &mut ProviderRegistry<A>,
        manifest: &Manifest,
    ) -> Result<(), RegistryError>
    where
        R: ModuleResolver<A>,
    {
        for (key, value) in manifest.iter() {
            match self.process_entry(registry, key, value) {
                Ok(()) => {}
                Err(err) if self.resume_on_error => {
                    self.observer.entry_skipped(&err);
                }
                Err(err) => return Err(err),
            }
        }
        Ok(())
    }

    /// Processes one top-level manifest entry.
    fn process_entry<A>(
        &self,
        registry: &mut ProviderRegistry<A>,
        key: &str,
        value: &Value,
    ) -> Result<(), RegistryError>
    where
        R: ModuleResolver<A>,
    {
        match ManifestEntry::classify(key, value)? {
            ManifestEntry::Single(reference) => self.register_reference(registry, key, reference),
            ManifestEntry::Many(references) => {
                for reference in references {
                    self.register_reference(registry, key, reference)?;
                }
                Ok(())
            }
            ManifestEntry::ConfigOnly(config) => self.register_reference(
                registry,
                key,
                ProviderRef::NameWithConfig(key.to_owned(), config),
            ),
        }
    }

    /// Resolves one provider reference and registers it under the manifest
    /// key's group.
    fn register_reference<A>(
        &self,
        registry: &mut ProviderRegistry<A>,
        group_key: &str,
        reference: ProviderRef,
    ) -> Result<(), RegistryError>
    where
        R: ModuleResolver<A>,
    {
        let (name, config) = reference.into_parts();

        let export = self.resolver.resolve(&name)?;
        let factory =
            export
                .into_factory()
                .ok_or_else(|| RegistryError::ModuleNotFound {
                    name: name.clone(),
                })?;

        // The manifest key acts as the group and outranks the group the
        // factory declares; `register` falls back to the factory's group
        // only when no group is supplied at all.
        let mut options = RegisterOptions::default().with_group(group_key);
        if let Some(extra) = config {
            options = options.with_config(extra);
        }

        debug!(provider = name.as_str(), group = group_key, "manifest registration");
        registry.register(&name, factory, options)
    }
}

#[cfg(test)]
mod tests;
