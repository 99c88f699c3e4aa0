//! Domain errors raised by registry operations.
//!
//! All errors use `thiserror`-derived enums with structured context so
//! callers can inspect the failure programmatically. Every variant maps onto
//! the workspace taxonomy through [`RegistryError::kind`]; the registry's
//! internal stores are wired with [`ErrorHooks`](quiver_store::ErrorHooks)
//! that build these variants directly, so a missing group and a missing
//! provider both surface as [`RegistryError::ProviderNotFound`].

use quiver_store::ErrorKind;
use thiserror::Error;

/// Errors arising from provider registration, lookup, and manifest
/// processing.
#[derive(Debug, Error)]
pub enum RegistryError {
    /// A required argument value was absent (for string arguments, empty).
    #[error("missing required parameter '{name}'")]
    MissingParameter {
        /// Name of the parameter that was missing.
        name: String,
    },

    /// A manifest entry had an unrecognised shape.
    #[error("invalid parameter '{name}': {message}")]
    InvalidParameter {
        /// Manifest key (or parameter name) that carried the bad value.
        name: String,
        /// Description of what was wrong with the value.
        message: String,
    },

    /// The requested provider or group was not registered.
    #[error("provider '{name}' not found")]
    ProviderNotFound {
        /// Provider or group name that was looked up.
        name: String,
    },

    /// A provider was re-registered with a different value without
    /// overwrite permission.
    #[error("provider '{name}' already registered with a different value")]
    ProviderConflict {
        /// Provider name that was being registered.
        name: String,
    },

    /// The module resolver could not produce a constructible factory.
    #[error("module '{name}' not found")]
    ModuleNotFound {
        /// Module identifier that failed to resolve.
        name: String,
    },

    /// A provider factory failed while constructing an instance.
    #[error("provider factory for '{name}' failed: {message}")]
    Factory {
        /// Provider name whose factory failed.
        name: String,
        /// Human-readable failure description.
        message: String,
    },
}

impl RegistryError {
    /// Classifies this error within the shared taxonomy.
    #[must_use]
    pub const fn kind(&self) -> ErrorKind {
        match self {
            Self::MissingParameter { .. } => ErrorKind::MissingParameter,
            Self::InvalidParameter { .. } => ErrorKind::InvalidParameter,
            Self::ProviderNotFound { .. } => ErrorKind::NotFound,
            Self::ProviderConflict { .. } => ErrorKind::Conflict,
            Self::ModuleNotFound { .. } => ErrorKind::ModuleNotFound,
            Self::Factory { .. } => ErrorKind::Factory,
        }
    }
}
