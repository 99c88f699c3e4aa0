//! Store errors and the shared failure taxonomy.
//!
//! All errors use `thiserror`-derived enums with structured context so
//! callers can inspect the failure programmatically. [`ErrorKind`] is the
//! workspace-wide classification; sibling crates map their own error enums
//! onto it so callers can branch on the kind without matching every variant.
//!
//! Stores do not hard-code their failure types. Each [`KeyedStore`]
//! instance carries an [`ErrorHooks`] value — a map of error-constructor
//! functions — so an embedding component can surface its own error enum from
//! unchanged store logic.
//!
//! [`KeyedStore`]: crate::store::KeyedStore

use thiserror::Error;

/// Workspace-wide classification of failure kinds.
///
/// # Example
///
/// ```
/// use quiver_store::{ErrorKind, StoreError};
///
/// let err = StoreError::ItemNotFound {
///     key: "theme".into(),
///     store: "settings".into(),
/// };
/// assert_eq!(err.kind(), ErrorKind::NotFound);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    /// A required constructor or argument value was absent.
    MissingParameter,
    /// A supplied value had an unrecognised shape.
    InvalidParameter,
    /// An item, group, or provider was absent.
    NotFound,
    /// A key was re-registered with a different value without overwrite
    /// permission.
    Conflict,
    /// A module resolver could not produce a constructible factory.
    ModuleNotFound,
    /// A provider factory failed while constructing an instance.
    Factory,
}

impl ErrorKind {
    /// Returns the canonical string representation.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::MissingParameter => "missing_parameter",
            Self::InvalidParameter => "invalid_parameter",
            Self::NotFound => "not_found",
            Self::Conflict => "conflict",
            Self::ModuleNotFound => "module_not_found",
            Self::Factory => "factory",
        }
    }
}

impl std::fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Errors raised by a store running with the default hooks.
#[derive(Debug, Error)]
pub enum StoreError {
    /// The requested key is not present in the store.
    #[error("item '{key}' not found in store '{store}'")]
    ItemNotFound {
        /// Key that was looked up.
        key: String,
        /// Name of the store that was searched.
        store: String,
    },

    /// The key already holds a different value and overwriting was not
    /// permitted.
    #[error("item '{key}' already registered in store '{store}' with a different value")]
    ItemConflict {
        /// Key that was being written.
        key: String,
        /// Name of the store that rejected the write.
        store: String,
    },
}

impl StoreError {
    /// Classifies this error within the shared taxonomy.
    #[must_use]
    pub const fn kind(&self) -> ErrorKind {
        match self {
            Self::ItemNotFound { .. } => ErrorKind::NotFound,
            Self::ItemConflict { .. } => ErrorKind::Conflict,
        }
    }
}

/// Per-instance map of error constructors for a store.
///
/// A store invokes `not_found` when a key is absent and `conflict` when a
/// write would clobber a different value. The default hooks produce
/// [`StoreError`]; components embedding a store supply hooks that build
/// their own error enum instead.
///
/// # Example
///
/// ```
/// use quiver_store::{ErrorHooks, KeyedStore};
///
/// #[derive(Debug)]
/// enum CacheError {
///     Missing(String),
///     Duplicate(String),
/// }
///
/// let hooks = ErrorHooks {
///     not_found: |key, _store| CacheError::Missing(key.to_owned()),
///     conflict: |key, _store| CacheError::Duplicate(key.to_owned()),
/// };
/// let store: KeyedStore<u32, CacheError> = KeyedStore::with_hooks("cache", hooks);
/// assert!(matches!(store.get("absent"), Err(CacheError::Missing(_))));
/// ```
pub struct ErrorHooks<E> {
    /// Builds the error for a lookup or removal of an absent key. Receives
    /// the key and the store name.
    pub not_found: fn(key: &str, store: &str) -> E,
    /// Builds the error for a conflicting write. Receives the key and the
    /// store name.
    pub conflict: fn(key: &str, store: &str) -> E,
}

impl<E> Clone for ErrorHooks<E> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<E> Copy for ErrorHooks<E> {}

impl<E> std::fmt::Debug for ErrorHooks<E> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ErrorHooks").finish_non_exhaustive()
    }
}

impl Default for ErrorHooks<StoreError> {
    fn default() -> Self {
        Self {
            not_found: |key, store| StoreError::ItemNotFound {
                key: key.to_owned(),
                store: store.to_owned(),
            },
            conflict: |key, store| StoreError::ItemConflict {
                key: key.to_owned(),
                store: store.to_owned(),
            },
        }
    }
}
