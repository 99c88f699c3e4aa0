//! Generic keyed storage for the Quiver provider framework.
//!
//! The `quiver-store` crate implements [`KeyedStore`], a named, order-aware
//! mapping from string keys to values with explicit conflict and not-found
//! semantics. Higher layers (notably the provider registry in
//! `quiver-registry`) compose stores of stores; each instance can surface
//! domain-specific error types by injecting an [`ErrorHooks`] map of error
//! constructors at creation time, reusing the store logic unchanged.
//!
//! # Example
//!
//! ```
//! use quiver_store::{KeyedStore, StoreError};
//!
//! let mut store = KeyedStore::new("settings");
//! store.insert("theme", "dark").expect("fresh key");
//! assert_eq!(store.get("theme").expect("present"), &"dark");
//!
//! let err = store.insert("theme", "light").expect_err("conflict");
//! assert!(matches!(err, StoreError::ItemConflict { .. }));
//! ```

pub mod error;
pub mod store;

pub use self::error::{ErrorHooks, ErrorKind, StoreError};
pub use self::store::KeyedStore;
