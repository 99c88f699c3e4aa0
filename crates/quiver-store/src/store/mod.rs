//! Named keyed storage with injectable failure types.
//!
//! [`KeyedStore`] is a mapping from string keys to values that remembers
//! insertion order and enforces explicit conflict semantics: writing a key
//! that already holds a *different* value fails unless the caller uses
//! [`KeyedStore::replace`], while re-inserting an equal value is always
//! permitted. Lookups and removals of absent keys fail through the store's
//! [`ErrorHooks`], with [`KeyedStore::try_get`] and [`KeyedStore::take`] as
//! the suppressed forms that report absence as `None` instead.

use std::collections::HashMap;

use crate::error::{ErrorHooks, StoreError};

/// A named, insertion-ordered mapping from string keys to values.
///
/// The error type `E` is chosen per instance through [`ErrorHooks`];
/// [`KeyedStore::new`] wires the default [`StoreError`] hooks.
///
/// # Example
///
/// ```
/// use quiver_store::KeyedStore;
///
/// let mut store = KeyedStore::new("caches");
/// store.insert("memory", 128).expect("fresh key");
/// store.insert("disk", 4096).expect("fresh key");
///
/// let keys: Vec<&str> = store.keys().collect();
/// assert_eq!(keys, ["memory", "disk"]);
/// ```
#[derive(Debug)]
pub struct KeyedStore<T, E = StoreError> {
    name: String,
    keys: Vec<String>,
    items: HashMap<String, T>,
    hooks: ErrorHooks<E>,
}

impl<T: Clone, E> Clone for KeyedStore<T, E> {
    fn clone(&self) -> Self {
        Self {
            name: self.name.clone(),
            keys: self.keys.clone(),
            items: self.items.clone(),
            hooks: self.hooks,
        }
    }
}

impl<T> KeyedStore<T, StoreError> {
    /// Creates an empty store with the default error hooks.
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self::with_hooks(name, ErrorHooks::default())
    }
}

impl<T, E> KeyedStore<T, E> {
    /// Creates an empty store that raises errors built by `hooks`.
    #[must_use]
    pub fn with_hooks(name: impl Into<String>, hooks: ErrorHooks<E>) -> Self {
        Self {
            name: name.into(),
            keys: Vec::new(),
            items: HashMap::new(),
            hooks,
        }
    }

    /// Returns the name of this store.
    #[must_use]
    pub const fn name(&self) -> &str {
        self.name.as_str()
    }

    /// Returns the number of stored items.
    #[must_use]
    pub const fn len(&self) -> usize {
        self.keys.len()
    }

    /// Returns `true` when the store holds no items.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.keys.is_empty()
    }

    /// Returns `true` when an item with the given key is present.
    #[must_use]
    pub fn contains(&self, key: &str) -> bool {
        self.items.contains_key(key)
    }

    /// Returns the stored keys in insertion order.
    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.keys.iter().map(String::as_str)
    }

    /// Returns the stored values in insertion order.
    pub fn values(&self) -> impl Iterator<Item = &T> {
        self.keys.iter().filter_map(|key| self.items.get(key))
    }

    /// Returns `(key, value)` pairs in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &T)> {
        self.keys
            .iter()
            .filter_map(|key| self.items.get(key).map(|value| (key.as_str(), value)))
    }

    /// Returns the value stored under `key`.
    ///
    /// # Errors
    ///
    /// Fails through the store's `not_found` hook when the key is absent.
    pub fn get(&self, key: &str) -> Result<&T, E> {
        self.items
            .get(key)
            .ok_or_else(|| (self.hooks.not_found)(key, &self.name))
    }

    /// Returns a mutable reference to the value stored under `key`.
    ///
    /// # Errors
    ///
    /// Fails through the store's `not_found` hook when the key is absent.
    pub fn get_mut(&mut self, key: &str) -> Result<&mut T, E> {
        self.items
            .get_mut(key)
            .ok_or_else(|| (self.hooks.not_found)(key, &self.name))
    }

    /// Returns the value stored under `key`, or `None` when absent.
    ///
    /// This is the suppressed form of [`KeyedStore::get`]: absence is not an
    /// error.
    #[must_use]
    pub fn try_get(&self, key: &str) -> Option<&T> {
        self.items.get(key)
    }

    /// Writes `value` under `key` unconditionally, overwriting any existing
    /// value.
    pub fn replace(&mut self, key: impl Into<String>, value: T) {
        let owned = key.into();
        if !self.items.contains_key(&owned) {
            self.keys.push(owned.clone());
        }
        self.items.insert(owned, value);
    }

    /// Removes and returns the value stored under `key`.
    ///
    /// # Errors
    ///
    /// Fails through the store's `not_found` hook when the key is absent.
    pub fn remove(&mut self, key: &str) -> Result<T, E> {
        self.take(key)
            .ok_or_else(|| (self.hooks.not_found)(key, &self.name))
    }

    /// Removes and returns the value stored under `key`, or `None` when
    /// absent.
    ///
    /// This is the suppressed form of [`KeyedStore::remove`]: removing an
    /// absent key is a no-op.
    pub fn take(&mut self, key: &str) -> Option<T> {
        let value = self.items.remove(key)?;
        self.keys.retain(|stored| stored.as_str() != key);
        Some(value)
    }

    /// Removes all items from the store.
    pub fn clear(&mut self) {
        self.keys.clear();
        self.items.clear();
    }
}

impl<T: PartialEq, E> KeyedStore<T, E> {
    /// Writes `value` under `key`, rejecting conflicting overwrites.
    ///
    /// Re-inserting a value equal to the one already stored is not a
    /// conflict and the write proceeds.
    ///
    /// # Errors
    ///
    /// Fails through the store's `conflict` hook when the key already holds
    /// a different value.
    pub fn insert(&mut self, key: impl Into<String>, value: T) -> Result<(), E> {
        let owned = key.into();
        if self.items.get(&owned).is_some_and(|existing| *existing != value) {
            return Err((self.hooks.conflict)(&owned, &self.name));
        }
        self.replace(owned, value);
        Ok(())
    }
}
