//! Declarative provider manifests and their shape classification.
//!
//! A manifest maps a provider-type name to one of four declarative shapes:
//!
//! 1. a single-element list naming a provider, `["sqlite"]`;
//! 2. a two-element list pairing a name with a config object,
//!    `["sqlite", {"path": "/tmp/x"}]`;
//! 3. a list whose every element is shape 1 or 2; or
//! 4. a bare config object, where the manifest key itself names the
//!    provider.
//!
//! [`ManifestEntry::classify`] is the tagged-union parser for these shapes,
//! applied in exactly that precedence order. List shapes are checked before
//! the config-only shape, so a list value can never be mistaken for a
//! config object. Anything else is an [`RegistryError::InvalidParameter`]
//! naming the offending manifest key.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::RegistryError;
use crate::provider::ProviderConfig;

/// A reference to one provider within a manifest entry.
#[derive(Debug, Clone, PartialEq)]
pub enum ProviderRef {
    /// The provider by name, with no config.
    Name(String),
    /// The provider by name, with the config to capture at registration.
    NameWithConfig(String, ProviderConfig),
}

impl ProviderRef {
    /// Classifies a JSON value as a provider reference, if it is one.
    ///
    /// A reference is a one-element list holding a string, or a two-element
    /// list holding a string and a config object.
    #[must_use]
    pub fn classify(value: &Value) -> Option<Self> {
        let Value::Array(items) = value else {
            return None;
        };
        match items.as_slice() {
            [Value::String(name)] => Some(Self::Name(name.clone())),
            [Value::String(name), Value::Object(config)] => {
                Some(Self::NameWithConfig(name.clone(), config.clone()))
            }
            _ => None,
        }
    }

    /// Returns the referenced provider name.
    #[must_use]
    pub fn name(&self) -> &str {
        match self {
            Self::Name(name) | Self::NameWithConfig(name, _) => name,
        }
    }

    /// Splits the reference into its name and optional config.
    #[must_use]
    pub fn into_parts(self) -> (String, Option<ProviderConfig>) {
        match self {
            Self::Name(name) => (name, None),
            Self::NameWithConfig(name, config) => (name, Some(config)),
        }
    }
}

/// A classified manifest entry.
#[derive(Debug, Clone, PartialEq)]
pub enum ManifestEntry {
    /// One provider reference (shapes 1 and 2).
    Single(ProviderRef),
    /// A list of provider references (shape 3). May be empty, in which case
    /// the entry registers nothing.
    Many(Vec<ProviderRef>),
    /// A bare config object (shape 4); the manifest key doubles as the
    /// provider name.
    ConfigOnly(ProviderConfig),
}

impl ManifestEntry {
    /// Classifies the value stored under `key` in a manifest.
    ///
    /// # Errors
    ///
    /// Returns [`RegistryError::InvalidParameter`] naming `key` when the
    /// value matches none of the four declarative shapes.
    pub fn classify(key: &str, value: &Value) -> Result<Self, RegistryError> {
        if let Some(reference) = ProviderRef::classify(value) {
            return Ok(Self::Single(reference));
        }
        if let Value::Array(items) = value {
            let references: Option<Vec<ProviderRef>> =
                items.iter().map(ProviderRef::classify).collect();
            return references.map_or_else(
                || Err(unrecognised_shape(key)),
                |entries| Ok(Self::Many(entries)),
            );
        }
        if let Value::Object(config) = value {
            return Ok(Self::ConfigOnly(config.clone()));
        }
        Err(unrecognised_shape(key))
    }
}

fn unrecognised_shape(key: &str) -> RegistryError {
    RegistryError::InvalidParameter {
        name: key.to_owned(),
        message: "manifest value has an unrecognised shape".to_owned(),
    }
}

/// A declarative manifest: an ordered mapping from provider-type name to a
/// value in one of the four shapes.
///
/// The wrapper is `serde(transparent)`, so a manifest deserializes straight
/// from the JSON object of a configuration document and keeps its key
/// order.
///
/// # Example
///
/// ```
/// use quiver_registry::Manifest;
/// use serde_json::json;
///
/// let manifest = Manifest::from_value(json!({
///     "db": ["sqlite", {"path": "/tmp/x"}],
///     "logger": ["console"],
/// }))
/// .expect("object manifest");
/// assert_eq!(manifest.len(), 2);
///
/// let keys: Vec<&str> = manifest.iter().map(|(key, _)| key).collect();
/// assert_eq!(keys, ["db", "logger"]);
/// ```
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Manifest {
    entries: serde_json::Map<String, Value>,
}

impl Manifest {
    /// Creates an empty manifest.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Interprets a JSON value as a manifest.
    ///
    /// # Errors
    ///
    /// Returns [`RegistryError::InvalidParameter`] when the value is not an
    /// object.
    pub fn from_value(value: Value) -> Result<Self, RegistryError> {
        match value {
            Value::Object(entries) => Ok(Self { entries }),
            other => Err(RegistryError::InvalidParameter {
                name: "manifest".to_owned(),
                message: format!("expected an object, got {other}"),
            }),
        }
    }

    /// Adds (or replaces) an entry, keeping insertion order.
    pub fn insert(&mut self, key: impl Into<String>, value: Value) -> &mut Self {
        self.entries.insert(key.into(), value);
        self
    }

    /// Returns `(key, value)` pairs in declaration order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &Value)> {
        self.entries.iter().map(|(key, value)| (key.as_str(), value))
    }

    /// Returns the number of top-level entries.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns `true` when the manifest has no entries.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl From<serde_json::Map<String, Value>> for Manifest {
    fn from(entries: serde_json::Map<String, Value>) -> Self {
        Self { entries }
    }
}
