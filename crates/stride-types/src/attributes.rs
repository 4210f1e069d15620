//! Typed attribute descriptors and immutable attribute stores
//!
//! An `AttributeStore` is the single state carrier of a step. Values are stored
//! type-erased and recovered through an `AttributeDescriptor<V>`, which carries
//! the key, nullability, default value and a normalizer applied on every write
//! and every read. Stores are never mutated: every write returns a new store
//! that shares unrelated entries with its parent.

use crate::error::AttributeError;
use std::any::Any;
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

type AttributeValue = Arc<dyn Any + Send + Sync>;

fn identity<V>(value: V) -> V {
    value
}

/// Typed key into an `AttributeStore`
pub struct AttributeDescriptor<V> {
    key: &'static str,
    nullable: bool,
    default: Option<V>,
    normalize: fn(V) -> V,
}

impl<V> AttributeDescriptor<V>
where
    V: Clone + Send + Sync + 'static,
{
    /// Non-nullable descriptor; reads always produce a value
    pub fn required(key: &'static str, default: V) -> Self {
        Self {
            key,
            nullable: false,
            default: Some(default),
            normalize: identity::<V>,
        }
    }

    /// Nullable descriptor without a default value
    pub fn optional(key: &'static str) -> Self {
        Self {
            key,
            nullable: true,
            default: None,
            normalize: identity::<V>,
        }
    }

    /// Validating constructor
    pub fn new(key: &'static str, nullable: bool, default: Option<V>) -> Result<Self, AttributeError> {
        if !nullable && default.is_none() {
            return Err(AttributeError::MissingDefault { key });
        }

        Ok(Self {
            key,
            nullable,
            default,
            normalize: identity::<V>,
        })
    }

    /// Attach a normalizer. It must be idempotent.
    pub fn with_normalize(mut self, normalize: fn(V) -> V) -> Self {
        self.normalize = normalize;
        self
    }

    /// Stable, namespaced key
    pub fn key(&self) -> &'static str {
        self.key
    }

    /// Whether reads may produce no value
    pub fn is_nullable(&self) -> bool {
        self.nullable
    }

    /// Normalized default value
    pub fn default_value(&self) -> Option<V> {
        self.default.clone().map(self.normalize)
    }

    /// Apply the normalizer to a value
    pub fn normalize(&self, value: V) -> V {
        (self.normalize)(value)
    }

    /// Type-erased entry for batch writes through `AttributeStore::with_entries`
    pub fn entry(&self, value: V) -> AttributeEntry {
        AttributeEntry {
            key: self.key,
            value: Arc::new(self.normalize(value)),
        }
    }
}

impl<V: Clone> Clone for AttributeDescriptor<V> {
    fn clone(&self) -> Self {
        Self {
            key: self.key,
            nullable: self.nullable,
            default: self.default.clone(),
            normalize: self.normalize,
        }
    }
}

impl<V: fmt::Debug> fmt::Debug for AttributeDescriptor<V> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AttributeDescriptor")
            .field("key", &self.key)
            .field("nullable", &self.nullable)
            .field("default", &self.default)
            .finish()
    }
}

/// A normalized, type-erased attribute value bound to its key
#[derive(Clone)]
pub struct AttributeEntry {
    key: &'static str,
    value: AttributeValue,
}

impl AttributeEntry {
    /// Key of the entry
    pub fn key(&self) -> &'static str {
        self.key
    }
}

impl fmt::Debug for AttributeEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AttributeEntry").field("key", &self.key).finish()
    }
}

/// Immutable typed key/value bag describing a step
#[derive(Clone, Default)]
pub struct AttributeStore {
    entries: Arc<HashMap<&'static str, AttributeValue>>,
}

impl AttributeStore {
    /// Create an empty store
    pub fn new() -> Self {
        Self::default()
    }

    /// Read an attribute
    ///
    /// Returns the stored value, or the descriptor default when the key is
    /// absent or holds a value of another type. Both paths go through the
    /// descriptor's normalizer.
    pub fn get<V>(&self, descriptor: &AttributeDescriptor<V>) -> Option<V>
    where
        V: Clone + Send + Sync + 'static,
    {
        let stored = self
            .entries
            .get(descriptor.key)
            .and_then(|value| (**value).downcast_ref::<V>())
            .cloned();

        stored
            .or_else(|| descriptor.default.clone())
            .map(descriptor.normalize)
    }

    /// Read an attribute, falling back to `fallback` when absent
    pub fn get_or<V>(&self, descriptor: &AttributeDescriptor<V>, fallback: V) -> V
    where
        V: Clone + Send + Sync + 'static,
    {
        self.get(descriptor).unwrap_or(fallback)
    }

    /// Return a new store with `value` written under `descriptor`
    pub fn with<V>(&self, descriptor: &AttributeDescriptor<V>, value: V) -> Self
    where
        V: Clone + Send + Sync + 'static,
    {
        self.with_entries([descriptor.entry(value)])
    }

    /// Return a new store with every entry written; later entries win on equal keys
    pub fn with_entries<I>(&self, entries: I) -> Self
    where
        I: IntoIterator<Item = AttributeEntry>,
    {
        let mut map = (*self.entries).clone();
        for entry in entries {
            map.insert(entry.key, entry.value);
        }

        Self {
            entries: Arc::new(map),
        }
    }

    /// Return a new store without an explicit value for `descriptor`
    pub fn without<V>(&self, descriptor: &AttributeDescriptor<V>) -> Self {
        if !self.entries.contains_key(descriptor.key) {
            return self.clone();
        }

        let mut map = (*self.entries).clone();
        map.remove(descriptor.key);
        Self {
            entries: Arc::new(map),
        }
    }

    /// Check if an explicit value is stored for `descriptor`
    pub fn contains<V>(&self, descriptor: &AttributeDescriptor<V>) -> bool {
        self.entries.contains_key(descriptor.key)
    }

    /// Number of explicitly stored entries
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Check if no entry is stored
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Stored keys, sorted
    pub fn keys(&self) -> Vec<&'static str> {
        let mut keys: Vec<_> = self.entries.keys().copied().collect();
        keys.sort_unstable();
        keys
    }

    /// Check whether two stores share the same underlying value for `key`
    pub fn shares_entry(&self, other: &AttributeStore, key: &str) -> bool {
        match (self.entries.get(key), other.entries.get(key)) {
            (Some(a), Some(b)) => Arc::ptr_eq(a, b),
            _ => false,
        }
    }
}

impl fmt::Debug for AttributeStore {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AttributeStore")
            .field("keys", &self.keys())
            .finish()
    }
}
