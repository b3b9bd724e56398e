//! In-process parameter registry.

use std::collections::BTreeMap;
use std::sync::Arc;

use parking_lot::RwLock;

use super::{Registry, assemble, flatten, is_under, normalize};
use crate::Result;
use crate::value::ParameterValue;

/// A registry held in memory.
///
/// Cloning yields another handle on the same store, so one registry can be
/// shared by every parameter struct of a process, or seeded by a test and
/// inspected afterwards.
#[derive(Debug, Clone, Default)]
pub struct MemoryRegistry {
    leaves: Arc<RwLock<BTreeMap<String, ParameterValue>>>,
}

impl MemoryRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a registry pre-populated with the given entries.
    pub fn with_entries<I, K, V>(entries: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: AsRef<str>,
        V: Into<ParameterValue>,
    {
        let registry = Self::new();
        for (key, value) in entries {
            registry.insert(key.as_ref(), value.into());
        }
        registry
    }

    pub fn len(&self) -> usize {
        self.leaves.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.leaves.read().is_empty()
    }

    fn insert(&self, key: &str, value: ParameterValue) {
        let mut leaves = self.leaves.write();
        leaves.retain(|k, _| !is_under(k, key));
        leaves.extend(flatten(key, value));
    }
}

impl Registry for MemoryRegistry {
    fn get(&self, key: &str) -> Result<Option<ParameterValue>> {
        let leaves = self.leaves.read();
        Ok(assemble(
            key,
            leaves.iter().map(|(k, v)| (k.as_str(), v)),
        ))
    }

    fn set(&self, key: &str, value: ParameterValue) -> Result<()> {
        tracing::trace!(key, %value, "set");
        self.insert(key, value);
        Ok(())
    }

    fn delete(&self, key: &str) -> Result<bool> {
        let mut leaves = self.leaves.write();
        let before = leaves.len();
        leaves.retain(|k, _| !is_under(k, key));
        Ok(leaves.len() != before)
    }

    fn keys(&self, prefix: &str) -> Result<Vec<String>> {
        let prefix = normalize(prefix);
        Ok(self
            .leaves
            .read()
            .keys()
            .filter(|k| is_under(k, prefix))
            .cloned()
            .collect())
    }

    fn has(&self, key: &str) -> Result<bool> {
        let leaves = self.leaves.read();
        Ok(leaves.keys().any(|k| is_under(k, key)))
    }
}
