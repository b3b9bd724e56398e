//! Access to the external parameter registry.
//!
//! The registry is a hierarchical, `/`-separated key-value store. Setting a
//! mapping stores one leaf per entry, and reading a key that only exists as a
//! prefix of other keys assembles those leaves back into a mapping:
//!
//! ```text
//! set("/robot/gains", {p: 1.0, d: 0.1})
//!     /robot/gains/p = 1.0
//!     /robot/gains/d = 0.1
//! get("/robot/gains") == {d: 0.1, p: 1.0}
//! get("/robot/gains/p") == 1.0
//! ```
//!
//! Backends only have to store leaves; [`flatten`] and [`assemble`] do the
//! rest.

use std::collections::BTreeMap;

use crate::Result;
use crate::value::ParameterValue;

pub mod memory;
#[cfg(feature = "zenoh")]
pub mod zenoh;

pub use memory::MemoryRegistry;
#[cfg(feature = "zenoh")]
pub use self::zenoh::{ZenohRegistry, ZenohRegistryBuilder};

/// A synchronous handle on a parameter registry.
///
/// All calls block until the registry answered. Errors are transport errors;
/// an absent key is `Ok(None)` / `Ok(false)`.
pub trait Registry {
    fn get(&self, key: &str) -> Result<Option<ParameterValue>>;

    fn set(&self, key: &str, value: ParameterValue) -> Result<()>;

    /// Remove a key and everything below it. Returns whether anything was removed.
    fn delete(&self, key: &str) -> Result<bool>;

    /// Leaf keys at or below `prefix`, sorted.
    fn keys(&self, prefix: &str) -> Result<Vec<String>>;

    fn has(&self, key: &str) -> Result<bool> {
        Ok(self.get(key)?.is_some())
    }
}

impl<R: Registry + ?Sized> Registry for &R {
    fn get(&self, key: &str) -> Result<Option<ParameterValue>> {
        (**self).get(key)
    }

    fn set(&self, key: &str, value: ParameterValue) -> Result<()> {
        (**self).set(key, value)
    }

    fn delete(&self, key: &str) -> Result<bool> {
        (**self).delete(key)
    }

    fn keys(&self, prefix: &str) -> Result<Vec<String>> {
        (**self).keys(prefix)
    }

    fn has(&self, key: &str) -> Result<bool> {
        (**self).has(key)
    }
}

/// Strip a trailing separator; the empty key is the root.
pub(crate) fn normalize(key: &str) -> &str {
    if key.is_empty() || key == "/" {
        return "/";
    }
    key.strip_suffix('/').unwrap_or(key)
}

/// The prefix every key strictly below `key` starts with.
pub(crate) fn subtree_prefix(key: &str) -> String {
    let key = normalize(key);
    if key == "/" {
        key.to_owned()
    } else {
        format!("{}/", key)
    }
}

/// Whether `candidate` is `key` itself or lies below it.
pub(crate) fn is_under(candidate: &str, key: &str) -> bool {
    let key = normalize(key);
    key == "/" || candidate == key || candidate.starts_with(&subtree_prefix(key))
}

/// Split a value into the leaves a backend stores.
///
/// Non-empty mappings are expanded into one leaf per entry; everything else,
/// including an empty mapping, is a single leaf.
pub fn flatten(key: &str, value: ParameterValue) -> Vec<(String, ParameterValue)> {
    let mut leaves = Vec::new();
    flatten_into(normalize(key), value, &mut leaves);
    leaves
}

fn flatten_into(key: &str, value: ParameterValue, out: &mut Vec<(String, ParameterValue)>) {
    match value {
        ParameterValue::Map(entries) if !entries.is_empty() => {
            for (name, value) in entries {
                flatten_into(&crate::names::join(key, &name), value, out);
            }
        }
        value => out.push((key.to_owned(), value)),
    }
}

/// Rebuild the value stored at `key` from a set of leaves.
///
/// An exact leaf wins. Otherwise the leaves below `key` are nested back into
/// a mapping; `None` when there are none.
pub fn assemble<'a, I>(key: &str, leaves: I) -> Option<ParameterValue>
where
    I: IntoIterator<Item = (&'a str, &'a ParameterValue)>,
{
    let key = normalize(key);
    let prefix = subtree_prefix(key);
    let mut tree = BTreeMap::new();
    let mut found = false;

    for (leaf_key, value) in leaves {
        if leaf_key == key {
            return Some(value.clone());
        }
        let Some(rest) = leaf_key.strip_prefix(&prefix) else {
            continue;
        };
        let segments: Vec<&str> = rest.split('/').filter(|s| !s.is_empty()).collect();
        if segments.is_empty() {
            continue;
        }
        insert_path(&mut tree, &segments, value.clone());
        found = true;
    }

    found.then_some(ParameterValue::Map(tree))
}

fn insert_path(
    tree: &mut BTreeMap<String, ParameterValue>,
    segments: &[&str],
    value: ParameterValue,
) {
    let [head, tail @ ..] = segments else {
        return;
    };
    if tail.is_empty() {
        tree.insert((*head).to_owned(), value);
        return;
    }
    let child = tree
        .entry((*head).to_owned())
        .or_insert_with(|| ParameterValue::Map(BTreeMap::new()));
    if !matches!(child, ParameterValue::Map(_)) {
        *child = ParameterValue::Map(BTreeMap::new());
    }
    if let ParameterValue::Map(child) = child {
        insert_path(child, tail, value);
    }
}
