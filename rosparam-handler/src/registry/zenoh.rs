//! Registry client for parameters hosted in a zenoh storage.
//!
//! Each leaf is a zenoh key under a common prefix, its payload the JSON
//! encoding of the [`ParameterValue`]. The storage itself (e.g. a zenohd
//! router with the storage manager plugin) is external; this module only
//! queries and puts.
//!
//! ```text
//! /robot/planner/rate  <->  rosparam/robot/planner/rate = 10
//! ```

use std::path::PathBuf;
use std::time::Duration;

use zenoh::{Session, Wait, sample::SampleKind};

use super::{Registry, assemble, flatten, normalize};
use crate::value::ParameterValue;
use crate::{Error, Result};

pub const DEFAULT_KEY_PREFIX: &str = "rosparam";
pub const DEFAULT_QUERY_TIMEOUT: Duration = Duration::from_secs(2);

pub struct ZenohRegistryBuilder {
    config_file: Option<PathBuf>,
    session: Option<Session>,
    key_prefix: String,
    timeout: Duration,
}

impl Default for ZenohRegistryBuilder {
    fn default() -> Self {
        Self {
            config_file: None,
            session: None,
            key_prefix: DEFAULT_KEY_PREFIX.to_owned(),
            timeout: DEFAULT_QUERY_TIMEOUT,
        }
    }
}

impl ZenohRegistryBuilder {
    /// Load the zenoh configuration from a file instead of using the default.
    pub fn with_config_file<P: Into<PathBuf>>(mut self, path: P) -> Self {
        self.config_file = Some(path.into());
        self
    }

    /// Reuse an already opened session.
    pub fn with_session(mut self, session: Session) -> Self {
        self.session = Some(session);
        self
    }

    /// Key expression prefix all parameters live under.
    pub fn with_key_prefix<S: Into<String>>(mut self, prefix: S) -> Self {
        self.key_prefix = prefix.into().trim_matches('/').to_owned();
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }
}

impl crate::Builder for ZenohRegistryBuilder {
    type Output = ZenohRegistry;

    fn build(self) -> Result<ZenohRegistry> {
        let session = match self.session {
            Some(session) => session,
            None => {
                let config = match &self.config_file {
                    Some(path) => zenoh::Config::from_file(path)?,
                    None => zenoh::Config::default(),
                };
                zenoh::open(config).wait()?
            }
        };
        tracing::debug!(prefix = %self.key_prefix, "opened zenoh parameter registry");
        Ok(ZenohRegistry {
            session,
            key_prefix: self.key_prefix,
            timeout: self.timeout,
        })
    }
}

pub struct ZenohRegistry {
    session: Session,
    key_prefix: String,
    timeout: Duration,
}

impl ZenohRegistry {
    pub fn builder() -> ZenohRegistryBuilder {
        ZenohRegistryBuilder::default()
    }

    pub fn session(&self) -> &Session {
        &self.session
    }

    fn key_expr(&self, key: &str) -> String {
        to_key_expr(&self.key_prefix, key)
    }

    fn registry_key(&self, key_expr: &str) -> Option<String> {
        from_key_expr(&self.key_prefix, key_expr)
    }

    /// Fetch every leaf at or below `key`.
    fn query(&self, key: &str) -> Result<Vec<(String, ParameterValue)>> {
        let selector = format!("{}/**", self.key_expr(key));
        let replies = self
            .session
            .get(selector.as_str())
            .timeout(self.timeout)
            .wait()?;

        let mut leaves = Vec::new();
        while let Ok(reply) = replies.recv() {
            let sample = match reply.result() {
                Ok(sample) => sample,
                Err(err) => {
                    tracing::warn!(%selector, "registry query error: {:?}", err);
                    continue;
                }
            };
            if sample.kind() != SampleKind::Put {
                continue;
            }
            let Some(leaf_key) = self.registry_key(sample.key_expr().as_str()) else {
                continue;
            };
            let bytes = sample.payload().to_bytes();
            match serde_json::from_slice::<ParameterValue>(&bytes) {
                Ok(value) => leaves.push((leaf_key, value)),
                Err(e) => {
                    tracing::warn!(key = %leaf_key, "skipping undecodable parameter: {}", e)
                }
            }
        }
        leaves.sort_by(|a, b| a.0.cmp(&b.0));
        leaves.dedup_by(|a, b| a.0 == b.0);
        Ok(leaves)
    }
}

impl Registry for ZenohRegistry {
    fn get(&self, key: &str) -> Result<Option<ParameterValue>> {
        let leaves = self.query(key)?;
        Ok(assemble(key, leaves.iter().map(|(k, v)| (k.as_str(), v))))
    }

    fn set(&self, key: &str, value: ParameterValue) -> Result<()> {
        self.delete(key)?;
        for (leaf_key, value) in flatten(key, value) {
            let payload =
                serde_json::to_vec(&value).map_err(|e| Error::Registry(e.to_string()))?;
            self.session
                .put(self.key_expr(&leaf_key).as_str(), payload)
                .wait()?;
        }
        Ok(())
    }

    fn delete(&self, key: &str) -> Result<bool> {
        let existed = !self.query(key)?.is_empty();
        if existed {
            let selector = format!("{}/**", self.key_expr(key));
            self.session.delete(selector.as_str()).wait()?;
        }
        Ok(existed)
    }

    fn keys(&self, prefix: &str) -> Result<Vec<String>> {
        Ok(self.query(prefix)?.into_iter().map(|(k, _)| k).collect())
    }
}

/// Map a registry key onto a zenoh key expression.
fn to_key_expr(prefix: &str, key: &str) -> String {
    let key = normalize(key).trim_start_matches('/');
    if key.is_empty() {
        prefix.to_owned()
    } else {
        format!("{}/{}", prefix, key)
    }
}

/// Map a zenoh key expression back onto a registry key.
fn from_key_expr(prefix: &str, key_expr: &str) -> Option<String> {
    let rest = key_expr.strip_prefix(prefix)?;
    if rest.is_empty() {
        Some("/".to_owned())
    } else {
        rest.starts_with('/').then(|| rest.to_owned())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_key_mapping() {
        assert_eq!(to_key_expr("rosparam", "/robot/rate"), "rosparam/robot/rate");
        assert_eq!(to_key_expr("rosparam", "/robot/"), "rosparam/robot");
        assert_eq!(to_key_expr("rosparam", "/"), "rosparam");

        assert_eq!(
            from_key_expr("rosparam", "rosparam/robot/rate").as_deref(),
            Some("/robot/rate")
        );
        assert_eq!(from_key_expr("rosparam", "rosparam").as_deref(), Some("/"));
        assert_eq!(from_key_expr("rosparam", "rosparamx/rate"), None);
        assert_eq!(from_key_expr("rosparam", "other/rate"), None);
    }
}
