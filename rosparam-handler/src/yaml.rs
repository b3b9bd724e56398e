//! YAML parameter file loading.
//!
//! Two layouts are understood. A plain document is loaded below a namespace,
//! nested mappings becoming nested keys:
//!
//! ```yaml
//! planner:
//!   rate: 10
//!   gains: {p: 1.0, d: 0.1}
//! ```
//!
//! A node-selector document applies `ros__parameters` blocks to the nodes
//! whose fully qualified name matches the selector (`/**` matches all nodes):
//!
//! ```yaml
//! /**:
//!   ros__parameters:
//!     verbosity: info
//! /robot/planner:
//!   ros__parameters:
//!     rate: 10
//! ```

use std::collections::BTreeMap;
use std::path::Path;

use serde_yaml::Value;

use crate::names;
use crate::node::NodeIdentity;
use crate::registry::Registry;
use crate::value::ParameterValue;
use crate::{Error, Result};

const PARAMETERS_KEY: &str = "ros__parameters";

/// Parse a plain YAML document into `(key, value)` pairs below `namespace`.
pub fn parse_parameters(yaml: &str, namespace: &str) -> Result<Vec<(String, ParameterValue)>> {
    let doc: Value = serde_yaml::from_str(yaml)?;
    let mapping = doc
        .as_mapping()
        .ok_or_else(|| Error::Yaml("YAML root must be a mapping".to_string()))?;

    let mut result = Vec::new();
    for (name, value) in mapping {
        let name = name
            .as_str()
            .ok_or_else(|| Error::Yaml("parameter names must be strings".to_string()))?;
        match yaml_value_to_parameter(value) {
            Some(value) => result.push((names::join(namespace, name), value)),
            None => tracing::warn!("Skipping parameter {} with unsupported value", name),
        }
    }
    Ok(result)
}

/// Parse a node-selector document and keep what applies to `node_fqn`.
///
/// Later selectors override earlier ones.
pub fn parse_node_parameters(yaml: &str, node_fqn: &str) -> Result<BTreeMap<String, ParameterValue>> {
    let doc: Value = serde_yaml::from_str(yaml)?;
    let mapping = doc
        .as_mapping()
        .ok_or_else(|| Error::Yaml("YAML root must be a mapping".to_string()))?;

    let mut result = BTreeMap::new();
    for (selector, node_val) in mapping {
        let selector = selector
            .as_str()
            .ok_or_else(|| Error::Yaml("node selectors must be strings".to_string()))?;
        if !matches_node(selector, node_fqn) {
            continue;
        }

        let node_map = node_val
            .as_mapping()
            .ok_or_else(|| Error::Yaml(format!("value for '{}' must be a mapping", selector)))?;
        let Some(params) = node_map.get(PARAMETERS_KEY) else {
            continue;
        };
        let params = params
            .as_mapping()
            .ok_or_else(|| Error::Yaml(format!("{} must be a mapping", PARAMETERS_KEY)))?;

        for (name, value) in params {
            let name = name
                .as_str()
                .ok_or_else(|| Error::Yaml("parameter names must be strings".to_string()))?;
            if let Some(value) = yaml_value_to_parameter(value) {
                result.insert(name.to_string(), value);
            }
        }
    }
    Ok(result)
}

/// Load a plain YAML document into `registry` below `namespace`.
pub fn load_into<R>(registry: &R, yaml: &str, namespace: &str) -> Result<usize>
where
    R: Registry + ?Sized,
{
    let params = parse_parameters(yaml, namespace)?;
    let count = params.len();
    for (key, value) in params {
        registry.set(&key, value)?;
    }
    Ok(count)
}

pub fn load_file<R>(registry: &R, path: &Path, namespace: &str) -> Result<usize>
where
    R: Registry + ?Sized,
{
    let content = std::fs::read_to_string(path)
        .map_err(|e| Error::Yaml(format!("failed to read {}: {}", path.display(), e)))?;
    load_into(registry, &content, namespace)
}

/// Load the `ros__parameters` applying to `node` into its private namespace.
pub fn load_for_node<R>(registry: &R, yaml: &str, node: &NodeIdentity) -> Result<usize>
where
    R: Registry + ?Sized,
{
    let params = parse_node_parameters(yaml, node.namespace())?;
    let count = params.len();
    for (name, value) in params {
        registry.set(&names::join(node.namespace(), &name), value)?;
    }
    Ok(count)
}

/// Selectors:
/// - `/**` matches any node
/// - `/ns/**` matches any node under `/ns/`
/// - `/ns/*` matches nodes directly in `/ns`
/// - `/ns/node` exact match
fn matches_node(selector: &str, node_fqn: &str) -> bool {
    if selector == "/**" || selector == "**" {
        return true;
    }

    if let Some(prefix) = selector.strip_suffix("/**") {
        return node_fqn.starts_with(&format!("{}/", prefix));
    }

    if let Some(prefix) = selector.strip_suffix("/*") {
        let Some(rest) = node_fqn.strip_prefix(&format!("{}/", prefix)) else {
            return false;
        };
        return !rest.is_empty() && !rest.contains('/');
    }

    selector == node_fqn
}

fn yaml_value_to_parameter(val: &Value) -> Option<ParameterValue> {
    match val {
        Value::Bool(b) => Some(ParameterValue::Bool(*b)),
        Value::Number(n) => n
            .as_i64()
            .map(ParameterValue::Integer)
            .or_else(|| n.as_f64().map(ParameterValue::Double)),
        Value::String(s) => Some(ParameterValue::String(s.clone())),
        Value::Sequence(seq) => seq
            .iter()
            .map(yaml_value_to_parameter)
            .collect::<Option<Vec<_>>>()
            .map(ParameterValue::List),
        Value::Mapping(map) => map
            .iter()
            .map(|(k, v)| Some((k.as_str()?.to_string(), yaml_value_to_parameter(v)?)))
            .collect::<Option<BTreeMap<_, _>>>()
            .map(ParameterValue::Map),
        Value::Tagged(tagged) => yaml_value_to_parameter(&tagged.value),
        Value::Null => None,
    }
}
