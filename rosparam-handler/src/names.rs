//! Namespace and node-name rules, and key joining.

/// A namespace or node name that does not follow the naming rules.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum NameError {
    #[error("invalid namespace '{namespace}': {reason}")]
    InvalidNamespace { namespace: String, reason: String },

    #[error("invalid node name '{0}'")]
    InvalidNodeName(String),
}

/// A letter or underscore, then letters, digits or underscores.
fn is_valid_component(component: &str) -> bool {
    let mut chars = component.chars();
    chars
        .next()
        .is_some_and(|c| c.is_ascii_alphabetic() || c == '_')
        && chars.all(|c| c.is_ascii_alphanumeric() || c == '_')
}

/// Accepts `""`, `"/"` and `/`-separated valid components without a
/// trailing separator.
pub fn validate_namespace(namespace: &str) -> Result<(), NameError> {
    let invalid = |reason: String| NameError::InvalidNamespace {
        namespace: namespace.to_owned(),
        reason,
    };
    if namespace.is_empty() || namespace == "/" {
        return Ok(());
    }
    if namespace.ends_with('/') {
        return Err(invalid("trailing '/'".to_owned()));
    }
    let body = namespace.strip_prefix('/').unwrap_or(namespace);
    match body.split('/').find(|part| !is_valid_component(part)) {
        Some(part) => Err(invalid(format!("bad segment '{}'", part))),
        None => Ok(()),
    }
}

pub fn validate_node_name(node_name: &str) -> Result<(), NameError> {
    if is_valid_component(node_name) {
        Ok(())
    } else {
        Err(NameError::InvalidNodeName(node_name.to_owned()))
    }
}

/// The last segment of a namespace path.
///
/// ```
/// use rosparam_handler::names::node_name_from_namespace;
///
/// assert_eq!(node_name_from_namespace("/robot/planner"), "planner");
/// assert_eq!(node_name_from_namespace("/"), "");
/// ```
pub fn node_name_from_namespace(namespace: &str) -> &str {
    namespace
        .trim_end_matches('/')
        .rsplit('/')
        .next()
        .unwrap_or_default()
}

/// Join a namespace and a relative key with exactly one separator.
///
/// ```
/// use rosparam_handler::names::join;
///
/// assert_eq!(join("/robot", "planner"), "/robot/planner");
/// assert_eq!(join("/", "/rate"), "/rate");
/// ```
pub fn join(namespace: &str, key: &str) -> String {
    let key = key.trim_start_matches('/');
    if namespace.ends_with('/') {
        format!("{}{}", namespace, key)
    } else {
        format!("{}/{}", namespace, key)
    }
}
