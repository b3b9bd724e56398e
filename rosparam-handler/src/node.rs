use crate::names::{self, NameError};

/// Identity of the node hosting a parameter struct.
///
/// Holds the node's fully qualified private namespace (e.g. `/robot/planner`)
/// from which parameter keys are derived.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NodeIdentity {
    namespace: String,
    name: String,
}

impl NodeIdentity {
    /// Build the identity of node `name` living in `namespace`.
    pub fn new(name: &str, namespace: &str) -> Result<Self, NameError> {
        names::validate_node_name(name)?;
        names::validate_namespace(namespace)?;
        let parent = if namespace.starts_with('/') {
            namespace.to_owned()
        } else {
            format!("/{}", namespace)
        };
        Ok(Self {
            namespace: names::join(&parent, name),
            name: name.to_owned(),
        })
    }

    /// Build from a private namespace path such as `/robot/planner`.
    ///
    /// The node name is the last segment of the path.
    pub fn from_private_namespace(namespace: &str) -> Result<Self, NameError> {
        let namespace = namespace.strip_suffix('/').unwrap_or(namespace);
        names::validate_namespace(namespace)?;
        let name = names::node_name_from_namespace(namespace);
        names::validate_node_name(name)?;
        let namespace = if namespace.starts_with('/') {
            namespace.to_owned()
        } else {
            format!("/{}", namespace)
        };
        Ok(Self {
            name: name.to_owned(),
            namespace,
        })
    }

    /// The private namespace without trailing separator.
    pub fn namespace(&self) -> &str {
        &self.namespace
    }

    pub fn name(&self) -> &str {
        &self.name
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new() {
        let node = NodeIdentity::new("planner", "/robot").unwrap();
        assert_eq!(node.namespace(), "/robot/planner");
        assert_eq!(node.name(), "planner");

        let node = NodeIdentity::new("planner", "/").unwrap();
        assert_eq!(node.namespace(), "/planner");

        let node = NodeIdentity::new("planner", "robot").unwrap();
        assert_eq!(node.namespace(), "/robot/planner");

        assert!(matches!(
            NodeIdentity::new("planner", "/robot/"),
            Err(NameError::InvalidNamespace { .. })
        ));
        assert!(NodeIdentity::new("", "/robot").is_err());
    }

    #[test]
    fn test_from_private_namespace() {
        let node = NodeIdentity::from_private_namespace("/robot/planner/").unwrap();
        assert_eq!(node.namespace(), "/robot/planner");
        assert_eq!(node.name(), "planner");

        assert!(NodeIdentity::from_private_namespace("/").is_err());
    }
}
