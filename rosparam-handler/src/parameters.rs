//! The contract generated parameter structs implement.
//!
//! A parameter struct is a flat set of typed slots. Each slot is described by
//! a [`SlotSpec`]: its name, registry type, optional default, bounds and
//! flags. Loading walks every slot through a [`ParamLoader`], which reads the
//! registry, applies defaults and bounds, and collects every failure into a
//! single [`LoadReport`] instead of stopping at the first one.
//!
//! Structs are normally declared with [`parameters!`](crate::parameters!).

use std::fmt;

use crate::accessor::{self, DefaultWriteBack};
use crate::bounds::Bounds;
use crate::node::NodeIdentity;
use crate::reconfigure::ReconfigureConfig;
use crate::registry::Registry;
use crate::value::{Param, ParameterType, ParameterValue};
use crate::{Error, Result};

/// Declaration of one slot of a parameter struct.
#[derive(Debug, Clone, PartialEq)]
pub struct SlotSpec {
    pub name: &'static str,
    pub param_type: ParameterType,
    pub description: String,
    /// `None` makes the slot mandatory.
    pub default: Option<ParameterValue>,
    pub bounds: Bounds,
    /// Fixed at declaration; never read from the registry.
    pub constant: bool,
    /// Updated by reconfiguration events.
    pub configurable: bool,
    /// Resolved against the global namespace instead of the node's.
    pub global: bool,
}

impl SlotSpec {
    pub fn new(name: &'static str, param_type: ParameterType) -> Self {
        Self {
            name,
            param_type,
            description: String::new(),
            default: None,
            bounds: Bounds::default(),
            constant: false,
            configurable: false,
            global: false,
        }
    }

    /// Append a line of description.
    pub fn describe(mut self, line: &str) -> Self {
        let line = line.trim();
        if !line.is_empty() {
            if !self.description.is_empty() {
                self.description.push(' ');
            }
            self.description.push_str(line);
        }
        self
    }

    pub fn default_value<T: Param>(mut self, value: T) -> Self {
        self.default = Some(value.to_value());
        self
    }

    pub fn min(mut self, min: impl Into<ParameterValue>) -> Self {
        self.bounds.min = Some(min.into());
        self
    }

    pub fn max(mut self, max: impl Into<ParameterValue>) -> Self {
        self.bounds.max = Some(max.into());
        self
    }

    pub fn constant(mut self) -> Self {
        self.constant = true;
        self
    }

    pub fn configurable(mut self) -> Self {
        self.configurable = true;
        self
    }

    pub fn global(mut self) -> Self {
        self.global = true;
        self
    }

    pub fn is_mandatory(&self) -> bool {
        self.default.is_none()
    }

    /// The declared default converted to `T`.
    pub fn default_as<T: Param>(&self) -> Option<T> {
        self.default.as_ref().and_then(T::from_value)
    }
}

/// Conversion of a declared default into the slot's Rust type.
///
/// Lets `count: u32 = 5` infer the literal as `u32` and `name: String = "x"`
/// accept a string literal.
pub trait SlotDefault<T> {
    fn into_slot(self) -> T;
}

impl<T> SlotDefault<T> for T {
    fn into_slot(self) -> T {
        self
    }
}

impl SlotDefault<String> for &str {
    fn into_slot(self) -> String {
        self.to_owned()
    }
}

/// Namespaces derived once from the hosting node.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParametersBase {
    /// Node namespace with trailing separator, e.g. `/robot/planner/`.
    pub private_namespace: String,
    /// Last segment of the node namespace, e.g. `planner`.
    pub node_name: String,
    pub global_namespace: String,
}

impl ParametersBase {
    pub fn new(node: &NodeIdentity) -> Self {
        Self {
            private_namespace: format!("{}/", node.namespace()),
            node_name: node.name().to_owned(),
            global_namespace: "/".to_owned(),
        }
    }

    /// Registry key of a slot.
    pub fn key(&self, spec: &SlotSpec) -> String {
        let namespace = if spec.global {
            &self.global_namespace
        } else {
            &self.private_namespace
        };
        format!("{}{}", namespace, spec.name)
    }

    /// Write one slot back to the registry, logging failures.
    pub fn store(&self, registry: &dyn Registry, spec: &SlotSpec, value: ParameterValue) {
        if spec.constant {
            return;
        }
        let key = self.key(spec);
        if let Err(e) = registry.set(&key, value) {
            tracing::error!("Could not set parameter {}: {}", key, e);
        }
    }
}

/// Something that went wrong, or deserves attention, while loading one slot.
#[derive(Debug, Clone, PartialEq)]
pub enum LoadIssue {
    Missing {
        key: String,
    },
    TypeMismatch {
        key: String,
        expected: ParameterType,
        found: ParameterType,
    },
    Registry {
        key: String,
        message: String,
    },
    /// Advisory only: a constant slot is present in the registry.
    ConstantOverridden {
        key: String,
    },
}

impl LoadIssue {
    pub fn key(&self) -> &str {
        match self {
            Self::Missing { key }
            | Self::TypeMismatch { key, .. }
            | Self::Registry { key, .. }
            | Self::ConstantOverridden { key } => key,
        }
    }

    pub fn is_fatal(&self) -> bool {
        !matches!(self, Self::ConstantOverridden { .. })
    }
}

impl fmt::Display for LoadIssue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Missing { key } => write!(f, "'{}' is not defined", key),
            Self::TypeMismatch {
                key,
                expected,
                found,
            } => write!(f, "'{}' has type {}, expected {}", key, found, expected),
            Self::Registry { key, message } => write!(f, "'{}': {}", key, message),
            Self::ConstantOverridden { key } => {
                write!(f, "'{}' is constant but set in the registry", key)
            }
        }
    }
}

/// Everything collected during one load of a parameter struct.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct LoadReport {
    pub issues: Vec<LoadIssue>,
}

impl LoadReport {
    pub fn has_failures(&self) -> bool {
        self.issues.iter().any(LoadIssue::is_fatal)
    }

    pub fn failures(&self) -> impl Iterator<Item = &LoadIssue> {
        self.issues.iter().filter(|i| i.is_fatal())
    }

    /// Keys of mandatory slots that were absent.
    pub fn missing_keys(&self) -> Vec<&str> {
        self.issues
            .iter()
            .filter_map(|i| match i {
                LoadIssue::Missing { key } => Some(key.as_str()),
                _ => None,
            })
            .collect()
    }
}

impl fmt::Display for LoadReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, issue) in self.failures().enumerate() {
            if i > 0 {
                f.write_str("; ")?;
            }
            write!(f, "{}", issue)?;
        }
        Ok(())
    }
}

/// Reads slots from a registry and records what went wrong.
pub struct ParamLoader<'a> {
    registry: &'a dyn Registry,
    write_back: DefaultWriteBack,
    report: LoadReport,
}

impl<'a> ParamLoader<'a> {
    pub fn new(registry: &'a dyn Registry, write_back: DefaultWriteBack) -> Self {
        Self {
            registry,
            write_back,
            report: LoadReport::default(),
        }
    }

    /// Load one slot stored under `key`.
    ///
    /// Returns the value to assign, already clamped to the slot's bounds, or
    /// `None` when the slot could not be loaded; the reason is then in the
    /// report.
    pub fn load<T: Param>(&mut self, key: &str, spec: &SlotSpec) -> Option<T> {
        let value = if spec.constant {
            self.load_constant(key, spec)?
        } else if spec.is_mandatory() {
            self.load_mandatory::<T>(key)?
        } else {
            self.load_optional::<T>(key, spec)?
        };
        self.finish_slot::<T>(key, spec, value)
    }

    fn load_constant(&mut self, key: &str, spec: &SlotSpec) -> Option<ParameterValue> {
        if !accessor::test_const_param(self.registry, key) {
            self.report.issues.push(LoadIssue::ConstantOverridden {
                key: key.to_owned(),
            });
        }
        if spec.default.is_none() {
            tracing::error!("Constant parameter {} has no value.", key);
            self.report.issues.push(LoadIssue::Missing {
                key: key.to_owned(),
            });
        }
        spec.default.clone()
    }

    fn load_mandatory<T: Param>(&mut self, key: &str) -> Option<ParameterValue> {
        match accessor::get_param::<T, _>(self.registry, key) {
            Ok(value) => Some(value.to_value()),
            Err(e) => {
                self.record(key, e);
                None
            }
        }
    }

    fn load_optional<T: Param>(&mut self, key: &str, spec: &SlotSpec) -> Option<ParameterValue> {
        let Some(default) = spec.default_as::<T>() else {
            tracing::error!("Default value of {} does not have type {}.", key, T::TYPE);
            self.report.issues.push(LoadIssue::TypeMismatch {
                key: key.to_owned(),
                expected: T::TYPE,
                found: spec.default.as_ref().map_or(spec.param_type, |d| d.parameter_type()),
            });
            return None;
        };
        match accessor::get_param_or(self.registry, key, default, self.write_back) {
            Ok(value) => Some(value.to_value()),
            Err(e) => {
                self.record(key, e);
                None
            }
        }
    }

    fn finish_slot<T: Param>(
        &mut self,
        key: &str,
        spec: &SlotSpec,
        mut value: ParameterValue,
    ) -> Option<T> {
        crate::bounds::clamp(key, &mut value, &spec.bounds);
        let typed = T::from_value(&value);
        if typed.is_none() {
            self.report.issues.push(LoadIssue::TypeMismatch {
                key: key.to_owned(),
                expected: T::TYPE,
                found: value.parameter_type(),
            });
        }
        typed
    }

    fn record(&mut self, key: &str, error: Error) {
        let issue = match error {
            Error::MissingMandatoryParameter { key } => LoadIssue::Missing { key },
            Error::TypeMismatch {
                key,
                expected,
                found,
            } => LoadIssue::TypeMismatch {
                key,
                expected,
                found,
            },
            other => LoadIssue::Registry {
                key: key.to_owned(),
                message: other.to_string(),
            },
        };
        self.report.issues.push(issue);
    }

    pub fn report(&self) -> &LoadReport {
        &self.report
    }

    pub fn into_report(self) -> LoadReport {
        self.report
    }
}

/// A generated parameter struct.
///
/// Implementations supply the per-struct parts (`load`, `to_param_server`,
/// `from_config_impl`, `slots`, `Display`); loading, reconfiguration gating
/// and diagnostics are shared.
pub trait Parameters: fmt::Display {
    fn base(&self) -> &ParametersBase;

    /// Slot declarations in declaration order.
    fn slots(&self) -> Vec<SlotSpec>;

    /// Populate every slot through `loader`.
    fn load(&mut self, loader: &mut ParamLoader<'_>);

    /// Write every non-constant slot to the registry. Failures are logged.
    fn to_param_server(&self, registry: &dyn Registry);

    /// Copy the configurable slots present in `config`.
    ///
    /// Called through [`Parameters::from_config`], which checks that
    /// reconfiguration support is compiled in.
    #[doc(hidden)]
    fn from_config_impl(&mut self, config: &dyn ReconfigureConfig, level: u32);

    /// Get values from the registry, writing defaults back.
    ///
    /// Fails as a whole if any mandatory slot is missing or mistyped; slots
    /// visited before and after the failure keep whatever they loaded.
    fn from_param_server(&mut self, registry: &dyn Registry) -> Result<()> {
        self.from_param_server_with(registry, DefaultWriteBack::default())
    }

    fn from_param_server_with(
        &mut self,
        registry: &dyn Registry,
        write_back: DefaultWriteBack,
    ) -> Result<()> {
        let mut loader = ParamLoader::new(registry, write_back);
        self.load(&mut loader);
        let report = loader.into_report();
        if report.has_failures() {
            self.missing_params_warning();
            tracing::error!("Could not retrieve parameters: {}", report);
            return Err(Error::LoadFailed(report));
        }
        tracing::debug!("{}", self);
        Ok(())
    }

    /// Update configurable slots from a reconfiguration event.
    fn from_config(&mut self, config: &dyn ReconfigureConfig, level: u32) -> Result<()> {
        #[cfg(feature = "dynamic-reconfigure")]
        {
            tracing::debug!(level, "applying reconfiguration");
            self.from_config_impl(config, level);
            Ok(())
        }
        #[cfg(not(feature = "dynamic-reconfigure"))]
        {
            let _ = (config, level);
            let err = Error::ReconfigurationUnsupported;
            tracing::error!("{}", err);
            Err(err)
        }
    }

    /// Warn about the slots that need a value in the registry.
    fn missing_params_warning(&self) {
        tracing::warn!("{}", missing_params_message(self.base(), &self.slots()));
    }
}

/// The list of mandatory slots with their keys, types and descriptions.
pub fn missing_params_message(base: &ParametersBase, slots: &[SlotSpec]) -> String {
    let mut msg = String::from(
        "The following parameters do not have default values and need to be specified:",
    );
    for spec in slots.iter().filter(|s| s.is_mandatory() && !s.constant) {
        msg.push_str(&format!("\n\t{} ({})", base.key(spec), spec.param_type));
        if !spec.description.is_empty() {
            msg.push_str(&format!(": {}", spec.description));
        }
    }
    msg
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::registry::MemoryRegistry;

    fn base() -> ParametersBase {
        ParametersBase::new(&NodeIdentity::new("planner", "/robot").unwrap())
    }

    #[test]
    fn test_base_namespaces() {
        let base = base();
        assert_eq!(base.private_namespace, "/robot/planner/");
        assert_eq!(base.node_name, "planner");
        assert_eq!(base.global_namespace, "/");

        let spec = SlotSpec::new("rate", ParameterType::Integer);
        assert_eq!(base.key(&spec), "/robot/planner/rate");
        assert_eq!(base.key(&spec.global()), "/rate");
    }

    #[test]
    fn test_loader_collects_every_failure() {
        let registry = MemoryRegistry::with_entries([("/robot/planner/b", "text")]);
        let base = base();
        let mut loader = ParamLoader::new(&registry, DefaultWriteBack::Enabled);

        let a = SlotSpec::new("a", ParameterType::Integer);
        let b = SlotSpec::new("b", ParameterType::Integer);
        let c = SlotSpec::new("c", ParameterType::Integer).default_value(3_i64);

        assert_eq!(loader.load::<i64>(&base.key(&a), &a), None);
        assert_eq!(loader.load::<i64>(&base.key(&b), &b), None);
        assert_eq!(loader.load::<i64>(&base.key(&c), &c), Some(3));

        let report = loader.into_report();
        assert!(report.has_failures());
        assert_eq!(report.missing_keys(), vec!["/robot/planner/a"]);
        assert_eq!(report.failures().count(), 2);
        assert!(registry.has("/robot/planner/c").unwrap());
    }

    #[test]
    fn test_loader_clamps_registry_value() {
        let registry = MemoryRegistry::with_entries([("/robot/planner/gain", 15)]);
        let base = base();
        let mut loader = ParamLoader::new(&registry, DefaultWriteBack::Enabled);
        let spec = SlotSpec::new("gain", ParameterType::Double)
            .default_value(5.0)
            .min(0.0)
            .max(10.5);
        // Stored as an integer, read as a double, clamped as a double
        assert_eq!(loader.load::<f64>(&base.key(&spec), &spec), Some(10.5));
        assert!(!loader.report().has_failures());
    }

    #[test]
    fn test_loader_constant_slot() {
        let registry = MemoryRegistry::with_entries([("/robot/planner/fixed", 9)]);
        let base = base();
        let mut loader = ParamLoader::new(&registry, DefaultWriteBack::Enabled);
        let spec = SlotSpec::new("fixed", ParameterType::Integer)
            .default_value(1_i32)
            .constant();

        assert_eq!(loader.load::<i32>(&base.key(&spec), &spec), Some(1));
        let report = loader.into_report();
        assert!(!report.has_failures());
        assert_eq!(
            report.issues,
            vec![LoadIssue::ConstantOverridden {
                key: "/robot/planner/fixed".to_string()
            }]
        );
    }

    #[test]
    fn test_missing_params_message() {
        let slots = vec![
            SlotSpec::new("mode", ParameterType::String).describe("Operating mode"),
            SlotSpec::new("rate", ParameterType::Integer).default_value(10_i32),
        ];
        let msg = missing_params_message(&base(), &slots);
        assert!(msg.contains("/robot/planner/mode (string): Operating mode"));
        assert!(!msg.contains("rate"));
    }
}
