//! Live updates from an external reconfiguration mechanism.
//!
//! A reconfiguration event is any value object exposing fields by name. Only
//! slots declared `configurable` are copied from it; fields the event does
//! not carry leave their slot untouched.
//!
//! Applying events requires the `dynamic-reconfigure` cargo feature; without
//! it [`Parameters::from_config`](crate::Parameters::from_config) returns
//! [`Error::ReconfigurationUnsupported`](crate::Error::ReconfigurationUnsupported).

use std::collections::{BTreeMap, HashMap};

use crate::bounds;
use crate::parameters::SlotSpec;
use crate::value::{Param, ParameterValue};

/// A reconfiguration event carrying new values for some slots.
pub trait ReconfigureConfig {
    /// Value of the field called `name`, if the event carries it.
    fn field(&self, name: &str) -> Option<ParameterValue>;
}

impl ReconfigureConfig for BTreeMap<String, ParameterValue> {
    fn field(&self, name: &str) -> Option<ParameterValue> {
        self.get(name).cloned()
    }
}

impl ReconfigureConfig for HashMap<String, ParameterValue> {
    fn field(&self, name: &str) -> Option<ParameterValue> {
        self.get(name).cloned()
    }
}

/// The new value of a configurable slot, if `config` carries a usable one.
///
/// The value is clamped to the slot's bounds.
pub fn read_field<T: Param>(config: &dyn ReconfigureConfig, spec: &SlotSpec) -> Option<T> {
    if !spec.configurable {
        return None;
    }
    let value = config.field(spec.name)?;
    let Some(typed) = T::from_value(&value) else {
        tracing::warn!(
            "Reconfiguration field {} has type {}, expected {}. Ignoring it.",
            spec.name,
            value.parameter_type(),
            T::TYPE
        );
        return None;
    };
    if spec.bounds.is_unbounded() {
        return Some(typed);
    }
    // Clamp in T's representation so integer slots keep integer values
    let mut value = typed.to_value();
    bounds::clamp(spec.name, &mut value, &spec.bounds);
    T::from_value(&value)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::value::ParameterType;

    #[test]
    fn test_read_field() {
        let mut config = BTreeMap::new();
        config.insert("rate".to_string(), ParameterValue::Integer(30));
        config.insert("mode".to_string(), ParameterValue::Integer(1));

        let rate = SlotSpec::new("rate", ParameterType::Integer).configurable();
        assert_eq!(read_field::<i32>(&config, &rate), Some(30));

        // Not configurable
        let fixed = SlotSpec::new("rate", ParameterType::Integer);
        assert_eq!(read_field::<i32>(&config, &fixed), None);

        // Wrong type
        let mode = SlotSpec::new("mode", ParameterType::String).configurable();
        assert_eq!(read_field::<String>(&config, &mode), None);

        // Absent
        let other = SlotSpec::new("other", ParameterType::Bool).configurable();
        assert_eq!(read_field::<bool>(&config, &other), None);
    }

    #[test]
    fn test_read_field_clamps_to_bounds() {
        let mut config = BTreeMap::new();
        config.insert("threshold".to_string(), ParameterValue::Double(1000.0));
        config.insert("rate".to_string(), ParameterValue::Integer(-4));
        config.insert("gains".to_string(), ParameterValue::from(vec![-1.0, 0.5, 3.0]));

        let threshold = SlotSpec::new("threshold", ParameterType::Double)
            .min(0.0)
            .max(10.0)
            .configurable();
        assert_eq!(read_field::<f64>(&config, &threshold), Some(10.0));

        let rate = SlotSpec::new("rate", ParameterType::Integer)
            .min(0.5)
            .configurable();
        assert_eq!(read_field::<i32>(&config, &rate), Some(1));

        let gains = SlotSpec::new("gains", ParameterType::List)
            .min(0.0)
            .max(1.0)
            .configurable();
        assert_eq!(
            read_field::<Vec<f64>>(&config, &gains),
            Some(vec![0.0, 0.5, 1.0])
        );
    }
}
