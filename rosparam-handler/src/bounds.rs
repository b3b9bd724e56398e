//! Min/max bounds applied to parameter values after retrieval.
//!
//! Clamping works on the [`ParameterValue`] tag: numeric scalars are compared
//! against the bound, lists are clamped element-wise, mappings value-wise with
//! their keys untouched. Strings and booleans pass through unchanged.

use std::cmp::Ordering;

use crate::value::ParameterValue;

/// Optional lower and upper bound of a slot. An unset bound never clamps.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Bounds {
    pub min: Option<ParameterValue>,
    pub max: Option<ParameterValue>,
}

impl Bounds {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_min(mut self, min: impl Into<ParameterValue>) -> Self {
        self.min = Some(min.into());
        self
    }

    pub fn with_max(mut self, max: impl Into<ParameterValue>) -> Self {
        self.max = Some(max.into());
        self
    }

    pub fn is_unbounded(&self) -> bool {
        self.min.is_none() && self.max.is_none()
    }

    /// Clamp `value` and return it.
    pub fn apply(&self, key: &str, mut value: ParameterValue) -> ParameterValue {
        clamp(key, &mut value, self);
        value
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Side {
    Min,
    Max,
}

impl Side {
    fn violated_by(self, ordering: Ordering) -> bool {
        match self {
            Side::Min => ordering == Ordering::Less,
            Side::Max => ordering == Ordering::Greater,
        }
    }
}

/// Clamp `value` in place to `bounds`. Returns whether anything changed.
pub fn clamp(key: &str, value: &mut ParameterValue, bounds: &Bounds) -> bool {
    let mut changed = false;
    if let Some(min) = &bounds.min {
        changed |= test_min(key, value, min);
    }
    if let Some(max) = &bounds.max {
        changed |= test_max(key, value, max);
    }
    changed
}

/// Raise every numeric part of `value` below `min` to `min`.
pub fn test_min(key: &str, value: &mut ParameterValue, min: &ParameterValue) -> bool {
    test_bound(key, value, min, Side::Min)
}

/// Lower every numeric part of `value` above `max` to `max`.
pub fn test_max(key: &str, value: &mut ParameterValue, max: &ParameterValue) -> bool {
    test_bound(key, value, max, Side::Max)
}

fn test_bound(key: &str, value: &mut ParameterValue, bound: &ParameterValue, side: Side) -> bool {
    match value {
        ParameterValue::List(items) => items
            .iter_mut()
            .fold(false, |changed, item| test_bound(key, item, bound, side) | changed),
        ParameterValue::Map(entries) => entries
            .values_mut()
            .fold(false, |changed, item| test_bound(key, item, bound, side) | changed),
        scalar => clamp_scalar(key, scalar, bound, side),
    }
}

fn clamp_scalar(key: &str, value: &mut ParameterValue, bound: &ParameterValue, side: Side) -> bool {
    let ordering = match (&*value, bound) {
        (ParameterValue::Integer(v), ParameterValue::Integer(b)) => Some(v.cmp(b)),
        _ => match (value.as_f64(), bound.as_f64()) {
            (Some(v), Some(b)) => v.partial_cmp(&b),
            _ => None,
        },
    };
    if !ordering.is_some_and(|o| side.violated_by(o)) {
        return false;
    }

    // An integer slot keeps its type; a fractional bound is rounded inward.
    let corrected = match (&*value, bound) {
        (ParameterValue::Integer(_), ParameterValue::Integer(b)) => ParameterValue::Integer(*b),
        (ParameterValue::Integer(_), ParameterValue::Double(b)) => match side {
            Side::Min => ParameterValue::Integer(b.ceil() as i64),
            Side::Max => ParameterValue::Integer(b.floor() as i64),
        },
        (_, bound) => match bound.as_f64() {
            Some(b) => ParameterValue::Double(b),
            None => return false,
        },
    };

    match side {
        Side::Min => tracing::warn!(
            "Value of {} for {} is smaller than minimal allowed value. Correcting value to min={}",
            value,
            key,
            corrected
        ),
        Side::Max => tracing::warn!(
            "Value of {} for {} is greater than maximal allowed value. Correcting value to max={}",
            value,
            key,
            corrected
        ),
    }
    *value = corrected;
    true
}
