//! Parameter values and their typed access.
//!
//! [`ParameterValue`] is what the registry stores. Generated parameter structs
//! hold plain Rust types instead; the [`Param`] trait converts between the two.
//! A conversion that fails is a type mismatch, which callers treat as a
//! recoverable condition.

use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};

/// The type tag of a [`ParameterValue`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, strum::Display, strum::EnumString)]
#[strum(serialize_all = "lowercase")]
pub enum ParameterType {
    Bool,
    #[strum(serialize = "int")]
    Integer,
    Double,
    String,
    List,
    Map,
}

/// A value stored in the parameter registry.
///
/// Serialized untagged, so JSON and YAML documents map onto it directly:
/// `15` is an `Integer`, `15.0` a `Double`, `[1, 2]` a `List`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ParameterValue {
    Bool(bool),
    Integer(i64),
    Double(f64),
    String(String),
    List(Vec<ParameterValue>),
    Map(BTreeMap<String, ParameterValue>),
}

impl ParameterValue {
    /// Returns the type tag of this value.
    pub fn parameter_type(&self) -> ParameterType {
        match self {
            Self::Bool(_) => ParameterType::Bool,
            Self::Integer(_) => ParameterType::Integer,
            Self::Double(_) => ParameterType::Double,
            Self::String(_) => ParameterType::String,
            Self::List(_) => ParameterType::List,
            Self::Map(_) => ParameterType::Map,
        }
    }

    /// Numeric view of a scalar, `None` for everything else.
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Self::Integer(v) => Some(*v as f64),
            Self::Double(v) => Some(*v),
            _ => None,
        }
    }

    pub fn is_numeric(&self) -> bool {
        matches!(self, Self::Integer(_) | Self::Double(_))
    }

    /// Convert into a typed value, `None` on type mismatch.
    pub fn get<T: Param>(&self) -> Option<T> {
        T::from_value(self)
    }
}

impl fmt::Display for ParameterValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Bool(v) => write!(f, "{v}"),
            Self::Integer(v) => write!(f, "{v}"),
            Self::Double(v) => write!(f, "{v}"),
            Self::String(v) => f.write_str(v),
            Self::List(items) => {
                f.write_str("[")?;
                for (i, item) in items.iter().enumerate() {
                    if i > 0 {
                        f.write_str(", ")?;
                    }
                    write!(f, "{item}")?;
                }
                f.write_str("]")
            }
            Self::Map(entries) => {
                f.write_str("{")?;
                for (i, (key, value)) in entries.iter().enumerate() {
                    if i > 0 {
                        f.write_str(", ")?;
                    }
                    write!(f, "{key} --> {value}")?;
                }
                f.write_str("}")
            }
        }
    }
}

/// A Rust type that can be stored in a parameter slot.
pub trait Param: Sized {
    /// The registry type this Rust type is stored as.
    const TYPE: ParameterType;

    /// Read from a registry value, `None` if the stored type does not fit.
    fn from_value(value: &ParameterValue) -> Option<Self>;

    fn to_value(&self) -> ParameterValue;
}

impl Param for bool {
    const TYPE: ParameterType = ParameterType::Bool;

    fn from_value(value: &ParameterValue) -> Option<Self> {
        match value {
            ParameterValue::Bool(v) => Some(*v),
            _ => None,
        }
    }

    fn to_value(&self) -> ParameterValue {
        ParameterValue::Bool(*self)
    }
}

impl Param for String {
    const TYPE: ParameterType = ParameterType::String;

    fn from_value(value: &ParameterValue) -> Option<Self> {
        match value {
            ParameterValue::String(v) => Some(v.clone()),
            _ => None,
        }
    }

    fn to_value(&self) -> ParameterValue {
        ParameterValue::String(self.clone())
    }
}

// Integers narrower than i64 fail the conversion when the stored value is out
// of their range.
macro_rules! impl_param_integer {
    ($($ty:ty),*) => {
        $(
            impl Param for $ty {
                const TYPE: ParameterType = ParameterType::Integer;

                fn from_value(value: &ParameterValue) -> Option<Self> {
                    match value {
                        ParameterValue::Integer(v) => <$ty>::try_from(*v).ok(),
                        _ => None,
                    }
                }

                fn to_value(&self) -> ParameterValue {
                    ParameterValue::Integer(i64::from(*self))
                }
            }

            impl From<$ty> for ParameterValue {
                fn from(v: $ty) -> Self {
                    Self::Integer(i64::from(v))
                }
            }
        )*
    };
}

impl_param_integer!(i8, i16, i32, i64, u8, u16, u32);

// Integers widen to floating point, the other direction is a mismatch.
macro_rules! impl_param_float {
    ($($ty:ty),*) => {
        $(
            impl Param for $ty {
                const TYPE: ParameterType = ParameterType::Double;

                fn from_value(value: &ParameterValue) -> Option<Self> {
                    match value {
                        ParameterValue::Double(v) => Some(*v as $ty),
                        ParameterValue::Integer(v) => Some(*v as $ty),
                        _ => None,
                    }
                }

                fn to_value(&self) -> ParameterValue {
                    ParameterValue::Double(f64::from(*self))
                }
            }

            impl From<$ty> for ParameterValue {
                fn from(v: $ty) -> Self {
                    Self::Double(f64::from(v))
                }
            }
        )*
    };
}

impl_param_float!(f32, f64);

impl<T: Param> Param for Vec<T> {
    const TYPE: ParameterType = ParameterType::List;

    fn from_value(value: &ParameterValue) -> Option<Self> {
        match value {
            ParameterValue::List(items) => items.iter().map(T::from_value).collect(),
            _ => None,
        }
    }

    fn to_value(&self) -> ParameterValue {
        ParameterValue::List(self.iter().map(Param::to_value).collect())
    }
}

impl<T: Param> Param for BTreeMap<String, T> {
    const TYPE: ParameterType = ParameterType::Map;

    fn from_value(value: &ParameterValue) -> Option<Self> {
        match value {
            ParameterValue::Map(entries) => entries
                .iter()
                .map(|(k, v)| T::from_value(v).map(|v| (k.clone(), v)))
                .collect(),
            _ => None,
        }
    }

    fn to_value(&self) -> ParameterValue {
        ParameterValue::Map(
            self.iter()
                .map(|(k, v)| (k.clone(), v.to_value()))
                .collect(),
        )
    }
}

impl From<bool> for ParameterValue {
    fn from(v: bool) -> Self {
        Self::Bool(v)
    }
}

impl From<String> for ParameterValue {
    fn from(v: String) -> Self {
        Self::String(v)
    }
}

impl From<&str> for ParameterValue {
    fn from(v: &str) -> Self {
        Self::String(v.to_owned())
    }
}

impl<T: Into<ParameterValue>> From<Vec<T>> for ParameterValue {
    fn from(v: Vec<T>) -> Self {
        Self::List(v.into_iter().map(Into::into).collect())
    }
}

impl<T: Into<ParameterValue>> From<BTreeMap<String, T>> for ParameterValue {
    fn from(v: BTreeMap<String, T>) -> Self {
        Self::Map(v.into_iter().map(|(k, v)| (k, v.into())).collect())
    }
}
