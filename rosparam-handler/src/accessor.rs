//! Typed reads and writes against a [`Registry`].

use crate::registry::Registry;
use crate::value::Param;
use crate::{Error, Result};

/// Whether a default used in place of a missing parameter is written back to
/// the registry, so that later readers of the registry observe it.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum DefaultWriteBack {
    #[default]
    Enabled,
    Disabled,
}

/// Read a mandatory parameter.
///
/// Fails with [`Error::MissingMandatoryParameter`] if the key is absent and
/// with [`Error::TypeMismatch`] if the stored value does not convert to `T`.
pub fn get_param<T, R>(registry: &R, key: &str) -> Result<T>
where
    T: Param,
    R: Registry + ?Sized,
{
    let Some(value) = registry.get(key)? else {
        tracing::error!("Parameter '{}' is not defined.", key);
        return Err(Error::MissingMandatoryParameter {
            key: key.to_owned(),
        });
    };
    T::from_value(&value).ok_or_else(|| {
        tracing::error!(
            "Could not retrieve parameter '{}'. Does it have a different type?",
            key
        );
        Error::TypeMismatch {
            key: key.to_owned(),
            expected: T::TYPE,
            found: value.parameter_type(),
        }
    })
}

/// Read an optional parameter, falling back to `default`.
///
/// A missing key yields `default` (written back when `write_back` is
/// enabled); a key of the wrong type yields `default` with a warning. Only
/// registry errors are returned.
pub fn get_param_or<T, R>(
    registry: &R,
    key: &str,
    default: T,
    write_back: DefaultWriteBack,
) -> Result<T>
where
    T: Param,
    R: Registry + ?Sized,
{
    match registry.get(key)? {
        None => {
            if write_back == DefaultWriteBack::Enabled {
                tracing::info!("Parameter {} is not yet set. Setting default value.", key);
                registry.set(key, default.to_value())?;
            }
            Ok(default)
        }
        Some(value) => match T::from_value(&value) {
            Some(v) => Ok(v),
            None => {
                tracing::warn!(
                    "Parameter {} is set, but has a different type. Using default value instead.",
                    key
                );
                Ok(default)
            }
        },
    }
}

pub fn set_param<T, R>(registry: &R, key: &str, value: &T) -> Result<()>
where
    T: Param,
    R: Registry + ?Sized,
{
    registry.set(key, value.to_value())
}

/// Check that a parameter declared constant is absent from the registry.
///
/// Returns `false` with a warning when the key is present. A registry that
/// cannot be asked counts as clean.
pub fn test_const_param<R>(registry: &R, key: &str) -> bool
where
    R: Registry + ?Sized,
{
    match registry.has(key) {
        Ok(false) => true,
        Ok(true) => {
            tracing::warn!(
                "Parameter {} was set on the parameter server even though it was defined to be constant.",
                key
            );
            false
        }
        Err(e) => {
            tracing::error!("Could not check constant parameter {}: {}", key, e);
            true
        }
    }
}
