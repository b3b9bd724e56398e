//! Error types for parameter access and struct loading

use crate::names::NameError;
use crate::parameters::LoadReport;
use crate::value::ParameterType;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("parameter '{key}' is not defined")]
    MissingMandatoryParameter { key: String },

    #[error("parameter '{key}' has type {found}, expected {expected}")]
    TypeMismatch {
        key: String,
        expected: ParameterType,
        found: ParameterType,
    },

    #[error(
        "dynamic reconfigure support was not compiled in, from_config() is not available; \
         rebuild with the `dynamic-reconfigure` feature"
    )]
    ReconfigurationUnsupported,

    #[error("could not retrieve parameters: {0}")]
    LoadFailed(LoadReport),

    #[error("{0}")]
    InvalidName(#[from] NameError),

    #[error("registry error: {0}")]
    Registry(String),

    #[error("failed to parse parameter file: {0}")]
    Yaml(String),
}

impl Error {
    /// The registry key this error is about, if any.
    pub fn key(&self) -> Option<&str> {
        match self {
            Self::MissingMandatoryParameter { key } | Self::TypeMismatch { key, .. } => Some(key),
            _ => None,
        }
    }
}

#[cfg(feature = "zenoh")]
impl From<zenoh::Error> for Error {
    fn from(e: zenoh::Error) -> Self {
        Self::Registry(e.to_string())
    }
}

impl From<serde_yaml::Error> for Error {
    fn from(e: serde_yaml::Error) -> Self {
        Self::Yaml(e.to_string())
    }
}
