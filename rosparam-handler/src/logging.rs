//! Logger setup driven by the standardized `verbosity` parameter.

use tracing::level_filters::LevelFilter;
use tracing_subscriber::{EnvFilter, fmt, prelude::*, util::TryInitError};

use crate::accessor::{self, DefaultWriteBack};
use crate::names;
use crate::node::NodeIdentity;
use crate::registry::Registry;

/// Values accepted by the `verbosity` parameter.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, strum::EnumString, strum::Display)]
#[strum(serialize_all = "lowercase")]
pub enum Verbosity {
    Debug,
    Info,
    #[default]
    Warning,
    Error,
    Fatal,
}

impl Verbosity {
    pub fn level_filter(self) -> LevelFilter {
        match self {
            Verbosity::Debug => LevelFilter::DEBUG,
            Verbosity::Info => LevelFilter::INFO,
            Verbosity::Warning => LevelFilter::WARN,
            Verbosity::Error | Verbosity::Fatal => LevelFilter::ERROR,
        }
    }
}

/// Read `<node namespace>/verbosity`.
///
/// Unset means [`Verbosity::Warning`]; an unknown value falls back to
/// [`Verbosity::Info`] with a warning.
pub fn read_verbosity<R>(registry: &R, node: &NodeIdentity) -> Verbosity
where
    R: Registry + ?Sized,
{
    let key = names::join(node.namespace(), "verbosity");
    let default = Verbosity::default().to_string();
    let value = match accessor::get_param_or(registry, &key, default, DefaultWriteBack::Disabled)
    {
        Ok(value) => value,
        Err(e) => {
            tracing::warn!("Could not read {}: {}", key, e);
            return Verbosity::default();
        }
    };
    value.parse().unwrap_or_else(|_| {
        tracing::warn!(
            "Invalid verbosity level specified: {}! Falling back to INFO.",
            value
        );
        Verbosity::Info
    })
}

/// Install a global `fmt` subscriber at `verbosity`.
///
/// `RUST_LOG` takes precedence when set.
pub fn init(verbosity: Verbosity) -> Result<(), TryInitError> {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::default().add_directive(verbosity.level_filter().into()));

    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().compact().with_target(true))
        .try_init()
}

/// Read the node's verbosity once and install the subscriber accordingly.
pub fn set_logger_level<R>(registry: &R, node: &NodeIdentity) -> Result<Verbosity, TryInitError>
where
    R: Registry + ?Sized,
{
    let verbosity = read_verbosity(registry, node);
    init(verbosity)?;
    tracing::debug!("Verbosity set to {}", verbosity);
    Ok(verbosity)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::registry::MemoryRegistry;

    fn node() -> NodeIdentity {
        NodeIdentity::new("planner", "/robot").unwrap()
    }

    #[test]
    fn test_default_verbosity() {
        let registry = MemoryRegistry::new();
        assert_eq!(read_verbosity(&registry, &node()), Verbosity::Warning);
        // Reading the level does not seed the registry
        assert!(registry.is_empty());
    }

    #[test]
    fn test_configured_verbosity() {
        let registry = MemoryRegistry::with_entries([("/robot/planner/verbosity", "debug")]);
        assert_eq!(read_verbosity(&registry, &node()), Verbosity::Debug);
    }

    #[test]
    fn test_invalid_verbosity_falls_back_to_info() {
        let registry = MemoryRegistry::with_entries([("/robot/planner/verbosity", "loud")]);
        assert_eq!(read_verbosity(&registry, &node()), Verbosity::Info);
    }

    #[test]
    fn test_level_filter() {
        assert_eq!(Verbosity::Fatal.level_filter(), LevelFilter::ERROR);
        assert_eq!("warning".parse::<Verbosity>().unwrap().level_filter(), LevelFilter::WARN);
    }
}
