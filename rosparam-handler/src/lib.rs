//! # rosparam-handler: typed parameter structs over a ROS-style registry
//!
//! A node declares its parameters once, as a struct, and gets loading,
//! defaults, bounds, write-back, printing and live reconfiguration for free.
//!
//! ## Getting started
//!
//! ```rust
//! use rosparam_handler::{MemoryRegistry, NodeIdentity, Parameters};
//!
//! rosparam_handler::parameters! {
//!     pub struct DetectorParameters {
//!         /// Detection threshold
//!         #[param(min = 0.0, max = 10.0, configurable)]
//!         threshold: f64 = 5.0,
//!         /// Sensor frame
//!         frame: String,
//!     }
//! }
//!
//! let registry = MemoryRegistry::with_entries([("/detector/frame", "laser")]);
//! let node = NodeIdentity::new("detector", "/")?;
//! let mut params = DetectorParameters::new(&node);
//! params.from_param_server(&registry)?;
//! assert_eq!(params.frame, "laser");
//! # Ok::<(), rosparam_handler::Error>(())
//! ```
//!
//! ## Registries
//!
//! Parameters live in a [`Registry`]. [`MemoryRegistry`] keeps them in
//! process; with the `zenoh` feature (on by default), `ZenohRegistry` shares
//! them over a Zenoh session so that every node and the `rosparam` tool see
//! the same values.
//!
//! ## Features
//!
//! | Feature | Effect |
//! |---------|--------|
//! | `zenoh` | Zenoh-backed registry |
//! | `dynamic-reconfigure` | Enables [`Parameters::from_config`] |

pub mod accessor;
pub mod bounds;
mod error;
pub mod logging;
pub mod names;
pub mod node;
pub mod parameters;
pub mod reconfigure;
pub mod registry;
pub mod value;
pub mod yaml;

#[macro_use]
mod macros;

#[cfg(test)]
mod test_util;

pub use accessor::{DefaultWriteBack, get_param, get_param_or, set_param, test_const_param};
pub use bounds::Bounds;
pub use error::{Error, Result};
pub use node::NodeIdentity;
pub use parameters::{
    LoadIssue, LoadReport, ParamLoader, Parameters, ParametersBase, SlotDefault, SlotSpec,
};
pub use reconfigure::ReconfigureConfig;
pub use registry::{MemoryRegistry, Registry};
pub use value::{Param, ParameterType, ParameterValue};

#[cfg(feature = "zenoh")]
pub use registry::{ZenohRegistry, ZenohRegistryBuilder};

/// Builds a configured object, consuming the builder.
///
/// ```rust,ignore
/// use rosparam_handler::Builder;
/// let registry = ZenohRegistry::builder().with_key_prefix("robot1").build()?;
/// ```
pub trait Builder {
    type Output;

    /// # Errors
    ///
    /// Returns an error if the configuration is invalid or the backing
    /// resource (e.g. a Zenoh session) could not be opened.
    fn build(self) -> Result<Self::Output>;
}
