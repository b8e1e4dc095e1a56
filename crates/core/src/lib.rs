//! `solidgate-core`: gateway foundation building blocks.
//!
//! This crate holds pure types and checks (no IO): identifiers, the error
//! taxonomy, canonical attribute values, boundary validation and the
//! configuration source abstraction.

pub mod config;
pub mod error;
pub mod id;
pub mod validation;
pub mod value;

pub use config::{ConfigSource, ConfigTree};
pub use error::{GatewayError, GatewayResult};
pub use id::{AccessGroupId, AccountId, QosPolicyId, VolumeId};
pub use validation::Retention;
pub use value::{AttributeMap, AttributeValue, Normalize, normalize};
