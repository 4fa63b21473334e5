//! Radio Data System parameters
//!
//! The RDS encoder keeps its own state; the driver only writes one
//! `(name, value)` pair at a time and never caches what was sent.
//!
//! - [`catalog`] - the fixed table of parameters and their value kinds
//! - [`validate`] - the only gate between caller input and the encoder
//! - [`encoder`] - the byte sequence sent to the encoder chip

pub mod catalog;
pub mod encoder;
mod error;
pub mod validate;

pub use catalog::{RdsParam, RdsParamInfo, ValueKind, CATALOG, PARAM_COUNT};
pub use error::RdsError;
pub use validate::{validate, validate_param, RdsValue};
