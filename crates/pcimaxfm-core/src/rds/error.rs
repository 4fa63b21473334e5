//! RDS validation errors

use core::fmt;

use super::catalog::{RdsParam, ValueKind};
use super::validate::{DURATION_MAX, LONG_TEXT_MAX, SHORT_TEXT_MAX};

/// Why an RDS parameter write was rejected
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RdsError {
    /// Parameter index is outside the catalog
    InvalidParameter {
        /// Rejected index
        index: usize,
    },
    /// Bank number outside 0-39
    InvalidBank {
        /// Rejected parameter
        param: RdsParam,
    },
    /// No value was supplied
    MissingValue {
        /// Parameter the value was for
        param: RdsParam,
    },
    /// Text has the wrong length or contains control bytes, or an integer did not parse
    InvalidValue {
        /// Parameter the value was for
        param: RdsParam,
        /// Kind the value was checked against
        kind: ValueKind,
    },
    /// Integer parsed but lies outside 0-10
    OutOfRange {
        /// Parameter the value was for
        param: RdsParam,
        /// Parsed value (saturated at `u64::MAX`)
        value: u64,
    },
}

impl fmt::Display for RdsError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InvalidParameter { index } => write!(f, "invalid RDS parameter (id {})", index),
            Self::InvalidBank { param } => write!(f, "invalid RDS parameter bank {}", param),
            Self::MissingValue { param } => {
                let kind = param.info().map_or("?", |info| info.kind.type_name());
                write!(f, "value required for RDS parameter {} ({})", param, kind)
            }
            Self::InvalidValue { param, kind } => match kind {
                ValueKind::ShortText => write!(
                    f,
                    "invalid value for RDS parameter {}, expected 1-{} printable characters",
                    param, SHORT_TEXT_MAX
                ),
                ValueKind::LongText => write!(
                    f,
                    "invalid value for RDS parameter {}, expected 1-{} printable characters",
                    param, LONG_TEXT_MAX
                ),
                ValueKind::Duration => write!(
                    f,
                    "invalid value for RDS parameter {}, expected integer in the range of 0-{}",
                    param, DURATION_MAX
                ),
            },
            Self::OutOfRange { param, value } => write!(
                f,
                "integer value for RDS parameter {} out of range, got {}, expected 0-{}",
                param, value, DURATION_MAX
            ),
        }
    }
}

#[cfg(feature = "std")]
impl std::error::Error for RdsError {}
