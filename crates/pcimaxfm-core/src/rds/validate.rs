//! RDS value validation
//!
//! Every value goes through [`validate`] before it reaches the encoder, no
//! matter who supplied it. Text is length-checked, never truncated. Integer
//! values are re-rendered from the parsed number, which drops anything
//! after the leading digits (`"7 min"` is sent as `"7"`).

use core::fmt::Write;

use super::catalog::{RdsParam, ValueKind};
use super::error::RdsError;

/// Maximum length of a short text value, in bytes
pub const SHORT_TEXT_MAX: usize = 8;
/// Maximum length of a long text value, in bytes
pub const LONG_TEXT_MAX: usize = 64;
/// Largest duration value
pub const DURATION_MAX: u64 = 10;

/// A validated, normalized value ready to be sent
pub type RdsValue = heapless::String<LONG_TEXT_MAX>;

/// Validate a value for the parameter with the given catalog index
pub fn validate(index: usize, value: Option<&str>) -> Result<(RdsParam, RdsValue), RdsError> {
    let param = RdsParam::from_index(index).ok_or(RdsError::InvalidParameter { index })?;
    let value = validate_param(param, value)?;
    Ok((param, value))
}

/// Validate a value for a known parameter
pub fn validate_param(param: RdsParam, value: Option<&str>) -> Result<RdsValue, RdsError> {
    let info = param.info().ok_or(RdsError::InvalidBank { param })?;
    let value = value.ok_or(RdsError::MissingValue { param })?;
    let invalid = RdsError::InvalidValue {
        param,
        kind: info.kind,
    };

    let mut out = RdsValue::new();
    match info.kind {
        ValueKind::ShortText => {
            check_text(value, SHORT_TEXT_MAX).ok_or(invalid)?;
            out.push_str(value).map_err(|_| invalid)?;
        }
        ValueKind::LongText => {
            check_text(value, LONG_TEXT_MAX).ok_or(invalid)?;
            out.push_str(value).map_err(|_| invalid)?;
        }
        ValueKind::Duration => {
            let number = parse_unsigned_prefix(value).ok_or(invalid)?;
            if number > DURATION_MAX {
                return Err(RdsError::OutOfRange {
                    param,
                    value: number,
                });
            }
            write!(out, "{}", number).map_err(|_| invalid)?;
        }
    }

    Ok(out)
}

/// Length in bytes within `1..=max`, and no control bytes
///
/// The encoder frames name and value with bytes 0, 1 and 2, so none of
/// those may appear inside a value.
fn check_text(value: &str, max: usize) -> Option<()> {
    let printable = !value.bytes().any(|b| b.is_ascii_control());
    ((1..=max).contains(&value.len()) && printable).then_some(())
}

/// Parse the leading unsigned decimal number of `s`
///
/// Leading whitespace and a single `+` are accepted. Parsing stops at the
/// first non-digit. Returns `None` when there are no digits; overflow
/// saturates.
fn parse_unsigned_prefix(s: &str) -> Option<u64> {
    let s = s.trim_start();
    let s = s.strip_prefix('+').unwrap_or(s);
    let digits = s.bytes().take_while(u8::is_ascii_digit);

    let mut seen = false;
    let mut number: u64 = 0;
    for digit in digits {
        seen = true;
        number = number
            .saturating_mul(10)
            .saturating_add(u64::from(digit - b'0'));
    }

    seen.then_some(number)
}

#[cfg(test)]
mod tests {
    extern crate std;

    use super::*;

    const PS00: RdsParam = RdsParam::ProgramService(0);
    const PD00: RdsParam = RdsParam::Duration(0);

    #[test]
    fn test_short_text_bounds() {
        assert_eq!(
            validate_param(PS00, Some("")),
            Err(RdsError::InvalidValue {
                param: PS00,
                kind: ValueKind::ShortText
            })
        );
        assert!(validate_param(PS00, Some("ABCDEFGHI")).is_err());
        assert_eq!(validate_param(PS00, Some("A")).unwrap().as_str(), "A");
        assert_eq!(
            validate_param(PS00, Some("PCIMAXFM")).unwrap().as_str(),
            "PCIMAXFM"
        );
    }

    #[test]
    fn test_long_text_bounds() {
        let max = "x".repeat(64);
        let over = "x".repeat(65);
        assert!(validate_param(RdsParam::RadioText, Some("")).is_err());
        assert!(validate_param(RdsParam::RadioText, Some(over.as_str())).is_err());
        assert_eq!(
            validate_param(RdsParam::RadioText, Some("a")).unwrap().as_str(),
            "a"
        );
        assert_eq!(
            validate_param(RdsParam::RadioText, Some(max.as_str()))
                .unwrap()
                .as_str(),
            max
        );
    }

    #[test]
    fn test_text_length_is_bytes() {
        // Four two-byte characters fill a short text slot, five overflow it
        assert!(validate_param(PS00, Some("ææææ")).is_ok());
        assert!(validate_param(PS00, Some("æææææ")).is_err());
    }

    #[test]
    fn test_duration_values() {
        assert_eq!(validate_param(PD00, Some("5")).unwrap().as_str(), "5");
        assert_eq!(validate_param(PD00, Some("05")).unwrap().as_str(), "5");
        assert_eq!(validate_param(PD00, Some("0")).unwrap().as_str(), "0");
        assert_eq!(validate_param(PD00, Some("10")).unwrap().as_str(), "10");
        assert_eq!(validate_param(PD00, Some(" +7xyz")).unwrap().as_str(), "7");
        assert_eq!(
            validate_param(PD00, Some("11")),
            Err(RdsError::OutOfRange {
                param: PD00,
                value: 11
            })
        );
        assert_eq!(
            validate_param(PD00, Some("99999999999999999999999")),
            Err(RdsError::OutOfRange {
                param: PD00,
                value: u64::MAX
            })
        );
        let invalid = Err(RdsError::InvalidValue {
            param: PD00,
            kind: ValueKind::Duration,
        });
        assert_eq!(validate_param(PD00, Some("abc")), invalid);
        assert_eq!(validate_param(PD00, Some("-1")), invalid);
        assert_eq!(validate_param(PD00, Some("")), invalid);
    }

    #[test]
    fn test_text_rejects_control_bytes() {
        let invalid = Err(RdsError::InvalidValue {
            param: PS00,
            kind: ValueKind::ShortText,
        });
        assert_eq!(validate_param(PS00, Some("AB\x02\x00CD")), invalid);
        assert_eq!(validate_param(PS00, Some("\x01")), invalid);
        assert_eq!(validate_param(PS00, Some("A\tB")), invalid);
        assert!(validate_param(RdsParam::RadioText, Some("Now \x00playing")).is_err());
        assert!(validate_param(RdsParam::RadioText, Some("Now playing: ~{}")).is_ok());
    }

    #[test]
    fn test_missing_value() {
        assert_eq!(
            validate_param(PS00, None),
            Err(RdsError::MissingValue { param: PS00 })
        );
    }

    #[test]
    fn test_validate_by_index() {
        assert_eq!(
            validate(81, Some("x")),
            Err(RdsError::InvalidParameter { index: 81 })
        );
        let (param, value) = validate(80, Some("Hello")).unwrap();
        assert_eq!(param, RdsParam::RadioText);
        assert_eq!(value.as_str(), "Hello");
        let (param, value) = validate(45, Some("3")).unwrap();
        assert_eq!(param, RdsParam::Duration(5));
        assert_eq!(value.as_str(), "3");
    }

    #[test]
    fn test_bank_outside_catalog() {
        assert_eq!(
            validate_param(RdsParam::ProgramService(40), Some("x")),
            Err(RdsError::InvalidBank {
                param: RdsParam::ProgramService(40)
            })
        );
    }
}
