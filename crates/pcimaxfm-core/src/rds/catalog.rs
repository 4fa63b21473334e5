//! RDS parameter catalog
//!
//! | Parameter     | Kind        | Meaning                          |
//! |---------------|-------------|----------------------------------|
//! | `PS00`-`PS39` | 8 chars     | Program service name banks       |
//! | `PD00`-`PD39` | 0 - 10      | Display duration of each bank    |
//! | `RT`          | 64 chars    | Radio text                       |
//!
//! Parameters also have a dense index (PS banks, then PD banks, then RT)
//! used by the raw command interface.

use core::fmt;
use core::str::FromStr;

/// Number of program service name banks (and of duration slots)
pub const BANK_COUNT: u8 = 40;

/// Number of catalog entries
pub const PARAM_COUNT: usize = 2 * BANK_COUNT as usize + 1;

/// An RDS parameter identifier
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RdsParam {
    /// Program service name bank `PSnn`
    ProgramService(u8),
    /// Program service bank duration `PDnn`
    Duration(u8),
    /// Radio text `RT`
    RadioText,
}

/// Kind of value a parameter accepts
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ValueKind {
    /// Text of 1 to 8 bytes
    ShortText,
    /// Text of 1 to 64 bytes
    LongText,
    /// Decimal integer 0 to 10
    Duration,
}

impl ValueKind {
    /// Short type description used in help output
    pub const fn type_name(self) -> &'static str {
        match self {
            Self::ShortText => "8 chars",
            Self::LongText => "64 chars",
            Self::Duration => "0 - 10",
        }
    }
}

/// One catalog entry
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RdsParamInfo {
    /// Parameter identifier
    pub param: RdsParam,
    /// Accepted value kind
    pub kind: ValueKind,
    /// Human readable description
    pub description: &'static str,
}

/// The complete catalog, in index order
pub static CATALOG: [RdsParamInfo; PARAM_COUNT] = build_catalog();

const fn build_catalog() -> [RdsParamInfo; PARAM_COUNT] {
    let mut table = [RdsParamInfo {
        param: RdsParam::RadioText,
        kind: ValueKind::LongText,
        description: "Radio text",
    }; PARAM_COUNT];

    let mut bank = 0;
    while bank < BANK_COUNT {
        table[bank as usize] = RdsParamInfo {
            param: RdsParam::ProgramService(bank),
            kind: ValueKind::ShortText,
            description: "Program service bank",
        };
        table[(BANK_COUNT + bank) as usize] = RdsParamInfo {
            param: RdsParam::Duration(bank),
            kind: ValueKind::Duration,
            description: "Program service bank duration",
        };
        bank += 1;
    }

    table
}

impl RdsParam {
    /// Look up a parameter by its dense index
    pub fn from_index(index: usize) -> Option<Self> {
        CATALOG.get(index).map(|info| info.param)
    }

    /// Dense index of this parameter
    ///
    /// Bank numbers above 39 do not exist; such values map past the end of
    /// the catalog and are rejected by [`info`](Self::info) lookups.
    pub const fn index(self) -> usize {
        match self {
            Self::ProgramService(bank) => bank as usize,
            Self::Duration(bank) => BANK_COUNT as usize + bank as usize,
            Self::RadioText => 2 * BANK_COUNT as usize,
        }
    }

    /// Catalog entry, or `None` for an out-of-range bank number
    pub fn info(self) -> Option<&'static RdsParamInfo> {
        let info = CATALOG.get(self.index())?;
        (info.param == self).then_some(info)
    }

    /// Name sent to the encoder, e.g. `PS07`
    pub fn wire_name(self) -> heapless::String<4> {
        let mut name = heapless::String::new();
        // Four bytes always fit "PSnn"
        let _ = fmt::write(&mut name, format_args!("{}", self));
        name
    }
}

impl fmt::Display for RdsParam {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::ProgramService(bank) => write!(f, "PS{:02}", bank),
            Self::Duration(bank) => write!(f, "PD{:02}", bank),
            Self::RadioText => write!(f, "RT"),
        }
    }
}

/// Error returned when a parameter name is not in the catalog
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct UnknownParam;

impl fmt::Display for UnknownParam {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "unknown RDS parameter")
    }
}

#[cfg(feature = "std")]
impl std::error::Error for UnknownParam {}

impl FromStr for RdsParam {
    type Err = UnknownParam;

    /// Parse a parameter name such as `PS00`, `pd12` or `RT`
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s.eq_ignore_ascii_case("RT") {
            return Ok(Self::RadioText);
        }
        if s.len() != 4 || !s.is_char_boundary(2) {
            return Err(UnknownParam);
        }

        let (prefix, digits) = s.split_at(2);
        if !digits.bytes().all(|b| b.is_ascii_digit()) {
            return Err(UnknownParam);
        }
        let bank: u8 = digits.parse().map_err(|_| UnknownParam)?;
        if bank >= BANK_COUNT {
            return Err(UnknownParam);
        }

        if prefix.eq_ignore_ascii_case("PS") {
            Ok(Self::ProgramService(bank))
        } else if prefix.eq_ignore_ascii_case("PD") {
            Ok(Self::Duration(bank))
        } else {
            Err(UnknownParam)
        }
    }
}
