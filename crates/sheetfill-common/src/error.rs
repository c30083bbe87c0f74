//! Spreadsheet error codes as they appear inside cells.
//!
//! Reading a workbook can surface cached error results (`#N/A`, `#DIV/0!`, ...).
//! They are data, not failures of the reader, so they travel as a
//! [`CellValue::Error`](crate::CellValue::Error) and render with their Excel code.

use std::fmt;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// All recognised Excel error codes.
///
/// **Note:** names are CamelCase while `Display` renders them exactly as Excel
/// shows them (`#DIV/0!`, …).
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub enum CellErrorKind {
    Null,
    Ref,
    Name,
    Value,
    Div,
    Na,
    Num,
    GettingData,
}

impl fmt::Display for CellErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Null => "#NULL!",
            Self::Ref => "#REF!",
            Self::Name => "#NAME?",
            Self::Value => "#VALUE!",
            Self::Div => "#DIV/0!",
            Self::Na => "#N/A",
            Self::Num => "#NUM!",
            Self::GettingData => "#GETTING_DATA",
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_matches_excel() {
        assert_eq!(CellErrorKind::Div.to_string(), "#DIV/0!");
        assert_eq!(CellErrorKind::Na.to_string(), "#N/A");
    }
}
