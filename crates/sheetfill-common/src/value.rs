use chrono::{Duration as ChronoDur, NaiveDate, NaiveDateTime, NaiveTime};
use std::{
    fmt::{self, Display},
    hash::{Hash, Hasher},
};

use crate::CellErrorKind;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/* ───────────────────── Excel date-serial utilities ───────────────────
Excel's 1900 serial date system:
  Serial 1  = 1900-01-01
  Serial 59 = 1900-02-28
  Serial 60 = 1900-02-29  (phantom – doesn't exist, but Excel thinks it does)
  Serial 61 = 1900-03-01
Base date = 1899-12-31 so that serial 1 = base + 1 day = 1900-01-01.
The 1904 system (old Mac workbooks) counts from serial 0 = 1904-01-01 and
has no phantom day. Time is stored as fractional days (no timezone).
------------------------------------------------------------------- */

const EXCEL_EPOCH: NaiveDate = match NaiveDate::from_ymd_opt(1899, 12, 31) {
    Some(d) => d,
    None => panic!("invalid epoch"),
};

const EXCEL_EPOCH_1904: NaiveDate = match NaiveDate::from_ymd_opt(1904, 1, 1) {
    Some(d) => d,
    None => panic!("invalid epoch"),
};

const MIDNIGHT: NaiveTime = match NaiveTime::from_hms_opt(0, 0, 0) {
    Some(t) => t,
    None => panic!("invalid midnight"),
};

/// Epoch a workbook's date serials count from.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum DateSystem {
    #[default]
    Excel1900,
    Excel1904,
}

/// Convert a serial to a date-time, or `None` when it falls outside chrono's range.
pub fn serial_to_datetime(serial: f64, system: DateSystem) -> Option<NaiveDateTime> {
    if !serial.is_finite() {
        return None;
    }
    let whole = serial.trunc() as i64;
    // Rounding can reach a full day; carry it into the date.
    let secs = (serial.fract() * 86_400.0).round() as i64;
    let days = whole.checked_add(secs.div_euclid(86_400))?;
    let secs = secs.rem_euclid(86_400);

    let date = match system {
        // Serial 60 is phantom 1900-02-29; map to 1900-02-28
        DateSystem::Excel1900 => {
            let offset = if days < 60 { days } else { days - 1 };
            EXCEL_EPOCH.checked_add_signed(ChronoDur::try_days(offset)?)?
        }
        DateSystem::Excel1904 => EXCEL_EPOCH_1904.checked_add_signed(ChronoDur::try_days(days)?)?,
    };

    let time = NaiveTime::from_num_seconds_from_midnight_opt(secs as u32, 0).unwrap_or(MIDNIGHT);
    Some(date.and_time(time))
}

/// Scalar value read from a single spreadsheet cell.
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Debug, Clone, PartialEq)]
pub enum CellValue {
    Int(i64),
    Number(f64),
    Text(String),
    Boolean(bool),
    Date(NaiveDate),
    DateTime(NaiveDateTime),
    Error(CellErrorKind),
    Empty,
}

impl Hash for CellValue {
    fn hash<H: Hasher>(&self, state: &mut H) {
        match self {
            CellValue::Int(i) => i.hash(state),
            CellValue::Number(n) => n.to_bits().hash(state),
            CellValue::Text(s) => s.hash(state),
            CellValue::Boolean(b) => b.hash(state),
            CellValue::Date(d) => d.hash(state),
            CellValue::DateTime(dt) => dt.hash(state),
            CellValue::Error(e) => e.hash(state),
            CellValue::Empty => state.write_u8(0),
        }
    }
}

impl Eq for CellValue {}

/// Canonical, locale-free rendering.
///
/// Integral floats drop their fractional part (`12345.0` renders `12345`), other
/// floats use the shortest round-trip form, dates are ISO-8601.
impl Display for CellValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CellValue::Int(i) => write!(f, "{i}"),
            CellValue::Number(n) => write_number(f, *n),
            CellValue::Text(s) => f.write_str(s),
            CellValue::Boolean(b) => write!(f, "{b}"),
            CellValue::Date(d) => write!(f, "{}", d.format("%Y-%m-%d")),
            CellValue::DateTime(dt) => {
                if dt.time() == MIDNIGHT {
                    write!(f, "{}", dt.date().format("%Y-%m-%d"))
                } else {
                    write!(f, "{}", dt.format("%Y-%m-%dT%H:%M:%S"))
                }
            }
            CellValue::Error(e) => write!(f, "{e}"),
            CellValue::Empty => Ok(()),
        }
    }
}

fn write_number(f: &mut fmt::Formatter<'_>, n: f64) -> fmt::Result {
    // Above 2^53 floats stop being exact integers; keep the float form there.
    if n.is_finite() && n.fract() == 0.0 && n.abs() < 9_007_199_254_740_992.0 {
        write!(f, "{}", n as i64)
    } else {
        write!(f, "{n}")
    }
}

impl CellValue {
    /// `true` for [`CellValue::Empty`] and for text that is empty or whitespace only.
    pub fn is_blank(&self) -> bool {
        match self {
            CellValue::Empty => true,
            CellValue::Text(s) => s.trim().is_empty(),
            _ => false,
        }
    }

    pub fn as_text(&self) -> Option<&str> {
        match self {
            CellValue::Text(s) => Some(s.as_str()),
            _ => None,
        }
    }

    pub fn as_number(&self) -> Option<f64> {
        match self {
            CellValue::Int(i) => Some(*i as f64),
            CellValue::Number(n) => Some(*n),
            _ => None,
        }
    }

    /// Build a date or date-time from an Excel serial number. Serials outside
    /// the representable range stay numbers.
    pub fn from_serial_number(serial: f64, system: DateSystem) -> Self {
        match serial_to_datetime(serial, system) {
            Some(dt) if dt.time() == MIDNIGHT => CellValue::Date(dt.date()),
            Some(dt) => CellValue::DateTime(dt),
            None => CellValue::Number(serial),
        }
    }

    /// Header-friendly rendering: surrounding whitespace trimmed.
    pub fn to_header_string(&self) -> String {
        self.to_string().trim().to_string()
    }
}

impl From<&str> for CellValue {
    fn from(value: &str) -> Self {
        CellValue::Text(value.to_string())
    }
}

impl From<String> for CellValue {
    fn from(value: String) -> Self {
        CellValue::Text(value)
    }
}

impl From<f64> for CellValue {
    fn from(value: f64) -> Self {
        CellValue::Number(value)
    }
}

impl From<i64> for CellValue {
    fn from(value: i64) -> Self {
        CellValue::Int(value)
    }
}

impl From<bool> for CellValue {
    fn from(value: bool) -> Self {
        CellValue::Boolean(value)
    }
}
