use chrono::{Days, NaiveDate};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Serial day numbers are counted from this date (Excel 1900 system)
const SPREADSHEET_EPOCH: (i32, u32, u32) = (1899, 12, 30);
const MAX_SPREADSHEET_SERIAL: f64 = 2_958_465.0;

/// Calendar date of a spreadsheet serial; the time of day is dropped
pub fn serial_to_date(serial: f64) -> Option<NaiveDate> {
    if !(1.0..=MAX_SPREADSHEET_SERIAL).contains(&serial) {
        return None;
    }
    let (y, m, d) = SPREADSHEET_EPOCH;
    NaiveDate::from_ymd_opt(y, m, d)?.checked_add_days(Days::new(serial.trunc() as u64))
}

/// A single spreadsheet cell after decoding
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum CellValue {
    Number(f64),
    Text(String),
    /// Absent value (decoded as `null`)
    Empty,
}

/// How the sheet reader decodes empty cells
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum EmptyCellPolicy {
    /// Empty cells become `Text("")` (join and display path)
    EmptyString,
    /// Empty cells become `Empty` (metrics path)
    Null,
}

impl EmptyCellPolicy {
    pub fn empty_value(&self) -> CellValue {
        match self {
            EmptyCellPolicy::EmptyString => CellValue::Text(String::new()),
            EmptyCellPolicy::Null => CellValue::Empty,
        }
    }
}

impl CellValue {
    pub fn text(value: impl Into<String>) -> Self {
        CellValue::Text(value.into())
    }

    /// True for `Empty` and for whitespace-only text
    pub fn is_blank(&self) -> bool {
        match self {
            CellValue::Empty => true,
            CellValue::Text(s) => s.trim().is_empty(),
            CellValue::Number(_) => false,
        }
    }

    pub fn is_null(&self) -> bool {
        matches!(self, CellValue::Empty)
    }

    /// Numeric view of the cell.
    ///
    /// Text is parsed after removing thousands separators, `$`, `￥` and `%`,
    /// so `"1,299"` and `"$12.50"` both read as numbers.
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            CellValue::Number(n) if n.is_finite() => Some(*n),
            CellValue::Number(_) => None,
            CellValue::Text(s) => {
                let cleaned: String = s
                    .trim()
                    .chars()
                    .filter(|c| !matches!(c, ',' | '$' | '￥' | '%'))
                    .collect();
                if cleaned.is_empty() {
                    return None;
                }
                cleaned.parse::<f64>().ok().filter(|n| n.is_finite())
            }
            CellValue::Empty => None,
        }
    }

    /// Display text; `None` when blank
    pub fn as_text(&self) -> Option<String> {
        if self.is_blank() {
            None
        } else {
            Some(self.to_string().trim().to_string())
        }
    }
}

impl fmt::Display for CellValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CellValue::Number(n) => {
                if n.fract() == 0.0 && n.abs() < 1e15 {
                    write!(f, "{}", *n as i64)
                } else {
                    write!(f, "{}", n)
                }
            }
            CellValue::Text(s) => write!(f, "{}", s),
            CellValue::Empty => Ok(()),
        }
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
