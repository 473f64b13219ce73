// ============================================================
// SHEET READER
// ============================================================
// Decode one sheet of a workbook into header-keyed records

use std::path::PathBuf;

use async_trait::async_trait;
use chrono::Datelike;
use calamine::{open_workbook, Data, Range, Reader, Xlsx};
use tracing::debug;

use crate::domain::error::{AppError, Result};
use crate::domain::listing::{
    serial_to_date, CellValue, EmptyCellPolicy, ListingRecord, SourceFile,
};

/// Prefix used for header cells that are blank in the source sheet
pub const EMPTY_HEADER_PLACEHOLDER: &str = "__EMPTY";

/// Source of sheet rows, one file at a time
#[async_trait]
pub trait SheetSource: Send + Sync {
    /// Read `sheet` (or the first sheet when `None`) as records.
    ///
    /// A missing named sheet yields an empty vector. A workbook without any
    /// sheet on the first-sheet path fails with `SheetNotFound`.
    async fn read_sheet(
        &self,
        file: &SourceFile,
        sheet: Option<&str>,
        policy: EmptyCellPolicy,
    ) -> Result<Vec<ListingRecord>>;
}

/// `.xlsx` reader backed by calamine
#[derive(Debug, Clone, Default)]
pub struct CalamineSheetReader;

impl CalamineSheetReader {
    pub fn new() -> Self {
        Self
    }

    fn read_blocking(
        path: PathBuf,
        name: String,
        sheet: Option<String>,
        policy: EmptyCellPolicy,
    ) -> Result<Vec<ListingRecord>> {
        let mut workbook: Xlsx<_> = open_workbook(&path)
            .map_err(|e| AppError::Decode(format!("Failed to open {}: {}", name, e)))?;

        let range = match sheet {
            Some(sheet_name) => {
                if !workbook.sheet_names().iter().any(|s| s == &sheet_name) {
                    debug!(file = %name, sheet = %sheet_name, "Sheet absent, treating as empty");
                    return Ok(Vec::new());
                }
                workbook.worksheet_range(&sheet_name).map_err(|e| {
                    AppError::Decode(format!("Failed to read {} / {}: {}", name, sheet_name, e))
                })?
            }
            None => workbook
                .worksheet_range_at(0)
                .ok_or_else(|| AppError::SheetNotFound(format!("No worksheet found in {}", name)))?
                .map_err(|e| AppError::Decode(format!("Failed to read {}: {}", name, e)))?,
        };

        Ok(records_from_range(&range, policy))
    }
}

#[async_trait]
impl SheetSource for CalamineSheetReader {
    async fn read_sheet(
        &self,
        file: &SourceFile,
        sheet: Option<&str>,
        policy: EmptyCellPolicy,
    ) -> Result<Vec<ListingRecord>> {
        let path = file.path.clone();
        let name = file.name.clone();
        let sheet = sheet.map(str::to_string);

        tokio::task::spawn_blocking(move || Self::read_blocking(path, name, sheet, policy))
            .await
            .map_err(|e| AppError::Decode(format!("Sheet reader task failed: {}", e)))?
    }
}

/// Convert a calamine range (row 1 = headers) into records
pub fn records_from_range(range: &Range<Data>, policy: EmptyCellPolicy) -> Vec<ListingRecord> {
    let mut rows = range.rows();
    let Some(header_row) = rows.next() else {
        return Vec::new();
    };

    let headers: Vec<String> = header_row.iter().map(header_text).collect();
    let body = rows.map(|row| row.iter().map(cell_value).collect::<Vec<_>>());

    assemble_records(&headers, body, policy)
}

fn cell_value(cell: &Data) -> CellValue {
    match cell {
        Data::Empty | Data::Error(_) => CellValue::Empty,
        Data::String(s) => CellValue::Text(s.clone()),
        Data::Float(f) => CellValue::Number(*f),
        Data::Int(i) => CellValue::Number(*i as f64),
        Data::Bool(b) => CellValue::text(if *b { "TRUE" } else { "FALSE" }),
        Data::DateTimeIso(s) | Data::DurationIso(s) => CellValue::Text(s.clone()),
        // Date-times keep their spreadsheet serial value
        Data::DateTime(dt) => CellValue::Number(dt.as_f64()),
    }
}

/// Header text of a cell. Date-typed headers (a month typed into Excel)
/// render as `YYYY-MM`, or `YYYY-MM-DD` when not the first of the month.
fn header_text(cell: &Data) -> String {
    match cell {
        Data::DateTime(dt) => match serial_to_date(dt.as_f64()) {
            Some(date) if date.day() == 1 => date.format("%Y-%m").to_string(),
            Some(date) => date.format("%Y-%m-%d").to_string(),
            None => dt.to_string(),
        },
        other => other.to_string(),
    }
}

/// Give every column a usable, unique raw header.
///
/// Blank headers become `__EMPTY`, `__EMPTY_1`, ...; repeats of a header
/// become `name_1`, `name_2`, ...
pub fn unique_headers(raw: &[String]) -> Vec<String> {
    let mut seen = std::collections::HashMap::<String, usize>::new();
    raw.iter()
        .map(|h| {
            let base = if h.trim().is_empty() {
                EMPTY_HEADER_PLACEHOLDER.to_string()
            } else {
                h.clone()
            };
            let count = seen.entry(base.clone()).or_insert(0);
            let header = if *count == 0 {
                base.clone()
            } else {
                format!("{}_{}", base, count)
            };
            *count += 1;
            header
        })
        .collect()
}

/// Zip header names with row cells, applying the empty-cell policy.
///
/// Rows whose cells are all blank are skipped; short rows are padded.
pub fn assemble_records<I>(headers: &[String], rows: I, policy: EmptyCellPolicy) -> Vec<ListingRecord>
where
    I: IntoIterator<Item = Vec<CellValue>>,
{
    let headers = unique_headers(headers);
    rows.into_iter()
        .filter(|cells| cells.iter().any(|c| !c.is_blank()))
        .map(|cells| {
            let mut record = ListingRecord::new();
            for (idx, header) in headers.iter().enumerate() {
                let value = match cells.get(idx) {
                    Some(cell) if !cell.is_null() && !is_empty_text(cell) => cell.clone(),
                    _ => policy.empty_value(),
                };
                record.insert(header.clone(), value);
            }
            record
        })
        .collect()
}

fn is_empty_text(cell: &CellValue) -> bool {
    matches!(cell, CellValue::Text(s) if s.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;
    use calamine::{ExcelDateTime, ExcelDateTimeType};

    fn sample_range() -> Range<Data> {
        let mut range = Range::new((0, 0), (3, 2));
        range.set_value((0, 0), Data::String("ASIN".to_string()));
        range.set_value((0, 1), Data::String("价格".to_string()));
        range.set_value((1, 0), Data::String("B001".to_string()));
        range.set_value((1, 1), Data::Float(19.99));
        // row 2 left blank
        range.set_value((3, 0), Data::String("B002".to_string()));
        range
    }

    #[test]
    fn test_range_to_records_empty_string_policy() {
        let records = records_from_range(&sample_range(), EmptyCellPolicy::EmptyString);

        assert_eq!(records.len(), 2);
        assert_eq!(records[0].get("价格"), Some(&CellValue::Number(19.99)));
        assert_eq!(records[1].get("价格"), Some(&CellValue::text("")));
        // third header column is blank in the sheet
        assert!(records[0].contains_key("__EMPTY"));
    }

    #[test]
    fn test_range_to_records_null_policy() {
        let records = records_from_range(&sample_range(), EmptyCellPolicy::Null);
        assert_eq!(records[1].get("价格"), Some(&CellValue::Empty));
    }

    #[test]
    fn test_unique_headers() {
        let raw = vec![
            "ASIN".to_string(),
            "".to_string(),
            "ASIN".to_string(),
            " ".to_string(),
        ];
        assert_eq!(
            unique_headers(&raw),
            vec!["ASIN", "__EMPTY", "ASIN_1", "__EMPTY_1"]
        );
    }

    #[test]
    fn test_int_and_bool_cells() {
        assert_eq!(cell_value(&Data::Int(7)), CellValue::Number(7.0));
        assert_eq!(cell_value(&Data::Bool(true)), CellValue::text("TRUE"));
    }

    #[test]
    fn test_datetime_cell_keeps_serial() {
        let dt = ExcelDateTime::new(45723.0, ExcelDateTimeType::DateTime, false);
        assert_eq!(cell_value(&Data::DateTime(dt)), CellValue::Number(45723.0));
    }

    #[test]
    fn test_date_typed_headers_render_as_year_month() {
        // 45658 = 2025-01-01, 45672 = 2025-01-15
        let month = Data::DateTime(ExcelDateTime::new(45658.0, ExcelDateTimeType::DateTime, false));
        let day = Data::DateTime(ExcelDateTime::new(45672.0, ExcelDateTimeType::DateTime, false));
        assert_eq!(header_text(&month), "2025-01");
        assert_eq!(header_text(&day), "2025-01-15");
        assert_eq!(header_text(&Data::String("ASIN".to_string())), "ASIN");
    }

    #[test]
    fn test_listing_date_column_survives_reading() {
        let mut range = Range::new((0, 0), (1, 1));
        range.set_value((0, 0), Data::String("ASIN".to_string()));
        range.set_value((0, 1), Data::String("上架时间".to_string()));
        range.set_value((1, 0), Data::String("B001".to_string()));
        range.set_value(
            (1, 1),
            Data::DateTime(ExcelDateTime::new(46189.0, ExcelDateTimeType::DateTime, false)),
        );

        let records = records_from_range(&range, EmptyCellPolicy::EmptyString);
        assert_eq!(records[0].get("上架时间"), Some(&CellValue::Number(46189.0)));
    }

    #[tokio::test]
    async fn test_unreadable_file_is_decode_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("Product-US-20260206.xlsx");
        std::fs::write(&path, b"not a zip archive").unwrap();

        let reader = CalamineSheetReader::new();
        let err = reader
            .read_sheet(&SourceFile::from_path(&path), None, EmptyCellPolicy::EmptyString)
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::Decode(_)));
    }
}
