use std::collections::HashMap;

use async_trait::async_trait;

use super::sheet_reader::{assemble_records, SheetSource};
use crate::domain::error::{AppError, Result};
use crate::domain::listing::{CellValue, EmptyCellPolicy, ListingRecord, SourceFile};

#[derive(Debug, Clone, Default)]
struct MemorySheet {
    name: String,
    headers: Vec<String>,
    rows: Vec<Vec<CellValue>>,
}

#[derive(Debug, Clone, Default)]
struct MemoryWorkbook {
    sheets: Vec<MemorySheet>,
    corrupt: bool,
}

/// Workbooks held in memory, looked up by `SourceFile::name`
#[derive(Debug, Clone, Default)]
pub struct MemoryWorkbookSource {
    workbooks: HashMap<String, MemoryWorkbook>,
}

impl MemoryWorkbookSource {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add (or append to) a workbook sheet
    pub fn with_sheet(
        mut self,
        file_name: &str,
        sheet_name: &str,
        headers: &[&str],
        rows: Vec<Vec<CellValue>>,
    ) -> Self {
        self.workbooks
            .entry(file_name.to_string())
            .or_default()
            .sheets
            .push(MemorySheet {
                name: sheet_name.to_string(),
                headers: headers.iter().map(|h| h.to_string()).collect(),
                rows,
            });
        self
    }

    /// Register a workbook with no sheets at all
    pub fn with_empty_workbook(mut self, file_name: &str) -> Self {
        self.workbooks.entry(file_name.to_string()).or_default();
        self
    }

    /// Register a file whose bytes do not decode
    pub fn with_corrupt_file(mut self, file_name: &str) -> Self {
        self.workbooks.entry(file_name.to_string()).or_default().corrupt = true;
        self
    }
}

#[async_trait]
impl SheetSource for MemoryWorkbookSource {
    async fn read_sheet(
        &self,
        file: &SourceFile,
        sheet: Option<&str>,
        policy: EmptyCellPolicy,
    ) -> Result<Vec<ListingRecord>> {
        let workbook = self
            .workbooks
            .get(&file.name)
            .filter(|wb| !wb.corrupt)
            .ok_or_else(|| AppError::Decode(format!("{} is not a readable workbook", file.name)))?;

        let found = match sheet {
            Some(name) => match workbook.sheets.iter().find(|s| s.name == name) {
                Some(found) => found,
                None => return Ok(Vec::new()),
            },
            None => workbook
                .sheets
                .first()
                .ok_or_else(|| AppError::SheetNotFound(format!("No worksheet found in {}", file.name)))?,
        };

        Ok(assemble_records(&found.headers, found.rows.clone(), policy))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn file(name: &str) -> SourceFile {
        SourceFile::new(name, name)
    }

    #[tokio::test]
    async fn test_named_sheet_absent_is_empty() {
        let source = MemoryWorkbookSource::new().with_sheet(
            "sales.xlsx",
            "历史月价格",
            &["ASIN"],
            vec![vec![CellValue::text("B001")]],
        );
        let rows = source
            .read_sheet(&file("sales.xlsx"), Some("子体历史月销量"), EmptyCellPolicy::EmptyString)
            .await
            .unwrap();
        assert!(rows.is_empty());
    }

    #[tokio::test]
    async fn test_first_sheet_missing_is_error() {
        let source = MemoryWorkbookSource::new().with_empty_workbook("empty.xlsx");
        let err = source
            .read_sheet(&file("empty.xlsx"), None, EmptyCellPolicy::EmptyString)
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::SheetNotFound(_)));
    }

    #[tokio::test]
    async fn test_corrupt_file_is_decode_error() {
        let source = MemoryWorkbookSource::new().with_corrupt_file("bad.xlsx");
        let err = source
            .read_sheet(&file("bad.xlsx"), Some("any"), EmptyCellPolicy::EmptyString)
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::Decode(_)));
    }
}
