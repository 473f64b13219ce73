// ============================================================
// CSV EXPORTER
// ============================================================
// Write an export layout as UTF-8 CSV. Each linkable column is
// followed by a `<column> 链接` column holding the hyperlink.

use std::fs::File;
use std::io::Write;
use std::path::Path;

use csv::WriterBuilder;
use tracing::{info, warn};

use crate::application::use_cases::export_layout::ExportLayout;
use crate::domain::error::{AppError, Result};

const LINK_COLUMN_SUFFIX: &str = " 链接";

/// Byte order mark so spreadsheet applications detect UTF-8
const UTF8_BOM: &[u8] = &[0xEF, 0xBB, 0xBF];

pub struct CsvExporter {
    bom: bool,
}

impl Default for CsvExporter {
    fn default() -> Self {
        Self {
            bom: true,
        }
    }
}

impl CsvExporter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_bom(mut self, bom: bool) -> Self {
        self.bom = bom;
        self
    }

    /// Header row including the companion link columns
    pub fn header_row(layout: &ExportLayout) -> Vec<String> {
        let mut header = Vec::with_capacity(layout.columns.len() * 2);
        for column in &layout.columns {
            header.push(column.header.clone());
            if column.kind.is_linkable() {
                header.push(format!("{}{}", column.header, LINK_COLUMN_SUFFIX));
            }
        }
        header
    }

    pub fn write<W: Write>(&self, layout: &ExportLayout, mut out: W) -> Result<()> {
        if self.bom {
            out.write_all(UTF8_BOM)?;
        }

        let mut wtr = WriterBuilder::new().from_writer(out);

        wtr.write_record(Self::header_row(layout))?;

        for row in &layout.rows {
            let mut record: Vec<&str> = Vec::with_capacity(row.len() * 2);
            for (column, cell) in layout.columns.iter().zip(row) {
                record.push(&cell.text);
                if column.kind.is_linkable() {
                    record.push(cell.link.as_deref().unwrap_or(""));
                }
            }
            wtr.write_record(&record)?;
        }

        wtr.flush()?;
        Ok(())
    }

    pub fn write_to_path(&self, layout: &ExportLayout, path: &Path) -> Result<()> {
        if layout.is_empty() {
            warn!(path = %path.display(), "No rows to export, writing headers only");
        }
        let file = File::create(path).map_err(|e| {
            AppError::Export(format!("Failed to create {}: {}", path.display(), e))
        })?;
        self.write(layout, file)?;

        info!(
            path = %path.display(),
            rows = layout.rows.len(),
            columns = layout.columns.len(),
            "Exported CSV"
        );
        Ok(())
    }
}
