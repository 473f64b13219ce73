// ============================================================
// LISTING DOMAIN LAYER
// ============================================================
// Core types and value objects for merging listing exports
// No I/O, no async

mod cell;
pub mod columns;
mod file_role;
mod merge_config;
mod merged_dataset;
mod record;
mod sales_rule;

pub use cell::{serial_to_date, CellValue, EmptyCellPolicy};
pub use file_role::{ClassifiedFiles, FileRole, SourceFile};
pub use merge_config::MergeConfig;
pub use merged_dataset::{collect_keys, MergedDataset};
pub use record::{ListingRecord, RecordField, IDENTIFIER_KEY};
pub use sales_rule::{
    is_year_month, DateColumnShape, HistorySuffix, SalesSheetRule, SALES_IDENTITY_COLUMNS,
    SALES_SHEET_RULES,
};
