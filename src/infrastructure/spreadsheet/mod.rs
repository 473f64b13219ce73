#[cfg(test)]
mod memory_workbook;
mod sheet_reader;

#[cfg(test)]
pub use memory_workbook::MemoryWorkbookSource;
pub use sheet_reader::{
    assemble_records, records_from_range, unique_headers, CalamineSheetReader, SheetSource,
    EMPTY_HEADER_PLACEHOLDER,
};
