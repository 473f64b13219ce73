// ============================================================
// SALES HISTORY RECONCILER
// ============================================================
// Rename the date columns of every sales sheet to
// `{year}-{month}{suffix}` and fold them into one record per ASIN

use std::collections::HashMap;

use tracing::{debug, info, warn};

use super::key_normalizer::to_half_width;
use crate::domain::listing::{
    is_year_month, DateColumnShape, EmptyCellPolicy, ListingRecord, SalesSheetRule, SourceFile,
    IDENTIFIER_KEY, SALES_IDENTITY_COLUMNS, SALES_SHEET_RULES,
};
use crate::infrastructure::spreadsheet::SheetSource;

/// Per-ASIN accumulation of renamed history columns.
///
/// Colliding keys are overwritten: the last file/sheet processed wins.
#[derive(Debug, Clone, Default)]
pub struct SalesAccumulator {
    records: HashMap<String, ListingRecord>,
}

impl SalesAccumulator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Fold the rows of one sheet into the accumulator; returns the number
    /// of rows that carried an identifier.
    pub fn absorb_sheet(&mut self, rule: &SalesSheetRule, rows: &[ListingRecord]) -> usize {
        let mut absorbed = 0;
        for row in rows {
            let Some(asin) = row.product_identifier() else {
                continue;
            };
            absorbed += 1;

            let target = self.records.entry(asin.clone()).or_insert_with(|| {
                let mut record = ListingRecord::new();
                record.insert(IDENTIFIER_KEY, asin.as_str());
                record
            });

            for (key, value) in row.iter() {
                if SALES_IDENTITY_COLUMNS.contains(&key) {
                    continue;
                }
                if let Some(year_month) = match_date_column(key, rule.shape) {
                    target.insert(rule.suffix.key_for(&year_month), value.clone());
                }
            }
        }
        absorbed
    }

    pub fn get(&self, asin: &str) -> Option<&ListingRecord> {
        self.records.get(asin)
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn into_lookup(self) -> HashMap<String, ListingRecord> {
        self.records
    }
}

/// Year-month of a raw sheet column when it has the rule's date shape
pub fn match_date_column(raw: &str, shape: DateColumnShape) -> Option<String> {
    let candidate = to_half_width(raw.trim());
    let year_month = match shape {
        DateColumnShape::Plain => candidate.as_str(),
        DateColumnShape::Currency => candidate.strip_suffix("($)")?.trim_end(),
    };
    is_year_month(year_month).then(|| year_month.to_string())
}

/// Read the five history sheets of every sales file, in order.
///
/// Sheets that are absent or fail to decode contribute nothing; the
/// remaining sheets and files are still processed.
pub async fn reconcile_sales(source: &dyn SheetSource, files: &[SourceFile]) -> SalesAccumulator {
    let mut accumulator = SalesAccumulator::new();

    for file in files {
        for rule in SALES_SHEET_RULES.iter() {
            let rows = match source
                .read_sheet(file, Some(rule.sheet_name), EmptyCellPolicy::EmptyString)
                .await
            {
                Ok(rows) => rows,
                Err(e) => {
                    warn!(file = %file.name, sheet = rule.sheet_name, error = %e, "Skipping unreadable sales sheet");
                    continue;
                }
            };

            if rows.is_empty() {
                debug!(file = %file.name, sheet = rule.sheet_name, "Sales sheet empty or absent");
                continue;
            }

            let absorbed = accumulator.absorb_sheet(rule, &rows);
            debug!(
                file = %file.name,
                sheet = rule.sheet_name,
                rows = rows.len(),
                absorbed,
                "Absorbed sales sheet"
            );
        }
    }

    info!(
        files = files.len(),
        products = accumulator.len(),
        "Sales history reconciled"
    );
    accumulator
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::listing::{CellValue, HistorySuffix};
    use crate::infrastructure::spreadsheet::MemoryWorkbookSource;

    fn rule(suffix: HistorySuffix) -> SalesSheetRule {
        *SALES_SHEET_RULES.iter().find(|r| r.suffix == suffix).unwrap()
    }

    #[test]
    fn test_match_date_column_shapes() {
        assert_eq!(match_date_column("2025-01", DateColumnShape::Plain).as_deref(), Some("2025-01"));
        assert_eq!(match_date_column("2025-01($)", DateColumnShape::Plain), None);
        assert_eq!(
            match_date_column("2025-01($)", DateColumnShape::Currency).as_deref(),
            Some("2025-01")
        );
        assert_eq!(
            match_date_column(" 2025-01（$）", DateColumnShape::Currency).as_deref(),
            Some("2025-01")
        );
        assert_eq!(match_date_column("2025-01", DateColumnShape::Currency), None);
        assert_eq!(match_date_column("商品标题", DateColumnShape::Plain), None);
    }

    #[test]
    fn test_absorb_renames_only_date_columns() {
        let rows = vec![ListingRecord::from_pairs([
            ("ASIN", CellValue::text("B001")),
            ("SKU", CellValue::text("sku-1")),
            ("商品标题", CellValue::text("Widget")),
            ("2025-01($)", CellValue::Number(1200.0)),
            ("2025-02($)", CellValue::Number(900.0)),
            ("总计", CellValue::Number(2100.0)),
        ])];

        let mut acc = SalesAccumulator::new();
        assert_eq!(acc.absorb_sheet(&rule(HistorySuffix::ParentRevenue), &rows), 1);

        let record = acc.get("B001").unwrap();
        assert_eq!(
            record.keys().collect::<Vec<_>>(),
            vec!["ASIN", "2025-01-父-M", "2025-02-父-M"]
        );
    }

    #[test]
    fn test_rows_without_identifier_skipped() {
        let rows = vec![
            ListingRecord::from_pairs([("ASIN", CellValue::text("")), ("2025-01", CellValue::Number(1.0))]),
            ListingRecord::from_pairs([("asin", CellValue::text("B002")), ("2025-01", CellValue::Number(2.0))]),
        ];
        let mut acc = SalesAccumulator::new();
        assert_eq!(acc.absorb_sheet(&rule(HistorySuffix::ParentUnits), &rows), 1);
        assert_eq!(acc.len(), 1);
        assert!(acc.get("B002").unwrap().contains_key("2025-01-父-U"));
    }

    #[test]
    fn test_last_file_wins_on_collision() {
        let units = rule(HistorySuffix::ChildUnits);
        let first = vec![ListingRecord::from_pairs([
            ("ASIN", CellValue::text("B001")),
            ("2025-01", CellValue::Number(10.0)),
        ])];
        let second = vec![ListingRecord::from_pairs([
            ("ASIN", CellValue::text("B001")),
            ("2025-01", CellValue::Number(25.0)),
            ("2025-02", CellValue::Number(5.0)),
        ])];

        let mut acc = SalesAccumulator::new();
        acc.absorb_sheet(&units, &first);
        acc.absorb_sheet(&units, &second);

        let record = acc.get("B001").unwrap();
        assert_eq!(record.get("2025-01-子-U"), Some(&CellValue::Number(25.0)));
        assert_eq!(record.get("2025-02-子-U"), Some(&CellValue::Number(5.0)));
    }

    #[tokio::test]
    async fn test_reconcile_tolerates_missing_and_broken_sheets() {
        let source = MemoryWorkbookSource::new()
            .with_sheet(
                "product-US-sales-1.xlsx",
                "产品历史月销量",
                &["ASIN", "2025-01", "2025-02"],
                vec![vec![CellValue::text("B001"), CellValue::Number(30.0), CellValue::Number(40.0)]],
            )
            .with_sheet(
                "product-US-sales-1.xlsx",
                "历史月价格",
                &["ASIN", "2025-01($)"],
                vec![vec![CellValue::text("B001"), CellValue::Number(19.99)]],
            )
            .with_corrupt_file("product-US-sales-2.xlsx");

        let files = vec![
            SourceFile::new("product-US-sales-1.xlsx", "a"),
            SourceFile::new("product-US-sales-2.xlsx", "b"),
        ];
        let acc = reconcile_sales(&source, &files).await;

        let record = acc.get("B001").unwrap();
        assert_eq!(record.get("2025-01-父-U"), Some(&CellValue::Number(30.0)));
        assert_eq!(record.get("2025-02-父-U"), Some(&CellValue::Number(40.0)));
        assert_eq!(record.get("2025-01-子-P"), Some(&CellValue::Number(19.99)));
        assert_eq!(record.len(), 4);
    }
}
