// ============================================================
// MERGE PIPELINE USE CASE
// ============================================================
// classify -> read -> normalize -> reconcile sales -> join
// -> derived metrics -> header order

use std::sync::Arc;
use std::time::Instant;

use chrono::{Local, NaiveDate};
use tracing::{error, info};

use super::derived_metrics::apply_derived_metrics;
use super::file_classifier::classify;
use super::header_orderer::HeaderOrderer;
use super::join_engine::{build_lookup, merge};
use super::key_normalizer::normalize_records;
use super::sales_reconciler::reconcile_sales;
use crate::domain::error::{AppError, Result};
use crate::domain::listing::{
    collect_keys, EmptyCellPolicy, ListingRecord, MergeConfig, MergedDataset, SourceFile,
};
use crate::infrastructure::spreadsheet::SheetSource;

/// Merge use case over an injected sheet source
pub struct MergePipeline {
    source: Arc<dyn SheetSource>,
    config: MergeConfig,
    orderer: HeaderOrderer,
}

impl MergePipeline {
    pub fn new(source: Arc<dyn SheetSource>, config: MergeConfig) -> Self {
        Self {
            source,
            config,
            orderer: HeaderOrderer::default(),
        }
    }

    /// Merge the uploads, bucketing listing age against today's date
    pub async fn run(&self, files: &[SourceFile]) -> Result<MergedDataset> {
        self.run_at(files, Local::now().date_naive()).await
    }

    pub async fn run_at(&self, files: &[SourceFile], today: NaiveDate) -> Result<MergedDataset> {
        let start = Instant::now();

        self.config
            .validate()
            .map_err(|e| AppError::Validation(format!("Invalid merge config: {}", e)))?;

        let classified = classify(files)?;

        let product_rows = self.read_required(&classified.product).await?;
        let keyword_rows = self.read_required(&classified.keywords).await?;
        let sales = reconcile_sales(self.source.as_ref(), &classified.sales).await;

        let product_rows = normalize_records(&product_rows);
        let keyword_rows = normalize_records(&keyword_rows);

        let keyword_lookup = build_lookup(&keyword_rows);
        let sales_lookup = sales.into_lookup();

        let mut records = merge(&product_rows, &keyword_lookup, &sales_lookup);
        apply_derived_metrics(&mut records, today);

        let headers = self.orderer.order(&collect_keys(&records));

        info!(
            marketplace = %classified.marketplace,
            rows = records.len(),
            headers = headers.len(),
            elapsed_ms = start.elapsed().as_millis() as u64,
            "Merge complete"
        );

        Ok(MergedDataset {
            marketplace: classified.marketplace,
            records,
            headers,
        })
    }

    /// Product and keyword tables: first sheet, failures abort the merge
    async fn read_required(&self, file: &SourceFile) -> Result<Vec<ListingRecord>> {
        match self
            .source
            .read_sheet(file, None, EmptyCellPolicy::EmptyString)
            .await
        {
            Ok(rows) => {
                info!(file = %file.name, rows = rows.len(), "Read sheet");
                Ok(rows)
            }
            Err(e) => {
                error!(file = %file.name, error = %e, "Failed to read required file");
                Err(e)
            }
        }
    }
}
