// ============================================================
// MARKET ANALYSIS USE CASE
// ============================================================
// Price scatter, monthly sales rollup and brand share of either
// one product export or a merged dataset

use std::sync::Arc;

use serde::Serialize;
use tracing::info;

use super::brand_share::{brand_share, BrandConcentration};
use super::key_normalizer::normalize_records;
use super::price_scatter::{price_scatter, ScatterPoint};
use super::sales_rollup::{monthly_rollup, MonthlyRollup};
use crate::domain::error::{AppError, Result};
use crate::domain::listing::{
    EmptyCellPolicy, ListingRecord, MergeConfig, MergedDataset, SourceFile,
};
use crate::infrastructure::spreadsheet::SheetSource;

#[derive(Debug, Clone, Serialize)]
pub struct MarketAnalysis {
    /// File name, or the marketplace of a merged dataset
    pub source: String,
    pub rows: usize,
    pub scatter: Vec<ScatterPoint>,
    pub monthly: MonthlyRollup,
    pub brands: BrandConcentration,
}

pub struct MarketAnalyzer {
    source: Arc<dyn SheetSource>,
    config: MergeConfig,
}

impl MarketAnalyzer {
    pub fn new(source: Arc<dyn SheetSource>, config: MergeConfig) -> Self {
        Self { source, config }
    }

    fn validate(&self) -> Result<()> {
        self.config
            .validate()
            .map_err(|e| AppError::Validation(format!("Invalid merge config: {}", e)))
    }

    /// Analyze one product export on its own
    pub async fn analyze(&self, file: &SourceFile) -> Result<MarketAnalysis> {
        self.validate()?;

        // empty cells stay null so they are not counted as zero sales
        let rows = self
            .source
            .read_sheet(file, None, EmptyCellPolicy::Null)
            .await?;
        let records = normalize_records(&rows);

        Ok(self.summarize(&file.name, &records))
    }

    /// Analyze merged rows; sub-item history columns drive the monthly rollup
    pub fn analyze_dataset(&self, dataset: &MergedDataset) -> Result<MarketAnalysis> {
        self.validate()?;
        Ok(self.summarize(&dataset.marketplace, &dataset.records))
    }

    fn summarize(&self, source: &str, records: &[ListingRecord]) -> MarketAnalysis {
        let scatter = price_scatter(records);
        let monthly = monthly_rollup(records);
        let brands = brand_share(records, self.config.brand_top_n);

        info!(
            source = %source,
            rows = records.len(),
            points = scatter.len(),
            years = monthly.years.len(),
            brands = brands.brands.len(),
            "Market analysis complete"
        );

        MarketAnalysis {
            source: source.to_string(),
            rows: records.len(),
            scatter,
            monthly,
            brands,
        }
    }
}
