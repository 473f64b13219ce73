use serde::Serialize;

use crate::application::use_cases::brand_share::BrandConcentration;
use crate::application::use_cases::market_analysis::MarketAnalysis;
use crate::application::use_cases::price_scatter::ScatterPoint;
use crate::application::use_cases::sales_rollup::{MonthlyRollup, YearlyTrend};
use crate::domain::listing::{ClassifiedFiles, HistorySuffix, ListingRecord};

#[derive(Debug, Serialize)]
pub struct ClassifyResponse {
    pub marketplace: String,
    pub product: String,
    pub keywords: String,
    pub sales: Vec<String>,
}

impl From<&ClassifiedFiles> for ClassifyResponse {
    fn from(files: &ClassifiedFiles) -> Self {
        Self {
            marketplace: files.marketplace.clone(),
            product: files.product.name.clone(),
            keywords: files.keywords.name.clone(),
            sales: files.sales.iter().map(|f| f.name.clone()).collect(),
        }
    }
}

#[derive(Debug, Serialize)]
pub struct MergeResponse<'a> {
    pub marketplace: &'a str,
    pub headers: &'a [String],
    /// All merged rows
    pub total_rows: usize,
    /// Rows left after search, filter and brand selection
    pub matched_rows: usize,
    pub page: usize,
    pub page_size: usize,
    pub total_pages: usize,
    pub rows: Vec<&'a ListingRecord>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub exported_to: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub analysis: Option<AnalyzeResponse>,
}

#[derive(Debug, Serialize)]
pub struct AnalyzeResponse {
    pub source: String,
    pub rows: usize,
    pub scatter: Vec<ScatterPoint>,
    pub monthly: MonthlyRollup,
    pub brands: BrandConcentration,
}

impl From<MarketAnalysis> for AnalyzeResponse {
    fn from(analysis: MarketAnalysis) -> Self {
        Self {
            source: analysis.source,
            rows: analysis.rows,
            scatter: analysis.scatter,
            monthly: analysis.monthly,
            brands: analysis.brands,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct TrendResponse {
    pub asin: String,
    pub series: HistorySuffix,
    pub suffix: &'static str,
    pub years: Vec<YearlyTrend>,
}
