use serde::Serialize;

use super::brand_share::brand_of;
use crate::domain::listing::{columns, CellValue, ListingRecord};

/// The product export's first-image column comes before the generic ones
const SCATTER_IMAGE_SOURCES: &[&str] = &["首图链接", "商品主图", "imageUrl", "image"];

/// One listing on the price vs recent-units chart
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ScatterPoint {
    pub price: f64,
    pub units: f64,
    pub brand: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub asin: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub image_url: Option<String>,
    /// Raw cell; may be a date string or a spreadsheet serial
    #[serde(skip_serializing_if = "Option::is_none")]
    pub launch_date: Option<CellValue>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub rating: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub review_count: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub coupon: Option<String>,
}

fn text_of(record: &ListingRecord, keys: &[&str]) -> Option<String> {
    record.get_any(keys).and_then(CellValue::as_text)
}

fn number_of(record: &ListingRecord, key: &str) -> Option<f64> {
    record.get(key).and_then(CellValue::as_f64)
}

/// Scatter point of a record with a numeric price and recent sales
pub fn scatter_point(record: &ListingRecord) -> Option<ScatterPoint> {
    let price = number_of(record, columns::PRICE)?;
    let units = number_of(record, columns::RECENT_SALES)?;

    Some(ScatterPoint {
        price,
        units,
        brand: brand_of(record),
        asin: record.product_identifier(),
        title: text_of(record, &[columns::TITLE]),
        url: text_of(record, columns::DETAIL_LINKS),
        image_url: text_of(record, SCATTER_IMAGE_SOURCES),
        launch_date: record
            .get(columns::LISTING_DATE)
            .filter(|v| !v.is_blank())
            .cloned(),
        rating: number_of(record, columns::RATING),
        review_count: number_of(record, columns::REVIEW_COUNT),
        coupon: text_of(record, &[columns::COUPON]),
    })
}

/// Price vs units points in row order. Rows lacking either value, or
/// holding non-numeric text there, are left out.
pub fn price_scatter(records: &[ListingRecord]) -> Vec<ScatterPoint> {
    records.iter().filter_map(scatter_point).collect()
}
