// ============================================================
// DERIVED METRICS
// ============================================================
// Synthetic per-record columns computed after normalization:
// organic:ad traffic ratio and listing-age bucket

use chrono::{Datelike, NaiveDate, NaiveDateTime};
use tracing::debug;

use crate::domain::listing::{columns, serial_to_date, CellValue, ListingRecord};

/// Listing-age buckets with their inclusive upper bound in months
const AGE_BUCKETS: &[(i32, &str)] = &[(3, "3个月"), (6, "6个月"), (9, "9个月"), (12, "12个月")];
const AGE_OVERFLOW_BUCKET: &str = "1年+";

const DATE_FORMATS: &[&str] = &["%Y-%m-%d", "%Y/%m/%d", "%Y.%m.%d", "%Y年%m月%d日"];
const DATETIME_FORMATS: &[&str] = &["%Y-%m-%d %H:%M:%S", "%Y/%m/%d %H:%M:%S", "%Y-%m-%dT%H:%M:%S"];

/// Percentage text of a share value: `0.35` -> `35`, `"35%"` -> `35`
fn share_percent(value: &CellValue) -> Option<String> {
    if let CellValue::Text(text) = value {
        let text = text.trim();
        if text.contains('%') {
            return Some(text.trim_end_matches('%').trim().to_string());
        }
    }
    let share = value.as_f64()?;
    Some(format!("{}", (share * 100.0).round() as i64))
}

/// `"{organic}%:{ad}%"` when both traffic shares are present
pub fn traffic_ratio(record: &ListingRecord) -> Option<String> {
    let organic = record
        .get(columns::ORGANIC_TRAFFIC_SHARE)
        .filter(|v| !v.is_blank())?;
    let ad = record
        .get(columns::AD_TRAFFIC_SHARE)
        .filter(|v| !v.is_blank())?;
    Some(format!("{}%:{}%", share_percent(organic)?, share_percent(ad)?))
}

/// Parse a listing date from text or a spreadsheet serial number
pub fn parse_listing_date(value: &CellValue) -> Option<NaiveDate> {
    match value {
        CellValue::Number(serial) => serial_to_date(*serial),
        CellValue::Text(text) => {
            let text = text.trim();
            if text.is_empty() {
                return None;
            }
            DATE_FORMATS
                .iter()
                .find_map(|fmt| NaiveDate::parse_from_str(text, fmt).ok())
                .or_else(|| {
                    DATETIME_FORMATS
                        .iter()
                        .find_map(|fmt| NaiveDateTime::parse_from_str(text, fmt).ok())
                        .map(|dt| dt.date())
                })
                .or_else(|| text.parse::<f64>().ok().and_then(serial_to_date))
        }
        CellValue::Empty => None,
    }
}

/// Whole calendar months from `from` to `to`; a partial month is not counted
pub fn whole_months_between(from: NaiveDate, to: NaiveDate) -> i32 {
    let mut months = (to.year() - from.year()) * 12 + to.month() as i32 - from.month() as i32;
    if to.day() < from.day() {
        months -= 1;
    }
    months
}

pub fn age_bucket(months: i32) -> &'static str {
    AGE_BUCKETS
        .iter()
        .find(|(limit, _)| months <= *limit)
        .map(|(_, label)| *label)
        .unwrap_or(AGE_OVERFLOW_BUCKET)
}

/// Listing-age bucket relative to `today`; `None` when the date is missing
/// or unparseable
pub fn listing_age(record: &ListingRecord, today: NaiveDate) -> Option<&'static str> {
    let raw = record.get(columns::LISTING_DATE)?;
    let Some(listed) = parse_listing_date(raw) else {
        debug!(value = %raw, "Unparseable listing date");
        return None;
    };
    Some(age_bucket(whole_months_between(listed, today)))
}

/// Add derived columns to one record. Existing non-blank values are kept.
pub fn derive_record(record: &mut ListingRecord, today: NaiveDate) {
    if let Some(ratio) = traffic_ratio(record) {
        record.insert(columns::TRAFFIC_RATIO, ratio);
    }

    let has_age = record
        .get(columns::LISTING_AGE)
        .is_some_and(|v| !v.is_blank());
    if !has_age {
        if let Some(bucket) = listing_age(record, today) {
            record.insert(columns::LISTING_AGE, bucket);
        }
    }
}

pub fn apply_derived_metrics(records: &mut [ListingRecord], today: NaiveDate) {
    for record in records.iter_mut() {
        derive_record(record, today);
    }
}
