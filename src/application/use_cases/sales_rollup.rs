use std::collections::{BTreeMap, HashSet};

use serde::Serialize;
use tracing::debug;

use crate::domain::listing::{
    collect_keys, columns, is_year_month, HistorySuffix, ListingRecord,
};

/// Which monthly columns fed the rollup
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum RollupSource {
    /// `YYYY-MM-子-U` columns, every row summed
    SubItem,
    /// Raw `YYYY-MM` columns, each parent counted once per month
    Parent,
}

/// Twelve monthly values of one year. `None` means the month has no column.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct YearlyTrend {
    pub year: i32,
    pub months: [Option<f64>; 12],
}

impl YearlyTrend {
    fn new(year: i32) -> Self {
        Self {
            year,
            months: [None; 12],
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MonthlyRollup {
    pub source: Option<RollupSource>,
    /// Ascending by year
    pub years: Vec<YearlyTrend>,
}

/// Split `YYYY-MM` into year and 1-based month
fn split_year_month(year_month: &str) -> Option<(i32, usize)> {
    if !is_year_month(year_month) {
        return None;
    }
    let (year, month) = year_month.split_once('-')?;
    let month: usize = month.parse().ok()?;
    if !(1..=12).contains(&month) {
        return None;
    }
    Some((year.parse().ok()?, month))
}

/// Key a row is de-duplicated on in parent mode
fn parent_identity(record: &ListingRecord, row: usize) -> String {
    record
        .get(columns::PARENT_ASIN)
        .and_then(|v| v.as_text())
        .or_else(|| record.product_identifier())
        .unwrap_or_else(|| format!("#row-{row}"))
}

/// Monthly unit-sales rollup across all records.
///
/// Sub-item columns are preferred when any exist; then every row counts.
/// Otherwise raw `YYYY-MM` columns are used and a parent ASIN is counted
/// at most once per month.
pub fn monthly_rollup(records: &[ListingRecord]) -> MonthlyRollup {
    let keys = collect_keys(records);

    let sub_item: Vec<(&str, (i32, usize))> = keys
        .iter()
        .filter_map(|key| match HistorySuffix::parse_key(key) {
            Some((ym, HistorySuffix::ChildUnits)) => Some((key.as_str(), split_year_month(ym)?)),
            _ => None,
        })
        .collect();

    let (source, month_columns) = if !sub_item.is_empty() {
        (RollupSource::SubItem, sub_item)
    } else {
        let parent: Vec<(&str, (i32, usize))> = keys
            .iter()
            .filter_map(|key| Some((key.as_str(), split_year_month(key)?)))
            .collect();
        if parent.is_empty() {
            return MonthlyRollup {
                source: None,
                years: Vec::new(),
            };
        }
        (RollupSource::Parent, parent)
    };

    let mut years: BTreeMap<i32, YearlyTrend> = BTreeMap::new();
    for (column, (year, month)) in &month_columns {
        let total = match source {
            RollupSource::SubItem => sum_all_rows(records, column),
            RollupSource::Parent => sum_once_per_parent(records, column),
        };
        let trend = years.entry(*year).or_insert_with(|| YearlyTrend::new(*year));
        let slot = &mut trend.months[month - 1];
        *slot = Some(slot.unwrap_or(0.0) + total);
    }

    debug!(?source, columns = month_columns.len(), years = years.len(), "Monthly rollup built");
    MonthlyRollup {
        source: Some(source),
        years: years.into_values().collect(),
    }
}

fn sum_all_rows(records: &[ListingRecord], column: &str) -> f64 {
    records
        .iter()
        .filter_map(|r| r.get(column).and_then(|v| v.as_f64()))
        .sum()
}

fn sum_once_per_parent(records: &[ListingRecord], column: &str) -> f64 {
    let mut seen = HashSet::new();
    let mut total = 0.0;
    for (row, record) in records.iter().enumerate() {
        let Some(value) = record.get(column).filter(|v| !v.is_blank()) else {
            continue;
        };
        if seen.insert(parent_identity(record, row)) {
            total += value.as_f64().unwrap_or(0.0);
        }
    }
    total
}

/// Monthly history of one record for one suffix
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TrendHistory {
    pub suffix: HistorySuffix,
    /// Newest first; only years with at least one value
    pub years: Vec<YearlyTrend>,
}

impl TrendHistory {
    pub fn is_empty(&self) -> bool {
        self.years.is_empty()
    }
}

/// Trend of one record over `window_years` years ending at `current_year`
pub fn trend_history(
    record: &ListingRecord,
    suffix: HistorySuffix,
    current_year: i32,
    window_years: u32,
) -> TrendHistory {
    let span = i32::try_from(window_years.saturating_sub(1)).unwrap_or(i32::MAX);
    let oldest = current_year.saturating_sub(span);
    let mut years: BTreeMap<i32, YearlyTrend> = BTreeMap::new();

    for (key, value) in record.iter() {
        let Some((ym, key_suffix)) = HistorySuffix::parse_key(key) else {
            continue;
        };
        if key_suffix != suffix {
            continue;
        }
        let Some((year, month)) = split_year_month(ym) else {
            continue;
        };
        if year < oldest || year > current_year {
            continue;
        }
        if let Some(n) = value.as_f64() {
            years.entry(year).or_insert_with(|| YearlyTrend::new(year)).months[month - 1] = Some(n);
        }
    }

    TrendHistory {
        suffix,
        years: years.into_values().rev().collect(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::listing::CellValue;

    fn rec(pairs: &[(&str, CellValue)]) -> ListingRecord {
        ListingRecord::from_pairs(pairs.iter().cloned())
    }

    fn n(v: f64) -> CellValue {
        CellValue::Number(v)
    }

    #[test]
    fn test_parent_mode_counts_each_parent_once() {
        let records = vec![
            rec(&[("ASIN", "A1".into()), ("父ASIN", "P1".into()), ("2025-01", n(100.0))]),
            rec(&[("ASIN", "A2".into()), ("父ASIN", "P1".into()), ("2025-01", n(100.0))]),
            rec(&[("ASIN", "A3".into()), ("父ASIN", "".into()), ("2025-01", n(40.0))]),
            rec(&[("ASIN", "A4".into()), ("2025-01", CellValue::Empty), ("2025-02", n(5.0))]),
        ];
        let rollup = monthly_rollup(&records);

        assert_eq!(rollup.source, Some(RollupSource::Parent));
        assert_eq!(rollup.years.len(), 1);
        assert_eq!(rollup.years[0].months[0], Some(140.0));
        assert_eq!(rollup.years[0].months[1], Some(5.0));
        assert_eq!(rollup.years[0].months[2], None);
    }

    #[test]
    fn test_sub_item_mode_sums_every_row() {
        let records = vec![
            rec(&[("ASIN", "A1".into()), ("父ASIN", "P1".into()), ("2025-01-子-U", n(10.0)), ("2025-01", n(999.0))]),
            rec(&[("ASIN", "A2".into()), ("父ASIN", "P1".into()), ("2025-01-子-U", n(15.0))]),
            rec(&[("ASIN", "A2".into()), ("父ASIN", "P1".into()), ("2025-01-子-U", n(5.0))]),
        ];
        let rollup = monthly_rollup(&records);

        assert_eq!(rollup.source, Some(RollupSource::SubItem));
        assert_eq!(rollup.years[0].months[0], Some(30.0));
    }

    #[test]
    fn test_column_without_values_is_zero() {
        let records = vec![
            rec(&[("ASIN", "A1".into()), ("2024-12", CellValue::Empty), ("2025-03", n(7.0))]),
        ];
        let rollup = monthly_rollup(&records);

        let years: Vec<i32> = rollup.years.iter().map(|y| y.year).collect();
        assert_eq!(years, vec![2024, 2025]);
        assert_eq!(rollup.years[0].months[11], Some(0.0));
        assert_eq!(rollup.years[1].months[2], Some(7.0));
        assert_eq!(rollup.years[1].months[0], None);
    }

    #[test]
    fn test_no_monthly_columns() {
        let rollup = monthly_rollup(&[rec(&[("ASIN", "A1".into())])]);
        assert_eq!(rollup.source, None);
        assert!(rollup.years.is_empty());
    }

    #[test]
    fn test_trend_history_window_newest_first() {
        let record = rec(&[
            ("ASIN", "A1".into()),
            ("2023-05-子-P", n(9.0)),
            ("2024-01-子-P", n(19.99)),
            ("2026-02-子-P", "21.5".into()),
            ("2026-03-子-P", "".into()),
            ("2026-02-父-U", n(300.0)),
        ]);
        let history = trend_history(&record, HistorySuffix::ChildPrice, 2026, 3);

        let years: Vec<i32> = history.years.iter().map(|y| y.year).collect();
        assert_eq!(years, vec![2026, 2024]);
        assert_eq!(history.years[0].months[1], Some(21.5));
        assert_eq!(history.years[0].months[2], None);
        assert_eq!(history.years[1].months[0], Some(19.99));
    }

    #[test]
    fn test_trend_history_empty_outside_window() {
        let record = rec(&[("2019-01-父-U", n(1.0))]);
        assert!(trend_history(&record, HistorySuffix::ParentUnits, 2026, 3).is_empty());
    }

    #[test]
    fn test_trend_history_huge_window_does_not_wrap() {
        let record = rec(&[("2019-01-父-U", n(1.0))]);
        let history = trend_history(&record, HistorySuffix::ParentUnits, 2026, u32::MAX);
        assert_eq!(history.years.len(), 1);
        assert_eq!(history.years[0].year, 2019);
    }
}
