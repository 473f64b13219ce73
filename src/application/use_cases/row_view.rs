use std::cmp::Ordering;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use super::brand_share::brand_of;
use super::header_orderer::order_headers;
use crate::domain::listing::{collect_keys, columns, CellValue, ListingRecord, MergedDataset};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortDirection {
    Asc,
    Desc,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SortKey {
    pub column: String,
    pub direction: SortDirection,
}

impl SortKey {
    pub fn asc(column: impl Into<String>) -> Self {
        Self {
            column: column.into(),
            direction: SortDirection::Asc,
        }
    }

    pub fn desc(column: impl Into<String>) -> Self {
        Self {
            column: column.into(),
            direction: SortDirection::Desc,
        }
    }
}

impl FromStr for SortKey {
    type Err = String;

    /// `column`, `column:asc` or `column:desc`
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (column, direction) = match s.rsplit_once(':') {
            Some((column, dir)) if dir.eq_ignore_ascii_case("asc") => (column, SortDirection::Asc),
            Some((column, dir)) if dir.eq_ignore_ascii_case("desc") => (column, SortDirection::Desc),
            _ => (s, SortDirection::Asc),
        };
        let column = column.trim();
        if column.is_empty() {
            return Err(format!("Invalid sort key: {s:?}"));
        }
        Ok(Self {
            column: column.to_string(),
            direction,
        })
    }
}

/// Search, filter, sort and page request
#[derive(Debug, Clone, Default)]
pub struct RowQuery {
    pub search: Option<String>,
    /// Exact (trimmed, case-insensitive) column matches, all must hold
    pub filters: Vec<(String, String)>,
    pub sort: Vec<SortKey>,
    /// 1-based
    pub page: usize,
    pub page_size: usize,
}

#[derive(Debug, Clone, Serialize)]
pub struct Page<'a> {
    pub rows: Vec<&'a ListingRecord>,
    /// Rows matching the search and filters
    pub total: usize,
    pub page: usize,
    pub page_size: usize,
    pub total_pages: usize,
}

fn contains_term(record: &ListingRecord, needle: &str) -> bool {
    needle.is_empty()
        || record
            .iter()
            .any(|(_, value)| value.to_string().to_lowercase().contains(needle))
}

/// Records where any value contains `term`, ignoring case
pub fn search<'a>(records: &'a [ListingRecord], term: &str) -> Vec<&'a ListingRecord> {
    let needle = term.trim().to_lowercase();
    records
        .iter()
        .filter(|record| contains_term(record, &needle))
        .collect()
}

fn matches_filter(record: &ListingRecord, column: &str, expected: &str) -> bool {
    let expected = expected.trim();
    match record.get(column) {
        Some(value) => value.to_string().trim().eq_ignore_ascii_case(expected),
        None => expected.is_empty(),
    }
}

/// Compare two cells ascending: numbers numerically, otherwise as text
fn compare_values(a: &CellValue, b: &CellValue) -> Ordering {
    match (a.as_f64(), b.as_f64()) {
        (Some(x), Some(y)) => x.total_cmp(&y),
        _ => a.to_string().trim().cmp(b.to_string().trim()),
    }
}

fn compare_by(a: &ListingRecord, b: &ListingRecord, key: &SortKey) -> Ordering {
    let left = a.get(&key.column).filter(|v| !v.is_blank());
    let right = b.get(&key.column).filter(|v| !v.is_blank());
    match (left, right) {
        (None, None) => Ordering::Equal,
        // blanks last in both directions
        (None, Some(_)) => Ordering::Greater,
        (Some(_), None) => Ordering::Less,
        (Some(x), Some(y)) => {
            let ord = compare_values(x, y);
            match key.direction {
                SortDirection::Asc => ord,
                SortDirection::Desc => ord.reverse(),
            }
        }
    }
}

/// Stable multi-key sort; later keys break ties of earlier ones
pub fn sort_rows(rows: &mut [&ListingRecord], keys: &[SortKey]) {
    if keys.is_empty() {
        return;
    }
    rows.sort_by(|a, b| {
        keys.iter()
            .map(|key| compare_by(a, b, key))
            .find(|ord| ord.is_ne())
            .unwrap_or(Ordering::Equal)
    });
}

pub fn paginate<'a>(rows: Vec<&'a ListingRecord>, page: usize, page_size: usize) -> Page<'a> {
    let page = page.max(1);
    let page_size = page_size.max(1);
    let total = rows.len();
    let total_pages = total.div_ceil(page_size);

    let start = (page - 1).saturating_mul(page_size);
    let rows = rows.into_iter().skip(start).take(page_size).collect();

    Page {
        rows,
        total,
        page,
        page_size,
        total_pages,
    }
}

/// Apply search, filters, sort and pagination in that order
pub fn apply_query<'a>(mut rows: Vec<&'a ListingRecord>, query: &RowQuery) -> Page<'a> {
    let needle = query
        .search
        .as_deref()
        .map(|term| term.trim().to_lowercase())
        .unwrap_or_default();
    rows.retain(|record| {
        contains_term(record, &needle)
            && query
                .filters
                .iter()
                .all(|(column, expected)| matches_filter(record, column, expected))
    });
    sort_rows(&mut rows, &query.sort);
    paginate(rows, query.page, query.page_size)
}

/// New dataset without the rows of one ASIN; headers are recomputed
pub fn remove_by_identifier(dataset: &MergedDataset, asin: &str) -> MergedDataset {
    let records: Vec<ListingRecord> = dataset
        .records
        .iter()
        .filter(|record| record.product_identifier().as_deref() != Some(asin))
        .cloned()
        .collect();
    let headers = order_headers(&collect_keys(&records));
    MergedDataset {
        marketplace: dataset.marketplace.clone(),
        records,
        headers,
    }
}

/// All rows of one brand, best sellers first. Blank brands are grouped
/// under `Unknown`.
pub fn brand_products<'a>(records: &'a [ListingRecord], brand: &str) -> Vec<&'a ListingRecord> {
    let mut rows: Vec<&ListingRecord> = records.iter().filter(|r| brand_of(r) == brand).collect();
    sort_rows(&mut rows, &[SortKey::desc(columns::RECENT_SALES)]);
    rows
}
