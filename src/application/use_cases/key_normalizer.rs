// ============================================================
// KEY NORMALIZER
// ============================================================
// Canonicalize raw spreadsheet headers so the same logical column
// produced by different exports ends up under one key

use once_cell::sync::Lazy;
use regex::Regex;

use crate::domain::listing::{columns, ListingRecord};
use crate::infrastructure::spreadsheet::EMPTY_HEADER_PLACEHOLDER;

static RANKING_HEADER_PATTERN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^自然排名\s*\(.+\)$").unwrap());

/// Ambiguous "monthly sales" header, renamed to the parent-level label
const AMBIGUOUS_MONTHLY_SALES: &str = "月销量";

const CURRENCY_SUFFIX: &str = "($)";

fn is_invisible(c: char) -> bool {
    matches!(c, '\u{200B}'..='\u{200D}' | '\u{FEFF}')
}

/// Map full-width brackets and punctuation to their half-width forms
pub fn to_half_width(s: &str) -> String {
    s.chars()
        .map(|c| match c {
            '（' | '【' | '［' => '(',
            '）' | '】' | '］' => ')',
            '，' => ',',
            '：' => ':',
            '；' => ';',
            other => other,
        })
        .collect()
}

/// Canonical form of a raw header. Pure and total; an empty result means
/// the column should be dropped.
pub fn normalize(raw: &str) -> String {
    let stripped: String = raw.trim().chars().filter(|c| !is_invisible(*c)).collect();
    if stripped.trim().is_empty() {
        return String::new();
    }

    // removing one marker can expose another, e.g. `价格($($))`
    let mut key = to_half_width(&stripped);
    while key.contains(CURRENCY_SUFFIX) {
        key = key.replace(CURRENCY_SUFFIX, "");
    }
    let key = key.trim().to_string();

    apply_domain_overrides(key)
}

fn apply_domain_overrides(key: String) -> String {
    if RANKING_HEADER_PATTERN.is_match(&key) {
        return columns::RANKING.to_string();
    }
    if key == AMBIGUOUS_MONTHLY_SALES {
        return columns::PARENT_SALES.to_string();
    }
    key
}

/// Keys that only exist because a source column had no usable header
pub fn is_placeholder_key(key: &str) -> bool {
    key.starts_with(EMPTY_HEADER_PLACEHOLDER) || key.to_lowercase().contains("unnamed")
}

/// Normalize every key of a record, dropping placeholder columns.
/// When two raw headers normalize to the same key the later one wins.
pub fn normalize_record(record: &ListingRecord) -> ListingRecord {
    let mut out = ListingRecord::new();
    for (key, value) in record.iter() {
        let clean = normalize(key);
        if clean.is_empty() || is_placeholder_key(&clean) {
            continue;
        }
        out.insert(clean, value.clone());
    }
    out
}

pub fn normalize_records(records: &[ListingRecord]) -> Vec<ListingRecord> {
    records.iter().map(normalize_record).collect()
}

/// Loose form used when comparing headers against synonym lists:
/// no whitespace, lowercase, no brackets, no currency symbols
pub fn loose_key(s: &str) -> String {
    s.chars()
        .filter(|c| !c.is_whitespace())
        .filter(|c| !matches!(c, '（' | '【' | '［' | '(' | '）' | '】' | '］' | ')' | '$' | '￥'))
        .flat_map(char::to_lowercase)
        .collect()
}
