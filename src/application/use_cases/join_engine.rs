// Left-join keyword and sales records onto product rows by ASIN

use std::collections::HashMap;

use tracing::{debug, info};

use crate::domain::listing::ListingRecord;

/// ASIN -> record map. Rows without an identifier are skipped and a
/// repeated identifier keeps the last row seen.
pub fn build_lookup(records: &[ListingRecord]) -> HashMap<String, ListingRecord> {
    let mut lookup = HashMap::with_capacity(records.len());
    let mut skipped = 0usize;
    for record in records {
        match record.product_identifier() {
            Some(asin) => {
                lookup.insert(asin, record.clone());
            }
            None => skipped += 1,
        }
    }
    if skipped > 0 {
        debug!(skipped, "Rows without ASIN left out of lookup");
    }
    lookup
}

/// Merge one output record per product row.
///
/// Precedence on a shared key: product > keyword > sales. Product rows
/// without an identifier pass through unchanged.
pub fn merge(
    product_rows: &[ListingRecord],
    keyword_lookup: &HashMap<String, ListingRecord>,
    sales_lookup: &HashMap<String, ListingRecord>,
) -> Vec<ListingRecord> {
    let mut keyword_hits = 0usize;
    let mut sales_hits = 0usize;

    let merged: Vec<ListingRecord> = product_rows
        .iter()
        .map(|product| {
            let Some(asin) = product.product_identifier() else {
                return product.clone();
            };

            let mut record = product.clone();
            if let Some(keyword) = keyword_lookup.get(&asin) {
                keyword_hits += 1;
                for (key, value) in keyword.iter() {
                    record.insert_if_absent(key, value);
                }
            }
            if let Some(sales) = sales_lookup.get(&asin) {
                sales_hits += 1;
                for (key, value) in sales.iter() {
                    record.insert_if_absent(key, value);
                }
            }
            record
        })
        .collect();

    info!(
        rows = merged.len(),
        keyword_matches = keyword_hits,
        sales_matches = sales_hits,
        "Merged product rows"
    );
    merged
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::listing::CellValue;

    fn rec(pairs: &[(&str, &str)]) -> ListingRecord {
        ListingRecord::from_pairs(pairs.iter().map(|(k, v)| (*k, *v)))
    }

    #[test]
    fn test_unmatched_product_row_unchanged() {
        let products = vec![rec(&[("ASIN", "B001")])];
        let merged = merge(&products, &HashMap::new(), &HashMap::new());
        assert_eq!(merged, products);
    }

    #[test]
    fn test_product_value_wins_over_keyword_and_sales() {
        let products = vec![rec(&[("ASIN", "B001"), ("品牌", "ProductBrand")])];
        let keywords = build_lookup(&[rec(&[("ASIN", "B001"), ("品牌", "KeywordBrand"), ("流量词", "widget")])]);
        let sales = build_lookup(&[rec(&[("ASIN", "B001"), ("流量词", "sales-side"), ("2025-01-父-U", "12")])]);

        let merged = merge(&products, &keywords, &sales);
        let row = &merged[0];

        assert_eq!(row.get("品牌"), Some(&CellValue::text("ProductBrand")));
        assert_eq!(row.get("流量词"), Some(&CellValue::text("widget")));
        assert_eq!(row.get("2025-01-父-U"), Some(&CellValue::text("12")));
        assert_eq!(
            row.keys().collect::<Vec<_>>(),
            vec!["ASIN", "品牌", "流量词", "2025-01-父-U"]
        );
    }

    #[test]
    fn test_cardinality_matches_product_rows() {
        let products = vec![
            rec(&[("ASIN", "B001")]),
            rec(&[("ASIN", "B001")]),
            rec(&[("SKU", "no-asin")]),
            rec(&[("asin", "B002")]),
        ];
        let keywords = build_lookup(&[
            rec(&[("ASIN", "B001"), ("k", "1")]),
            rec(&[("ASIN", "B001"), ("k", "2")]),
            rec(&[("ASIN", "B003"), ("k", "3")]),
        ]);

        let merged = merge(&products, &keywords, &HashMap::new());
        assert_eq!(merged.len(), products.len());
        assert_eq!(merged[0].get("k"), Some(&CellValue::text("2")));
        assert_eq!(merged[2], products[2]);
        assert!(!merged[3].contains_key("k"));
    }

    #[test]
    fn test_lookup_skips_rows_without_identifier() {
        let lookup = build_lookup(&[rec(&[("SKU", "x")]), rec(&[("asin", "B9")])]);
        assert_eq!(lookup.len(), 1);
        assert!(lookup.contains_key("B9"));
    }
}
