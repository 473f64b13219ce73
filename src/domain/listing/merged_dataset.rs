use serde::Serialize;

use super::ListingRecord;

/// Merged records plus their display header order
#[derive(Debug, Clone, Serialize)]
pub struct MergedDataset {
    /// Marketplace code from the product file name
    pub marketplace: String,

    /// One record per product-table row
    pub records: Vec<ListingRecord>,

    /// Display/export column order
    pub headers: Vec<String>,
}

impl MergedDataset {
    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Rows shown by an interactive display
    pub fn display_window(&self, limit: usize) -> &[ListingRecord] {
        &self.records[..self.records.len().min(limit)]
    }
}

/// Union of keys across records, in discovery order
pub fn collect_keys(records: &[ListingRecord]) -> Vec<String> {
    let mut seen = std::collections::HashSet::new();
    let mut keys = Vec::new();
    for record in records {
        for key in record.keys() {
            if seen.insert(key) {
                keys.push(key.to_string());
            }
        }
    }
    keys
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_collect_keys_keeps_discovery_order() {
        let records = vec![
            ListingRecord::from_pairs([("ASIN", "B1"), ("品牌", "A")]),
            ListingRecord::from_pairs([("SKU", "S"), ("ASIN", "B2")]),
        ];
        assert_eq!(collect_keys(&records), vec!["ASIN", "品牌", "SKU"]);
    }

    #[test]
    fn test_display_window_is_capped() {
        let dataset = MergedDataset {
            marketplace: "US".to_string(),
            records: vec![ListingRecord::new(); 3],
            headers: Vec::new(),
        };
        assert_eq!(dataset.display_window(2).len(), 2);
        assert_eq!(dataset.display_window(10).len(), 3);
    }
}
