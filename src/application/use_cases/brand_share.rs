use std::collections::HashMap;

use serde::Serialize;

use crate::domain::listing::{columns, ListingRecord};

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BrandShare {
    pub brand: String,
    pub units: f64,
    /// Percent of all units, 0-100
    pub percentage: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BrandConcentration {
    /// Descending by units, truncated to the configured top N
    pub brands: Vec<BrandShare>,
    pub total_units: f64,
    pub top3_share: f64,
    pub top10_share: f64,
}

/// Brand of a record, `Unknown` when blank
pub fn brand_of(record: &ListingRecord) -> String {
    record
        .get(columns::BRAND)
        .and_then(|v| v.as_text())
        .unwrap_or_else(|| columns::UNKNOWN_BRAND.to_string())
}

fn recent_units(record: &ListingRecord) -> f64 {
    record
        .get(columns::RECENT_SALES)
        .and_then(|v| v.as_f64())
        .unwrap_or(0.0)
}

/// Brand share over `近30天销量`; non-numeric sales count as zero
pub fn brand_share(records: &[ListingRecord], top_n: usize) -> BrandConcentration {
    let mut totals: Vec<(String, f64)> = Vec::new();
    let mut index: HashMap<String, usize> = HashMap::new();
    let mut total_units = 0.0;

    for record in records {
        let brand = brand_of(record);
        let units = recent_units(record);
        total_units += units;
        match index.get(&brand) {
            Some(&pos) => totals[pos].1 += units,
            None => {
                index.insert(brand.clone(), totals.len());
                totals.push((brand, units));
            }
        }
    }

    // stable: equal totals keep first-seen order
    totals.sort_by(|a, b| b.1.total_cmp(&a.1));

    let brands: Vec<BrandShare> = totals
        .into_iter()
        .take(top_n)
        .map(|(brand, units)| BrandShare {
            percentage: if total_units > 0.0 {
                units / total_units * 100.0
            } else {
                0.0
            },
            brand,
            units,
        })
        .collect();

    let share_of = |n: usize| brands.iter().take(n).map(|b| b.percentage).sum::<f64>();
    let top3_share = share_of(3);
    let top10_share = share_of(10);

    BrandConcentration {
        brands,
        total_units,
        top3_share,
        top10_share,
    }
}
