// ============================================================
// HEADER ORDERER
// ============================================================
// Deterministic display/export column order for a merged dataset.
// Priority groups are plain data: each group names one logical
// column category and its synonym headers.

use std::collections::HashSet;

use super::key_normalizer::loose_key;
use crate::domain::listing::{columns, IDENTIFIER_KEY};

/// When a group's label is emitted although no present key matched it
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Injection {
    Never,
    Always,
    /// Emit when any of these keys is present
    WhenAnyPresent(&'static [&'static str]),
}

/// One logical column category
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PriorityGroup {
    pub label: &'static str,
    /// Synonym headers, earliest wins
    pub variants: &'static [&'static str],
    pub injection: Injection,
}

impl PriorityGroup {
    const fn matched(label: &'static str, variants: &'static [&'static str]) -> Self {
        Self {
            label,
            variants,
            injection: Injection::Never,
        }
    }
}

pub const PRIORITY_GROUPS: &[PriorityGroup] = &[
    PriorityGroup {
        label: columns::ROW_INDEX,
        variants: &[columns::ROW_INDEX],
        injection: Injection::Always,
    },
    PriorityGroup::matched(IDENTIFIER_KEY, &[IDENTIFIER_KEY]),
    PriorityGroup {
        label: columns::IMAGE,
        variants: &[columns::IMAGE],
        injection: Injection::WhenAnyPresent(columns::IMAGE_SOURCES),
    },
    PriorityGroup::matched("价格", &["价格($)", "价格", "Price"]),
    PriorityGroup::matched("子体销量", &["子体销量", "子体历史月销量", "Sub-item Sales"]),
    PriorityGroup::matched(
        "月销量",
        &[columns::PARENT_SALES, "月销量", "月度销量", "近30天销量", "Monthly Sales"],
    ),
    PriorityGroup::matched("评分数", &["评分数", "评论数", "Reviews"]),
    PriorityGroup::matched("评分", &["评分", "Rating"]),
    PriorityGroup::matched(columns::LISTING_DATE, &[columns::LISTING_DATE, "Date First Available"]),
    PriorityGroup::matched(columns::BRAND, &[columns::BRAND, "Brand"]),
    PriorityGroup::matched("FBA", &["FBA($)", "FBA费用($)", "FBA费用", "FBA Fee", "FBA"]),
    PriorityGroup::matched("SKU", &["SKU"]),
];

#[derive(Debug, Clone)]
pub struct HeaderOrderer {
    groups: Vec<PriorityGroup>,
}

impl Default for HeaderOrderer {
    fn default() -> Self {
        Self::new(PRIORITY_GROUPS.to_vec())
    }
}

impl HeaderOrderer {
    pub fn new(groups: Vec<PriorityGroup>) -> Self {
        Self { groups }
    }

    /// Order the present keys: one representative per priority group, then
    /// every ungrouped key in discovery order. The result is a subset of
    /// the input without duplicates.
    pub fn order_present(&self, keys: &[String]) -> Vec<String> {
        self.run(keys, false)
    }

    /// Like [`order_present`](Self::order_present), but also emits the
    /// synthetic columns (row index, image) the display always carries.
    pub fn order(&self, keys: &[String]) -> Vec<String> {
        self.run(keys, true)
    }

    fn run(&self, keys: &[String], inject: bool) -> Vec<String> {
        let mut seen = HashSet::new();
        let mut pool: Vec<(&str, String)> = keys
            .iter()
            .filter(|k| seen.insert(k.as_str()))
            .map(|k| (k.as_str(), loose_key(k)))
            .collect();

        let mut ordered = Vec::with_capacity(pool.len() + 2);

        for group in &self.groups {
            let variants: Vec<String> = group.variants.iter().map(|v| loose_key(v)).collect();

            let hit = variants.iter().find_map(|variant| {
                pool.iter()
                    .find(|(_, loose)| loose == variant)
                    .map(|(key, _)| key.to_string())
            });

            match hit {
                Some(key) => {
                    ordered.push(key);
                    pool.retain(|(_, loose)| !variants.contains(loose));
                }
                None if inject && self.should_inject(group, keys) => {
                    ordered.push(group.label.to_string());
                }
                None => {}
            }
        }

        ordered.extend(pool.into_iter().map(|(key, _)| key.to_string()));
        ordered
    }

    fn should_inject(&self, group: &PriorityGroup, keys: &[String]) -> bool {
        match group.injection {
            Injection::Never => false,
            Injection::Always => true,
            Injection::WhenAnyPresent(sources) => {
                keys.iter().any(|k| sources.contains(&k.as_str()))
            }
        }
    }
}

/// Display order with the default priority groups
pub fn order_headers(keys: &[String]) -> Vec<String> {
    HeaderOrderer::default().order(keys)
}
