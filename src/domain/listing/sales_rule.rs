use serde::{Deserialize, Serialize};

/// Canonical suffix appended to a `YYYY-MM` column
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum HistorySuffix {
    /// Parent-level unit sales
    ParentUnits,
    /// Parent-level revenue
    ParentRevenue,
    /// Sub-item unit sales
    ChildUnits,
    /// Sub-item revenue
    ChildRevenue,
    /// Sub-item price
    ChildPrice,
}

impl HistorySuffix {
    /// Fixed export priority order
    pub const ALL: [HistorySuffix; 5] = [
        HistorySuffix::ParentUnits,
        HistorySuffix::ParentRevenue,
        HistorySuffix::ChildUnits,
        HistorySuffix::ChildRevenue,
        HistorySuffix::ChildPrice,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            HistorySuffix::ParentUnits => "-父-U",
            HistorySuffix::ParentRevenue => "-父-M",
            HistorySuffix::ChildUnits => "-子-U",
            HistorySuffix::ChildRevenue => "-子-M",
            HistorySuffix::ChildPrice => "-子-P",
        }
    }

    /// Position in the export priority order
    pub fn priority(&self) -> usize {
        Self::ALL.iter().position(|s| s == self).unwrap_or(Self::ALL.len())
    }

    /// Canonical key for a year-month (`2025-01` -> `2025-01-父-U`)
    pub fn key_for(&self, year_month: &str) -> String {
        format!("{}{}", year_month, self.as_str())
    }

    /// Split a canonical history key into its year-month and suffix
    pub fn parse_key(key: &str) -> Option<(&str, HistorySuffix)> {
        Self::ALL.iter().find_map(|suffix| {
            let year_month = key.strip_suffix(suffix.as_str())?;
            is_year_month(year_month).then_some((year_month, *suffix))
        })
    }
}

impl std::fmt::Display for HistorySuffix {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Shape of the date columns a sheet carries
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum DateColumnShape {
    /// `2025-01`
    Plain,
    /// `2025-01($)`
    Currency,
}

/// One sheet of a sales workbook
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct SalesSheetRule {
    pub sheet_name: &'static str,
    pub shape: DateColumnShape,
    pub suffix: HistorySuffix,
}

pub const SALES_SHEET_RULES: [SalesSheetRule; 5] = [
    SalesSheetRule {
        sheet_name: "产品历史月销量",
        shape: DateColumnShape::Plain,
        suffix: HistorySuffix::ParentUnits,
    },
    SalesSheetRule {
        sheet_name: "历史月销售额",
        shape: DateColumnShape::Currency,
        suffix: HistorySuffix::ParentRevenue,
    },
    SalesSheetRule {
        sheet_name: "子体历史月销量",
        shape: DateColumnShape::Plain,
        suffix: HistorySuffix::ChildUnits,
    },
    SalesSheetRule {
        sheet_name: "子体历史月销售额",
        shape: DateColumnShape::Currency,
        suffix: HistorySuffix::ChildRevenue,
    },
    SalesSheetRule {
        sheet_name: "历史月价格",
        shape: DateColumnShape::Currency,
        suffix: HistorySuffix::ChildPrice,
    },
];

/// Identity columns a sales sheet repeats; the product table owns them
pub const SALES_IDENTITY_COLUMNS: &[&str] = &["ASIN", "SKU", "商品标题", "图片", "URL", "所属类目"];

/// `YYYY-MM` with a two-digit month
pub fn is_year_month(s: &str) -> bool {
    let bytes = s.as_bytes();
    bytes.len() == 7
        && bytes[..4].iter().all(u8::is_ascii_digit)
        && bytes[4] == b'-'
        && bytes[5..].iter().all(u8::is_ascii_digit)
}
