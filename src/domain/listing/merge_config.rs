use serde::{Deserialize, Serialize};

const MAX_TREND_YEARS: u32 = 50;

/// Configuration for the merge pipeline and its consumers
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MergeConfig {
    /// Maximum number of rows handed to an interactive display (default: 500)
    pub display_row_limit: usize,

    /// Rows per page for paginated views (default: 50)
    pub page_size: usize,

    /// Number of brands kept in the brand share rollup (default: 20)
    pub brand_top_n: usize,

    /// Years covered by a per-record trend history, current year included (default: 3)
    pub trend_years: u32,

    /// Text written for empty cells on export (default: "-")
    pub export_empty_placeholder: String,

    /// Link target for the ranking column; `{site}` and `{asin}` are substituted
    pub rank_link_template: String,
}

impl Default for MergeConfig {
    fn default() -> Self {
        Self {
            display_row_limit: 500,
            page_size: 50,
            brand_top_n: 20,
            trend_years: 3,
            export_empty_placeholder: "-".to_string(),
            rank_link_template: "https://www.xiyouzhaoci.com/detail/asin/look_up/{site}/{asin}"
                .to_string(),
        }
    }
}

impl MergeConfig {
    /// Validate configuration values
    pub fn validate(&self) -> Result<(), String> {
        if self.display_row_limit == 0 {
            return Err("display_row_limit must be > 0".to_string());
        }
        if self.page_size == 0 {
            return Err("page_size must be > 0".to_string());
        }
        if self.trend_years == 0 || self.trend_years > MAX_TREND_YEARS {
            return Err(format!("trend_years must be between 1 and {}", MAX_TREND_YEARS));
        }
        if !self.rank_link_template.contains("{asin}") {
            return Err("rank_link_template must contain {asin}".to_string());
        }
        Ok(())
    }

    /// Ranking link for one listing
    pub fn rank_link(&self, site: &str, asin: &str) -> String {
        self.rank_link_template
            .replace("{site}", site)
            .replace("{asin}", asin)
    }
}
