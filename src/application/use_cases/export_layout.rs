use serde::Serialize;

use crate::domain::listing::{columns, HistorySuffix, ListingRecord, MergeConfig, MergedDataset};

const IMAGE_COLUMN_WIDTH: f64 = 15.0;
const MIN_COLUMN_WIDTH: f64 = 8.0;
const MAX_COLUMN_WIDTH: f64 = 40.0;
const COLUMN_PADDING: f64 = 4.0;

/// Link targets equal to this are treated as absent
const NULL_LINK: &str = "#";

/// How the cells of a column are produced
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ColumnKind {
    RowIndex,
    Image,
    /// ASIN linked to the product detail page
    Identifier,
    /// Brand linked to the brand page
    Brand,
    /// Buy box seller linked to the seller storefront
    Seller,
    /// Organic rank linked to the rank lookup site
    Ranking,
    Plain,
}

impl ColumnKind {
    pub fn for_header(header: &str) -> Self {
        if header == columns::ROW_INDEX {
            ColumnKind::RowIndex
        } else if header == columns::IMAGE {
            ColumnKind::Image
        } else if header.eq_ignore_ascii_case("asin") {
            ColumnKind::Identifier
        } else if header == columns::BRAND || header.eq_ignore_ascii_case("brand") {
            ColumnKind::Brand
        } else if header == columns::SELLER {
            ColumnKind::Seller
        } else if header == columns::RANKING {
            ColumnKind::Ranking
        } else {
            ColumnKind::Plain
        }
    }

    pub fn is_linkable(&self) -> bool {
        matches!(
            self,
            ColumnKind::Identifier | ColumnKind::Brand | ColumnKind::Seller | ColumnKind::Ranking
        )
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ExportColumn {
    pub header: String,
    pub width: f64,
    pub kind: ColumnKind,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ExportCell {
    pub text: String,
    pub link: Option<String>,
}

impl ExportCell {
    pub fn plain(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            link: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ExportLayout {
    pub columns: Vec<ExportColumn>,
    pub rows: Vec<Vec<ExportCell>>,
}

fn is_cjk(c: char) -> bool {
    ('\u{4e00}'..='\u{9fa5}').contains(&c)
}

/// Width estimate from the header text: CJK counts double
pub fn column_width(header: &str) -> f64 {
    if header == columns::IMAGE {
        return IMAGE_COLUMN_WIDTH;
    }
    let cjk = header.chars().filter(|c| is_cjk(*c)).count() as f64;
    let other = header.chars().count() as f64 - cjk;
    (cjk * 2.0 + other * 1.2 + COLUMN_PADDING).clamp(MIN_COLUMN_WIDTH, MAX_COLUMN_WIDTH)
}

/// Export column order: general columns as given, then history columns
/// grouped by suffix priority with the newest month first
pub fn export_columns(headers: &[String]) -> Vec<String> {
    let mut general = Vec::new();
    let mut history: Vec<(usize, &str, &String)> = Vec::new();

    for header in headers {
        match HistorySuffix::parse_key(header) {
            Some((year_month, suffix)) => history.push((suffix.priority(), year_month, header)),
            None => general.push(header.clone()),
        }
    }

    history.sort_by(|a, b| a.0.cmp(&b.0).then_with(|| b.1.cmp(a.1)));
    general.extend(history.into_iter().map(|(_, _, header)| header.clone()));
    general
}

fn non_blank(record: &ListingRecord, keys: &[&str]) -> Option<String> {
    record.get_any(keys).and_then(|v| v.as_text())
}

fn link_from(record: &ListingRecord, keys: &[&str]) -> Option<String> {
    non_blank(record, keys).filter(|link| link != NULL_LINK)
}

struct CellContext<'a> {
    config: &'a MergeConfig,
    marketplace: &'a str,
}

impl CellContext<'_> {
    fn cell(&self, column: &ExportColumn, record: &ListingRecord, row: usize) -> ExportCell {
        let placeholder = self.config.export_empty_placeholder.as_str();
        let value = non_blank(record, &[column.header.as_str()]);

        let (text, link) = match column.kind {
            ColumnKind::RowIndex => (Some((row + 1).to_string()), None),
            ColumnKind::Image => (non_blank(record, columns::IMAGE_SOURCES), None),
            ColumnKind::Identifier => (value, link_from(record, columns::DETAIL_LINKS)),
            ColumnKind::Brand => (value, link_from(record, &[columns::BRAND_LINK])),
            ColumnKind::Seller => (value, link_from(record, &[columns::SELLER_LINK])),
            ColumnKind::Ranking => {
                let link = match (&value, record.product_identifier()) {
                    (Some(_), Some(asin)) => Some(self.config.rank_link(self.marketplace, &asin)),
                    _ => None,
                };
                (value, link)
            }
            ColumnKind::Plain => (value, None),
        };

        ExportCell {
            text: text.unwrap_or_else(|| placeholder.to_string()),
            link,
        }
    }
}

/// Lay out every record of the dataset for export
pub fn plan_export(dataset: &MergedDataset, config: &MergeConfig) -> ExportLayout {
    let columns: Vec<ExportColumn> = export_columns(&dataset.headers)
        .into_iter()
        .map(|header| ExportColumn {
            width: column_width(&header),
            kind: ColumnKind::for_header(&header),
            header,
        })
        .collect();

    let ctx = CellContext {
        config,
        marketplace: &dataset.marketplace,
    };

    let rows = dataset
        .records
        .iter()
        .enumerate()
        .map(|(row, record)| {
            columns
                .iter()
                .map(|column| ctx.cell(column, record, row))
                .collect()
        })
        .collect();

    ExportLayout { columns, rows }
}

impl ExportLayout {
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}
