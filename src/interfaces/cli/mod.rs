// ============================================================
// COMMAND-LINE INTERFACE
// ============================================================
// clap commands mapped onto the merge and analysis use cases.
// Results go to stdout as JSON, logs go to stderr.

mod types;

use std::path::{Path, PathBuf};
use std::sync::Arc;

use chrono::{Datelike, Local};
use clap::{Args, Parser, Subcommand, ValueEnum};
use serde::Serialize;
use tracing::{info, warn};

use crate::application::use_cases::export_layout::plan_export;
use crate::application::use_cases::file_classifier::classify;
use crate::application::use_cases::market_analysis::MarketAnalyzer;
use crate::application::use_cases::merge_pipeline::MergePipeline;
use crate::application::use_cases::row_view::{
    apply_query, brand_products, remove_by_identifier, RowQuery, SortKey,
};
use crate::application::use_cases::sales_rollup::trend_history;
use crate::domain::error::{AppError, Result};
use crate::domain::listing::{HistorySuffix, MergedDataset, SourceFile};
use crate::infrastructure::config::AppConfig;
use crate::infrastructure::export::CsvExporter;
use crate::infrastructure::spreadsheet::CalamineSheetReader;

use types::{AnalyzeResponse, ClassifyResponse, MergeResponse, TrendResponse};

#[derive(Parser, Debug)]
#[command(name = "listing-merge")]
#[command(about = "Merge Amazon listing exports into one dataset", long_about = None)]
#[command(version)]
pub struct Cli {
    /// Configuration file (defaults to ./listing-merge.toml when present)
    #[arg(long, global = true, env = "LISTING_MERGE_CONFIG")]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Show which role each upload plays
    Classify {
        #[arg(required = true)]
        files: Vec<PathBuf>,
    },

    /// Merge product, keyword and sales exports
    Merge {
        #[command(flatten)]
        inputs: InputArgs,

        /// Case-insensitive text search over every column
        #[arg(long)]
        search: Option<String>,

        /// Keep rows whose column equals the value
        #[arg(long = "filter", value_name = "COLUMN=VALUE", value_parser = parse_filter)]
        filters: Vec<(String, String)>,

        /// Sort key, repeatable; later keys break ties
        #[arg(long = "sort", value_name = "COLUMN[:asc|desc]")]
        sort: Vec<SortKey>,

        /// Only rows of this brand, best sellers first
        #[arg(long)]
        brand: Option<String>,

        /// Drop every row of this ASIN before display and export
        #[arg(long = "remove", value_name = "ASIN")]
        remove: Vec<String>,

        #[arg(long, default_value_t = 1)]
        page: usize,

        /// Rows per page (defaults to the configured page size)
        #[arg(long)]
        page_size: Option<usize>,

        /// Write the full merged dataset as CSV
        #[arg(long)]
        out: Option<PathBuf>,

        /// Omit the UTF-8 byte order mark from the CSV
        #[arg(long, requires = "out")]
        no_bom: bool,

        /// Add price scatter, monthly rollup and brand share of all merged rows
        #[arg(long)]
        analyze: bool,
    },

    /// Price scatter, monthly sales rollup and brand share of one product export
    Analyze { file: PathBuf },

    /// Monthly history of one listing after merging
    Trend {
        #[command(flatten)]
        inputs: InputArgs,

        #[arg(long)]
        asin: String,

        #[arg(long, value_enum, default_value = "child-price")]
        series: HistorySeries,
    },
}

#[derive(Args, Debug)]
pub struct InputArgs {
    /// Use every .xlsx file in this directory
    #[arg(long)]
    pub dir: Option<PathBuf>,

    /// Upload files
    pub files: Vec<PathBuf>,
}

#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum HistorySeries {
    /// Parent unit sales
    ParentUnits,
    /// Parent revenue
    ParentRevenue,
    /// Sub-item unit sales
    ChildUnits,
    /// Sub-item revenue
    ChildRevenue,
    /// Sub-item price
    ChildPrice,
}

impl From<HistorySeries> for HistorySuffix {
    fn from(series: HistorySeries) -> Self {
        match series {
            HistorySeries::ParentUnits => HistorySuffix::ParentUnits,
            HistorySeries::ParentRevenue => HistorySuffix::ParentRevenue,
            HistorySeries::ChildUnits => HistorySuffix::ChildUnits,
            HistorySeries::ChildRevenue => HistorySuffix::ChildRevenue,
            HistorySeries::ChildPrice => HistorySuffix::ChildPrice,
        }
    }
}

fn parse_filter(s: &str) -> std::result::Result<(String, String), String> {
    let (column, value) = s
        .split_once('=')
        .ok_or_else(|| format!("expected COLUMN=VALUE, got {s:?}"))?;
    let column = column.trim();
    if column.is_empty() {
        return Err(format!("empty column in {s:?}"));
    }
    Ok((column.to_string(), value.trim().to_string()))
}

fn is_workbook(path: &Path) -> bool {
    let is_xlsx = path
        .extension()
        .is_some_and(|ext| ext.eq_ignore_ascii_case("xlsx"));
    // Excel lock files
    let is_lock = path
        .file_name()
        .is_some_and(|name| name.to_string_lossy().starts_with("~$"));
    is_xlsx && !is_lock
}

/// Uploads from `--dir` (sorted by name) followed by explicit files
pub fn collect_inputs(inputs: &InputArgs) -> Result<Vec<SourceFile>> {
    let mut paths: Vec<PathBuf> = Vec::new();

    if let Some(dir) = &inputs.dir {
        let mut found: Vec<PathBuf> = std::fs::read_dir(dir)
            .map_err(|e| AppError::Io(format!("Failed to read {}: {}", dir.display(), e)))?
            .filter_map(|entry| entry.ok().map(|e| e.path()))
            .filter(|path| path.is_file() && is_workbook(path))
            .collect();
        found.sort();
        paths.extend(found);
    }
    paths.extend(inputs.files.iter().cloned());

    if paths.is_empty() {
        return Err(AppError::Validation(
            "No input files. Pass files or --dir".to_string(),
        ));
    }
    Ok(paths.iter().map(|p| SourceFile::from_path(p)).collect())
}

fn print_json<T: Serialize>(value: &T) -> Result<()> {
    let json = serde_json::to_string_pretty(value)
        .map_err(|e| AppError::Export(format!("Failed to render JSON: {}", e)))?;
    println!("{}", json);
    Ok(())
}

fn pipeline(config: &AppConfig) -> MergePipeline {
    MergePipeline::new(Arc::new(CalamineSheetReader::new()), config.merge.clone())
}

pub async fn dispatch(command: Commands, config: &AppConfig) -> Result<()> {
    match command {
        Commands::Classify { files } => {
            let uploads: Vec<SourceFile> = files.iter().map(|p| SourceFile::from_path(p)).collect();
            let classified = classify(&uploads)?;
            print_json(&ClassifyResponse::from(&classified))
        }
        Commands::Merge {
            inputs,
            search,
            filters,
            sort,
            brand,
            remove,
            page,
            page_size,
            out,
            no_bom,
            analyze,
        } => {
            let query = RowQuery {
                search,
                filters,
                sort,
                page,
                page_size: page_size.unwrap_or(config.merge.page_size),
            };
            let options = MergeOptions {
                brand,
                remove,
                out,
                bom: !no_bom,
                analyze,
            };
            merge_command(&inputs, query, options, config).await
        }
        Commands::Analyze { file } => {
            let analyzer = MarketAnalyzer::new(Arc::new(CalamineSheetReader::new()), config.merge.clone());
            let analysis = analyzer.analyze(&SourceFile::from_path(&file)).await?;
            print_json(&AnalyzeResponse::from(analysis))
        }
        Commands::Trend {
            inputs,
            asin,
            series,
        } => {
            let dataset = pipeline(config).run(&collect_inputs(&inputs)?).await?;
            let record = dataset
                .records
                .iter()
                .find(|r| r.product_identifier().as_deref() == Some(asin.as_str()))
                .ok_or_else(|| AppError::Validation(format!("ASIN not found: {}", asin)))?;

            let suffix = HistorySuffix::from(series);
            let history = trend_history(record, suffix, Local::now().year(), config.merge.trend_years);
            if history.is_empty() {
                warn!(asin = %asin, suffix = suffix.as_str(), "No history in the trend window");
            }
            print_json(&TrendResponse {
                asin,
                series: suffix,
                suffix: suffix.as_str(),
                years: history.years,
            })
        }
    }
}

/// Merge-only switches that act on the whole dataset
struct MergeOptions {
    brand: Option<String>,
    remove: Vec<String>,
    out: Option<PathBuf>,
    bom: bool,
    analyze: bool,
}

async fn merge_command(
    inputs: &InputArgs,
    query: RowQuery,
    options: MergeOptions,
    config: &AppConfig,
) -> Result<()> {
    let MergeOptions {
        brand,
        remove,
        out,
        bom,
        analyze,
    } = options;
    let source = Arc::new(CalamineSheetReader::new());
    let mut dataset: MergedDataset = MergePipeline::new(source.clone(), config.merge.clone())
        .run(&collect_inputs(inputs)?)
        .await?;

    for asin in &remove {
        let before = dataset.len();
        dataset = remove_by_identifier(&dataset, asin);
        info!(asin = %asin, removed = before - dataset.len(), "Removed rows");
    }

    let exported_to = match out {
        Some(path) => {
            let layout = plan_export(&dataset, &config.merge);
            CsvExporter::new().with_bom(bom).write_to_path(&layout, &path)?;
            Some(path.display().to_string())
        }
        None => None,
    };

    let analysis = if analyze {
        let analyzer = MarketAnalyzer::new(source, config.merge.clone());
        Some(AnalyzeResponse::from(analyzer.analyze_dataset(&dataset)?))
    } else {
        None
    };

    let window = dataset.display_window(config.merge.display_row_limit);
    let rows = match brand.as_deref() {
        Some(brand) => brand_products(window, brand),
        None => window.iter().collect(),
    };
    let page = apply_query(rows, &query);

    print_json(&MergeResponse {
        marketplace: &dataset.marketplace,
        headers: &dataset.headers,
        total_rows: dataset.len(),
        matched_rows: page.total,
        page: page.page,
        page_size: page.page_size,
        total_pages: page.total_pages,
        rows: page.rows,
        exported_to,
        analysis,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    #[test]
    fn test_parse_merge_arguments() {
        let cli = Cli::try_parse_from([
            "listing-merge",
            "merge",
            "--dir",
            "uploads",
            "--sort",
            "价格:desc",
            "--sort",
            "ASIN",
            "--filter",
            "品牌=Acme",
            "--page",
            "2",
            "--analyze",
        ])
        .unwrap();

        match cli.command {
            Commands::Merge {
                inputs,
                sort,
                filters,
                page,
                page_size,
                analyze,
                ..
            } => {
                assert_eq!(inputs.dir, Some(PathBuf::from("uploads")));
                assert_eq!(sort, vec![SortKey::desc("价格"), SortKey::asc("ASIN")]);
                assert_eq!(filters, vec![("品牌".to_string(), "Acme".to_string())]);
                assert_eq!(page, 2);
                assert_eq!(page_size, None);
                assert!(analyze);
            }
            other => panic!("unexpected command: {other:?}"),
        }
    }

    #[test]
    fn test_no_bom_requires_out() {
        assert!(Cli::try_parse_from(["listing-merge", "merge", "a.xlsx", "--no-bom"]).is_err());
        let cli = Cli::try_parse_from(["listing-merge", "merge", "a.xlsx", "--out", "x.csv", "--no-bom"])
            .unwrap();
        assert!(matches!(cli.command, Commands::Merge { no_bom: true, .. }));
    }

    #[test]
    fn test_classify_requires_files() {
        assert!(Cli::try_parse_from(["listing-merge", "classify"]).is_err());
    }

    #[test]
    fn test_parse_filter_rejects_missing_separator() {
        assert!(parse_filter("品牌").is_err());
        assert!(parse_filter("=x").is_err());
        assert_eq!(parse_filter(" 品牌 = A ").unwrap(), ("品牌".to_string(), "A".to_string()));
    }

    #[test]
    fn test_collect_inputs_from_dir() {
        let dir = tempfile::tempdir().unwrap();
        for name in ["b.xlsx", "a.XLSX", "~$a.xlsx", "notes.txt"] {
            fs::write(dir.path().join(name), b"").unwrap();
        }
        let inputs = InputArgs {
            dir: Some(dir.path().to_path_buf()),
            files: vec![PathBuf::from("extra/关键词分析_1.xlsx")],
        };

        let names: Vec<String> = collect_inputs(&inputs)
            .unwrap()
            .into_iter()
            .map(|f| f.name)
            .collect();
        assert_eq!(names, vec!["a.XLSX", "b.xlsx", "关键词分析_1.xlsx"]);
    }

    #[test]
    fn test_collect_inputs_empty_is_error() {
        let inputs = InputArgs {
            dir: None,
            files: Vec::new(),
        };
        assert!(matches!(collect_inputs(&inputs), Err(AppError::Validation(_))));
    }
}
