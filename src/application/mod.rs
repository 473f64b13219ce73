pub mod use_cases;

pub use use_cases::market_analysis::{MarketAnalysis, MarketAnalyzer};
pub use use_cases::merge_pipeline::MergePipeline;
