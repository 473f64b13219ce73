pub mod brand_share;
pub mod derived_metrics;
pub mod export_layout;
pub mod file_classifier;
pub mod header_orderer;
pub mod join_engine;
pub mod key_normalizer;
pub mod market_analysis;
pub mod merge_pipeline;
pub mod price_scatter;
pub mod row_view;
pub mod sales_reconciler;
pub mod sales_rollup;
