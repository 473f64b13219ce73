use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Debug, Serialize, Deserialize)]
pub enum AppError {
    /// Product or keyword file could not be identified among the uploads.
    MissingRequiredFile {
        product: Option<String>,
        keywords: Option<String>,
        sales_count: usize,
    },
    SheetNotFound(String),
    Decode(String),
    Config(String),
    Validation(String),
    Export(String),
    Io(String),
}

impl fmt::Display for AppError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AppError::MissingRequiredFile {
                product,
                keywords,
                sales_count,
            } => write!(
                f,
                "Missing required files. Need at least:\n\
                 1. Product table (Product-*.xlsx)\n\
                 2. Keyword table (关键词分析_*.xlsx)\n\n\
                 Identified:\n\
                 Product: {}\n\
                 Keywords: {}\n\
                 Sales files: {}",
                product.as_deref().unwrap_or("none"),
                keywords.as_deref().unwrap_or("none"),
                sales_count
            ),
            AppError::SheetNotFound(msg) => write!(f, "Sheet not found: {}", msg),
            AppError::Decode(msg) => write!(f, "Decode error: {}", msg),
            AppError::Config(msg) => write!(f, "Config error: {}", msg),
            AppError::Validation(msg) => write!(f, "Validation error: {}", msg),
            AppError::Export(msg) => write!(f, "Export error: {}", msg),
            AppError::Io(msg) => write!(f, "IO error: {}", msg),
        }
    }
}

impl std::error::Error for AppError {}

impl From<std::io::Error> for AppError {
    fn from(err: std::io::Error) -> Self {
        AppError::Io(err.to_string())
    }
}

impl From<calamine::XlsxError> for AppError {
    fn from(err: calamine::XlsxError) -> Self {
        AppError::Decode(err.to_string())
    }
}

impl From<csv::Error> for AppError {
    fn from(err: csv::Error) -> Self {
        AppError::Export(err.to_string())
    }
}

impl From<figment::Error> for AppError {
    fn from(err: figment::Error) -> Self {
        AppError::Config(err.to_string())
    }
}

pub type Result<T> = std::result::Result<T, AppError>;
