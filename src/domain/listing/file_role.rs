use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Logical role of an uploaded file
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum FileRole {
    /// Main product table (`Product-US-20260206.xlsx`)
    Product,
    /// Keyword analysis table (`关键词分析_*.xlsx`)
    Keywords,
    /// Sales history workbook (`product-US-sales-*.xlsx`)
    Sales,
}

impl std::fmt::Display for FileRole {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            FileRole::Product => write!(f, "Product"),
            FileRole::Keywords => write!(f, "Keywords"),
            FileRole::Sales => write!(f, "Sales"),
        }
    }
}

/// A candidate upload
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SourceFile {
    /// Bare file name, used for classification
    pub name: String,
    /// Location handed to the sheet reader
    pub path: PathBuf,
}

impl SourceFile {
    pub fn new(name: impl Into<String>, path: impl Into<PathBuf>) -> Self {
        Self {
            name: name.into(),
            path: path.into(),
        }
    }

    /// Build from a path, taking the file name component as `name`
    pub fn from_path(path: &Path) -> Self {
        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().to_string())
            .unwrap_or_else(|| path.to_string_lossy().to_string());
        Self::new(name, path)
    }
}

/// Result of file identification
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClassifiedFiles {
    pub product: SourceFile,
    pub keywords: SourceFile,
    pub sales: Vec<SourceFile>,
    /// Marketplace code taken from the product file name (e.g. `US`)
    pub marketplace: String,
}
