use once_cell::sync::Lazy;
use regex::Regex;
use tracing::{info, warn};

use crate::domain::error::{AppError, Result};
use crate::domain::listing::{ClassifiedFiles, FileRole, SourceFile};

static PRODUCT_FILE_PATTERN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)^Product-([a-z]{2,})-\d{4,}\.xlsx$").unwrap());

static KEYWORD_FILE_PATTERN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)^关键词分析_.*\.xlsx$").unwrap());

const KEYWORD_PREFIX: &str = "关键词分析_";

/// Role implied by a file name alone
pub fn role_for_name(name: &str) -> Option<FileRole> {
    let lower = name.to_lowercase();
    if PRODUCT_FILE_PATTERN.is_match(name) && !lower.contains("sales") {
        return Some(FileRole::Product);
    }
    if lower.starts_with("product-") && lower.contains("sales") && lower.ends_with(".xlsx") {
        return Some(FileRole::Sales);
    }
    if KEYWORD_FILE_PATTERN.is_match(name) || (name.starts_with(KEYWORD_PREFIX) && name.contains('~')) {
        return Some(FileRole::Keywords);
    }
    None
}

/// Marketplace code embedded in a product file name (`Product-us-2026...` -> `US`)
pub fn marketplace_code(product_name: &str) -> Option<String> {
    PRODUCT_FILE_PATTERN
        .captures(product_name)
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str().to_uppercase())
}

/// Assign roles to uploads. Product and keyword files are required; sales
/// files are optional. The first matching file wins a single-file role.
pub fn classify(files: &[SourceFile]) -> Result<ClassifiedFiles> {
    let mut product: Option<&SourceFile> = None;
    let mut keywords: Option<&SourceFile> = None;
    let mut sales: Vec<SourceFile> = Vec::new();

    for file in files {
        match role_for_name(&file.name) {
            Some(FileRole::Product) if product.is_none() => product = Some(file),
            Some(FileRole::Keywords) if keywords.is_none() => keywords = Some(file),
            Some(FileRole::Sales) => sales.push(file.clone()),
            Some(role) => warn!(file = %file.name, role = %role, "Duplicate file for role, ignoring"),
            None => warn!(file = %file.name, "Unrecognized file name, ignoring"),
        }
    }

    let (Some(product), Some(keywords)) = (product, keywords) else {
        return Err(AppError::MissingRequiredFile {
            product: product.map(|f| f.name.clone()),
            keywords: keywords.map(|f| f.name.clone()),
            sales_count: sales.len(),
        });
    };

    let marketplace = marketplace_code(&product.name).unwrap_or_default();

    info!(
        product = %product.name,
        keywords = %keywords.name,
        sales_files = sales.len(),
        marketplace = %marketplace,
        "Classified uploads"
    );

    Ok(ClassifiedFiles {
        product: product.clone(),
        keywords: keywords.clone(),
        sales,
        marketplace,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn files(names: &[&str]) -> Vec<SourceFile> {
        names.iter().map(|n| SourceFile::new(*n, *n)).collect()
    }

    #[test]
    fn test_classifies_standard_upload_set() {
        let uploads = files(&[
            "Product-US-20260206.xlsx",
            "product-US-sales-20260206-1.xlsx",
            "关键词分析_abc~def.xlsx",
        ]);
        let classified = classify(&uploads).unwrap();

        assert_eq!(classified.product.name, "Product-US-20260206.xlsx");
        assert_eq!(classified.sales.len(), 1);
        assert_eq!(classified.sales[0].name, "product-US-sales-20260206-1.xlsx");
        assert_eq!(classified.keywords.name, "关键词分析_abc~def.xlsx");
        assert_eq!(classified.marketplace, "US");
    }

    #[test]
    fn test_upload_order_does_not_matter() {
        let uploads = files(&[
            "关键词分析_abc.xlsx",
            "product-de-sales-20260206-2.xlsx",
            "product-de-sales-20260206-1.xlsx",
            "product-de-20260206.xlsx",
        ]);
        let classified = classify(&uploads).unwrap();

        assert_eq!(classified.product.name, "product-de-20260206.xlsx");
        assert_eq!(classified.marketplace, "DE");
        assert_eq!(classified.sales.len(), 2);
    }

    #[test]
    fn test_sales_file_never_classified_as_product() {
        assert_eq!(role_for_name("Product-US-sales-20260206.xlsx"), Some(FileRole::Sales));
        assert_eq!(role_for_name("Product-US-20260206.xlsx"), Some(FileRole::Product));
        assert_eq!(role_for_name("Product-U-20260206.xlsx"), None);
        assert_eq!(role_for_name("Product-US-206.xlsx"), None);
        assert_eq!(role_for_name("关键词分析_x~y.csv"), Some(FileRole::Keywords));
        assert_eq!(role_for_name("notes.txt"), None);
    }

    #[test]
    fn test_no_file_in_two_roles() {
        let uploads = files(&[
            "Product-US-20260206.xlsx",
            "Product-US-20260207.xlsx",
            "product-US-sales-1.xlsx",
            "关键词分析_a.xlsx",
            "关键词分析_b~c.xlsx",
        ]);
        let classified = classify(&uploads).unwrap();

        let mut assigned = vec![classified.product.name.clone(), classified.keywords.name.clone()];
        assigned.extend(classified.sales.iter().map(|f| f.name.clone()));
        let unique: std::collections::HashSet<_> = assigned.iter().collect();
        assert_eq!(unique.len(), assigned.len());
    }

    #[test]
    fn test_missing_keywords_reports_findings() {
        let uploads = files(&["Product-US-20260206.xlsx", "product-US-sales-1.xlsx"]);
        let err = classify(&uploads).unwrap_err();

        match err {
            AppError::MissingRequiredFile {
                product,
                keywords,
                sales_count,
            } => {
                assert_eq!(product.as_deref(), Some("Product-US-20260206.xlsx"));
                assert_eq!(keywords, None);
                assert_eq!(sales_count, 1);
            }
            other => panic!("unexpected error: {other}"),
        }
    }
}
