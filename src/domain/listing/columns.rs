// Canonical header names the pipeline reads or produces

/// Row number column, always shown first
pub const ROW_INDEX: &str = "序号";

/// Virtual image column resolved from `IMAGE_SOURCES`
pub const IMAGE: &str = "主图";
pub const IMAGE_SOURCES: &[&str] = &["商品主图", "imageUrl", "image"];

/// Product detail page link, used to hyperlink the ASIN
pub const DETAIL_LINKS: &[&str] = &["商品详情页链接", "url"];

pub const PARENT_ASIN: &str = "父ASIN";
pub const TITLE: &str = "商品标题";
pub const BRAND: &str = "品牌";
pub const BRAND_LINK: &str = "品牌链接";
pub const SELLER: &str = "BuyBox卖家";
pub const SELLER_LINK: &str = "卖家首页";
pub const RANKING: &str = "自然排名";
pub const PRICE: &str = "价格";
pub const RATING: &str = "评分";
pub const REVIEW_COUNT: &str = "评分数";
pub const COUPON: &str = "Coupon";
pub const RECENT_SALES: &str = "近30天销量";
pub const PARENT_SALES: &str = "父体销量";

pub const LISTING_DATE: &str = "上架时间";
/// Derived listing-age bucket
pub const LISTING_AGE: &str = "上架时段";

pub const ORGANIC_TRAFFIC_SHARE: &str = "自然流量占比";
pub const AD_TRAFFIC_SHARE: &str = "广告流量占比";
/// Derived `organic%:ad%` ratio
pub const TRAFFIC_RATIO: &str = "自然:广告流量比";

pub const UNKNOWN_BRAND: &str = "Unknown";
