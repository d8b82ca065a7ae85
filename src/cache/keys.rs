//! Cache key and invalidation tag definitions.
//!
//! Keys are derived only from the semantic parameters of a read so that equal
//! reads across requests share one entry.

use std::fmt;
use std::str::FromStr;

use url::form_urlencoded::Serializer;
use uuid::Uuid;

use crate::application::repos::ProductSearchQuery;

/// Invalidation label attached to cached reads.
///
/// Invalidating a tag drops every entry carrying it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CacheTag {
    /// Product search pages and the product-derived category list
    Products,
    Announcements,
    /// Site visitor counter
    Visitors,
    /// Configured category list
    Categories,
    /// Per-product rating aggregates
    Ratings,
}

impl CacheTag {
    pub const ALL: [CacheTag; 5] = [
        CacheTag::Products,
        CacheTag::Announcements,
        CacheTag::Visitors,
        CacheTag::Categories,
        CacheTag::Ratings,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            CacheTag::Products => "products",
            CacheTag::Announcements => "announcements",
            CacheTag::Visitors => "visitors",
            CacheTag::Categories => "categories",
            CacheTag::Ratings => "ratings",
        }
    }
}

impl fmt::Display for CacheTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown cache tag `{0}`")]
pub struct UnknownTag(pub String);

impl FromStr for CacheTag {
    type Err = UnknownTag;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        CacheTag::ALL
            .into_iter()
            .find(|tag| tag.as_str() == value)
            .ok_or_else(|| UnknownTag(value.to_string()))
    }
}

pub const ANNOUNCEMENT_KEY: &str = "announcement:active";
pub const VISITOR_COUNT_KEY: &str = "stats:visitors";
pub const CATEGORY_CONFIG_KEY: &str = "categories:config";
pub const PRODUCT_CATEGORIES_KEY: &str = "products:categories";

/// Key for one page of product search results.
///
/// Free-text components are form-encoded, so separators inside a query or
/// category cannot collide with the key layout.
pub fn product_search_key(query: &ProductSearchQuery) -> String {
    let mut params = Serializer::new(String::new());
    params.append_pair("q", &query.query);
    if let Some(category) = query.category.as_deref() {
        params.append_pair("category", category);
    }
    params
        .append_pair("sort", query.sort.as_str())
        .append_pair("page", &query.page.to_string())
        .append_pair("size", &query.page_size.to_string());

    format!("products:search:{}", params.finish())
}

/// Key for the ratings of a product set. `sorted_ids` must already be sorted so
/// that the same set always produces the same key.
pub fn product_ratings_key(sorted_ids: &[Uuid]) -> String {
    let joined = sorted_ids
        .iter()
        .map(Uuid::to_string)
        .collect::<Vec<_>>()
        .join(",");
    format!("ratings:{joined}")
}
