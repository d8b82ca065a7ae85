//! Typed homepage filters parsed from untrusted query parameters.

use std::fmt;

use serde::Serialize;

const ALL_CATEGORIES: &str = "all";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ProductSort {
    #[default]
    Newest,
    PriceAsc,
    PriceDesc,
    Popular,
    Rating,
}

impl ProductSort {
    pub fn as_str(self) -> &'static str {
        match self {
            ProductSort::Newest => "newest",
            ProductSort::PriceAsc => "price_asc",
            ProductSort::PriceDesc => "price_desc",
            ProductSort::Popular => "popular",
            ProductSort::Rating => "rating",
        }
    }

    /// Parse an allow-listed sort key; anything else yields `None`.
    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "newest" => Some(ProductSort::Newest),
            "price_asc" => Some(ProductSort::PriceAsc),
            "price_desc" => Some(ProductSort::PriceDesc),
            "popular" => Some(ProductSort::Popular),
            "rating" => Some(ProductSort::Rating),
            _ => None,
        }
    }
}

impl fmt::Display for ProductSort {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Normalized homepage filters.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct HomeFilters {
    pub query: String,
    pub category: Option<String>,
    pub sort: ProductSort,
    pub page: u32,
}

impl Default for HomeFilters {
    fn default() -> Self {
        Self {
            query: String::new(),
            category: None,
            sort: ProductSort::default(),
            page: 1,
        }
    }
}

impl HomeFilters {
    /// Build filters from raw query pairs. The first occurrence of a key wins;
    /// unknown keys are ignored.
    pub fn from_pairs<K, V>(pairs: &[(K, V)]) -> Self
    where
        K: AsRef<str>,
        V: AsRef<str>,
    {
        let first = |name: &str| {
            pairs
                .iter()
                .find(|(key, _)| key.as_ref() == name)
                .map(|(_, value)| value.as_ref())
        };

        Self {
            query: first("q").map(str::trim).unwrap_or_default().to_string(),
            category: first("category").and_then(normalize_category),
            sort: first("sort")
                .and_then(ProductSort::parse)
                .unwrap_or_default(),
            page: first("page").map(parse_page).unwrap_or(1),
        }
    }
}

fn normalize_category(raw: &str) -> Option<String> {
    let trimmed = raw.trim();
    if trimmed.is_empty() || trimmed.eq_ignore_ascii_case(ALL_CATEGORIES) {
        None
    } else {
        Some(trimmed.to_string())
    }
}

fn parse_page(raw: &str) -> u32 {
    match raw.trim().parse::<i64>() {
        Ok(value) => u32::try_from(value.max(1)).unwrap_or(u32::MAX),
        Err(_) => 1,
    }
}
