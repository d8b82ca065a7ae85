//! Storefront homepage assembly.
//!
//! Fans out the independent catalog reads, enriches the product grid with
//! ratings and plain-text descriptions, and shapes the result into a
//! [`HomeView`]. Every optional read degrades to a fixed fallback, so building
//! the view never fails.

use std::collections::HashMap;
use std::sync::Arc;

use serde::Serialize;
use time::OffsetDateTime;
use tracing::debug;
use uuid::Uuid;

use crate::application::categories::{merge_categories, ordered_config};
use crate::application::fallback::with_fallback;
use crate::application::filters::HomeFilters;
use crate::application::pagination::PageInfo;
use crate::application::repos::{
    AnnouncementsRepo, CategoriesRepo, OrdersRepo, ProductPage, ProductSearchQuery, ProductsRepo,
    RatingsRepo, SessionRepo, StatsRepo,
};
use crate::cache::{
    ANNOUNCEMENT_KEY, CATEGORY_CONFIG_KEY, CacheTag, PRODUCT_CATEGORIES_KEY, QueryCache,
    VISITOR_COUNT_KEY, product_ratings_key, product_search_key,
};
use crate::domain::entities::{
    AnnouncementRecord, CategoryRecord, OrderRecord, ProductRecord, RatingSummary, Session,
};
use crate::util::markdown::strip_markdown;

pub const DEFAULT_PAGE_SIZE: u32 = 20;

/// Collaborators the homepage reads from.
#[derive(Clone)]
pub struct StorefrontRepos {
    pub sessions: Arc<dyn SessionRepo>,
    pub products: Arc<dyn ProductsRepo>,
    pub ratings: Arc<dyn RatingsRepo>,
    pub announcements: Arc<dyn AnnouncementsRepo>,
    pub stats: Arc<dyn StatsRepo>,
    pub categories: Arc<dyn CategoriesRepo>,
    pub orders: Arc<dyn OrdersRepo>,
}

/// Product as displayed on the homepage grid.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProductCard {
    pub id: Uuid,
    pub name: String,
    pub description: String,
    pub description_plain: String,
    pub price_cents: i64,
    pub category: Option<String>,
    pub image_url: Option<String>,
    /// Sellable plus reserved units.
    pub stock_count: i64,
    pub sold_count: i64,
    pub rating: f64,
    pub review_count: i64,
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
}

impl ProductCard {
    fn from_record(product: ProductRecord, rating: RatingSummary) -> Self {
        Self {
            id: product.id,
            description_plain: strip_markdown(&product.description),
            stock_count: i64::from(product.stock) + i64::from(product.locked),
            sold_count: i64::from(product.sold),
            rating: rating.average,
            review_count: rating.count,
            name: product.name,
            description: product.description,
            price_cents: product.price_cents,
            category: product.category,
            image_url: product.image_url,
            created_at: product.created_at,
        }
    }

    pub fn price_display(&self) -> String {
        let sign = if self.price_cents < 0 { "-" } else { "" };
        let cents = self.price_cents.unsigned_abs();
        format!("{sign}{}.{:02}", cents / 100, cents % 100)
    }

    pub fn rating_display(&self) -> String {
        format!("{:.1}", self.rating)
    }

    pub fn in_stock(&self) -> bool {
        self.stock_count > 0
    }
}

/// Everything the homepage template needs.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct HomeView {
    pub products: Vec<ProductCard>,
    pub announcement: Option<AnnouncementRecord>,
    pub visitor_count: i64,
    pub categories: Vec<String>,
    pub category_config: Vec<CategoryRecord>,
    pub pending_orders: Vec<OrderRecord>,
    pub filters: HomeFilters,
    pub pagination: PageInfo,
    pub session: Option<Session>,
}

#[derive(Clone)]
pub struct StorefrontService {
    repos: StorefrontRepos,
    cache: QueryCache,
    page_size: u32,
}

impl StorefrontService {
    pub fn new(repos: StorefrontRepos, cache: QueryCache, page_size: u32) -> Self {
        Self {
            repos,
            cache,
            page_size: page_size.max(1),
        }
    }

    pub fn cache(&self) -> &QueryCache {
        &self.cache
    }

    pub fn page_size(&self) -> u32 {
        self.page_size
    }

    /// Build the homepage view for `filters`, resolving the visitor from
    /// `session_token` when one is present.
    pub async fn handle(&self, filters: HomeFilters, session_token: Option<&str>) -> HomeView {
        let search = ProductSearchQuery {
            query: filters.query.clone(),
            category: filters.category.clone(),
            sort: filters.sort,
            page: filters.page,
            page_size: self.page_size,
        };

        let (session, product_page, announcement, visitor_count, category_config, observed) = tokio::join!(
            self.resolve_session(session_token),
            self.search_products(&search),
            self.active_announcement(),
            self.visitor_count(),
            self.category_config(),
            self.product_categories(),
        );

        let ratings = self.ratings_for(&product_page.items).await;

        let products: Vec<ProductCard> = product_page
            .items
            .into_iter()
            .map(|product| {
                let rating = ratings
                    .get(&product.id)
                    .copied()
                    .unwrap_or(RatingSummary::EMPTY);
                ProductCard::from_record(product, rating)
            })
            .collect();

        let pending_orders = match &session {
            Some(session) => self.pending_orders(session.user_id).await,
            None => Vec::new(),
        };

        let categories = merge_categories(&category_config, &observed);
        let pagination = PageInfo::new(filters.page, self.page_size, product_page.total);

        debug!(
            target = "storefront::application::storefront",
            products = products.len(),
            total = product_page.total,
            categories = categories.len(),
            authenticated = session.is_some(),
            "homepage view assembled"
        );

        HomeView {
            products,
            announcement,
            visitor_count,
            categories,
            category_config: ordered_config(&category_config),
            pending_orders,
            filters,
            pagination,
            session,
        }
    }

    async fn resolve_session(&self, token: Option<&str>) -> Option<Session> {
        let token = token.map(str::trim).filter(|token| !token.is_empty())?;
        with_fallback("session", self.repos.sessions.authenticate(token), None).await
    }

    async fn search_products(&self, search: &ProductSearchQuery) -> ProductPage {
        let key = product_search_key(search);
        let read = self
            .cache
            .cached(&key, &[CacheTag::Products], self.cache.ttl(), || {
                self.repos.products.search_active_products(search)
            });
        with_fallback(
            "product_search",
            read,
            ProductPage::empty(search.page, search.page_size),
        )
        .await
    }

    async fn active_announcement(&self) -> Option<AnnouncementRecord> {
        let read = self.cache.cached(
            ANNOUNCEMENT_KEY,
            &[CacheTag::Announcements],
            self.cache.ttl(),
            || self.repos.announcements.active_announcement(),
        );
        with_fallback("announcement", read, None).await
    }

    async fn visitor_count(&self) -> i64 {
        let read = self.cache.cached(
            VISITOR_COUNT_KEY,
            &[CacheTag::Visitors],
            self.cache.ttl(),
            || self.repos.stats.visitor_count(),
        );
        with_fallback("visitor_count", read, 0).await
    }

    async fn category_config(&self) -> Vec<CategoryRecord> {
        let read = self.cache.cached(
            CATEGORY_CONFIG_KEY,
            &[CacheTag::Categories],
            self.cache.ttl(),
            || self.repos.categories.list_categories(),
        );
        with_fallback("category_config", read, Vec::new()).await
    }

    async fn product_categories(&self) -> Vec<String> {
        let read = self.cache.cached(
            PRODUCT_CATEGORIES_KEY,
            &[CacheTag::Products, CacheTag::Categories],
            self.cache.ttl(),
            || self.repos.products.list_active_product_categories(),
        );
        with_fallback("product_categories", read, Vec::new()).await
    }

    async fn ratings_for(&self, products: &[ProductRecord]) -> HashMap<Uuid, RatingSummary> {
        let ids = sorted_unique_ids(products);
        if ids.is_empty() {
            return HashMap::new();
        }

        let key = product_ratings_key(&ids);
        let read = self
            .cache
            .cached(&key, &[CacheTag::Ratings], self.cache.ttl(), || {
                self.repos.ratings.product_ratings(&ids)
            });
        with_fallback("product_ratings", read, HashMap::new()).await
    }

    async fn pending_orders(&self, user_id: Uuid) -> Vec<OrderRecord> {
        with_fallback(
            "pending_orders",
            self.repos.orders.pending_orders(user_id),
            Vec::new(),
        )
        .await
    }
}

/// Product ids in ascending order without duplicates.
fn sorted_unique_ids(products: &[ProductRecord]) -> Vec<Uuid> {
    let mut ids: Vec<Uuid> = products.iter().map(|product| product.id).collect();
    ids.sort_unstable();
    ids.dedup();
    ids
}

#[cfg(test)]
mod tests {
    use super::*;

    fn product(id: u128, stock: i32, locked: i32) -> ProductRecord {
        ProductRecord {
            id: Uuid::from_u128(id),
            name: format!("product {id}"),
            description: "**Fast** delivery".to_string(),
            price_cents: 1999,
            category: None,
            image_url: None,
            stock,
            locked,
            sold: 4,
            created_at: OffsetDateTime::UNIX_EPOCH,
        }
    }

    #[test]
    fn ids_are_sorted_and_deduplicated() {
        let products = [product(3, 0, 0), product(1, 0, 0), product(3, 0, 0)];
        assert_eq!(
            sorted_unique_ids(&products),
            vec![Uuid::from_u128(1), Uuid::from_u128(3)]
        );
    }

    #[test]
    fn card_combines_stock_and_reserved_units() {
        let card = ProductCard::from_record(
            product(1, 5, 2),
            RatingSummary {
                average: 4.3,
                count: 8,
            },
        );
        assert_eq!(card.stock_count, 7);
        assert_eq!(card.sold_count, 4);
        assert_eq!(card.description_plain, "Fast delivery");
        assert_eq!(card.review_count, 8);
        assert_eq!(card.rating_display(), "4.3");
        assert_eq!(card.price_display(), "19.99");
    }

    #[test]
    fn card_without_rating_shows_zero() {
        let card = ProductCard::from_record(product(1, 0, 0), RatingSummary::EMPTY);
        assert_eq!(card.rating, 0.0);
        assert_eq!(card.review_count, 0);
        assert!(!card.in_stock());
    }
}
