#![allow(dead_code)]

use std::collections::{HashMap, HashSet};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use storefront::application::repos::{
    AnnouncementsRepo, CategoriesRepo, HealthRepo, OrdersRepo, ProductPage, ProductSearchQuery,
    ProductsRepo, RatingsRepo, RepoError, SessionRepo, StatsRepo,
};
use storefront::application::storefront::{StorefrontRepos, StorefrontService};
use storefront::cache::{CacheConfig, QueryCache};
use storefront::domain::entities::{
    AnnouncementRecord, CategoryRecord, OrderRecord, ProductRecord, RatingSummary, Session,
};
use time::OffsetDateTime;
use uuid::Uuid;

pub const PAGE_SIZE: u32 = 20;
pub const VALID_TOKEN: &str = "token-alice";

pub fn alice_id() -> Uuid {
    Uuid::from_u128(0xA11CE)
}

pub fn product(id: u128, name: &str, description: &str) -> ProductRecord {
    ProductRecord {
        id: Uuid::from_u128(id),
        name: name.to_string(),
        description: description.to_string(),
        price_cents: 1999,
        category: Some("Games".to_string()),
        image_url: None,
        stock: 5,
        locked: 1,
        sold: 3,
        created_at: OffsetDateTime::UNIX_EPOCH,
    }
}

pub fn category(name: &str, sort_order: i32) -> CategoryRecord {
    CategoryRecord {
        name: name.to_string(),
        sort_order,
    }
}

pub fn pending_order(order_no: &str) -> OrderRecord {
    OrderRecord {
        id: Uuid::from_u128(0x0DE7),
        order_no: order_no.to_string(),
        product_id: Uuid::from_u128(1),
        product_name: "Gift Card".to_string(),
        quantity: 1,
        amount_cents: 1999,
        created_at: OffsetDateTime::UNIX_EPOCH,
    }
}

#[derive(Default)]
pub struct CallCounts {
    pub sessions: AtomicUsize,
    pub search: AtomicUsize,
    pub product_categories: AtomicUsize,
    pub ratings: AtomicUsize,
    pub announcements: AtomicUsize,
    pub stats: AtomicUsize,
    pub categories: AtomicUsize,
    pub orders: AtomicUsize,
}

fn read(counter: &AtomicUsize) -> usize {
    counter.load(Ordering::SeqCst)
}

impl CallCounts {
    pub fn sessions(&self) -> usize {
        read(&self.sessions)
    }
    pub fn search(&self) -> usize {
        read(&self.search)
    }
    pub fn product_categories(&self) -> usize {
        read(&self.product_categories)
    }
    pub fn ratings(&self) -> usize {
        read(&self.ratings)
    }
    pub fn orders(&self) -> usize {
        read(&self.orders)
    }
}

/// In-memory collaborators with per-read failure switches and call counters.
pub struct StubRepos {
    pub products: Vec<ProductRecord>,
    pub total: Option<u64>,
    pub product_categories: Vec<String>,
    pub ratings: HashMap<Uuid, RatingSummary>,
    pub announcement: Option<AnnouncementRecord>,
    pub visitors: i64,
    pub categories: Vec<CategoryRecord>,
    pub orders: Vec<OrderRecord>,
    /// Reads named here return an error.
    pub failing: HashSet<&'static str>,
    /// Every read sleeps this long before answering.
    pub delay: Option<Duration>,
    pub calls: CallCounts,
    pub rating_requests: Mutex<Vec<Vec<Uuid>>>,
    pub search_requests: Mutex<Vec<ProductSearchQuery>>,
}

impl Default for StubRepos {
    fn default() -> Self {
        Self {
            products: Vec::new(),
            total: None,
            product_categories: Vec::new(),
            ratings: HashMap::new(),
            announcement: None,
            visitors: 0,
            categories: Vec::new(),
            orders: Vec::new(),
            failing: HashSet::new(),
            delay: None,
            calls: CallCounts::default(),
            rating_requests: Mutex::new(Vec::new()),
            search_requests: Mutex::new(Vec::new()),
        }
    }
}

impl StubRepos {
    pub fn failing_all() -> Self {
        Self {
            failing: [
                "sessions",
                "search",
                "product_categories",
                "ratings",
                "announcements",
                "stats",
                "categories",
                "orders",
                "health",
            ]
            .into_iter()
            .collect(),
            ..Self::default()
        }
    }

    async fn enter(&self, read: &'static str, counter: &AtomicUsize) -> Result<(), RepoError> {
        counter.fetch_add(1, Ordering::SeqCst);
        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }
        if self.failing.contains(read) {
            return Err(RepoError::Persistence(format!("{read} unavailable")));
        }
        Ok(())
    }

    pub fn rating_requests(&self) -> Vec<Vec<Uuid>> {
        self.rating_requests.lock().unwrap().clone()
    }

    pub fn search_requests(&self) -> Vec<ProductSearchQuery> {
        self.search_requests.lock().unwrap().clone()
    }
}

#[async_trait]
impl SessionRepo for StubRepos {
    async fn authenticate(&self, token: &str) -> Result<Option<Session>, RepoError> {
        self.enter("sessions", &self.calls.sessions).await?;
        Ok((token == VALID_TOKEN).then(|| Session {
            user_id: alice_id(),
            username: "alice".to_string(),
        }))
    }
}

#[async_trait]
impl ProductsRepo for StubRepos {
    async fn search_active_products(
        &self,
        query: &ProductSearchQuery,
    ) -> Result<ProductPage, RepoError> {
        self.search_requests.lock().unwrap().push(query.clone());
        self.enter("search", &self.calls.search).await?;
        Ok(ProductPage {
            items: self.products.clone(),
            total: self.total.unwrap_or(self.products.len() as u64),
            page: query.page,
            page_size: query.page_size,
        })
    }

    async fn list_active_product_categories(&self) -> Result<Vec<String>, RepoError> {
        self.enter("product_categories", &self.calls.product_categories)
            .await?;
        Ok(self.product_categories.clone())
    }
}

#[async_trait]
impl RatingsRepo for StubRepos {
    async fn product_ratings(
        &self,
        ids: &[Uuid],
    ) -> Result<HashMap<Uuid, RatingSummary>, RepoError> {
        self.rating_requests.lock().unwrap().push(ids.to_vec());
        self.enter("ratings", &self.calls.ratings).await?;
        Ok(self
            .ratings
            .iter()
            .filter(|(id, _)| ids.contains(id))
            .map(|(id, summary)| (*id, *summary))
            .collect())
    }
}

#[async_trait]
impl AnnouncementsRepo for StubRepos {
    async fn active_announcement(&self) -> Result<Option<AnnouncementRecord>, RepoError> {
        self.enter("announcements", &self.calls.announcements)
            .await?;
        Ok(self.announcement.clone())
    }
}

#[async_trait]
impl StatsRepo for StubRepos {
    async fn visitor_count(&self) -> Result<i64, RepoError> {
        self.enter("stats", &self.calls.stats).await?;
        Ok(self.visitors)
    }
}

#[async_trait]
impl CategoriesRepo for StubRepos {
    async fn list_categories(&self) -> Result<Vec<CategoryRecord>, RepoError> {
        self.enter("categories", &self.calls.categories).await?;
        Ok(self.categories.clone())
    }
}

#[async_trait]
impl OrdersRepo for StubRepos {
    async fn pending_orders(&self, user_id: Uuid) -> Result<Vec<OrderRecord>, RepoError> {
        self.enter("orders", &self.calls.orders).await?;
        Ok(self
            .orders
            .iter()
            .filter(|_| user_id == alice_id())
            .cloned()
            .collect())
    }
}

#[async_trait]
impl HealthRepo for StubRepos {
    async fn ping(&self) -> Result<(), RepoError> {
        if self.failing.contains("health") {
            return Err(RepoError::Timeout);
        }
        Ok(())
    }
}

pub fn repos(stub: &Arc<StubRepos>) -> StorefrontRepos {
    StorefrontRepos {
        sessions: stub.clone(),
        products: stub.clone(),
        ratings: stub.clone(),
        announcements: stub.clone(),
        stats: stub.clone(),
        categories: stub.clone(),
        orders: stub.clone(),
    }
}

pub fn service(stub: &Arc<StubRepos>) -> StorefrontService {
    service_with_cache(stub, QueryCache::in_memory(&CacheConfig::default()))
}

pub fn service_with_cache(stub: &Arc<StubRepos>, cache: QueryCache) -> StorefrontService {
    StorefrontService::new(repos(stub), cache, PAGE_SIZE)
}
