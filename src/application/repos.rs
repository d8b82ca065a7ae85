//! Repository traits describing persistence adapters.

use std::collections::HashMap;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use uuid::Uuid;

use crate::application::filters::ProductSort;
use crate::domain::entities::{
    AnnouncementRecord, CategoryRecord, OrderRecord, ProductRecord, RatingSummary, Session,
};

#[derive(Debug, Error)]
pub enum RepoError {
    #[error("persistence error: {0}")]
    Persistence(String),
    #[error("resource not found")]
    NotFound,
    #[error("invalid input: {message}")]
    InvalidInput { message: String },
    #[error("storage relation `{relation}` is unavailable")]
    Unavailable { relation: String },
    #[error("database timeout")]
    Timeout,
}

impl RepoError {
    pub fn from_persistence(err: impl std::fmt::Display) -> Self {
        Self::Persistence(err.to_string())
    }
}

/// Parameters for a paginated search over active products.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProductSearchQuery {
    pub query: String,
    pub category: Option<String>,
    pub sort: ProductSort,
    pub page: u32,
    pub page_size: u32,
}

impl ProductSearchQuery {
    pub fn offset(&self) -> u64 {
        u64::from(self.page.saturating_sub(1)) * u64::from(self.page_size)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProductPage {
    pub items: Vec<ProductRecord>,
    pub total: u64,
    pub page: u32,
    pub page_size: u32,
}

impl ProductPage {
    /// An empty result that still reports the requested page geometry.
    pub fn empty(page: u32, page_size: u32) -> Self {
        Self {
            items: Vec::new(),
            total: 0,
            page,
            page_size,
        }
    }
}

#[async_trait]
pub trait SessionRepo: Send + Sync {
    async fn authenticate(&self, token: &str) -> Result<Option<Session>, RepoError>;
}

#[async_trait]
pub trait ProductsRepo: Send + Sync {
    async fn search_active_products(
        &self,
        query: &ProductSearchQuery,
    ) -> Result<ProductPage, RepoError>;

    /// Distinct category names carried by active products.
    async fn list_active_product_categories(&self) -> Result<Vec<String>, RepoError>;
}

#[async_trait]
pub trait RatingsRepo: Send + Sync {
    async fn product_ratings(
        &self,
        ids: &[Uuid],
    ) -> Result<HashMap<Uuid, RatingSummary>, RepoError>;
}

#[async_trait]
pub trait AnnouncementsRepo: Send + Sync {
    async fn active_announcement(&self) -> Result<Option<AnnouncementRecord>, RepoError>;
}

#[async_trait]
pub trait StatsRepo: Send + Sync {
    async fn visitor_count(&self) -> Result<i64, RepoError>;
}

#[async_trait]
pub trait CategoriesRepo: Send + Sync {
    async fn list_categories(&self) -> Result<Vec<CategoryRecord>, RepoError>;
}

#[async_trait]
pub trait OrdersRepo: Send + Sync {
    async fn pending_orders(&self, user_id: Uuid) -> Result<Vec<OrderRecord>, RepoError>;
}

#[async_trait]
pub trait HealthRepo: Send + Sync {
    async fn ping(&self) -> Result<(), RepoError>;
}
