use std::collections::HashMap;

use async_trait::async_trait;
use sqlx::{Postgres, QueryBuilder};
use time::OffsetDateTime;
use uuid::Uuid;

use crate::{
    application::filters::ProductSort,
    application::repos::{ProductPage, ProductSearchQuery, ProductsRepo, RatingsRepo, RepoError},
    domain::entities::{ProductRecord, RatingSummary},
};

use super::{PostgresRepositories, map_sqlx_error, util::like_pattern};

const PRODUCT_COLUMNS: &str = "p.id, p.name, p.description, p.price_cents, p.category, \
    p.image_url, p.stock, p.locked, p.sold, p.created_at";

const RATING_EXPR: &str = "(SELECT COALESCE(AVG(r.rating), 0)::float8 \
    FROM product_reviews r WHERE r.product_id = p.id)";

#[derive(sqlx::FromRow)]
struct ProductRow {
    id: Uuid,
    name: String,
    description: String,
    price_cents: i64,
    category: Option<String>,
    image_url: Option<String>,
    stock: i32,
    locked: i32,
    sold: i32,
    created_at: OffsetDateTime,
}

impl From<ProductRow> for ProductRecord {
    fn from(row: ProductRow) -> Self {
        Self {
            id: row.id,
            name: row.name,
            description: row.description,
            price_cents: row.price_cents,
            category: row.category,
            image_url: row.image_url,
            stock: row.stock,
            locked: row.locked,
            sold: row.sold,
            created_at: row.created_at,
        }
    }
}

#[derive(sqlx::FromRow)]
struct RatingRow {
    product_id: Uuid,
    average: f64,
    count: i64,
}

impl PostgresRepositories {
    fn apply_product_filters<'q>(
        qb: &mut QueryBuilder<'q, Postgres>,
        query: &'q ProductSearchQuery,
    ) {
        qb.push(" WHERE p.is_active");

        if !query.query.is_empty() {
            let pattern = like_pattern(&query.query);
            qb.push(" AND (p.name ILIKE ");
            qb.push_bind(pattern.clone());
            qb.push(" ESCAPE '\\' OR p.description ILIKE ");
            qb.push_bind(pattern);
            qb.push(" ESCAPE '\\')");
        }

        if let Some(category) = query.category.as_ref() {
            qb.push(" AND p.category = ");
            qb.push_bind(category);
        }
    }

    fn push_product_order(qb: &mut QueryBuilder<'_, Postgres>, sort: ProductSort) {
        qb.push(" ORDER BY ");
        match sort {
            ProductSort::Newest => qb.push("p.created_at DESC"),
            ProductSort::PriceAsc => qb.push("p.price_cents ASC"),
            ProductSort::PriceDesc => qb.push("p.price_cents DESC"),
            ProductSort::Popular => qb.push("p.sold DESC, p.created_at DESC"),
            ProductSort::Rating => qb
                .push(RATING_EXPR)
                .push(" DESC, p.created_at DESC"),
        };
        qb.push(", p.id");
    }
}

#[async_trait]
impl ProductsRepo for PostgresRepositories {
    async fn search_active_products(
        &self,
        query: &ProductSearchQuery,
    ) -> Result<ProductPage, RepoError> {
        let limit = i64::from(query.page_size);
        let offset = i64::try_from(query.offset()).map_err(|_| RepoError::InvalidInput {
            message: format!("page {} is out of range", query.page),
        })?;

        let mut count_qb = QueryBuilder::<Postgres>::new("SELECT COUNT(*) FROM products p");
        Self::apply_product_filters(&mut count_qb, query);
        let total: i64 = count_qb
            .build_query_scalar()
            .fetch_one(self.pool())
            .await
            .map_err(map_sqlx_error)?;

        let mut qb = QueryBuilder::<Postgres>::new("SELECT ");
        qb.push(PRODUCT_COLUMNS);
        qb.push(" FROM products p");
        Self::apply_product_filters(&mut qb, query);
        Self::push_product_order(&mut qb, query.sort);
        qb.push(" LIMIT ");
        qb.push_bind(limit);
        qb.push(" OFFSET ");
        qb.push_bind(offset);

        let rows: Vec<ProductRow> = qb
            .build_query_as()
            .fetch_all(self.pool())
            .await
            .map_err(map_sqlx_error)?;

        Ok(ProductPage {
            items: rows.into_iter().map(ProductRecord::from).collect(),
            total: Self::convert_count(total)?,
            page: query.page,
            page_size: query.page_size,
        })
    }

    async fn list_active_product_categories(&self) -> Result<Vec<String>, RepoError> {
        sqlx::query_scalar::<_, String>(
            r#"
            SELECT DISTINCT category
            FROM products
            WHERE is_active
              AND category IS NOT NULL
              AND btrim(category) <> ''
            ORDER BY category
            "#,
        )
        .fetch_all(self.pool())
        .await
        .map_err(map_sqlx_error)
    }
}

#[async_trait]
impl RatingsRepo for PostgresRepositories {
    async fn product_ratings(
        &self,
        ids: &[Uuid],
    ) -> Result<HashMap<Uuid, RatingSummary>, RepoError> {
        if ids.is_empty() {
            return Ok(HashMap::new());
        }

        let rows = sqlx::query_as::<_, RatingRow>(
            r#"
            SELECT
                product_id,
                AVG(rating)::float8 AS average,
                COUNT(*) AS count
            FROM product_reviews
            WHERE product_id = ANY($1)
            GROUP BY product_id
            "#,
        )
        .bind(ids)
        .fetch_all(self.pool())
        .await
        .map_err(map_sqlx_error)?;

        Ok(rows
            .into_iter()
            .map(|row| {
                (
                    row.product_id,
                    RatingSummary {
                        average: row.average,
                        count: row.count,
                    },
                )
            })
            .collect())
    }
}
