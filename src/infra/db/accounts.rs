use async_trait::async_trait;
use time::OffsetDateTime;
use uuid::Uuid;

use crate::{
    application::repos::{OrdersRepo, RepoError, SessionRepo},
    domain::entities::{OrderRecord, Session},
};

use super::{PostgresRepositories, map_sqlx_error};

const PENDING_ORDERS_LIMIT: i64 = 20;

#[derive(sqlx::FromRow)]
struct SessionRow {
    user_id: Uuid,
    username: String,
}

#[derive(sqlx::FromRow)]
struct OrderRow {
    id: Uuid,
    order_no: String,
    product_id: Uuid,
    product_name: String,
    quantity: i32,
    amount_cents: i64,
    created_at: OffsetDateTime,
}

impl From<OrderRow> for OrderRecord {
    fn from(row: OrderRow) -> Self {
        Self {
            id: row.id,
            order_no: row.order_no,
            product_id: row.product_id,
            product_name: row.product_name,
            quantity: row.quantity,
            amount_cents: row.amount_cents,
            created_at: row.created_at,
        }
    }
}

#[async_trait]
impl SessionRepo for PostgresRepositories {
    async fn authenticate(&self, token: &str) -> Result<Option<Session>, RepoError> {
        let row = sqlx::query_as::<_, SessionRow>(
            r#"
            SELECT u.id AS user_id, u.username
            FROM sessions s
            INNER JOIN users u ON u.id = s.user_id
            WHERE s.token = $1
              AND s.expires_at > now()
            "#,
        )
        .bind(token)
        .fetch_optional(self.pool())
        .await
        .map_err(map_sqlx_error)?;

        Ok(row.map(|row| Session {
            user_id: row.user_id,
            username: row.username,
        }))
    }
}

#[async_trait]
impl OrdersRepo for PostgresRepositories {
    async fn pending_orders(&self, user_id: Uuid) -> Result<Vec<OrderRecord>, RepoError> {
        let rows = sqlx::query_as::<_, OrderRow>(
            r#"
            SELECT
                o.id,
                o.order_no,
                o.product_id,
                p.name AS product_name,
                o.quantity,
                o.amount_cents,
                o.created_at
            FROM orders o
            INNER JOIN products p ON p.id = o.product_id
            WHERE o.user_id = $1
              AND o.status = 'pending'
            ORDER BY o.created_at DESC, o.id
            LIMIT $2
            "#,
        )
        .bind(user_id)
        .bind(PENDING_ORDERS_LIMIT)
        .fetch_all(self.pool())
        .await
        .map_err(map_sqlx_error)?;

        Ok(rows.into_iter().map(OrderRecord::from).collect())
    }
}
