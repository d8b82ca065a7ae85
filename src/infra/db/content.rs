use async_trait::async_trait;
use time::OffsetDateTime;
use uuid::Uuid;

use crate::{
    application::repos::{AnnouncementsRepo, CategoriesRepo, RepoError, StatsRepo},
    domain::entities::{AnnouncementRecord, CategoryRecord},
};

use super::{PostgresRepositories, map_sqlx_error};

const VISITORS_STAT_KEY: &str = "visitors";

#[derive(sqlx::FromRow)]
struct AnnouncementRow {
    id: Uuid,
    title: String,
    body: String,
    created_at: OffsetDateTime,
}

impl From<AnnouncementRow> for AnnouncementRecord {
    fn from(row: AnnouncementRow) -> Self {
        Self {
            id: row.id,
            title: row.title,
            body: row.body,
            created_at: row.created_at,
        }
    }
}

#[derive(sqlx::FromRow)]
struct CategoryRow {
    name: String,
    sort_order: i32,
}

#[async_trait]
impl AnnouncementsRepo for PostgresRepositories {
    async fn active_announcement(&self) -> Result<Option<AnnouncementRecord>, RepoError> {
        let row = sqlx::query_as::<_, AnnouncementRow>(
            r#"
            SELECT id, title, body, created_at
            FROM announcements
            WHERE is_active
              AND (starts_at IS NULL OR starts_at <= now())
              AND (ends_at IS NULL OR ends_at > now())
            ORDER BY created_at DESC, id
            LIMIT 1
            "#,
        )
        .fetch_optional(self.pool())
        .await
        .map_err(map_sqlx_error)?;

        Ok(row.map(AnnouncementRecord::from))
    }
}

#[async_trait]
impl StatsRepo for PostgresRepositories {
    async fn visitor_count(&self) -> Result<i64, RepoError> {
        let value = sqlx::query_scalar::<_, i64>("SELECT value FROM site_stats WHERE key = $1")
            .bind(VISITORS_STAT_KEY)
            .fetch_optional(self.pool())
            .await
            .map_err(map_sqlx_error)?;

        Ok(value.unwrap_or(0))
    }
}

#[async_trait]
impl CategoriesRepo for PostgresRepositories {
    async fn list_categories(&self) -> Result<Vec<CategoryRecord>, RepoError> {
        let rows = sqlx::query_as::<_, CategoryRow>(
            r#"
            SELECT name, sort_order
            FROM categories
            ORDER BY sort_order, name
            "#,
        )
        .fetch_all(self.pool())
        .await
        .map_err(map_sqlx_error)?;

        Ok(rows
            .into_iter()
            .map(|row| CategoryRecord {
                name: row.name,
                sort_order: row.sort_order,
            })
            .collect())
    }
}
