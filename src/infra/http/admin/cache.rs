use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::Serialize;
use tracing::info;

use crate::{application::error::HttpError, cache::CacheTag};

use super::AdminState;

#[derive(Debug, Serialize)]
pub(super) struct InvalidationSummary {
    tag: &'static str,
    removed: usize,
}

pub(super) async fn invalidate_cache(State(state): State<AdminState>) -> Response {
    state.cache.invalidate_all().await;
    info!(
        target = "storefront::http::admin::cache",
        "cleared all cached reads"
    );
    StatusCode::NO_CONTENT.into_response()
}

pub(super) async fn invalidate_cache_tag(
    State(state): State<AdminState>,
    Path(tag): Path<String>,
) -> Result<Json<InvalidationSummary>, HttpError> {
    let tag: CacheTag = tag.parse().map_err(|err| {
        HttpError::from_error(
            "infra::http::admin::invalidate_cache_tag",
            StatusCode::NOT_FOUND,
            "Unknown cache tag",
            &err,
        )
    })?;

    let removed = state.cache.invalidate(tag).await;
    info!(
        target = "storefront::http::admin::cache",
        tag = tag.as_str(),
        removed,
        "invalidated cache tag"
    );

    Ok(Json(InvalidationSummary {
        tag: tag.as_str(),
        removed,
    }))
}
