use std::sync::Arc;

use axum::{
    Json, Router,
    extract::{RawQuery, State},
    http::{HeaderValue, StatusCode, header::CACHE_CONTROL},
    middleware,
    response::{IntoResponse, Response},
    routing::get,
};
use axum_extra::extract::CookieJar;
use url::form_urlencoded;

use crate::{
    application::{
        filters::HomeFilters,
        storefront::{HomeView, StorefrontService},
    },
    presentation::views::{HomeTemplate, render_not_found_response, render_template_response},
};

use super::middleware::{log_responses, set_request_context};

const PERSONALIZED_CACHE_CONTROL: &str = "private, no-store";

#[derive(Clone)]
pub struct HttpState {
    pub storefront: Arc<StorefrontService>,
    pub session_cookie: Arc<str>,
}

pub fn build_router(state: HttpState) -> Router {
    Router::new()
        .route("/", get(home))
        .route("/api/home", get(home_json))
        .fallback(fallback_router)
        .with_state(state)
        .layer(middleware::from_fn(log_responses))
        .layer(middleware::from_fn(set_request_context))
}

async fn home(
    State(state): State<HttpState>,
    RawQuery(query): RawQuery,
    jar: CookieJar,
) -> Response {
    let view = load_home(&state, query.as_deref(), &jar).await;
    let personalized = view.session.is_some();
    let mut response = render_template_response(HomeTemplate::new(view), StatusCode::OK);
    if personalized {
        mark_personalized(&mut response);
    }
    response
}

async fn home_json(
    State(state): State<HttpState>,
    RawQuery(query): RawQuery,
    jar: CookieJar,
) -> Response {
    let view = load_home(&state, query.as_deref(), &jar).await;
    let personalized = view.session.is_some();
    let mut response = Json(view).into_response();
    if personalized {
        mark_personalized(&mut response);
    }
    response
}

async fn fallback_router() -> Response {
    render_not_found_response()
}

async fn load_home(state: &HttpState, query: Option<&str>, jar: &CookieJar) -> HomeView {
    let pairs: Vec<(String, String)> = query
        .map(|raw| form_urlencoded::parse(raw.as_bytes()).into_owned().collect())
        .unwrap_or_default();
    let filters = HomeFilters::from_pairs(&pairs);
    let token = jar
        .get(&state.session_cookie)
        .map(|cookie| cookie.value().to_string());

    state.storefront.handle(filters, token.as_deref()).await
}

fn mark_personalized(response: &mut Response) {
    response.headers_mut().insert(
        CACHE_CONTROL,
        HeaderValue::from_static(PERSONALIZED_CACHE_CONTROL),
    );
}
