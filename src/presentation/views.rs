use crate::application::error::{ErrorReport, HttpError};
use crate::application::filters::ProductSort;
use crate::application::storefront::HomeView;
use askama::{Error as AskamaError, Template};
use axum::{
    http::StatusCode,
    response::{Html, IntoResponse, Response},
};
use thiserror::Error;
use url::form_urlencoded::Serializer;

#[derive(Debug, Error)]
#[error("{public_message}")]
pub struct TemplateRenderError {
    pub(crate) source: &'static str,
    pub(crate) public_message: &'static str,
    #[source]
    pub(crate) error: AskamaError,
}

impl TemplateRenderError {
    pub fn new(source: &'static str, public_message: &'static str, error: AskamaError) -> Self {
        Self {
            source,
            public_message,
            error,
        }
    }
}

impl From<TemplateRenderError> for HttpError {
    fn from(err: TemplateRenderError) -> Self {
        let TemplateRenderError {
            source,
            public_message,
            error,
        } = err;

        HttpError::from_error(
            source,
            StatusCode::INTERNAL_SERVER_ERROR,
            public_message,
            &error,
        )
    }
}

pub fn render_template<T: Template>(template: T) -> Result<Html<String>, HttpError> {
    template.render().map(Html).map_err(|err| {
        TemplateRenderError::new(
            "presentation::views::render_template",
            "Template rendering failed",
            err,
        )
        .into()
    })
}

pub fn render_template_response<T: Template>(template: T, status: StatusCode) -> Response {
    match render_template(template) {
        Ok(html) => (status, html).into_response(),
        Err(err) => err.into_response(),
    }
}

pub fn render_not_found_response() -> Response {
    let view = ErrorPageView::not_found();
    let mut response = render_template_response(ErrorTemplate { view }, StatusCode::NOT_FOUND);
    ErrorReport::from_message(
        "presentation::views::render_not_found_response",
        StatusCode::NOT_FOUND,
        "Resource not found",
    )
    .attach(&mut response);
    response
}

#[derive(Clone)]
pub struct CategoryLink {
    pub label: String,
    pub href: String,
    pub is_active: bool,
}

#[derive(Clone)]
pub struct SortOption {
    pub value: &'static str,
    pub label: &'static str,
    pub is_selected: bool,
}

/// Links and form state derived from the current filters.
pub struct HomeNavigation {
    pub categories: Vec<CategoryLink>,
    pub sort_options: Vec<SortOption>,
    pub prev_href: Option<String>,
    pub next_href: Option<String>,
}

impl HomeNavigation {
    pub fn from_view(view: &HomeView) -> Self {
        let filters = &view.filters;
        let query = filters.query.as_str();

        let mut categories = Vec::with_capacity(view.categories.len() + 1);
        categories.push(CategoryLink {
            label: "All".to_string(),
            href: home_href(query, None, filters.sort, 1),
            is_active: filters.category.is_none(),
        });
        categories.extend(view.categories.iter().map(|name| CategoryLink {
            label: name.clone(),
            href: home_href(query, Some(name), filters.sort, 1),
            is_active: filters.category.as_deref() == Some(name.as_str()),
        }));

        let sort_options = SORT_OPTIONS
            .iter()
            .map(|(sort, label)| SortOption {
                value: sort.as_str(),
                label: *label,
                is_selected: *sort == filters.sort,
            })
            .collect();

        let category = filters.category.as_deref();
        let pagination = &view.pagination;
        let prev_href = pagination
            .has_prev
            .then(|| home_href(query, category, filters.sort, pagination.page - 1));
        let next_href = pagination
            .has_next
            .then(|| home_href(query, category, filters.sort, pagination.page + 1));

        Self {
            categories,
            sort_options,
            prev_href,
            next_href,
        }
    }
}

const SORT_OPTIONS: [(ProductSort, &str); 5] = [
    (ProductSort::Newest, "Newest"),
    (ProductSort::Popular, "Best selling"),
    (ProductSort::Rating, "Top rated"),
    (ProductSort::PriceAsc, "Price: low to high"),
    (ProductSort::PriceDesc, "Price: high to low"),
];

/// Homepage URL carrying only the non-default filters.
pub fn home_href(query: &str, category: Option<&str>, sort: ProductSort, page: u32) -> String {
    let mut serializer = Serializer::new(String::new());
    if !query.is_empty() {
        serializer.append_pair("q", query);
    }
    if let Some(category) = category {
        serializer.append_pair("category", category);
    }
    if sort != ProductSort::default() {
        serializer.append_pair("sort", sort.as_str());
    }
    if page > 1 {
        serializer.append_pair("page", &page.to_string());
    }

    let encoded = serializer.finish();
    if encoded.is_empty() {
        "/".to_string()
    } else {
        format!("/?{encoded}")
    }
}

#[derive(Template)]
#[template(path = "home.html")]
pub struct HomeTemplate {
    pub home: HomeView,
    pub nav: HomeNavigation,
}

impl HomeTemplate {
    pub fn new(home: HomeView) -> Self {
        let nav = HomeNavigation::from_view(&home);
        Self { home, nav }
    }
}

pub struct ErrorPageView {
    pub title: String,
    pub message: String,
}

impl ErrorPageView {
    pub fn not_found() -> Self {
        Self {
            title: "Page Not Found".to_string(),
            message: "The page you requested does not exist. Head back to the shop to keep browsing."
                .to_string(),
        }
    }
}

#[derive(Template)]
#[template(path = "error.html")]
pub struct ErrorTemplate {
    pub view: ErrorPageView,
}

#[cfg(test)]
mod tests {
    use time::OffsetDateTime;
    use uuid::Uuid;

    use super::*;
    use crate::application::filters::HomeFilters;
    use crate::application::pagination::PageInfo;
    use crate::application::storefront::ProductCard;
    use crate::domain::entities::AnnouncementRecord;

    fn home_view() -> HomeView {
        HomeView {
            products: vec![ProductCard {
                id: Uuid::from_u128(1),
                name: "Steam <Gift> Card".to_string(),
                description: "**Instant** delivery".to_string(),
                description_plain: "Instant delivery".to_string(),
                price_cents: 4999,
                category: Some("Gift Cards".to_string()),
                image_url: None,
                stock_count: 3,
                sold_count: 12,
                rating: 4.5,
                review_count: 2,
                created_at: OffsetDateTime::UNIX_EPOCH,
            }],
            announcement: Some(AnnouncementRecord {
                id: Uuid::from_u128(9),
                title: "Maintenance".to_string(),
                body: "Back soon".to_string(),
                created_at: OffsetDateTime::UNIX_EPOCH,
            }),
            visitor_count: 42,
            categories: vec!["Gift Cards".to_string(), "Games & Apps".to_string()],
            category_config: Vec::new(),
            pending_orders: Vec::new(),
            filters: HomeFilters {
                query: "steam".to_string(),
                category: Some("Gift Cards".to_string()),
                sort: ProductSort::PriceAsc,
                page: 2,
            },
            pagination: PageInfo::new(2, 1, 3),
            session: None,
        }
    }

    #[test]
    fn default_filters_link_to_root() {
        assert_eq!(home_href("", None, ProductSort::Newest, 1), "/");
    }

    #[test]
    fn href_encodes_values() {
        insta::assert_snapshot!(
            home_href("gift card", Some("Games & Apps"), ProductSort::Rating, 3),
            @"/?q=gift+card&category=Games+%26+Apps&sort=rating&page=3"
        );
    }

    #[test]
    fn navigation_marks_active_category_and_pages() {
        let nav = HomeNavigation::from_view(&home_view());

        let active: Vec<&str> = nav
            .categories
            .iter()
            .filter(|link| link.is_active)
            .map(|link| link.label.as_str())
            .collect();
        assert_eq!(active, vec!["Gift Cards"]);
        assert_eq!(
            nav.prev_href.as_deref(),
            Some("/?q=steam&category=Gift+Cards&sort=price_asc")
        );
        assert_eq!(
            nav.next_href.as_deref(),
            Some("/?q=steam&category=Gift+Cards&sort=price_asc&page=3")
        );
        assert!(
            nav.sort_options
                .iter()
                .any(|option| option.is_selected && option.value == "price_asc")
        );
    }

    #[test]
    fn home_template_escapes_product_names() {
        let html = render_template(HomeTemplate::new(home_view()))
            .expect("template renders")
            .0;

        assert!(!html.contains("<Gift>"));
        assert!(html.contains("Gift"));
        assert!(html.contains("49.99"));
        assert!(html.contains("Maintenance"));
        assert!(html.contains("Instant delivery"));
    }

    #[test]
    fn not_found_attaches_report() {
        let response = render_not_found_response();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
        assert!(response.extensions().get::<ErrorReport>().is_some());
    }
}
