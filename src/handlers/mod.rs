pub mod admin;
pub mod customers;
pub mod health;
pub mod me;
pub mod orgs;
pub mod resellers;

use axum::{
    Router,
    http::header,
    response::{IntoResponse, Response},
    routing::get,
};
use serde::{Deserialize, Serialize};
use tower_http::{cors::CorsLayer, trace::TraceLayer};

use crate::db::AppState;
use crate::listing::{self, PageInfo};

/// Assemble the full application router.
pub fn app(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health::health))
        .merge(admin::router(state.clone()))
        .merge(orgs::router(state.clone()))
        .merge(resellers::router(state.clone()))
        .merge(customers::router(state.clone()))
        .merge(me::router(state.clone()))
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state)
}

/// Query parameters shared by every list endpoint: free-text search plus
/// 1-based pagination.
#[derive(Debug, Deserialize)]
pub struct ListQuery {
    #[serde(default)]
    pub q: Option<String>,
    #[serde(default)]
    pub page: Option<usize>,
    #[serde(default)]
    pub per_page: Option<usize>,
}

pub const DEFAULT_PER_PAGE: usize = 25;

impl ListQuery {
    pub fn query(&self) -> &str {
        self.q.as_deref().unwrap_or("")
    }

    pub fn page(&self) -> usize {
        self.page.unwrap_or(1)
    }

    pub fn per_page(&self) -> usize {
        self.per_page.unwrap_or(DEFAULT_PER_PAGE)
    }
}

#[derive(Debug, Serialize)]
pub struct Paginated<T> {
    pub items: Vec<T>,
    pub page_info: PageInfo,
}

/// Filter, paginate, and clone the current page out of a fetched list.
pub fn filtered_page<T, F>(items: &[T], query: &ListQuery, fields: F) -> Paginated<T>
where
    T: Clone,
    F: Fn(&T) -> Vec<&str>,
{
    let filtered = listing::filter_rows(items, query.query(), fields);
    let info = listing::paginate(filtered.len(), query.page(), query.per_page());
    let items = listing::page_slice(&filtered, &info)
        .iter()
        .map(|item| (**item).clone())
        .collect();
    Paginated {
        items,
        page_info: info,
    }
}

/// Build a file-download response (CSV or plain-text key list).
pub fn attachment(content_type: &'static str, filename: &str, body: String) -> Response {
    (
        [
            (header::CONTENT_TYPE, content_type.to_string()),
            (
                header::CONTENT_DISPOSITION,
                format!("attachment; filename=\"{}\"", filename),
            ),
        ],
        body,
    )
        .into_response()
}
