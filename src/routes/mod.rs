//! Router assembly.

mod api;
mod common;

pub use api::api_routes;
pub use common::common_routes_with_ready;

use crate::handlers::dispatch::not_found;
use crate::state::AppState;
use axum::Router;
use tower_http::limit::RequestBodyLimitLayer;

/// Full application router: common routes, `/api` routes, enveloped 404 fallback, body size limit.
pub fn app(state: AppState, body_limit_bytes: usize) -> Router {
    Router::new()
        .merge(common_routes_with_ready(state.clone()))
        .merge(api_routes(state))
        .fallback(not_found)
        .layer(RequestBodyLimitLayer::new(body_limit_bytes))
}
