//! Admin API: read-only views of the running gateway.
//!
//! ```text
//! GET /admin/status  → version, route and codec counts
//! GET /admin/routes  → route table in registration order
//! GET /admin/codecs  → registered media types and the default
//! ```
//!
//! Every endpoint requires `Authorization: Bearer <admin.api_key>`.

pub mod auth;
pub mod handlers;

use axum::{middleware, routing::get, Router};
use std::sync::Arc;

use self::auth::admin_auth_middleware;
use self::handlers::*;
use crate::http::server::AppState;

pub fn setup_admin_router(state: AppState, api_key: String) -> Router {
    Router::new()
        .route("/admin/status", get(get_status))
        .route("/admin/routes", get(get_routes))
        .route("/admin/codecs", get(get_codecs))
        .layer(middleware::from_fn_with_state(
            Arc::<str>::from(api_key),
            admin_auth_middleware,
        ))
        .with_state(state)
}
