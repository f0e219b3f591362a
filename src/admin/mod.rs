//! Management API, bearer-token protected.

pub mod auth;
pub mod handlers;

use axum::{
    middleware,
    routing::{get, post},
    Router,
};

use self::auth::admin_auth_middleware;
use self::handlers::*;
use crate::http::server::AppState;

pub fn admin_router(state: AppState) -> Router<AppState> {
    Router::new()
        .route("/admin/status", get(get_status))
        .route("/admin/allow-list/{hub_type}", get(get_allow_list))
        .route("/admin/thin-hubs", get(get_thin_hubs))
        .route("/admin/resolve", get(resolve))
        .route("/admin/cache/invalidate", post(invalidate_cache))
        .route_layer(middleware::from_fn_with_state(state, admin_auth_middleware))
}
