use axum::{
    middleware,
    routing::{get, post},
    Router,
};
use std::sync::Arc;
use tower_http::trace::TraceLayer;

use crate::middleware::{require_auth, require_roles, ADMIN_ONLY};
use crate::{auth_handlers, AppState};

pub fn router(state: Arc<AppState>) -> Router {
    // Public routes (no authentication required)
    let public_routes = Router::new()
        .route("/", get(|| async { "authgate API running" }))
        .route("/login", post(auth_handlers::login));

    // Admin routes: role guard, applied inside the auth stage below
    let admin_routes = Router::new()
        .route("/create", post(auth_handlers::create_user))
        .route_layer(middleware::from_fn_with_state(ADMIN_ONLY, require_roles));

    // Everything here runs require_auth first
    let protected_routes = Router::new()
        .route("/me", get(auth_handlers::me))
        .merge(admin_routes)
        .route_layer(middleware::from_fn_with_state(state.clone(), require_auth));

    Router::new()
        .merge(public_routes)
        .merge(protected_routes)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
