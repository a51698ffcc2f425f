//! API route definitions

use crate::auth::gateway_middleware;
use crate::handlers::users;
use crate::state::AppState;
use axum::{
    http::{header, HeaderValue, Method},
    middleware,
    routing::{get, post},
    Router,
};
use std::sync::Arc;
use tower_http::cors::{AllowOrigin, Any, CorsLayer};
use usergate_core::ServerConfig;

/// Account routes, all behind the authentication gateway
///
/// Sign-up stays reachable without credentials through the gateway whitelist.
pub fn user_routes(state: &Arc<AppState>) -> Router<Arc<AppState>> {
    Router::new()
        .route("/users/signup", post(users::signup_handler))
        .route("/users/signin", post(users::signin_handler))
        .route("/users/me", get(users::me_handler))
        .route_layer(middleware::from_fn_with_state(
            Arc::clone(&state.gateway),
            gateway_middleware,
        ))
}

/// CORS policy; an empty origin list allows any origin
pub fn cors_layer(config: &ServerConfig) -> CorsLayer {
    let cors = CorsLayer::new()
        .allow_methods([
            Method::GET,
            Method::POST,
            Method::PUT,
            Method::DELETE,
            Method::OPTIONS,
        ])
        .allow_headers([header::AUTHORIZATION, header::CONTENT_TYPE]);

    if config.cors_origins.is_empty() {
        return cors.allow_origin(Any);
    }

    let origins: Vec<HeaderValue> = config
        .cors_origins
        .iter()
        .filter_map(|origin| match origin.parse() {
            Ok(value) => Some(value),
            Err(_) => {
                tracing::warn!(%origin, "ignoring invalid CORS origin");
                None
            }
        })
        .collect();

    cors.allow_origin(AllowOrigin::list(origins))
}
