//! usergate API - account REST server
//!
//! Provides sign-up, sign-in and identity endpoints behind an authentication
//! gateway that accepts bearer tokens or basic-auth credentials.

pub mod auth;
pub mod error;
pub mod handlers;
pub mod routes;
pub mod service;
pub mod state;
pub mod store;

use axum::{routing::get, Router};
use state::AppState;
use std::sync::Arc;
use tower_http::trace::TraceLayer;
use utoipa::{
    openapi::security::{Http, HttpAuthScheme, HttpBuilder, SecurityScheme},
    Modify, OpenApi,
};
use utoipa_swagger_ui::SwaggerUi;

/// OpenAPI document
#[derive(OpenApi)]
#[openapi(
    paths(
        handlers::users::signup_handler,
        handlers::users::signin_handler,
        handlers::users::me_handler,
        handlers::health::health_check,
    ),
    components(schemas(
        service::SignUpRequest,
        handlers::users::SignInResponse,
        handlers::health::HealthResponse,
        handlers::health::CacheInfo,
        error::ApiError,
        usergate_core::User,
        usergate_core::Identity,
    )),
    modifiers(&SecuritySchemes),
    tags(
        (name = "users", description = "Account sign-up, sign-in and identity"),
        (name = "health", description = "Liveness"),
    )
)]
pub struct ApiDoc;

struct SecuritySchemes;

impl Modify for SecuritySchemes {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        if let Some(components) = openapi.components.as_mut() {
            components.add_security_scheme(
                "bearer_auth",
                SecurityScheme::Http(
                    HttpBuilder::new()
                        .scheme(HttpAuthScheme::Bearer)
                        .bearer_format("JWT")
                        .build(),
                ),
            );
            components.add_security_scheme(
                "basic_auth",
                SecurityScheme::Http(Http::new(HttpAuthScheme::Basic)),
            );
        }
    }
}

/// Build the full application router
pub fn create_router(state: Arc<AppState>) -> Router {
    let cors = routes::cors_layer(&state.config.server);

    Router::new()
        .merge(routes::user_routes(&state))
        .route("/health", get(handlers::health::health_check))
        .with_state(state)
        .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", ApiDoc::openapi()))
        .layer(cors)
        .layer(TraceLayer::new_for_http())
}

/// In-memory wiring for integration tests
#[cfg(any(test, feature = "test-utils"))]
pub mod testing {
    use super::*;
    use crate::auth::{Argon2Hasher, PasswordConfig};
    use crate::store::InMemoryUserStore;
    use usergate_core::AppConfig;

    /// Argon2 parameters cheap enough for test runs
    pub fn fast_hasher() -> Arc<Argon2Hasher> {
        Arc::new(Argon2Hasher::with_config(PasswordConfig {
            memory_cost: 8192,
            time_cost: 1,
            parallelism: 1,
            output_len: Some(32),
        }))
    }

    /// State over an empty in-memory store, returned alongside the store
    pub fn test_state_with(config: AppConfig) -> (Arc<AppState>, Arc<InMemoryUserStore>) {
        let store = Arc::new(InMemoryUserStore::new());
        let state = Arc::new(AppState::new(config, store.clone(), fast_hasher()));
        (state, store)
    }

    pub fn test_state() -> (Arc<AppState>, Arc<InMemoryUserStore>) {
        test_state_with(AppConfig::default())
    }
}

/// Router over a fresh in-memory store with default configuration
#[cfg(any(test, feature = "test-utils"))]
pub fn create_router_for_testing() -> Router {
    let (state, _) = testing::test_state();
    create_router(state)
}
