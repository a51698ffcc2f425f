//! Account API handlers
//!
//! Sign-up is whitelisted by the gateway. Sign-in and `me` only run once a
//! strategy has attached an [`Identity`] to the request.

use crate::error::AppError;
use crate::service::SignUpRequest;
use crate::state::AppState;
use axum::{
    extract::{rejection::JsonRejection, State},
    response::IntoResponse,
    Extension, Json,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use usergate_core::{Identity, User};
use utoipa::ToSchema;

/// Sign-in response
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct SignInResponse {
    pub name: String,
    /// Bearer token for subsequent requests
    pub token: String,
}

/// Register a new user account
///
/// The created account is returned without its password. New accounts get
/// the `DEV` role.
///
/// # Responses
///
/// * `200 OK` - Account created
/// * `400 Bad Request` - Malformed or invalid payload, or the save failed
#[utoipa::path(
    post,
    path = "/users/signup",
    tag = "users",
    request_body = SignUpRequest,
    responses(
        (status = 200, description = "Account created", body = User),
        (status = 400, description = "Invalid payload or save failure", body = crate::error::ApiError),
    )
)]
pub async fn signup_handler(
    State(state): State<Arc<AppState>>,
    payload: Result<Json<SignUpRequest>, JsonRejection>,
) -> Result<Json<User>, AppError> {
    let Json(request) = payload?;
    let user = state.users.sign_up(request).await?;

    Ok(Json(user))
}

/// Exchange credentials for a bearer token
///
/// Send `Authorization: Basic base64(email:password)`. A valid bearer token
/// is accepted too, in which case a fresh token is issued.
#[utoipa::path(
    post,
    path = "/users/signin",
    tag = "users",
    responses(
        (status = 200, description = "Token issued", body = SignInResponse),
        (status = 401, description = "Unauthorized", body = crate::error::ApiError),
    ),
    security(
        ("basic_auth" = []),
        ("bearer_auth" = [])
    )
)]
pub async fn signin_handler(
    State(state): State<Arc<AppState>>,
    Extension(identity): Extension<Identity>,
) -> Result<impl IntoResponse, AppError> {
    let token = state.gateway.issue_token(&identity).map_err(|e| {
        tracing::error!(user_id = %identity.id, error = %e, "token issuance failed");
        AppError::Internal(e.to_string())
    })?;

    tracing::info!(user_id = %identity.id, "token issued");
    Ok(Json(SignInResponse {
        name: identity.name,
        token,
    }))
}

/// Get the authenticated principal
#[utoipa::path(
    get,
    path = "/users/me",
    tag = "users",
    responses(
        (status = 200, description = "Current identity", body = Identity),
        (status = 401, description = "Unauthorized", body = crate::error::ApiError),
    ),
    security(
        ("bearer_auth" = []),
        ("basic_auth" = [])
    )
)]
pub async fn me_handler(Extension(identity): Extension<Identity>) -> Json<Identity> {
    Json(identity)
}
