/// Authentication gateway
///
/// Every request routed through [`gateway_middleware`] is either
/// whitelisted (passed through with no identity) or run through the ordered
/// strategy list. The first strategy that succeeds attaches its [`Identity`]
/// to the request extensions; if none succeed the request is denied with a
/// single, detail-free `401 Unauthorized`.
///
/// In handlers, extract the principal with `Extension<Identity>`.
use super::basic::BasicAuthValidator;
use super::cache::ResultCache;
use super::strategy::{Authenticator, BasicStrategy, TokenStrategy};
use super::token::{TokenError, TokenIssuer};
use crate::error::ApiError;
use axum::{
    extract::{Request, State},
    http::{HeaderMap, Method, StatusCode},
    middleware::Next,
    response::{IntoResponse, Response},
    Json,
};
use std::collections::HashSet;
use std::sync::Arc;
use thiserror::Error;
use usergate_core::Identity;

/// Authentication failures
///
/// The variants exist for logging; every one of them renders as the same
/// `401` response.
#[derive(Debug, Error)]
pub enum AuthError {
    #[error("Missing Authorization header")]
    MissingCredentials,

    #[error("Authorization scheme not handled by this strategy")]
    UnsupportedScheme,

    #[error("Malformed credentials")]
    MalformedCredentials,

    #[error("Invalid token: {0}")]
    Token(#[from] TokenError),

    #[error("Invalid credentials")]
    InvalidCredentials,

    #[error("No authentication strategy accepted the request")]
    Denied,
}

impl IntoResponse for AuthError {
    fn into_response(self) -> Response {
        (StatusCode::UNAUTHORIZED, Json(ApiError::unauthorized())).into_response()
    }
}

/// Routes that skip authentication, matched on exact method and path
#[derive(Debug, Clone, Default)]
pub struct Whitelist {
    routes: HashSet<(Method, String)>,
}

impl Whitelist {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn allow(mut self, method: Method, path: impl Into<String>) -> Self {
        self.routes.insert((method, path.into()));
        self
    }

    pub fn contains(&self, method: &Method, path: &str) -> bool {
        self.routes.contains(&(method.clone(), path.to_string()))
    }

    /// The sign-up route is the only unauthenticated account endpoint
    pub fn signup_only() -> Self {
        Self::new().allow(Method::POST, "/users/signup")
    }
}

/// Outcome of a successful gate check
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Decision {
    /// Whitelisted route, no identity attached
    Bypass,
    /// A strategy resolved this principal
    Authenticated(Identity),
}

/// Orders the strategies and owns the token issuer used after sign-in
pub struct Gateway {
    whitelist: Whitelist,
    strategies: Vec<Arc<dyn Authenticator>>,
    tokens: Arc<TokenIssuer>,
}

impl Gateway {
    pub fn new(
        whitelist: Whitelist,
        strategies: Vec<Arc<dyn Authenticator>>,
        tokens: Arc<TokenIssuer>,
    ) -> Self {
        Self {
            whitelist,
            strategies,
            tokens,
        }
    }

    /// Bearer token first, then cached basic-auth, with the sign-up whitelist
    pub fn standard(
        tokens: Arc<TokenIssuer>,
        validator: BasicAuthValidator,
        cache: ResultCache,
    ) -> Self {
        let strategies: Vec<Arc<dyn Authenticator>> = vec![
            Arc::new(TokenStrategy::new(Arc::clone(&tokens))),
            Arc::new(BasicStrategy::new(validator, cache)),
        ];
        Self::new(Whitelist::signup_only(), strategies, tokens)
    }

    pub fn is_whitelisted(&self, method: &Method, path: &str) -> bool {
        self.whitelist.contains(method, path)
    }

    /// Run the strategies in order; the first success wins
    pub async fn authenticate(&self, headers: &HeaderMap) -> Result<Identity, AuthError> {
        for strategy in &self.strategies {
            match strategy.authenticate(headers).await {
                Ok(identity) => {
                    tracing::debug!(strategy = strategy.name(), "strategy accepted request");
                    return Ok(identity);
                }
                Err(e) => {
                    tracing::debug!(strategy = strategy.name(), reason = %e, "strategy rejected request");
                }
            }
        }
        Err(AuthError::Denied)
    }

    /// Full per-request decision: whitelist, then strategies
    pub async fn check(
        &self,
        method: &Method,
        path: &str,
        headers: &HeaderMap,
    ) -> Result<Decision, AuthError> {
        if self.is_whitelisted(method, path) {
            tracing::debug!(%method, path, "whitelisted route, skipping authentication");
            return Ok(Decision::Bypass);
        }
        self.authenticate(headers).await.map(Decision::Authenticated)
    }

    /// Issue a bearer token for an already authenticated principal
    pub fn issue_token(&self, identity: &Identity) -> Result<String, TokenError> {
        self.tokens.issue_default(identity)
    }
}

/// Authentication middleware
///
/// ```ignore
/// let app = Router::new()
///     .route("/users/me", get(me_handler))
///     .route_layer(middleware::from_fn_with_state(gateway, gateway_middleware));
/// ```
pub async fn gateway_middleware(
    State(gateway): State<Arc<Gateway>>,
    mut request: Request,
    next: Next,
) -> Result<Response, AuthError> {
    let method = request.method().clone();
    let path = request.uri().path().to_string();

    match gateway.check(&method, &path, request.headers()).await {
        Ok(Decision::Bypass) => Ok(next.run(request).await),
        Ok(Decision::Authenticated(identity)) => {
            tracing::info!(user_id = %identity.id, email = %identity.email, %method, path, "user authenticated");
            request.extensions_mut().insert(identity);
            Ok(next.run(request).await)
        }
        Err(e) => {
            tracing::info!(%method, path, "authentication denied");
            Err(e)
        }
    }
}
