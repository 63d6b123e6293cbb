//! Request gate: API switch and authorization predicate
//!
//! Both checks run before a handler is reached. The predicate is injected
//! when routes are registered and sees only the request headers.

use super::error::Problem;
use axum::{
    extract::{Request, State},
    http::{header::AUTHORIZATION, HeaderMap, StatusCode},
    middleware::Next,
    response::{IntoResponse, Response},
};
use std::sync::Arc;
use subtle::ConstantTimeEq;

/// Decides whether a request may use the settings API
pub trait RequestAuthorizer: Send + Sync {
    fn authorize(&self, headers: &HeaderMap) -> bool;
}

impl<F> RequestAuthorizer for F
where
    F: Fn(&HeaderMap) -> bool + Send + Sync,
{
    fn authorize(&self, headers: &HeaderMap) -> bool {
        self(headers)
    }
}

/// Authorizes every request
#[derive(Debug, Clone, Copy, Default)]
pub struct AllowAll;

impl RequestAuthorizer for AllowAll {
    fn authorize(&self, _headers: &HeaderMap) -> bool {
        true
    }
}

/// Requires `Authorization: Bearer <token>` with exactly the configured token
#[derive(Debug, Clone)]
pub struct BearerToken {
    token: String,
}

impl BearerToken {
    pub fn new(token: impl Into<String>) -> Self {
        Self {
            token: token.into(),
        }
    }
}

impl RequestAuthorizer for BearerToken {
    fn authorize(&self, headers: &HeaderMap) -> bool {
        headers
            .get(AUTHORIZATION)
            .and_then(|value| value.to_str().ok())
            .and_then(|value| value.strip_prefix("Bearer "))
            .is_some_and(|token| bool::from(token.as_bytes().ct_eq(self.token.as_bytes())))
    }
}

/// Gate state captured by the middleware
#[derive(Clone)]
pub struct Gate {
    pub enabled: bool,
    pub authorizer: Arc<dyn RequestAuthorizer>,
}

/// Reject requests while the API is disabled or the caller is unauthorized
pub async fn gate(State(gate): State<Gate>, request: Request, next: Next) -> Response {
    if !gate.enabled {
        tracing::debug!(path = %request.uri().path(), "Settings API disabled, request rejected");
        return Problem::new(StatusCode::FORBIDDEN, "Forbidden")
            .with_detail("Settings API is disabled")
            .into_response();
    }

    if !gate.authorizer.authorize(request.headers()) {
        tracing::warn!(path = %request.uri().path(), "Unauthorized settings API request");
        return Problem::new(StatusCode::UNAUTHORIZED, "Unauthorized")
            .with_detail("Not authorized to access settings")
            .into_response();
    }

    next.run(request).await
}
