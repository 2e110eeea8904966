use axum::{
    extract::{Request, State},
    http::{header, HeaderMap},
    middleware::Next,
    response::Response,
};
use tracing::warn;

use crate::{error::ApiError, state::AppState};

/// Rejects any request whose bearer token differs from the configured secret.
/// Wraps every route and the fallback; rejected requests never reach a handler.
pub async fn require_bearer(
    State(state): State<AppState>,
    req: Request,
    next: Next,
) -> Result<Response, ApiError> {
    let Some(token) = bearer_token(req.headers()) else {
        warn!(method = %req.method(), uri = %req.uri(), "missing bearer token");
        return Err(ApiError::Unauthorized);
    };

    if token != state.config.auth.api_token {
        warn!(method = %req.method(), uri = %req.uri(), "invalid bearer token");
        return Err(ApiError::Unauthorized);
    }

    Ok(next.run(req).await)
}

/// Everything after `Bearer ` in the `Authorization` header, untouched. Surrounding
/// whitespace is part of the token, so a padded token never matches the secret.
pub fn bearer_token(headers: &HeaderMap) -> Option<&str> {
    let value = headers.get(header::AUTHORIZATION)?.to_str().ok()?;
    let token = value
        .strip_prefix("Bearer ")
        .or_else(|| value.strip_prefix("bearer "))?;
    (!token.is_empty()).then_some(token)
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;

    fn headers(auth: &'static str) -> HeaderMap {
        let mut h = HeaderMap::new();
        h.insert(header::AUTHORIZATION, HeaderValue::from_static(auth));
        h
    }

    #[test]
    fn extracts_bearer_token() {
        assert_eq!(bearer_token(&headers("Bearer abc123")), Some("abc123"));
        assert_eq!(bearer_token(&headers("bearer abc123")), Some("abc123"));
    }

    #[test]
    fn keeps_surrounding_whitespace() {
        assert_eq!(bearer_token(&headers("Bearer    abc123")), Some("   abc123"));
        assert_eq!(bearer_token(&headers("Bearer abc123\t")), Some("abc123\t"));
    }

    #[test]
    fn rejects_other_schemes_and_empty_tokens() {
        assert_eq!(bearer_token(&headers("Basic dXNlcjpwYXNz")), None);
        assert_eq!(bearer_token(&headers("Bearer ")), None);
        assert_eq!(bearer_token(&headers("abc123")), None);
        assert_eq!(bearer_token(&HeaderMap::new()), None);
    }
}
