use axum::http::HeaderMap;

use crate::auth::{decode_token, Claims, TokenScope};
use crate::config;
use crate::error::ApiError;

/// Decoded bearer token, before the account row is loaded.
#[derive(Clone, Debug)]
pub struct AuthClaims {
    pub sub: uuid::Uuid,
    pub scope: TokenScope,
}

impl From<Claims> for AuthClaims {
    fn from(claims: Claims) -> Self {
        Self {
            sub: claims.sub,
            scope: claims.scope,
        }
    }
}

/// Validate the bearer token on a request and check it carries the expected
/// scope. User tokens are rejected on admin routes and vice versa.
pub fn authenticate(headers: &HeaderMap, expected_scope: TokenScope) -> Result<AuthClaims, ApiError> {
    let token = extract_bearer_token(headers).map_err(ApiError::unauthorized)?;

    let claims = decode_token(&token, &config::config().security.jwt_secret).map_err(|e| {
        tracing::warn!("Rejected bearer token: {}", e);
        ApiError::unauthorized("Invalid or expired token")
    })?;

    if claims.scope != expected_scope {
        tracing::warn!("Token scope mismatch");
        return Err(ApiError::forbidden("Token is not valid for this endpoint"));
    }

    Ok(claims.into())
}

/// Extract the token from an `Authorization: Bearer <jwt>` header
fn extract_bearer_token(headers: &HeaderMap) -> Result<String, String> {
    let auth_header = headers
        .get("authorization")
        .ok_or_else(|| "Missing Authorization header".to_string())?;

    let auth_str = auth_header
        .to_str()
        .map_err(|_| "Invalid Authorization header format".to_string())?;

    if let Some(token) = auth_str.strip_prefix("Bearer ") {
        if token.trim().is_empty() {
            return Err("Empty bearer token".to_string());
        }
        Ok(token.to_string())
    } else {
        Err("Authorization header must use Bearer token format".to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;

    #[test]
    fn extracts_bearer_token() {
        let mut headers = HeaderMap::new();
        headers.insert("authorization", HeaderValue::from_static("Bearer abc.def.ghi"));
        assert_eq!(extract_bearer_token(&headers).unwrap(), "abc.def.ghi");
    }

    #[test]
    fn rejects_missing_and_malformed_headers() {
        assert!(extract_bearer_token(&HeaderMap::new()).is_err());

        let mut headers = HeaderMap::new();
        headers.insert("authorization", HeaderValue::from_static("Basic dXNlcg=="));
        assert!(extract_bearer_token(&headers).is_err());

        let mut headers = HeaderMap::new();
        headers.insert("authorization", HeaderValue::from_static("Bearer "));
        assert!(extract_bearer_token(&headers).is_err());
    }
}
