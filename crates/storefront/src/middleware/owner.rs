//! Cart owner extractors.
//!
//! A request identifies its cart owner with either an
//! `Authorization: Bearer <token>` header, resolved to a user through the
//! configured identity resolver, or an `X-Session-Key` header naming an
//! anonymous session. The bearer token wins when both are present.

use axum::{
    extract::FromRequestParts,
    http::{HeaderMap, header::AUTHORIZATION, request::Parts},
};

use cartwheel_core::{Owner, SessionKey, UserId};

use crate::db::IdentityResolver;
use crate::error::{AppError, set_sentry_user};
use crate::state::AppState;

/// The HTTP header carrying an anonymous session key.
pub const SESSION_KEY_HEADER: &str = "x-session-key";

/// Extractor yielding the cart owner for a request.
///
/// Rejects with 400 when neither header is present or the session key is
/// malformed, and with 401 when a bearer token does not resolve.
///
/// # Example
///
/// ```rust,ignore
/// async fn handler(State(state): State<AppState>, CartOwner(owner): CartOwner) -> Result<Json<Cart>> {
///     Ok(Json(state.engine().get_or_create_cart(&owner).await?))
/// }
/// ```
#[derive(Debug, Clone)]
pub struct CartOwner(pub Owner);

impl FromRequestParts<AppState> for CartOwner {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        if let Some(token) = bearer_token(&parts.headers)? {
            let user_id = resolve_user(state, token).await?;
            return Ok(Self(Owner::User(user_id)));
        }

        session_key(&parts.headers)?
            .map(|key| Self(Owner::Session(key)))
            .ok_or_else(|| {
                AppError::BadRequest(
                    "an Authorization bearer token or X-Session-Key header is required"
                        .to_string(),
                )
            })
    }
}

/// Extractor for the login merge: needs both an authenticated user and the
/// session whose cart is being folded in.
#[derive(Debug, Clone)]
pub struct MergeIdentity {
    pub user_id: UserId,
    pub session_key: SessionKey,
}

impl FromRequestParts<AppState> for MergeIdentity {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let token = bearer_token(&parts.headers)?
            .ok_or_else(|| AppError::Unauthorized("a bearer token is required".to_string()))?;
        let session_key = session_key(&parts.headers)?
            .ok_or_else(|| AppError::BadRequest("X-Session-Key header is required".to_string()))?;

        let user_id = resolve_user(state, token).await?;

        Ok(Self {
            user_id,
            session_key,
        })
    }
}

async fn resolve_user(state: &AppState, token: &str) -> Result<UserId, AppError> {
    let user_id = state
        .identity()
        .resolve_bearer(token)
        .await?
        .ok_or_else(|| AppError::Unauthorized("invalid or expired token".to_string()))?;

    tracing::Span::current().record("user_id", user_id.as_i32());
    set_sentry_user(&user_id);
    Ok(user_id)
}

/// Extract the token from an `Authorization: Bearer` header.
fn bearer_token(headers: &HeaderMap) -> Result<Option<&str>, AppError> {
    let Some(value) = headers.get(AUTHORIZATION) else {
        return Ok(None);
    };

    let value = value
        .to_str()
        .map_err(|_| AppError::BadRequest("malformed Authorization header".to_string()))?;

    let token = value
        .strip_prefix("Bearer ")
        .or_else(|| value.strip_prefix("bearer "))
        .map(str::trim)
        .filter(|t| !t.is_empty())
        .ok_or_else(|| AppError::Unauthorized("expected a bearer token".to_string()))?;

    Ok(Some(token))
}

/// Extract and validate the `X-Session-Key` header.
fn session_key(headers: &HeaderMap) -> Result<Option<SessionKey>, AppError> {
    let Some(value) = headers.get(SESSION_KEY_HEADER) else {
        return Ok(None);
    };

    let raw = value
        .to_str()
        .map_err(|_| AppError::BadRequest("malformed X-Session-Key header".to_string()))?;

    SessionKey::parse(raw)
        .map(Some)
        .map_err(|e| AppError::BadRequest(format!("invalid session key: {e}")))
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use axum::http::HeaderValue;

    use super::*;

    fn headers(pairs: &[(&'static str, &'static str)]) -> HeaderMap {
        let mut map = HeaderMap::new();
        for (k, v) in pairs {
            map.insert(*k, HeaderValue::from_static(v));
        }
        map
    }

    #[test]
    fn test_bearer_token_absent() {
        assert_eq!(bearer_token(&HeaderMap::new()).unwrap(), None);
    }

    #[test]
    fn test_bearer_token_present() {
        let map = headers(&[("authorization", "Bearer abc123")]);
        assert_eq!(bearer_token(&map).unwrap(), Some("abc123"));
    }

    #[test]
    fn test_bearer_token_wrong_scheme() {
        let map = headers(&[("authorization", "Basic dXNlcjpwYXNz")]);
        assert!(matches!(bearer_token(&map), Err(AppError::Unauthorized(_))));
    }

    #[test]
    fn test_session_key_valid() {
        let map = headers(&[("x-session-key", "guest-42")]);
        assert_eq!(session_key(&map).unwrap().unwrap().as_str(), "guest-42");
    }

    #[test]
    fn test_session_key_invalid() {
        let map = headers(&[("x-session-key", "has space")]);
        assert!(matches!(session_key(&map), Err(AppError::BadRequest(_))));
    }
}
