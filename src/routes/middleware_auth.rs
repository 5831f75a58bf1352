use axum::{
    extract::{FromRequestParts, Request, State},
    http::request::Parts,
    middleware::Next,
    response::Response,
};
use jsonwebtoken::{decode, Validation};
use uuid::Uuid;

use crate::error::ApiError;
use crate::routes::auth::Claims;
use crate::state::AppState;

/// Extractor for the authenticated user id injected by `require_auth`.
pub struct JwtUser(pub Uuid);

impl<S> FromRequestParts<S> for JwtUser
where
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parts
            .extensions
            .get::<Uuid>()
            .copied()
            .map(JwtUser)
            .ok_or(ApiError::Unauthorized("missing user"))
    }
}

/// Bearer-token gate for every task route. Missing, malformed, unsigned-by-us
/// and expired tokens all fail the same way.
pub async fn require_auth(
    State(state): State<AppState>,
    mut req: Request,
    next: Next,
) -> Result<Response, ApiError> {
    let auth_header = req
        .headers()
        .get("authorization")
        .and_then(|v| v.to_str().ok());

    let token = match auth_header {
        Some(h) if h.starts_with("Bearer ") => &h[7..],
        _ => return Err(ApiError::Unauthorized("No token provided")),
    };

    let token_data = decode::<Claims>(token, &state.jwt.decoding, &Validation::default())
        .map_err(|e| {
            tracing::debug!("jwt decode error: {e}");
            ApiError::Unauthorized("Invalid or expired token")
        })?;

    let user_id = Uuid::parse_str(&token_data.claims.sub)
        .map_err(|_| ApiError::Unauthorized("Invalid or expired token"))?;

    req.extensions_mut().insert(user_id);
    Ok(next.run(req).await)
}
