use axum::{
    extract::{Request, State},
    http::{header, HeaderMap},
    middleware::Next,
    response::Response,
};

use crate::error::AppError;
use crate::models::user::ROLE_ADMIN;
use crate::AppState;

/// Identity resolved by the authentication middleware and attached to the
/// request for downstream handlers.
#[derive(Debug, Clone)]
pub struct CurrentUser {
    pub id: String,
    pub email: String,
    pub role: String,
    pub name: String,
}

fn bearer_token(headers: &HeaderMap) -> Result<&str, AppError> {
    let header = headers
        .get(header::AUTHORIZATION)
        .and_then(|value| value.to_str().ok())
        .ok_or(AppError::Unauthenticated("No authorization header provided"))?;

    // Exactly two space-separated parts, scheme must be Bearer
    let mut parts = header.split(' ');
    match (parts.next(), parts.next(), parts.next()) {
        (Some("Bearer"), Some(token), None) if !token.is_empty() => Ok(token),
        _ => Err(AppError::Unauthenticated(
            "Invalid authorization header format",
        )),
    }
}

/// Authentication middleware. Validates the bearer token, then re-resolves
/// the user by the token's subject so role and name are current rather than
/// whatever the claims said at issue time.
pub async fn require_auth(
    State(state): State<AppState>,
    mut request: Request,
    next: Next,
) -> Result<Response, AppError> {
    let token = bearer_token(request.headers())?;
    let claims = state.auth.validate_token(token)?;

    let user = state
        .auth
        .user_by_id(&claims.sub)
        .await?
        .ok_or(AppError::Unauthenticated("User not found"))?;

    request.extensions_mut().insert(CurrentUser {
        id: user.id,
        email: user.email,
        role: user.role,
        name: user.name,
    });

    Ok(next.run(request).await)
}

/// Authorization middleware. Must be layered inside `require_auth`; an absent
/// identity means the chain was composed wrong or authentication was skipped.
pub async fn require_admin(request: Request, next: Next) -> Result<Response, AppError> {
    match request.extensions().get::<CurrentUser>() {
        None => Err(AppError::Unauthenticated("User not authenticated")),
        Some(user) if user.role != ROLE_ADMIN => Err(AppError::Forbidden),
        Some(_) => Ok(next.run(request).await),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;

    fn headers_with(value: &str) -> HeaderMap {
        let mut headers = HeaderMap::new();
        headers.insert(header::AUTHORIZATION, HeaderValue::from_str(value).unwrap());
        headers
    }

    #[test]
    fn accepts_well_formed_bearer_header() {
        let headers = headers_with("Bearer abc.def.ghi");
        assert_eq!(bearer_token(&headers).unwrap(), "abc.def.ghi");
    }

    #[test]
    fn rejects_missing_header() {
        let headers = HeaderMap::new();
        assert!(matches!(
            bearer_token(&headers),
            Err(AppError::Unauthenticated("No authorization header provided"))
        ));
    }

    #[test]
    fn rejects_wrong_scheme() {
        let headers = headers_with("Basic abc");
        assert!(matches!(
            bearer_token(&headers),
            Err(AppError::Unauthenticated(_))
        ));
    }

    #[test]
    fn rejects_wrong_part_count() {
        for value in ["Bearer", "Bearer a b", "Bearer "] {
            let headers = headers_with(value);
            assert!(
                matches!(bearer_token(&headers), Err(AppError::Unauthenticated(_))),
                "accepted {:?}",
                value
            );
        }
    }
}
