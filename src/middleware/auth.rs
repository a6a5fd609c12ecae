use crate::{
    error::{AppError, AppResult},
    models::Role,
    utils::jwt::decode_jwt,
};
use axum::{
    extract::{FromRequestParts, Request},
    http::HeaderMap,
    middleware::Next,
    response::Response,
};

/// Caller identity extracted from the bearer token. Token validation is
/// stateless: the role comes from the signed claims, not a session lookup.
#[derive(Debug, Clone)]
pub struct AuthUser {
    pub user_id: i32,
    pub role: Role,
}

/// JWT authentication middleware for every route except login/activate.
pub async fn auth_middleware(
    headers: HeaderMap,
    mut request: Request,
    next: Next,
) -> Result<Response, AppError> {
    let token = extract_bearer_token(&headers).ok_or(AppError::Unauthorized)?;

    let claims = decode_jwt(&token).map_err(|_| AppError::InvalidToken)?;

    let user_id: i32 = claims.sub.parse().map_err(|_| AppError::InvalidToken)?;
    let role = Role::parse(&claims.role).ok_or(AppError::InvalidToken)?;

    request.extensions_mut().insert(AuthUser { user_id, role });

    Ok(next.run(request).await)
}

fn extract_bearer_token(headers: &HeaderMap) -> Option<String> {
    let auth_header = headers
        .get(axum::http::header::AUTHORIZATION)
        .and_then(|h| h.to_str().ok())?;

    let token = auth_header.strip_prefix("Bearer ")?;
    if token.is_empty() {
        None
    } else {
        Some(token.to_string())
    }
}

pub fn require_admin(auth_user: &AuthUser) -> AppResult<i32> {
    if auth_user.role != Role::Admin {
        return Err(AppError::Forbidden("Admin only"));
    }
    Ok(auth_user.user_id)
}

pub fn require_student(auth_user: &AuthUser) -> AppResult<i32> {
    if auth_user.role != Role::Student {
        return Err(AppError::Forbidden("Students only"));
    }
    Ok(auth_user.user_id)
}

impl<S> FromRequestParts<S> for AuthUser
where
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut axum::http::request::Parts,
        _state: &S,
    ) -> Result<Self, Self::Rejection> {
        parts
            .extensions
            .get::<AuthUser>()
            .cloned()
            .ok_or(AppError::Unauthorized)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;

    fn headers_with_auth(value: &str) -> HeaderMap {
        let mut headers = HeaderMap::new();
        headers.insert(
            axum::http::header::AUTHORIZATION,
            HeaderValue::from_str(value).unwrap(),
        );
        headers
    }

    #[test]
    fn bearer_token_extracted() {
        let headers = headers_with_auth("Bearer abc.def.ghi");
        assert_eq!(
            extract_bearer_token(&headers),
            Some("abc.def.ghi".to_string())
        );
    }

    #[test]
    fn missing_header_yields_none() {
        assert_eq!(extract_bearer_token(&HeaderMap::new()), None);
    }

    #[test]
    fn non_bearer_scheme_rejected() {
        let headers = headers_with_auth("Basic dXNlcjpwYXNz");
        assert_eq!(extract_bearer_token(&headers), None);
    }

    #[test]
    fn empty_bearer_rejected() {
        let headers = headers_with_auth("Bearer ");
        assert_eq!(extract_bearer_token(&headers), None);
    }

    #[test]
    fn role_guards() {
        let admin = AuthUser {
            user_id: 1,
            role: Role::Admin,
        };
        let student = AuthUser {
            user_id: 2,
            role: Role::Student,
        };

        assert_eq!(require_admin(&admin).unwrap(), 1);
        assert!(require_admin(&student).is_err());
        assert_eq!(require_student(&student).unwrap(), 2);
        assert!(require_student(&admin).is_err());
    }
}
