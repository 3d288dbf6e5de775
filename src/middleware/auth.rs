use axum::{
    extract::{Request, State},
    http::{header, HeaderMap, Method},
    middleware::Next,
    response::Response,
};

use crate::auth::{validate_jwt, Claims, SERVICES_READ, SERVICES_WRITE};
use crate::error::ApiError;
use crate::routes::AppState;

/// Authenticated user context extracted from JWT
#[derive(Clone, Debug)]
pub struct AuthUser {
    pub user_id: i64,
    pub activated: bool,
    pub permissions: Vec<String>,
}

impl AuthUser {
    pub fn has_permission(&self, code: &str) -> bool {
        self.permissions.iter().any(|p| p == code)
    }
}

impl From<Claims> for AuthUser {
    fn from(claims: Claims) -> Self {
        Self {
            user_id: claims.sub,
            activated: claims.activated,
            permissions: claims.permissions,
        }
    }
}

/// JWT authentication middleware that validates tokens and extracts user context
pub async fn jwt_auth_middleware(
    State(state): State<AppState>,
    headers: HeaderMap,
    mut request: Request,
    next: Next,
) -> Result<Response, ApiError> {
    let token = extract_jwt_from_headers(&headers).map_err(ApiError::unauthorized)?;

    let claims = validate_jwt(&token, &state.config.security.jwt_secret).map_err(|e| {
        tracing::debug!(error = %e, "rejected bearer token");
        ApiError::unauthorized("invalid or missing authentication token")
    })?;

    let auth_user = AuthUser::from(claims);
    tracing::debug!(user_id = auth_user.user_id, "authenticated request");
    request.extensions_mut().insert(auth_user);

    Ok(next.run(request).await)
}

/// Requires an activated user holding the permission for the request method:
/// reads need `services:read`, everything else `services:write`.
pub async fn require_permission_middleware(request: Request, next: Next) -> Result<Response, ApiError> {
    let user = request
        .extensions()
        .get::<AuthUser>()
        .ok_or_else(|| ApiError::unauthorized("you must be authenticated to access this resource"))?;

    if !user.activated {
        return Err(ApiError::forbidden(
            "your user account must be activated to access this resource",
        ));
    }

    let required = required_permission(request.method());
    if !user.has_permission(required) {
        return Err(ApiError::forbidden(
            "your user account doesn't have the necessary permissions to access this resource",
        ));
    }

    Ok(next.run(request).await)
}

fn required_permission(method: &Method) -> &'static str {
    if method == Method::GET || method == Method::HEAD {
        SERVICES_READ
    } else {
        SERVICES_WRITE
    }
}

/// Extract JWT token from Authorization header
fn extract_jwt_from_headers(headers: &HeaderMap) -> Result<String, String> {
    let auth_header = headers
        .get(header::AUTHORIZATION)
        .ok_or_else(|| "invalid or missing authentication token".to_string())?;

    let auth_str = auth_header
        .to_str()
        .map_err(|_| "Invalid Authorization header format".to_string())?;

    match auth_str.strip_prefix("Bearer ") {
        Some(token) if !token.trim().is_empty() => Ok(token.trim().to_string()),
        Some(_) => Err("Empty JWT token".to_string()),
        None => Err("Authorization header must use Bearer token format".to_string()),
    }
}
