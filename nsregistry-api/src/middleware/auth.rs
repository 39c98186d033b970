///! Authentication middleware
///!
///! Validates bearer JWTs and attaches the caller to the request

use axum::{
    extract::{Request, State},
    http::{header, HeaderMap, StatusCode},
    middleware::Next,
    response::{IntoResponse, Response},
    Json,
};
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use nsregistry_common::auth::{Principal, UserRole};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

use crate::AppState;

/// Authentication error response
#[derive(Debug, Serialize)]
pub struct AuthError {
    pub error: String,
    pub message: String,
}

impl AuthError {
    fn new(error: &str, message: impl Into<String>) -> Self {
        Self {
            error: error.to_string(),
            message: message.into(),
        }
    }
}

impl IntoResponse for AuthError {
    fn into_response(self) -> Response {
        (StatusCode::UNAUTHORIZED, Json(self)).into_response()
    }
}

/// Extracted user information from authentication
#[derive(Clone, Debug)]
pub struct AuthUser {
    pub user_id: i64,
    pub username: String,
    pub role: UserRole,
}

impl AuthUser {
    pub fn principal(&self) -> Principal {
        Principal::new(self.user_id, self.username.clone(), self.role)
    }
}

/// JWT claims structure
#[derive(Debug, Serialize, Deserialize)]
pub struct Claims {
    pub sub: String, // user id
    pub username: String,
    pub role: String,
    pub exp: usize,
    pub iat: usize,
}

impl TryFrom<Claims> for AuthUser {
    type Error = AuthError;

    fn try_from(claims: Claims) -> Result<Self, Self::Error> {
        let user_id = claims
            .sub
            .parse()
            .map_err(|_| AuthError::new("invalid_token", "Token subject is not a user id"))?;

        Ok(AuthUser {
            user_id,
            username: claims.username,
            role: UserRole::parse(&claims.role),
        })
    }
}

/// Authentication middleware
pub async fn auth_middleware(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    mut request: Request,
    next: Next,
) -> Result<Response, AuthError> {
    let token = headers
        .get(header::AUTHORIZATION)
        .and_then(|value| value.to_str().ok())
        .and_then(|value| value.strip_prefix("Bearer "))
        .ok_or_else(|| {
            AuthError::new("unauthorized", "Authentication required. Provide a Bearer token.")
        })?;

    let claims = validate_jwt_token(&state.jwt_secret, token)
        .map_err(|e| AuthError::new("invalid_token", format!("Invalid JWT token: {}", e)))?;
    let auth_user = AuthUser::try_from(claims)?;

    tracing::debug!(user_id = auth_user.user_id, role = %auth_user.role, "Authenticated request");
    request.extensions_mut().insert(auth_user);

    Ok(next.run(request).await)
}

/// Validate JWT token with signature and expiry checks
pub fn validate_jwt_token(secret: &str, token: &str) -> Result<Claims, String> {
    let decoding_key = DecodingKey::from_secret(secret.as_bytes());

    let mut validation = Validation::new(Algorithm::HS256);
    validation.validate_exp = true;

    let token_data = decode::<Claims>(token, &decoding_key, &validation)
        .map_err(|e| format!("JWT validation failed: {}", e))?;

    Ok(token_data.claims)
}

/// Issue an HS256 token for a principal
pub fn create_jwt_token(secret: &str, user: &Principal, ttl_hours: i64) -> Result<String, String> {
    let now = chrono::Utc::now().timestamp();
    let expiration = now + ttl_hours * 3600;

    let claims = Claims {
        sub: user.user_id.to_string(),
        username: user.username.clone(),
        role: user.role.as_str().to_string(),
        exp: expiration as usize,
        iat: now as usize,
    };

    let encoding_key = EncodingKey::from_secret(secret.as_bytes());
    encode(&Header::new(Algorithm::HS256), &claims, &encoding_key)
        .map_err(|e| format!("Failed to generate JWT: {}", e))
}
