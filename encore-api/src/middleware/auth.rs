use axum::{
    extract::{Request, State},
    http::HeaderMap,
    middleware::Next,
    response::Response,
};
use axum_extra::headers::{authorization::Bearer, Authorization, HeaderMapExt};
use chrono::{Duration, Utc};
use encore_core::user::UserProfile;
use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::AppError;
use crate::state::{AppState, AuthConfig};

// ============================================================================
// JWT Claims
// ============================================================================

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct Claims {
    pub sub: String,
    pub email: String,
    pub role: String,
    pub exp: usize,
}

impl Claims {
    pub fn for_user(user: &UserProfile, expiration_seconds: u64) -> Self {
        Self {
            sub: user.id.to_string(),
            email: user.email.clone(),
            role: user.role.to_string(),
            exp: (Utc::now() + Duration::seconds(expiration_seconds as i64)).timestamp() as usize,
        }
    }

    pub fn user_id(&self) -> Option<Uuid> {
        Uuid::parse_str(&self.sub).ok()
    }
}

pub fn issue_token(user: &UserProfile, auth: &AuthConfig) -> Result<String, jsonwebtoken::errors::Error> {
    let claims = Claims::for_user(user, auth.expiration);
    encode(&Header::default(), &claims, &EncodingKey::from_secret(auth.secret.as_bytes()))
}

/// Profile behind the bearer token, loaded fresh for every request.
#[derive(Debug, Clone)]
pub struct CurrentUser(pub UserProfile);

fn unauthenticated() -> AppError {
    AppError::AuthenticationError("Missing or invalid token".to_string())
}

async fn authenticate(state: &AppState, headers: &HeaderMap) -> Result<(Claims, UserProfile), AppError> {
    // 1. Extract token from Authorization header
    let bearer = headers
        .typed_get::<Authorization<Bearer>>()
        .ok_or_else(unauthenticated)?;

    // 2. Decode and validate JWT
    let token_data = decode::<Claims>(
        bearer.token(),
        &DecodingKey::from_secret(state.auth.secret.as_bytes()),
        &Validation::default(),
    )
    .map_err(|_| unauthenticated())?;

    // 3. The account must still exist and be active
    let user_id = token_data.claims.user_id().ok_or_else(unauthenticated)?;
    let profile = state
        .identity
        .current_user(user_id)
        .await?
        .ok_or_else(unauthenticated)?;

    Ok((token_data.claims, profile))
}

// ============================================================================
// User Authentication Middleware
// ============================================================================

pub async fn user_auth_middleware(
    State(state): State<AppState>,
    mut req: Request,
    next: Next,
) -> Result<Response, AppError> {
    let (claims, profile) = authenticate(&state, req.headers()).await?;

    req.extensions_mut().insert(claims);
    req.extensions_mut().insert(CurrentUser(profile));

    Ok(next.run(req).await)
}

// ============================================================================
// Admin Authentication Middleware
// ============================================================================

pub async fn admin_auth_middleware(
    State(state): State<AppState>,
    mut req: Request,
    next: Next,
) -> Result<Response, AppError> {
    let (claims, profile) = authenticate(&state, req.headers()).await?;

    // Role comes from the stored profile, not the token
    if !profile.is_admin() {
        return Err(AppError::AuthorizationError("Admin access required".to_string()));
    }

    req.extensions_mut().insert(claims);
    req.extensions_mut().insert(CurrentUser(profile));

    Ok(next.run(req).await)
}

#[cfg(test)]
mod tests {
    use super::*;
    use encore_core::user::Role;

    #[test]
    fn test_issued_token_decodes() {
        let auth = AuthConfig {
            secret: "test-secret".to_string(),
            expiration: 60,
        };
        let user = UserProfile::new("Ann".into(), "ann@example.com".into(), Role::Admin);

        let token = issue_token(&user, &auth).unwrap();
        let decoded = decode::<Claims>(
            &token,
            &DecodingKey::from_secret(b"test-secret"),
            &Validation::default(),
        )
        .unwrap();

        assert_eq!(decoded.claims.user_id(), Some(user.id));
        assert_eq!(decoded.claims.role, "admin");

        let wrong = decode::<Claims>(&token, &DecodingKey::from_secret(b"other"), &Validation::default());
        assert!(wrong.is_err());
    }
}
