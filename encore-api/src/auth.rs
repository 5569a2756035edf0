use axum::{
    extract::State,
    http::StatusCode,
    middleware,
    routing::{get, post},
    Extension, Json, Router,
};
use encore_core::user::UserProfile;
use encore_core::CoreError;
use encore_shared::pii::Masked;
use serde::{Deserialize, Serialize};

use crate::{
    error::AppError,
    extract::AppJson,
    middleware::auth::{issue_token, user_auth_middleware, CurrentUser},
    state::AppState,
};

#[derive(Debug, Deserialize)]
pub struct RegisterRequest {
    pub name: String,
    pub email: Masked<String>,
    pub password: Masked<String>,
}

#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub email: Masked<String>,
    pub password: Masked<String>,
}

#[derive(Debug, Serialize)]
pub struct AuthResponse {
    pub token: String,
    pub user: UserProfile,
}

#[derive(Debug, Serialize)]
pub struct SessionResponse {
    pub user: UserProfile,
}

pub fn routes(state: AppState) -> Router<AppState> {
    let protected = Router::new()
        .route("/v1/auth/logout", post(logout))
        .route("/v1/auth/session", get(session))
        .route_layer(middleware::from_fn_with_state(state, user_auth_middleware));

    Router::new()
        .route("/v1/auth/register", post(register))
        .route("/v1/auth/login", post(login))
        .merge(protected)
}

async fn register(
    State(state): State<AppState>,
    AppJson(req): AppJson<RegisterRequest>,
) -> Result<(StatusCode, Json<AuthResponse>), AppError> {
    let user = state.identity.sign_up(&req.name, req.email.expose(), req.password.expose()).await?;
    state.metrics.registrations.inc();

    let token = issue_token(&user, &state.auth)
        .map_err(|e| AppError::InternalServerError(format!("Token encoding failed: {}", e)))?;

    Ok((StatusCode::CREATED, Json(AuthResponse { token, user })))
}

async fn login(
    State(state): State<AppState>,
    AppJson(req): AppJson<LoginRequest>,
) -> Result<Json<AuthResponse>, AppError> {
    let user = match state.identity.sign_in(req.email.expose(), req.password.expose()).await {
        Ok(user) => user,
        Err(e) => {
            if matches!(e, CoreError::IdentityError(_)) {
                state.metrics.logins.with_label_values(&["rejected"]).inc();
            }
            return Err(e.into());
        }
    };
    state.metrics.logins.with_label_values(&["success"]).inc();

    let token = issue_token(&user, &state.auth)
        .map_err(|e| AppError::InternalServerError(format!("Token encoding failed: {}", e)))?;

    Ok(Json(AuthResponse { token, user }))
}

/// Tokens are stateless; signing out records the event and drops the cart.
async fn logout(
    State(state): State<AppState>,
    Extension(CurrentUser(user)): Extension<CurrentUser>,
) -> StatusCode {
    state.identity.sign_out(user.id).await;
    state.sessions.discard(user.id).await;
    StatusCode::NO_CONTENT
}

async fn session(Extension(CurrentUser(user)): Extension<CurrentUser>) -> Json<SessionResponse> {
    Json(SessionResponse { user })
}
