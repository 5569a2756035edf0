use axum::{
    extract::State,
    http::StatusCode,
    middleware,
    routing::get,
    Extension, Json, Router,
};
use encore_core::activity::{UserActivity, MAX_ACTIVITY_LIMIT};
use encore_core::booking::Booking;
use encore_core::user::UserProfile;
use encore_core::CoreError;
use serde::Deserialize;

use crate::{
    error::AppError,
    extract::AppQuery,
    middleware::auth::{user_auth_middleware, CurrentUser},
    state::AppState,
};

const DEFAULT_ACTIVITY_LIMIT: usize = 20;

#[derive(Debug, Deserialize)]
pub struct ActivityQuery {
    pub limit: Option<usize>,
}

pub fn routes(state: AppState) -> Router<AppState> {
    Router::new()
        .route("/v1/profile", get(get_profile).delete(delete_account))
        .route("/v1/profile/bookings", get(my_bookings))
        .route("/v1/profile/activity", get(my_activity))
        .route_layer(middleware::from_fn_with_state(state, user_auth_middleware))
}

async fn get_profile(Extension(CurrentUser(user)): Extension<CurrentUser>) -> Json<UserProfile> {
    Json(user)
}

async fn my_bookings(
    State(state): State<AppState>,
    Extension(CurrentUser(user)): Extension<CurrentUser>,
) -> Result<Json<Vec<Booking>>, AppError> {
    let bookings = state.booking.bookings_for_user(user.id).await?;
    Ok(Json(bookings))
}

async fn my_activity(
    State(state): State<AppState>,
    Extension(CurrentUser(user)): Extension<CurrentUser>,
    AppQuery(query): AppQuery<ActivityQuery>,
) -> Result<Json<Vec<UserActivity>>, AppError> {
    let limit = query.limit.unwrap_or(DEFAULT_ACTIVITY_LIMIT).min(MAX_ACTIVITY_LIMIT);
    let entries = state
        .activity
        .list_for_user(user.id, limit)
        .await
        .map_err(CoreError::from)?;
    Ok(Json(entries))
}

/// Soft delete. Existing tokens stop working because the profile turns inactive.
async fn delete_account(
    State(state): State<AppState>,
    Extension(CurrentUser(user)): Extension<CurrentUser>,
) -> Result<StatusCode, AppError> {
    state.identity.delete_account(user.id).await?;
    state.sessions.discard(user.id).await;
    Ok(StatusCode::NO_CONTENT)
}
