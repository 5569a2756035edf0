use axum::{
    extract::State,
    middleware,
    routing::get,
    Json, Router,
};
use encore_core::activity::{UserActivity, MAX_ACTIVITY_LIMIT};
use encore_core::CoreError;
use serde::{Deserialize, Serialize};

use crate::{
    error::AppError,
    extract::AppQuery,
    middleware::auth::admin_auth_middleware,
    state::AppState,
};

const DEFAULT_ACTIVITY_LIMIT: usize = 50;

#[derive(Debug, Deserialize)]
pub struct ActivityQuery {
    pub limit: Option<usize>,
}

#[derive(Debug, Serialize)]
pub struct ShowStats {
    pub show_id: String,
    pub title: String,
    pub bookings: usize,
    pub seats_sold: usize,
    pub revenue: i64,
    pub capacity: usize,
    /// Percentage of the house sold.
    pub utilisation: f64,
    pub reviews: usize,
    pub average_rating: f64,
}

#[derive(Debug, Serialize)]
pub struct StatsResponse {
    pub total_users: u64,
    pub total_bookings: usize,
    pub seats_sold: usize,
    pub total_revenue: i64,
    pub total_reviews: usize,
    pub average_rating: f64,
    pub active_carts: usize,
    pub currency: &'static str,
    pub shows: Vec<ShowStats>,
}

pub fn routes(state: AppState) -> Router<AppState> {
    Router::new()
        .route("/v1/admin/activity", get(recent_activity))
        .route("/v1/admin/stats", get(stats))
        .route_layer(middleware::from_fn_with_state(state, admin_auth_middleware))
}

async fn recent_activity(
    State(state): State<AppState>,
    AppQuery(query): AppQuery<ActivityQuery>,
) -> Result<Json<Vec<UserActivity>>, AppError> {
    let limit = query.limit.unwrap_or(DEFAULT_ACTIVITY_LIMIT).min(MAX_ACTIVITY_LIMIT);
    let entries = state
        .activity
        .list_recent(limit)
        .await
        .map_err(CoreError::from)?;
    Ok(Json(entries))
}

async fn stats(State(state): State<AppState>) -> Result<Json<StatsResponse>, AppError> {
    let total_users = state.users.count_users().await.map_err(CoreError::from)?;
    let bookings = state.booking.all_bookings().await?;
    let ratings = state.reviews.summary(None).await?;
    let shows = state.shows.list_shows(None).await.map_err(CoreError::from)?;
    let capacity = state.booking.generator().layout().capacity();

    let mut per_show = Vec::with_capacity(shows.len());
    for show in shows {
        let show_ratings = state.reviews.summary(Some(&show.id)).await?;
        let sold: Vec<_> = bookings.iter().filter(|b| b.show_id == show.id).collect();
        let seats_sold: usize = sold.iter().map(|b| b.seats.len()).sum();
        per_show.push(ShowStats {
            bookings: sold.len(),
            seats_sold,
            revenue: sold.iter().map(|b| b.total_amount).sum(),
            capacity,
            utilisation: if capacity == 0 {
                0.0
            } else {
                seats_sold as f64 * 100.0 / capacity as f64
            },
            reviews: show_ratings.total,
            average_rating: show_ratings.average,
            show_id: show.id,
            title: show.title,
        });
    }

    Ok(Json(StatsResponse {
        total_users,
        total_bookings: bookings.len(),
        seats_sold: bookings.iter().map(|b| b.seats.len()).sum(),
        total_revenue: bookings.iter().map(|b| b.total_amount).sum(),
        total_reviews: ratings.total,
        average_rating: ratings.average,
        active_carts: state.sessions.active_sessions().await,
        currency: encore_shared::CURRENCY,
        shows: per_show,
    }))
}
