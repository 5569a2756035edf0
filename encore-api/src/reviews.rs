use std::convert::Infallible;

use axum::{
    extract::State,
    http::StatusCode,
    middleware,
    response::sse::{Event, KeepAlive, Sse},
    routing::{get, post},
    Extension, Json, Router,
};
use encore_core::review::{RatingSummary, Review};
use encore_core::CoreError;
use encore_order::ReviewQuery;
use futures_util::{Stream, StreamExt};
use serde::Deserialize;
use tokio_stream::wrappers::BroadcastStream;
use tracing::warn;

use crate::{
    error::AppError,
    extract::{AppJson, AppQuery},
    middleware::auth::{user_auth_middleware, CurrentUser},
    state::AppState,
};

#[derive(Debug, Deserialize)]
pub struct PostReviewRequest {
    pub show_id: String,
    pub rating: u8,
    pub comment: String,
}

#[derive(Debug, Deserialize)]
pub struct SummaryQuery {
    pub show_id: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct StreamQuery {
    pub show_id: Option<String>,
}

pub fn routes(state: AppState) -> Router<AppState> {
    let protected = Router::new()
        .route("/v1/reviews", post(post_review))
        .route_layer(middleware::from_fn_with_state(state, user_auth_middleware));

    Router::new()
        .route("/v1/reviews", get(list_reviews))
        .route("/v1/reviews/summary", get(review_summary))
        .route("/v1/reviews/stream", get(review_stream))
        .merge(protected)
}

async fn list_reviews(
    State(state): State<AppState>,
    AppQuery(query): AppQuery<ReviewQuery>,
) -> Result<Json<Vec<Review>>, AppError> {
    let feed = state.reviews.feed(query).await?;
    Ok(Json(feed.reviews().to_vec()))
}

async fn review_summary(
    State(state): State<AppState>,
    AppQuery(query): AppQuery<SummaryQuery>,
) -> Result<Json<RatingSummary>, AppError> {
    let summary = state.reviews.summary(query.show_id.as_deref()).await?;
    Ok(Json(summary))
}

async fn post_review(
    State(state): State<AppState>,
    Extension(CurrentUser(user)): Extension<CurrentUser>,
    AppJson(req): AppJson<PostReviewRequest>,
) -> Result<(StatusCode, Json<Review>), AppError> {
    if state
        .shows
        .get_show(&req.show_id)
        .await
        .map_err(CoreError::from)?
        .is_none()
    {
        return Err(AppError::NotFoundError(format!("Show {} not found", req.show_id)));
    }

    let review = state
        .reviews
        .submit(&user, &req.show_id, req.rating, &req.comment)
        .await?;
    state.metrics.reviews_posted.inc();

    Ok((StatusCode::CREATED, Json(review)))
}

/// Live feed of newly posted reviews, optionally narrowed to one show.
async fn review_stream(
    State(state): State<AppState>,
    AppQuery(query): AppQuery<StreamQuery>,
) -> Sse<impl Stream<Item = Result<Event, Infallible>>> {
    let rx = state.reviews.subscribe();
    let show_filter = query.show_id;

    let stream = BroadcastStream::new(rx).filter_map(move |result| {
        let show_filter = show_filter.clone();
        async move {
            match result {
                Ok(review) => {
                    if show_filter.as_deref().is_some_and(|id| id != review.show_id) {
                        return None;
                    }
                    match Event::default().event("review_posted").json_data(&review) {
                        Ok(event) => Some(Ok::<_, Infallible>(event)),
                        Err(e) => {
                            warn!("Failed to encode review event: {}", e);
                            None
                        }
                    }
                }
                // Lagged receivers skip what they missed
                Err(_) => None,
            }
        }
    });

    Sse::new(stream).keep_alive(KeepAlive::default())
}
