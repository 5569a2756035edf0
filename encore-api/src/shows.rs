use axum::{
    extract::State,
    routing::get,
    Json, Router,
};
use encore_catalog::{Artist, ConcessionItem, Show};
use encore_core::CoreError;
use serde::Deserialize;

use crate::{
    error::AppError,
    extract::{AppPath, AppQuery},
    state::AppState,
};

#[derive(Debug, Deserialize)]
pub struct ShowQuery {
    pub genre: Option<String>,
}

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/v1/shows", get(list_shows))
        .route("/v1/shows/{show_id}", get(get_show))
        .route("/v1/concessions", get(list_concessions))
        .route("/v1/artists", get(list_artists))
        .route("/v1/artists/{artist_id}", get(get_artist))
}

async fn list_shows(
    State(state): State<AppState>,
    AppQuery(query): AppQuery<ShowQuery>,
) -> Result<Json<Vec<Show>>, AppError> {
    let shows = state.shows.list_shows(query.genre.as_deref())
        .await
        .map_err(CoreError::from)?;
    Ok(Json(shows))
}

async fn get_show(
    State(state): State<AppState>,
    AppPath(show_id): AppPath<String>,
) -> Result<Json<Show>, AppError> {
    state
        .shows
        .get_show(&show_id)
        .await
        .map_err(CoreError::from)?
        .map(Json)
        .ok_or_else(|| AppError::NotFoundError(format!("Show {} not found", show_id)))
}

async fn list_concessions(State(state): State<AppState>) -> Json<Vec<ConcessionItem>> {
    Json(state.concessions.list().to_vec())
}

async fn list_artists(State(state): State<AppState>) -> Json<Vec<Artist>> {
    Json(state.artists.list().to_vec())
}

async fn get_artist(
    State(state): State<AppState>,
    AppPath(artist_id): AppPath<String>,
) -> Result<Json<Artist>, AppError> {
    state
        .artists
        .get(&artist_id)
        .cloned()
        .map(Json)
        .ok_or_else(|| AppError::NotFoundError(format!("Artist {} not found", artist_id)))
}
