use axum::{
    extract::State,
    http::StatusCode,
    middleware,
    routing::{get, post, put},
    Extension, Json, Router,
};
use encore_core::booking::Booking;
use encore_core::CoreError;
use encore_order::{BookingError, CartSummary};
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::{
    error::AppError,
    extract::{AppJson, AppPath},
    middleware::auth::{user_auth_middleware, CurrentUser},
    state::AppState,
};

#[derive(Debug, Serialize)]
pub struct SeatMapResponse {
    pub show_id: String,
    pub available: usize,
    pub cart: CartSummary,
}

#[derive(Debug, Serialize)]
pub struct CartUpdateResponse {
    /// False when the request left the cart untouched (unknown or unavailable seat).
    pub changed: bool,
    pub cart: CartSummary,
}

#[derive(Debug, Deserialize)]
pub struct ItemQuantityRequest {
    pub quantity: u32,
}

pub fn routes(state: AppState) -> Router<AppState> {
    Router::new()
        .route("/v1/booking/{show_id}/seats", post(open_seat_map))
        .route("/v1/booking/cart", get(get_cart))
        .route(
            "/v1/booking/cart/seats/{seat_id}",
            post(select_seat).delete(deselect_seat),
        )
        .route(
            "/v1/booking/cart/items/{item_id}",
            put(set_item_quantity).delete(remove_item),
        )
        .route("/v1/booking/confirm", post(confirm_booking))
        .route_layer(middleware::from_fn_with_state(state, user_auth_middleware))
}

/// Loads a fresh seat map into the user's cart. Unknown shows yield an empty map.
async fn open_seat_map(
    State(state): State<AppState>,
    Extension(CurrentUser(user)): Extension<CurrentUser>,
    AppPath(show_id): AppPath<String>,
) -> Result<Json<SeatMapResponse>, AppError> {
    let show = state.shows.get_show(&show_id).await.map_err(CoreError::from)?;

    let cart = state.sessions.cart(user.id).await;
    let mut cart = cart.lock().await;

    let available = match show {
        Some(show) => state.booking.open_seat_map(&show, &mut cart).await,
        None => {
            cart.initialize_seats(&show_id, Vec::new());
            0
        }
    };
    info!("User {} opened seat map for show {} ({} available)", user.id, show_id, available);

    Ok(Json(SeatMapResponse {
        show_id,
        available,
        cart: cart.summary(),
    }))
}

async fn get_cart(
    State(state): State<AppState>,
    Extension(CurrentUser(user)): Extension<CurrentUser>,
) -> Json<CartSummary> {
    Json(state.sessions.summary(user.id).await)
}

async fn select_seat(
    State(state): State<AppState>,
    Extension(CurrentUser(user)): Extension<CurrentUser>,
    AppPath(seat_id): AppPath<String>,
) -> Json<CartUpdateResponse> {
    let (changed, cart) = state
        .sessions
        .update(user.id, |cart| (cart.select_seat(&seat_id), cart.summary()))
        .await;
    Json(CartUpdateResponse { changed, cart })
}

async fn deselect_seat(
    State(state): State<AppState>,
    Extension(CurrentUser(user)): Extension<CurrentUser>,
    AppPath(seat_id): AppPath<String>,
) -> Json<CartUpdateResponse> {
    let (changed, cart) = state
        .sessions
        .update(user.id, |cart| (cart.deselect_seat(&seat_id), cart.summary()))
        .await;
    Json(CartUpdateResponse { changed, cart })
}

async fn set_item_quantity(
    State(state): State<AppState>,
    Extension(CurrentUser(user)): Extension<CurrentUser>,
    AppPath(item_id): AppPath<String>,
    AppJson(req): AppJson<ItemQuantityRequest>,
) -> Result<Json<CartSummary>, AppError> {
    let item = state
        .concessions
        .get(&item_id)
        .cloned()
        .ok_or_else(|| AppError::NotFoundError(format!("Concession item {} not found", item_id)))?;

    let cart = state
        .sessions
        .update(user.id, |cart| {
            cart.set_item_quantity(&item, req.quantity);
            cart.summary()
        })
        .await;
    Ok(Json(cart))
}

async fn remove_item(
    State(state): State<AppState>,
    Extension(CurrentUser(user)): Extension<CurrentUser>,
    AppPath(item_id): AppPath<String>,
) -> Json<CartUpdateResponse> {
    let (changed, cart) = state
        .sessions
        .update(user.id, |cart| (cart.remove_item(&item_id), cart.summary()))
        .await;
    Json(CartUpdateResponse { changed, cart })
}

async fn confirm_booking(
    State(state): State<AppState>,
    Extension(CurrentUser(user)): Extension<CurrentUser>,
) -> Result<(StatusCode, Json<Booking>), AppError> {
    let cart = state.sessions.cart(user.id).await;
    let mut cart = cart.lock().await;

    let show_id = cart
        .show_id()
        .map(str::to_string)
        .ok_or(BookingError::EmptySelection)?;
    let show = state
        .shows
        .get_show(&show_id)
        .await
        .map_err(CoreError::from)?
        .ok_or_else(|| AppError::NotFoundError(format!("Show {} not found", show_id)))?;

    let booking = match state.booking.confirm(&show, user.id, &mut cart).await {
        Ok(booking) => booking,
        Err(e) => {
            if matches!(e, BookingError::SeatsUnavailable(_)) {
                state.metrics.booking_conflicts.inc();
            }
            return Err(e.into());
        }
    };

    state.metrics.bookings_confirmed.inc();
    state.metrics.seats_sold.inc_by(booking.seats.len() as u64);
    state.metrics.booking_revenue.inc_by(u64::try_from(booking.total_amount).unwrap_or(0));

    Ok((StatusCode::CREATED, Json(booking)))
}
