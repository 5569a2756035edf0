use std::collections::HashSet;
use std::sync::Arc;

use chrono::Utc;
use encore_catalog::{Seat, SeatMapGenerator, Show};
use encore_core::activity::{ActivityLogger, ActivityType};
use encore_core::booking::Booking;
use encore_core::events::EventPublisher;
use encore_core::repository::{BookingRepository, SeatLedger};
use encore_shared::models::{topics, BookingConfirmedEvent};
use tracing::{info, warn};
use uuid::Uuid;

use crate::cart::Cart;

#[derive(Debug, thiserror::Error)]
pub enum BookingError {
    #[error("No seats selected")]
    EmptySelection,

    #[error("Cart holds seats for show {cart}, not {requested}")]
    ShowMismatch {
        cart: String,
        requested: String,
    },

    #[error("Seats already booked: {}", .0.join(", "))]
    SeatsUnavailable(Vec<String>),

    #[error("Booking could not be saved: {0}")]
    Persistence(String),
}

/// Opens seat maps and turns carts into confirmed bookings.
pub struct BookingService {
    bookings: Arc<dyn BookingRepository>,
    ledger: Arc<dyn SeatLedger>,
    activity: ActivityLogger,
    events: Arc<dyn EventPublisher>,
    generator: SeatMapGenerator,
}

impl BookingService {
    pub fn new(
        bookings: Arc<dyn BookingRepository>,
        ledger: Arc<dyn SeatLedger>,
        activity: ActivityLogger,
        events: Arc<dyn EventPublisher>,
        generator: SeatMapGenerator,
    ) -> Self {
        Self {
            bookings,
            ledger,
            activity,
            events,
            generator,
        }
    }

    pub fn generator(&self) -> &SeatMapGenerator {
        &self.generator
    }

    /// Seats already sold for the show. A ledger outage degrades to "none".
    pub async fn booked_seats(&self, show_id: &str) -> HashSet<String> {
        match self.ledger.booked_seats(show_id).await {
            Ok(booked) => booked,
            Err(e) => {
                warn!("Seat ledger unavailable for show {}: {}", show_id, e);
                HashSet::new()
            }
        }
    }

    /// Fresh seat map for `show`, loaded into `cart` (selection reset).
    pub async fn open_seat_map(&self, show: &Show, cart: &mut Cart) -> usize {
        let booked = self.booked_seats(&show.id).await;
        let seats: Vec<Seat> = {
            let mut rng = rand::thread_rng();
            self.generator.generate(show, &booked, &mut rng)
        };
        let available = seats.iter().filter(|s| s.is_available).count();
        cart.initialize_seats(&show.id, seats);
        available
    }

    pub async fn confirm(&self, show: &Show, user_id: Uuid, cart: &mut Cart) -> Result<Booking, BookingError> {
        if !cart.has_seat_selection() {
            return Err(BookingError::EmptySelection);
        }
        if let Some(cart_show) = cart.show_id() {
            if cart_show != show.id {
                return Err(BookingError::ShowMismatch {
                    cart: cart_show.to_string(),
                    requested: show.id.clone(),
                });
            }
        }

        let seat_ids = cart.selected_seat_ids().to_vec();

        // 1. Claim the seats so no other session can sell them
        let taken = self
            .ledger
            .claim_seats(&show.id, &seat_ids, user_id)
            .await
            .map_err(|e| BookingError::Persistence(e.to_string()))?;
        if !taken.is_empty() {
            info!("Seats {:?} for show {} were sold to another session", taken, show.id);
            cart.mark_unavailable(&taken);
            return Err(BookingError::SeatsUnavailable(taken));
        }

        // 2. Persist the booking
        let booking = Booking::confirmed(show.id.clone(), user_id, cart.booked_seats(), cart.booked_items());
        if let Err(e) = self.bookings.create_booking(&booking).await {
            warn!("Failed to persist booking for user {}: {}", user_id, e);
            if let Err(release_err) = self.ledger.release_seats(&show.id, &seat_ids).await {
                warn!("Failed to release seats {:?}: {}", seat_ids, release_err);
            }
            return Err(BookingError::Persistence(e.to_string()));
        }

        // 3. Local state
        cart.mark_unavailable(&seat_ids);
        cart.clear();

        // 4. Audit trail
        self.activity
            .log(
                user_id,
                ActivityType::Booking,
                format!("Booked {} seat(s) for {}", seat_ids.len(), show.title),
                Some(serde_json::json!({
                    "booking_id": booking.id,
                    "show_id": show.id,
                    "seats": seat_ids,
                    "total_amount": booking.total_amount,
                })),
            )
            .await;

        // 5. Event
        let event = BookingConfirmedEvent {
            booking_id: booking.id,
            show_id: show.id.clone(),
            user_id,
            seat_ids: booking.seat_ids(),
            total_amount: booking.total_amount,
            timestamp: Utc::now().timestamp(),
        };
        match serde_json::to_string(&event) {
            Ok(payload) => {
                let _ = self
                    .events
                    .publish(topics::BOOKING_CONFIRMED, &booking.id.to_string(), &payload)
                    .await;
            }
            Err(e) => warn!("Failed to encode booking event: {}", e),
        }

        info!("Booking confirmed: {} ({} UGX)", booking.id, booking.total_amount);
        Ok(booking)
    }

    pub async fn bookings_for_user(&self, user_id: Uuid) -> Result<Vec<Booking>, BookingError> {
        self.bookings
            .list_for_user(user_id)
            .await
            .map_err(|e| BookingError::Persistence(e.to_string()))
    }

    pub async fn all_bookings(&self) -> Result<Vec<Booking>, BookingError> {
        self.bookings
            .list_bookings()
            .await
            .map_err(|e| BookingError::Persistence(e.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use encore_catalog::{ConcessionMenu, SeatLayout, ShowCatalog};
    use encore_core::activity::UserActivity;
    use encore_core::events::LogPublisher;
    use encore_core::repository::{ActivityRepository, RepoError};
    use std::collections::HashMap;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use tokio::sync::Mutex;

    #[derive(Default)]
    struct FakeBookings {
        saved: Mutex<Vec<Booking>>,
        calls: AtomicUsize,
        fail: bool,
    }

    #[async_trait]
    impl BookingRepository for FakeBookings {
        async fn create_booking(&self, booking: &Booking) -> Result<(), RepoError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            if self.fail {
                return Err("database unavailable".into());
            }
            self.saved.lock().await.push(booking.clone());
            Ok(())
        }

        async fn list_for_user(&self, user_id: Uuid) -> Result<Vec<Booking>, RepoError> {
            Ok(self.saved.lock().await.iter().filter(|b| b.user_id == user_id).cloned().collect())
        }

        async fn list_bookings(&self) -> Result<Vec<Booking>, RepoError> {
            Ok(self.saved.lock().await.clone())
        }
    }

    #[derive(Default)]
    struct FakeLedger {
        sold: Mutex<HashMap<String, HashSet<String>>>,
    }

    #[async_trait]
    impl SeatLedger for FakeLedger {
        async fn claim_seats(&self, show_id: &str, seat_ids: &[String], _holder: Uuid) -> Result<Vec<String>, RepoError> {
            let mut sold = self.sold.lock().await;
            let entry = sold.entry(show_id.to_string()).or_default();
            let taken: Vec<String> = seat_ids.iter().filter(|s| entry.contains(*s)).cloned().collect();
            if taken.is_empty() {
                entry.extend(seat_ids.iter().cloned());
            }
            Ok(taken)
        }

        async fn release_seats(&self, show_id: &str, seat_ids: &[String]) -> Result<(), RepoError> {
            if let Some(entry) = self.sold.lock().await.get_mut(show_id) {
                for id in seat_ids {
                    entry.remove(id);
                }
            }
            Ok(())
        }

        async fn booked_seats(&self, show_id: &str) -> Result<HashSet<String>, RepoError> {
            Ok(self.sold.lock().await.get(show_id).cloned().unwrap_or_default())
        }
    }

    #[derive(Default)]
    struct FakeActivity {
        entries: Mutex<Vec<UserActivity>>,
    }

    #[async_trait]
    impl ActivityRepository for FakeActivity {
        async fn record_activity(&self, activity: &UserActivity) -> Result<(), RepoError> {
            self.entries.lock().await.push(activity.clone());
            Ok(())
        }

        async fn list_for_user(&self, user_id: Uuid, _limit: usize) -> Result<Vec<UserActivity>, RepoError> {
            Ok(self.entries.lock().await.iter().filter(|a| a.user_id == user_id).cloned().collect())
        }

        async fn list_recent(&self, _limit: usize) -> Result<Vec<UserActivity>, RepoError> {
            Ok(self.entries.lock().await.clone())
        }
    }

    struct Fixture {
        service: BookingService,
        bookings: Arc<FakeBookings>,
        ledger: Arc<FakeLedger>,
        activity: Arc<FakeActivity>,
        show: Show,
    }

    fn fixture(bookings: FakeBookings) -> Fixture {
        let bookings = Arc::new(bookings);
        let ledger = Arc::new(FakeLedger::default());
        let activity = Arc::new(FakeActivity::default());
        let generator = SeatMapGenerator::new(SeatLayout::standard(), 1.0).unwrap();
        let service = BookingService::new(
            bookings.clone(),
            ledger.clone(),
            ActivityLogger::new(activity.clone()),
            Arc::new(LogPublisher),
            generator,
        );
        let show = ShowCatalog::with_defaults().get("2").unwrap().clone();
        Fixture { service, bookings, ledger, activity, show }
    }

    #[tokio::test]
    async fn test_empty_selection_fails_without_persistence() {
        let fx = fixture(FakeBookings::default());
        let mut cart = Cart::new();
        fx.service.open_seat_map(&fx.show, &mut cart).await;

        let result = fx.service.confirm(&fx.show, Uuid::new_v4(), &mut cart).await;
        assert!(matches!(result, Err(BookingError::EmptySelection)));
        assert_eq!(fx.bookings.calls.load(Ordering::SeqCst), 0);
        assert!(fx.activity.entries.lock().await.is_empty());
    }

    #[tokio::test]
    async fn test_confirm_clears_cart_and_logs_once() {
        let fx = fixture(FakeBookings::default());
        let user = Uuid::new_v4();
        let mut cart = Cart::new();
        assert_eq!(fx.service.open_seat_map(&fx.show, &mut cart).await, 126);

        cart.select_seat("F1");
        cart.select_seat("A1");
        cart.set_item_quantity(ConcessionMenu::with_defaults().get("popcorn").unwrap(), 2);

        let booking = fx.service.confirm(&fx.show, user, &mut cart).await.unwrap();
        assert_eq!(booking.seats_total, 55_000);
        assert_eq!(booking.items_total, 16_000);
        assert_eq!(booking.total_amount, 71_000);

        assert!(!cart.has_seat_selection());
        assert!(cart.items().is_empty());
        assert!(!cart.seat("F1").unwrap().is_available);
        assert!(!cart.seat("A1").unwrap().is_available);

        let entries = fx.activity.entries.lock().await;
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].activity_type, ActivityType::Booking);
        assert_eq!(entries[0].metadata["total_amount"], 71_000);

        assert_eq!(fx.bookings.saved.lock().await.len(), 1);
        assert!(fx.ledger.booked_seats("2").await.unwrap().contains("A1"));
    }

    #[tokio::test]
    async fn test_seat_sold_in_other_session_is_rejected() {
        let fx = fixture(FakeBookings::default());
        let mut first = Cart::new();
        let mut second = Cart::new();
        fx.service.open_seat_map(&fx.show, &mut first).await;
        fx.service.open_seat_map(&fx.show, &mut second).await;

        first.select_seat("C5");
        second.select_seat("C5");
        second.select_seat("C6");

        fx.service.confirm(&fx.show, Uuid::new_v4(), &mut first).await.unwrap();
        let err = fx.service.confirm(&fx.show, Uuid::new_v4(), &mut second).await.unwrap_err();
        match err {
            BookingError::SeatsUnavailable(ids) => assert_eq!(ids, vec!["C5".to_string()]),
            other => panic!("unexpected error: {:?}", other),
        }
        assert_eq!(second.selected_seat_ids(), &["C6".to_string()]);
        assert!(!second.seat("C5").unwrap().is_available);
        assert_eq!(fx.bookings.saved.lock().await.len(), 1);

        let mut reopened = Cart::new();
        fx.service.open_seat_map(&fx.show, &mut reopened).await;
        assert!(!reopened.seat("C5").unwrap().is_available);
    }

    #[tokio::test]
    async fn test_persistence_failure_releases_claim() {
        let fx = fixture(FakeBookings { fail: true, ..Default::default() });
        let mut cart = Cart::new();
        fx.service.open_seat_map(&fx.show, &mut cart).await;
        cart.select_seat("D2");

        let err = fx.service.confirm(&fx.show, Uuid::new_v4(), &mut cart).await.unwrap_err();
        assert!(matches!(err, BookingError::Persistence(_)));
        assert!(cart.has_seat_selection(), "cart is left untouched");
        assert!(fx.ledger.booked_seats("2").await.unwrap().is_empty());
        assert!(fx.activity.entries.lock().await.is_empty());
    }

    #[tokio::test]
    async fn test_show_mismatch() {
        let fx = fixture(FakeBookings::default());
        let mut cart = Cart::new();
        fx.service.open_seat_map(&fx.show, &mut cart).await;
        cart.select_seat("A2");

        let other = ShowCatalog::with_defaults().get("1").unwrap().clone();
        let err = fx.service.confirm(&other, Uuid::new_v4(), &mut cart).await.unwrap_err();
        assert!(matches!(err, BookingError::ShowMismatch { .. }));
    }
}
