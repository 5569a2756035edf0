use std::collections::HashSet;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use encore_core::booking::{BookedItem, BookedSeat, Booking, BookingStatus};
use encore_core::repository::{BookingRepository, RepoError, SeatLedger};
use serde_json::Value;
use sqlx::PgPool;
use uuid::Uuid;

pub struct PgBookingRepository {
    pool: PgPool,
}

impl PgBookingRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[derive(sqlx::FromRow)]
struct BookingRow {
    id: Uuid,
    user_id: Uuid,
    show_id: String,
    seat_details: Value,
    items: Value,
    seats_total: i64,
    items_total: i64,
    total_amount: i64,
    currency: String,
    status: String,
    booking_date: DateTime<Utc>,
}

impl TryFrom<BookingRow> for Booking {
    type Error = RepoError;

    fn try_from(row: BookingRow) -> Result<Self, Self::Error> {
        let seats: Vec<BookedSeat> = serde_json::from_value(row.seat_details)?;
        let items: Vec<BookedItem> = serde_json::from_value(row.items)?;
        let status: BookingStatus = row.status.parse().map_err(RepoError::from)?;
        Ok(Booking {
            id: row.id,
            show_id: row.show_id,
            user_id: row.user_id,
            seats,
            items,
            seats_total: row.seats_total,
            items_total: row.items_total,
            total_amount: row.total_amount,
            currency: row.currency,
            status,
            booking_date: row.booking_date,
        })
    }
}

const BOOKING_COLUMNS: &str =
    "id, user_id, show_id, seat_details, items, seats_total, items_total, total_amount, currency, status, booking_date";

fn rows_to_bookings(rows: Vec<BookingRow>) -> Result<Vec<Booking>, RepoError> {
    rows.into_iter().map(Booking::try_from).collect()
}

#[async_trait]
impl BookingRepository for PgBookingRepository {
    async fn create_booking(
        &self,
        booking: &Booking,
    ) -> Result<(), RepoError> {
        sqlx::query(
            r#"
            INSERT INTO bookings (id, user_id, show_id, seats, seat_details, items, seats_total, items_total, total_amount, currency, status, booking_date)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12)
            "#,
        )
        .bind(booking.id)
        .bind(booking.user_id)
        .bind(&booking.show_id)
        .bind(booking.seat_ids())
        .bind(serde_json::to_value(&booking.seats)?)
        .bind(serde_json::to_value(&booking.items)?)
        .bind(booking.seats_total)
        .bind(booking.items_total)
        .bind(booking.total_amount)
        .bind(&booking.currency)
        .bind(booking.status.as_str())
        .bind(booking.booking_date)
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    async fn list_for_user(
        &self,
        user_id: Uuid,
    ) -> Result<Vec<Booking>, RepoError> {
        let rows: Vec<BookingRow> = sqlx::query_as(&format!(
            "SELECT {} FROM bookings WHERE user_id = $1 ORDER BY booking_date DESC",
            BOOKING_COLUMNS
        ))
        .bind(user_id)
        .fetch_all(&self.pool)
        .await?;
        rows_to_bookings(rows)
    }

    async fn list_bookings(&self) -> Result<Vec<Booking>, RepoError> {
        let rows: Vec<BookingRow> = sqlx::query_as(&format!(
            "SELECT {} FROM bookings ORDER BY booking_date DESC",
            BOOKING_COLUMNS
        ))
        .fetch_all(&self.pool)
        .await?;
        rows_to_bookings(rows)
    }
}

/// Seat ledger backed by the `seat_claims` table; the primary key on
/// (show_id, seat_id) makes a claim all-or-nothing.
pub struct PgSeatLedger {
    pool: PgPool,
}

impl PgSeatLedger {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl SeatLedger for PgSeatLedger {
    async fn claim_seats(
        &self,
        show_id: &str,
        seat_ids: &[String],
        holder: Uuid,
    ) -> Result<Vec<String>, RepoError> {
        let mut tx = self.pool.begin().await?;

        let claimed: Vec<(String,)> = sqlx::query_as(
            r#"
            INSERT INTO seat_claims (show_id, seat_id, holder)
            SELECT $1, seat_id, $3 FROM UNNEST($2::TEXT[]) AS seat_id
            ON CONFLICT (show_id, seat_id) DO NOTHING
            RETURNING seat_id
            "#,
        )
        .bind(show_id)
        .bind(seat_ids)
        .bind(holder)
        .fetch_all(&mut *tx)
        .await?;

        let claimed: HashSet<String> = claimed.into_iter().map(|(id,)| id).collect();
        let taken: Vec<String> = seat_ids.iter().filter(|id| !claimed.contains(*id)).cloned().collect();

        if taken.is_empty() {
            tx.commit().await?;
        } else {
            tx.rollback().await?;
        }
        Ok(taken)
    }

    async fn release_seats(
        &self,
        show_id: &str,
        seat_ids: &[String],
    ) -> Result<(), RepoError> {
        sqlx::query("DELETE FROM seat_claims WHERE show_id = $1 AND seat_id = ANY($2)")
            .bind(show_id)
            .bind(seat_ids)
            .execute(&self.pool)
            .await?;
        Ok(())
    }

    async fn booked_seats(
        &self,
        show_id: &str,
    ) -> Result<HashSet<String>, RepoError> {
        let rows: Vec<(String,)> = sqlx::query_as("SELECT seat_id FROM seat_claims WHERE show_id = $1")
            .bind(show_id)
            .fetch_all(&self.pool)
            .await?;
        Ok(rows.into_iter().map(|(id,)| id).collect())
    }
}
