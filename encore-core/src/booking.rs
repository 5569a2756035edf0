use chrono::{DateTime, Utc};
use encore_catalog::{Seat, Tier};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum BookingStatus {
    Confirmed,
    Pending,
    Cancelled,
}

impl BookingStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            BookingStatus::Confirmed => "confirmed",
            BookingStatus::Pending => "pending",
            BookingStatus::Cancelled => "cancelled",
        }
    }
}

impl fmt::Display for BookingStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for BookingStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "confirmed" => Ok(BookingStatus::Confirmed),
            "pending" => Ok(BookingStatus::Pending),
            "cancelled" => Ok(BookingStatus::Cancelled),
            other => Err(format!("unknown booking status: {}", other)),
        }
    }
}

/// Seat as it was priced when the booking was made.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct BookedSeat {
    pub id: String,
    pub row: String,
    pub number: u32,
    pub tier: Tier,
    pub price: i64,
}

impl From<&Seat> for BookedSeat {
    fn from(seat: &Seat) -> Self {
        Self {
            id: seat.id.clone(),
            row: seat.row.clone(),
            number: seat.number,
            tier: seat.tier,
            price: seat.price,
        }
    }
}

/// Concession line as it was priced when the booking was made.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct BookedItem {
    pub item_id: String,
    pub name: String,
    pub unit_price: i64,
    pub quantity: u32,
}

impl BookedItem {
    pub fn subtotal(&self) -> i64 {
        self.unit_price * i64::from(self.quantity)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Booking {
    pub id: Uuid,
    pub show_id: String,
    pub user_id: Uuid,
    pub seats: Vec<BookedSeat>,
    pub items: Vec<BookedItem>,
    pub seats_total: i64,
    pub items_total: i64,
    pub total_amount: i64,
    pub currency: String,
    pub status: BookingStatus,
    pub booking_date: DateTime<Utc>,
}

impl Booking {
    /// Totals are derived from the snapshots so they can never drift from the lines.
    pub fn confirmed(show_id: String, user_id: Uuid, seats: Vec<BookedSeat>, items: Vec<BookedItem>) -> Self {
        let seats_total = seats.iter().map(|s| s.price).sum();
        let items_total = items.iter().map(BookedItem::subtotal).sum();
        Self {
            id: Uuid::new_v4(),
            show_id,
            user_id,
            seats,
            items,
            seats_total,
            items_total,
            total_amount: seats_total + items_total,
            currency: encore_shared::CURRENCY.to_string(),
            status: BookingStatus::Confirmed,
            booking_date: Utc::now(),
        }
    }

    pub fn seat_ids(&self) -> Vec<String> {
        self.seats.iter().map(|s| s.id.clone()).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_confirmed_booking_totals() {
        let seats = vec![
            BookedSeat { id: "A1".into(), row: "A".into(), number: 1, tier: Tier::Vip, price: 40_000 },
            BookedSeat { id: "F3".into(), row: "F".into(), number: 3, tier: Tier::Regular, price: 15_000 },
        ];
        let items = vec![BookedItem {
            item_id: "popcorn".into(),
            name: "Popcorn Combo".into(),
            unit_price: 8_000,
            quantity: 2,
        }];

        let booking = Booking::confirmed("2".into(), Uuid::new_v4(), seats, items);
        assert_eq!(booking.seats_total, 55_000);
        assert_eq!(booking.items_total, 16_000);
        assert_eq!(booking.total_amount, 71_000);
        assert_eq!(booking.status, BookingStatus::Confirmed);
        assert_eq!(booking.seat_ids(), vec!["A1".to_string(), "F3".to_string()]);
        assert_eq!(booking.currency, "UGX");
    }
}
