use uuid::Uuid;

pub mod topics {
    pub const BOOKING_CONFIRMED: &str = "booking.confirmed";
    pub const REVIEW_POSTED: &str = "review.posted";
}

#[derive(Debug, serde::Serialize, serde::Deserialize, Clone, PartialEq)]
pub struct BookingConfirmedEvent {
    pub booking_id: Uuid,
    pub show_id: String,
    pub user_id: Uuid,
    pub seat_ids: Vec<String>,
    pub total_amount: i64,
    pub timestamp: i64,
}

#[derive(Debug, serde::Serialize, serde::Deserialize, Clone, PartialEq)]
pub struct ReviewPostedEvent {
    pub review_id: Uuid,
    pub show_id: String,
    pub user_id: Uuid,
    pub rating: u8,
    pub timestamp: i64,
}
