pub mod events;

pub use events::{BookingConfirmedEvent, ReviewPostedEvent, topics};
