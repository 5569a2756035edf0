pub mod cart;
pub mod sessions;
pub mod confirmation;
pub mod feed;

pub use cart::{Cart, CartItem, CartSummary};
pub use sessions::BookingSessions;
pub use confirmation::{BookingError, BookingService};
pub use feed::{FeedError, FeedObserver, ReviewFeed, ReviewQuery, ReviewService};
