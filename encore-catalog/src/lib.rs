pub mod show;
pub mod seating;
pub mod concessions;
pub mod artists;

pub use show::{Show, ShowCatalog, Tier, TierPrices};
pub use seating::{Seat, SeatLayout, SeatMapError, SeatMapGenerator, TierLayout};
pub use concessions::{ConcessionItem, ConcessionMenu, ItemCategory};
pub use artists::{Artist, ArtistRoster};
