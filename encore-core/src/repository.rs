use async_trait::async_trait;
use chrono::{DateTime, Utc};
use encore_catalog::Show;
use std::collections::HashSet;
use uuid::Uuid;

use crate::activity::UserActivity;
use crate::booking::Booking;
use crate::review::Review;
use crate::user::{UserCredentials, UserProfile};

pub type RepoError = Box<dyn std::error::Error + Send + Sync>;

/// A unique key (such as a user's email) already exists in the store.
#[derive(Debug, thiserror::Error)]
#[error("{0} already exists")]
pub struct DuplicateKey(pub String);

/// Repository trait for the show line-up
#[async_trait]
pub trait ShowRepository: Send + Sync {
    async fn list_shows(
        &self,
        genre: Option<&str>,
    ) -> Result<Vec<Show>, RepoError>;

    async fn get_show(
        &self,
        id: &str,
    ) -> Result<Option<Show>, RepoError>;
}

/// Repository trait for user profiles and their credentials
#[async_trait]
pub trait UserRepository: Send + Sync {
    async fn create_user(
        &self,
        profile: &UserProfile,
        password_hash: &str,
    ) -> Result<(), RepoError>;

    async fn get_user(
        &self,
        id: Uuid,
    ) -> Result<Option<UserProfile>, RepoError>;

    /// Lookup by normalized email.
    async fn find_by_email(
        &self,
        email: &str,
    ) -> Result<Option<UserCredentials>, RepoError>;

    async fn record_login(
        &self,
        id: Uuid,
        at: DateTime<Utc>,
    ) -> Result<(), RepoError>;

    /// Returns false when no such user exists.
    async fn set_active(
        &self,
        id: Uuid,
        active: bool,
    ) -> Result<bool, RepoError>;

    async fn count_users(&self) -> Result<u64, RepoError>;
}

/// Repository trait for confirmed bookings
#[async_trait]
pub trait BookingRepository: Send + Sync {
    async fn create_booking(
        &self,
        booking: &Booking,
    ) -> Result<(), RepoError>;

    async fn list_for_user(
        &self,
        user_id: Uuid,
    ) -> Result<Vec<Booking>, RepoError>;

    async fn list_bookings(&self) -> Result<Vec<Booking>, RepoError>;
}

/// Repository trait for show reviews (append-only)
#[async_trait]
pub trait ReviewRepository: Send + Sync {
    async fn create_review(
        &self,
        review: &Review,
    ) -> Result<(), RepoError>;

    async fn list_reviews(
        &self,
        show_id: Option<&str>,
    ) -> Result<Vec<Review>, RepoError>;
}

/// Repository trait for the audit trail (append-only, newest first on read)
#[async_trait]
pub trait ActivityRepository: Send + Sync {
    async fn record_activity(
        &self,
        activity: &UserActivity,
    ) -> Result<(), RepoError>;

    async fn list_for_user(
        &self,
        user_id: Uuid,
        limit: usize,
    ) -> Result<Vec<UserActivity>, RepoError>;

    async fn list_recent(
        &self,
        limit: usize,
    ) -> Result<Vec<UserActivity>, RepoError>;
}

/// Shared record of which seats are already sold for each show.
#[async_trait]
pub trait SeatLedger: Send + Sync {
    /// Claims every seat or none. Returns the seats that were already taken;
    /// an empty vector means the claim succeeded.
    async fn claim_seats(
        &self,
        show_id: &str,
        seat_ids: &[String],
        holder: Uuid,
    ) -> Result<Vec<String>, RepoError>;

    async fn release_seats(
        &self,
        show_id: &str,
        seat_ids: &[String],
    ) -> Result<(), RepoError>;

    async fn booked_seats(
        &self,
        show_id: &str,
    ) -> Result<HashSet<String>, RepoError>;
}
