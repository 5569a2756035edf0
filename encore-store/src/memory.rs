//! In-process repositories used when no database is configured, and by tests.

use std::collections::{HashMap, HashSet};

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use encore_catalog::{Show, ShowCatalog};
use encore_core::activity::UserActivity;
use encore_core::booking::Booking;
use encore_core::repository::{
    ActivityRepository, BookingRepository, DuplicateKey, RepoError, ReviewRepository, SeatLedger, ShowRepository,
    UserRepository,
};
use encore_core::review::Review;
use encore_core::user::{normalize_email, UserCredentials, UserProfile};
use tokio::sync::RwLock;
use uuid::Uuid;

pub struct MemoryShowRepository {
    catalog: RwLock<ShowCatalog>,
}

impl MemoryShowRepository {
    pub fn new(catalog: ShowCatalog) -> Self {
        Self {
            catalog: RwLock::new(catalog),
        }
    }
}

impl Default for MemoryShowRepository {
    fn default() -> Self {
        Self::new(ShowCatalog::with_defaults())
    }
}

#[async_trait]
impl ShowRepository for MemoryShowRepository {
    async fn list_shows(
        &self,
        genre: Option<&str>,
    ) -> Result<Vec<Show>, RepoError> {
        Ok(self.catalog.read().await.filter_by_genre(genre))
    }

    async fn get_show(
        &self,
        id: &str,
    ) -> Result<Option<Show>, RepoError> {
        Ok(self.catalog.read().await.get(id).cloned())
    }
}

#[derive(Default)]
pub struct MemoryUserRepository {
    users: RwLock<HashMap<Uuid, UserCredentials>>,
}

impl MemoryUserRepository {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl UserRepository for MemoryUserRepository {
    async fn create_user(
        &self,
        profile: &UserProfile,
        password_hash: &str,
    ) -> Result<(), RepoError> {
        let mut users = self.users.write().await;
        let email = normalize_email(&profile.email);
        if users.values().any(|u| u.profile.email == email) {
            return Err(DuplicateKey(format!("email {}", email)).into());
        }
        users.insert(
            profile.id,
            UserCredentials {
                profile: profile.clone(),
                password_hash: password_hash.to_string(),
            },
        );
        Ok(())
    }

    async fn get_user(
        &self,
        id: Uuid,
    ) -> Result<Option<UserProfile>, RepoError> {
        Ok(self.users.read().await.get(&id).map(|u| u.profile.clone()))
    }

    async fn find_by_email(
        &self,
        email: &str,
    ) -> Result<Option<UserCredentials>, RepoError> {
        let email = normalize_email(email);
        Ok(self
            .users
            .read()
            .await
            .values()
            .find(|u| u.profile.email == email)
            .cloned())
    }

    async fn record_login(
        &self,
        id: Uuid,
        at: DateTime<Utc>,
    ) -> Result<(), RepoError> {
        if let Some(user) = self.users.write().await.get_mut(&id) {
            user.profile.last_login = Some(at);
        }
        Ok(())
    }

    async fn set_active(
        &self,
        id: Uuid,
        active: bool,
    ) -> Result<bool, RepoError> {
        match self.users.write().await.get_mut(&id) {
            Some(user) => {
                user.profile.is_active = active;
                Ok(true)
            }
            None => Ok(false),
        }
    }

    async fn count_users(&self) -> Result<u64, RepoError> {
        Ok(self.users.read().await.len() as u64)
    }
}

#[derive(Default)]
pub struct MemoryBookingRepository {
    bookings: RwLock<Vec<Booking>>,
}

impl MemoryBookingRepository {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl BookingRepository for MemoryBookingRepository {
    async fn create_booking(
        &self,
        booking: &Booking,
    ) -> Result<(), RepoError> {
        self.bookings.write().await.push(booking.clone());
        Ok(())
    }

    async fn list_for_user(
        &self,
        user_id: Uuid,
    ) -> Result<Vec<Booking>, RepoError> {
        let mut bookings: Vec<Booking> = self
            .bookings
            .read()
            .await
            .iter()
            .filter(|b| b.user_id == user_id)
            .cloned()
            .collect();
        bookings.sort_by(|a, b| b.booking_date.cmp(&a.booking_date));
        Ok(bookings)
    }

    async fn list_bookings(&self) -> Result<Vec<Booking>, RepoError> {
        let mut bookings = self.bookings.read().await.clone();
        bookings.sort_by(|a, b| b.booking_date.cmp(&a.booking_date));
        Ok(bookings)
    }
}

#[derive(Default)]
pub struct MemoryReviewRepository {
    reviews: RwLock<Vec<Review>>,
}

impl MemoryReviewRepository {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl ReviewRepository for MemoryReviewRepository {
    async fn create_review(
        &self,
        review: &Review,
    ) -> Result<(), RepoError> {
        self.reviews.write().await.push(review.clone());
        Ok(())
    }

    async fn list_reviews(
        &self,
        show_id: Option<&str>,
    ) -> Result<Vec<Review>, RepoError> {
        let mut reviews: Vec<Review> = self
            .reviews
            .read()
            .await
            .iter()
            .filter(|r| show_id.map_or(true, |id| r.show_id == id))
            .cloned()
            .collect();
        reviews.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(reviews)
    }
}

#[derive(Default)]
pub struct MemoryActivityRepository {
    entries: RwLock<Vec<UserActivity>>,
}

impl MemoryActivityRepository {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl ActivityRepository for MemoryActivityRepository {
    async fn record_activity(
        &self,
        activity: &UserActivity,
    ) -> Result<(), RepoError> {
        self.entries.write().await.push(activity.clone());
        Ok(())
    }

    async fn list_for_user(
        &self,
        user_id: Uuid,
        limit: usize,
    ) -> Result<Vec<UserActivity>, RepoError> {
        // Entries are appended in time order; walk backwards for newest first.
        Ok(self
            .entries
            .read()
            .await
            .iter()
            .rev()
            .filter(|a| a.user_id == user_id)
            .take(limit)
            .cloned()
            .collect())
    }

    async fn list_recent(
        &self,
        limit: usize,
    ) -> Result<Vec<UserActivity>, RepoError> {
        Ok(self.entries.read().await.iter().rev().take(limit).cloned().collect())
    }
}

/// Seat ownership keyed by show, then seat id.
#[derive(Default)]
pub struct MemorySeatLedger {
    claims: RwLock<HashMap<String, HashMap<String, Uuid>>>,
}

impl MemorySeatLedger {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl SeatLedger for MemorySeatLedger {
    async fn claim_seats(
        &self,
        show_id: &str,
        seat_ids: &[String],
        holder: Uuid,
    ) -> Result<Vec<String>, RepoError> {
        let mut claims = self.claims.write().await;
        let show = claims.entry(show_id.to_string()).or_default();

        let taken: Vec<String> = seat_ids
            .iter()
            .filter(|id| show.contains_key(*id))
            .cloned()
            .collect();
        if taken.is_empty() {
            for id in seat_ids {
                show.insert(id.clone(), holder);
            }
        }
        Ok(taken)
    }

    async fn release_seats(
        &self,
        show_id: &str,
        seat_ids: &[String],
    ) -> Result<(), RepoError> {
        if let Some(show) = self.claims.write().await.get_mut(show_id) {
            for id in seat_ids {
                show.remove(id);
            }
        }
        Ok(())
    }

    async fn booked_seats(
        &self,
        show_id: &str,
    ) -> Result<HashSet<String>, RepoError> {
        Ok(self
            .claims
            .read()
            .await
            .get(show_id)
            .map(|show| show.keys().cloned().collect())
            .unwrap_or_default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use encore_core::activity::{ActivityLogger, ActivityType};
    use encore_core::identity::AuthService;
    use encore_core::user::Role;
    use encore_core::CoreError;
    use std::sync::Arc;

    fn auth() -> (AuthService, Arc<MemoryActivityRepository>) {
        let users = Arc::new(MemoryUserRepository::new());
        let activity = Arc::new(MemoryActivityRepository::new());
        let service = AuthService::new(users, ActivityLogger::new(activity.clone()))
            .with_admin_emails(["boss@encore.ug"]);
        (service, activity)
    }

    #[tokio::test]
    async fn test_sign_up_then_sign_in() {
        let (auth, activity) = auth();
        let profile = auth.sign_up("Aisha", " Aisha@Example.com ", "hunter22").await.unwrap();
        assert_eq!(profile.email, "aisha@example.com");
        assert_eq!(profile.role, Role::User);

        let signed_in = auth.sign_in("AISHA@example.com", "hunter22").await.unwrap();
        assert_eq!(signed_in.id, profile.id);
        assert!(signed_in.last_login.is_some());

        let trail = activity.list_for_user(profile.id, 10).await.unwrap();
        assert_eq!(trail.len(), 2);
        assert_eq!(trail[0].activity_type, ActivityType::Login);
        assert_eq!(trail[1].activity_type, ActivityType::Registration);
    }

    #[tokio::test]
    async fn test_sign_up_validation_and_duplicates() {
        let (auth, _) = auth();
        assert!(matches!(
            auth.sign_up("", "a@b.com", "longenough").await,
            Err(CoreError::ValidationError(_))
        ));
        assert!(matches!(
            auth.sign_up("Ann", "not-an-email", "longenough").await,
            Err(CoreError::ValidationError(_))
        ));
        assert!(matches!(
            auth.sign_up("Ann", "a@b.com", "short").await,
            Err(CoreError::ValidationError(_))
        ));

        auth.sign_up("Ann", "a@b.com", "longenough").await.unwrap();
        assert!(matches!(
            auth.sign_up("Ann Again", "A@B.com", "longenough").await,
            Err(CoreError::Conflict(_))
        ));
    }

    #[tokio::test]
    async fn test_duplicate_user_insert_is_conflict() {
        let repo = MemoryUserRepository::new();
        let profile = UserProfile::new("Ann".into(), "ann@example.com".into(), Role::User);
        repo.create_user(&profile, "hash").await.unwrap();

        let again = UserProfile::new("Ann".into(), "ann@example.com".into(), Role::User);
        let err = repo.create_user(&again, "hash").await.unwrap_err();
        assert!(err.downcast_ref::<DuplicateKey>().is_some());
        assert!(matches!(CoreError::from(err), CoreError::Conflict(_)));
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_concurrent_sign_ups_for_one_email() {
        let (auth, _) = auth();
        let auth = Arc::new(auth);
        let attempts: Vec<_> = (0..8)
            .map(|i| {
                let auth = auth.clone();
                tokio::spawn(async move {
                    auth.sign_up(&format!("Racer {}", i), "race@example.com", "longenough").await
                })
            })
            .collect();

        let mut created = 0;
        for attempt in attempts {
            match attempt.await.unwrap() {
                Ok(_) => created += 1,
                Err(CoreError::Conflict(msg)) => assert_eq!(msg, "Email is already registered"),
                Err(other) => panic!("unexpected sign-up error: {:?}", other),
            }
        }
        assert_eq!(created, 1);
    }

    #[tokio::test]
    async fn test_admin_email_gets_admin_role() {
        let (auth, _) = auth();
        let profile = auth.sign_up("Boss", "boss@encore.ug", "password1").await.unwrap();
        assert!(profile.is_admin());
    }

    #[tokio::test]
    async fn test_wrong_password_rejected() {
        let (auth, _) = auth();
        auth.sign_up("Ann", "ann@example.com", "correct-horse").await.unwrap();
        assert!(matches!(
            auth.sign_in("ann@example.com", "battery-staple").await,
            Err(CoreError::IdentityError(_))
        ));
        assert!(matches!(
            auth.sign_in("nobody@example.com", "correct-horse").await,
            Err(CoreError::IdentityError(_))
        ));
    }

    #[tokio::test]
    async fn test_deleted_account_cannot_sign_in() {
        let (auth, activity) = auth();
        let profile = auth.sign_up("Ann", "ann@example.com", "correct-horse").await.unwrap();

        auth.delete_account(profile.id).await.unwrap();

        assert!(auth.current_user(profile.id).await.unwrap().is_none());
        assert!(matches!(
            auth.sign_in("ann@example.com", "correct-horse").await,
            Err(CoreError::IdentityError(_))
        ));
        let trail = activity.list_for_user(profile.id, 10).await.unwrap();
        assert_eq!(trail[0].activity_type, ActivityType::AccountDeletion);
    }

    #[tokio::test]
    async fn test_delete_unknown_account() {
        let (auth, _) = auth();
        assert!(matches!(
            auth.delete_account(Uuid::new_v4()).await,
            Err(CoreError::NotFound(_))
        ));
    }

    #[tokio::test]
    async fn test_seat_ledger_is_all_or_nothing() {
        let ledger = MemorySeatLedger::new();
        let first = Uuid::new_v4();
        let second = Uuid::new_v4();

        let taken = ledger
            .claim_seats("2", &["A1".to_string(), "A2".to_string()], first)
            .await
            .unwrap();
        assert!(taken.is_empty());

        let taken = ledger
            .claim_seats("2", &["A2".to_string(), "A3".to_string()], second)
            .await
            .unwrap();
        assert_eq!(taken, vec!["A2".to_string()]);

        let booked = ledger.booked_seats("2").await.unwrap();
        assert_eq!(booked.len(), 2);
        assert!(!booked.contains("A3"));

        ledger.release_seats("2", &["A1".to_string()]).await.unwrap();
        assert!(!ledger.booked_seats("2").await.unwrap().contains("A1"));
        assert!(ledger.booked_seats("other").await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_activity_newest_first_with_limit() {
        let repo = MemoryActivityRepository::new();
        let user = Uuid::new_v4();
        for i in 0..5 {
            repo.record_activity(&UserActivity::new(user, ActivityType::Login, format!("login {}", i), None))
                .await
                .unwrap();
        }
        let recent = repo.list_recent(3).await.unwrap();
        assert_eq!(recent.len(), 3);
        assert_eq!(recent[0].description, "login 4");
    }

    #[tokio::test]
    async fn test_show_repository_genre_filter() {
        let repo = MemoryShowRepository::default();
        assert_eq!(repo.list_shows(None).await.unwrap().len(), 3);
        assert!(repo.get_show("2").await.unwrap().is_some());
        assert!(repo.get_show("99").await.unwrap().is_none());
    }
}
