use std::sync::Arc;

use chrono::Utc;
use encore_core::activity::{ActivityLogger, ActivityType};
use encore_core::events::EventPublisher;
use encore_core::repository::ReviewRepository;
use encore_core::review::{RatingSummary, Review, ReviewSort};
use encore_core::user::UserProfile;
use encore_core::CoreError;
use encore_shared::models::{topics, ReviewPostedEvent};
use serde::{Deserialize, Serialize};
use tokio::sync::broadcast;
use tracing::{info, warn};

#[derive(Debug, thiserror::Error)]
pub enum FeedError {
    #[error("Invalid review: {0}")]
    Invalid(String),

    #[error("Review store error: {0}")]
    Store(String),
}

impl From<CoreError> for FeedError {
    fn from(err: CoreError) -> Self {
        match err {
            CoreError::ValidationError(msg) => FeedError::Invalid(msg),
            other => FeedError::Store(other.to_string()),
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct ReviewQuery {
    pub show_id: Option<String>,
    #[serde(default)]
    pub sort: ReviewSort,
    pub limit: Option<usize>,
}

impl ReviewQuery {
    pub fn matches(&self, review: &Review) -> bool {
        self.show_id.as_deref().map_or(true, |id| review.show_id == id)
    }
}

/// Receives reviews as they are posted.
pub trait FeedObserver {
    fn on_review(&mut self, review: &Review);
}

/// Client-side view of the review list that folds live updates in place
/// instead of reloading everything.
#[derive(Debug, Clone)]
pub struct ReviewFeed {
    query: ReviewQuery,
    reviews: Vec<Review>,
}

impl ReviewFeed {
    pub fn from_snapshot(query: ReviewQuery, mut reviews: Vec<Review>) -> Self {
        reviews.retain(|r| query.matches(r));
        query.sort.apply(&mut reviews);
        Self { query, reviews }
    }

    /// Inserts at the sorted position. Ignores duplicates and reviews for
    /// other shows. Returns whether the view changed.
    pub fn merge(&mut self, review: &Review) -> bool {
        if !self.query.matches(review) || self.reviews.iter().any(|r| r.id == review.id) {
            return false;
        }
        let sort = self.query.sort;
        let pos = self
            .reviews
            .partition_point(|existing| sort.compare(existing, review) != std::cmp::Ordering::Greater);
        self.reviews.insert(pos, review.clone());
        true
    }

    pub fn reviews(&self) -> &[Review] {
        match self.query.limit {
            Some(limit) => &self.reviews[..self.reviews.len().min(limit)],
            None => &self.reviews,
        }
    }

    pub fn summary(&self) -> RatingSummary {
        RatingSummary::from_reviews(&self.reviews)
    }
}

impl FeedObserver for ReviewFeed {
    fn on_review(&mut self, review: &Review) {
        self.merge(review);
    }
}

/// Review intake plus the live broadcast that feeds subscribers.
pub struct ReviewService {
    reviews: Arc<dyn ReviewRepository>,
    activity: ActivityLogger,
    events: Arc<dyn EventPublisher>,
    live: broadcast::Sender<Review>,
}

impl ReviewService {
    pub fn new(
        reviews: Arc<dyn ReviewRepository>,
        activity: ActivityLogger,
        events: Arc<dyn EventPublisher>,
        capacity: usize,
    ) -> Self {
        let (live, _) = broadcast::channel(capacity.max(1));
        Self {
            reviews,
            activity,
            events,
            live,
        }
    }

    pub fn subscribe(&self) -> broadcast::Receiver<Review> {
        self.live.subscribe()
    }

    pub async fn feed(&self, query: ReviewQuery) -> Result<ReviewFeed, FeedError> {
        let reviews = self
            .reviews
            .list_reviews(query.show_id.as_deref())
            .await
            .map_err(|e| FeedError::Store(e.to_string()))?;
        Ok(ReviewFeed::from_snapshot(query, reviews))
    }

    pub async fn summary(&self, show_id: Option<&str>) -> Result<RatingSummary, FeedError> {
        let reviews = self
            .reviews
            .list_reviews(show_id)
            .await
            .map_err(|e| FeedError::Store(e.to_string()))?;
        Ok(RatingSummary::from_reviews(&reviews))
    }

    pub async fn submit(
        &self,
        author: &UserProfile,
        show_id: &str,
        rating: u8,
        comment: &str,
    ) -> Result<Review, FeedError> {
        let review = Review::new(
            author.id,
            author.name.clone(),
            show_id.to_string(),
            rating,
            comment.to_string(),
        )?;

        self.reviews
            .create_review(&review)
            .await
            .map_err(|e| FeedError::Store(e.to_string()))?;

        self.activity
            .log(
                author.id,
                ActivityType::Review,
                format!("Left a {}-star review", rating),
                Some(serde_json::json!({ "show_id": show_id, "rating": rating })),
            )
            .await;

        let event = ReviewPostedEvent {
            review_id: review.id,
            show_id: review.show_id.clone(),
            user_id: author.id,
            rating,
            timestamp: Utc::now().timestamp(),
        };
        match serde_json::to_string(&event) {
            Ok(payload) => {
                let _ = self
                    .events
                    .publish(topics::REVIEW_POSTED, &review.show_id, &payload)
                    .await;
            }
            Err(e) => warn!("Failed to encode review event: {}", e),
        }

        // No subscribers is fine
        let _ = self.live.send(review.clone());

        info!("Review {} posted for show {}", review.id, review.show_id);
        Ok(review)
    }
}
