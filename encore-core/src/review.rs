use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{CoreError, CoreResult};

pub const MIN_RATING: u8 = 1;
pub const MAX_RATING: u8 = 5;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Review {
    pub id: Uuid,
    pub user_id: Uuid,
    pub user_name: String,
    pub show_id: String,
    pub rating: u8,
    pub comment: String,
    pub created_at: DateTime<Utc>,
}

impl Review {
    /// Validates rating and comment before anything reaches the store.
    pub fn new(user_id: Uuid, user_name: String, show_id: String, rating: u8, comment: String) -> CoreResult<Self> {
        if !(MIN_RATING..=MAX_RATING).contains(&rating) {
            return Err(CoreError::ValidationError(format!(
                "Rating must be between {} and {}, got {}",
                MIN_RATING, MAX_RATING, rating
            )));
        }
        let comment = comment.trim().to_string();
        if comment.is_empty() {
            return Err(CoreError::ValidationError("Comment must not be empty".to_string()));
        }
        if show_id.trim().is_empty() {
            return Err(CoreError::ValidationError("A show must be selected".to_string()));
        }

        Ok(Self {
            id: Uuid::new_v4(),
            user_id,
            user_name,
            show_id,
            rating,
            comment,
            created_at: Utc::now(),
        })
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum ReviewSort {
    #[default]
    Newest,
    Rating,
}

impl ReviewSort {
    pub fn compare(&self, a: &Review, b: &Review) -> std::cmp::Ordering {
        match self {
            ReviewSort::Newest => b.created_at.cmp(&a.created_at),
            ReviewSort::Rating => b
                .rating
                .cmp(&a.rating)
                .then_with(|| b.created_at.cmp(&a.created_at)),
        }
    }

    pub fn apply(&self, reviews: &mut [Review]) {
        reviews.sort_by(|a, b| self.compare(a, b));
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct RatingBucket {
    pub rating: u8,
    pub count: usize,
    pub percentage: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct RatingSummary {
    pub total: usize,
    pub average: f64,
    /// Buckets from 5 stars down to 1.
    pub distribution: Vec<RatingBucket>,
}

impl RatingSummary {
    pub fn from_reviews(reviews: &[Review]) -> Self {
        let total = reviews.len();
        let sum: u64 = reviews.iter().map(|r| u64::from(r.rating)).sum();
        let average = if total == 0 { 0.0 } else { sum as f64 / total as f64 };

        let distribution = (MIN_RATING..=MAX_RATING)
            .rev()
            .map(|rating| {
                let count = reviews.iter().filter(|r| r.rating == rating).count();
                let percentage = if total == 0 { 0.0 } else { count as f64 * 100.0 / total as f64 };
                RatingBucket { rating, count, percentage }
            })
            .collect();

        Self { total, average, distribution }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    fn review(rating: u8, minutes_ago: i64) -> Review {
        let mut r = Review::new(Uuid::new_v4(), "Ruth".into(), "1".into(), rating, "Great show".into()).unwrap();
        r.created_at = Utc::now() - Duration::minutes(minutes_ago);
        r
    }

    #[test]
    fn test_rating_bounds() {
        let user = Uuid::new_v4();
        assert!(Review::new(user, "A".into(), "1".into(), 0, "meh".into()).is_err());
        assert!(Review::new(user, "A".into(), "1".into(), 6, "wow".into()).is_err());
        assert!(Review::new(user, "A".into(), "1".into(), 1, "ok".into()).is_ok());
        assert!(Review::new(user, "A".into(), "1".into(), 5, "ok".into()).is_ok());
        assert!(Review::new(user, "A".into(), "1".into(), 4, "   ".into()).is_err());
        assert!(Review::new(user, "A".into(), "".into(), 4, "fine".into()).is_err());
    }

    #[test]
    fn test_sorting() {
        let mut reviews = vec![review(3, 10), review(5, 30), review(5, 5), review(1, 1)];

        ReviewSort::Newest.apply(&mut reviews);
        let order: Vec<u8> = reviews.iter().map(|r| r.rating).collect();
        assert_eq!(order, vec![1, 5, 3, 5]);

        ReviewSort::Rating.apply(&mut reviews);
        let ratings: Vec<u8> = reviews.iter().map(|r| r.rating).collect();
        assert_eq!(ratings, vec![5, 5, 3, 1]);
        // ties broken newest first
        assert!(reviews[0].created_at > reviews[1].created_at);
    }

    #[test]
    fn test_summary() {
        let reviews = vec![review(5, 1), review(4, 2), review(5, 3), review(2, 4)];
        let summary = RatingSummary::from_reviews(&reviews);
        assert_eq!(summary.total, 4);
        assert!((summary.average - 4.0).abs() < f64::EPSILON);
        assert_eq!(summary.distribution[0].rating, 5);
        assert_eq!(summary.distribution[0].count, 2);
        assert!((summary.distribution[0].percentage - 50.0).abs() < 1e-9);
        assert_eq!(summary.distribution[4].rating, 1);
        assert_eq!(summary.distribution[4].count, 0);

        let empty = RatingSummary::from_reviews(&[]);
        assert_eq!(empty.total, 0);
        assert_eq!(empty.average, 0.0);
        assert_eq!(empty.distribution.len(), 5);
    }
}
