use async_trait::async_trait;
use chrono::{DateTime, Utc};
use encore_core::repository::{RepoError, ReviewRepository};
use encore_core::review::Review;
use sqlx::PgPool;
use uuid::Uuid;

pub struct PgReviewRepository {
    pool: PgPool,
}

impl PgReviewRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[derive(sqlx::FromRow)]
struct ReviewRow {
    id: Uuid,
    user_id: Uuid,
    user_name: String,
    show_id: String,
    rating: i16,
    comment: String,
    created_at: DateTime<Utc>,
}

impl TryFrom<ReviewRow> for Review {
    type Error = RepoError;

    fn try_from(row: ReviewRow) -> Result<Self, Self::Error> {
        Ok(Review {
            id: row.id,
            user_id: row.user_id,
            user_name: row.user_name,
            show_id: row.show_id,
            rating: u8::try_from(row.rating)?,
            comment: row.comment,
            created_at: row.created_at,
        })
    }
}

#[async_trait]
impl ReviewRepository for PgReviewRepository {
    async fn create_review(
        &self,
        review: &Review,
    ) -> Result<(), RepoError> {
        sqlx::query(
            r#"
            INSERT INTO reviews (id, user_id, user_name, show_id, rating, comment, created_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            "#,
        )
        .bind(review.id)
        .bind(review.user_id)
        .bind(&review.user_name)
        .bind(&review.show_id)
        .bind(i16::from(review.rating))
        .bind(&review.comment)
        .bind(review.created_at)
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    async fn list_reviews(
        &self,
        show_id: Option<&str>,
    ) -> Result<Vec<Review>, RepoError> {
        let rows: Vec<ReviewRow> = sqlx::query_as(
            r#"
            SELECT id, user_id, user_name, show_id, rating, comment, created_at
            FROM reviews
            WHERE ($1::TEXT IS NULL OR show_id = $1)
            ORDER BY created_at DESC
            "#,
        )
        .bind(show_id)
        .fetch_all(&self.pool)
        .await?;
        rows.into_iter().map(Review::try_from).collect()
    }
}
