use async_trait::async_trait;
use chrono::{DateTime, Utc};
use encore_core::activity::{ActivityType, UserActivity};
use encore_core::repository::{ActivityRepository, RepoError};
use serde_json::Value;
use sqlx::PgPool;
use uuid::Uuid;

pub struct PgActivityRepository {
    pool: PgPool,
}

impl PgActivityRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[derive(sqlx::FromRow)]
struct ActivityRow {
    id: Uuid,
    user_id: Uuid,
    activity_type: String,
    activity_description: String,
    metadata: Value,
    created_at: DateTime<Utc>,
}

impl TryFrom<ActivityRow> for UserActivity {
    type Error = RepoError;

    fn try_from(row: ActivityRow) -> Result<Self, Self::Error> {
        let activity_type: ActivityType = row.activity_type.parse().map_err(RepoError::from)?;
        Ok(UserActivity {
            id: row.id,
            user_id: row.user_id,
            activity_type,
            description: row.activity_description,
            metadata: row.metadata,
            created_at: row.created_at,
        })
    }
}

#[async_trait]
impl ActivityRepository for PgActivityRepository {
    async fn record_activity(
        &self,
        activity: &UserActivity,
    ) -> Result<(), RepoError> {
        sqlx::query(
            r#"
            INSERT INTO user_activity (id, user_id, activity_type, activity_description, metadata, created_at)
            VALUES ($1, $2, $3, $4, $5, $6)
            "#,
        )
        .bind(activity.id)
        .bind(activity.user_id)
        .bind(activity.activity_type.as_str())
        .bind(&activity.description)
        .bind(&activity.metadata)
        .bind(activity.created_at)
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    async fn list_for_user(
        &self,
        user_id: Uuid,
        limit: usize,
    ) -> Result<Vec<UserActivity>, RepoError> {
        let rows: Vec<ActivityRow> = sqlx::query_as(
            r#"
            SELECT id, user_id, activity_type, activity_description, metadata, created_at
            FROM user_activity
            WHERE user_id = $1
            ORDER BY created_at DESC
            LIMIT $2
            "#,
        )
        .bind(user_id)
        .bind(i64::try_from(limit).unwrap_or(i64::MAX))
        .fetch_all(&self.pool)
        .await?;
        rows.into_iter().map(UserActivity::try_from).collect()
    }

    async fn list_recent(
        &self,
        limit: usize,
    ) -> Result<Vec<UserActivity>, RepoError> {
        let rows: Vec<ActivityRow> = sqlx::query_as(
            r#"
            SELECT id, user_id, activity_type, activity_description, metadata, created_at
            FROM user_activity
            ORDER BY created_at DESC
            LIMIT $1
            "#,
        )
        .bind(i64::try_from(limit).unwrap_or(i64::MAX))
        .fetch_all(&self.pool)
        .await?;
        rows.into_iter().map(UserActivity::try_from).collect()
    }
}
