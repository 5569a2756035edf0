use async_trait::async_trait;
use chrono::{DateTime, Utc};
use encore_core::repository::{DuplicateKey, RepoError, UserRepository};
use encore_core::user::{Role, UserCredentials, UserProfile};
use sqlx::PgPool;
use uuid::Uuid;

pub struct PgUserRepository {
    pool: PgPool,
}

impl PgUserRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[derive(sqlx::FromRow)]
struct UserRow {
    id: Uuid,
    name: String,
    email: String,
    role: String,
    password_hash: String,
    is_active: bool,
    last_login: Option<DateTime<Utc>>,
    created_at: DateTime<Utc>,
}

impl UserRow {
    fn into_credentials(self) -> Result<UserCredentials, RepoError> {
        let role: Role = self.role.parse().map_err(RepoError::from)?;
        Ok(UserCredentials {
            profile: UserProfile {
                id: self.id,
                name: self.name,
                email: self.email,
                role,
                is_active: self.is_active,
                last_login: self.last_login,
                created_at: self.created_at,
            },
            password_hash: self.password_hash,
        })
    }
}

const USER_COLUMNS: &str = "id, name, email, role, password_hash, is_active, last_login, created_at";

#[async_trait]
impl UserRepository for PgUserRepository {
    async fn create_user(
        &self,
        profile: &UserProfile,
        password_hash: &str,
    ) -> Result<(), RepoError> {
        sqlx::query(
            r#"
            INSERT INTO users (id, name, email, role, password_hash, is_active, created_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            "#,
        )
        .bind(profile.id)
        .bind(&profile.name)
        .bind(&profile.email)
        .bind(profile.role.as_str())
        .bind(password_hash)
        .bind(profile.is_active)
        .bind(profile.created_at)
        .execute(&self.pool)
        .await
        .map_err(|e| -> RepoError {
            if matches!(&e, sqlx::Error::Database(db) if db.is_unique_violation()) {
                Box::new(DuplicateKey(format!("email {}", profile.email)))
            } else {
                Box::new(e)
            }
        })?;
        Ok(())
    }

    async fn get_user(
        &self,
        id: Uuid,
    ) -> Result<Option<UserProfile>, RepoError> {
        let row: Option<UserRow> = sqlx::query_as(&format!("SELECT {} FROM users WHERE id = $1", USER_COLUMNS))
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        match row {
            Some(row) => Ok(Some(row.into_credentials()?.profile)),
            None => Ok(None),
        }
    }

    async fn find_by_email(
        &self,
        email: &str,
    ) -> Result<Option<UserCredentials>, RepoError> {
        let row: Option<UserRow> = sqlx::query_as(&format!("SELECT {} FROM users WHERE email = $1", USER_COLUMNS))
            .bind(email)
            .fetch_optional(&self.pool)
            .await?;
        row.map(UserRow::into_credentials).transpose()
    }

    async fn record_login(
        &self,
        id: Uuid,
        at: DateTime<Utc>,
    ) -> Result<(), RepoError> {
        sqlx::query("UPDATE users SET last_login = $1, updated_at = NOW() WHERE id = $2")
            .bind(at)
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(())
    }

    async fn set_active(
        &self,
        id: Uuid,
        active: bool,
    ) -> Result<bool, RepoError> {
        let result = sqlx::query("UPDATE users SET is_active = $1, updated_at = NOW() WHERE id = $2")
            .bind(active)
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    async fn count_users(&self) -> Result<u64, RepoError> {
        let (count,): (i64,) = sqlx::query_as("SELECT COUNT(*) FROM users")
            .fetch_one(&self.pool)
            .await?;
        Ok(count.max(0) as u64)
    }
}
