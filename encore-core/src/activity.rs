use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use std::sync::Arc;
use uuid::Uuid;

use crate::repository::ActivityRepository;

/// Upper bound on entries returned by one activity listing.
pub const MAX_ACTIVITY_LIMIT: usize = 500;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum ActivityType {
    Registration,
    Login,
    Logout,
    Booking,
    Review,
    AccountDeletion,
}

impl ActivityType {
    pub fn as_str(&self) -> &'static str {
        match self {
            ActivityType::Registration => "registration",
            ActivityType::Login => "login",
            ActivityType::Logout => "logout",
            ActivityType::Booking => "booking",
            ActivityType::Review => "review",
            ActivityType::AccountDeletion => "account_deletion",
        }
    }
}

impl fmt::Display for ActivityType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ActivityType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "registration" => Ok(ActivityType::Registration),
            "login" => Ok(ActivityType::Login),
            "logout" => Ok(ActivityType::Logout),
            "booking" => Ok(ActivityType::Booking),
            "review" => Ok(ActivityType::Review),
            "account_deletion" => Ok(ActivityType::AccountDeletion),
            other => Err(format!("unknown activity type: {}", other)),
        }
    }
}

/// One audit-trail entry. Never updated once written.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct UserActivity {
    pub id: Uuid,
    pub user_id: Uuid,
    pub activity_type: ActivityType,
    pub description: String,
    pub metadata: serde_json::Value,
    pub created_at: DateTime<Utc>,
}

impl UserActivity {
    pub fn new(
        user_id: Uuid,
        activity_type: ActivityType,
        description: impl Into<String>,
        metadata: Option<serde_json::Value>,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            user_id,
            activity_type,
            description: description.into(),
            metadata: metadata.unwrap_or_else(|| serde_json::json!({})),
            created_at: Utc::now(),
        }
    }
}

/// Writes activity entries on behalf of other services.
///
/// The audit trail is best effort: a failed write is logged and swallowed so
/// it never aborts the action being audited.
#[derive(Clone)]
pub struct ActivityLogger {
    repo: Arc<dyn ActivityRepository>,
}

impl ActivityLogger {
    pub fn new(repo: Arc<dyn ActivityRepository>) -> Self {
        Self { repo }
    }

    pub async fn log(
        &self,
        user_id: Uuid,
        activity_type: ActivityType,
        description: impl Into<String>,
        metadata: Option<serde_json::Value>,
    ) -> bool {
        let entry = UserActivity::new(user_id, activity_type, description, metadata);
        match self.repo.record_activity(&entry).await {
            Ok(()) => true,
            Err(e) => {
                tracing::warn!("Failed to log {} activity for {}: {}", activity_type, user_id, e);
                false
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::repository::RepoError;
    use async_trait::async_trait;
    use tokio::sync::Mutex;

    #[derive(Default)]
    struct RecordingRepo {
        entries: Mutex<Vec<UserActivity>>,
        fail: bool,
    }

    #[async_trait]
    impl ActivityRepository for RecordingRepo {
        async fn record_activity(&self, activity: &UserActivity) -> Result<(), RepoError> {
            if self.fail {
                return Err("store offline".into());
            }
            self.entries.lock().await.push(activity.clone());
            Ok(())
        }

        async fn list_for_user(&self, user_id: Uuid, _limit: usize) -> Result<Vec<UserActivity>, RepoError> {
            Ok(self.entries.lock().await.iter().filter(|a| a.user_id == user_id).cloned().collect())
        }

        async fn list_recent(&self, _limit: usize) -> Result<Vec<UserActivity>, RepoError> {
            Ok(self.entries.lock().await.clone())
        }
    }

    #[tokio::test]
    async fn test_logger_defaults_metadata() {
        let repo = Arc::new(RecordingRepo::default());
        let logger = ActivityLogger::new(repo.clone());
        let user_id = Uuid::new_v4();

        assert!(logger.log(user_id, ActivityType::Login, "User logged in", None).await);

        let entries = repo.entries.lock().await;
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].activity_type, ActivityType::Login);
        assert_eq!(entries[0].metadata, serde_json::json!({}));
    }

    #[tokio::test]
    async fn test_logger_swallows_store_errors() {
        let repo = Arc::new(RecordingRepo { fail: true, ..Default::default() });
        let logger = ActivityLogger::new(repo);
        assert!(!logger.log(Uuid::new_v4(), ActivityType::Logout, "User logged out", None).await);
    }

    #[test]
    fn test_activity_type_tags() {
        assert_eq!(ActivityType::AccountDeletion.as_str(), "account_deletion");
        assert_eq!("review".parse::<ActivityType>().unwrap(), ActivityType::Review);
        assert_eq!(
            serde_json::to_string(&ActivityType::AccountDeletion).unwrap(),
            "\"account_deletion\""
        );
    }
}
