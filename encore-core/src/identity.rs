use std::collections::HashSet;
use std::sync::Arc;

use argon2::password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString};
use argon2::Argon2;
use chrono::Utc;
use uuid::Uuid;

use crate::activity::{ActivityLogger, ActivityType};
use crate::repository::UserRepository;
use crate::user::{normalize_email, Role, UserProfile};
use crate::{CoreError, CoreResult};

pub const MIN_PASSWORD_LEN: usize = 6;

const SALT_LEN: usize = 16;

const EMAIL_TAKEN: &str = "Email is already registered";

/// Argon2id hash in PHC string form (`$argon2id$v=19$...`).
pub fn hash_password(password: &str) -> CoreResult<String> {
    let salt_bytes: [u8; SALT_LEN] = rand::random();
    let salt = SaltString::encode_b64(&salt_bytes)
        .map_err(|e| CoreError::InternalError(format!("Salt encoding failed: {}", e)))?;
    let hash = Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map_err(|e| CoreError::InternalError(format!("Password hashing failed: {}", e)))?;
    Ok(hash.to_string())
}

/// Constant-time check against a stored PHC string. Malformed hashes never match.
pub fn verify_password(password: &str, stored: &str) -> bool {
    let Ok(parsed) = PasswordHash::new(stored) else {
        return false;
    };
    Argon2::default()
        .verify_password(password.as_bytes(), &parsed)
        .is_ok()
}

/// Account lifecycle: sign-up, sign-in, sign-out and soft deletion.
///
/// Every transition leaves one entry in the activity trail.
#[derive(Clone)]
pub struct AuthService {
    users: Arc<dyn UserRepository>,
    activity: ActivityLogger,
    admin_emails: HashSet<String>,
}

impl AuthService {
    pub fn new(users: Arc<dyn UserRepository>, activity: ActivityLogger) -> Self {
        Self {
            users,
            activity,
            admin_emails: HashSet::new(),
        }
    }

    /// Accounts registered with one of these emails get the admin role.
    pub fn with_admin_emails<I, S>(mut self, emails: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        self.admin_emails = emails.into_iter().map(|e| normalize_email(e.as_ref())).collect();
        self
    }

    pub async fn sign_up(&self, name: &str, email: &str, password: &str) -> CoreResult<UserProfile> {
        let name = name.trim();
        let email = normalize_email(email);

        if name.is_empty() {
            return Err(CoreError::ValidationError("Name is required".to_string()));
        }
        if email.is_empty() || !email.contains('@') {
            return Err(CoreError::ValidationError("A valid email is required".to_string()));
        }
        if password.chars().count() < MIN_PASSWORD_LEN {
            return Err(CoreError::ValidationError(format!(
                "Password must be at least {} characters",
                MIN_PASSWORD_LEN
            )));
        }
        if self.users.find_by_email(&email).await?.is_some() {
            return Err(CoreError::Conflict(EMAIL_TAKEN.to_string()));
        }

        let role = if self.admin_emails.contains(&email) { Role::Admin } else { Role::User };
        let profile = UserProfile::new(name.to_string(), email, role);
        let password_hash = hash_password(password)?;
        // A racing sign-up can pass the lookup above; the store's unique key decides.
        self.users
            .create_user(&profile, &password_hash)
            .await
            .map_err(|e| match CoreError::from(e) {
                CoreError::Conflict(_) => CoreError::Conflict(EMAIL_TAKEN.to_string()),
                other => other,
            })?;

        tracing::info!("Registered user {} ({})", profile.id, role);
        self.activity
            .log(profile.id, ActivityType::Registration, "Account created", None)
            .await;

        Ok(profile)
    }

    pub async fn sign_in(&self, email: &str, password: &str) -> CoreResult<UserProfile> {
        let email = normalize_email(email);
        let credentials = self
            .users
            .find_by_email(&email)
            .await?
            .ok_or_else(|| CoreError::IdentityError("Invalid email or password".to_string()))?;

        if !verify_password(password, &credentials.password_hash) {
            return Err(CoreError::IdentityError("Invalid email or password".to_string()));
        }
        if !credentials.profile.is_active {
            return Err(CoreError::IdentityError("Account is deactivated".to_string()));
        }

        let now = Utc::now();
        self.users.record_login(credentials.profile.id, now).await?;

        let mut profile = credentials.profile;
        profile.last_login = Some(now);

        tracing::info!("User {} signed in", profile.id);
        self.activity
            .log(profile.id, ActivityType::Login, "User logged in", None)
            .await;

        Ok(profile)
    }

    pub async fn sign_out(&self, user_id: Uuid) {
        self.activity
            .log(user_id, ActivityType::Logout, "User logged out", None)
            .await;
    }

    /// Hydrates the profile behind an existing session. Deactivated accounts
    /// resolve to `None` just like missing ones.
    pub async fn current_user(&self, user_id: Uuid) -> CoreResult<Option<UserProfile>> {
        let profile = self.users.get_user(user_id).await?;
        Ok(profile.filter(|p| p.is_active))
    }

    /// Soft delete: the row stays, flagged inactive.
    pub async fn delete_account(&self, user_id: Uuid) -> CoreResult<()> {
        self.activity
            .log(user_id, ActivityType::AccountDeletion, "User deleted their account", None)
            .await;

        if !self.users.set_active(user_id, false).await? {
            return Err(CoreError::NotFound(format!("User {}", user_id)));
        }
        tracing::info!("User {} deactivated", user_id);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_password_hash_round_trip() {
        let stored = hash_password("s3cret-pass").unwrap();
        assert!(stored.starts_with("$argon2id$"));
        assert!(verify_password("s3cret-pass", &stored));
        assert!(!verify_password("wrong-pass", &stored));
        assert!(!verify_password("s3cret-pass", "garbage"));
    }

    #[test]
    fn test_hashes_are_salted() {
        assert_ne!(hash_password("same").unwrap(), hash_password("same").unwrap());
    }
}
