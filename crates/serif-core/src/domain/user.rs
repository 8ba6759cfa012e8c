use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// User entity - an account in the identity store.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct User {
    pub id: Uuid,
    pub email: String,
    pub password_hash: String,
    /// Signup metadata; backfills the profile on email confirmation.
    pub first_name: Option<String>,
    pub email_verified_at: Option<DateTime<Utc>>,
    pub confirmation_token: Option<String>,
    pub confirmation_sent_at: Option<DateTime<Utc>>,
    pub recovery_token: Option<String>,
    pub recovery_sent_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl User {
    /// Create a new unverified user with a pending confirmation token.
    pub fn new(
        email: String,
        password_hash: String,
        first_name: Option<String>,
        confirmation_token: String,
    ) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4(),
            email,
            password_hash,
            first_name,
            email_verified_at: None,
            confirmation_token: Some(confirmation_token),
            confirmation_sent_at: Some(now),
            recovery_token: None,
            recovery_sent_at: None,
            created_at: now,
            updated_at: now,
        }
    }

    pub fn is_verified(&self) -> bool {
        self.email_verified_at.is_some()
    }

    /// Confirmation links stay valid for 24 hours.
    pub fn confirmation_token_expired(&self, now: DateTime<Utc>) -> bool {
        match self.confirmation_sent_at {
            Some(sent_at) => now - sent_at > Duration::hours(24),
            None => true,
        }
    }

    /// Recovery links stay valid for one hour.
    pub fn recovery_token_expired(&self, now: DateTime<Utc>) -> bool {
        match self.recovery_sent_at {
            Some(sent_at) => now - sent_at > Duration::hours(1),
            None => true,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_users_start_unverified() {
        let user = User::new(
            "ada@example.com".to_owned(),
            "hash".to_owned(),
            Some("Ada".to_owned()),
            "token".to_owned(),
        );
        assert!(!user.is_verified());
        assert!(user.confirmation_token.is_some());
        assert!(user.recovery_token.is_none());
    }

    #[test]
    fn confirmation_token_expires_after_a_day() {
        let user = User::new(
            "ada@example.com".to_owned(),
            "hash".to_owned(),
            Some("Ada".to_owned()),
            "token".to_owned(),
        );
        let sent_at = user.confirmation_sent_at.unwrap();
        assert!(!user.confirmation_token_expired(sent_at + Duration::hours(23)));
        assert!(user.confirmation_token_expired(sent_at + Duration::hours(25)));
    }

    #[test]
    fn recovery_token_expires_after_an_hour() {
        let mut user = User::new(
            "ada@example.com".to_owned(),
            "hash".to_owned(),
            None,
            "token".to_owned(),
        );
        let now = Utc::now();
        user.recovery_token = Some("reset".to_owned());
        user.recovery_sent_at = Some(now);
        assert!(!user.recovery_token_expired(now + Duration::minutes(59)));
        assert!(user.recovery_token_expired(now + Duration::minutes(61)));
    }

    #[test]
    fn missing_sent_timestamp_counts_as_expired() {
        let mut user = User::new(
            "ada@example.com".to_owned(),
            "hash".to_owned(),
            None,
            "token".to_owned(),
        );
        user.confirmation_sent_at = None;
        assert!(user.confirmation_token_expired(Utc::now()));
        assert!(user.recovery_token_expired(Utc::now()));
    }
}
