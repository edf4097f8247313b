use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::errors::{CredentialError, PermissionError};
use crate::types::{Permission, Role, UserId, Vote};

/// bcrypt cost used for stored credentials.
pub const DEFAULT_HASH_COST: u32 = bcrypt::DEFAULT_COST;

/// A user profile.
///
/// `votes` is never persisted; it is attached by the voting engine when a
/// caller asks for a user together with its vote history. The serialized form
/// is also the cache payload, so every field round-trips.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    pub user_id: UserId,
    pub nickname: String,
    pub first_name: String,
    pub last_name: String,
    #[serde(default)]
    pub email: String,
    /// One-way credential hash once the user has been created.
    #[serde(default)]
    pub password: String,
    #[serde(default)]
    pub is_public: bool,
    #[serde(default, rename = "user_role")]
    pub role: Role,
    #[serde(default)]
    pub created_by: Option<UserId>,
    pub created_at: DateTime<Utc>,
    #[serde(default)]
    pub updated_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub deleted_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub login_date: Option<DateTime<Utc>>,
    #[serde(default)]
    pub votes: Vec<Vote>,
}

impl User {
    /// A profile that has not been stored yet. Identity, role and creation
    /// time are reassigned by the user service on creation.
    pub fn new(
        nickname: impl Into<String>,
        first_name: impl Into<String>,
        last_name: impl Into<String>,
        email: impl Into<String>,
        password: impl Into<String>,
    ) -> Self {
        Self {
            user_id: Uuid::nil(),
            nickname: nickname.into(),
            first_name: first_name.into(),
            last_name: last_name.into(),
            email: email.into(),
            password: password.into(),
            is_public: false,
            role: Role::default(),
            created_by: None,
            created_at: Utc::now(),
            updated_at: None,
            deleted_at: None,
            login_date: None,
            votes: Vec::new(),
        }
    }

    pub fn is_admin(&self) -> bool {
        self.role.is_admin()
    }

    /// Checks that this user, acting on another account, may perform `permission`.
    pub fn can(&self, permission: Permission) -> Result<(), PermissionError> {
        if self.is_admin() {
            return Ok(());
        }
        Err(PermissionError::Denied(permission.as_str()))
    }

    /// Replaces the plaintext credential with its bcrypt hash.
    pub fn hash_password(&mut self) -> Result<(), CredentialError> {
        self.hash_password_with_cost(DEFAULT_HASH_COST)
    }

    pub fn hash_password_with_cost(&mut self, cost: u32) -> Result<(), CredentialError> {
        self.password = bcrypt::hash(&self.password, cost)?;
        Ok(())
    }

    /// Checks a plaintext candidate against the stored hash.
    pub fn verify_password(&self, candidate: &str) -> Result<(), CredentialError> {
        match bcrypt::verify(candidate, &self.password) {
            Ok(true) => Ok(()),
            Ok(false) => Err(CredentialError::Mismatch),
            Err(e) => Err(CredentialError::Hash(e)),
        }
    }

    /// Signed sum of the attached votes.
    pub fn rating(&self) -> i64 {
        self.votes.iter().map(|vote| i64::from(vote.vote)).sum()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn user() -> User {
        User::new("nick", "First", "Last", "nick@example.com", "secret-password")
    }

    #[test]
    fn new_user_defaults_to_user_role() {
        let user = user();
        assert_eq!(user.role, Role::User);
        assert!(user.votes.is_empty());
        assert_eq!(user.rating(), 0);
    }

    #[test]
    fn hashed_password_verifies() {
        let mut user = user();
        user.hash_password_with_cost(4).unwrap();

        assert_ne!(user.password, "secret-password");
        assert!(user.verify_password("secret-password").is_ok());
        assert!(matches!(
            user.verify_password("wrong"),
            Err(CredentialError::Mismatch)
        ));
    }

    #[test]
    fn rating_is_signed_sum() {
        let mut user = user();
        let now = Utc::now();
        user.votes = vec![
            Vote::new(1, Uuid::new_v4(), now),
            Vote::new(1, Uuid::new_v4(), now),
            Vote::new(-1, Uuid::new_v4(), now),
        ];
        assert_eq!(user.rating(), 1);
    }

    #[test]
    fn only_admins_act_on_other_accounts() {
        let mut user = user();
        assert_eq!(
            user.can(Permission::Delete),
            Err(PermissionError::Denied("delete"))
        );
        user.role = Role::Admin;
        assert!(user.can(Permission::Update).is_ok());
    }

    #[test]
    fn json_round_trips_every_field() {
        let mut user = user();
        user.user_id = Uuid::new_v4();
        user.created_by = Some(Uuid::new_v4());
        user.updated_at = Some(Utc::now());
        user.login_date = Some(Utc::now());
        user.role = Role::Moderator;
        let mut vote = Vote::new(-1, user.user_id, Utc::now());
        vote.vote_id = 42;
        user.votes = vec![vote];

        let json = serde_json::to_vec(&user).unwrap();
        let decoded: User = serde_json::from_slice(&json).unwrap();
        assert_eq!(decoded, user);
    }
}
