//! Request and response bodies.
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use usermanager_shared::types::{Role, User, UserId, UserVote, Users, Vote};
use usermanager_usecase::VoteOutcome;

#[derive(Debug, Deserialize)]
pub struct CreateUserRequest {
    pub nickname: String,
    pub first_name: String,
    pub last_name: String,
    #[serde(default)]
    pub email: String,
    pub password: String,
    #[serde(default)]
    pub is_public: bool,
}

impl CreateUserRequest {
    pub fn into_user(self) -> User {
        let mut user = User::new(
            self.nickname,
            self.first_name,
            self.last_name,
            self.email,
            self.password,
        );
        user.is_public = self.is_public;
        user
    }
}

/// Partial profile update; absent fields keep their stored value.
#[derive(Debug, Default, Deserialize)]
pub struct UpdateUserRequest {
    pub nickname: Option<String>,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub email: Option<String>,
    pub is_public: Option<bool>,
    pub role: Option<String>,
}

impl UpdateUserRequest {
    /// Copies the profile fields onto `user`. The role is left to the caller,
    /// which must check it against the acting user first.
    pub fn apply_profile(&mut self, user: &mut User) {
        if let Some(nickname) = self.nickname.take() {
            user.nickname = nickname;
        }
        if let Some(first_name) = self.first_name.take() {
            user.first_name = first_name;
        }
        if let Some(last_name) = self.last_name.take() {
            user.last_name = last_name;
        }
        if let Some(email) = self.email.take() {
            user.email = email;
        }
        if let Some(is_public) = self.is_public {
            user.is_public = is_public;
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct ListUsersQuery {
    #[serde(default)]
    pub page: String,
    #[serde(default)]
    pub size: String,
    #[serde(default, rename = "orderBy")]
    pub order_by: String,
}

#[derive(Debug, Deserialize)]
pub struct VoteRequest {
    /// The user being voted on.
    pub user_id: UserId,
    pub vote: i32,
}

#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub nickname: String,
    pub password: String,
}

/// Public view of a user. The credential hash never leaves the service.
#[derive(Debug, Serialize)]
pub struct UserResponse {
    pub user_id: UserId,
    pub nickname: String,
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub is_public: bool,
    pub role: Role,
    pub created_at: DateTime<Utc>,
    pub updated_at: Option<DateTime<Utc>>,
    pub login_date: Option<DateTime<Utc>>,
    pub rating: i64,
    pub votes: Vec<Vote>,
}

impl From<User> for UserResponse {
    fn from(user: User) -> Self {
        Self {
            rating: user.rating(),
            user_id: user.user_id,
            nickname: user.nickname,
            first_name: user.first_name,
            last_name: user.last_name,
            email: user.email,
            is_public: user.is_public,
            role: user.role,
            created_at: user.created_at,
            updated_at: user.updated_at,
            login_date: user.login_date,
            votes: user.votes,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct UsersResponse {
    pub page: i64,
    pub has_more: bool,
    pub users: Vec<UserResponse>,
}

impl From<Users> for UsersResponse {
    fn from(users: Users) -> Self {
        Self {
            page: users.page,
            has_more: users.has_more,
            users: users.items.into_iter().map(UserResponse::from).collect(),
        }
    }
}

#[derive(Debug, Serialize)]
pub struct VoteResponse {
    pub status: &'static str,
    pub vote: Option<Vote>,
    pub user_vote: Option<UserVote>,
}

impl From<VoteOutcome> for VoteResponse {
    fn from(outcome: VoteOutcome) -> Self {
        Self {
            status: outcome.as_str(),
            vote: outcome.vote().cloned(),
            user_vote: outcome.user_vote().cloned(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_user_response_hides_password() {
        let user = User::new("alice", "Alice", "Liddell", "alice@example.com", "secret");
        let json = serde_json::to_value(UserResponse::from(user)).unwrap();

        assert!(json.get("password").is_none());
        assert_eq!(json["role"], "user");
        assert_eq!(json["rating"], 0);
    }

    #[test]
    fn test_update_request_keeps_absent_fields() {
        let mut user = User::new("alice", "Alice", "Liddell", "alice@example.com", "secret");
        let mut request = UpdateUserRequest {
            first_name: Some("Alicia".to_string()),
            is_public: Some(true),
            ..UpdateUserRequest::default()
        };

        request.apply_profile(&mut user);

        assert_eq!(user.first_name, "Alicia");
        assert_eq!(user.nickname, "alice");
        assert!(user.is_public);
    }
}
