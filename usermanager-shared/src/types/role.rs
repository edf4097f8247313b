use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::errors::PermissionError;

/// Access level of a user account.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    #[default]
    User,
    Moderator,
    Admin,
}

impl Role {
    pub const ALL: [Role; 3] = [Role::User, Role::Moderator, Role::Admin];

    pub fn as_str(&self) -> &'static str {
        match self {
            Role::User => "user",
            Role::Moderator => "moderator",
            Role::Admin => "admin",
        }
    }

    pub fn is_admin(&self) -> bool {
        matches!(self, Role::Admin)
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Role {
    type Err = PermissionError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "user" => Ok(Role::User),
            "moderator" => Ok(Role::Moderator),
            "admin" => Ok(Role::Admin),
            other => Err(PermissionError::UnknownRole(other.to_string())),
        }
    }
}

/// Operations on another user's account that require elevated rights.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Permission {
    Update,
    Delete,
}

impl Permission {
    pub fn as_str(&self) -> &'static str {
        match self {
            Permission::Update => "update",
            Permission::Delete => "delete",
        }
    }
}

/// Rejects granting `role` unless the acting role is already admin.
pub fn ensure_role_assignable(actor: Role, role: Role) -> Result<(), PermissionError> {
    if role.is_admin() && !actor.is_admin() {
        return Err(PermissionError::RoleElevation(role.as_str()));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn role_names_round_trip() {
        for role in Role::ALL {
            assert_eq!(role.as_str().parse::<Role>().unwrap(), role);
        }
    }

    #[test]
    fn unknown_role_is_rejected() {
        assert_eq!(
            "root".parse::<Role>(),
            Err(PermissionError::UnknownRole("root".to_string()))
        );
    }

    #[test]
    fn only_admin_grants_admin() {
        assert!(ensure_role_assignable(Role::Admin, Role::Admin).is_ok());
        assert!(ensure_role_assignable(Role::User, Role::Moderator).is_ok());
        assert_eq!(
            ensure_role_assignable(Role::Moderator, Role::Admin),
            Err(PermissionError::RoleElevation("admin"))
        );
    }
}
