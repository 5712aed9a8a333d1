use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Role used for access control decisions
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Role {
    Admin,
    #[default]
    User,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Admin => "ADMIN",
            Role::User => "USER",
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Role {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_uppercase().as_str() {
            "ADMIN" => Ok(Role::Admin),
            "USER" => Ok(Role::User),
            _ => Err(format!("Invalid role: {}", s)),
        }
    }
}

/// A user record as held by the store.
///
/// Intentionally not `Serialize`: anything leaving the process goes through
/// [`UserProfile`], which has no password digest.
#[derive(Debug, Clone, PartialEq)]
pub struct User {
    pub id: Uuid,
    pub name: String,
    pub password_hash: String,
    pub full_name: Option<String>,
    pub role: Role,
    pub account_active: bool,
    pub created_at: DateTime<Utc>,
}

impl User {
    pub fn profile(&self) -> UserProfile {
        UserProfile::from(self)
    }
}

/// Public view of a user
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserProfile {
    pub id: Uuid,
    pub name: String,
    pub full_name: Option<String>,
    pub role: Role,
    pub account_active: bool,
}

impl From<&User> for UserProfile {
    fn from(user: &User) -> Self {
        Self {
            id: user.id,
            name: user.name.clone(),
            full_name: user.full_name.clone(),
            role: user.role,
            account_active: user.account_active,
        }
    }
}

/// Input for the user creation flow. Carries the plaintext password.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateUser {
    pub name: String,
    #[serde(default)]
    pub full_name: Option<String>,
    pub password: String,
    /// Defaults to [`Role::User`] when omitted.
    #[serde(default)]
    pub role: Option<Role>,
    /// Defaults to `true` when omitted.
    #[serde(default)]
    pub account_active: Option<bool>,
}

impl CreateUser {
    pub fn new(name: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            full_name: None,
            password: password.into(),
            role: None,
            account_active: None,
        }
    }

    pub fn with_role(mut self, role: Role) -> Self {
        self.role = Some(role);
        self
    }

    pub fn with_full_name(mut self, full_name: impl Into<String>) -> Self {
        self.full_name = Some(full_name.into());
        self
    }
}

/// A hashed, ready-to-persist user record. The store assigns `id` and `created_at`.
#[derive(Debug, Clone)]
pub struct NewUser {
    pub name: String,
    pub password_hash: String,
    pub full_name: Option<String>,
    pub role: Role,
    pub account_active: bool,
}
