use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::errors::{is_email, ValidationErrors};

/// Registration input
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SignUpInput {
    pub email: String,
    pub password: String,
    pub full_name: String,
    /// When given, must equal `password`.
    #[serde(default)]
    pub confirm_password: Option<String>,
}

impl SignUpInput {
    pub fn validate(&self) -> ValidationErrors {
        let mut errs = ValidationErrors::new();
        errs.check(self.full_name.trim().chars().count() >= 2, "full_name", "Full name must be at least 2 characters");
        errs.check(is_email(&self.email), "email", "Please enter a valid email address");
        errs.check(self.password.chars().count() >= 6, "password", "Password must be at least 6 characters");
        if let Some(confirm) = &self.confirm_password {
            errs.check(confirm == &self.password, "confirm_password", "Passwords don't match");
        }
        errs
    }
}

/// Login input
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SignInInput {
    pub email: String,
    pub password: String,
}

/// Domain user (business view)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuthUser {
    pub id: Uuid,
    pub email: String,
}

/// Public profile; `id` equals the account id.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Profile {
    pub id: Uuid,
    pub full_name: String,
    pub avatar_url: Option<String>,
    pub email: String,
}

impl From<models::profile::Model> for Profile {
    fn from(m: models::profile::Model) -> Self {
        Self { id: m.id, full_name: m.full_name, avatar_url: m.avatar_url, email: m.email }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProfileUpdate {
    pub full_name: String,
    #[serde(default)]
    pub avatar_url: Option<String>,
}

/// Domain credentials (hashed)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Credentials {
    pub user_id: Uuid,
    pub password_hash: String,
    pub password_algorithm: String,
}

/// Login result (session)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuthSession {
    pub user: AuthUser,
    pub profile: Profile,
    pub token: String,
}

/// JWT claims for session and reset tokens.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    pub sub: String,
    pub uid: String,
    pub email: String,
    pub exp: usize,
    /// Set to `"reset"` on password-reset tokens; absent on sessions.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub purpose: Option<String>,
}
