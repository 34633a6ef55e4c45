//! Well-known role names.
//!
//! These must match the role strings the API stores on user accounts.

use serde::{Deserialize, Serialize};

pub const ROLE_ADMIN: &str = "admin";
pub const ROLE_CLUB_ADMIN: &str = "clubadmin";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Admin,
    ClubAdmin,
}

impl Role {
    /// Parse a stored role string. Unrecognized roles yield `None`.
    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            ROLE_ADMIN => Some(Self::Admin),
            ROLE_CLUB_ADMIN | "club_admin" => Some(Self::ClubAdmin),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Admin => ROLE_ADMIN,
            Self::ClubAdmin => ROLE_CLUB_ADMIN,
        }
    }
}
