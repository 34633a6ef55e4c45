//! The signed-in user as persisted on this machine.
//!
//! The console consumes exactly one thing from the session: the current
//! user's role, or none.

use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::error::CoreError;
use crate::form::FieldErrors;
use crate::navigation::{can_access, Screen};
use crate::roles::Role;
use crate::types::DbId;

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionUser {
    #[serde(default)]
    pub id: Option<DbId>,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub role: String,
    #[serde(default)]
    pub club_id: Option<DbId>,
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Session {
    #[serde(default)]
    pub token: Option<String>,
    pub user: SessionUser,
}

impl Session {
    pub fn role(&self) -> Option<Role> {
        Role::parse(&self.user.role)
    }
}

/// Role of an optional session.
pub fn current_role(session: Option<&Session>) -> Option<Role> {
    session.and_then(Session::role)
}

/// Allow opening `screen` only for a session whose role lists it.
pub fn authorize(session: Option<&Session>, screen: Screen) -> Result<(), CoreError> {
    let Some(session) = session else {
        return Err(CoreError::Unauthorized("not signed in".into()));
    };
    if can_access(session.role(), screen) {
        Ok(())
    } else {
        Err(CoreError::Unauthorized(format!(
            "the {} role cannot open {}",
            session.user.role,
            screen.label()
        )))
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct LoginRequest {
    #[validate(email(message = "Enter a valid email address"))]
    pub email: String,
    #[validate(length(min = 1, message = "Password is required"))]
    pub password: String,
}

impl LoginRequest {
    /// Validate the credentials, joining every message into one error.
    pub fn check(&self) -> Result<(), CoreError> {
        match self.validate() {
            Ok(()) => Ok(()),
            Err(e) => {
                let errors = FieldErrors::from_validation(&e);
                let joined = errors
                    .iter()
                    .map(|(_, message)| message)
                    .collect::<Vec<_>>()
                    .join("; ");
                Err(CoreError::Validation(joined))
            }
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct LoginResponse {
    pub token: String,
    pub user: SessionUser,
}

impl From<LoginResponse> for Session {
    fn from(response: LoginResponse) -> Self {
        Self {
            token: Some(response.token),
            user: response.user,
        }
    }
}
