use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use validator::Validate;

use super::{full_name, Editable, NamedRef, Resource};
use crate::age_category::age_on;
use crate::form::{rules, Draft, FieldErrors};
use crate::types::{DbId, Timestamp};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Player {
    pub id: DbId,
    pub first_name: String,
    #[serde(default)]
    pub middle_name: Option<String>,
    pub last_name: String,
    #[serde(default)]
    pub date_of_birth: Option<NaiveDate>,
    #[serde(default)]
    pub position: Option<String>,
    #[serde(default)]
    pub mobile: String,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub aadhar_number: String,
    #[serde(default)]
    pub aadhar_verified: bool,
    #[serde(default)]
    pub is_suspended: bool,
    #[serde(default)]
    pub profile_image: Option<String>,
    #[serde(default)]
    pub club_id: Option<DbId>,
    #[serde(default)]
    pub club: Option<NamedRef>,
    #[serde(default)]
    pub group_ids: Vec<DbId>,
    #[serde(default)]
    pub created_at: Option<Timestamp>,
    #[serde(default)]
    pub updated_at: Option<Timestamp>,
}

impl Player {
    pub fn full_name(&self) -> String {
        full_name(&[
            Some(self.first_name.as_str()),
            self.middle_name.as_deref(),
            Some(self.last_name.as_str()),
        ])
    }

    /// Completed years on `today`, when the birth date is known.
    pub fn age_on(&self, today: NaiveDate) -> Option<u32> {
        self.date_of_birth.map(|dob| age_on(dob, today))
    }

    /// Aadhaar number with all but the last four digits masked.
    pub fn masked_aadhar(&self) -> String {
        let digits: Vec<char> = self
            .aadhar_number
            .chars()
            .filter(|c| c.is_ascii_digit())
            .collect();
        let visible = digits.len().saturating_sub(4);
        digits
            .iter()
            .enumerate()
            .map(|(i, c)| if i < visible { 'X' } else { *c })
            .collect()
    }
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct PlayerDraft {
    #[validate(length(min = 1, max = 50, message = "First name is required"))]
    pub first_name: String,
    #[serde(default)]
    pub middle_name: Option<String>,
    #[validate(length(min = 1, max = 50, message = "Last name is required"))]
    pub last_name: String,
    #[serde(default)]
    pub date_of_birth: Option<NaiveDate>,
    #[serde(default)]
    pub position: Option<String>,
    #[validate(custom(function = "rules::mobile"))]
    pub mobile: String,
    #[serde(default)]
    #[validate(email(message = "Enter a valid email address"))]
    pub email: Option<String>,
    #[validate(custom(function = "rules::aadhar"))]
    pub aadhar_number: String,
    #[serde(default)]
    pub club_id: Option<DbId>,
    #[serde(default)]
    #[validate(length(min = 1, message = "Select at least one group"))]
    pub group_ids: Vec<DbId>,
}

impl Resource for Player {
    const COLLECTION: &'static str = "players";
    const LABEL: &'static str = "Player";

    fn id(&self) -> DbId {
        self.id
    }

    fn display_name(&self) -> String {
        self.full_name()
    }
}

impl Editable for Player {
    type Draft = PlayerDraft;
}

impl From<&Player> for PlayerDraft {
    fn from(player: &Player) -> Self {
        Self {
            first_name: player.first_name.clone(),
            middle_name: player.middle_name.clone(),
            last_name: player.last_name.clone(),
            date_of_birth: player.date_of_birth,
            position: player.position.clone(),
            mobile: player.mobile.clone(),
            email: player.email.clone(),
            aadhar_number: player.aadhar_number.clone(),
            club_id: player.club_id,
            group_ids: player.group_ids.clone(),
        }
    }
}

impl Draft for PlayerDraft {
    fn cross_field_errors(&self) -> FieldErrors {
        let mut errors = FieldErrors::new();
        match &self.date_of_birth {
            None => errors.insert("dateOfBirth", "Date of birth is required"),
            Some(dob) => {
                if let Err(e) = rules::not_in_future(dob) {
                    errors.insert("dateOfBirth", rules::describe(&e));
                }
            }
        }
        if self.club_id.is_none() {
            errors.insert("clubId", "Select a club");
        }
        errors
    }
}
