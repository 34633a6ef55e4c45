use serde::{Deserialize, Serialize};
use validator::Validate;

use super::{full_name, Editable, Resource};
use crate::form::{rules, Draft, FieldErrors};
use crate::types::{DbId, Timestamp};

// The API has served the exam year under more than one name; both are read
// and `examPassingYear` is written.

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Referee {
    pub id: DbId,
    pub first_name: String,
    pub last_name: String,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub mobile: String,
    #[serde(default)]
    pub address: Option<String>,
    #[serde(default)]
    pub referee_level: Option<String>,
    #[serde(default, alias = "examYear", alias = "passingYear")]
    pub exam_passing_year: Option<i32>,
    #[serde(default)]
    pub created_at: Option<Timestamp>,
    #[serde(default)]
    pub updated_at: Option<Timestamp>,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct RefereeDraft {
    #[validate(length(min = 1, max = 50, message = "First name is required"))]
    pub first_name: String,
    #[validate(length(min = 1, max = 50, message = "Last name is required"))]
    pub last_name: String,
    #[validate(email(message = "Enter a valid email address"))]
    pub email: String,
    #[validate(custom(function = "rules::mobile"))]
    pub mobile: String,
    #[serde(default)]
    pub address: Option<String>,
    #[serde(default)]
    pub referee_level: Option<String>,
    #[serde(default, alias = "examYear", alias = "passingYear")]
    pub exam_passing_year: Option<i32>,
}

impl Resource for Referee {
    const COLLECTION: &'static str = "referees";
    const LABEL: &'static str = "Referee";

    fn id(&self) -> DbId {
        self.id
    }

    fn display_name(&self) -> String {
        full_name(&[Some(self.first_name.as_str()), Some(self.last_name.as_str())])
    }
}

impl Editable for Referee {
    type Draft = RefereeDraft;
}

impl From<&Referee> for RefereeDraft {
    fn from(referee: &Referee) -> Self {
        Self {
            first_name: referee.first_name.clone(),
            last_name: referee.last_name.clone(),
            email: referee.email.clone(),
            mobile: referee.mobile.clone(),
            address: referee.address.clone(),
            referee_level: referee.referee_level.clone(),
            exam_passing_year: referee.exam_passing_year,
        }
    }
}

impl Draft for RefereeDraft {
    fn cross_field_errors(&self) -> FieldErrors {
        let mut errors = FieldErrors::new();
        if let Some(year) = self.exam_passing_year {
            if let Err(e) = rules::exam_year(year) {
                errors.insert("examPassingYear", rules::describe(&e));
            }
        }
        errors
    }
}
