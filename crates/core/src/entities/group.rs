use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use validator::Validate;

use super::{Editable, Resource};
use crate::age_category::age_category_today;
use crate::form::{rules, Draft, FieldErrors};
use crate::types::{DbId, Timestamp};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum Gender {
    #[default]
    Men,
    Women,
    Boys,
    Girls,
}

impl Gender {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Men => "Men",
            Self::Women => "Women",
            Self::Boys => "Boys",
            Self::Girls => "Girls",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Group {
    pub id: DbId,
    pub group_name: String,
    pub gender: Gender,
    pub age_limit: String,
    #[serde(default)]
    pub age_eligibility_date: Option<NaiveDate>,
    #[serde(default)]
    pub created_at: Option<Timestamp>,
    #[serde(default)]
    pub updated_at: Option<Timestamp>,
}

impl Group {
    /// The bracket derived from the eligibility date, falling back to the
    /// stored label when no date is set.
    pub fn age_category(&self) -> String {
        self.age_eligibility_date
            .map(age_category_today)
            .unwrap_or_else(|| self.age_limit.clone())
    }
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct GroupDraft {
    #[validate(length(min = 1, max = 100, message = "Group name is required"))]
    pub group_name: String,
    pub gender: Gender,
    #[validate(custom(function = "rules::age_limit_label"))]
    pub age_limit: String,
    #[serde(default)]
    pub age_eligibility_date: Option<NaiveDate>,
}

impl Resource for Group {
    const COLLECTION: &'static str = "groups";
    const LABEL: &'static str = "Group";

    fn id(&self) -> DbId {
        self.id
    }

    fn display_name(&self) -> String {
        format!("{} {} ({})", self.group_name, self.gender.as_str(), self.age_limit)
    }
}

impl Editable for Group {
    type Draft = GroupDraft;
}

impl From<&Group> for GroupDraft {
    fn from(group: &Group) -> Self {
        Self {
            group_name: group.group_name.clone(),
            gender: group.gender,
            age_limit: group.age_limit.clone(),
            age_eligibility_date: group.age_eligibility_date,
        }
    }
}

impl Draft for GroupDraft {
    fn cross_field_errors(&self) -> FieldErrors {
        let mut errors = FieldErrors::new();
        if let Some(date) = &self.age_eligibility_date {
            if let Err(e) = rules::not_in_future(date) {
                errors.insert("ageEligibilityDate", rules::describe(&e));
            }
        }
        errors
    }
}
