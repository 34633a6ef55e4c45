use serde::{Deserialize, Serialize};
use validator::Validate;

use super::{Editable, NamedRef, Resource};
use crate::form::{rules, Draft};
use crate::types::{DbId, Timestamp};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Club {
    pub id: DbId,
    pub club_name: String,
    #[serde(default)]
    pub affiliation_number: Option<String>,
    pub region_id: DbId,
    #[serde(default)]
    pub region: Option<NamedRef>,
    #[serde(default)]
    pub taluka_id: Option<DbId>,
    #[serde(default)]
    pub address: String,
    #[serde(default)]
    pub city: Option<String>,
    #[serde(default)]
    pub mobile: String,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub contact_person: String,
    #[serde(default)]
    pub player_count: Option<u32>,
    #[serde(default)]
    pub created_at: Option<Timestamp>,
    #[serde(default)]
    pub updated_at: Option<Timestamp>,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct ClubDraft {
    #[validate(length(min = 2, max = 150, message = "Club name must be 2-150 characters"))]
    pub club_name: String,
    #[serde(default)]
    #[validate(length(max = 50, message = "Affiliation number is too long"))]
    pub affiliation_number: Option<String>,
    #[validate(range(min = 1, message = "Select a region"))]
    pub region_id: DbId,
    #[serde(default)]
    pub taluka_id: Option<DbId>,
    #[validate(length(min = 1, message = "Address is required"))]
    pub address: String,
    #[serde(default)]
    pub city: Option<String>,
    #[validate(custom(function = "rules::mobile"))]
    pub mobile: String,
    #[validate(email(message = "Enter a valid email address"))]
    pub email: String,
    #[validate(length(min = 1, message = "Contact person is required"))]
    pub contact_person: String,
}

impl Resource for Club {
    const COLLECTION: &'static str = "clubs";
    const LABEL: &'static str = "Club";

    fn id(&self) -> DbId {
        self.id
    }

    fn display_name(&self) -> String {
        self.club_name.clone()
    }
}

impl Editable for Club {
    type Draft = ClubDraft;
}

impl From<&Club> for ClubDraft {
    fn from(club: &Club) -> Self {
        Self {
            club_name: club.club_name.clone(),
            affiliation_number: club.affiliation_number.clone(),
            region_id: club.region_id,
            taluka_id: club.taluka_id,
            address: club.address.clone(),
            city: club.city.clone(),
            mobile: club.mobile.clone(),
            email: club.email.clone(),
            contact_person: club.contact_person.clone(),
        }
    }
}

impl Draft for ClubDraft {}
