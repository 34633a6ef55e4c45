use serde::{Deserialize, Serialize};
use validator::Validate;

use super::{Editable, NamedRef, Resource};
use crate::form::Draft;
use crate::types::{DbId, Timestamp};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Taluka {
    pub id: DbId,
    pub name: String,
    pub region_id: DbId,
    #[serde(default)]
    pub region: Option<NamedRef>,
    #[serde(default)]
    pub created_at: Option<Timestamp>,
    #[serde(default)]
    pub updated_at: Option<Timestamp>,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct TalukaDraft {
    #[validate(length(min = 2, max = 100, message = "Taluka name must be 2-100 characters"))]
    pub name: String,
    #[validate(range(min = 1, message = "Select a region"))]
    pub region_id: DbId,
}

impl Resource for Taluka {
    const COLLECTION: &'static str = "talukas";
    const LABEL: &'static str = "Taluka";

    fn id(&self) -> DbId {
        self.id
    }

    fn display_name(&self) -> String {
        match &self.region {
            Some(region) => format!("{} ({})", self.name, region.name),
            None => self.name.clone(),
        }
    }
}

impl Editable for Taluka {
    type Draft = TalukaDraft;
}

impl From<&Taluka> for TalukaDraft {
    fn from(taluka: &Taluka) -> Self {
        Self {
            name: taluka.name.clone(),
            region_id: taluka.region_id,
        }
    }
}

impl Draft for TalukaDraft {}
