use serde::{Deserialize, Serialize};
use validator::Validate;

use super::{Editable, Resource};
use crate::form::Draft;
use crate::types::{DbId, Timestamp};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Region {
    pub id: DbId,
    pub name: String,
    #[serde(default)]
    pub code: Option<String>,
    #[serde(default)]
    pub taluka_count: Option<u32>,
    #[serde(default)]
    pub created_at: Option<Timestamp>,
    #[serde(default)]
    pub updated_at: Option<Timestamp>,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct RegionDraft {
    #[validate(length(min = 2, max = 100, message = "Region name must be 2-100 characters"))]
    pub name: String,
    #[serde(default)]
    #[validate(length(max = 10, message = "Region code must be at most 10 characters"))]
    pub code: Option<String>,
}

impl Resource for Region {
    const COLLECTION: &'static str = "regions";
    const LABEL: &'static str = "Region";

    fn id(&self) -> DbId {
        self.id
    }

    fn display_name(&self) -> String {
        self.name.clone()
    }
}

impl Editable for Region {
    type Draft = RegionDraft;
}

impl From<&Region> for RegionDraft {
    fn from(region: &Region) -> Self {
        Self {
            name: region.name.clone(),
            code: region.code.clone(),
        }
    }
}

impl Draft for RegionDraft {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn short_name_is_rejected() {
        let draft = RegionDraft {
            name: "K".into(),
            code: None,
        };
        assert_eq!(
            draft.check().get("name"),
            Some("Region name must be 2-100 characters")
        );
    }

    #[test]
    fn hydrated_draft_copies_editable_fields() {
        let region: Region = serde_json::from_value(serde_json::json!({
            "id": 3, "name": "Kolhapur", "code": "KOP", "talukaCount": 12
        }))
        .unwrap();
        let draft = RegionDraft::from(&region);
        assert_eq!(draft.name, "Kolhapur");
        assert_eq!(draft.code.as_deref(), Some("KOP"));
        assert!(draft.check().is_empty());
    }
}
