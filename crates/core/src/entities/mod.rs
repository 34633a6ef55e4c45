//! Records mirrored from the API and the drafts used to edit them.
//!
//! Records are read-only views of server state. Each editable record has a
//! draft type holding only its editable fields; `Draft::from(&record)`
//! hydrates an edit form.

use serde::de::DeserializeOwned;
use serde::Serialize;

use crate::form::Draft;
use crate::types::DbId;

pub mod club;
pub mod competition;
pub mod dashboard;
pub mod group;
pub mod player;
pub mod referee;
pub mod region;
pub mod taluka;

pub use club::{Club, ClubDraft};
pub use competition::{Competition, CompetitionDraft};
pub use dashboard::DashboardStats;
pub use group::{Gender, Group, GroupDraft};
pub use player::{Player, PlayerDraft};
pub use referee::{Referee, RefereeDraft};
pub use region::{Region, RegionDraft};
pub use taluka::{Taluka, TalukaDraft};

/// A record served from a collection endpoint.
pub trait Resource: DeserializeOwned + Serialize + Clone + Send + Sync + 'static {
    /// Path segment of the collection, e.g. `"clubs"`.
    const COLLECTION: &'static str;

    /// Singular display label, e.g. `"Club"`.
    const LABEL: &'static str;

    fn id(&self) -> DbId;

    /// Short text identifying the record in tables and messages.
    fn display_name(&self) -> String;
}

/// A record the console can create and update.
pub trait Editable: Resource {
    type Draft: Draft + DeserializeOwned + Default + Clone + Send + Sync + for<'a> From<&'a Self>;
}

/// Join optional name parts with single spaces.
pub(crate) fn full_name(parts: &[Option<&str>]) -> String {
    parts
        .iter()
        .flatten()
        .map(|p| p.trim())
        .filter(|p| !p.is_empty())
        .collect::<Vec<_>>()
        .join(" ")
}

/// A reference to a related record as embedded by the server.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, serde::Deserialize)]
pub struct NamedRef {
    pub id: DbId,
    #[serde(alias = "clubName", alias = "groupName")]
    pub name: String,
}
