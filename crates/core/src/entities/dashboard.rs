use serde::{Deserialize, Serialize};

/// Per-module record counts shown on the dashboard.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct DashboardStats {
    pub clubs: u64,
    pub regions: u64,
    pub talukas: u64,
    pub groups: u64,
    pub players: u64,
    pub referees: u64,
    pub competitions: u64,
}

impl DashboardStats {
    /// `(label, count)` rows in sidebar order.
    pub fn rows(&self) -> Vec<(&'static str, u64)> {
        vec![
            ("Clubs", self.clubs),
            ("Regions", self.regions),
            ("Talukas", self.talukas),
            ("Groups", self.groups),
            ("Players", self.players),
            ("Referees", self.referees),
            ("Competitions", self.competitions),
        ]
    }
}
