use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use validator::Validate;

use super::{Editable, NamedRef, Resource};
use crate::age_category::age_category_today;
use crate::form::{Draft, FieldErrors};
use crate::types::{DbId, Timestamp};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Competition {
    pub id: DbId,
    pub competition_name: String,
    pub max_players: u32,
    pub from_date: NaiveDate,
    pub to_date: NaiveDate,
    #[serde(default)]
    pub age_eligibility_date: Option<NaiveDate>,
    #[serde(default)]
    pub last_entry_date: Option<NaiveDate>,
    #[serde(default)]
    pub age_category: Option<String>,
    #[serde(default)]
    pub club_ids: Vec<DbId>,
    #[serde(default)]
    pub group_ids: Vec<DbId>,
    #[serde(default)]
    pub clubs: Vec<NamedRef>,
    #[serde(default)]
    pub groups: Vec<NamedRef>,
    #[serde(default)]
    pub created_at: Option<Timestamp>,
    #[serde(default)]
    pub updated_at: Option<Timestamp>,
}

impl Competition {
    /// The server's category when present, else one derived from the
    /// eligibility date.
    pub fn category(&self) -> Option<String> {
        self.age_category
            .clone()
            .filter(|c| !c.trim().is_empty())
            .or_else(|| self.age_eligibility_date.map(age_category_today))
    }

    /// Whether entries are still accepted on `today`.
    pub fn accepts_entries_on(&self, today: NaiveDate) -> bool {
        today <= self.last_entry_date.unwrap_or(self.from_date)
    }
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct CompetitionDraft {
    #[validate(length(min = 2, max = 150, message = "Competition name is required"))]
    pub competition_name: String,
    #[validate(range(min = 1, max = 100, message = "Max players must be between 1 and 100"))]
    pub max_players: u32,
    #[serde(default)]
    pub from_date: Option<NaiveDate>,
    #[serde(default)]
    pub to_date: Option<NaiveDate>,
    #[serde(default)]
    pub age_eligibility_date: Option<NaiveDate>,
    #[serde(default)]
    pub last_entry_date: Option<NaiveDate>,
    #[serde(default)]
    pub club_ids: Vec<DbId>,
    #[serde(default)]
    #[validate(length(min = 1, message = "Select at least one group"))]
    pub group_ids: Vec<DbId>,
}

impl Resource for Competition {
    const COLLECTION: &'static str = "competitions";
    const LABEL: &'static str = "Competition";

    fn id(&self) -> DbId {
        self.id
    }

    fn display_name(&self) -> String {
        self.competition_name.clone()
    }
}

impl Editable for Competition {
    type Draft = CompetitionDraft;
}

impl From<&Competition> for CompetitionDraft {
    fn from(competition: &Competition) -> Self {
        Self {
            competition_name: competition.competition_name.clone(),
            max_players: competition.max_players,
            from_date: Some(competition.from_date),
            to_date: Some(competition.to_date),
            age_eligibility_date: competition.age_eligibility_date,
            last_entry_date: competition.last_entry_date,
            club_ids: competition.club_ids.clone(),
            group_ids: competition.group_ids.clone(),
        }
    }
}

impl Draft for CompetitionDraft {
    fn cross_field_errors(&self) -> FieldErrors {
        let mut errors = FieldErrors::new();
        if self.from_date.is_none() {
            errors.insert("fromDate", "Start date is required");
        }
        if self.to_date.is_none() {
            errors.insert("toDate", "End date is required");
        }
        if self.age_eligibility_date.is_none() {
            errors.insert("ageEligibilityDate", "Age eligibility date is required");
        }
        if let (Some(from), Some(to)) = (self.from_date, self.to_date) {
            if from > to {
                errors.insert("toDate", "End date must be on or after the start date");
            }
        }
        if let (Some(last), Some(from)) = (self.last_entry_date, self.from_date) {
            if last > from {
                errors.insert("lastEntryDate", "Last entry date must be on or before the start date");
            }
        }
        errors
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> Option<NaiveDate> {
        NaiveDate::from_ymd_opt(y, m, d)
    }

    fn draft() -> CompetitionDraft {
        CompetitionDraft {
            competition_name: "District Championship".into(),
            max_players: 12,
            from_date: date(2025, 1, 10),
            to_date: date(2025, 1, 12),
            age_eligibility_date: date(2007, 1, 1),
            last_entry_date: date(2025, 1, 5),
            club_ids: vec![1, 2],
            group_ids: vec![3],
        }
    }

    #[test]
    fn valid_competition_passes() {
        assert!(draft().check().is_empty());
    }

    #[test]
    fn reversed_dates_blame_end_date() {
        let errors = CompetitionDraft {
            to_date: date(2025, 1, 9),
            ..draft()
        }
        .check();
        assert_eq!(
            errors.get("toDate"),
            Some("End date must be on or after the start date")
        );
    }

    #[test]
    fn late_entry_deadline_is_rejected() {
        let errors = CompetitionDraft {
            last_entry_date: date(2025, 1, 11),
            ..draft()
        }
        .check();
        assert!(errors.get("lastEntryDate").is_some());
    }

    #[test]
    fn groups_and_player_cap_are_checked() {
        let errors = CompetitionDraft {
            group_ids: vec![],
            max_players: 0,
            ..draft()
        }
        .check();
        assert_eq!(errors.get("groupIds"), Some("Select at least one group"));
        assert_eq!(
            errors.get("maxPlayers"),
            Some("Max players must be between 1 and 100")
        );
    }

    #[test]
    fn server_category_wins_over_derived() {
        let competition: Competition = serde_json::from_value(serde_json::json!({
            "id": 5, "competitionName": "Open", "maxPlayers": 12,
            "fromDate": "2025-01-10", "toDate": "2025-01-12",
            "ageEligibilityDate": "2000-01-01", "ageCategory": "Under 30"
        }))
        .unwrap();
        assert_eq!(competition.category().as_deref(), Some("Under 30"));
        assert!(competition.accepts_entries_on(NaiveDate::from_ymd_opt(2025, 1, 10).unwrap()));
        assert!(!competition.accepts_entries_on(NaiveDate::from_ymd_opt(2025, 1, 11).unwrap()));
    }
}
