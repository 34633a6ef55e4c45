//! Terminal rendering of records, pages and notifications.

use clubdesk_core::activity::ActivityLog;
use clubdesk_core::entities::{
    Club, Competition, Group, Player, Referee, Region, Resource, Taluka,
};
use clubdesk_core::form::FieldErrors;
use clubdesk_core::list::ListResult;
use clubdesk_core::naming::humanize;
use clubdesk_events::{Notification, NotificationLevel};

/// A record that renders as one table row.
pub trait Row: Resource {
    const COLUMNS: &'static [&'static str];

    fn cells(&self) -> Vec<String>;
}

fn or_dash(value: Option<impl ToString>) -> String {
    value.map_or_else(|| "-".to_string(), |v| v.to_string())
}

fn yes_no(flag: bool) -> String {
    let text = if flag { "Yes" } else { "No" };
    text.to_string()
}

impl Row for Club {
    const COLUMNS: &'static [&'static str] = &["ID", "Club", "Region", "City", "Contact", "Mobile"];

    fn cells(&self) -> Vec<String> {
        vec![
            self.id.to_string(),
            self.club_name.clone(),
            self.region
                .as_ref()
                .map_or_else(|| self.region_id.to_string(), |r| r.name.clone()),
            or_dash(self.city.as_deref()),
            self.contact_person.clone(),
            self.mobile.clone(),
        ]
    }
}

impl Row for Region {
    const COLUMNS: &'static [&'static str] = &["ID", "Region", "Code", "Talukas"];

    fn cells(&self) -> Vec<String> {
        vec![
            self.id.to_string(),
            self.name.clone(),
            or_dash(self.code.as_deref()),
            or_dash(self.taluka_count),
        ]
    }
}

impl Row for Taluka {
    const COLUMNS: &'static [&'static str] = &["ID", "Taluka", "Region"];

    fn cells(&self) -> Vec<String> {
        vec![
            self.id.to_string(),
            self.name.clone(),
            self.region
                .as_ref()
                .map_or_else(|| self.region_id.to_string(), |r| r.name.clone()),
        ]
    }
}

impl Row for Group {
    const COLUMNS: &'static [&'static str] = &["ID", "Group", "Gender", "Age Limit", "Category"];

    fn cells(&self) -> Vec<String> {
        vec![
            self.id.to_string(),
            self.group_name.clone(),
            self.gender.as_str().to_string(),
            self.age_limit.clone(),
            self.age_category(),
        ]
    }
}

impl Row for Player {
    const COLUMNS: &'static [&'static str] =
        &["ID", "Name", "Club", "Age", "Aadhaar", "Verified", "Suspended"];

    fn cells(&self) -> Vec<String> {
        let today = chrono::Local::now().date_naive();
        vec![
            self.id.to_string(),
            self.full_name(),
            self.club
                .as_ref()
                .map(|c| c.name.clone())
                .or_else(|| self.club_id.map(|id| id.to_string()))
                .unwrap_or_else(|| "-".into()),
            or_dash(self.age_on(today)),
            self.masked_aadhar(),
            yes_no(self.aadhar_verified),
            yes_no(self.is_suspended),
        ]
    }
}

impl Row for Referee {
    const COLUMNS: &'static [&'static str] = &["ID", "Name", "Level", "Exam Year", "Mobile"];

    fn cells(&self) -> Vec<String> {
        vec![
            self.id.to_string(),
            self.display_name(),
            or_dash(self.referee_level.as_deref()),
            or_dash(self.exam_passing_year),
            self.mobile.clone(),
        ]
    }
}

impl Row for Competition {
    const COLUMNS: &'static [&'static str] = &["ID", "Competition", "From", "To", "Category", "Max"];

    fn cells(&self) -> Vec<String> {
        vec![
            self.id.to_string(),
            self.competition_name.clone(),
            self.from_date.to_string(),
            self.to_date.to_string(),
            or_dash(self.category()),
            self.max_players.to_string(),
        ]
    }
}

impl Row for ActivityLog {
    const COLUMNS: &'static [&'static str] = &["When", "Activity"];

    fn cells(&self) -> Vec<String> {
        vec![
            self.created_at.format("%Y-%m-%d %H:%M").to_string(),
            self.description(),
        ]
    }
}

// ---------------------------------------------------------------------------
// Tables
// ---------------------------------------------------------------------------

/// Left-aligned columns separated by two spaces.
pub fn table(headers: &[&str], rows: &[Vec<String>]) -> String {
    let mut widths: Vec<usize> = headers.iter().map(|h| h.chars().count()).collect();
    for row in rows {
        for (i, cell) in row.iter().enumerate().take(widths.len()) {
            widths[i] = widths[i].max(cell.chars().count());
        }
    }

    let line = |cells: Vec<&str>| {
        cells
            .iter()
            .zip(&widths)
            .map(|(cell, width)| format!("{cell:<width$}"))
            .collect::<Vec<_>>()
            .join("  ")
            .trim_end()
            .to_string()
    };

    let mut out = vec![line(headers.to_vec())];
    let rule: Vec<String> = widths.iter().map(|w| "-".repeat(*w)).collect();
    out.push(line(rule.iter().map(String::as_str).collect()));
    for row in rows {
        out.push(line(row.iter().map(String::as_str).collect()));
    }
    out.join("\n")
}

/// A page of records with a "Page X of Y (N records)" footer. `limit` is
/// the page size the query asked for.
pub fn page<E: Row>(result: &ListResult<E>, limit: u32) -> String {
    if result.items.is_empty() {
        return format!("No {} found.", humanize(E::COLLECTION).to_lowercase());
    }
    let rows: Vec<Vec<String>> = result.items.iter().map(Row::cells).collect();
    let pages = result
        .page_count(limit)
        .map_or_else(|| "?".to_string(), |n| n.max(1).to_string());
    let count = result
        .total_count
        .map_or_else(|| "?".to_string(), |n| n.to_string());
    format!(
        "{}\n\nPage {} of {pages} ({count} records)",
        table(E::COLUMNS, &rows),
        result.page,
    )
}

pub fn notification(note: &Notification) -> String {
    let tag = match note.level {
        NotificationLevel::Success => "ok",
        NotificationLevel::Info => "info",
        NotificationLevel::Error => "error",
    };
    format!("[{tag}] {}", note.message)
}

pub fn field_errors(errors: &FieldErrors) -> String {
    errors
        .iter()
        .map(|(field, message)| format!("  {}: {message}", humanize(field)))
        .collect::<Vec<_>>()
        .join("\n")
}
