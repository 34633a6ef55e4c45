//! Activity-log records and their human-readable descriptions.
//!
//! The server records who did what to which entity, plus a raw
//! before/after map of changed fields. [`describe`] turns that into one
//! sentence for the activity log screen.

use chrono::{DateTime, Utc};
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::entities::Resource;
use crate::naming::humanize;
use crate::types::{DbId, Timestamp};

// ---------------------------------------------------------------------------
// Constants
// ---------------------------------------------------------------------------

/// Known action values.
pub mod actions {
    pub const CREATE: &str = "CREATE";
    pub const UPDATE: &str = "UPDATE";
    pub const DELETE: &str = "DELETE";
    pub const LOGIN: &str = "LOGIN";
}

/// Fields maintained by the server; never shown as user changes.
pub const SYSTEM_FIELDS: &[&str] = &[
    "createdAt",
    "updatedAt",
    "deletedAt",
    "created_at",
    "updated_at",
    "deleted_at",
];

/// How many changed fields a description spells out.
pub const MAX_LISTED_CHANGES: usize = 2;

const LAST_LOGIN_FIELD: &str = "lastLogin";
const USER_ENTITY: &str = "user";
const LOGIN_TIME_FORMAT: &str = "%d %b %Y, %H:%M";
const UNKNOWN_ACTOR: &str = "Someone";

// ---------------------------------------------------------------------------
// Records
// ---------------------------------------------------------------------------

/// One field's before/after pair.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct FieldChange {
    #[serde(default, alias = "from")]
    pub old: Value,
    #[serde(default, alias = "to")]
    pub new: Value,
}

impl FieldChange {
    pub fn new(old: Value, new: Value) -> Self {
        Self { old, new }
    }
}

/// Changed fields in the order the server reported them.
pub type ChangeSet = IndexMap<String, FieldChange>;

/// The user who performed a logged action.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct ActivityActor {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub email: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ActivityLog {
    pub id: DbId,
    pub action: String,
    pub entity_type: String,
    #[serde(default)]
    pub entity_id: Option<DbId>,
    #[serde(default)]
    pub entity_name: Option<String>,
    #[serde(default)]
    pub user: Option<ActivityActor>,
    #[serde(default)]
    pub changes: ChangeSet,
    #[serde(default)]
    pub ip_address: Option<String>,
    pub created_at: Timestamp,
}

impl ActivityLog {
    /// Display name of the actor: name, else email, else a placeholder.
    pub fn actor_name(&self) -> &str {
        fn present(s: &Option<String>) -> Option<&str> {
            s.as_deref().filter(|s| !s.trim().is_empty())
        }
        self.user
            .as_ref()
            .and_then(|u| present(&u.name).or_else(|| present(&u.email)))
            .unwrap_or(UNKNOWN_ACTOR)
    }

    pub fn description(&self) -> String {
        describe(
            self.actor_name(),
            &self.action,
            &self.entity_type,
            self.entity_name.as_deref(),
            &self.changes,
        )
    }
}

impl Resource for ActivityLog {
    const COLLECTION: &'static str = "activity-logs";
    const LABEL: &'static str = "Activity";

    fn id(&self) -> DbId {
        self.id
    }

    fn display_name(&self) -> String {
        self.description()
    }
}

// ---------------------------------------------------------------------------
// Description rendering
// ---------------------------------------------------------------------------

pub fn is_system_field(field: &str) -> bool {
    SYSTEM_FIELDS.contains(&field)
}

/// Drop server-maintained fields, keeping order.
pub fn visible_changes(changes: &ChangeSet) -> Vec<(&str, &FieldChange)> {
    changes
        .iter()
        .filter(|(field, _)| !is_system_field(field))
        .map(|(field, change)| (field.as_str(), change))
        .collect()
}

/// Render a JSON value for a sentence.
pub fn format_value(value: &Value) -> String {
    match value {
        Value::Null => "empty".to_string(),
        Value::Bool(true) => "Yes".to_string(),
        Value::Bool(false) => "No".to_string(),
        Value::String(s) if s.is_empty() => "empty".to_string(),
        Value::String(s) => s.clone(),
        Value::Number(n) => n.to_string(),
        Value::Array(items) => items.iter().map(format_value).collect::<Vec<_>>().join(", "),
        Value::Object(_) => value.to_string(),
    }
}

/// Format a login timestamp as `01 Jan 2024, 10:00` (UTC).
///
/// Unparseable values are echoed back unchanged.
pub fn format_login_time(value: &Value) -> String {
    match value {
        Value::String(raw) => DateTime::parse_from_rfc3339(raw)
            .map(|t| t.with_timezone(&Utc).format(LOGIN_TIME_FORMAT).to_string())
            .unwrap_or_else(|_| raw.clone()),
        other => format_value(other),
    }
}

fn entity_label(entity_type: &str, entity_name: Option<&str>) -> String {
    let kind = humanize(entity_type).to_lowercase();
    match entity_name.filter(|n| !n.trim().is_empty()) {
        Some(name) => format!("{kind} \"{name}\""),
        None => kind,
    }
}

fn describe_change(field: &str, change: &FieldChange) -> String {
    format!(
        "{} changed from \"{}\" to \"{}\"",
        humanize(field),
        format_value(&change.old),
        format_value(&change.new)
    )
}

/// One-sentence summary of a logged action.
///
/// A lone `lastLogin` change on a user reads as a login. Updates list at
/// most [`MAX_LISTED_CHANGES`] fields followed by `(+N more changes)`.
pub fn describe(
    actor: &str,
    action: &str,
    entity_type: &str,
    entity_name: Option<&str>,
    changes: &ChangeSet,
) -> String {
    let visible = visible_changes(changes);

    if entity_type.eq_ignore_ascii_case(USER_ENTITY) {
        if let [(LAST_LOGIN_FIELD, change)] = visible.as_slice() {
            return format!("{actor} logged in at {}", format_login_time(&change.new));
        }
    }

    let entity = entity_label(entity_type, entity_name);
    match action.to_ascii_uppercase().as_str() {
        actions::CREATE => format!("{actor} created {entity}"),
        actions::DELETE => format!("{actor} deleted {entity}"),
        actions::UPDATE if visible.is_empty() => format!("{actor} updated {entity}"),
        actions::UPDATE => {
            let listed = visible
                .iter()
                .take(MAX_LISTED_CHANGES)
                .map(|(field, change)| describe_change(field, change))
                .collect::<Vec<_>>()
                .join(", ");
            let mut sentence = format!("{actor} updated {entity}: {listed}");
            let remaining = visible.len().saturating_sub(MAX_LISTED_CHANGES);
            if remaining > 0 {
                sentence.push_str(&format!(" (+{remaining} more changes)"));
            }
            sentence
        }
        other => format!("{actor} {} {entity}", other.to_lowercase()),
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
