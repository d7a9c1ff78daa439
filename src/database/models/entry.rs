use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, FromRow)]
pub struct Entry {
    pub id: i64,
    pub user_id: i64,
    pub text: String,
    pub notes: String,
    pub date_created: DateTime<Utc>,
    pub date_modified: DateTime<Utc>,
}

/// Row to insert. `created_at` becomes both `date_created` and `date_modified`.
#[derive(Debug, Clone)]
pub struct NewEntry {
    pub user_id: i64,
    pub text: String,
    pub notes: String,
    pub created_at: DateTime<Utc>,
}

/// Client-settable fields for an update; `None` leaves the stored value alone.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EntryChanges {
    pub text: Option<String>,
    pub notes: Option<String>,
}

impl EntryChanges {
    /// Apply the changes to an in-memory entry, refreshing `date_modified`.
    /// The modification time never moves backwards.
    pub fn apply(&self, entry: &mut Entry, now: DateTime<Utc>) {
        if let Some(text) = &self.text {
            entry.text = text.clone();
        }
        if let Some(notes) = &self.notes {
            entry.notes = notes.clone();
        }
        entry.date_modified = now.max(entry.date_modified);
    }
}
