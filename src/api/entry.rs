use chrono::{DateTime, Utc};
use serde::Serialize;
use serde_json::Value;

use crate::api::fields::{self, CharField};
use crate::database::models::{Entry, EntryChanges};
use crate::error::{ApiError, FieldErrors};

pub const TEXT_MAX_LENGTH: usize = 255;

const TEXT: CharField = CharField::new("text").max_length(TEXT_MAX_LENGTH);
const NOTES: CharField = CharField::new("notes").optional().allow_blank();

/// Wire representation of an entry
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct EntryView {
    pub id: i64,
    pub user_id: i64,
    pub text: String,
    pub notes: String,
    pub date_created: DateTime<Utc>,
    pub date_modified: DateTime<Utc>,
}

impl From<Entry> for EntryView {
    fn from(entry: Entry) -> Self {
        Self {
            id: entry.id,
            user_id: entry.user_id,
            text: entry.text,
            notes: entry.notes,
            date_created: entry.date_created,
            date_modified: entry.date_modified,
        }
    }
}

impl EntryView {
    pub fn many(entries: Vec<Entry>) -> Vec<Self> {
        entries.into_iter().map(Self::from).collect()
    }
}

/// Validated client-settable entry fields.
///
/// Anything else in the payload (`id`, `user_id`, the timestamps) is ignored;
/// those values are always assigned by the server.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EntryInput {
    pub text: Option<String>,
    pub notes: Option<String>,
}

impl EntryInput {
    /// Validate a create or full-update payload: `text` is required.
    pub fn full(payload: &Value) -> Result<Self, ApiError> {
        Self::validate(payload, false)
    }

    /// Validate a partial-update payload: every field is optional.
    pub fn partial(payload: &Value) -> Result<Self, ApiError> {
        Self::validate(payload, true)
    }

    fn validate(payload: &Value, partial: bool) -> Result<Self, ApiError> {
        let data = fields::payload_object(payload)?;
        let mut errors = FieldErrors::new();

        let text = TEXT.read(data, partial, &mut errors);
        let notes = NOTES.read(data, partial, &mut errors);

        fields::check(errors)?;
        Ok(Self { text, notes })
    }

    /// Text for a new entry. Only valid after [`EntryInput::full`].
    pub fn text_or_default(&self) -> String {
        self.text.clone().unwrap_or_default()
    }

    pub fn notes_or_default(&self) -> String {
        self.notes.clone().unwrap_or_default()
    }

    pub fn into_changes(self) -> EntryChanges {
        EntryChanges {
            text: self.text,
            notes: self.notes,
        }
    }
}
