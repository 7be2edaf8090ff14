//! Note aggregate and its validated content.
//!
//! A [`NoteDraft`] is what callers hand in; it becomes [`NoteContent`] once
//! required fields are present and every field fits the store's column
//! limits. Optional fields are `Option<String>` throughout. The only place
//! absence turns into an empty string is [`SearchDocument`], which joins the
//! seven textual fields into one document for the full-text index.

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::user::{UserValidationError, Username};

/// Maximum length of the title, type, and description fields.
pub const TEXT_FIELD_MAX: usize = 255;
/// Maximum length of the completion time and completion date fields.
pub const COMPLETION_FIELD_MAX: usize = 255;
/// Maximum length of the status field.
pub const STATUS_MAX: usize = 20;

/// Store-assigned note identifier.
///
/// Identifiers increase monotonically and never change once assigned.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct NoteId(i64);

impl NoteId {
    /// Wrap a raw identifier.
    pub const fn new(id: i64) -> Self {
        Self(id)
    }

    /// Raw identifier for persistence adapters.
    pub const fn get(self) -> i64 {
        self.0
    }
}

impl From<i64> for NoteId {
    fn from(value: i64) -> Self {
        Self(value)
    }
}

impl From<NoteId> for i64 {
    fn from(value: NoteId) -> Self {
        value.0
    }
}

impl fmt::Display for NoteId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Validation failures for note content.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum NoteValidationError {
    /// A required field was empty or whitespace.
    #[error("{field} must not be empty")]
    MissingField { field: &'static str },
    /// A field exceeds its column limit.
    #[error("{field} must be at most {max} characters")]
    FieldTooLong { field: &'static str, max: usize },
    /// The delegation target is not a valid username.
    #[error("delegation is not a valid username: {0}")]
    InvalidDelegation(UserValidationError),
}

impl NoteValidationError {
    /// Name of the offending field.
    pub fn field(&self) -> &'static str {
        match self {
            Self::MissingField { field } | Self::FieldTooLong { field, .. } => field,
            Self::InvalidDelegation(_) => "delegation",
        }
    }
}

/// Unvalidated note fields as supplied by the caller.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NoteDraft {
    pub title: String,
    pub note_type: String,
    pub description: String,
    #[serde(default)]
    pub completion_time: Option<String>,
    #[serde(default)]
    pub completion_date: Option<String>,
    #[serde(default)]
    pub status: Option<String>,
    #[serde(default)]
    pub delegation: Option<String>,
}

impl NoteDraft {
    /// Validate the draft into [`NoteContent`].
    ///
    /// # Examples
    /// ```
    /// use noteshare::domain::NoteDraft;
    ///
    /// let draft = NoteDraft {
    ///     title: "Standup".into(),
    ///     note_type: "meeting".into(),
    ///     description: "Daily sync".into(),
    ///     status: Some("  ".into()),
    ///     ..NoteDraft::default()
    /// };
    /// let content = draft.validate().expect("valid draft");
    /// assert_eq!(content.status(), None);
    /// ```
    pub fn validate(self) -> Result<NoteContent, NoteValidationError> {
        NoteContent::try_from(self)
    }
}

fn required(
    field: &'static str,
    value: String,
    max: usize,
) -> Result<String, NoteValidationError> {
    if value.trim().is_empty() {
        return Err(NoteValidationError::MissingField { field });
    }
    bounded(field, value, max)
}

fn optional(
    field: &'static str,
    value: Option<String>,
    max: usize,
) -> Result<Option<String>, NoteValidationError> {
    value
        .filter(|raw| !raw.trim().is_empty())
        .map(|raw| bounded(field, raw, max))
        .transpose()
}

fn bounded(field: &'static str, value: String, max: usize) -> Result<String, NoteValidationError> {
    if value.chars().count() > max {
        return Err(NoteValidationError::FieldTooLong { field, max });
    }
    Ok(value)
}

/// The seven mutable textual fields of a note, validated.
///
/// ## Invariants
/// - `title`, `note_type`, and `description` are non-blank.
/// - Optional fields are `None` rather than blank strings.
/// - `delegation`, when present, is a valid [`Username`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NoteContent {
    title: String,
    note_type: String,
    description: String,
    completion_time: Option<String>,
    completion_date: Option<String>,
    status: Option<String>,
    delegation: Option<Username>,
}

impl TryFrom<NoteDraft> for NoteContent {
    type Error = NoteValidationError;

    fn try_from(draft: NoteDraft) -> Result<Self, Self::Error> {
        let NoteDraft {
            title,
            note_type,
            description,
            completion_time,
            completion_date,
            status,
            delegation,
        } = draft;

        let delegation = delegation
            .filter(|raw| !raw.trim().is_empty())
            .map(Username::new)
            .transpose()
            .map_err(NoteValidationError::InvalidDelegation)?;

        Ok(Self {
            title: required("title", title, TEXT_FIELD_MAX)?,
            note_type: required("type", note_type, TEXT_FIELD_MAX)?,
            description: required("description", description, TEXT_FIELD_MAX)?,
            completion_time: optional("completion time", completion_time, COMPLETION_FIELD_MAX)?,
            completion_date: optional("completion date", completion_date, COMPLETION_FIELD_MAX)?,
            status: optional("status", status, STATUS_MAX)?,
            delegation,
        })
    }
}

impl NoteContent {
    pub fn title(&self) -> &str {
        self.title.as_str()
    }

    pub fn note_type(&self) -> &str {
        self.note_type.as_str()
    }

    pub fn description(&self) -> &str {
        self.description.as_str()
    }

    pub fn completion_time(&self) -> Option<&str> {
        self.completion_time.as_deref()
    }

    pub fn completion_date(&self) -> Option<&str> {
        self.completion_date.as_deref()
    }

    pub fn status(&self) -> Option<&str> {
        self.status.as_deref()
    }

    pub fn delegation(&self) -> Option<&Username> {
        self.delegation.as_ref()
    }

    /// Content with delegation and status both cleared.
    ///
    /// Content that has no delegation is returned unchanged.
    pub fn without_delegation(self) -> Self {
        if self.delegation.is_none() {
            return self;
        }
        Self {
            status: None,
            delegation: None,
            ..self
        }
    }

    /// Searchable document derived from all seven textual fields.
    pub fn search_document(&self) -> SearchDocument {
        SearchDocument::from_content(self)
    }

    /// Case-insensitive, non-overlapping occurrences of `pattern` in the
    /// title and description. Fields without a match are omitted.
    pub fn find_text(&self, pattern: &str) -> Vec<TextOccurrence> {
        let needle = pattern.to_lowercase();
        if needle.is_empty() {
            return Vec::new();
        }
        [
            (TextField::Title, self.title.as_str()),
            (TextField::Description, self.description.as_str()),
        ]
        .into_iter()
        .filter_map(|(field, haystack)| {
            let count = haystack.to_lowercase().matches(needle.as_str()).count();
            (count > 0).then_some(TextOccurrence { field, count })
        })
        .collect()
    }
}

/// Text handed to the full-text indexing primitive.
///
/// Built by joining title, type, description, completion time, completion
/// date, status, and delegation with a single space. Absent fields contribute
/// an empty string, so the separator count is always six.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchDocument(String);

impl SearchDocument {
    pub fn from_content(content: &NoteContent) -> Self {
        let fields = [
            content.title(),
            content.note_type(),
            content.description(),
            content.completion_time().unwrap_or_default(),
            content.completion_date().unwrap_or_default(),
            content.status().unwrap_or_default(),
            content.delegation().map(Username::as_str).unwrap_or_default(),
        ];
        Self(fields.join(" "))
    }

    pub fn as_str(&self) -> &str {
        self.0.as_str()
    }
}

impl AsRef<str> for SearchDocument {
    fn as_ref(&self) -> &str {
        self.as_str()
    }
}

/// A persisted note.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Note {
    id: NoteId,
    #[serde(flatten)]
    content: NoteContent,
    created_at: DateTime<Utc>,
    owner: Username,
}

impl Note {
    pub fn new(id: NoteId, content: NoteContent, created_at: DateTime<Utc>, owner: Username) -> Self {
        Self {
            id,
            content,
            created_at,
            owner,
        }
    }

    pub fn id(&self) -> NoteId {
        self.id
    }

    pub fn content(&self) -> &NoteContent {
        &self.content
    }

    /// Server-assigned creation timestamp.
    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    pub fn owner(&self) -> &Username {
        &self.owner
    }

    /// Whether `username` owns the note or is its delegation target.
    pub fn is_owned_or_delegated_to(&self, username: &Username) -> bool {
        &self.owner == username || self.content.delegation() == Some(username)
    }
}

/// Field searched by [`NoteContent::find_text`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum TextField {
    Title,
    Description,
}

/// Number of matches of a pattern within one field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct TextOccurrence {
    pub field: TextField,
    pub count: usize,
}
