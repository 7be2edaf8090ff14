//! Folding of note×share join rows into nested notes.
//!
//! A left join from notes to shares yields one row per (note, shared user)
//! pair, and one row with no username for a note nobody shares. The
//! aggregator collapses those rows into one [`NoteWithShares`] per distinct
//! note, keeping the order in which note identifiers first appear.

use std::collections::{HashMap, HashSet};

use super::note::{Note, NoteId};
use super::share::{NoteWithShares, ParsePrivilegeError, Privilege, Share};
use super::user::{UserValidationError, Username};

/// One flat row of a note left-joined to its shares.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct JoinedNoteRow {
    pub note: Note,
    pub shared_username: Option<String>,
    pub shared_privilege: Option<String>,
}

impl JoinedNoteRow {
    /// Row for a note without a share.
    pub fn unshared(note: Note) -> Self {
        Self {
            note,
            shared_username: None,
            shared_privilege: None,
        }
    }

    /// Row for a note joined to one share.
    pub fn shared(note: Note, username: impl Into<String>, privilege: impl Into<String>) -> Self {
        Self {
            note,
            shared_username: Some(username.into()),
            shared_privilege: Some(privilege.into()),
        }
    }
}

/// Rows that cannot be folded into a well-formed share.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum AggregationError {
    #[error("note {note_id} is shared with an invalid username: {source}")]
    InvalidUsername {
        note_id: NoteId,
        #[source]
        source: UserValidationError,
    },
    #[error("share of note {note_id} with {username} has no privilege")]
    MissingPrivilege { note_id: NoteId, username: String },
    #[error("share of note {note_id} carries an invalid privilege: {source}")]
    InvalidPrivilege {
        note_id: NoteId,
        #[source]
        source: ParsePrivilegeError,
    },
}

struct NoteBuilder {
    note: Note,
    shares: Vec<Share>,
    seen: HashSet<Username>,
}

impl NoteBuilder {
    fn new(note: Note) -> Self {
        Self {
            note,
            shares: Vec::new(),
            seen: HashSet::new(),
        }
    }

    fn push_share(
        &mut self,
        username: String,
        privilege: Option<String>,
    ) -> Result<(), AggregationError> {
        let note_id = self.note.id();
        let privilege = privilege
            .ok_or_else(|| AggregationError::MissingPrivilege {
                note_id,
                username: username.clone(),
            })?
            .parse::<Privilege>()
            .map_err(|source| AggregationError::InvalidPrivilege { note_id, source })?;
        let username = Username::new(username)
            .map_err(|source| AggregationError::InvalidUsername { note_id, source })?;

        // A note matched by more than one criterion repeats its share rows.
        if self.seen.insert(username.clone()) {
            self.shares.push(Share {
                note_id,
                username,
                privilege,
            });
        }
        Ok(())
    }

    fn finish(self) -> NoteWithShares {
        NoteWithShares {
            note: self.note,
            shares: self.shares,
        }
    }
}

/// Collapse joined rows into notes with their shares.
///
/// Notes appear in first-seen order. Shares keep row order within a note.
/// Rows without a username contribute no share. The first row seen for a
/// note supplies its scalar fields.
///
/// # Examples
/// ```
/// use chrono::Utc;
/// use noteshare::domain::{
///     JoinedNoteRow, Note, NoteDraft, NoteId, Username, aggregate_note_rows,
/// };
///
/// let owner = Username::new("alice").expect("valid username");
/// let content = NoteDraft {
///     title: "Groceries".into(),
///     note_type: "list".into(),
///     description: "milk".into(),
///     ..NoteDraft::default()
/// }
/// .validate()
/// .expect("valid draft");
/// let note = Note::new(NoteId::new(1), content, Utc::now(), owner);
///
/// let notes = aggregate_note_rows(vec![
///     JoinedNoteRow::shared(note.clone(), "bob", "viewer"),
///     JoinedNoteRow::shared(note.clone(), "carol", "editor"),
/// ])
/// .expect("rows aggregate");
/// assert_eq!(notes.len(), 1);
/// assert_eq!(notes[0].shares.len(), 2);
/// ```
pub fn aggregate_note_rows<I>(rows: I) -> Result<Vec<NoteWithShares>, AggregationError>
where
    I: IntoIterator<Item = JoinedNoteRow>,
{
    let mut builders: Vec<NoteBuilder> = Vec::new();
    let mut positions: HashMap<NoteId, usize> = HashMap::new();

    for row in rows {
        let JoinedNoteRow {
            note,
            shared_username,
            shared_privilege,
        } = row;

        let position = match positions.get(&note.id()) {
            Some(&position) => position,
            None => {
                let position = builders.len();
                positions.insert(note.id(), position);
                builders.push(NoteBuilder::new(note));
                position
            }
        };

        let Some(username) = shared_username else {
            continue;
        };
        if let Some(builder) = builders.get_mut(position) {
            builder.push_share(username, shared_privilege)?;
        }
    }

    Ok(builders.into_iter().map(NoteBuilder::finish).collect())
}

#[cfg(test)]
mod tests;
