//! Driven port for dual-mode note search.
use async_trait::async_trait;

use crate::domain::{JoinedNoteRow, SearchText, Username};

use super::define_port_error;

define_port_error! {
    /// Errors raised by note search adapters.
    pub enum NoteSearchQueryError {
        /// Query backend connection could not be established.
        Connection { message: String } => "note search connection failed: {message}",
        /// Query failed during execution.
        Query { message: String } => "note search query failed: {message}",
    }
}

/// Read-side query matching notes by content or by shared username.
///
/// A note matches when its search vector matches `text` and it is owned by
/// or delegated to `username`, or when it has a share whose username equals
/// `text` case-insensitively. The share-username branch does not check
/// ownership. Rows come from a left join of notes to shares, ordered by note
/// id then shared username, carrying every share of each matched note.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait NoteSearchQuery: Send + Sync {
    async fn search_rows(
        &self,
        text: &SearchText,
        username: &Username,
    ) -> Result<Vec<JoinedNoteRow>, NoteSearchQueryError>;
}

/// Fixture query that never matches.
#[derive(Debug, Default, Clone, Copy)]
pub struct FixtureNoteSearchQuery;

#[async_trait]
impl NoteSearchQuery for FixtureNoteSearchQuery {
    async fn search_rows(
        &self,
        _text: &SearchText,
        _username: &Username,
    ) -> Result<Vec<JoinedNoteRow>, NoteSearchQueryError> {
        Ok(Vec::new())
    }
}
