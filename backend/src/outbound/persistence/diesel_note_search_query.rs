//! PostgreSQL-backed `NoteSearchQuery` implementation.
//!
//! One statement serves both search modes. The full-text branch matches the
//! note's `search_text` against `plainto_tsquery` and is scoped to notes the
//! caller owns or is delegated. The shared-username branch matches any note
//! with a share whose username equals the input case-insensitively, whoever
//! owns it. Matched notes are left-joined to all of their shares.

use async_trait::async_trait;
use diesel::sql_types::Text;
use diesel_async::RunQueryDsl;

use crate::domain::ports::{NoteSearchQuery, NoteSearchQueryError};
use crate::domain::{JoinedNoteRow, SearchText, Username};

use super::diesel_basic_error_mapping::{map_basic_diesel_error, map_basic_pool_error};
use super::diesel_helpers::collect_rows;
use super::models::JoinedNoteSqlRow;
use super::pool::DbPool;

const SEARCH_SQL: &str = "\
SELECT n.id, n.title, n.note_type, n.description, n.created_at, \
       n.completion_time, n.completion_date, n.status, n.delegation, n.owner, \
       s.username AS shared_username, s.privilege AS shared_privilege \
FROM notes n \
LEFT JOIN user_shares s ON s.note_id = n.id \
WHERE (n.search_text @@ plainto_tsquery($1::regconfig, $2) \
       AND (n.owner = $3 OR n.delegation = $3)) \
   OR EXISTS (SELECT 1 FROM user_shares m \
              WHERE m.note_id = n.id AND lower(m.username) = lower($2)) \
ORDER BY n.id, s.username";

/// Diesel-backed implementation of the `NoteSearchQuery` port.
#[derive(Clone)]
pub struct DieselNoteSearchQuery {
    pool: DbPool,
    text_search_config: String,
}

impl DieselNoteSearchQuery {
    /// Create a query matching with the given text search configuration.
    pub fn new(pool: DbPool, text_search_config: impl Into<String>) -> Self {
        Self {
            pool,
            text_search_config: text_search_config.into(),
        }
    }
}

#[async_trait]
impl NoteSearchQuery for DieselNoteSearchQuery {
    async fn search_rows(
        &self,
        text: &SearchText,
        username: &Username,
    ) -> Result<Vec<JoinedNoteRow>, NoteSearchQueryError> {
        let mut conn = self
            .pool
            .get()
            .await
            .map_err(|error| map_basic_pool_error(error, NoteSearchQueryError::connection))?;
        let rows: Vec<JoinedNoteSqlRow> = diesel::sql_query(SEARCH_SQL)
            .bind::<Text, _>(self.text_search_config.as_str())
            .bind::<Text, _>(text.as_str())
            .bind::<Text, _>(username.as_str())
            .load(&mut conn)
            .await
            .map_err(|error| {
                map_basic_diesel_error(
                    error,
                    "note search",
                    NoteSearchQueryError::query,
                    NoteSearchQueryError::connection,
                )
            })?;
        collect_rows(
            rows.into_iter().map(JoinedNoteRow::try_from),
            NoteSearchQueryError::query,
        )
    }
}
