//! PostgreSQL-backed `NoteRepository` implementation using Diesel ORM.
//!
//! Inserts and updates are raw SQL so the `search_text` vector is computed by
//! `to_tsvector` in the same statement that writes the note fields. Reads use
//! the Diesel DSL over the columns declared in [`super::schema`].

use async_trait::async_trait;
use diesel::prelude::*;
use diesel::sql_types::{Int8, Nullable, Text};
use diesel_async::RunQueryDsl;

use crate::domain::ports::{NoteRepository, NoteRepositoryError};
use crate::domain::{JoinedNoteRow, Note, NoteContent, NoteId, SearchDocument, Username};

use super::diesel_helpers::{
    ForeignKeyTarget, StoreFailure, classify_diesel_error, collect_rows, map_pool_error_message,
};
use super::models::{InsertedIdRow, NoteRow, joined_row_from_tuple};
use super::pool::{DbPool, PoolError};
use super::schema::{notes, user_shares};

const INSERT_NOTE_SQL: &str = "\
INSERT INTO notes (title, note_type, description, completion_time, completion_date, \
                   status, delegation, owner, search_text) \
VALUES ($1, $2, $3, $4, $5, $6, $7, $8, to_tsvector($9::regconfig, $10)) \
RETURNING id";

const UPDATE_NOTE_SQL: &str = "\
UPDATE notes \
SET title = $1, note_type = $2, description = $3, completion_time = $4, \
    completion_date = $5, status = $6, delegation = $7, \
    search_text = to_tsvector($8::regconfig, $9) \
WHERE id = $10";

// Rebuilds the search document from stored fields, mirroring
// `SearchDocument`: seven fields, absent ones as empty strings. A note with
// no delegation keeps its status and search text; the row still counts as
// affected so a missing id stays distinguishable.
const CLEAR_DELEGATION_SQL: &str = "\
UPDATE notes \
SET status = CASE WHEN delegation IS NULL THEN status ELSE NULL END, \
    search_text = CASE WHEN delegation IS NULL THEN search_text \
        ELSE to_tsvector($1::regconfig, concat_ws(' ', title, note_type, description, \
            coalesce(completion_time, ''), coalesce(completion_date, ''), '', '')) END, \
    delegation = NULL \
WHERE id = $2";

/// Diesel-backed implementation of the `NoteRepository` port.
#[derive(Clone)]
pub struct DieselNoteRepository {
    pool: DbPool,
    text_search_config: String,
}

impl DieselNoteRepository {
    /// Create a repository indexing with the given text search configuration
    /// (for example `english`).
    pub fn new(pool: DbPool, text_search_config: impl Into<String>) -> Self {
        Self {
            pool,
            text_search_config: text_search_config.into(),
        }
    }
}

fn map_pool_error(error: PoolError) -> NoteRepositoryError {
    NoteRepositoryError::connection(map_pool_error_message(error))
}

fn map_diesel_error(
    error: diesel::result::Error,
    operation: &str,
    owner: Option<&Username>,
) -> NoteRepositoryError {
    match classify_diesel_error(error, operation) {
        StoreFailure::Connection(message) => NoteRepositoryError::connection(message),
        StoreFailure::Query(message) => NoteRepositoryError::query(message),
        StoreFailure::ForeignKeyViolation(Some(ForeignKeyTarget::User)) => match owner {
            Some(owner) => NoteRepositoryError::missing_owner(owner.as_str()),
            None => NoteRepositoryError::query("owner foreign key violated"),
        },
        StoreFailure::ForeignKeyViolation(_) => {
            NoteRepositoryError::query("foreign key violation")
        }
        StoreFailure::UniqueViolation => NoteRepositoryError::query("unique constraint violated"),
    }
}

#[async_trait]
impl NoteRepository for DieselNoteRepository {
    async fn insert(
        &self,
        owner: &Username,
        content: &NoteContent,
        document: &SearchDocument,
    ) -> Result<NoteId, NoteRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let row: InsertedIdRow = diesel::sql_query(INSERT_NOTE_SQL)
            .bind::<Text, _>(content.title())
            .bind::<Text, _>(content.note_type())
            .bind::<Text, _>(content.description())
            .bind::<Nullable<Text>, _>(content.completion_time())
            .bind::<Nullable<Text>, _>(content.completion_date())
            .bind::<Nullable<Text>, _>(content.status())
            .bind::<Nullable<Text>, _>(content.delegation().map(Username::as_str))
            .bind::<Text, _>(owner.as_str())
            .bind::<Text, _>(self.text_search_config.as_str())
            .bind::<Text, _>(document.as_str())
            .get_result(&mut conn)
            .await
            .map_err(|error| map_diesel_error(error, "note insert", Some(owner)))?;
        Ok(NoteId::new(row.id))
    }

    async fn update(
        &self,
        id: NoteId,
        content: &NoteContent,
        document: &SearchDocument,
    ) -> Result<bool, NoteRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let updated = diesel::sql_query(UPDATE_NOTE_SQL)
            .bind::<Text, _>(content.title())
            .bind::<Text, _>(content.note_type())
            .bind::<Text, _>(content.description())
            .bind::<Nullable<Text>, _>(content.completion_time())
            .bind::<Nullable<Text>, _>(content.completion_date())
            .bind::<Nullable<Text>, _>(content.status())
            .bind::<Nullable<Text>, _>(content.delegation().map(Username::as_str))
            .bind::<Text, _>(self.text_search_config.as_str())
            .bind::<Text, _>(document.as_str())
            .bind::<Int8, _>(id.get())
            .execute(&mut conn)
            .await
            .map_err(|error| map_diesel_error(error, "note update", None))?;
        Ok(updated > 0)
    }

    async fn delete(&self, id: NoteId) -> Result<bool, NoteRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let deleted = diesel::delete(notes::table.filter(notes::id.eq(id.get())))
            .execute(&mut conn)
            .await
            .map_err(|error| map_diesel_error(error, "note delete", None))?;
        Ok(deleted > 0)
    }

    async fn find_by_id(&self, id: NoteId) -> Result<Option<Note>, NoteRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let row: Option<NoteRow> = notes::table
            .filter(notes::id.eq(id.get()))
            .select(NoteRow::as_select())
            .first(&mut conn)
            .await
            .optional()
            .map_err(|error| map_diesel_error(error, "note lookup", None))?;
        row.map(Note::try_from)
            .transpose()
            .map_err(NoteRepositoryError::query)
    }

    async fn exists(&self, id: NoteId) -> Result<bool, NoteRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        diesel::select(diesel::dsl::exists(notes::table.filter(notes::id.eq(id.get()))))
            .get_result(&mut conn)
            .await
            .map_err(|error| map_diesel_error(error, "note exists", None))
    }

    async fn owned_or_delegated_rows(
        &self,
        username: &Username,
    ) -> Result<Vec<JoinedNoteRow>, NoteRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let rows: Vec<(NoteRow, Option<String>, Option<String>)> = notes::table
            .left_join(user_shares::table)
            .filter(
                notes::owner
                    .eq(username.as_str())
                    .or(notes::delegation.eq(username.as_str())),
            )
            .select((
                NoteRow::as_select(),
                user_shares::username.nullable(),
                user_shares::privilege.nullable(),
            ))
            .order_by((notes::id.asc(), user_shares::username.nullable().asc()))
            .load(&mut conn)
            .await
            .map_err(|error| map_diesel_error(error, "owned note listing", None))?;
        collect_rows(
            rows.into_iter().map(joined_row_from_tuple),
            NoteRepositoryError::query,
        )
    }

    async fn clear_delegation(&self, id: NoteId) -> Result<bool, NoteRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let updated = diesel::sql_query(CLEAR_DELEGATION_SQL)
            .bind::<Text, _>(self.text_search_config.as_str())
            .bind::<Int8, _>(id.get())
            .execute(&mut conn)
            .await
            .map_err(|error| map_diesel_error(error, "delegation clear", None))?;
        Ok(updated > 0)
    }
}
