//! Port for note persistence.
//!
//! Adapters store notes together with their full-text search vector. Every
//! write that changes note content recomputes the vector in the same
//! statement, so readers never see content and index out of step.

use async_trait::async_trait;

use crate::domain::{JoinedNoteRow, Note, NoteContent, NoteId, SearchDocument, Username};

use super::define_port_error;

define_port_error! {
    /// Errors raised by note repository adapters.
    pub enum NoteRepositoryError {
        /// Repository connection could not be established.
        Connection { message: String } =>
            "note repository connection failed: {message}",
        /// Query or mutation failed during execution.
        Query { message: String } =>
            "note repository query failed: {message}",
        /// The owner does not exist.
        MissingOwner { username: String } =>
            "note owner does not exist: {username}",
    }
}

/// Port for note storage and owner-scoped listing.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait NoteRepository: Send + Sync {
    /// Insert a note owned by `owner` and return its store-assigned id.
    ///
    /// The creation timestamp is assigned by the store.
    async fn insert(
        &self,
        owner: &Username,
        content: &NoteContent,
        document: &SearchDocument,
    ) -> Result<NoteId, NoteRepositoryError>;

    /// Overwrite the seven textual fields and the search vector.
    ///
    /// Returns `false` when no note has this id.
    async fn update(
        &self,
        id: NoteId,
        content: &NoteContent,
        document: &SearchDocument,
    ) -> Result<bool, NoteRepositoryError>;

    /// Delete a note; its shares go with it. Returns `false` when absent.
    async fn delete(&self, id: NoteId) -> Result<bool, NoteRepositoryError>;

    /// Fetch a note by id.
    async fn find_by_id(&self, id: NoteId) -> Result<Option<Note>, NoteRepositoryError>;

    /// Whether a note with this id exists.
    async fn exists(&self, id: NoteId) -> Result<bool, NoteRepositoryError>;

    /// Notes owned by or delegated to `username`, left-joined to their
    /// shares, ordered by note id then shared username.
    async fn owned_or_delegated_rows(
        &self,
        username: &Username,
    ) -> Result<Vec<JoinedNoteRow>, NoteRepositoryError>;

    /// Clear delegation and status, recomputing the search vector.
    ///
    /// Returns `false` when no note has this id.
    async fn clear_delegation(&self, id: NoteId) -> Result<bool, NoteRepositoryError>;
}

/// Fixture implementation for tests that do not exercise note storage.
#[derive(Debug, Default, Clone, Copy)]
pub struct FixtureNoteRepository;

#[async_trait]
impl NoteRepository for FixtureNoteRepository {
    async fn insert(
        &self,
        _owner: &Username,
        _content: &NoteContent,
        _document: &SearchDocument,
    ) -> Result<NoteId, NoteRepositoryError> {
        Ok(NoteId::new(1))
    }

    async fn update(
        &self,
        _id: NoteId,
        _content: &NoteContent,
        _document: &SearchDocument,
    ) -> Result<bool, NoteRepositoryError> {
        Ok(false)
    }

    async fn delete(&self, _id: NoteId) -> Result<bool, NoteRepositoryError> {
        Ok(false)
    }

    async fn find_by_id(&self, _id: NoteId) -> Result<Option<Note>, NoteRepositoryError> {
        Ok(None)
    }

    async fn exists(&self, _id: NoteId) -> Result<bool, NoteRepositoryError> {
        Ok(false)
    }

    async fn owned_or_delegated_rows(
        &self,
        _username: &Username,
    ) -> Result<Vec<JoinedNoteRow>, NoteRepositoryError> {
        Ok(Vec::new())
    }

    async fn clear_delegation(&self, _id: NoteId) -> Result<bool, NoteRepositoryError> {
        Ok(false)
    }
}
