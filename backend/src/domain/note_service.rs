//! Note Repository service.
//!
//! Validates note content, derives the search document, and drives the
//! [`NoteRepository`] port under the caller's deadline.

use std::sync::Arc;

use serde_json::json;
use tracing::{debug, info};

use crate::domain::context::within_deadline;
use crate::domain::ports::{NoteRepository, NoteRepositoryError};
use crate::domain::{
    Error, Note, NoteContent, NoteDraft, NoteId, NoteValidationError, NoteWithShares, Removal,
    RequestContext, TextOccurrence, aggregate_note_rows,
};

/// Note lifecycle and owner-scoped listing.
#[derive(Clone)]
pub struct NoteService<N> {
    notes: Arc<N>,
}

impl<N> NoteService<N> {
    pub fn new(notes: Arc<N>) -> Self {
        Self { notes }
    }
}

pub(crate) fn map_note_error(error: NoteRepositoryError) -> Error {
    debug!(%error, "note repository call failed");
    match error {
        NoteRepositoryError::Connection { message } => {
            Error::store(format!("note store unavailable: {message}"))
        }
        NoteRepositoryError::Query { message } => {
            Error::store(format!("note store error: {message}"))
        }
        NoteRepositoryError::MissingOwner { username } => {
            Error::unknown_user(format!("user {username} does not exist"))
        }
    }
}

fn validation_error(error: NoteValidationError) -> Error {
    let field = error.field();
    Error::validation(error.to_string()).with_details(json!({ "field": field }))
}

fn note_not_found(id: NoteId) -> Error {
    Error::not_found(format!("note {id} does not exist")).with_details(json!({ "noteId": id }))
}

impl<N> NoteService<N>
where
    N: NoteRepository,
{
    fn validate(draft: NoteDraft) -> Result<NoteContent, Error> {
        draft.validate().map_err(validation_error)
    }

    /// Create a note owned by the acting user.
    pub async fn create(&self, ctx: &RequestContext, draft: NoteDraft) -> Result<NoteId, Error> {
        let content = Self::validate(draft)?;
        let document = content.search_document();
        let id = within_deadline(
            ctx.deadline(),
            "note insert",
            self.notes.insert(ctx.actor(), &content, &document),
        )
        .await?
        .map_err(map_note_error)?;
        info!(note_id = %id, owner = %ctx.actor(), "note created");
        Ok(id)
    }

    /// Overwrite a note's textual fields and its search vector.
    pub async fn update(
        &self,
        ctx: &RequestContext,
        id: NoteId,
        draft: NoteDraft,
    ) -> Result<(), Error> {
        let content = Self::validate(draft)?;
        let document = content.search_document();
        let updated = within_deadline(
            ctx.deadline(),
            "note update",
            self.notes.update(id, &content, &document),
        )
        .await?
        .map_err(map_note_error)?;
        if !updated {
            return Err(note_not_found(id));
        }
        debug!(note_id = %id, actor = %ctx.actor(), "note updated");
        Ok(())
    }

    /// Delete a note and, through the store, all of its shares.
    ///
    /// Deleting an absent note reports [`Removal::Absent`].
    pub async fn delete(&self, ctx: &RequestContext, id: NoteId) -> Result<Removal, Error> {
        let removed = within_deadline(ctx.deadline(), "note delete", self.notes.delete(id))
            .await?
            .map_err(map_note_error)?;
        let outcome = Removal::from_affected(removed);
        info!(note_id = %id, actor = %ctx.actor(), ?outcome, "note delete");
        Ok(outcome)
    }

    pub async fn get_by_id(&self, ctx: &RequestContext, id: NoteId) -> Result<Note, Error> {
        within_deadline(ctx.deadline(), "note lookup", self.notes.find_by_id(id))
            .await?
            .map_err(map_note_error)?
            .ok_or_else(|| note_not_found(id))
    }

    /// Notes the acting user owns or is delegated, with their shares.
    pub async fn list_owned_or_delegated(
        &self,
        ctx: &RequestContext,
    ) -> Result<Vec<NoteWithShares>, Error> {
        let rows = within_deadline(
            ctx.deadline(),
            "owned note listing",
            self.notes.owned_or_delegated_rows(ctx.actor()),
        )
        .await?
        .map_err(map_note_error)?;
        aggregate_note_rows(rows)
            .map_err(|err| Error::store(format!("malformed note listing: {err}")))
    }

    /// Clear delegation and status. A note without delegation is unchanged.
    pub async fn clear_delegation(&self, ctx: &RequestContext, id: NoteId) -> Result<(), Error> {
        let cleared = within_deadline(
            ctx.deadline(),
            "delegation clear",
            self.notes.clear_delegation(id),
        )
        .await?
        .map_err(map_note_error)?;
        if !cleared {
            return Err(note_not_found(id));
        }
        info!(note_id = %id, actor = %ctx.actor(), "delegation cleared");
        Ok(())
    }

    /// Count case-insensitive occurrences of `pattern` in a note's title and
    /// description.
    pub async fn find_text(
        &self,
        ctx: &RequestContext,
        id: NoteId,
        pattern: &str,
    ) -> Result<Vec<TextOccurrence>, Error> {
        if pattern.is_empty() {
            return Err(Error::validation("search pattern must not be empty"));
        }
        let note = self.get_by_id(ctx, id).await?;
        Ok(note.content().find_text(pattern))
    }
}

#[cfg(test)]
#[path = "note_service_tests.rs"]
mod tests;
