//! Share Manager service.
//!
//! Grants follow a check-then-act sequence: the user must exist, the note
//! must exist, and no share may already exist for the pair. The existence
//! pre-check only provides an early exit. Two concurrent grants can both
//! pass it, so the store's primary key decides, and a duplicate reported by
//! the insert surfaces as [`ErrorCode::AlreadyShared`] exactly like the
//! pre-check does.
//!
//! [`ErrorCode::AlreadyShared`]: crate::domain::ErrorCode::AlreadyShared

use std::sync::Arc;

use serde_json::json;
use tracing::{debug, info, warn};

use crate::domain::context::within_deadline;
use crate::domain::note_service::map_note_error;
use crate::domain::ports::{NoteRepository, ShareRepository, ShareRepositoryError, UserRepository};
use crate::domain::user_service::map_user_error;
use crate::domain::{
    Error, NoteId, Privilege, Removal, RequestContext, Share, SharedNote, User, Username,
};

/// Grants, revokes, and lists shares.
#[derive(Clone)]
pub struct ShareService<U, N, S> {
    users: Arc<U>,
    notes: Arc<N>,
    shares: Arc<S>,
}

impl<U, N, S> ShareService<U, N, S> {
    pub fn new(users: Arc<U>, notes: Arc<N>, shares: Arc<S>) -> Self {
        Self {
            users,
            notes,
            shares,
        }
    }
}

fn already_shared(note_id: NoteId, username: &Username) -> Error {
    Error::already_shared(format!("note {note_id} is already shared with {username}"))
        .with_details(json!({ "noteId": note_id, "username": username }))
}

fn unknown_user(username: &Username) -> Error {
    Error::unknown_user(format!("user {username} does not exist"))
        .with_details(json!({ "username": username }))
}

fn unknown_note(note_id: NoteId) -> Error {
    Error::unknown_note(format!("note {note_id} does not exist"))
        .with_details(json!({ "noteId": note_id }))
}

fn map_share_error(error: ShareRepositoryError) -> Error {
    debug!(%error, "share repository call failed");
    match error {
        ShareRepositoryError::Connection { message } => {
            Error::store(format!("share store unavailable: {message}"))
        }
        ShareRepositoryError::Query { message } => {
            Error::store(format!("share store error: {message}"))
        }
        ShareRepositoryError::Duplicate { note_id, username } => Error::already_shared(format!(
            "note {note_id} is already shared with {username}"
        )),
        ShareRepositoryError::MissingNote { note_id } => {
            Error::unknown_note(format!("note {note_id} does not exist"))
        }
        ShareRepositoryError::MissingUser { username } => {
            Error::unknown_user(format!("user {username} does not exist"))
        }
    }
}

impl<U, N, S> ShareService<U, N, S>
where
    U: UserRepository,
    N: NoteRepository,
    S: ShareRepository,
{
    /// Share a note with a user at the given privilege.
    ///
    /// Fails with `UnknownUser`, `UnknownNote`, or `AlreadyShared`, checked
    /// in that order. Never overwrites an existing share.
    pub async fn share(
        &self,
        ctx: &RequestContext,
        note_id: NoteId,
        username: &Username,
        privilege: Privilege,
    ) -> Result<Share, Error> {
        let deadline = ctx.deadline();

        let user_exists = within_deadline(deadline, "user lookup", self.users.exists(username))
            .await?
            .map_err(map_user_error)?;
        if !user_exists {
            return Err(unknown_user(username));
        }

        let note_exists = within_deadline(deadline, "note lookup", self.notes.exists(note_id))
            .await?
            .map_err(map_note_error)?;
        if !note_exists {
            return Err(unknown_note(note_id));
        }

        let shared = within_deadline(
            deadline,
            "share lookup",
            self.shares.exists(note_id, username),
        )
        .await?
        .map_err(map_share_error)?;
        if shared {
            return Err(already_shared(note_id, username));
        }

        let share = Share {
            note_id,
            username: username.clone(),
            privilege,
        };
        match within_deadline(deadline, "share insert", self.shares.insert(&share)).await? {
            Ok(()) => {}
            Err(ShareRepositoryError::Duplicate { .. }) => {
                warn!(
                    note_id = %note_id,
                    username = %username,
                    "concurrent share caught by the store uniqueness guard"
                );
                return Err(already_shared(note_id, username));
            }
            Err(ShareRepositoryError::MissingNote { .. }) => return Err(unknown_note(note_id)),
            Err(ShareRepositoryError::MissingUser { .. }) => return Err(unknown_user(username)),
            Err(other) => return Err(map_share_error(other)),
        }

        info!(
            note_id = %note_id,
            username = %username,
            privilege = %privilege,
            actor = %ctx.actor(),
            "note shared"
        );
        Ok(share)
    }

    /// Revoke a share. Revoking an absent share reports [`Removal::Absent`].
    pub async fn unshare(
        &self,
        ctx: &RequestContext,
        note_id: NoteId,
        username: &Username,
    ) -> Result<Removal, Error> {
        let removed = within_deadline(
            ctx.deadline(),
            "share delete",
            self.shares.delete(note_id, username),
        )
        .await?
        .map_err(map_share_error)?;
        let outcome = Removal::from_affected(removed);
        info!(
            note_id = %note_id,
            username = %username,
            actor = %ctx.actor(),
            ?outcome,
            "note unshared"
        );
        Ok(outcome)
    }

    /// Change the privilege of an existing share.
    ///
    /// Fails with `NotFound` when the note is not shared with the user.
    pub async fn update_privilege(
        &self,
        ctx: &RequestContext,
        note_id: NoteId,
        username: &Username,
        privilege: Privilege,
    ) -> Result<(), Error> {
        let updated = within_deadline(
            ctx.deadline(),
            "share privilege update",
            self.shares.update_privilege(note_id, username, privilege),
        )
        .await?
        .map_err(map_share_error)?;
        if !updated {
            return Err(Error::not_found(format!(
                "note {note_id} is not shared with {username}"
            ))
            .with_details(json!({ "noteId": note_id, "username": username })));
        }
        info!(note_id = %note_id, username = %username, privilege = %privilege, "privilege updated");
        Ok(())
    }

    pub async fn list_shares_for_note(
        &self,
        ctx: &RequestContext,
        note_id: NoteId,
    ) -> Result<Vec<Share>, Error> {
        within_deadline(
            ctx.deadline(),
            "share listing",
            self.shares.list_for_note(note_id),
        )
        .await?
        .map_err(map_share_error)
    }

    /// Users other than `excluded` who do not yet have a share on the note.
    ///
    /// Together with [`Self::list_shares_for_note`] this partitions every
    /// user except `excluded`.
    pub async fn list_unshared_users(
        &self,
        ctx: &RequestContext,
        note_id: NoteId,
        excluded: &Username,
    ) -> Result<Vec<User>, Error> {
        within_deadline(
            ctx.deadline(),
            "unshared user listing",
            self.shares.list_unshared_users(note_id, excluded),
        )
        .await?
        .map_err(map_share_error)
    }

    /// Notes shared with the acting user, each with that share's privilege.
    pub async fn list_shared_notes(&self, ctx: &RequestContext) -> Result<Vec<SharedNote>, Error> {
        within_deadline(
            ctx.deadline(),
            "shared note listing",
            self.shares.shared_notes_for(ctx.actor()),
        )
        .await?
        .map_err(map_share_error)
    }
}

#[cfg(test)]
#[path = "share_service_tests.rs"]
mod tests;
