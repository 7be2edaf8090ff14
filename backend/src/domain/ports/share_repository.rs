//! Port for share persistence.
//!
//! The store's primary key on `(note_id, username)` is the authoritative
//! guard against duplicate shares; adapters surface a violation as
//! [`ShareRepositoryError::Duplicate`]. Foreign-key violations surface as
//! `MissingNote` or `MissingUser`.

use async_trait::async_trait;

use crate::domain::{NoteId, Privilege, Share, SharedNote, User, Username};

use super::define_port_error;

define_port_error! {
    /// Errors raised by share repository adapters.
    pub enum ShareRepositoryError {
        /// Repository connection could not be established.
        Connection { message: String } =>
            "share repository connection failed: {message}",
        /// Query or mutation failed during execution.
        Query { message: String } =>
            "share repository query failed: {message}",
        /// A share for this note and user already exists.
        Duplicate { note_id: i64, username: String } =>
            "note {note_id} is already shared with {username}",
        /// The referenced note does not exist.
        MissingNote { note_id: i64 } =>
            "note does not exist: {note_id}",
        /// The referenced user does not exist.
        MissingUser { username: String } =>
            "user does not exist: {username}",
    }
}

/// Port for granting, revoking, and listing shares.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ShareRepository: Send + Sync {
    /// Insert a share. Never overwrites an existing one.
    async fn insert(&self, share: &Share) -> Result<(), ShareRepositoryError>;

    /// Whether a share exists for the pair.
    async fn exists(&self, note_id: NoteId, username: &Username)
    -> Result<bool, ShareRepositoryError>;

    /// Remove a share. Returns `false` when there was none.
    async fn delete(&self, note_id: NoteId, username: &Username)
    -> Result<bool, ShareRepositoryError>;

    /// Change the privilege of an existing share. Returns `false` when there
    /// was none.
    async fn update_privilege(
        &self,
        note_id: NoteId,
        username: &Username,
        privilege: Privilege,
    ) -> Result<bool, ShareRepositoryError>;

    /// Shares of a note, ordered by username.
    async fn list_for_note(&self, note_id: NoteId) -> Result<Vec<Share>, ShareRepositoryError>;

    /// Users other than `excluded` without a share on the note, ordered by
    /// username.
    async fn list_unshared_users(
        &self,
        note_id: NoteId,
        excluded: &Username,
    ) -> Result<Vec<User>, ShareRepositoryError>;

    /// Notes shared with `username`, each with that share's privilege,
    /// ordered by note id.
    async fn shared_notes_for(
        &self,
        username: &Username,
    ) -> Result<Vec<SharedNote>, ShareRepositoryError>;
}

/// Fixture implementation for tests that do not exercise sharing.
#[derive(Debug, Default, Clone, Copy)]
pub struct FixtureShareRepository;

#[async_trait]
impl ShareRepository for FixtureShareRepository {
    async fn insert(&self, _share: &Share) -> Result<(), ShareRepositoryError> {
        Ok(())
    }

    async fn exists(
        &self,
        _note_id: NoteId,
        _username: &Username,
    ) -> Result<bool, ShareRepositoryError> {
        Ok(false)
    }

    async fn delete(
        &self,
        _note_id: NoteId,
        _username: &Username,
    ) -> Result<bool, ShareRepositoryError> {
        Ok(false)
    }

    async fn update_privilege(
        &self,
        _note_id: NoteId,
        _username: &Username,
        _privilege: Privilege,
    ) -> Result<bool, ShareRepositoryError> {
        Ok(false)
    }

    async fn list_for_note(&self, _note_id: NoteId) -> Result<Vec<Share>, ShareRepositoryError> {
        Ok(Vec::new())
    }

    async fn list_unshared_users(
        &self,
        _note_id: NoteId,
        _excluded: &Username,
    ) -> Result<Vec<User>, ShareRepositoryError> {
        Ok(Vec::new())
    }

    async fn shared_notes_for(
        &self,
        _username: &Username,
    ) -> Result<Vec<SharedNote>, ShareRepositoryError> {
        Ok(Vec::new())
    }
}

#[cfg(test)]
mod tests {
    //! Regression coverage for this module.
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case(ShareRepositoryError::duplicate(3_i64, "bob"), "note 3 is already shared with bob")]
    #[case(ShareRepositoryError::missing_note(9_i64), "note does not exist: 9")]
    #[case(ShareRepositoryError::missing_user("zed"), "user does not exist: zed")]
    fn errors_render_context(#[case] err: ShareRepositoryError, #[case] expected: &str) {
        assert_eq!(err.to_string(), expected);
    }

    #[tokio::test]
    async fn fixture_reports_no_shares() {
        let repo = FixtureShareRepository;
        let bob = Username::new("bob").expect("valid username");
        let note_id = NoteId::new(1);
        assert!(!repo.exists(note_id, &bob).await.expect("fixture exists"));
        assert!(!repo.delete(note_id, &bob).await.expect("fixture delete"));
        assert!(repo.list_for_note(note_id).await.expect("fixture list").is_empty());
    }
}
