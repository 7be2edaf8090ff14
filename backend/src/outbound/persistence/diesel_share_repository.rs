//! PostgreSQL-backed `ShareRepository` implementation using Diesel ORM.
//!
//! The `(note_id, username)` primary key is the guard against duplicate
//! shares, so an insert that loses a race surfaces as
//! [`ShareRepositoryError::Duplicate`] rather than overwriting.

use async_trait::async_trait;
use diesel::prelude::*;
use diesel_async::RunQueryDsl;

use crate::domain::ports::{ShareRepository, ShareRepositoryError};
use crate::domain::{NoteId, Privilege, Share, SharedNote, User, Username};

use super::diesel_helpers::{
    ForeignKeyTarget, StoreFailure, classify_diesel_error, collect_rows, map_pool_error_message,
};
use super::models::{NewShareRow, NoteRow, ShareRow, UserRow, shared_note_from_row};
use super::pool::{DbPool, PoolError};
use super::schema::{notes, user_shares, users};

/// Diesel-backed implementation of the `ShareRepository` port.
#[derive(Clone)]
pub struct DieselShareRepository {
    pool: DbPool,
}

impl DieselShareRepository {
    /// Create a new repository with the given connection pool.
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

fn map_pool_error(error: PoolError) -> ShareRepositoryError {
    ShareRepositoryError::connection(map_pool_error_message(error))
}

fn map_failure(failure: StoreFailure) -> ShareRepositoryError {
    match failure {
        StoreFailure::Connection(message) => ShareRepositoryError::connection(message),
        StoreFailure::Query(message) => ShareRepositoryError::query(message),
        StoreFailure::UniqueViolation => ShareRepositoryError::query("unique constraint violated"),
        StoreFailure::ForeignKeyViolation(_) => {
            ShareRepositoryError::query("foreign key violation")
        }
    }
}

fn map_diesel_error(error: diesel::result::Error, operation: &str) -> ShareRepositoryError {
    map_failure(classify_diesel_error(error, operation))
}

fn map_insert_error(error: diesel::result::Error, share: &Share) -> ShareRepositoryError {
    match classify_diesel_error(error, "share insert") {
        StoreFailure::UniqueViolation => {
            ShareRepositoryError::duplicate(share.note_id, share.username.as_str())
        }
        StoreFailure::ForeignKeyViolation(Some(ForeignKeyTarget::Note)) => {
            ShareRepositoryError::missing_note(share.note_id)
        }
        StoreFailure::ForeignKeyViolation(Some(ForeignKeyTarget::User)) => {
            ShareRepositoryError::missing_user(share.username.as_str())
        }
        other => map_failure(other),
    }
}

#[async_trait]
impl ShareRepository for DieselShareRepository {
    async fn insert(&self, share: &Share) -> Result<(), ShareRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        diesel::insert_into(user_shares::table)
            .values(NewShareRow::from(share))
            .execute(&mut conn)
            .await
            .map(|_| ())
            .map_err(|error| map_insert_error(error, share))
    }

    async fn exists(
        &self,
        note_id: NoteId,
        username: &Username,
    ) -> Result<bool, ShareRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        diesel::select(diesel::dsl::exists(
            user_shares::table
                .filter(user_shares::note_id.eq(note_id.get()))
                .filter(user_shares::username.eq(username.as_str())),
        ))
        .get_result(&mut conn)
        .await
        .map_err(|error| map_diesel_error(error, "share exists"))
    }

    async fn delete(
        &self,
        note_id: NoteId,
        username: &Username,
    ) -> Result<bool, ShareRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let deleted = diesel::delete(
            user_shares::table
                .filter(user_shares::note_id.eq(note_id.get()))
                .filter(user_shares::username.eq(username.as_str())),
        )
        .execute(&mut conn)
        .await
        .map_err(|error| map_diesel_error(error, "share delete"))?;
        Ok(deleted > 0)
    }

    async fn update_privilege(
        &self,
        note_id: NoteId,
        username: &Username,
        privilege: Privilege,
    ) -> Result<bool, ShareRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let updated = diesel::update(
            user_shares::table
                .filter(user_shares::note_id.eq(note_id.get()))
                .filter(user_shares::username.eq(username.as_str())),
        )
        .set(user_shares::privilege.eq(privilege.as_str()))
        .execute(&mut conn)
        .await
        .map_err(|error| map_diesel_error(error, "share privilege update"))?;
        Ok(updated > 0)
    }

    async fn list_for_note(&self, note_id: NoteId) -> Result<Vec<Share>, ShareRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let rows: Vec<ShareRow> = user_shares::table
            .filter(user_shares::note_id.eq(note_id.get()))
            .select(ShareRow::as_select())
            .order_by(user_shares::username.asc())
            .load(&mut conn)
            .await
            .map_err(|error| map_diesel_error(error, "share listing"))?;
        collect_rows(
            rows.into_iter().map(Share::try_from),
            ShareRepositoryError::query,
        )
    }

    async fn list_unshared_users(
        &self,
        note_id: NoteId,
        excluded: &Username,
    ) -> Result<Vec<User>, ShareRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let already_shared = user_shares::table
            .filter(user_shares::note_id.eq(note_id.get()))
            .select(user_shares::username);
        let rows: Vec<UserRow> = users::table
            .filter(users::username.ne(excluded.as_str()))
            .filter(users::username.ne_all(already_shared))
            .select(UserRow::as_select())
            .order_by(users::username.asc())
            .load(&mut conn)
            .await
            .map_err(|error| map_diesel_error(error, "unshared user listing"))?;
        collect_rows(
            rows.into_iter().map(User::try_from),
            ShareRepositoryError::query,
        )
    }

    async fn shared_notes_for(
        &self,
        username: &Username,
    ) -> Result<Vec<SharedNote>, ShareRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let rows: Vec<(NoteRow, String)> = notes::table
            .inner_join(user_shares::table)
            .filter(user_shares::username.eq(username.as_str()))
            .select((NoteRow::as_select(), user_shares::privilege))
            .order_by(notes::id.asc())
            .load(&mut conn)
            .await
            .map_err(|error| map_diesel_error(error, "shared note listing"))?;
        collect_rows(
            rows.into_iter().map(shared_note_from_row),
            ShareRepositoryError::query,
        )
    }
}
