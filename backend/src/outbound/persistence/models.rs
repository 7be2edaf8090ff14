//! Internal Diesel row structs for database operations.
//!
//! These types are implementation details of the persistence layer and must
//! never be exposed to the domain. They exist solely to satisfy Diesel's
//! type requirements for queries and mutations.

use chrono::{DateTime, Utc};
use diesel::prelude::*;
use diesel::sql_types::{Int8, Nullable, Text};

use crate::domain::{
    JoinedNoteRow, Note, NoteDraft, NoteId, Privilege, Share, SharedNote, User, Username,
};

use super::schema::{notes, user_shares, users};

/// Row struct for reading from the users table.
#[derive(Debug, Clone, Queryable, Selectable)]
#[diesel(table_name = users)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub(crate) struct UserRow {
    pub username: String,
    pub password_hash: String,
}

/// Insertable struct for creating new user records.
#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = users)]
pub(crate) struct NewUserRow<'a> {
    pub username: &'a str,
    pub password_hash: &'a str,
}

impl<'a> From<&'a User> for NewUserRow<'a> {
    fn from(user: &'a User) -> Self {
        Self {
            username: user.username().as_str(),
            password_hash: user.credential_hash().expose(),
        }
    }
}

impl TryFrom<UserRow> for User {
    type Error = String;

    fn try_from(row: UserRow) -> Result<Self, Self::Error> {
        User::try_from_strings(row.username, row.password_hash).map_err(|err| err.to_string())
    }
}

/// Row struct for reading note columns, through the DSL or raw SQL.
#[derive(Debug, Clone, Queryable, Selectable, QueryableByName)]
#[diesel(table_name = notes)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub(crate) struct NoteRow {
    pub id: i64,
    pub title: String,
    pub note_type: String,
    pub description: String,
    pub created_at: DateTime<Utc>,
    pub completion_time: Option<String>,
    pub completion_date: Option<String>,
    pub status: Option<String>,
    pub delegation: Option<String>,
    pub owner: String,
}

impl TryFrom<NoteRow> for Note {
    type Error = String;

    fn try_from(row: NoteRow) -> Result<Self, Self::Error> {
        let NoteRow {
            id,
            title,
            note_type,
            description,
            created_at,
            completion_time,
            completion_date,
            status,
            delegation,
            owner,
        } = row;
        let content = NoteDraft {
            title,
            note_type,
            description,
            completion_time,
            completion_date,
            status,
            delegation,
        }
        .validate()
        .map_err(|err| format!("stored note {id} is invalid: {err}"))?;
        let owner =
            Username::new(owner).map_err(|err| format!("stored note {id} has bad owner: {err}"))?;
        Ok(Note::new(NoteId::new(id), content, created_at, owner))
    }
}

/// A note left-joined to one of its shares, as returned by raw SQL.
#[derive(Debug, Clone, QueryableByName)]
pub(crate) struct JoinedNoteSqlRow {
    #[diesel(embed)]
    pub note: NoteRow,
    #[diesel(sql_type = Nullable<Text>)]
    pub shared_username: Option<String>,
    #[diesel(sql_type = Nullable<Text>)]
    pub shared_privilege: Option<String>,
}

impl TryFrom<JoinedNoteSqlRow> for JoinedNoteRow {
    type Error = String;

    fn try_from(row: JoinedNoteSqlRow) -> Result<Self, Self::Error> {
        Ok(Self {
            note: Note::try_from(row.note)?,
            shared_username: row.shared_username,
            shared_privilege: row.shared_privilege,
        })
    }
}

/// A note together with the privilege of one share of it.
pub(crate) fn shared_note_from_row(
    (note, privilege): (NoteRow, String),
) -> Result<SharedNote, String> {
    Ok(SharedNote {
        note: Note::try_from(note)?,
        privilege: privilege.parse::<Privilege>().map_err(|err| err.to_string())?,
    })
}

/// Note columns left-joined to nullable share columns through the DSL.
pub(crate) fn joined_row_from_tuple(
    (note, shared_username, shared_privilege): (NoteRow, Option<String>, Option<String>),
) -> Result<JoinedNoteRow, String> {
    Ok(JoinedNoteRow {
        note: Note::try_from(note)?,
        shared_username,
        shared_privilege,
    })
}

/// Identifier returned by `INSERT ... RETURNING id`.
#[derive(Debug, Clone, Copy, QueryableByName)]
pub(crate) struct InsertedIdRow {
    #[diesel(sql_type = Int8)]
    pub id: i64,
}

/// Row struct for reading from the user_shares table.
#[derive(Debug, Clone, Queryable, Selectable)]
#[diesel(table_name = user_shares)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub(crate) struct ShareRow {
    pub note_id: i64,
    pub username: String,
    pub privilege: String,
}

/// Insertable struct for creating new share records.
#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = user_shares)]
pub(crate) struct NewShareRow<'a> {
    pub note_id: i64,
    pub username: &'a str,
    pub privilege: &'a str,
}

impl<'a> From<&'a Share> for NewShareRow<'a> {
    fn from(share: &'a Share) -> Self {
        Self {
            note_id: share.note_id.get(),
            username: share.username.as_str(),
            privilege: share.privilege.as_str(),
        }
    }
}

impl TryFrom<ShareRow> for Share {
    type Error = String;

    fn try_from(row: ShareRow) -> Result<Self, Self::Error> {
        Ok(Share {
            note_id: NoteId::new(row.note_id),
            username: Username::new(row.username).map_err(|err| err.to_string())?,
            privilege: row
                .privilege
                .parse::<Privilege>()
                .map_err(|err| err.to_string())?,
        })
    }
}
