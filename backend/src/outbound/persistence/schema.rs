//! Diesel table definitions for the PostgreSQL schema.
//!
//! These definitions must match the database migrations exactly. They are used
//! by Diesel for compile-time query validation and type-safe SQL generation.
//!
//! The `notes.search_text` `tsvector` column is deliberately absent: it is
//! only ever written and matched through raw SQL in the note repository and
//! the search query, so no Diesel query selects it.

diesel::table! {
    /// Registered users.
    users (username) {
        /// Primary key (max 50 characters).
        username -> Varchar,
        /// Credential hash produced outside the engine.
        password_hash -> Varchar,
    }
}

diesel::table! {
    /// Notes with their owner and optional scheduling fields.
    notes (id) {
        /// Primary key assigned from a sequence.
        id -> Int8,
        title -> Varchar,
        note_type -> Varchar,
        description -> Varchar,
        /// Server-assigned creation timestamp.
        created_at -> Timestamptz,
        completion_time -> Nullable<Varchar>,
        completion_date -> Nullable<Varchar>,
        status -> Nullable<Varchar>,
        delegation -> Nullable<Varchar>,
        /// Owning user; deleting the user deletes the note.
        owner -> Varchar,
    }
}

diesel::table! {
    /// Share grants keyed by `(note_id, username)`.
    user_shares (note_id, username) {
        note_id -> Int8,
        username -> Varchar,
        /// Either `viewer` or `editor`.
        privilege -> Varchar,
    }
}

diesel::joinable!(notes -> users (owner));
diesel::joinable!(user_shares -> notes (note_id));
diesel::joinable!(user_shares -> users (username));

diesel::allow_tables_to_appear_in_same_query!(notes, user_shares, users);
