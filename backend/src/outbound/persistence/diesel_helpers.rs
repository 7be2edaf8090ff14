//! Shared helpers for Diesel repository implementations.
//!
//! This module provides common utilities for database access including:
//! - Extracting messages from pool errors
//! - Classifying Diesel errors by constraint kind
//! - Resolving which foreign key a violation refers to
//! - Collecting fallible row conversions

use diesel::result::{DatabaseErrorKind, Error as DieselError};
use tracing::{debug, warn};

use super::pool::PoolError;

/// Constraint guarding `notes.owner`.
pub const NOTES_OWNER_FKEY: &str = "notes_owner_fkey";
/// Constraint guarding `user_shares.note_id`.
pub const SHARES_NOTE_FKEY: &str = "user_shares_note_id_fkey";
/// Constraint guarding `user_shares.username`.
pub const SHARES_USER_FKEY: &str = "user_shares_username_fkey";

/// Extract a readable message from a pool error.
pub fn map_pool_error_message(error: PoolError) -> String {
    match error {
        PoolError::Checkout { message }
        | PoolError::Build { message }
        | PoolError::Ping { message } => message,
    }
}

/// Table a violated foreign key points at.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ForeignKeyTarget {
    Note,
    User,
}

/// Diesel failure reduced to what the adapters distinguish.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StoreFailure {
    /// A primary key or unique constraint rejected the write.
    UniqueViolation,
    /// A foreign key rejected the write; `None` when unrecognised.
    ForeignKeyViolation(Option<ForeignKeyTarget>),
    /// The connection dropped mid-statement.
    Connection(String),
    /// Anything else.
    Query(String),
}

/// Resolve a foreign key violation to the table it references.
///
/// The constraint name decides when the driver reports one; otherwise the
/// message is inspected. Unrecognised violations are logged.
pub fn foreign_key_target(message: &str, constraint_name: Option<&str>) -> Option<ForeignKeyTarget> {
    let haystack = constraint_name.unwrap_or(message).to_lowercase();
    let target = if haystack.contains(SHARES_NOTE_FKEY) {
        Some(ForeignKeyTarget::Note)
    } else if haystack.contains(SHARES_USER_FKEY) || haystack.contains(NOTES_OWNER_FKEY) {
        Some(ForeignKeyTarget::User)
    } else {
        None
    };
    if target.is_none() {
        warn!(
            message,
            constraint_name = ?constraint_name,
            "unrecognised foreign key violation - may need specific error mapping"
        );
    }
    target
}

/// Classify a Diesel error and emit debug context naming the operation.
pub fn classify_diesel_error(error: DieselError, operation: &str) -> StoreFailure {
    match &error {
        DieselError::DatabaseError(kind, info) => {
            debug!(?kind, message = info.message(), %operation, "diesel operation failed");
        }
        _ => debug!(%error, %operation, "diesel operation failed"),
    }

    match error {
        DieselError::DatabaseError(DatabaseErrorKind::UniqueViolation, _) => {
            StoreFailure::UniqueViolation
        }
        DieselError::DatabaseError(DatabaseErrorKind::ForeignKeyViolation, info) => {
            StoreFailure::ForeignKeyViolation(foreign_key_target(
                info.message(),
                info.constraint_name(),
            ))
        }
        DieselError::DatabaseError(DatabaseErrorKind::ClosedConnection, _) => {
            StoreFailure::Connection("database connection error".to_owned())
        }
        DieselError::NotFound => StoreFailure::Query("record not found".to_owned()),
        DieselError::QueryBuilderError(_) => {
            StoreFailure::Query("database query error".to_owned())
        }
        other => StoreFailure::Query(format!("{operation} failed: {other}")),
    }
}

/// Collect row conversion results, mapping the first error through `map_err`.
pub fn collect_rows<T, E>(
    results: impl Iterator<Item = Result<T, String>>,
    map_err: impl FnOnce(String) -> E,
) -> Result<Vec<T>, E> {
    results.collect::<Result<Vec<_>, _>>().map_err(map_err)
}

#[cfg(test)]
mod tests {
    //! Regression coverage for this module.
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case(Some("user_shares_note_id_fkey"), "", Some(ForeignKeyTarget::Note))]
    #[case(Some("user_shares_username_fkey"), "", Some(ForeignKeyTarget::User))]
    #[case(Some("notes_owner_fkey"), "", Some(ForeignKeyTarget::User))]
    #[case(
        None,
        "insert or update on table \"user_shares\" violates foreign key constraint \"user_shares_note_id_fkey\"",
        Some(ForeignKeyTarget::Note)
    )]
    #[case(Some("other_fkey"), "", None)]
    fn resolves_foreign_key_targets(
        #[case] constraint: Option<&str>,
        #[case] message: &str,
        #[case] expected: Option<ForeignKeyTarget>,
    ) {
        assert_eq!(foreign_key_target(message, constraint), expected);
    }

    #[rstest]
    fn classifies_not_found_as_query() {
        assert_eq!(
            classify_diesel_error(DieselError::NotFound, "lookup"),
            StoreFailure::Query("record not found".to_owned())
        );
    }

    #[rstest]
    fn pool_messages_are_extracted() {
        assert_eq!(map_pool_error_message(PoolError::checkout("timed out")), "timed out");
    }

    #[rstest]
    fn collect_rows_reports_first_error() {
        let rows = vec![Ok(1), Err("bad row".to_owned()), Err("later".to_owned())];
        let result: Result<Vec<i32>, String> =
            collect_rows(rows.into_iter(), |message| format!("conversion: {message}"));
        assert_eq!(result, Err("conversion: bad row".to_owned()));
    }
}
