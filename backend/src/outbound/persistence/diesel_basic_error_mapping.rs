//! Shared Diesel error mapping for ports with basic query semantics.
//!
//! Ports whose error enums only distinguish connection failures from query
//! failures route every Diesel and pool error through these helpers.

use super::diesel_helpers::{StoreFailure, classify_diesel_error, map_pool_error_message};
use super::pool::PoolError;

/// Map pool errors into a port-specific connection error constructor.
pub fn map_basic_pool_error<E, C>(error: PoolError, connection: C) -> E
where
    C: FnOnce(String) -> E,
{
    connection(map_pool_error_message(error))
}

/// Map Diesel errors into query/connection constructors.
///
/// Constraint violations are reported as query errors here; adapters that
/// care about them classify the error themselves.
pub fn map_basic_diesel_error<E, Q, C>(
    error: diesel::result::Error,
    operation: &str,
    query: Q,
    connection: C,
) -> E
where
    Q: FnOnce(String) -> E,
    C: FnOnce(String) -> E,
{
    match classify_diesel_error(error, operation) {
        StoreFailure::Connection(message) => connection(message),
        StoreFailure::Query(message) => query(message),
        StoreFailure::UniqueViolation => query(format!("{operation}: unique constraint violated")),
        StoreFailure::ForeignKeyViolation(_) => {
            query(format!("{operation}: foreign key constraint violated"))
        }
    }
}
