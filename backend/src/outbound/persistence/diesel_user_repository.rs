//! PostgreSQL-backed `UserRepository` implementation using Diesel ORM.

use async_trait::async_trait;
use diesel::prelude::*;
use diesel_async::RunQueryDsl;

use crate::domain::ports::{UserPersistenceError, UserRepository};
use crate::domain::{User, Username};

use super::diesel_basic_error_mapping::{map_basic_diesel_error, map_basic_pool_error};
use super::diesel_helpers::{StoreFailure, classify_diesel_error, collect_rows};
use super::models::{NewUserRow, UserRow};
use super::pool::{DbPool, PoolError};
use super::schema::users;

/// Diesel-backed implementation of the `UserRepository` port.
#[derive(Clone)]
pub struct DieselUserRepository {
    pool: DbPool,
}

impl DieselUserRepository {
    /// Create a new repository with the given connection pool.
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

fn map_pool_error(error: PoolError) -> UserPersistenceError {
    map_basic_pool_error(error, UserPersistenceError::connection)
}

fn map_diesel_error(error: diesel::result::Error, operation: &str) -> UserPersistenceError {
    map_basic_diesel_error(
        error,
        operation,
        UserPersistenceError::query,
        UserPersistenceError::connection,
    )
}

#[async_trait]
impl UserRepository for DieselUserRepository {
    async fn insert(&self, user: &User) -> Result<(), UserPersistenceError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        diesel::insert_into(users::table)
            .values(NewUserRow::from(user))
            .execute(&mut conn)
            .await
            .map(|_| ())
            .map_err(|error| match classify_diesel_error(error, "user insert") {
                StoreFailure::UniqueViolation => {
                    UserPersistenceError::duplicate(user.username().as_str())
                }
                StoreFailure::Connection(message) => UserPersistenceError::connection(message),
                StoreFailure::Query(message) => UserPersistenceError::query(message),
                StoreFailure::ForeignKeyViolation(_) => {
                    UserPersistenceError::query("unexpected foreign key violation")
                }
            })
    }

    async fn exists(&self, username: &Username) -> Result<bool, UserPersistenceError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        diesel::select(diesel::dsl::exists(
            users::table.filter(users::username.eq(username.as_str())),
        ))
        .get_result(&mut conn)
        .await
        .map_err(|error| map_diesel_error(error, "user exists"))
    }

    async fn find(&self, username: &Username) -> Result<Option<User>, UserPersistenceError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let row: Option<UserRow> = users::table
            .filter(users::username.eq(username.as_str()))
            .select(UserRow::as_select())
            .first(&mut conn)
            .await
            .optional()
            .map_err(|error| map_diesel_error(error, "user lookup"))?;
        row.map(User::try_from)
            .transpose()
            .map_err(UserPersistenceError::query)
    }

    async fn list_except(&self, excluded: &Username) -> Result<Vec<User>, UserPersistenceError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let rows: Vec<UserRow> = users::table
            .filter(users::username.ne(excluded.as_str()))
            .select(UserRow::as_select())
            .order_by(users::username.asc())
            .load(&mut conn)
            .await
            .map_err(|error| map_diesel_error(error, "user listing"))?;
        collect_rows(
            rows.into_iter().map(User::try_from),
            UserPersistenceError::query,
        )
    }
}
