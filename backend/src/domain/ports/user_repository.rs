//! Port abstraction for user persistence adapters and their errors.
use async_trait::async_trait;

use crate::domain::{User, Username};

use super::define_port_error;

define_port_error! {
    /// Persistence errors raised by user repository adapters.
    pub enum UserPersistenceError {
        /// Repository connection could not be established.
        Connection { message: String } => "user repository connection failed: {message}",
        /// Query or mutation failed during execution.
        Query { message: String } => "user repository query failed: {message}",
        /// The username is already registered.
        Duplicate { username: String } => "user already exists: {username}",
    }
}

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait UserRepository: Send + Sync {
    /// Insert a new user. Fails with `Duplicate` when the username is taken.
    async fn insert(&self, user: &User) -> Result<(), UserPersistenceError>;

    /// Whether a user with this username exists.
    async fn exists(&self, username: &Username) -> Result<bool, UserPersistenceError>;

    /// Fetch a user by username.
    async fn find(&self, username: &Username) -> Result<Option<User>, UserPersistenceError>;

    /// Every user except `excluded`, ordered by username.
    async fn list_except(&self, excluded: &Username) -> Result<Vec<User>, UserPersistenceError>;
}

/// Fixture implementation for tests that do not exercise user storage.
#[derive(Debug, Default, Clone, Copy)]
pub struct FixtureUserRepository;

#[async_trait]
impl UserRepository for FixtureUserRepository {
    async fn insert(&self, _user: &User) -> Result<(), UserPersistenceError> {
        Ok(())
    }

    async fn exists(&self, _username: &Username) -> Result<bool, UserPersistenceError> {
        Ok(false)
    }

    async fn find(&self, _username: &Username) -> Result<Option<User>, UserPersistenceError> {
        Ok(None)
    }

    async fn list_except(&self, _excluded: &Username) -> Result<Vec<User>, UserPersistenceError> {
        Ok(Vec::new())
    }
}

#[cfg(test)]
mod tests {
    //! Regression coverage for this module.
    use super::*;
    use rstest::{fixture, rstest};

    #[fixture]
    fn alice() -> Username {
        Username::new("alice").expect("valid username")
    }

    #[rstest]
    #[tokio::test]
    async fn fixture_reports_no_users(alice: Username) {
        let repo = FixtureUserRepository;
        assert!(!repo.exists(&alice).await.expect("fixture exists"));
        assert!(repo.find(&alice).await.expect("fixture find").is_none());
        assert!(repo.list_except(&alice).await.expect("fixture list").is_empty());
    }

    #[rstest]
    fn duplicate_error_names_the_user() {
        let err = UserPersistenceError::duplicate("alice");
        assert_eq!(err.to_string(), "user already exists: alice");
    }
}
