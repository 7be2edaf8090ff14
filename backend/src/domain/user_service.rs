//! User registration and directory.

use std::sync::Arc;

use tracing::{debug, info};

use crate::domain::context::within_deadline;
use crate::domain::ports::{UserPersistenceError, UserRepository};
use crate::domain::{CredentialHash, Error, RequestContext, User};

pub(crate) fn map_user_error(error: UserPersistenceError) -> Error {
    debug!(%error, "user repository call failed");
    match error {
        UserPersistenceError::Connection { message } => {
            Error::store(format!("user store unavailable: {message}"))
        }
        UserPersistenceError::Query { message } => {
            Error::store(format!("user store error: {message}"))
        }
        UserPersistenceError::Duplicate { username } => {
            Error::validation(format!("username {username} is already taken"))
        }
    }
}

/// Registers users and lists share candidates.
#[derive(Clone)]
pub struct UserService<U> {
    users: Arc<U>,
}

impl<U> UserService<U> {
    pub fn new(users: Arc<U>) -> Self {
        Self { users }
    }
}

impl<U> UserService<U>
where
    U: UserRepository,
{
    /// Register the acting user with an already-hashed credential.
    pub async fn register(
        &self,
        ctx: &RequestContext,
        credential_hash: CredentialHash,
    ) -> Result<User, Error> {
        let user = User::new(ctx.actor().clone(), credential_hash);
        within_deadline(ctx.deadline(), "user insert", self.users.insert(&user))
            .await?
            .map_err(map_user_error)?;
        info!(username = %user.username(), "user registered");
        Ok(user)
    }

    /// Every registered user except the actor.
    pub async fn list_other_users(&self, ctx: &RequestContext) -> Result<Vec<User>, Error> {
        within_deadline(
            ctx.deadline(),
            "user listing",
            self.users.list_except(ctx.actor()),
        )
        .await?
        .map_err(map_user_error)
    }
}
