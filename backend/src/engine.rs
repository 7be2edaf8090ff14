//! Engine facade wiring the domain services to a set of store adapters.
//!
//! Callers build one [`NotesEngine`] at start-up and derive a
//! [`RequestContext`] per request through [`NotesEngine::context`].

use std::sync::Arc;
use std::time::Duration;

use crate::config::NoteshareSettings;
use crate::domain::ports::{NoteRepository, NoteSearchQuery, ShareRepository, UserRepository};
use crate::domain::{
    NoteService, RequestContext, SearchService, ShareService, UserService, Username,
};
use crate::outbound::persistence::{
    DbPool, DieselNoteRepository, DieselNoteSearchQuery, DieselShareRepository,
    DieselUserRepository,
};

/// Engine backed by the PostgreSQL adapters.
pub type PostgresNotesEngine = NotesEngine<
    DieselUserRepository,
    DieselNoteRepository,
    DieselShareRepository,
    DieselNoteSearchQuery,
>;

/// The note sharing engine's driving surface.
#[derive(Clone)]
pub struct NotesEngine<U, N, S, Q> {
    users: UserService<U>,
    notes: NoteService<N>,
    shares: ShareService<U, N, S>,
    search: SearchService<Q>,
    request_timeout: Duration,
}

impl<U, N, S, Q> NotesEngine<U, N, S, Q>
where
    U: UserRepository,
    N: NoteRepository,
    S: ShareRepository,
    Q: NoteSearchQuery,
{
    /// Wire the services over shared port implementations.
    pub fn new(
        users: Arc<U>,
        notes: Arc<N>,
        shares: Arc<S>,
        search: Arc<Q>,
        search_max_chars: usize,
        request_timeout: Duration,
    ) -> Self {
        Self {
            users: UserService::new(Arc::clone(&users)),
            notes: NoteService::new(Arc::clone(&notes)),
            shares: ShareService::new(users, notes, shares),
            search: SearchService::with_max_chars(search, search_max_chars),
            request_timeout,
        }
    }

    /// Request context for `actor` bounded by the configured timeout.
    pub fn context(&self, actor: Username) -> RequestContext {
        RequestContext::with_timeout(actor, self.request_timeout)
    }

    pub fn users(&self) -> &UserService<U> {
        &self.users
    }

    pub fn notes(&self) -> &NoteService<N> {
        &self.notes
    }

    pub fn shares(&self) -> &ShareService<U, N, S> {
        &self.shares
    }

    pub fn search(&self) -> &SearchService<Q> {
        &self.search
    }
}

impl PostgresNotesEngine {
    /// Build the engine over a PostgreSQL pool using `settings`.
    pub fn from_pool(pool: DbPool, settings: &NoteshareSettings) -> Self {
        let text_search_config = settings.text_search_config();
        Self::new(
            Arc::new(DieselUserRepository::new(pool.clone())),
            Arc::new(DieselNoteRepository::new(pool.clone(), text_search_config)),
            Arc::new(DieselShareRepository::new(pool.clone())),
            Arc::new(DieselNoteSearchQuery::new(pool, text_search_config)),
            settings.search_max_chars(),
            settings.request_timeout(),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::ports::{
        FixtureNoteRepository, FixtureNoteSearchQuery, FixtureShareRepository,
        FixtureUserRepository,
    };
    use crate::domain::{ErrorCode, NoteId};

    fn engine() -> NotesEngine<
        FixtureUserRepository,
        FixtureNoteRepository,
        FixtureShareRepository,
        FixtureNoteSearchQuery,
    > {
        NotesEngine::new(
            Arc::new(FixtureUserRepository),
            Arc::new(FixtureNoteRepository),
            Arc::new(FixtureShareRepository),
            Arc::new(FixtureNoteSearchQuery),
            10,
            Duration::from_secs(1),
        )
    }

    #[tokio::test(start_paused = true)]
    async fn context_carries_configured_deadline() {
        let ctx = engine().context(Username::new("alice").expect("valid username"));
        assert!(ctx.deadline().instant().is_some());
        assert!(!ctx.deadline().is_expired());
        tokio::time::advance(Duration::from_secs(2)).await;
        assert!(ctx.deadline().is_expired());
    }

    #[tokio::test]
    async fn search_cap_is_applied() {
        let engine = engine();
        let ctx = engine.context(Username::new("alice").expect("valid username"));
        let err = engine
            .search()
            .search(&ctx, "more than ten characters")
            .await
            .expect_err("over the cap");
        assert_eq!(err.code(), ErrorCode::Validation);
    }

    #[tokio::test]
    async fn share_goes_through_user_check() {
        let engine = engine();
        let ctx = engine.context(Username::new("alice").expect("valid username"));
        let bob = Username::new("bob").expect("valid username");
        let err = engine
            .shares()
            .share(&ctx, NoteId::new(1), &bob, crate::domain::Privilege::Viewer)
            .await
            .expect_err("fixture has no users");
        assert_eq!(err.code(), ErrorCode::UnknownUser);
    }
}
