//! Shared helper utilities for engine integration tests.
//!
//! Integration tests compile as separate crates under `backend/tests/`, so
//! small helpers live here rather than being copied between suites.

#![allow(dead_code)]

use std::sync::{Arc, OnceLock};
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

use noteshare::NotesEngine;
use noteshare::domain::{CredentialHash, NoteDraft, RequestContext, Username};
use noteshare::outbound::persistence::run_pending_migrations;
use noteshare::test_support::InMemoryStore;

/// Environment variable naming the PostgreSQL database used by adapter tests.
pub const TEST_DATABASE_URL_ENV: &str = "NOTESHARE_TEST_DATABASE_URL";

pub type MemoryEngine = NotesEngine<InMemoryStore, InMemoryStore, InMemoryStore, InMemoryStore>;

/// Engine over a fresh in-memory store.
pub fn memory_engine() -> MemoryEngine {
    let store = Arc::new(InMemoryStore::new());
    NotesEngine::new(
        Arc::clone(&store),
        Arc::clone(&store),
        Arc::clone(&store),
        store,
        50,
        Duration::from_secs(5),
    )
}

pub fn username(name: &str) -> Username {
    Username::new(name).expect("valid username")
}

/// Register `name` and return a context acting as that user.
pub async fn register(engine: &MemoryEngine, name: &str) -> RequestContext {
    let ctx = engine.context(username(name));
    engine
        .users()
        .register(&ctx, CredentialHash::new(format!("$2a$10${name}")).expect("valid hash"))
        .await
        .expect("registration succeeds");
    ctx
}

pub fn draft(title: &str, description: &str) -> NoteDraft {
    NoteDraft {
        title: title.to_owned(),
        note_type: "general".to_owned(),
        description: description.to_owned(),
        ..NoteDraft::default()
    }
}

/// Database URL for adapter tests, applying migrations once per process.
///
/// Prints a `SKIP-TEST-CLUSTER` marker and returns `None` when the
/// environment does not provide a database.
pub fn test_database_url() -> Option<String> {
    static MIGRATED: OnceLock<Result<String, String>> = OnceLock::new();

    let Ok(url) = std::env::var(TEST_DATABASE_URL_ENV) else {
        eprintln!("SKIP-TEST-CLUSTER: {TEST_DATABASE_URL_ENV} is not set");
        return None;
    };
    let outcome = MIGRATED.get_or_init(|| {
        run_pending_migrations(&url)
            .map(|_| url.clone())
            .map_err(|err| err.to_string())
    });
    match outcome {
        Ok(url) => Some(url.clone()),
        Err(reason) => panic!("test database setup failed: {reason}"),
    }
}

/// Username unique to this process and call, for tests sharing a database.
pub fn unique_username(prefix: &str) -> Username {
    static COUNTER: AtomicU64 = AtomicU64::new(0);
    let n = COUNTER.fetch_add(1, Ordering::Relaxed);
    username(&format!("{prefix}{}x{n}", std::process::id()))
}
