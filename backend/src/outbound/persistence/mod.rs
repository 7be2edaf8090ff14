//! PostgreSQL persistence adapters using Diesel ORM.
//!
//! This module provides concrete implementations of the domain's store ports
//! backed by PostgreSQL via the Diesel ORM with async support through
//! `diesel-async` and `bb8` connection pooling.
//!
//! # Architecture
//!
//! - **Thin adapters**: Repository implementations only translate between
//!   Diesel models and domain types. Sharing rules live in the domain.
//! - **Internal models**: Diesel row structs (`models.rs`) and schema
//!   definitions (`schema.rs`) never leave this module.
//! - **Constraint-aware errors**: Unique and foreign-key violations are
//!   classified so the share port can report duplicates and missing
//!   references distinctly.
//!
//! # Example
//!
//! ```no_run
//! use noteshare::outbound::persistence::{DbPool, DieselShareRepository, PoolConfig};
//!
//! # async fn wire() -> Result<(), noteshare::outbound::persistence::PoolError> {
//! let pool = DbPool::new(PoolConfig::new("postgres://localhost/notes")).await?;
//! let shares = DieselShareRepository::new(pool);
//! # let _ = shares;
//! # Ok(())
//! # }
//! ```

mod diesel_basic_error_mapping;
pub(crate) mod diesel_helpers;
mod diesel_note_repository;
mod diesel_note_search_query;
mod diesel_share_repository;
mod diesel_user_repository;
pub mod migrations;
mod models;
mod pool;
mod schema;

pub use diesel_note_repository::DieselNoteRepository;
pub use diesel_note_search_query::DieselNoteSearchQuery;
pub use diesel_share_repository::DieselShareRepository;
pub use diesel_user_repository::DieselUserRepository;
pub use migrations::{MIGRATIONS, MigrationError, run_pending_migrations};
pub use pool::{DbPool, PoolConfig, PoolError};
