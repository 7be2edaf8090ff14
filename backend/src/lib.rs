//! Note sharing and retrieval engine.
//!
//! Users own notes, delegate them, and share them with other users at a
//! viewer or editor privilege. Notes are searchable by full text or by the
//! username of someone they are shared with.

pub mod config;
pub mod domain;
pub mod engine;
pub mod outbound;
#[cfg(feature = "test-support")]
pub mod test_support;

pub use config::NoteshareSettings;
pub use engine::{NotesEngine, PostgresNotesEngine};
