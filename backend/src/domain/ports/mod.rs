//! Domain ports and supporting types for the hexagonal boundary.

mod macros;
pub(crate) use macros::define_port_error;

mod note_repository;
mod note_search_query;
mod share_repository;
mod user_repository;

#[cfg(test)]
pub use note_repository::MockNoteRepository;
pub use note_repository::{FixtureNoteRepository, NoteRepository, NoteRepositoryError};
#[cfg(test)]
pub use note_search_query::MockNoteSearchQuery;
pub use note_search_query::{FixtureNoteSearchQuery, NoteSearchQuery, NoteSearchQueryError};
#[cfg(test)]
pub use share_repository::MockShareRepository;
pub use share_repository::{FixtureShareRepository, ShareRepository, ShareRepositoryError};
#[cfg(test)]
pub use user_repository::MockUserRepository;
pub use user_repository::{FixtureUserRepository, UserPersistenceError, UserRepository};
