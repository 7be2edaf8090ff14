//! Domain primitives, aggregates, and services.
//!
//! Purpose: Define the note sharing and retrieval engine independent of any
//! store or transport. Entities are immutable once validated; services drive
//! the ports in [`ports`] under a per-call [`RequestContext`].
//!
//! Public surface:
//! - Error / ErrorCode: typed failure classification for callers.
//! - User, Username, CredentialHash: registered identities.
//! - Note, NoteDraft, NoteContent, NoteId: notes and their validated fields.
//! - Share, Privilege, NoteWithShares, SharedNote: sharing relationships.
//! - aggregate_note_rows: folds note×share join rows into nested notes.
//! - NoteService, ShareService, SearchService, UserService: driving API.

pub mod aggregation;
pub mod context;
pub mod error;
pub mod note;
pub mod note_service;
pub mod ports;
pub mod search;
pub mod search_service;
pub mod share;
pub mod share_service;
pub mod user;
pub mod user_service;

pub use self::aggregation::{AggregationError, JoinedNoteRow, aggregate_note_rows};
pub use self::context::{Deadline, RequestContext};
pub use self::error::{Error, ErrorCode, ErrorValidationError};
pub use self::note::{
    Note, NoteContent, NoteDraft, NoteId, NoteValidationError, SearchDocument, TextField,
    TextOccurrence,
};
pub use self::note_service::NoteService;
pub use self::search::{DEFAULT_SEARCH_MAX_CHARS, SearchText, SearchTextError};
pub use self::search_service::SearchService;
pub use self::share::{
    NoteWithShares, ParsePrivilegeError, Privilege, Removal, Share, SharedNote,
};
pub use self::share_service::ShareService;
pub use self::user::{CredentialHash, User, UserValidationError, Username};
pub use self::user_service::UserService;

/// Result alias for engine operations.
///
/// # Examples
/// ```
/// use noteshare::domain::{EngineResult, Error};
///
/// fn lookup() -> EngineResult<()> {
///     Err(Error::not_found("note 9 does not exist"))
/// }
/// assert!(lookup().is_err());
/// ```
pub type EngineResult<T> = Result<T, Error>;
