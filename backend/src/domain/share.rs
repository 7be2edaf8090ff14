//! Sharing relationships between notes and users.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use super::note::{Note, NoteId};
use super::user::Username;

/// Access level granted by a share.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Privilege {
    Viewer,
    Editor,
}

impl Privilege {
    /// Stored representation.
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Viewer => "viewer",
            Self::Editor => "editor",
        }
    }
}

impl fmt::Display for Privilege {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Raised when a stored or supplied privilege is not recognised.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown privilege: {value}")]
pub struct ParsePrivilegeError {
    pub value: String,
}

impl FromStr for Privilege {
    type Err = ParsePrivilegeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "viewer" => Ok(Self::Viewer),
            "editor" => Ok(Self::Editor),
            _ => Err(ParsePrivilegeError {
                value: s.to_owned(),
            }),
        }
    }
}

/// A grant of `privilege` on `note_id` to `username`.
///
/// At most one share exists per `(note_id, username)` pair.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Share {
    pub note_id: NoteId,
    pub username: Username,
    pub privilege: Privilege,
}

/// A note together with every share that references it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct NoteWithShares {
    pub note: Note,
    pub shares: Vec<Share>,
}

impl NoteWithShares {
    /// Usernames of the shares, in materialised order.
    pub fn shared_usernames(&self) -> impl Iterator<Item = &Username> {
        self.shares.iter().map(|share| &share.username)
    }
}

/// A note seen through one sharing relationship.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SharedNote {
    pub note: Note,
    pub privilege: Privilege,
}

/// Outcome of an idempotent removal.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Removal {
    /// A record existed and was removed.
    Removed,
    /// Nothing matched; the store is unchanged.
    Absent,
}

impl Removal {
    pub fn from_affected(removed: bool) -> Self {
        if removed { Self::Removed } else { Self::Absent }
    }

    pub fn was_removed(self) -> bool {
        matches!(self, Self::Removed)
    }
}
