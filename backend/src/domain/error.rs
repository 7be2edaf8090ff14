//! Domain-level error types.
//!
//! These errors are transport agnostic. The presentation layer that sits in
//! front of the engine maps each [`ErrorCode`] to an end-user message.

use serde::{Deserialize, Serialize};
use serde_json::{Value, json};

/// Stable machine-readable error code describing the failure category.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[non_exhaustive]
#[serde(rename_all = "snake_case")]
pub enum ErrorCode {
    /// Input is missing, malformed, or out of bounds.
    Validation,
    /// The addressed note or share does not exist.
    NotFound,
    /// A share names a user that has never been registered.
    UnknownUser,
    /// A share names a note that does not exist.
    UnknownNote,
    /// The note is already shared with the user.
    AlreadyShared,
    /// The persistent store failed or did not answer in time.
    Store,
}

impl ErrorCode {
    fn fallback_message(self) -> &'static str {
        match self {
            Self::Validation => "invalid input",
            Self::NotFound => "not found",
            Self::UnknownUser => "unknown user",
            Self::UnknownNote => "unknown note",
            Self::AlreadyShared => "note is already shared with this user",
            Self::Store => "store unavailable",
        }
    }
}

/// Domain error payload.
///
/// ## Invariants
/// - `message` is non-empty once trimmed of whitespace.
///
/// # Examples
/// ```
/// use noteshare::domain::{Error, ErrorCode};
///
/// let err = Error::unknown_user("no user named carol");
/// assert_eq!(err.code(), ErrorCode::UnknownUser);
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
#[serde(deny_unknown_fields)]
#[serde(try_from = "ErrorDto", into = "ErrorDto")]
pub struct Error {
    code: ErrorCode,
    message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    details: Option<Value>,
}

/// Validation errors emitted by the constructors.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ErrorValidationError {
    /// The message was blank.
    #[error("error message must not be empty")]
    EmptyMessage,
}

impl Error {
    /// Create a new error. A blank message is replaced by the code's generic
    /// description.
    pub fn new(code: ErrorCode, message: impl Into<String>) -> Self {
        Self::try_new(code, message).unwrap_or_else(|_| Self {
            code,
            message: code.fallback_message().to_owned(),
            details: None,
        })
    }

    /// Fallible constructor that validates the message content.
    pub fn try_new(code: ErrorCode, message: impl Into<String>) -> Result<Self, ErrorValidationError> {
        let message = message.into();
        if message.trim().is_empty() {
            return Err(ErrorValidationError::EmptyMessage);
        }
        Ok(Self {
            code,
            message,
            details: None,
        })
    }

    /// Stable machine-readable error code.
    pub fn code(&self) -> ErrorCode {
        self.code
    }

    /// Human-readable message.
    pub fn message(&self) -> &str {
        self.message.as_str()
    }

    /// Supplementary error details.
    pub fn details(&self) -> Option<&Value> {
        self.details.as_ref()
    }

    /// Attach structured details to the error.
    ///
    /// # Examples
    /// ```
    /// use noteshare::domain::Error;
    /// use serde_json::json;
    ///
    /// let err = Error::validation("title must not be empty")
    ///     .with_details(json!({ "field": "title" }));
    /// assert!(err.details().is_some());
    /// ```
    pub fn with_details(mut self, details: Value) -> Self {
        self.details = Some(details);
        self
    }

    /// Convenience constructor for [`ErrorCode::Validation`].
    pub fn validation(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::Validation, message)
    }

    /// Convenience constructor for [`ErrorCode::NotFound`].
    pub fn not_found(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::NotFound, message)
    }

    /// Convenience constructor for [`ErrorCode::UnknownUser`].
    pub fn unknown_user(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::UnknownUser, message)
    }

    /// Convenience constructor for [`ErrorCode::UnknownNote`].
    pub fn unknown_note(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::UnknownNote, message)
    }

    /// Convenience constructor for [`ErrorCode::AlreadyShared`].
    pub fn already_shared(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::AlreadyShared, message)
    }

    /// Convenience constructor for [`ErrorCode::Store`].
    pub fn store(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::Store, message)
    }

    /// Store error raised when a call outlives the caller's deadline.
    pub fn store_timeout(operation: &str) -> Self {
        Self::store(format!("{operation} exceeded its deadline")).with_details(json!({
            "operation": operation,
            "reason": "deadline_exceeded",
        }))
    }

    /// Whether this error came from an expired deadline.
    pub fn is_timeout(&self) -> bool {
        self.code == ErrorCode::Store
            && self
                .details
                .as_ref()
                .and_then(|details| details.get("reason"))
                .and_then(Value::as_str)
                == Some("deadline_exceeded")
    }
}

impl std::fmt::Display for Error {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl std::error::Error for Error {}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ErrorDto {
    code: ErrorCode,
    message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    details: Option<Value>,
}

impl From<Error> for ErrorDto {
    fn from(value: Error) -> Self {
        Self {
            code: value.code,
            message: value.message,
            details: value.details,
        }
    }
}

impl TryFrom<ErrorDto> for Error {
    type Error = ErrorValidationError;

    fn try_from(value: ErrorDto) -> Result<Self, Self::Error> {
        let ErrorDto {
            code,
            message,
            details,
        } = value;

        let mut error = Error::try_new(code, message)?;
        error.details = details;
        Ok(error)
    }
}
