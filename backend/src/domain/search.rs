//! Search input validation.

/// Default cap on search input length, in characters.
pub const DEFAULT_SEARCH_MAX_CHARS: usize = 50;

/// Reasons search input is not sent to the store.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SearchTextError {
    /// Input was empty or whitespace.
    #[error("search text is empty")]
    Empty,
    /// Input exceeds the configured cap.
    #[error("search text must be at most {max} characters")]
    TooLong { max: usize },
}

/// Trimmed, length-checked search input.
///
/// The same text serves both search modes: a full-text query and an exact,
/// case-insensitive match against shared usernames.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchText(String);

impl SearchText {
    /// Validate raw input. Length is measured on the raw input.
    ///
    /// # Examples
    /// ```
    /// use noteshare::domain::{SearchText, SearchTextError};
    ///
    /// let text = SearchText::parse("  meeting ", 50).expect("valid text");
    /// assert_eq!(text.as_str(), "meeting");
    /// assert_eq!(SearchText::parse("", 50), Err(SearchTextError::Empty));
    /// ```
    pub fn parse(raw: &str, max_chars: usize) -> Result<Self, SearchTextError> {
        if raw.chars().count() > max_chars {
            return Err(SearchTextError::TooLong { max: max_chars });
        }
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            return Err(SearchTextError::Empty);
        }
        Ok(Self(trimmed.to_owned()))
    }

    pub fn as_str(&self) -> &str {
        self.0.as_str()
    }
}

impl AsRef<str> for SearchText {
    fn as_ref(&self) -> &str {
        self.as_str()
    }
}
