//! Search Coordinator service.
//!
//! Validates the search text, issues the dual-mode query, and folds the
//! joined rows into notes with their shares.

use std::sync::Arc;

use serde_json::json;
use tracing::debug;

use crate::domain::context::within_deadline;
use crate::domain::ports::{NoteSearchQuery, NoteSearchQueryError};
use crate::domain::{
    DEFAULT_SEARCH_MAX_CHARS, Error, NoteWithShares, RequestContext, SearchText, SearchTextError,
    aggregate_note_rows,
};

fn map_search_error(error: NoteSearchQueryError) -> Error {
    debug!(%error, "note search failed");
    match error {
        NoteSearchQueryError::Connection { message } => {
            Error::store(format!("search backend unavailable: {message}"))
        }
        NoteSearchQueryError::Query { message } => {
            Error::store(format!("search query failed: {message}"))
        }
    }
}

/// Full-text and shared-username search over notes.
#[derive(Clone)]
pub struct SearchService<Q> {
    query: Arc<Q>,
    max_chars: usize,
}

impl<Q> SearchService<Q> {
    /// Service with the default input cap.
    pub fn new(query: Arc<Q>) -> Self {
        Self::with_max_chars(query, DEFAULT_SEARCH_MAX_CHARS)
    }

    pub fn with_max_chars(query: Arc<Q>, max_chars: usize) -> Self {
        Self { query, max_chars }
    }
}

impl<Q> SearchService<Q>
where
    Q: NoteSearchQuery,
{
    /// Notes matching `raw` for the acting user.
    ///
    /// Blank input yields no notes. Input longer than the cap is a
    /// `Validation` error. Neither case reaches the store.
    pub async fn search(
        &self,
        ctx: &RequestContext,
        raw: &str,
    ) -> Result<Vec<NoteWithShares>, Error> {
        let text = match SearchText::parse(raw, self.max_chars) {
            Ok(text) => text,
            Err(SearchTextError::Empty) => return Ok(Vec::new()),
            Err(err @ SearchTextError::TooLong { max }) => {
                return Err(Error::validation(err.to_string())
                    .with_details(json!({ "field": "query", "maxChars": max })));
            }
        };

        let rows = within_deadline(
            ctx.deadline(),
            "note search",
            self.query.search_rows(&text, ctx.actor()),
        )
        .await?
        .map_err(map_search_error)?;
        aggregate_note_rows(rows)
            .map_err(|err| Error::store(format!("malformed search result: {err}")))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::ports::MockNoteSearchQuery;
    use crate::domain::{ErrorCode, JoinedNoteRow, Note, NoteDraft, NoteId, Username};
    use chrono::Utc;
    use rstest::{fixture, rstest};

    #[fixture]
    fn ctx() -> RequestContext {
        RequestContext::unbounded(Username::new("alice").expect("valid username"))
    }

    fn note(id: i64) -> Note {
        let content = NoteDraft {
            title: "Weekly meeting".into(),
            note_type: "meeting".into(),
            description: "Agenda".into(),
            ..NoteDraft::default()
        }
        .validate()
        .expect("valid draft");
        Note::new(
            NoteId::new(id),
            content,
            Utc::now(),
            Username::new("alice").expect("valid username"),
        )
    }

    #[rstest]
    #[tokio::test]
    async fn over_long_input_is_rejected_without_query(ctx: RequestContext) {
        let mut query = MockNoteSearchQuery::new();
        query.expect_search_rows().never();

        let raw = "x".repeat(51);
        let err = SearchService::new(Arc::new(query))
            .search(&ctx, &raw)
            .await
            .expect_err("too long");
        assert_eq!(err.code(), ErrorCode::Validation);
    }

    #[rstest]
    #[tokio::test]
    async fn blank_input_returns_nothing_without_query(ctx: RequestContext) {
        let mut query = MockNoteSearchQuery::new();
        query.expect_search_rows().never();

        let notes = SearchService::new(Arc::new(query))
            .search(&ctx, "   ")
            .await
            .expect("blank search succeeds");
        assert!(notes.is_empty());
    }

    #[rstest]
    #[tokio::test]
    async fn passes_trimmed_text_and_actor(ctx: RequestContext) {
        let rows = vec![
            JoinedNoteRow::shared(note(1), "bob", "viewer"),
            JoinedNoteRow::shared(note(1), "carol", "editor"),
            JoinedNoteRow::unshared(note(2)),
        ];
        let mut query = MockNoteSearchQuery::new();
        query
            .expect_search_rows()
            .withf(|text, username| text.as_str() == "meeting" && username.as_str() == "alice")
            .times(1)
            .return_once(move |_, _| Ok(rows));

        let notes = SearchService::new(Arc::new(query))
            .search(&ctx, " meeting ")
            .await
            .expect("search succeeds");
        assert_eq!(notes.len(), 2);
        assert_eq!(notes[0].shares.len(), 2);
    }

    #[rstest]
    #[tokio::test]
    async fn respects_configured_cap(ctx: RequestContext) {
        let mut query = MockNoteSearchQuery::new();
        query.expect_search_rows().never();

        let err = SearchService::with_max_chars(Arc::new(query), 5)
            .search(&ctx, "meeting")
            .await
            .expect_err("cap of five");
        assert_eq!(
            err.details().and_then(|d| d.get("maxChars")),
            Some(&json!(5))
        );
    }
}
