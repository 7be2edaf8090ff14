//! Test utilities for the engine crate.
//!
//! [`InMemoryStore`] implements every store port over process memory with
//! the same key, reference, and cascade rules as the PostgreSQL schema, so
//! integration tests can drive the services without a database.

use std::collections::{BTreeMap, BTreeSet};
use std::sync::{Mutex, MutexGuard};

use async_trait::async_trait;
use chrono::Utc;

use crate::domain::ports::{
    NoteRepository, NoteRepositoryError, NoteSearchQuery, NoteSearchQueryError, ShareRepository,
    ShareRepositoryError, UserPersistenceError, UserRepository,
};
use crate::domain::{
    JoinedNoteRow, Note, NoteContent, NoteId, Privilege, SearchDocument, SearchText, Share,
    SharedNote, User, Username,
};

#[derive(Debug)]
struct StoredNote {
    note: Note,
    document: SearchDocument,
}

#[derive(Debug, Default)]
struct StoreState {
    users: BTreeMap<Username, User>,
    notes: BTreeMap<NoteId, StoredNote>,
    shares: BTreeMap<(NoteId, Username), Privilege>,
    last_id: i64,
}

impl StoreState {
    fn shares_of(&self, note_id: NoteId) -> impl Iterator<Item = (&Username, Privilege)> {
        self.shares
            .iter()
            .filter(move |((id, _), _)| *id == note_id)
            .map(|((_, username), privilege)| (username, *privilege))
    }

    fn joined_rows<'a>(&self, notes: impl Iterator<Item = &'a Note>) -> Vec<JoinedNoteRow> {
        let mut rows = Vec::new();
        for note in notes {
            let mut shares = self.shares_of(note.id()).peekable();
            if shares.peek().is_none() {
                rows.push(JoinedNoteRow::unshared(note.clone()));
                continue;
            }
            for (username, privilege) in shares {
                rows.push(JoinedNoteRow::shared(
                    note.clone(),
                    username.as_str(),
                    privilege.as_str(),
                ));
            }
        }
        rows
    }
}

/// In-memory implementation of the user, note, share, and search ports.
///
/// Note ids are assigned from a monotonically increasing counter. Deleting a
/// note removes its shares.
#[derive(Debug, Default)]
pub struct InMemoryStore {
    state: Mutex<StoreState>,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> Result<MutexGuard<'_, StoreState>, String> {
        self.state
            .lock()
            .map_err(|_| "in-memory store lock poisoned".to_owned())
    }
}

fn words(text: &str) -> BTreeSet<String> {
    text.split(|c: char| !c.is_alphanumeric())
        .filter(|word| !word.is_empty())
        .map(str::to_lowercase)
        .collect()
}

/// Every word of `query` appears in `document`, ignoring case.
fn document_matches(document: &SearchDocument, query: &SearchText) -> bool {
    let query_words = words(query.as_str());
    if query_words.is_empty() {
        return false;
    }
    let document_words = words(document.as_str());
    query_words.is_subset(&document_words)
}

#[async_trait]
impl UserRepository for InMemoryStore {
    async fn insert(&self, user: &User) -> Result<(), UserPersistenceError> {
        let mut state = self.lock().map_err(UserPersistenceError::connection)?;
        if state.users.contains_key(user.username()) {
            return Err(UserPersistenceError::duplicate(user.username().as_str()));
        }
        state.users.insert(user.username().clone(), user.clone());
        Ok(())
    }

    async fn exists(&self, username: &Username) -> Result<bool, UserPersistenceError> {
        let state = self.lock().map_err(UserPersistenceError::connection)?;
        Ok(state.users.contains_key(username))
    }

    async fn find(&self, username: &Username) -> Result<Option<User>, UserPersistenceError> {
        let state = self.lock().map_err(UserPersistenceError::connection)?;
        Ok(state.users.get(username).cloned())
    }

    async fn list_except(&self, excluded: &Username) -> Result<Vec<User>, UserPersistenceError> {
        let state = self.lock().map_err(UserPersistenceError::connection)?;
        Ok(state
            .users
            .values()
            .filter(|user| user.username() != excluded)
            .cloned()
            .collect())
    }
}

#[async_trait]
impl NoteRepository for InMemoryStore {
    async fn insert(
        &self,
        owner: &Username,
        content: &NoteContent,
        document: &SearchDocument,
    ) -> Result<NoteId, NoteRepositoryError> {
        let mut state = self.lock().map_err(NoteRepositoryError::connection)?;
        if !state.users.contains_key(owner) {
            return Err(NoteRepositoryError::missing_owner(owner.as_str()));
        }
        state.last_id += 1;
        let id = NoteId::new(state.last_id);
        let note = Note::new(id, content.clone(), Utc::now(), owner.clone());
        state.notes.insert(
            id,
            StoredNote {
                note,
                document: document.clone(),
            },
        );
        Ok(id)
    }

    async fn update(
        &self,
        id: NoteId,
        content: &NoteContent,
        document: &SearchDocument,
    ) -> Result<bool, NoteRepositoryError> {
        let mut state = self.lock().map_err(NoteRepositoryError::connection)?;
        let Some(stored) = state.notes.get_mut(&id) else {
            return Ok(false);
        };
        stored.note = Note::new(
            id,
            content.clone(),
            stored.note.created_at(),
            stored.note.owner().clone(),
        );
        stored.document = document.clone();
        Ok(true)
    }

    async fn delete(&self, id: NoteId) -> Result<bool, NoteRepositoryError> {
        let mut state = self.lock().map_err(NoteRepositoryError::connection)?;
        let removed = state.notes.remove(&id).is_some();
        state.shares.retain(|(note_id, _), _| *note_id != id);
        Ok(removed)
    }

    async fn find_by_id(&self, id: NoteId) -> Result<Option<Note>, NoteRepositoryError> {
        let state = self.lock().map_err(NoteRepositoryError::connection)?;
        Ok(state.notes.get(&id).map(|stored| stored.note.clone()))
    }

    async fn exists(&self, id: NoteId) -> Result<bool, NoteRepositoryError> {
        let state = self.lock().map_err(NoteRepositoryError::connection)?;
        Ok(state.notes.contains_key(&id))
    }

    async fn owned_or_delegated_rows(
        &self,
        username: &Username,
    ) -> Result<Vec<JoinedNoteRow>, NoteRepositoryError> {
        let state = self.lock().map_err(NoteRepositoryError::connection)?;
        let notes = state
            .notes
            .values()
            .map(|stored| &stored.note)
            .filter(|note| note.is_owned_or_delegated_to(username));
        Ok(state.joined_rows(notes))
    }

    async fn clear_delegation(&self, id: NoteId) -> Result<bool, NoteRepositoryError> {
        let mut state = self.lock().map_err(NoteRepositoryError::connection)?;
        let Some(stored) = state.notes.get_mut(&id) else {
            return Ok(false);
        };
        if stored.note.content().delegation().is_none() {
            return Ok(true);
        }
        let content = stored.note.content().clone().without_delegation();
        stored.document = content.search_document();
        stored.note = Note::new(
            id,
            content,
            stored.note.created_at(),
            stored.note.owner().clone(),
        );
        Ok(true)
    }
}

#[async_trait]
impl ShareRepository for InMemoryStore {
    async fn insert(&self, share: &Share) -> Result<(), ShareRepositoryError> {
        let mut state = self.lock().map_err(ShareRepositoryError::connection)?;
        let key = (share.note_id, share.username.clone());
        if state.shares.contains_key(&key) {
            return Err(ShareRepositoryError::duplicate(
                share.note_id.get(),
                share.username.as_str(),
            ));
        }
        if !state.notes.contains_key(&share.note_id) {
            return Err(ShareRepositoryError::missing_note(share.note_id.get()));
        }
        if !state.users.contains_key(&share.username) {
            return Err(ShareRepositoryError::missing_user(share.username.as_str()));
        }
        state.shares.insert(key, share.privilege);
        Ok(())
    }

    async fn exists(
        &self,
        note_id: NoteId,
        username: &Username,
    ) -> Result<bool, ShareRepositoryError> {
        let state = self.lock().map_err(ShareRepositoryError::connection)?;
        Ok(state.shares.contains_key(&(note_id, username.clone())))
    }

    async fn delete(
        &self,
        note_id: NoteId,
        username: &Username,
    ) -> Result<bool, ShareRepositoryError> {
        let mut state = self.lock().map_err(ShareRepositoryError::connection)?;
        Ok(state.shares.remove(&(note_id, username.clone())).is_some())
    }

    async fn update_privilege(
        &self,
        note_id: NoteId,
        username: &Username,
        privilege: Privilege,
    ) -> Result<bool, ShareRepositoryError> {
        let mut state = self.lock().map_err(ShareRepositoryError::connection)?;
        match state.shares.get_mut(&(note_id, username.clone())) {
            Some(current) => {
                *current = privilege;
                Ok(true)
            }
            None => Ok(false),
        }
    }

    async fn list_for_note(&self, note_id: NoteId) -> Result<Vec<Share>, ShareRepositoryError> {
        let state = self.lock().map_err(ShareRepositoryError::connection)?;
        Ok(state
            .shares_of(note_id)
            .map(|(username, privilege)| Share {
                note_id,
                username: username.clone(),
                privilege,
            })
            .collect())
    }

    async fn list_unshared_users(
        &self,
        note_id: NoteId,
        excluded: &Username,
    ) -> Result<Vec<User>, ShareRepositoryError> {
        let state = self.lock().map_err(ShareRepositoryError::connection)?;
        Ok(state
            .users
            .values()
            .filter(|user| user.username() != excluded)
            .filter(|user| {
                !state
                    .shares
                    .contains_key(&(note_id, user.username().clone()))
            })
            .cloned()
            .collect())
    }

    async fn shared_notes_for(
        &self,
        username: &Username,
    ) -> Result<Vec<SharedNote>, ShareRepositoryError> {
        let state = self.lock().map_err(ShareRepositoryError::connection)?;
        Ok(state
            .shares
            .iter()
            .filter(|((_, shared_with), _)| shared_with == username)
            .filter_map(|((note_id, _), privilege)| {
                state.notes.get(note_id).map(|stored| SharedNote {
                    note: stored.note.clone(),
                    privilege: *privilege,
                })
            })
            .collect())
    }
}

#[async_trait]
impl NoteSearchQuery for InMemoryStore {
    async fn search_rows(
        &self,
        text: &SearchText,
        username: &Username,
    ) -> Result<Vec<JoinedNoteRow>, NoteSearchQueryError> {
        let state = self.lock().map_err(NoteSearchQueryError::connection)?;
        let notes = state
            .notes
            .values()
            .filter(|stored| {
                let text_match = document_matches(&stored.document, text)
                    && stored.note.is_owned_or_delegated_to(username);
                let share_match = state
                    .shares_of(stored.note.id())
                    .any(|(shared_with, _)| shared_with.eq_ignore_case(text.as_str()));
                text_match || share_match
            })
            .map(|stored| &stored.note);
        Ok(state.joined_rows(notes))
    }
}
