//! Integration tests for the Diesel adapters against PostgreSQL.
//!
//! The database is named by `NOTESHARE_TEST_DATABASE_URL`; suites print a
//! skip marker and pass when it is unset. Usernames are unique per run so
//! suites can share one database.

mod support;

use noteshare::domain::ports::{
    NoteRepository, NoteRepositoryError, NoteSearchQuery, ShareRepository, ShareRepositoryError,
    UserPersistenceError, UserRepository,
};
use noteshare::domain::{
    CredentialHash, NoteContent, NoteDraft, NoteId, Privilege, SearchText, Share, User, Username,
    aggregate_note_rows,
};
use noteshare::outbound::persistence::{
    DbPool, DieselNoteRepository, DieselNoteSearchQuery, DieselShareRepository,
    DieselUserRepository, PoolConfig,
};
use support::{test_database_url, unique_username};

struct Adapters {
    users: DieselUserRepository,
    notes: DieselNoteRepository,
    shares: DieselShareRepository,
    search: DieselNoteSearchQuery,
}

async fn adapters() -> Option<Adapters> {
    let url = test_database_url()?;
    let pool = DbPool::new(
        PoolConfig::new(url)
            .with_max_size(2)
            .with_min_idle(Some(1)),
    )
    .await
    .expect("pool builds");
    Some(Adapters {
        users: DieselUserRepository::new(pool.clone()),
        notes: DieselNoteRepository::new(pool.clone(), "english"),
        shares: DieselShareRepository::new(pool.clone()),
        search: DieselNoteSearchQuery::new(pool, "english"),
    })
}

async fn registered(adapters: &Adapters, prefix: &str) -> Username {
    let username = unique_username(prefix);
    let user = User::new(
        username.clone(),
        CredentialHash::new("$2a$10$testhash").expect("valid hash"),
    );
    adapters.users.insert(&user).await.expect("user inserted");
    username
}

fn content(title: &str, description: &str, delegation: Option<&Username>) -> NoteContent {
    NoteDraft {
        title: title.to_owned(),
        note_type: "general".to_owned(),
        description: description.to_owned(),
        delegation: delegation.map(|u| u.as_str().to_owned()),
        ..NoteDraft::default()
    }
    .validate()
    .expect("valid draft")
}

async fn insert_note(adapters: &Adapters, owner: &Username, content: &NoteContent) -> NoteId {
    adapters
        .notes
        .insert(owner, content, &content.search_document())
        .await
        .expect("note inserted")
}

#[tokio::test]
async fn user_insert_rejects_duplicates() {
    let Some(adapters) = adapters().await else {
        return;
    };
    let alice = registered(&adapters, "alice").await;
    let again = User::new(
        alice.clone(),
        CredentialHash::new("$2a$10$other").expect("valid hash"),
    );

    let err = adapters
        .users
        .insert(&again)
        .await
        .expect_err("duplicate username");
    assert!(matches!(err, UserPersistenceError::Duplicate { .. }));
    assert!(adapters.users.exists(&alice).await.expect("exists query"));
    let found = adapters.users.find(&alice).await.expect("find query");
    assert_eq!(found.map(|u| u.username().clone()), Some(alice));
}

#[tokio::test]
async fn note_round_trips_through_store() {
    let Some(adapters) = adapters().await else {
        return;
    };
    let alice = registered(&adapters, "alice").await;
    let body = content("Weekly meeting", "Agenda items", None);
    let id = insert_note(&adapters, &alice, &body).await;

    let note = adapters
        .notes
        .find_by_id(id)
        .await
        .expect("lookup")
        .expect("note present");
    assert_eq!(note.owner(), &alice);
    assert_eq!(note.content(), &body);
    assert!(note.content().completion_time().is_none());
}

#[tokio::test]
async fn note_insert_reports_missing_owner() {
    let Some(adapters) = adapters().await else {
        return;
    };
    let ghost = unique_username("ghost");
    let body = content("Orphan", "no owner", None);

    let err = adapters
        .notes
        .insert(&ghost, &body, &body.search_document())
        .await
        .expect_err("owner missing");
    assert!(matches!(err, NoteRepositoryError::MissingOwner { .. }));
}

#[tokio::test]
async fn share_insert_classifies_constraint_failures() {
    let Some(adapters) = adapters().await else {
        return;
    };
    let alice = registered(&adapters, "alice").await;
    let bob = registered(&adapters, "bob").await;
    let id = insert_note(&adapters, &alice, &content("Plan", "Quarterly", None)).await;
    let share = Share {
        note_id: id,
        username: bob.clone(),
        privilege: Privilege::Viewer,
    };

    adapters.shares.insert(&share).await.expect("first share");
    let duplicate = adapters
        .shares
        .insert(&share)
        .await
        .expect_err("duplicate share");
    assert!(matches!(duplicate, ShareRepositoryError::Duplicate { .. }));

    let missing_note = adapters
        .shares
        .insert(&Share {
            note_id: NoteId::new(i64::MAX),
            ..share.clone()
        })
        .await
        .expect_err("missing note");
    assert!(matches!(
        missing_note,
        ShareRepositoryError::MissingNote { .. }
    ));

    let missing_user = adapters
        .shares
        .insert(&Share {
            username: unique_username("ghost"),
            ..share
        })
        .await
        .expect_err("missing user");
    assert!(matches!(
        missing_user,
        ShareRepositoryError::MissingUser { .. }
    ));
}

#[tokio::test]
async fn deleting_note_cascades_to_shares() {
    let Some(adapters) = adapters().await else {
        return;
    };
    let alice = registered(&adapters, "alice").await;
    let bob = registered(&adapters, "bob").await;
    let carol = registered(&adapters, "carol").await;
    let id = insert_note(&adapters, &alice, &content("Plan", "Quarterly", None)).await;
    for username in [&bob, &carol] {
        adapters
            .shares
            .insert(&Share {
                note_id: id,
                username: username.clone(),
                privilege: Privilege::Editor,
            })
            .await
            .expect("share");
    }

    assert!(adapters.notes.delete(id).await.expect("delete"));
    assert!(!adapters.notes.delete(id).await.expect("second delete"));
    let shares = adapters.shares.list_for_note(id).await.expect("listing");
    assert!(shares.is_empty());
}

#[tokio::test]
async fn owned_or_delegated_rows_join_shares_in_order() {
    let Some(adapters) = adapters().await else {
        return;
    };
    let alice = registered(&adapters, "alice").await;
    let bob = registered(&adapters, "bob").await;
    let carol = registered(&adapters, "carol").await;

    let owned = insert_note(&adapters, &alice, &content("Mine", "owned", None)).await;
    let delegated =
        insert_note(&adapters, &bob, &content("Errand", "delegated", Some(&alice))).await;
    insert_note(&adapters, &carol, &content("Private", "not shared", None)).await;
    for username in [&carol, &bob] {
        adapters
            .shares
            .insert(&Share {
                note_id: owned,
                username: username.clone(),
                privilege: Privilege::Viewer,
            })
            .await
            .expect("share");
    }

    let rows = adapters
        .notes
        .owned_or_delegated_rows(&alice)
        .await
        .expect("listing");
    let notes = aggregate_note_rows(rows).expect("aggregation");
    let ids: Vec<NoteId> = notes.iter().map(|n| n.note.id()).collect();
    assert_eq!(ids, vec![owned, delegated]);
    let shared_with: Vec<&Username> = notes[0].shared_usernames().collect();
    assert_eq!(shared_with, vec![&bob, &carol]);
    assert!(notes[1].shares.is_empty());
}

#[tokio::test]
async fn update_and_clear_delegation_reindex_the_note() {
    let Some(adapters) = adapters().await else {
        return;
    };
    let alice = registered(&adapters, "alice").await;
    let bob = registered(&adapters, "bob").await;
    let id = insert_note(
        &adapters,
        &bob,
        &content("Weekly meeting", "Agenda", Some(&alice)),
    )
    .await;

    let updated = content("Weekly standup", "Agenda", Some(&alice));
    assert!(
        adapters
            .notes
            .update(id, &updated, &updated.search_document())
            .await
            .expect("update")
    );

    let standup = SearchText::parse("standup", 50).expect("valid search text");
    let meeting = SearchText::parse("meeting", 50).expect("valid search text");
    let found = adapters
        .search
        .search_rows(&standup, &alice)
        .await
        .expect("search");
    assert!(found.iter().any(|row| row.note.id() == id));
    let stale = adapters
        .search
        .search_rows(&meeting, &alice)
        .await
        .expect("search");
    assert!(stale.iter().all(|row| row.note.id() != id));

    assert!(adapters.notes.clear_delegation(id).await.expect("clear"));
    let after_clear = adapters
        .search
        .search_rows(&standup, &alice)
        .await
        .expect("search");
    assert!(after_clear.iter().all(|row| row.note.id() != id));
    assert!(!adapters
        .notes
        .clear_delegation(NoteId::new(i64::MAX))
        .await
        .expect("clear missing"));
}

#[tokio::test]
async fn clearing_absent_delegation_keeps_status_and_index() {
    let Some(adapters) = adapters().await else {
        return;
    };
    let alice = registered(&adapters, "alice").await;
    let body = NoteDraft {
        title: "Weekly retrospective".to_owned(),
        note_type: "general".to_owned(),
        description: "Agenda".to_owned(),
        status: Some("archived".to_owned()),
        ..NoteDraft::default()
    }
    .validate()
    .expect("valid draft");
    let id = insert_note(&adapters, &alice, &body).await;

    assert!(adapters.notes.clear_delegation(id).await.expect("clear"));

    let note = adapters
        .notes
        .find_by_id(id)
        .await
        .expect("lookup")
        .expect("note present");
    assert_eq!(note.content(), &body);
    let archived = SearchText::parse("archived", 50).expect("valid search text");
    let rows = adapters
        .search
        .search_rows(&archived, &alice)
        .await
        .expect("search");
    assert!(rows.iter().any(|row| row.note.id() == id));
}

#[tokio::test]
async fn search_matches_share_username_case_insensitively() {
    let Some(adapters) = adapters().await else {
        return;
    };
    let alice = registered(&adapters, "alice").await;
    let bob = registered(&adapters, "bob").await;
    let stranger = registered(&adapters, "stranger").await;
    let id = insert_note(&adapters, &alice, &content("Groceries", "Milk", None)).await;
    adapters
        .shares
        .insert(&Share {
            note_id: id,
            username: bob.clone(),
            privilege: Privilege::Editor,
        })
        .await
        .expect("share");

    let upper = SearchText::parse(&bob.as_str().to_uppercase(), 50).expect("valid search text");
    let rows = adapters
        .search
        .search_rows(&upper, &stranger)
        .await
        .expect("search");
    let notes = aggregate_note_rows(rows).expect("aggregation");
    assert_eq!(notes.len(), 1);
    assert_eq!(notes[0].note.id(), id);
    assert_eq!(notes[0].shares.len(), 1);
}

#[tokio::test]
async fn unshared_users_exclude_sharers_and_the_caller() {
    let Some(adapters) = adapters().await else {
        return;
    };
    let alice = registered(&adapters, "alice").await;
    let bob = registered(&adapters, "bob").await;
    let carol = registered(&adapters, "carol").await;
    let id = insert_note(&adapters, &alice, &content("Plan", "Quarterly", None)).await;
    adapters
        .shares
        .insert(&Share {
            note_id: id,
            username: bob.clone(),
            privilege: Privilege::Viewer,
        })
        .await
        .expect("share");

    let unshared = adapters
        .shares
        .list_unshared_users(id, &alice)
        .await
        .expect("listing");
    let names: Vec<&Username> = unshared.iter().map(User::username).collect();
    assert!(names.contains(&&carol));
    assert!(!names.contains(&&bob));
    assert!(!names.contains(&&alice));

    assert!(
        adapters
            .shares
            .update_privilege(id, &bob, Privilege::Editor)
            .await
            .expect("privilege update")
    );
    let shared = adapters
        .shares
        .shared_notes_for(&bob)
        .await
        .expect("shared notes");
    assert_eq!(shared.len(), 1);
    assert_eq!(shared[0].privilege, Privilege::Editor);
    assert!(adapters.shares.delete(id, &bob).await.expect("unshare"));
    assert!(!adapters.shares.exists(id, &bob).await.expect("exists"));
}
