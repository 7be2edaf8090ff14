//! Tests for the join-row aggregator.

use super::*;
use crate::domain::NoteDraft;
use chrono::{TimeZone, Utc};
use rstest::{fixture, rstest};

fn note(id: i64, title: &str) -> Note {
    let content = NoteDraft {
        title: title.into(),
        note_type: "task".into(),
        description: "details".into(),
        ..NoteDraft::default()
    }
    .validate()
    .expect("valid draft");
    let created_at = Utc
        .with_ymd_and_hms(2026, 1, 1, 9, 0, 0)
        .single()
        .expect("valid timestamp");
    Note::new(
        NoteId::new(id),
        content,
        created_at,
        Username::new("alice").expect("valid username"),
    )
}

#[fixture]
fn note_a() -> Note {
    note(10, "A")
}

#[fixture]
fn note_b() -> Note {
    note(4, "B")
}

fn usernames(notes: &NoteWithShares) -> Vec<&str> {
    notes.shared_usernames().map(Username::as_str).collect()
}

#[rstest]
fn collapses_rows_and_skips_absent_usernames(note_a: Note, note_b: Note) {
    let rows = vec![
        JoinedNoteRow::shared(note_a.clone(), "bob", "viewer"),
        JoinedNoteRow::shared(note_a.clone(), "carol", "editor"),
        JoinedNoteRow::shared(note_a.clone(), "bob", "viewer"),
        JoinedNoteRow::shared(note_b.clone(), "dave", "viewer"),
        JoinedNoteRow::unshared(note_b.clone()),
    ];

    let notes = aggregate_note_rows(rows).expect("rows aggregate");

    assert_eq!(notes.len(), 2);
    assert_eq!(notes[0].note.id(), NoteId::new(10));
    assert_eq!(usernames(&notes[0]), vec!["bob", "carol"]);
    assert_eq!(notes[1].note.id(), NoteId::new(4));
    assert_eq!(usernames(&notes[1]), vec!["dave"]);
}

#[rstest]
fn preserves_first_seen_order_rather_than_sorting(note_a: Note, note_b: Note) {
    let rows = vec![
        JoinedNoteRow::unshared(note_a.clone()),
        JoinedNoteRow::shared(note_b.clone(), "bob", "editor"),
        JoinedNoteRow::shared(note_a.clone(), "carol", "viewer"),
    ];

    let notes = aggregate_note_rows(rows).expect("rows aggregate");
    let ids: Vec<i64> = notes.iter().map(|entry| entry.note.id().get()).collect();

    assert_eq!(ids, vec![10, 4]);
    assert_eq!(usernames(&notes[0]), vec!["carol"]);
}

#[rstest]
fn note_without_shares_has_empty_share_list(note_a: Note) {
    let notes =
        aggregate_note_rows(vec![JoinedNoteRow::unshared(note_a)]).expect("rows aggregate");
    assert_eq!(notes.len(), 1);
    assert!(notes[0].shares.is_empty());
}

#[rstest]
fn shares_carry_parsed_privileges(note_a: Note) {
    let notes = aggregate_note_rows(vec![
        JoinedNoteRow::shared(note_a.clone(), "bob", "viewer"),
        JoinedNoteRow::shared(note_a, "carol", "editor"),
    ])
    .expect("rows aggregate");

    let privileges: Vec<Privilege> = notes[0].shares.iter().map(|s| s.privilege).collect();
    assert_eq!(privileges, vec![Privilege::Viewer, Privilege::Editor]);
    assert!(notes[0].shares.iter().all(|s| s.note_id == NoteId::new(10)));
}

#[rstest]
fn empty_input_yields_no_notes() {
    let notes = aggregate_note_rows(Vec::<JoinedNoteRow>::new()).expect("rows aggregate");
    assert!(notes.is_empty());
}

#[rstest]
fn rejects_share_without_privilege(note_a: Note) {
    let row = JoinedNoteRow {
        note: note_a,
        shared_username: Some("bob".into()),
        shared_privilege: None,
    };
    let err = aggregate_note_rows(vec![row]).expect_err("privilege is required");
    assert!(matches!(err, AggregationError::MissingPrivilege { .. }));
}

#[rstest]
fn rejects_unknown_privilege(note_a: Note) {
    let err = aggregate_note_rows(vec![JoinedNoteRow::shared(note_a, "bob", "owner")])
        .expect_err("owner is not a privilege");
    assert!(matches!(err, AggregationError::InvalidPrivilege { .. }));
}
