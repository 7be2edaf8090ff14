//! Tests for the domain user model.

use super::*;
use rstest::rstest;
use serde_json::json;

#[rstest]
#[case("alice")]
#[case("BIGCAT")]
#[case("mydog7")]
#[case("o'brien-2")]
fn accepts_plain_usernames(#[case] raw: &str) {
    let username = Username::new(raw).expect("valid username");
    assert_eq!(username.as_ref(), raw);
}

#[rstest]
#[case("", UserValidationError::EmptyUsername)]
#[case("two words", UserValidationError::UsernameInvalidCharacters)]
#[case(" alice", UserValidationError::UsernameInvalidCharacters)]
#[case("tab\there", UserValidationError::UsernameInvalidCharacters)]
fn rejects_malformed_usernames(#[case] raw: &str, #[case] expected: UserValidationError) {
    assert_eq!(Username::new(raw), Err(expected));
}

#[rstest]
fn enforces_length_bound() {
    let at_limit = "a".repeat(USERNAME_MAX);
    assert!(Username::new(at_limit).is_ok());

    let over = "a".repeat(USERNAME_MAX + 1);
    assert_eq!(
        Username::new(over),
        Err(UserValidationError::UsernameTooLong { max: USERNAME_MAX })
    );
}

#[rstest]
fn case_insensitive_comparison() {
    let bob = Username::new("bob").expect("valid username");
    assert!(bob.eq_ignore_case("BOB"));
    assert!(bob.eq_ignore_case("Bob"));
    assert!(!bob.eq_ignore_case("bobby"));
}

#[rstest]
fn username_serde_round_trips_as_plain_string() {
    let alice = Username::new("alice").expect("valid username");
    let value = serde_json::to_value(&alice).expect("serialise");
    assert_eq!(value, json!("alice"));

    let invalid: Result<Username, _> = serde_json::from_value(json!("has space"));
    assert!(invalid.is_err());
}

#[rstest]
fn credential_hash_is_redacted_in_debug() {
    let hash = CredentialHash::new("$2a$10$abcdef").expect("valid hash");
    let rendered = format!("{hash:?}");
    assert!(!rendered.contains("abcdef"));
    assert_eq!(hash.expose(), "$2a$10$abcdef");
}

#[rstest]
fn user_rejects_blank_hash() {
    let result = User::try_from_strings("alice", "   ");
    assert_eq!(result, Err(UserValidationError::EmptyCredentialHash));
}
