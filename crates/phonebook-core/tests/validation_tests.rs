#![allow(clippy::unwrap_used, clippy::expect_used)]

use phonebook_core::rules::validation::{
    is_valid_email, validate_contact_input, MAX_ADDRESS_LEN, MAX_NAME_LEN, MAX_PHONE_LEN,
};
use phonebook_core::{ContactInput, PhonebookError};
use proptest::prelude::*;

fn field_of(err: PhonebookError) -> String {
    match err {
        PhonebookError::Validation { field, .. } => field,
        other => panic!("expected validation error, got {:?}", other),
    }
}

#[test]
fn test_minimal_input_is_valid() {
    validate_contact_input(&ContactInput::new("张三", "13800138001")).unwrap();
}

#[test]
fn test_blank_fields_are_rejected_in_order() {
    let err = validate_contact_input(&ContactInput::new("", "")).unwrap_err();
    assert_eq!(field_of(err), "name");

    let err = validate_contact_input(&ContactInput::new("张三", " ")).unwrap_err();
    assert_eq!(field_of(err), "phoneNumber");
}

#[test]
fn test_length_limits_count_characters() {
    // 100 multi-byte characters fit; 101 do not
    let name_ok = "张".repeat(MAX_NAME_LEN);
    let name_long = "张".repeat(MAX_NAME_LEN + 1);

    validate_contact_input(&ContactInput::new(name_ok, "1")).unwrap();
    let err = validate_contact_input(&ContactInput::new(name_long, "1")).unwrap_err();
    assert_eq!(field_of(err), "name");

    let err =
        validate_contact_input(&ContactInput::new("n", "1".repeat(MAX_PHONE_LEN + 1))).unwrap_err();
    assert_eq!(field_of(err), "phoneNumber");

    let err = validate_contact_input(
        &ContactInput::new("n", "1").with_address("a".repeat(MAX_ADDRESS_LEN + 1)),
    )
    .unwrap_err();
    assert_eq!(field_of(err), "address");

    let err = validate_contact_input(&ContactInput::new("n", "1").with_category("c".repeat(51)))
        .unwrap_err();
    assert_eq!(field_of(err), "category");
}

#[test]
fn test_email_shapes() {
    assert!(is_valid_email("zhangsan@example.com"));
    assert!(is_valid_email("a.b+c@mail.example.org"));
    assert!(!is_valid_email("invalid-email"));
    assert!(!is_valid_email("@example.com"));
    assert!(!is_valid_email("a@localhost"));
    assert!(!is_valid_email("a@b@c.com"));
    assert!(!is_valid_email("a b@c.com"));
    assert!(!is_valid_email("a@.com"));
}

#[test]
fn test_malformed_email_fails_validation() {
    let err = validate_contact_input(&ContactInput::new("n", "1").with_email("invalid-email"))
        .unwrap_err();
    assert_eq!(field_of(err), "email");
}

proptest! {
    #[test]
    fn prop_nonblank_short_inputs_validate(
        name in "[a-zA-Z][a-zA-Z ]{0,98}",
        phone in "[0-9]{1,20}",
    ) {
        prop_assert!(validate_contact_input(&ContactInput::new(name, phone)).is_ok());
    }

    #[test]
    fn prop_emails_without_at_are_invalid(s in "[a-z.]{0,40}") {
        prop_assert!(!is_valid_email(&s));
    }
}
