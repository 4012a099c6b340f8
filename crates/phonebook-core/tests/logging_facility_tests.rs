#![allow(clippy::unwrap_used, clippy::expect_used)]

use phonebook_core::logging_facility::test_capture::init_test_capture;
use phonebook_core::{log_op_end, log_op_error, log_op_start, PhonebookError};
use phonebook_core_types::schema::{EVENT_END, EVENT_END_ERROR, EVENT_START};
use tracing::Level;

#[test]
fn test_log_op_start_macro() {
    let capture = init_test_capture();
    let op_name = "test_log_op_start_unique_1";

    log_op_start!(op_name, contact_id = 7);

    let events = capture.events_for_op(op_name);
    assert_eq!(events.len(), 1);
    assert_eq!(events[0].event.as_deref(), Some(EVENT_START));
    assert_eq!(events[0].field("contact_id"), Some("7"));
}

#[test]
fn test_log_op_end_macro() {
    let capture = init_test_capture();
    let op_name = "test_log_op_end_unique_2";

    log_op_end!(op_name, duration_ms = 42, result_count = 3);

    let events = capture.events_for_op(op_name);
    assert_eq!(events.len(), 1);
    assert_eq!(events[0].event.as_deref(), Some(EVENT_END));
    assert_eq!(events[0].field("duration_ms"), Some("42"));
    assert_eq!(events[0].field("result_count"), Some("3"));
}

#[test]
fn test_log_op_error_client_error_is_warn() {
    let capture = init_test_capture();
    let op_name = "test_log_op_error_unique_3";

    let err = PhonebookError::NotFound { id: 1 };
    log_op_error!(op_name, &err, duration_ms = 10);

    let events = capture.events_for_op(op_name);
    assert_eq!(events.len(), 1);
    let event = &events[0];
    assert_eq!(event.event.as_deref(), Some(EVENT_END_ERROR));
    assert_eq!(event.level, Level::WARN);
    assert_eq!(event.field("err.code"), Some("ERR_NOT_FOUND"));
}

#[test]
fn test_log_op_error_server_error_is_error() {
    let capture = init_test_capture();
    let op_name = "test_log_op_error_unique_4";

    let err = PhonebookError::Persistence {
        message: "disk full".to_string(),
    };
    log_op_error!(op_name, err, duration_ms = 1, contact_id = 9);

    let events = capture.events_for_op(op_name);
    assert_eq!(events.len(), 1);
    assert_eq!(events[0].level, Level::ERROR);
    assert_eq!(events[0].field("err.code"), Some("ERR_PERSISTENCE"));
    assert_eq!(events[0].field("contact_id"), Some("9"));
}

#[test]
fn test_boundary_single_start_end() {
    let capture = init_test_capture();
    let op_name = "test_boundary_unique_5";

    log_op_start!(op_name);
    log_op_end!(op_name, duration_ms = 0);

    let starts = capture.count_events(|e| {
        e.op.as_deref() == Some(op_name) && e.event.as_deref() == Some(EVENT_START)
    });
    let ends = capture.count_events(|e| {
        e.op.as_deref() == Some(op_name) && e.event.as_deref() == Some(EVENT_END)
    });
    assert_eq!(starts, 1);
    assert_eq!(ends, 1);
}
