//! Canonical schema constants for structured logging and events
//!
//! These constants keep field names consistent between the logging macros,
//! the service layer and the HTTP layer.

// Canonical field keys for structured logging
pub const FIELD_COMPONENT: &str = "component";
pub const FIELD_OP: &str = "op";
pub const FIELD_EVENT: &str = "event";
pub const FIELD_DURATION_MS: &str = "duration_ms";
pub const FIELD_REQUEST_ID: &str = "request_id";

// Entity identifiers
pub const FIELD_CONTACT_ID: &str = "contact_id";
pub const FIELD_CATEGORY: &str = "category";
pub const FIELD_KEYWORD: &str = "keyword";

// Result shapes
pub const FIELD_RESULT_COUNT: &str = "result_count";
pub const FIELD_TOTAL_ELEMENTS: &str = "total_elements";
pub const FIELD_CACHE_HIT: &str = "cache_hit";

// Error fields
pub const FIELD_ERR_KIND: &str = "err.kind";
pub const FIELD_ERR_CODE: &str = "err.code";

// Canonical event names
pub const EVENT_START: &str = "start";
pub const EVENT_END: &str = "end";
pub const EVENT_END_ERROR: &str = "end_error";

/// HTTP header carrying the caller's request id, echoed on every response
pub const HEADER_REQUEST_ID: &str = "x-request-id";

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_event_names_are_distinct() {
        assert_ne!(EVENT_START, EVENT_END);
        assert_ne!(EVENT_START, EVENT_END_ERROR);
        assert_ne!(EVENT_END, EVENT_END_ERROR);
    }

    #[test]
    fn test_request_id_header_is_lowercase() {
        assert_eq!(HEADER_REQUEST_ID, HEADER_REQUEST_ID.to_ascii_lowercase());
    }
}
