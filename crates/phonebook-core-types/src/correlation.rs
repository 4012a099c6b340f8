//! Correlation types for request tracking
//!
//! Every HTTP request is tagged with a `RequestId`, either taken from the
//! caller's `x-request-id` header or freshly generated, so that log lines and
//! error responses belonging to one request can be tied together.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Longest caller-supplied request id that is accepted verbatim
pub const MAX_REQUEST_ID_LEN: usize = 128;

/// Unique identifier for a single request or operation
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct RequestId(String);

impl RequestId {
    /// Generate a new random RequestId using UUIDv7
    pub fn new() -> Self {
        Self(Uuid::now_v7().to_string())
    }

    /// Get the string representation
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Accept a caller-supplied id if it is usable, otherwise generate one
    ///
    /// Blank values, values longer than [`MAX_REQUEST_ID_LEN`] and values
    /// containing control characters are replaced by a fresh id.
    pub fn from_header(value: Option<&str>) -> Self {
        match value.map(str::trim) {
            Some(v)
                if !v.is_empty()
                    && v.len() <= MAX_REQUEST_ID_LEN
                    && !v.chars().any(char::is_control) =>
            {
                Self(v.to_string())
            }
            _ => Self::new(),
        }
    }
}

impl Default for RequestId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for RequestId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Context carried through operation boundaries for correlation
#[derive(Debug, Clone)]
pub struct RequestContext {
    pub request_id: RequestId,
    pub method: String,
    pub path: String,
}

impl RequestContext {
    /// Create a context for an inbound request
    pub fn new(request_id: RequestId, method: impl Into<String>, path: impl Into<String>) -> Self {
        Self {
            request_id,
            method: method.into(),
            path: path.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_request_id_generation() {
        let id1 = RequestId::new();
        let id2 = RequestId::new();

        assert_ne!(id1, id2);
        assert!(!id1.as_str().is_empty());
    }

    #[test]
    fn test_request_id_display() {
        let id = RequestId::new();
        assert_eq!(format!("{}", id), id.as_str());
    }

    #[test]
    fn test_from_header_keeps_valid_value() {
        let id = RequestId::from_header(Some("  req-42 "));
        assert_eq!(id.as_str(), "req-42");
    }

    #[test]
    fn test_from_header_replaces_unusable_values() {
        let blank = RequestId::from_header(Some("   "));
        assert!(!blank.as_str().trim().is_empty());

        let long = "x".repeat(MAX_REQUEST_ID_LEN + 1);
        let replaced = RequestId::from_header(Some(&long));
        assert_ne!(replaced.as_str(), long);

        let control = RequestId::from_header(Some("bad\nid"));
        assert_ne!(control.as_str(), "bad\nid");

        let missing = RequestId::from_header(None);
        assert!(!missing.as_str().is_empty());
    }

    #[test]
    fn test_request_context_creation() {
        let ctx = RequestContext::new(RequestId::new(), "GET", "/api/contacts");
        assert_eq!(ctx.method, "GET");
        assert_eq!(ctx.path, "/api/contacts");
    }

    #[test]
    fn test_serialization() {
        let id = RequestId::new();
        let json = serde_json::to_string(&id).unwrap();
        let deserialized: RequestId = serde_json::from_str(&json).unwrap();
        assert_eq!(id, deserialized);
    }
}
