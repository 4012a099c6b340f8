use phonebook_core_types::RequestId;
use thiserror::Error;

use crate::model::ContactId;

/// Result type alias using PhonebookError
pub type Result<T> = std::result::Result<T, PhonebookError>;

// ========== Error Facility ==========

/// Canonical error kind taxonomy
///
/// Each kind maps to a stable error code used by log events and by the
/// HTTP layer when it renders an error body.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ExErrorKind {
    // Request validation
    Validation,

    // Uniqueness
    DuplicatePhoneNumber,
    DuplicateEmail,

    // Lookup
    NotFound,

    // Schema / storage integrity
    ConstraintViolation,

    // Integration/IO
    Persistence,
    Serialization,
    Io,

    // Internal
    Internal,
}

impl ExErrorKind {
    /// Get the stable error code for this kind
    pub fn code(&self) -> &'static str {
        match self {
            ExErrorKind::Validation => "ERR_VALIDATION",
            ExErrorKind::DuplicatePhoneNumber => "ERR_DUPLICATE_PHONE_NUMBER",
            ExErrorKind::DuplicateEmail => "ERR_DUPLICATE_EMAIL",
            ExErrorKind::NotFound => "ERR_NOT_FOUND",
            ExErrorKind::ConstraintViolation => "ERR_CONSTRAINT_VIOLATION",
            ExErrorKind::Persistence => "ERR_PERSISTENCE",
            ExErrorKind::Serialization => "ERR_SERIALIZATION",
            ExErrorKind::Io => "ERR_IO",
            ExErrorKind::Internal => "ERR_INTERNAL",
        }
    }

    /// Whether the caller, rather than the service, is at fault
    pub fn is_client_error(&self) -> bool {
        matches!(
            self,
            ExErrorKind::Validation
                | ExErrorKind::DuplicatePhoneNumber
                | ExErrorKind::DuplicateEmail
                | ExErrorKind::NotFound
        )
    }
}

/// Canonical structured error type
///
/// Carries a classification for programmatic handling plus the context
/// needed to debug it.
#[derive(Debug, Clone)]
pub struct ExError {
    kind: ExErrorKind,
    op: Option<String>,
    contact_id: Option<ContactId>,
    field: Option<String>,
    request_id: Option<RequestId>,
    message: String,
}

impl ExError {
    /// Create a new error with the specified kind
    pub fn new(kind: ExErrorKind) -> Self {
        Self {
            kind,
            op: None,
            contact_id: None,
            field: None,
            request_id: None,
            message: String::new(),
        }
    }

    /// Add operation context
    pub fn with_op(mut self, op: impl Into<String>) -> Self {
        self.op = Some(op.into());
        self
    }

    /// Add contact ID context
    pub fn with_contact_id(mut self, id: ContactId) -> Self {
        self.contact_id = Some(id);
        self
    }

    /// Add the offending input field
    pub fn with_field(mut self, field: impl Into<String>) -> Self {
        self.field = Some(field.into());
        self
    }

    /// Add request ID context
    pub fn with_request_id(mut self, request_id: RequestId) -> Self {
        self.request_id = Some(request_id);
        self
    }

    /// Add custom message
    pub fn with_message(mut self, message: impl Into<String>) -> Self {
        self.message = message.into();
        self
    }

    pub fn kind(&self) -> ExErrorKind {
        self.kind
    }

    /// Get the stable error code
    pub fn code(&self) -> &'static str {
        self.kind.code()
    }

    pub fn op(&self) -> Option<&str> {
        self.op.as_deref()
    }

    pub fn contact_id(&self) -> Option<ContactId> {
        self.contact_id
    }

    pub fn field(&self) -> Option<&str> {
        self.field.as_deref()
    }

    pub fn request_id(&self) -> Option<&RequestId> {
        self.request_id.as_ref()
    }

    pub fn message(&self) -> &str {
        &self.message
    }
}

impl std::fmt::Display for ExError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "[{}]", self.code())?;
        if let Some(op) = &self.op {
            write!(f, " in operation '{}'", op)?;
        }
        if !self.message.is_empty() {
            write!(f, ": {}", self.message)?;
        }
        if let Some(id) = self.contact_id {
            write!(f, " (contact_id: {})", id)?;
        }
        if let Some(field) = &self.field {
            write!(f, " (field: {})", field)?;
        }
        Ok(())
    }
}

impl std::error::Error for ExError {}

// ========== End Error Facility ==========

/// Error taxonomy for phonebook operations
#[derive(Error, Debug, Clone, PartialEq)]
pub enum PhonebookError {
    /// A field failed validation (blank, too long, malformed)
    #[error("Invalid {field}: {reason}")]
    Validation { field: String, reason: String },

    /// Another contact already uses this phone number
    #[error("Phone number already exists: {phone_number}")]
    DuplicatePhoneNumber { phone_number: String },

    /// Another contact already uses this email
    #[error("Email already exists: {email}")]
    DuplicateEmail { email: String },

    /// Update or delete target does not exist
    #[error("Contact not found: {id}")]
    NotFound { id: ContactId },

    /// Stored schema disagrees with what this build expects
    #[error("Constraint violation: {message}")]
    ConstraintViolation { message: String },

    /// Storage backend failure
    #[error("Persistence error: {message}")]
    Persistence { message: String },

    /// Serialization error (JSON encoding/decoding)
    #[error("Serialization error: {message}")]
    Serialization { message: String },

    /// Generic internal error
    #[error("Internal error: {message}")]
    Internal { message: String },
}

impl PhonebookError {
    /// Shorthand for a validation failure on `field`
    pub fn validation(field: impl Into<String>, reason: impl Into<String>) -> Self {
        PhonebookError::Validation {
            field: field.into(),
            reason: reason.into(),
        }
    }

    /// The canonical kind this error maps to
    pub fn kind(&self) -> ExErrorKind {
        match self {
            PhonebookError::Validation { .. } => ExErrorKind::Validation,
            PhonebookError::DuplicatePhoneNumber { .. } => ExErrorKind::DuplicatePhoneNumber,
            PhonebookError::DuplicateEmail { .. } => ExErrorKind::DuplicateEmail,
            PhonebookError::NotFound { .. } => ExErrorKind::NotFound,
            PhonebookError::ConstraintViolation { .. } => ExErrorKind::ConstraintViolation,
            PhonebookError::Persistence { .. } => ExErrorKind::Persistence,
            PhonebookError::Serialization { .. } => ExErrorKind::Serialization,
            PhonebookError::Internal { .. } => ExErrorKind::Internal,
        }
    }
}

/// Conversion from PhonebookError to the canonical ExError
///
/// Uniqueness errors deliberately leave the colliding value out of the
/// structured message so it does not end up in logs.
impl From<&PhonebookError> for ExError {
    fn from(err: &PhonebookError) -> Self {
        let base = ExError::new(err.kind());
        match err {
            PhonebookError::Validation { field, reason } => base
                .with_field(field.clone())
                .with_message(reason.clone()),

            PhonebookError::DuplicatePhoneNumber { .. } => base
                .with_field("phoneNumber")
                .with_message("Phone number already exists"),

            PhonebookError::DuplicateEmail { .. } => base
                .with_field("email")
                .with_message("Email already exists"),

            PhonebookError::NotFound { id } => base
                .with_contact_id(*id)
                .with_message("Contact not found"),

            PhonebookError::ConstraintViolation { message }
            | PhonebookError::Persistence { message }
            | PhonebookError::Serialization { message }
            | PhonebookError::Internal { message } => base.with_message(message.clone()),
        }
    }
}

impl From<PhonebookError> for ExError {
    fn from(err: PhonebookError) -> Self {
        ExError::from(&err)
    }
}

/// Conversion back from the canonical form, used where lower layers (schema
/// setup, migrations) report `ExError`
impl From<ExError> for PhonebookError {
    fn from(err: ExError) -> Self {
        let message = err.to_string();
        match err.kind() {
            ExErrorKind::Validation => PhonebookError::Validation {
                field: err.field().unwrap_or_default().to_string(),
                reason: err.message().to_string(),
            },
            ExErrorKind::NotFound => match err.contact_id() {
                Some(id) => PhonebookError::NotFound { id },
                None => PhonebookError::Internal { message },
            },
            ExErrorKind::ConstraintViolation => PhonebookError::ConstraintViolation { message },
            ExErrorKind::Persistence | ExErrorKind::Io => PhonebookError::Persistence { message },
            ExErrorKind::Serialization => PhonebookError::Serialization { message },
            ExErrorKind::DuplicatePhoneNumber
            | ExErrorKind::DuplicateEmail
            | ExErrorKind::Internal => PhonebookError::Internal { message },
        }
    }
}

/// Conversion from serde_json::Error to PhonebookError
impl From<serde_json::Error> for PhonebookError {
    fn from(err: serde_json::Error) -> Self {
        PhonebookError::Serialization {
            message: err.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_kind_codes_are_unique() {
        let kinds = [
            ExErrorKind::Validation,
            ExErrorKind::DuplicatePhoneNumber,
            ExErrorKind::DuplicateEmail,
            ExErrorKind::NotFound,
            ExErrorKind::ConstraintViolation,
            ExErrorKind::Persistence,
            ExErrorKind::Serialization,
            ExErrorKind::Io,
            ExErrorKind::Internal,
        ];
        let codes: std::collections::HashSet<_> = kinds.iter().map(|k| k.code()).collect();
        assert_eq!(codes.len(), kinds.len());
    }

    #[test]
    fn test_client_errors() {
        assert!(ExErrorKind::NotFound.is_client_error());
        assert!(ExErrorKind::DuplicateEmail.is_client_error());
        assert!(!ExErrorKind::Persistence.is_client_error());
        assert!(!ExErrorKind::Internal.is_client_error());
    }

    #[test]
    fn test_ex_error_back_to_phonebook_error() {
        let ex = ExError::new(ExErrorKind::ConstraintViolation)
            .with_op("migration_checksum")
            .with_message("checksum mismatch");
        let err: PhonebookError = ex.into();
        assert_eq!(err.kind(), ExErrorKind::ConstraintViolation);

        let ex = ExError::new(ExErrorKind::NotFound).with_contact_id(3);
        assert_eq!(PhonebookError::from(ex), PhonebookError::NotFound { id: 3 });
    }

    #[test]
    fn test_display_includes_context() {
        let err = ExError::new(ExErrorKind::NotFound)
            .with_op("update_contact")
            .with_contact_id(7)
            .with_message("Contact not found");
        let shown = err.to_string();
        assert!(shown.starts_with("[ERR_NOT_FOUND]"));
        assert!(shown.contains("update_contact"));
        assert!(shown.contains("contact_id: 7"));
    }
}
