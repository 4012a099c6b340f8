use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Store-assigned contact identifier
pub type ContactId = i64;

/// Category given to contacts created without one
pub const DEFAULT_CATEGORY: &str = "personal";

/// Current time truncated to whole milliseconds
///
/// Stores persist timestamps at millisecond precision, so records are stamped
/// at that precision up front and compare equal after a round trip.
pub fn now_millis() -> DateTime<Utc> {
    DateTime::from_timestamp_millis(Utc::now().timestamp_millis()).unwrap_or_else(Utc::now)
}

/// Contact - a single phonebook entry
///
/// `id`, `created_at` and `updated_at` are owned by the store; every other
/// field comes from a [`ContactInput`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Contact {
    pub id: ContactId,

    /// Display name, never blank
    pub name: String,

    /// Unique across all contacts
    pub phone_number: String,

    /// Unique across all contacts when present
    pub email: Option<String>,

    pub address: Option<String>,

    pub category: String,

    pub notes: Option<String>,

    /// Set once at creation
    pub created_at: DateTime<Utc>,

    /// Refreshed on every successful update
    pub updated_at: DateTime<Utc>,
}

impl Contact {
    /// Build a new record from validated input
    ///
    /// # Arguments
    /// * `id` - Identifier assigned by the store
    /// * `input` - Caller-supplied fields (normalized here)
    /// * `now` - Creation timestamp, used for both `created_at` and `updated_at`
    pub fn from_input(id: ContactId, input: ContactInput, now: DateTime<Utc>) -> Self {
        let input = input.normalized();
        Self {
            id,
            name: input.name,
            phone_number: input.phone_number,
            email: input.email,
            address: input.address,
            category: input.category.unwrap_or_else(|| DEFAULT_CATEGORY.to_string()),
            notes: input.notes,
            created_at: now,
            updated_at: now,
        }
    }

    /// Replace every mutable field with `input` and refresh `updated_at`
    ///
    /// `id` and `created_at` are left untouched.
    pub fn apply_input(&mut self, input: ContactInput, now: DateTime<Utc>) {
        let input = input.normalized();
        self.name = input.name;
        self.phone_number = input.phone_number;
        self.email = input.email;
        self.address = input.address;
        self.category = input.category.unwrap_or_else(|| DEFAULT_CATEGORY.to_string());
        self.notes = input.notes;
        self.updated_at = now;
    }
}

/// Caller-supplied contact fields for create and full-replacement update
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ContactInput {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub phone_number: String,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub address: Option<String>,
    #[serde(default)]
    pub category: Option<String>,
    #[serde(default)]
    pub notes: Option<String>,
}

impl ContactInput {
    /// Input with only the required fields set
    pub fn new(name: impl Into<String>, phone_number: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            phone_number: phone_number.into(),
            ..Self::default()
        }
    }

    pub fn with_email(mut self, email: impl Into<String>) -> Self {
        self.email = Some(email.into());
        self
    }

    pub fn with_address(mut self, address: impl Into<String>) -> Self {
        self.address = Some(address.into());
        self
    }

    pub fn with_category(mut self, category: impl Into<String>) -> Self {
        self.category = Some(category.into());
        self
    }

    pub fn with_notes(mut self, notes: impl Into<String>) -> Self {
        self.notes = Some(notes.into());
        self
    }

    /// The email to check uniqueness against, if any
    ///
    /// Blank emails count as absent.
    pub fn effective_email(&self) -> Option<&str> {
        self.email.as_deref().filter(|e| !e.trim().is_empty())
    }

    /// Collapse a blank email to `None` so it never takes part in uniqueness
    pub fn normalized(mut self) -> Self {
        if self.effective_email().is_none() {
            self.email = None;
        }
        self
    }
}
