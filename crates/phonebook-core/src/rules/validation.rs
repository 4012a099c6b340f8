use crate::errors::{PhonebookError, Result};
use crate::model::ContactInput;

pub const MAX_NAME_LEN: usize = 100;
pub const MAX_PHONE_LEN: usize = 20;
pub const MAX_EMAIL_LEN: usize = 100;
pub const MAX_ADDRESS_LEN: usize = 255;
pub const MAX_CATEGORY_LEN: usize = 50;

/// Validate caller-supplied contact fields
///
/// Checks run in a fixed order and the first failure is returned:
///
/// 1. `name` is not blank and at most 100 characters
/// 2. `phoneNumber` is not blank and at most 20 characters
/// 3. `email`, when non-blank, is at most 100 characters and well-formed
/// 4. `address` is at most 255 characters
/// 5. `category` is at most 50 characters
///
/// Lengths are counted in characters, not bytes.
///
/// # Errors
/// Returns `PhonebookError::Validation` naming the offending field.
pub fn validate_contact_input(input: &ContactInput) -> Result<()> {
    require_non_blank("name", &input.name)?;
    check_len("name", &input.name, MAX_NAME_LEN)?;

    require_non_blank("phoneNumber", &input.phone_number)?;
    check_len("phoneNumber", &input.phone_number, MAX_PHONE_LEN)?;

    if let Some(email) = input.effective_email() {
        check_len("email", email, MAX_EMAIL_LEN)?;
        if !is_valid_email(email) {
            return Err(PhonebookError::validation(
                "email",
                "must be a well-formed email address",
            ));
        }
    }

    if let Some(address) = &input.address {
        check_len("address", address, MAX_ADDRESS_LEN)?;
    }

    if let Some(category) = &input.category {
        check_len("category", category, MAX_CATEGORY_LEN)?;
    }

    Ok(())
}

/// Check the shape of an email address
///
/// Accepts `local@domain` where the local part is non-empty, the domain has at
/// least two non-empty dot-separated labels, and neither side contains
/// whitespace or a second `@`.
pub fn is_valid_email(email: &str) -> bool {
    let Some((local, domain)) = email.split_once('@') else {
        return false;
    };

    if local.is_empty() || domain.contains('@') {
        return false;
    }
    if email.chars().any(char::is_whitespace) {
        return false;
    }

    let labels: Vec<&str> = domain.split('.').collect();
    labels.len() >= 2 && labels.iter().all(|l| !l.is_empty())
}

fn require_non_blank(field: &str, value: &str) -> Result<()> {
    if value.trim().is_empty() {
        return Err(PhonebookError::validation(field, "must not be blank"));
    }
    Ok(())
}

fn check_len(field: &str, value: &str, max: usize) -> Result<()> {
    if value.chars().count() > max {
        return Err(PhonebookError::validation(
            field,
            format!("must be at most {} characters", max),
        ));
    }
    Ok(())
}
