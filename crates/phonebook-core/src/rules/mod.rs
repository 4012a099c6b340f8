pub mod validation;

pub use validation::{is_valid_email, validate_contact_input};
