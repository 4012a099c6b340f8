//! Sensitive data marker for redacting contact details in logs
//!
//! Phone numbers and email addresses are personal data. Wrapping them in
//! `Sensitive` before they reach a log macro keeps them out of log output
//! while leaving enough of the value visible to correlate a report with a
//! record.

use std::fmt;

const MASK: &str = "***";

/// How much of the wrapped value remains visible when formatted
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Reveal {
    /// Nothing is shown
    Nothing,
    /// The last `n` characters are shown
    Tail(usize),
    /// Everything from the `@` onward is shown
    EmailDomain,
}

/// Wrapper for sensitive strings that masks itself in Debug and Display
///
/// # Example
///
/// ```
/// use phonebook_core_types::Sensitive;
///
/// let phone = Sensitive::phone("13800138001");
/// assert_eq!(format!("{}", phone), "***8001");
///
/// let email = Sensitive::email("zhangsan@example.com");
/// assert_eq!(format!("{}", email), "***@example.com");
///
/// // Access the actual value when needed
/// assert_eq!(phone.expose(), &"13800138001");
/// ```
pub struct Sensitive<T> {
    value: T,
    reveal: Reveal,
}

impl<T> Sensitive<T> {
    /// Wrap a value that must never be shown
    pub fn new(value: T) -> Self {
        Self {
            value,
            reveal: Reveal::Nothing,
        }
    }

    /// Wrap a phone number, keeping its last four digits visible
    pub fn phone(value: T) -> Self {
        Self {
            value,
            reveal: Reveal::Tail(4),
        }
    }

    /// Wrap an email address, keeping its domain visible
    pub fn email(value: T) -> Self {
        Self {
            value,
            reveal: Reveal::EmailDomain,
        }
    }

    /// Expose the underlying value
    pub fn expose(&self) -> &T {
        &self.value
    }

    /// Consume the wrapper and return the inner value
    pub fn into_inner(self) -> T {
        self.value
    }
}

impl<T: AsRef<str>> Sensitive<T> {
    fn masked(&self) -> String {
        let raw = self.value.as_ref();
        match self.reveal {
            Reveal::Nothing => MASK.to_string(),
            Reveal::Tail(n) => {
                let count = raw.chars().count();
                // Short values would be fully revealed by the tail
                if count <= n {
                    return MASK.to_string();
                }
                let tail: String = raw.chars().skip(count - n).collect();
                format!("{MASK}{tail}")
            }
            Reveal::EmailDomain => match raw.find('@') {
                Some(at) => format!("{MASK}{}", &raw[at..]),
                None => MASK.to_string(),
            },
        }
    }
}

impl<T: AsRef<str>> fmt::Debug for Sensitive<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.masked())
    }
}

impl<T: AsRef<str>> fmt::Display for Sensitive<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.masked())
    }
}

impl<T: Clone> Clone for Sensitive<T> {
    fn clone(&self) -> Self {
        Self {
            value: self.value.clone(),
            reveal: self.reveal,
        }
    }
}
