//! Masking of personally identifying patterns in free text.
//!
//! Patterns are applied in a fixed order: national-id numbers, payment-card
//! digit runs, then email addresses. Replacement tokens contain no digits and
//! no `@`, so running [`redact`] twice yields the same text as running it once.

use std::sync::LazyLock;

use regex::Regex;

/// Replacement for numeric identifiers.
pub const REDACTED: &str = "[REDACTED]";
/// Replacement for email addresses.
pub const EMAIL_REDACTED: &str = "[EMAIL REDACTED]";

static NATIONAL_ID: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\b[0-9]{3}-[0-9]{2}-[0-9]{4}\b").expect("national id regex"));

static CARD_NUMBER: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\b(?:[0-9]{13,19}|[0-9]{4}(?:[ -][0-9]{4}){3})\b").expect("card regex")
});

static EMAIL: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\b[A-Za-z0-9._%+-]+@[A-Za-z0-9.-]+\.[A-Za-z]{2,}\b").expect("email regex")
});

/// Returns `text` with every sensitive pattern masked.
pub fn redact(text: &str) -> String {
    let step = NATIONAL_ID.replace_all(text, REDACTED);
    let step = CARD_NUMBER.replace_all(&step, REDACTED).into_owned();
    EMAIL.replace_all(&step, EMAIL_REDACTED).into_owned()
}

/// True when `text` still contains something [`redact`] would mask.
pub fn contains_sensitive(text: &str) -> bool {
    NATIONAL_ID.is_match(text) || CARD_NUMBER.is_match(text) || EMAIL.is_match(text)
}
