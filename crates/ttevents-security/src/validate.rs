// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Format predicates for PII fields and event names.
//
// Each predicate returns false for empty input. Whether a field is required
// is decided by the caller.

use std::sync::LazyLock;

use regex::Regex;

static EMAIL: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[A-Za-z0-9+_.-]+@([A-Za-z0-9.-]+\.[A-Za-z]{2,})$").expect("static email pattern")
});

// ASCII digits and whitespace only; `\d`/`\s` would admit Unicode classes.
static PHONE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[+]?[0-9 \t\n\x0B\x0C\r\-()]{8,20}$").expect("static phone pattern")
});

static EVENT_NAME: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[A-Za-z0-9_]+$").expect("static event name pattern"));

/// `local@domain.tld` with a letters-only TLD of two or more characters.
pub fn is_valid_email(email: &str) -> bool {
    !email.is_empty() && EMAIL.is_match(email)
}

/// 8–20 digits, spaces, hyphens or parentheses, with an optional leading `+`.
pub fn is_valid_phone(phone: &str) -> bool {
    !phone.is_empty() && PHONE.is_match(phone)
}

/// Letters, digits and underscore. Applies to event names and event type
/// tags alike.
pub fn is_valid_event_name(name: &str) -> bool {
    !name.is_empty() && EVENT_NAME.is_match(name)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn email_accepts_common_addresses() {
        assert!(is_valid_email("jane.doe@example.com"));
        assert!(is_valid_email("a+tag_1@sub.example.co.uk"));
    }

    #[test]
    fn email_rejects_malformed_addresses() {
        assert!(!is_valid_email(""));
        assert!(!is_valid_email("not-an-email"));
        assert!(!is_valid_email("missing@tld"));
        assert!(!is_valid_email("short@tld.c"));
        assert!(!is_valid_email("two@@example.com"));
        assert!(!is_valid_email("space in@example.com"));
        assert!(!is_valid_email("digits@example.c0m"));
    }

    #[test]
    fn phone_accepts_international_formats() {
        assert!(is_valid_phone("+1 (555) 123-4567"));
        assert!(is_valid_phone("0123456789"));
        assert!(is_valid_phone("12345678"));
    }

    #[test]
    fn phone_enforces_length_and_charset() {
        assert!(!is_valid_phone(""));
        assert!(!is_valid_phone("1234567"));
        assert!(!is_valid_phone("123456789012345678901"));
        assert!(!is_valid_phone("555-CALL-NOW"));
        assert!(!is_valid_phone("++12345678"));
        // Arabic-Indic digits are not ASCII digits.
        assert!(!is_valid_phone("١٢٣٤٥٦٧٨٩"));
    }

    #[test]
    fn event_name_charset() {
        assert!(is_valid_event_name("valid_name"));
        assert!(is_valid_event_name("Add_To_Cart"));
        assert!(is_valid_event_name("level42"));
        assert!(!is_valid_event_name(""));
        assert!(!is_valid_event_name("bad name!"));
        assert!(!is_valid_event_name("dash-name"));
        assert!(!is_valid_event_name("naïve"));
    }
}
