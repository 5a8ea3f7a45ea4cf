// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// String sanitization for ids, names and free text.

/// Characters stripped from every sanitized string. They are unsafe in the
/// log and markup contexts the values end up in.
const UNSAFE_CHARS: [char; 5] = ['<', '>', '"', '\'', '\\'];

/// Trim `input` and remove unsafe characters.
///
/// Returns `None` for absent, empty or all-blank input. Trimming runs again
/// after removal so that `sanitize(sanitize(x)) == sanitize(x)`.
pub fn sanitize(input: Option<&str>) -> Option<String> {
    let input = input.filter(|s| !s.is_empty())?;
    let cleaned: String = input
        .trim()
        .chars()
        .filter(|c| !UNSAFE_CHARS.contains(c))
        .collect();
    let cleaned = cleaned.trim();
    if cleaned.is_empty() {
        None
    } else {
        Some(cleaned.to_owned())
    }
}
