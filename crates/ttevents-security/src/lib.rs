// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// ttevents-security: the first two stages of argument processing plus PII
// hashing.
//
// Everything here is a pure function over its input. The compiled regexes
// are the only shared state and they are immutable, so every item is safe
// to call from any number of bridge threads at once.

pub mod integrity;
pub mod sanitize;
pub mod validate;

pub use integrity::{PiiHasher, Sha256Hasher, hash_pii};
pub use sanitize::sanitize;
pub use validate::{is_valid_email, is_valid_event_name, is_valid_phone};
