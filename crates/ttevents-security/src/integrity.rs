// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// PII hashing: SHA-256 before anything leaves the device.

use sha2::{Digest, Sha256};

/// One-way transform applied to phone numbers and email addresses.
///
/// Identity normalization is generic over this trait so callers can
/// observe exactly which inputs were hashed.
pub trait PiiHasher {
    /// Hash a non-empty input to its lowercase hex digest.
    fn hash(&self, input: &str) -> String;
}

/// The production hasher: SHA-256 over the UTF-8 bytes.
#[derive(Debug, Clone, Copy, Default)]
pub struct Sha256Hasher;

impl PiiHasher for Sha256Hasher {
    fn hash(&self, input: &str) -> String {
        let mut hasher = Sha256::new();
        hasher.update(input.as_bytes());
        hex::encode(hasher.finalize())
    }
}

/// Hash `input` with SHA-256. Absent or empty input yields `None`.
pub fn hash_pii(input: Option<&str>) -> Option<String> {
    input
        .filter(|s| !s.is_empty())
        .map(|s| Sha256Hasher.hash(s))
}
