// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Unified error types for ttevents.

use thiserror::Error;

use crate::types::AuthorizationStatus;

/// Top-level error type for every plugin operation.
///
/// Validation variants always name the offending argument key so the
/// bridge can report it verbatim, in debug and production builds alike.
#[derive(Debug, Error)]
pub enum PluginError {
    // -- Argument validation --
    #[error("parameter '{field}' was not provided or is invalid")]
    InvalidArgument { field: &'static str },

    #[error("invalid '{field}': {reason}")]
    Format {
        field: &'static str,
        reason: &'static str,
    },

    #[error("parameter '{field}' must be {expected}")]
    UnsupportedValue {
        field: &'static str,
        expected: &'static str,
    },

    // -- Consent --
    #[error("cannot start tracking: {reason}")]
    ConsentRequired {
        reason: String,
        status: Option<AuthorizationStatus>,
    },

    // -- Environment --
    #[error("required primitive unavailable: {0}")]
    ConfigurationFatal(String),

    #[error("vendor SDK call failed: {0}")]
    Vendor(String),

    #[error("method not implemented: {0}")]
    NotImplemented(String),

    // -- Platform bridge --
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("platform bridge error: {0}")]
    Bridge(String),

    #[error("feature not available on this platform")]
    PlatformUnavailable,
}

impl PluginError {
    /// True for errors raised by argument validation rather than by a
    /// collaborator (vendor SDK, platform runtime).
    pub fn is_validation(&self) -> bool {
        matches!(
            self,
            Self::InvalidArgument { .. }
                | Self::Format { .. }
                | Self::UnsupportedValue { .. }
                | Self::ConsentRequired { .. }
        )
    }
}

/// Alias used throughout the codebase.
pub type Result<T> = std::result::Result<T, PluginError>;
