// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Structured error replies and the debug/production disclosure policy.
//
// Validation errors always carry their field-naming message. Collaborator
// failures get a generic per-method message; the underlying error and a
// backtrace are only disclosed to debug builds running at a verbose log
// level.

use std::backtrace::Backtrace;

use serde::{Deserialize, Serialize};
use serde_json::{Value, json};

use ttevents_core::{BridgeConfig, MethodName, PluginError};

/// Error payload returned across the channel.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ErrorReply {
    pub code: String,
    pub message: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub details: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub stack_trace: Option<Vec<String>>,
}

/// Envelope for one invocation result.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum BridgeReply {
    Ok { value: String },
    Error { error: ErrorReply },
}

impl From<Result<String, ErrorReply>> for BridgeReply {
    fn from(result: Result<String, ErrorReply>) -> Self {
        match result {
            Ok(value) => Self::Ok { value },
            Err(error) => Self::Error { error },
        }
    }
}

/// Decides how much of a failure is disclosed to the host.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ErrorPolicy {
    show_details: bool,
}

impl ErrorPolicy {
    pub fn new(config: &BridgeConfig) -> Self {
        Self {
            show_details: config.debug_build && config.log_level.is_verbose(),
        }
    }

    pub fn shows_details(&self) -> bool {
        self.show_details
    }

    /// Convert `err`, raised while handling `method`, into a reply.
    pub fn reply(&self, method: Option<MethodName>, err: &PluginError) -> ErrorReply {
        let code = error_code(method, err).to_owned();

        if err.is_validation() || matches!(err, PluginError::NotImplemented(_)) {
            return ErrorReply {
                code,
                message: err.to_string(),
                details: consent_details(err),
                stack_trace: None,
            };
        }

        let generic = generic_message(method);
        if self.show_details {
            ErrorReply {
                code,
                message: format!("{generic}: {err}"),
                details: None,
                stack_trace: Some(
                    Backtrace::force_capture()
                        .to_string()
                        .lines()
                        .map(str::to_owned)
                        .collect(),
                ),
            }
        } else {
            ErrorReply {
                code,
                message: generic.to_owned(),
                details: None,
                stack_trace: None,
            }
        }
    }
}

/// Stable error code for `err` raised while handling `method`.
pub fn error_code(method: Option<MethodName>, err: &PluginError) -> &'static str {
    match err {
        PluginError::InvalidArgument { .. } => "INVALID_ARGUMENTS",
        PluginError::Format { field: "event_name", .. } => "INVALID_EVENT_NAME",
        PluginError::Format { field: "event_type_name", .. } => "INVALID_EVENT_TYPE_NAME",
        PluginError::Format { .. } => "INVALID_FORMAT",
        PluginError::UnsupportedValue { .. } => "UNSUPPORTED_VALUE",
        PluginError::ConsentRequired { .. } => "CONSENT_NOT_GRANTED",
        PluginError::ConfigurationFatal(_) => "CONFIGURATION_FATAL",
        PluginError::NotImplemented(_) => "NOT_IMPLEMENTED",
        PluginError::Serialization(_) | PluginError::Bridge(_) => "BRIDGE_ERROR",
        PluginError::Vendor(_) | PluginError::PlatformUnavailable => match method {
            Some(MethodName::Initialize) => "INIT_FAILED",
            Some(MethodName::Identify) => "IDENTIFY_FAILED",
            Some(MethodName::SendEvent) => "EVENT_ERROR",
            Some(MethodName::Logout) => "LOGOUT_FAILED",
            Some(MethodName::StartTrack) => "START_TRACK_FAILED",
            None => "BRIDGE_ERROR",
        },
    }
}

/// Message shown in production for collaborator failures.
fn generic_message(method: Option<MethodName>) -> &'static str {
    match method {
        Some(MethodName::Initialize) => "An error occurred during TikTok SDK initialization.",
        Some(MethodName::Identify) => "An error occurred during user identification.",
        Some(MethodName::SendEvent) => "An error occurred while sending the event.",
        Some(MethodName::Logout) => "An error occurred during logout.",
        Some(MethodName::StartTrack) => "An error occurred while starting tracking.",
        None => "The bridge received a malformed request.",
    }
}

fn consent_details(err: &PluginError) -> Option<Value> {
    match err {
        PluginError::ConsentRequired {
            status: Some(status),
            ..
        } => Some(json!({
            "status": status.raw_value(),
            "description": status.description(),
        })),
        _ => None,
    }
}
