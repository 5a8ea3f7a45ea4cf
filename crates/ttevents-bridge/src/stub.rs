// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Stub bridge for desktop/CI builds where no vendor SDK is linked.
//
// Instead of talking to an SDK it records every call it receives, so tests
// and the harness can inspect exactly what would have been forwarded.

use std::sync::{Mutex, MutexGuard};

use chrono::{DateTime, Utc};
use serde::Serialize;
use tracing::{debug, warn};

use ttevents_core::error::{PluginError, Result};
use ttevents_core::{AuthorizationStatus, NormalizedIdentity, SdkConfig, TypedEvent};

use crate::traits::*;

/// A call the stub accepted.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "call", rename_all = "snake_case")]
pub enum VendorCall {
    Initialize { config: SdkConfig },
    Identify { identity: NormalizedIdentity },
    Track { event: TypedEvent },
    Logout,
    StartTrack,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RecordedCall {
    pub at: DateTime<Utc>,
    #[serde(flatten)]
    pub call: VendorCall,
}

/// Recording bridge returned on non-mobile platforms.
#[derive(Debug)]
pub struct StubBridge {
    authorization: AuthorizationStatus,
    failure: Option<String>,
    calls: Mutex<Vec<RecordedCall>>,
}

impl StubBridge {
    /// Authorized, always-succeeding stub.
    pub fn new() -> Self {
        Self::with_authorization(AuthorizationStatus::Authorized)
    }

    /// Stub whose consent gate reports `status`.
    pub fn with_authorization(status: AuthorizationStatus) -> Self {
        Self {
            authorization: status,
            failure: None,
            calls: Mutex::new(Vec::new()),
        }
    }

    /// Stub whose SDK calls all fail with `message`.
    pub fn failing(message: impl Into<String>) -> Self {
        Self {
            failure: Some(message.into()),
            ..Self::new()
        }
    }

    /// Snapshot of every call accepted so far, oldest first.
    pub fn calls(&self) -> Vec<RecordedCall> {
        self.lock().clone()
    }

    fn lock(&self) -> MutexGuard<'_, Vec<RecordedCall>> {
        self.calls.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    fn record(&self, call: VendorCall) -> Result<()> {
        if let Some(message) = &self.failure {
            warn!(?call, "stub bridge rejecting call");
            return Err(PluginError::Vendor(message.clone()));
        }
        debug!(?call, "stub bridge recorded call");
        self.lock().push(RecordedCall { at: Utc::now(), call });
        Ok(())
    }
}

impl Default for StubBridge {
    fn default() -> Self {
        Self::new()
    }
}

impl PlatformBridge for StubBridge {
    fn platform_name(&self) -> &str {
        "Desktop (stub)"
    }
}

impl VendorSdk for StubBridge {
    fn initialize(&self, config: &SdkConfig) -> Result<()> {
        self.record(VendorCall::Initialize {
            config: config.clone(),
        })
    }

    fn identify(&self, identity: &NormalizedIdentity) -> Result<()> {
        self.record(VendorCall::Identify {
            identity: identity.clone(),
        })
    }

    fn track(&self, event: &TypedEvent) -> Result<()> {
        self.record(VendorCall::Track {
            event: event.clone(),
        })
    }

    fn logout(&self) -> Result<()> {
        self.record(VendorCall::Logout)
    }

    fn start_track(&self) -> Result<()> {
        self.record(VendorCall::StartTrack)
    }
}

impl ConsentGate for StubBridge {
    fn tracking_authorization(&self) -> Result<AuthorizationStatus> {
        Ok(self.authorization)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn records_calls_in_order() {
        let stub = StubBridge::new();
        stub.logout().unwrap();
        stub.start_track().unwrap();

        let calls: Vec<_> = stub.calls().into_iter().map(|c| c.call).collect();
        assert_eq!(calls, vec![VendorCall::Logout, VendorCall::StartTrack]);
    }

    #[test]
    fn failing_stub_records_nothing() {
        let stub = StubBridge::failing("sdk offline");
        assert!(matches!(stub.logout(), Err(PluginError::Vendor(m)) if m == "sdk offline"));
        assert!(stub.calls().is_empty());
    }

    #[test]
    fn recorded_initialize_hides_access_token() {
        let config = SdkConfig {
            app_id: "com.example".into(),
            tiktok_id: "7000".into(),
            debug_mode: true,
            log_level: ttevents_core::LogLevel::Debug,
            options: ttevents_core::SdkOptions {
                access_token: Some("SECRET-TOKEN-123".into()),
                ..Default::default()
            },
        };
        let stub = StubBridge::new();
        stub.initialize(&config).unwrap();

        let calls = stub.calls();
        assert!(!format!("{:?}", calls[0].call).contains("SECRET-TOKEN-123"));
        let json = serde_json::to_string(&calls).unwrap();
        assert!(!json.contains("SECRET-TOKEN-123"));
        assert_eq!(calls[0].call, VendorCall::Initialize { config });
    }

    #[test]
    fn reports_configured_authorization() {
        let stub = StubBridge::with_authorization(AuthorizationStatus::Denied);
        assert_eq!(stub.tracking_authorization().unwrap(), AuthorizationStatus::Denied);
        assert_eq!(stub.platform_name(), "Desktop (stub)");
    }
}
