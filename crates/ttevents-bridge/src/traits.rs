// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Platform-agnostic trait definitions for the external collaborators.
//
// The plugin never talks to a vendor SDK or an OS consent API directly.
// Each platform adapter implements these traits; the argument pipeline
// only ever hands them fully validated values.

use ttevents_core::error::Result;
use ttevents_core::{AuthorizationStatus, NormalizedIdentity, SdkConfig, TypedEvent};

/// Everything a platform adapter provides.
pub trait PlatformBridge: VendorSdk + ConsentGate + Send + Sync {
    /// Human-readable platform name (e.g. "iOS", "Android").
    fn platform_name(&self) -> &str;
}

/// The vendor analytics SDK.
///
/// Delivery, batching and retry all happen inside the SDK; a successful
/// return only means the SDK accepted the call.
pub trait VendorSdk {
    /// Configure and start the SDK.
    fn initialize(&self, config: &SdkConfig) -> Result<()>;

    /// Attach a user identity to subsequent events.
    fn identify(&self, identity: &NormalizedIdentity) -> Result<()>;

    /// Hand one event to the SDK.
    fn track(&self, event: &TypedEvent) -> Result<()>;

    /// Clear the current identity.
    fn logout(&self) -> Result<()>;

    /// Enable tracking. Only called after consent has been established.
    fn start_track(&self) -> Result<()>;
}

/// OS-level tracking authorization (App Tracking Transparency on iOS).
pub trait ConsentGate {
    /// Current authorization status. Platforms without an OS gate report
    /// `Authorized` and rely on the host's explicit consent flag.
    fn tracking_authorization(&self) -> Result<AuthorizationStatus>;
}
