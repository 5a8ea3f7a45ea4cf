// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Plugin and vendor SDK configuration.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Verbosity requested by the host application.
///
/// Shared by the vendor SDK configuration and the bridge's error
/// disclosure policy.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    None,
    #[default]
    Info,
    Warn,
    Debug,
    Verbose,
}

impl LogLevel {
    /// Case-insensitive parse. Unknown names fall back to `Info`.
    pub fn parse(name: &str) -> Self {
        match name.to_ascii_lowercase().as_str() {
            "none" => Self::None,
            "info" => Self::Info,
            "warn" => Self::Warn,
            "debug" => Self::Debug,
            "verbose" => Self::Verbose,
            _ => Self::Info,
        }
    }

    /// Whether detailed diagnostics may be surfaced at this level.
    pub fn is_verbose(&self) -> bool {
        matches!(self, Self::Debug | Self::Verbose)
    }

    /// `tracing` filter directive equivalent to this level.
    pub fn as_filter(&self) -> &'static str {
        match self {
            Self::None => "off",
            Self::Info => "info",
            Self::Warn => "warn",
            Self::Debug => "debug",
            Self::Verbose => "trace",
        }
    }
}

/// Process-wide bridge settings, injected once when the plugin is created.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BridgeConfig {
    /// The host was built in debug mode.
    pub debug_build: bool,
    /// Log level configured by the host.
    pub log_level: LogLevel,
}

impl Default for BridgeConfig {
    fn default() -> Self {
        Self {
            debug_build: cfg!(debug_assertions),
            log_level: LogLevel::Info,
        }
    }
}

/// Feature toggles forwarded to the vendor SDK at initialization.
///
/// Each flag is set only when the host passed a literal boolean `true`.
/// Android and iOS honour different subsets; adapters ignore the rest.
/// The access token never appears in `Debug` output or serialized form.
#[derive(Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SdkOptions {
    // Android
    pub disable_auto_start: bool,
    pub disable_auto_events: bool,
    pub disable_install_logging: bool,
    pub disable_launch_logging: bool,
    pub disable_retention_logging: bool,
    pub enable_auto_iap_track: bool,
    pub disable_advertiser_id_collection: bool,
    // iOS
    pub disable_tracking: bool,
    pub disable_automatic_tracking: bool,
    pub disable_install_tracking: bool,
    pub disable_launch_tracking: bool,
    pub disable_retention_tracking: bool,
    pub disable_payment_tracking: bool,
    pub disable_app_tracking_dialog: bool,
    pub disable_sk_ad_network_support: bool,
    /// `Some(false)` suppresses the ATT dialog.
    pub display_att: Option<bool>,
    #[serde(skip_serializing)]
    pub access_token: Option<String>,
}

impl fmt::Debug for SdkOptions {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SdkOptions")
            .field("disable_auto_start", &self.disable_auto_start)
            .field("disable_auto_events", &self.disable_auto_events)
            .field("disable_install_logging", &self.disable_install_logging)
            .field("disable_launch_logging", &self.disable_launch_logging)
            .field("disable_retention_logging", &self.disable_retention_logging)
            .field("enable_auto_iap_track", &self.enable_auto_iap_track)
            .field(
                "disable_advertiser_id_collection",
                &self.disable_advertiser_id_collection,
            )
            .field("disable_tracking", &self.disable_tracking)
            .field("disable_automatic_tracking", &self.disable_automatic_tracking)
            .field("disable_install_tracking", &self.disable_install_tracking)
            .field("disable_launch_tracking", &self.disable_launch_tracking)
            .field("disable_retention_tracking", &self.disable_retention_tracking)
            .field("disable_payment_tracking", &self.disable_payment_tracking)
            .field("disable_app_tracking_dialog", &self.disable_app_tracking_dialog)
            .field(
                "disable_sk_ad_network_support",
                &self.disable_sk_ad_network_support,
            )
            .field("display_att", &self.display_att)
            .field(
                "access_token",
                &self.access_token.as_ref().map(|_| "<redacted>"),
            )
            .finish()
    }
}

impl SdkOptions {
    /// The ATT prompt will not be shown by the SDK.
    pub fn suppresses_att(&self) -> bool {
        self.disable_app_tracking_dialog || self.display_att == Some(false)
    }
}

/// Validated vendor SDK configuration produced by `initialize`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SdkConfig {
    pub app_id: String,
    pub tiktok_id: String,
    pub debug_mode: bool,
    pub log_level: LogLevel,
    pub options: SdkOptions,
}
