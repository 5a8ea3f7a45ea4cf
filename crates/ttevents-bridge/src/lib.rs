// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// ttevents: Method-channel dispatch and native platform adapters.
//
// The plugin validates and normalizes every invocation in Rust, then hands
// typed values to a platform bridge. iOS talks to the vendor SDK through
// objc2, Android through JNI; everywhere else a recording stub stands in.

pub mod marshal;
pub mod plugin;
pub mod reply;
pub mod stub;
pub mod traits;

#[cfg(target_os = "ios")]
pub mod ios;

#[cfg(target_os = "android")]
pub mod android;

use std::sync::Arc;

pub use marshal::{configure, global_plugin, handle_json};
pub use plugin::EventsPlugin;
pub use reply::{BridgeReply, ErrorPolicy, ErrorReply};
pub use traits::{ConsentGate, PlatformBridge, VendorSdk};

/// Bridge implementation for the target operating system.
pub fn platform_bridge() -> Arc<dyn PlatformBridge> {
    #[cfg(target_os = "ios")]
    {
        Arc::new(ios::IosBridge::new())
    }
    #[cfg(target_os = "android")]
    {
        Arc::new(android::AndroidBridge::new())
    }
    #[cfg(not(any(target_os = "ios", target_os = "android")))]
    {
        Arc::new(stub::StubBridge::new())
    }
}
