// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Configuring the plugin installs process-wide logging. Runs in its own test
// binary so no other test has touched the global dispatcher or plugin.

use ttevents_bridge::{configure, global_plugin};
use ttevents_core::{BridgeConfig, LogLevel};

#[test]
fn configure_installs_a_tracing_subscriber() {
    assert!(!tracing::dispatcher::has_been_set());

    let first = configure(BridgeConfig {
        debug_build: true,
        log_level: LogLevel::Debug,
    });
    assert!(first);
    assert!(tracing::dispatcher::has_been_set());

    let second = configure(BridgeConfig {
        debug_build: false,
        log_level: LogLevel::None,
    });
    assert!(!second);
    assert!(global_plugin().policy().shows_details());
}
