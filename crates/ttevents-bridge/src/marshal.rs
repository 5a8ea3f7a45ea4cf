// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// JSON marshalling shared by the native entry points.
//
// Hosts pass the method name and a JSON-encoded argument map; every call
// returns a JSON reply envelope, never a panic.

use std::sync::{Arc, OnceLock};

use tracing::{debug, error, warn};
use tracing_subscriber::EnvFilter;

use ttevents_core::{ArgumentBag, BridgeConfig, LogLevel, PluginError};

use crate::plugin::EventsPlugin;
use crate::reply::BridgeReply;

static PLUGIN: OnceLock<EventsPlugin> = OnceLock::new();

/// Install the process-wide plugin with `config`. Returns `false` if a
/// plugin was already installed; the first configuration wins.
///
/// Also installs the global tracing subscriber at the host's log level
/// unless the embedding process already set one.
pub fn configure(config: BridgeConfig) -> bool {
    let mut installed = false;
    PLUGIN.get_or_init(|| {
        installed = true;
        create(&config)
    });
    if !installed {
        debug!("events plugin already configured; keeping existing configuration");
    }
    installed
}

/// The process-wide plugin, created with the default configuration if
/// [`configure`] was never called.
pub fn global_plugin() -> &'static EventsPlugin {
    PLUGIN.get_or_init(|| create(&BridgeConfig::default()))
}

fn create(config: &BridgeConfig) -> EventsPlugin {
    init_logging(config.log_level);
    EventsPlugin::new(crate::platform_bridge(), config)
}

/// Install a `fmt` subscriber filtered at `level`. `RUST_LOG` overrides
/// the level when set.
pub fn init_logging(level: LogLevel) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level.as_filter()));
    let result = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .try_init();
    if result.is_err() {
        debug!("tracing subscriber already installed; keeping it");
    }
}

/// Decode `args_json`, dispatch `method` and encode the reply.
///
/// An empty or whitespace-only argument string is treated as an empty map.
pub fn handle_json(plugin: &EventsPlugin, method: &str, args_json: &str) -> String {
    let args = match parse_args(args_json) {
        Ok(args) => args,
        Err(err) => {
            warn!(%method, error = %err, "could not decode arguments");
            let reply = plugin.policy().reply(None, &err);
            return encode_reply(&BridgeReply::Error { error: reply });
        }
    };
    encode_reply(&plugin.handle(method, &args).into())
}

fn parse_args(args_json: &str) -> Result<ArgumentBag, PluginError> {
    if args_json.trim().is_empty() {
        return Ok(ArgumentBag::new());
    }
    let value: serde_json::Value = serde_json::from_str(args_json)?;
    ArgumentBag::from_value(value)
}

/// Serialize a reply envelope.
pub fn encode_reply(reply: &BridgeReply) -> String {
    serde_json::to_string(reply).unwrap_or_else(|err| {
        error!(error = %err, "failed to encode reply");
        r#"{"status":"error","error":{"code":"BRIDGE_ERROR","message":"The bridge received a malformed request."}}"#
            .to_owned()
    })
}

/// Build a plugin around an explicit bridge, bypassing the global.
pub fn plugin_for(bridge: Arc<dyn crate::traits::PlatformBridge>, config: &BridgeConfig) -> EventsPlugin {
    EventsPlugin::new(bridge, config)
}
