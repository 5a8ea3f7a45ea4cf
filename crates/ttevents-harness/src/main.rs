// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// ttevents harness: drive one plugin invocation from the command line.
//
// Runs the full argument pipeline against the recording stub bridge, prints
// the JSON reply and the calls the vendor SDK would have received.

use std::process::ExitCode;
use std::sync::Arc;

use clap::{Parser, ValueEnum};

use ttevents_bridge::marshal::{handle_json, init_logging, plugin_for};
use ttevents_bridge::stub::StubBridge;
use ttevents_core::{AuthorizationStatus, BridgeConfig, LogLevel};

#[derive(Parser, Debug)]
#[command(name = "ttevents-harness")]
#[command(version)]
#[command(about = "Run one plugin invocation against the recording stub bridge", long_about = None)]
struct Cli {
    /// Channel method name (initialize, identify, sendEvent, logout, startTrack)
    method: String,

    /// Arguments as a JSON object; empty means no arguments
    #[arg(default_value = "")]
    args_json: String,

    /// Treat the host as a debug build
    #[arg(long)]
    debug: bool,

    /// Host log level
    #[arg(long, value_enum, ignore_case = true, default_value = "info")]
    log_level: LevelArg,

    /// Authorization status the stub's consent gate reports
    #[arg(long, value_enum, ignore_case = true, default_value = "authorized")]
    att: AttArg,

    /// Make every forwarded SDK call fail with this message
    #[arg(long, value_name = "MESSAGE")]
    fail: Option<String>,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
enum LevelArg {
    None,
    Info,
    Warn,
    Debug,
    Verbose,
}

impl From<LevelArg> for LogLevel {
    fn from(level: LevelArg) -> Self {
        match level {
            LevelArg::None => Self::None,
            LevelArg::Info => Self::Info,
            LevelArg::Warn => Self::Warn,
            LevelArg::Debug => Self::Debug,
            LevelArg::Verbose => Self::Verbose,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
enum AttArg {
    #[value(aliases = ["not_determined", "notdetermined"])]
    NotDetermined,
    Restricted,
    Denied,
    Authorized,
}

impl From<AttArg> for AuthorizationStatus {
    fn from(status: AttArg) -> Self {
        match status {
            AttArg::NotDetermined => Self::NotDetermined,
            AttArg::Restricted => Self::Restricted,
            AttArg::Denied => Self::Denied,
            AttArg::Authorized => Self::Authorized,
        }
    }
}

impl Cli {
    fn bridge_config(&self) -> BridgeConfig {
        BridgeConfig {
            debug_build: self.debug,
            log_level: self.log_level.into(),
        }
    }
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    let config = cli.bridge_config();

    init_logging(config.log_level);

    let stub = Arc::new(match &cli.fail {
        Some(message) => StubBridge::failing(message.clone()),
        None => StubBridge::with_authorization(cli.att.into()),
    });
    let plugin = plugin_for(stub.clone(), &config);

    let reply = handle_json(&plugin, &cli.method, &cli.args_json);
    println!("{reply}");

    match serde_json::to_string_pretty(&stub.calls()) {
        Ok(calls) => eprintln!("forwarded calls: {calls}"),
        Err(e) => tracing::error!(error = %e, "failed to encode recorded calls"),
    }

    let failed = serde_json::from_str::<serde_json::Value>(&reply)
        .map(|v| v["status"] != "ok")
        .unwrap_or(true);
    if failed {
        ExitCode::FAILURE
    } else {
        ExitCode::SUCCESS
    }
}
