// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// ttevents: Core types and error definitions shared across all crates.

pub mod args;
pub mod config;
pub mod currency;
pub mod error;
pub mod types;

pub use args::ArgumentBag;
pub use config::{BridgeConfig, LogLevel, SdkConfig, SdkOptions};
pub use currency::Currency;
pub use error::PluginError;
pub use types::*;
