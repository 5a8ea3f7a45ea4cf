// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// ttevents-events: turns untyped argument bags into vendor-ready values.
//
// Pipeline per invocation: sanitize → validate → build. Nothing here keeps
// state between calls; each function is a pure transformation of its
// arguments and may be called concurrently.

pub mod builder;
pub mod capabilities;
pub mod coerce;
pub mod processor;
pub mod resolve;

pub use builder::{build_base_event, build_contents_event, build_event, content_params};
pub use capabilities::{EventField, capabilities, supports};
pub use processor::EventArgumentProcessor;
pub use resolve::{DEFAULT_TYPE_TAG, resolve_kind};
