// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Per-field type coercion for dynamically typed bag values.
//
// Every function returns `None` rather than failing: optional fields that
// cannot be coerced are simply omitted from the event.

use serde_json::Value;

/// Text form of a generic-event property.
///
/// Precedence: booleans become `"true"`/`"false"`, numbers their decimal
/// form, strings pass through, and composite values are encoded as compact
/// JSON. If encoding fails the debug description is used.
pub fn property_text(value: &Value) -> String {
    match value {
        Value::Bool(b) => b.to_string(),
        Value::Number(n) => n.to_string(),
        Value::String(s) => s.clone(),
        other => serde_json::to_string(other).unwrap_or_else(|_| format!("{other:?}")),
    }
}

/// String value, copied verbatim.
pub fn as_text(value: &Value) -> Option<String> {
    value.as_str().map(str::to_owned)
}

/// Float from a number or a numeric string. Non-finite results are
/// rejected.
pub fn as_float(value: &Value) -> Option<f64> {
    let parsed = match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.parse::<f64>().ok(),
        _ => None,
    };
    parsed.filter(|f| f.is_finite())
}

/// Integer from an integer, a float (truncated toward zero) or an integer
/// string. Values outside the `i64` range are rejected.
pub fn as_quantity(value: &Value) -> Option<i64> {
    match value {
        Value::Number(n) => n.as_i64().or_else(|| {
            n.as_f64()
                .filter(|f| f.is_finite())
                .map(f64::trunc)
                .filter(|f| *f >= i64::MIN as f64 && *f < i64::MAX as f64)
                .map(|f| f as i64)
        }),
        Value::String(s) => s.parse::<i64>().ok(),
        _ => None,
    }
}
