// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Untyped argument bags as they arrive over the method channel.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::error::{PluginError, Result};

/// String-keyed map of dynamically typed values received with one method
/// invocation.
///
/// Accessors come in two flavours. Lenient ones (`opt_*`) treat a value of
/// the wrong type as absent and are used for optional fields. Strict ones
/// (`*_field`) report [`PluginError::UnsupportedValue`] and are used for
/// fields that have no safe default.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ArgumentBag(Map<String, Value>);

impl ArgumentBag {
    pub fn new() -> Self {
        Self(Map::new())
    }

    /// Wrap a decoded channel payload. `null` is an empty bag; anything
    /// other than an object is rejected.
    pub fn from_value(value: Value) -> Result<Self> {
        match value {
            Value::Object(map) => Ok(Self(map)),
            Value::Null => Ok(Self::new()),
            _ => Err(PluginError::Bridge(
                "method arguments must be a map".into(),
            )),
        }
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.0.get(key)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&String, &Value)> {
        self.0.iter()
    }

    /// Builder-style insert, mostly for tests and the harness.
    pub fn with(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.0.insert(key.into(), value.into());
        self
    }

    /// String value, or `None` when absent or not a string.
    pub fn opt_str(&self, key: &str) -> Option<&str> {
        self.0.get(key).and_then(Value::as_str)
    }

    /// Boolean value, or `None` when absent or not a boolean.
    pub fn opt_bool(&self, key: &str) -> Option<bool> {
        self.0.get(key).and_then(Value::as_bool)
    }

    /// String value; absent or `null` is `Ok(None)`, any other type is an
    /// error naming the key.
    pub fn str_field(&self, key: &'static str) -> Result<Option<&str>> {
        match self.0.get(key) {
            None | Some(Value::Null) => Ok(None),
            Some(Value::String(s)) => Ok(Some(s.as_str())),
            Some(_) => Err(PluginError::UnsupportedValue {
                field: key,
                expected: "a string",
            }),
        }
    }

    /// Boolean value; absent or `null` is `Ok(None)`.
    pub fn bool_field(&self, key: &'static str) -> Result<Option<bool>> {
        match self.0.get(key) {
            None | Some(Value::Null) => Ok(None),
            Some(Value::Bool(b)) => Ok(Some(*b)),
            Some(_) => Err(PluginError::UnsupportedValue {
                field: key,
                expected: "a boolean",
            }),
        }
    }

    /// Nested bag; absent or `null` is an empty bag.
    pub fn bag_field(&self, key: &'static str) -> Result<ArgumentBag> {
        match self.0.get(key) {
            None | Some(Value::Null) => Ok(Self::new()),
            Some(Value::Object(map)) => Ok(Self(map.clone())),
            Some(_) => Err(PluginError::UnsupportedValue {
                field: key,
                expected: "a map",
            }),
        }
    }
}

impl From<Map<String, Value>> for ArgumentBag {
    fn from(map: Map<String, Value>) -> Self {
        Self(map)
    }
}
