// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Values stored in object fields.

use std::fmt;

use serde::{Deserialize, Serialize};

/// A value written to, or requested for, an object field.
///
/// Serialises untagged so the store sees plain JSON scalars.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum FieldValue {
    /// Boolean flag.
    Bool(bool),
    /// Numeric reading.
    Number(f64),
    /// Text.
    Text(String),
}

impl FieldValue {
    /// Interprets the value as a power request.
    ///
    /// Booleans map directly; numbers are true when non-zero; text accepts
    /// the usual on/off spellings.
    #[must_use]
    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Self::Bool(b) => Some(*b),
            Self::Number(n) => Some(*n != 0.0),
            Self::Text(s) => match s.to_ascii_lowercase().as_str() {
                "true" | "on" | "1" => Some(true),
                "false" | "off" | "0" => Some(false),
                _ => None,
            },
        }
    }

    /// Returns the text, if this is text.
    #[must_use]
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::Text(s) => Some(s),
            _ => None,
        }
    }
}

impl fmt::Display for FieldValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Bool(b) => write!(f, "{b}"),
            Self::Number(n) => write!(f, "{n}"),
            Self::Text(s) => f.write_str(s),
        }
    }
}

impl From<bool> for FieldValue {
    fn from(value: bool) -> Self {
        Self::Bool(value)
    }
}

impl From<u32> for FieldValue {
    fn from(value: u32) -> Self {
        Self::Number(f64::from(value))
    }
}

impl From<f64> for FieldValue {
    fn from(value: f64) -> Self {
        Self::Number(value)
    }
}

impl From<String> for FieldValue {
    fn from(value: String) -> Self {
        Self::Text(value)
    }
}

impl From<&str> for FieldValue {
    fn from(value: &str) -> Self {
        Self::Text(value.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bool_interpretation() {
        assert_eq!(FieldValue::Bool(true).as_bool(), Some(true));
        assert_eq!(FieldValue::Number(0.0).as_bool(), Some(false));
        assert_eq!(FieldValue::from("ON").as_bool(), Some(true));
        assert_eq!(FieldValue::from("maybe").as_bool(), None);
    }

    #[test]
    fn serialises_as_plain_scalars() {
        assert_eq!(serde_json::to_string(&FieldValue::Bool(false)).unwrap(), "false");
        assert_eq!(serde_json::to_string(&FieldValue::from(42u32)).unwrap(), "42.0");
        assert_eq!(serde_json::to_string(&FieldValue::from("x")).unwrap(), "\"x\"");
    }

    #[test]
    fn deserialises_untagged() {
        let v: FieldValue = serde_json::from_str("true").unwrap();
        assert_eq!(v, FieldValue::Bool(true));
        let v: FieldValue = serde_json::from_str("\"HS110(EU)\"").unwrap();
        assert_eq!(v.as_str(), Some("HS110(EU)"));
    }
}
