// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Smart bulb light state.

use serde::{Deserialize, Serialize};

/// Light state of a bulb.
///
/// When a bulb is off, the device reports the last used settings under
/// `dft_on_state` instead of at the top level.
///
/// # Examples
///
/// ```
/// use plugsync::response::LightState;
///
/// let on: LightState = serde_json::from_str(r#"{"on_off":1,"brightness":80}"#).unwrap();
/// assert_eq!(on.brightness(), Some(80));
///
/// let off: LightState =
///     serde_json::from_str(r#"{"on_off":0,"dft_on_state":{"brightness":35}}"#).unwrap();
/// assert_eq!(off.brightness(), Some(35));
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LightState {
    /// `1` when the bulb is lit.
    #[serde(default)]
    pub on_off: u8,

    /// Brightness in percent, present while lit.
    #[serde(default)]
    pub brightness: Option<u8>,

    /// Settings restored when the bulb is switched on.
    #[serde(default)]
    pub dft_on_state: Option<DefaultOnState>,
}

/// Settings a bulb returns to when switched on.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DefaultOnState {
    /// Brightness in percent.
    #[serde(default)]
    pub brightness: Option<u8>,
}

impl LightState {
    /// Creates a lit state at the given brightness.
    #[must_use]
    pub fn lit(brightness: u8) -> Self {
        Self {
            on_off: 1,
            brightness: Some(brightness),
            dft_on_state: None,
        }
    }

    /// Returns the effective brightness, clamped to 100.
    #[must_use]
    pub fn brightness(&self) -> Option<u8> {
        self.brightness
            .or_else(|| self.dft_on_state.as_ref().and_then(|s| s.brightness))
            .map(|b| b.min(100))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn brightness_is_clamped() {
        assert_eq!(LightState::lit(140).brightness(), Some(100));
    }

    #[test]
    fn missing_brightness() {
        let state: LightState = serde_json::from_str(r#"{"on_off":0}"#).unwrap();
        assert_eq!(state.brightness(), None);
    }
}
