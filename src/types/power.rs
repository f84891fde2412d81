// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Relay power state.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Represents the relay state of a plug.
///
/// # Examples
///
/// ```
/// use plugsync::types::PowerState;
///
/// assert_eq!(PowerState::from_relay(1), PowerState::On);
/// assert_eq!(PowerState::from_relay(0), PowerState::Off);
/// assert!(PowerState::On.is_on());
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PowerState {
    /// Relay open.
    Off,
    /// Relay closed.
    On,
}

impl PowerState {
    /// Interprets a raw relay value; anything non-zero is on.
    #[must_use]
    pub const fn from_relay(relay_state: u8) -> Self {
        if relay_state == 0 { Self::Off } else { Self::On }
    }

    /// Returns true if the relay is closed.
    #[must_use]
    pub const fn is_on(self) -> bool {
        matches!(self, Self::On)
    }

    /// Returns the canonical string representation.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Off => "OFF",
            Self::On => "ON",
        }
    }
}

impl fmt::Display for PowerState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl From<bool> for PowerState {
    fn from(value: bool) -> Self {
        if value { Self::On } else { Self::Off }
    }
}

impl From<PowerState> for bool {
    fn from(value: PowerState) -> Self {
        value.is_on()
    }
}
