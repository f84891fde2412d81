// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! System information snapshot of a device.

use serde::{Deserialize, Serialize};

use crate::types::PowerState;

/// Point-in-time system information reported by a device.
///
/// Field names follow the device's `sysinfo` payload. Everything except the
/// model is optional because firmware revisions differ in what they report.
///
/// # Examples
///
/// ```
/// use plugsync::response::DeviceSnapshot;
/// use plugsync::types::PowerState;
///
/// let json = r#"{
///     "model": "HS110(EU)",
///     "mac": "50:C7:BF:00:11:22",
///     "sw_ver": "1.2.5 Build 171213 Rel.101523",
///     "hw_ver": "2.0",
///     "relay_state": 1,
///     "alias": "Lamp"
/// }"#;
/// let snapshot: DeviceSnapshot = serde_json::from_str(json).unwrap();
/// assert_eq!(snapshot.power_state(), PowerState::On);
/// assert!(!snapshot.is_dimmable());
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeviceSnapshot {
    /// Model identifier, e.g. `HS110(EU)`.
    #[serde(default)]
    pub model: String,

    /// MAC address.
    #[serde(default)]
    pub mac: Option<String>,

    /// Firmware version.
    #[serde(rename = "sw_ver", default)]
    pub software_version: Option<String>,

    /// Hardware revision.
    #[serde(rename = "hw_ver", default)]
    pub hardware_version: Option<String>,

    /// Raw relay state, `0` meaning off.
    #[serde(default)]
    pub relay_state: Option<u8>,

    /// `1` if the bulb supports dimming.
    #[serde(default)]
    pub is_dimmable: Option<u8>,

    /// Name stored on the device itself.
    #[serde(default)]
    pub alias: Option<String>,
}

impl DeviceSnapshot {
    /// Creates a snapshot for the given model with everything else unset.
    #[must_use]
    pub fn new(model: impl Into<String>) -> Self {
        Self {
            model: model.into(),
            ..Self::default()
        }
    }

    /// Sets the relay state.
    #[must_use]
    pub fn with_power(mut self, state: PowerState) -> Self {
        self.relay_state = Some(u8::from(state.is_on()));
        self
    }

    /// Sets the MAC address.
    #[must_use]
    pub fn with_mac(mut self, mac: impl Into<String>) -> Self {
        self.mac = Some(mac.into());
        self
    }

    /// Sets the firmware and hardware versions.
    #[must_use]
    pub fn with_versions(mut self, software: impl Into<String>, hardware: impl Into<String>) -> Self {
        self.software_version = Some(software.into());
        self.hardware_version = Some(hardware.into());
        self
    }

    /// Marks the device as dimmable.
    #[must_use]
    pub fn dimmable(mut self) -> Self {
        self.is_dimmable = Some(1);
        self
    }

    /// Returns the relay state; a missing value reads as off.
    #[must_use]
    pub fn power_state(&self) -> PowerState {
        PowerState::from_relay(self.relay_state.unwrap_or(0))
    }

    /// Returns true if the device reports dimming support.
    #[must_use]
    pub fn is_dimmable(&self) -> bool {
        self.is_dimmable == Some(1)
    }
}
