// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Per-device configuration.

use serde::{Deserialize, Serialize};

use crate::types::{DeviceAddress, ObjectId};

/// Addresses this short or shorter are treated as placeholders and ignored.
pub const MIN_ADDRESS_LEN: usize = 5;

/// Configuration of one device.
///
/// # Examples
///
/// ```
/// use plugsync::config::DeviceConfig;
///
/// let config = DeviceConfig::new("192.168.1.5").with_name("Lamp").active(true);
/// assert_eq!(config.display_name(), "Lamp");
/// assert!(config.is_pollable());
///
/// // Without a name the address is shown
/// let config = DeviceConfig::new("192.168.1.6");
/// assert_eq!(config.display_name(), "192.168.1.6");
/// assert!(!config.is_pollable());
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeviceConfig {
    /// Network address of the device.
    #[serde(rename = "ip", alias = "address")]
    pub address: DeviceAddress,

    /// Optional display name.
    #[serde(default)]
    pub name: Option<String>,

    /// Whether the device is provisioned and polled.
    #[serde(default)]
    pub active: bool,
}

impl DeviceConfig {
    /// Creates an inactive, unnamed device configuration.
    #[must_use]
    pub fn new(address: impl Into<String>) -> Self {
        Self {
            address: DeviceAddress::new(address),
            name: None,
            active: false,
        }
    }

    /// Sets the display name.
    #[must_use]
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    /// Sets the active flag.
    #[must_use]
    pub fn active(mut self, active: bool) -> Self {
        self.active = active;
        self
    }

    /// Returns the configured name, or the address if none is set.
    #[must_use]
    pub fn display_name(&self) -> &str {
        match self.name.as_deref() {
            Some(name) if !name.is_empty() => name,
            _ => self.address.as_str(),
        }
    }

    /// Returns the object identifier this device is exposed under.
    #[must_use]
    pub fn object_id(&self) -> ObjectId {
        self.address.object_id()
    }

    /// Returns true if the device is active and its address is plausible.
    #[must_use]
    pub fn is_pollable(&self) -> bool {
        self.active && self.address.as_str().len() > MIN_ADDRESS_LEN
    }
}
