// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Adapter-wide configuration: device list, poll interval and run mode.

use std::collections::HashMap;
use std::fmt;
use std::time::Duration;

use serde::{Deserialize, Deserializer, Serialize};

use crate::error::ConfigError;
use crate::types::{DeviceAddress, ObjectId};

use super::DeviceConfig;

/// Poll interval with the minimum spacing applied.
///
/// # Examples
///
/// ```
/// use std::time::Duration;
/// use plugsync::config::PollInterval;
///
/// assert_eq!(PollInterval::from_millis(60_000).as_duration(), Duration::from_secs(60));
/// // Anything below five seconds is raised to five seconds
/// assert_eq!(PollInterval::from_millis(200).as_millis(), 5000);
/// assert_eq!("12000 ms".parse::<PollInterval>().unwrap().as_millis(), 12_000);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(into = "u64")]
pub struct PollInterval(u64);

impl PollInterval {
    /// Smallest allowed spacing between poll cycles, in milliseconds.
    pub const MIN_MILLIS: u64 = 5000;

    /// Interval used when none is configured, in milliseconds.
    pub const DEFAULT_MILLIS: u64 = 60_000;

    /// Creates an interval, raising it to [`Self::MIN_MILLIS`] if needed.
    #[must_use]
    pub fn from_millis(millis: i64) -> Self {
        let millis = u64::try_from(millis).unwrap_or(0);
        Self(millis.max(Self::MIN_MILLIS))
    }

    /// Returns the interval in milliseconds.
    #[must_use]
    pub const fn as_millis(self) -> u64 {
        self.0
    }

    /// Returns the interval as a `Duration`.
    #[must_use]
    pub const fn as_duration(self) -> Duration {
        Duration::from_millis(self.0)
    }

    /// Coerces a number to an integer interval, truncating any fraction.
    fn from_number(value: f64) -> Result<Self, ConfigError> {
        if !value.is_finite() {
            return Err(ConfigError::InvalidInterval(value.to_string()));
        }
        // Saturating cast is the intended coercion
        #[allow(clippy::cast_possible_truncation)]
        let millis = value.trunc() as i64;
        Ok(Self::from_millis(millis))
    }
}

impl Default for PollInterval {
    fn default() -> Self {
        Self(Self::DEFAULT_MILLIS)
    }
}

impl From<PollInterval> for u64 {
    fn from(value: PollInterval) -> Self {
        value.0
    }
}

impl fmt::Display for PollInterval {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ms", self.0)
    }
}

impl std::str::FromStr for PollInterval {
    type Err = ConfigError;

    /// Parses the leading integer of `s`, ignoring surrounding whitespace
    /// and any trailing text.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim_start();
        let sign_len = usize::from(trimmed.starts_with(['-', '+']));
        let digits_len = trimmed[sign_len..]
            .bytes()
            .take_while(u8::is_ascii_digit)
            .count();
        if digits_len == 0 {
            return Err(ConfigError::InvalidInterval(s.to_string()));
        }
        let prefix = &trimmed[..sign_len + digits_len];
        // Overflowing values are clamped rather than rejected
        let millis = prefix.parse::<i64>().unwrap_or(if prefix.starts_with('-') {
            i64::MIN
        } else {
            i64::MAX
        });
        Ok(Self::from_millis(millis))
    }
}

impl<'de> Deserialize<'de> for PollInterval {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        #[derive(Deserialize)]
        #[serde(untagged)]
        enum Raw {
            Number(f64),
            Text(String),
        }

        let interval = match Raw::deserialize(deserializer)? {
            Raw::Number(n) => Self::from_number(n),
            Raw::Text(s) => s.parse(),
        };
        interval.map_err(serde::de::Error::custom)
    }
}

/// How the host runs the adapter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RunMode {
    /// Long-running service; stop requests take effect immediately.
    #[default]
    Daemon,
    /// Started periodically by the host; stop requests are deferred by a
    /// grace period so a running cycle can finish.
    Schedule,
}

/// Complete adapter configuration.
///
/// # Examples
///
/// ```
/// use plugsync::config::{AdapterConfig, RunMode};
///
/// let json = r#"{
///     "devices": [
///         { "ip": "192.168.1.5", "name": "Lamp", "active": true },
///         { "ip": "192.168.1.6", "active": false }
///     ],
///     "interval": "30000"
/// }"#;
/// let config = AdapterConfig::from_json_str(json).unwrap();
/// assert_eq!(config.interval.as_millis(), 30_000);
/// assert_eq!(config.mode, RunMode::Daemon);
/// assert_eq!(config.pollable_addresses().len(), 1);
/// ```
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AdapterConfig {
    /// Configured devices, in display order.
    #[serde(default)]
    pub devices: Vec<DeviceConfig>,

    /// Minimum spacing between poll cycles.
    #[serde(default)]
    pub interval: PollInterval,

    /// Host run mode.
    #[serde(default)]
    pub mode: RunMode,
}

impl AdapterConfig {
    /// Creates a configuration with default interval and mode.
    #[must_use]
    pub fn new(devices: Vec<DeviceConfig>) -> Self {
        Self {
            devices,
            ..Self::default()
        }
    }

    /// Parses a JSON configuration document.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::Json` if the document is malformed or the
    /// interval is not a number.
    pub fn from_json_str(json: &str) -> Result<Self, ConfigError> {
        Ok(serde_json::from_str(json)?)
    }

    /// Sets the poll interval in milliseconds; the floor is applied.
    #[must_use]
    pub fn with_interval_millis(mut self, millis: i64) -> Self {
        self.interval = PollInterval::from_millis(millis);
        self
    }

    /// Sets the run mode.
    #[must_use]
    pub fn with_mode(mut self, mode: RunMode) -> Self {
        self.mode = mode;
        self
    }

    /// Checks that the configuration can be provisioned.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::NoDevices` for an empty device list and
    /// `ConfigError::IdentifierCollision` when two distinct addresses map to
    /// the same object identifier.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.devices.is_empty() {
            return Err(ConfigError::NoDevices);
        }

        let mut seen: HashMap<ObjectId, &DeviceAddress> = HashMap::new();
        for device in &self.devices {
            let id = device.object_id();
            match seen.get(&id) {
                Some(first) if **first != device.address => {
                    return Err(ConfigError::IdentifierCollision {
                        first: first.to_string(),
                        second: device.address.to_string(),
                        id: id.to_string(),
                    });
                }
                Some(_) => {}
                None => {
                    seen.insert(id, &device.address);
                }
            }
        }
        Ok(())
    }

    /// Returns the addresses to provision and poll, in configuration order,
    /// without duplicates.
    #[must_use]
    pub fn pollable_addresses(&self) -> Vec<DeviceAddress> {
        let mut addresses: Vec<DeviceAddress> = Vec::new();
        for device in self.devices.iter().filter(|d| d.is_pollable()) {
            if !addresses.contains(&device.address) {
                addresses.push(device.address.clone());
            }
        }
        addresses
    }

    /// Returns the configuration for `address`.
    ///
    /// The first pollable entry wins; otherwise the first entry listed.
    #[must_use]
    pub fn device(&self, address: &DeviceAddress) -> Option<&DeviceConfig> {
        let mut entries = self.devices.iter().filter(|d| &d.address == address);
        let first = entries.next()?;
        if first.is_pollable() {
            return Some(first);
        }
        entries.find(|d| d.is_pollable()).or(Some(first))
    }

    /// Maps each configured object identifier back to its address.
    #[must_use]
    pub fn address_book(&self) -> HashMap<ObjectId, DeviceAddress> {
        self.devices
            .iter()
            .map(|d| (d.object_id(), d.address.clone()))
            .collect()
    }
}
