// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! The fixed set of fields an exposed device object can carry.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::capabilities::Capabilities;

/// Value kind of a field, as declared to the state store.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ValueKind {
    /// Free text.
    String,
    /// On/off flag.
    Boolean,
    /// Integer or decimal reading.
    Number,
}

/// A field of an exposed device object.
///
/// Base fields exist on every object. Metering fields exist only for models
/// that report electrical readings, and [`Field::Brightness`] only for
/// lighting models.
///
/// # Examples
///
/// ```
/// use plugsync::types::Field;
///
/// assert_eq!(Field::TotalMonthNow.id(), "totalMonthNow");
/// assert_eq!("sw_ver".parse::<Field>().unwrap(), Field::SoftwareVersion);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Field {
    /// Local time of the last successful refresh.
    LastUpdate,
    /// Relay state; the only operator-writable field.
    State,
    /// MAC address.
    Mac,
    /// Firmware version.
    SoftwareVersion,
    /// Hardware revision.
    HardwareVersion,
    /// Model identifier, e.g. `HS110(EU)`.
    Model,
    /// Current in milliamps.
    Current,
    /// Power in milliwatts.
    Power,
    /// Voltage in millivolts.
    Voltage,
    /// Accumulated energy in watt-hours.
    TotalNow,
    /// Energy of the current month in watt-hours.
    TotalMonthNow,
    /// Brightness in percent.
    Brightness,
}

impl Field {
    /// Fields every device object carries.
    pub const BASE: [Self; 6] = [
        Self::LastUpdate,
        Self::State,
        Self::Mac,
        Self::SoftwareVersion,
        Self::HardwareVersion,
        Self::Model,
    ];

    /// Fields added for metering-capable models.
    pub const METERING: [Self; 5] = [
        Self::Current,
        Self::Power,
        Self::Voltage,
        Self::TotalNow,
        Self::TotalMonthNow,
    ];

    /// Fields added for lighting models.
    pub const LIGHTING: [Self; 1] = [Self::Brightness];

    /// Returns the persisted field id.
    #[must_use]
    pub const fn id(self) -> &'static str {
        match self {
            Self::LastUpdate => "last_update",
            Self::State => "state",
            Self::Mac => "mac",
            Self::SoftwareVersion => "sw_ver",
            Self::HardwareVersion => "hw_ver",
            Self::Model => "model",
            Self::Current => "current",
            Self::Power => "power",
            Self::Voltage => "voltage",
            Self::TotalNow => "totalNow",
            Self::TotalMonthNow => "totalMonthNow",
            Self::Brightness => "brightness",
        }
    }

    /// Returns the declared value kind.
    #[must_use]
    pub const fn kind(self) -> ValueKind {
        match self {
            Self::State => ValueKind::Boolean,
            Self::LastUpdate
            | Self::Mac
            | Self::SoftwareVersion
            | Self::HardwareVersion
            | Self::Model => ValueKind::String,
            Self::Current
            | Self::Power
            | Self::Voltage
            | Self::TotalNow
            | Self::TotalMonthNow
            | Self::Brightness => ValueKind::Number,
        }
    }

    /// Returns the store role.
    #[must_use]
    pub const fn role(self) -> &'static str {
        match self {
            Self::State => "switch",
            Self::Brightness => "level.dimmer",
            _ => "value",
        }
    }

    /// Returns a short human readable description.
    #[must_use]
    pub const fn description(self) -> &'static str {
        match self {
            Self::LastUpdate => "last update",
            Self::State => "Switch on/off",
            Self::Mac => "Mac address",
            Self::SoftwareVersion => "software version",
            Self::HardwareVersion => "hardware version",
            Self::Model => "model",
            Self::Current => "current (mA)",
            Self::Power => "power (mW)",
            Self::Voltage => "voltage (mV)",
            Self::TotalNow => "total energy (Wh)",
            Self::TotalMonthNow => "energy this month (Wh)",
            Self::Brightness => "brightness (%)",
        }
    }

    /// Returns true if operators may write this field.
    #[must_use]
    pub const fn is_writable(self) -> bool {
        matches!(self, Self::State)
    }

    /// Returns the full field set for a device with the given capabilities.
    #[must_use]
    pub fn set_for(capabilities: Capabilities) -> Vec<Self> {
        let mut fields = Self::BASE.to_vec();
        if capabilities.metering {
            fields.extend(Self::METERING);
        }
        if capabilities.lighting {
            fields.extend(Self::LIGHTING);
        }
        fields
    }
}

impl fmt::Display for Field {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.id())
    }
}

/// Error returned when a field id is not recognised.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown field: {0}")]
pub struct UnknownField(pub String);

impl FromStr for Field {
    type Err = UnknownField;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::BASE
            .iter()
            .chain(Self::METERING.iter())
            .chain(Self::LIGHTING.iter())
            .copied()
            .find(|field| field.id() == s)
            .ok_or_else(|| UnknownField(s.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ids_round_trip_through_from_str() {
        for field in Field::set_for(Capabilities::metering_plug())
            .into_iter()
            .chain(Field::LIGHTING)
        {
            assert_eq!(field.id().parse::<Field>().unwrap(), field);
        }
    }

    #[test]
    fn unknown_id_is_rejected() {
        assert_eq!(
            "total".parse::<Field>(),
            Err(UnknownField("total".to_string()))
        );
    }

    #[test]
    fn basic_plug_has_only_base_fields() {
        assert_eq!(Field::set_for(Capabilities::basic()), Field::BASE.to_vec());
    }

    #[test]
    fn metering_plug_adds_five_fields() {
        let fields = Field::set_for(Capabilities::metering_plug());
        assert_eq!(fields.len(), 11);
        assert!(fields.contains(&Field::TotalMonthNow));
        assert!(!fields.contains(&Field::Brightness));
    }

    #[test]
    fn only_state_is_writable() {
        let writable: Vec<_> = Field::set_for(Capabilities::metering_plug())
            .into_iter()
            .filter(|f| f.is_writable())
            .collect();
        assert_eq!(writable, vec![Field::State]);
    }
}
