// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Energy meter readings.

use serde::{Deserialize, Serialize};

/// Instantaneous meter reading.
///
/// Units are the device's native integer units: milliamps, milliwatts,
/// millivolts and watt-hours.
///
/// # Examples
///
/// ```
/// use plugsync::response::RealtimeMetering;
///
/// let json = r#"{"current_ma":196,"power_mw":45000,"voltage_mv":230100,"total_wh":1234}"#;
/// let reading: RealtimeMetering = serde_json::from_str(json).unwrap();
/// assert_eq!(reading.power_mw, Some(45000.0));
/// ```
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RealtimeMetering {
    /// Current in milliamps.
    #[serde(default)]
    pub current_ma: Option<f64>,

    /// Power in milliwatts.
    #[serde(default)]
    pub power_mw: Option<f64>,

    /// Voltage in millivolts.
    #[serde(default)]
    pub voltage_mv: Option<f64>,

    /// Accumulated energy in watt-hours.
    #[serde(default)]
    pub total_wh: Option<f64>,
}

/// Energy total of one month.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MonthEnergy {
    /// Calendar year.
    #[serde(default)]
    pub year: i32,

    /// Month, 1-12.
    pub month: u32,

    /// Energy in watt-hours.
    #[serde(alias = "energy_wh", default)]
    pub energy: Option<f64>,
}

/// Per-month energy totals for one year.
///
/// # Examples
///
/// ```
/// use plugsync::response::MonthStats;
///
/// let json = r#"{"month_list":[{"year":2026,"month":9,"energy":812},{"year":2026,"month":10,"energy":377}]}"#;
/// let stats: MonthStats = serde_json::from_str(json).unwrap();
/// assert_eq!(stats.energy_for(10), Some(377.0));
/// assert_eq!(stats.energy_for(11), None);
/// ```
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MonthStats {
    /// One entry per month with recorded energy.
    #[serde(default)]
    pub month_list: Vec<MonthEnergy>,
}

impl MonthStats {
    /// Returns the energy recorded for `month`, if the device reported it.
    #[must_use]
    pub fn energy_for(&self, month: u32) -> Option<f64> {
        self.month_list
            .iter()
            .find(|entry| entry.month == month)
            .and_then(|entry| entry.energy)
    }

    /// Returns true if the device reported an entry for `month`.
    #[must_use]
    pub fn has_month(&self, month: u32) -> bool {
        self.month_list.iter().any(|entry| entry.month == month)
    }
}
