// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Device capability classification.
//!
//! Plugs do not advertise their feature set directly, so the capability
//! class is derived from the reported model string using an explicit rule
//! table ([`MODEL_RULES`]). A rule matches when its pattern occurs in the
//! model string and the first occurrence starts at or after `min_offset`.
//!
//! | pattern | min offset | capability | matches            | does not match |
//! |---------|------------|------------|--------------------|----------------|
//! | `110`   | 2          | metering   | `HS110(EU)`        | `110X`         |
//! | `LB`    | 2          | lighting   | `XXLB130`          | `KLB130`       |
//!
//! The offsets reproduce the deployed behaviour of earlier releases and are
//! kept until reviewed against real model strings: a bulb reporting
//! `LB130(EU)` or `KLB130(EU)` is currently classified as a plain device.

use crate::response::DeviceSnapshot;

/// Feature flag a model rule grants.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Capability {
    /// Reports current, power, voltage and accumulated energy.
    Metering,
    /// Smart bulb; brightness is read when the device is dimmable.
    Lighting,
}

/// One entry of the model classification table.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ModelRule {
    /// Substring searched for in the model string.
    pub pattern: &'static str,
    /// Smallest byte offset at which the first occurrence may start.
    pub min_offset: usize,
    /// Capability granted on match.
    pub capability: Capability,
}

impl ModelRule {
    /// Returns true if `model` satisfies this rule.
    #[must_use]
    pub fn matches(&self, model: &str) -> bool {
        model
            .find(self.pattern)
            .is_some_and(|offset| offset >= self.min_offset)
    }
}

/// Classification rules, evaluated independently of each other.
pub const MODEL_RULES: &[ModelRule] = &[
    ModelRule {
        pattern: "110",
        min_offset: 2,
        capability: Capability::Metering,
    },
    ModelRule {
        pattern: "LB",
        min_offset: 2,
        capability: Capability::Lighting,
    },
];

/// Capabilities of a plug or bulb.
///
/// # Examples
///
/// ```
/// use plugsync::Capabilities;
///
/// let caps = Capabilities::from_model("HS110(EU)");
/// assert!(caps.metering);
/// assert!(!caps.lighting);
///
/// assert_eq!(Capabilities::from_model("HS100(EU)"), Capabilities::basic());
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Capabilities {
    /// Device reports electrical readings.
    pub metering: bool,

    /// Device is a smart bulb.
    pub lighting: bool,
}

impl Capabilities {
    /// Capabilities of a plain switching plug.
    #[must_use]
    pub const fn basic() -> Self {
        Self {
            metering: false,
            lighting: false,
        }
    }

    /// Capabilities of an energy-metering plug.
    #[must_use]
    pub const fn metering_plug() -> Self {
        Self {
            metering: true,
            lighting: false,
        }
    }

    /// Classifies a model string using [`MODEL_RULES`].
    #[must_use]
    pub fn from_model(model: &str) -> Self {
        let mut caps = Self::basic();
        for rule in MODEL_RULES.iter().filter(|rule| rule.matches(model)) {
            match rule.capability {
                Capability::Metering => caps.metering = true,
                Capability::Lighting => caps.lighting = true,
            }
        }
        caps
    }

    /// Classifies the model reported in a snapshot.
    #[must_use]
    pub fn from_snapshot(snapshot: &DeviceSnapshot) -> Self {
        Self::from_model(&snapshot.model)
    }

    /// Returns true if the brightness of this device should be read.
    #[must_use]
    pub fn reads_brightness(&self, snapshot: &DeviceSnapshot) -> bool {
        self.lighting && snapshot.is_dimmable()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn metering_models() {
        assert!(Capabilities::from_model("HS110(EU)").metering);
        assert!(Capabilities::from_model("HS110(US)").metering);
        assert!(Capabilities::from_model("KP110(UK)").metering);
    }

    #[test]
    fn plain_plugs() {
        assert_eq!(Capabilities::from_model("HS100(EU)"), Capabilities::basic());
        assert_eq!(Capabilities::from_model("HS105(US)"), Capabilities::basic());
        assert_eq!(Capabilities::from_model(""), Capabilities::basic());
    }

    #[test]
    fn pattern_at_start_is_excluded() {
        // first occurrence decides, even if a later one would qualify
        assert!(!Capabilities::from_model("110HS110").metering);
        assert!(!Capabilities::from_model("LB130(EU)").lighting);
    }

    #[test]
    fn lighting_needs_offset() {
        assert!(!Capabilities::from_model("KLB130").lighting);
        assert!(Capabilities::from_model("XXLB100").lighting);
    }

    #[test]
    fn rules_are_independent() {
        let caps = Capabilities::from_model("ABLB110");
        assert!(caps.metering);
        assert!(caps.lighting);
    }

    #[test]
    fn rule_matches_exact_offset() {
        let rule = MODEL_RULES[0];
        assert!(!rule.matches("H110"));
        assert!(rule.matches("HS110"));
    }
}
