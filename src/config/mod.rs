// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Adapter configuration.
//!
//! The host supplies the configuration as a JSON document:
//!
//! ```json
//! {
//!     "devices": [ { "ip": "192.168.1.5", "name": "Lamp", "active": true } ],
//!     "interval": "60000",
//!     "mode": "daemon"
//! }
//! ```
//!
//! `interval` may be a number or a numeric string; it is coerced to an
//! integer and raised to at least [`PollInterval::MIN_MILLIS`].

mod adapter_config;
mod device_config;

pub use adapter_config::{AdapterConfig, PollInterval, RunMode};
pub use device_config::{DeviceConfig, MIN_ADDRESS_LEN};
