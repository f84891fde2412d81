// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Payloads returned by a [`DeviceClient`](crate::protocol::DeviceClient).
//!
//! These structures mirror the JSON a plug reports and deserialise with
//! `serde`, so a client implementation can hand the device's payload
//! straight to `serde_json`.

mod energy;
mod light;
mod snapshot;

pub use energy::{MonthEnergy, MonthStats, RealtimeMetering};
pub use light::{DefaultOnState, LightState};
pub use snapshot::DeviceSnapshot;
