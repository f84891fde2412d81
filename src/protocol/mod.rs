// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! The device client seam.
//!
//! `plugsync` does not speak the vendor protocol itself. A host plugs in a
//! [`DeviceClient`] that turns each call into one request to the device at
//! the given address and applies its own request timeout.
//!
//! Every method may fail with a [`DeviceError`]; callers treat any failure
//! as "device unreachable" and move on.

use std::future::Future;

use crate::error::DeviceError;
use crate::response::{DeviceSnapshot, LightState, MonthStats, RealtimeMetering};
use crate::types::{DeviceAddress, PowerState};

/// Client able to query and command a single device by address.
///
/// Implementations must be cheap to call concurrently for *different*
/// addresses; the poll scheduler never issues overlapping snapshot queries,
/// but provisioning may query several devices at once.
pub trait DeviceClient: Send + Sync {
    /// Reads the device's system information.
    ///
    /// # Errors
    ///
    /// Returns `DeviceError` if the device cannot be reached or answers
    /// with something unexpected.
    fn get_snapshot(
        &self,
        address: &DeviceAddress,
    ) -> impl Future<Output = Result<DeviceSnapshot, DeviceError>> + Send;

    /// Reads the instantaneous meter values.
    ///
    /// # Errors
    ///
    /// Returns `DeviceError` on transport or protocol failure.
    fn get_realtime_metering(
        &self,
        address: &DeviceAddress,
    ) -> impl Future<Output = Result<RealtimeMetering, DeviceError>> + Send;

    /// Reads per-month energy totals for `year`.
    ///
    /// # Errors
    ///
    /// Returns `DeviceError` on transport or protocol failure.
    fn get_month_stats(
        &self,
        address: &DeviceAddress,
        year: i32,
    ) -> impl Future<Output = Result<MonthStats, DeviceError>> + Send;

    /// Reads the light state of a bulb.
    ///
    /// # Errors
    ///
    /// Returns `DeviceError` on transport or protocol failure.
    fn get_light_state(
        &self,
        address: &DeviceAddress,
    ) -> impl Future<Output = Result<LightState, DeviceError>> + Send;

    /// Switches the relay.
    ///
    /// # Errors
    ///
    /// Returns `DeviceError` on transport or protocol failure.
    fn set_power(
        &self,
        address: &DeviceAddress,
        state: PowerState,
    ) -> impl Future<Output = Result<(), DeviceError>> + Send;
}
