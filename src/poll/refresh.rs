// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Refreshing the fields of one device.

use chrono::{DateTime, Datelike, Local};

use crate::capabilities::Capabilities;
use crate::error::{DeviceError, StoreError};
use crate::protocol::DeviceClient;
use crate::reconcile::text_or_undefined;
use crate::response::DeviceSnapshot;
use crate::store::StateStore;
use crate::types::{DeviceAddress, Field, FieldValue, ObjectId};

/// Result of a successful device refresh.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeviceRefresh {
    /// Capabilities derived from the reported model.
    pub capabilities: Capabilities,
    /// Sub-queries or writes that failed; the rest was still recorded.
    pub partial_failures: usize,
}

/// Formats a timestamp as `YYYY.M.D HH:MM:SS`.
#[must_use]
pub fn format_last_update(now: &DateTime<Local>) -> String {
    now.format("%Y.%-m.%-d %H:%M:%S").to_string()
}

/// Queries one device and writes everything it reports.
///
/// The snapshot query decides the outcome: if it fails nothing is written.
/// Metering and brightness sub-queries are best effort; each failure is
/// logged and counted, never propagated.
pub(crate) async fn refresh_device<C, S>(
    client: &C,
    store: &S,
    address: &DeviceAddress,
) -> Result<DeviceRefresh, DeviceError>
where
    C: DeviceClient,
    S: StateStore,
{
    let snapshot = client.get_snapshot(address).await?;
    let now = Local::now();
    let id = address.object_id();
    let writer = Writer { store, id: &id };
    let mut failures = 0;

    failures += writer.base(&snapshot, &now).await;

    let capabilities = Capabilities::from_snapshot(&snapshot);
    tracing::debug!(
        %address,
        state = %snapshot.power_state(),
        model = %snapshot.model,
        "Refreshed device"
    );

    if capabilities.metering {
        let (realtime, monthly) = tokio::join!(
            refresh_realtime(client, &writer, address),
            refresh_month(client, &writer, address, &now),
        );
        failures += realtime + monthly;
    }

    if capabilities.reads_brightness(&snapshot) {
        failures += refresh_brightness(client, &writer, address).await;
    }

    Ok(DeviceRefresh {
        capabilities,
        partial_failures: failures,
    })
}

async fn refresh_realtime<C: DeviceClient, S: StateStore>(
    client: &C,
    writer: &Writer<'_, S>,
    address: &DeviceAddress,
) -> usize {
    match client.get_realtime_metering(address).await {
        Ok(reading) => {
            let number = |v: Option<f64>| FieldValue::Number(v.unwrap_or(0.0));
            let mut failures = 0;
            failures += writer.write(Field::Current, number(reading.current_ma)).await;
            failures += writer.write(Field::Power, number(reading.power_mw)).await;
            failures += writer.write(Field::Voltage, number(reading.voltage_mv)).await;
            failures += writer.write(Field::TotalNow, number(reading.total_wh)).await;
            failures
        }
        Err(e) => {
            tracing::debug!(%address, error = %e, "Realtime metering query failed");
            1
        }
    }
}

async fn refresh_month<C: DeviceClient, S: StateStore>(
    client: &C,
    writer: &Writer<'_, S>,
    address: &DeviceAddress,
    now: &DateTime<Local>,
) -> usize {
    match client.get_month_stats(address, now.year()).await {
        Ok(stats) if stats.has_month(now.month()) => {
            let energy = stats.energy_for(now.month()).unwrap_or(0.0);
            writer
                .write(Field::TotalMonthNow, FieldValue::Number(energy))
                .await
        }
        Ok(_) => 0,
        Err(e) => {
            tracing::debug!(%address, error = %e, "Monthly energy query failed");
            1
        }
    }
}

async fn refresh_brightness<C: DeviceClient, S: StateStore>(
    client: &C,
    writer: &Writer<'_, S>,
    address: &DeviceAddress,
) -> usize {
    match client.get_light_state(address).await {
        Ok(light) => match light.brightness() {
            Some(level) => {
                writer
                    .write(Field::Brightness, FieldValue::from(u32::from(level)))
                    .await
            }
            None => 0,
        },
        Err(e) => {
            tracing::debug!(%address, error = %e, "Light state query failed");
            1
        }
    }
}

/// Writes confirmed values below one object.
struct Writer<'a, S> {
    store: &'a S,
    id: &'a ObjectId,
}

impl<S: StateStore> Writer<'_, S> {
    async fn base(&self, snapshot: &DeviceSnapshot, now: &DateTime<Local>) -> usize {
        let values = [
            (
                Field::SoftwareVersion,
                text_or_undefined(snapshot.software_version.as_deref()),
            ),
            (
                Field::HardwareVersion,
                text_or_undefined(snapshot.hardware_version.as_deref()),
            ),
            (Field::Model, text_or_undefined(Some(snapshot.model.as_str()))),
            (Field::Mac, text_or_undefined(snapshot.mac.as_deref())),
            (Field::State, FieldValue::Bool(snapshot.power_state().is_on())),
            (Field::LastUpdate, FieldValue::from(format_last_update(now))),
        ];

        let mut failures = 0;
        for (field, value) in values {
            failures += self.write(field, value).await;
        }
        failures
    }

    /// Returns 1 on failure so callers can sum.
    async fn write(&self, field: Field, value: FieldValue) -> usize {
        match self.store.write_value(self.id, field, value, true).await {
            Ok(()) => 0,
            Err(StoreError::ObjectNotFound(path)) => {
                tracing::debug!(%path, "Not provisioned yet, value dropped");
                1
            }
            Err(e) => {
                tracing::warn!(id = %self.id, %field, error = %e, "Failed to write value");
                1
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use chrono::TimeZone;

    use super::*;

    #[test]
    fn last_update_format() {
        let at = Local.with_ymd_and_hms(2026, 3, 7, 9, 5, 2).unwrap();
        assert_eq!(format_last_update(&at), "2026.3.7 09:05:02");
    }

    #[test]
    fn last_update_two_digit_fields() {
        let at = Local.with_ymd_and_hms(2026, 11, 23, 17, 45, 59).unwrap();
        assert_eq!(format_last_update(&at), "2026.11.23 17:45:59");
    }
}
