// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Initial field values for a newly provisioned device.

use crate::capabilities::Capabilities;
use crate::response::DeviceSnapshot;
use crate::store::FieldMeta;
use crate::types::{Field, FieldValue};

/// Placeholder for string values the device did not report.
pub(crate) const UNDEFINED: &str = "undefined";

/// Returns the string or [`UNDEFINED`].
pub(crate) fn text_or_undefined(value: Option<&str>) -> FieldValue {
    FieldValue::from(value.filter(|s| !s.is_empty()).unwrap_or(UNDEFINED))
}

/// Returns every field the device should carry, with its initial metadata.
pub(crate) fn initial_fields(snapshot: &DeviceSnapshot) -> Vec<(Field, FieldMeta)> {
    let capabilities = Capabilities::from_snapshot(snapshot);
    Field::set_for(capabilities)
        .into_iter()
        .map(|field| (field, FieldMeta::for_field(field, initial_value(field, snapshot))))
        .collect()
}

fn initial_value(field: Field, snapshot: &DeviceSnapshot) -> FieldValue {
    match field {
        Field::LastUpdate => FieldValue::from("-1"),
        Field::State => FieldValue::Bool(snapshot.power_state().is_on()),
        Field::Mac => text_or_undefined(snapshot.mac.as_deref()),
        Field::SoftwareVersion => text_or_undefined(snapshot.software_version.as_deref()),
        Field::HardwareVersion => text_or_undefined(snapshot.hardware_version.as_deref()),
        Field::Model => text_or_undefined(Some(snapshot.model.as_str())),
        Field::Current | Field::Power | Field::Voltage | Field::TotalNow | Field::TotalMonthNow => {
            FieldValue::Number(0.0)
        }
        Field::Brightness => FieldValue::Number(100.0),
    }
}
