// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Value types shared by the reconciler, the poll scheduler and the store.
//!
//! # Types
//!
//! - [`DeviceAddress`] - Configured network address of a device
//! - [`ObjectId`] - Normalised identifier the device is exposed under
//! - [`StatePath`] - Fully qualified `<namespace>.<object>.<field>` path
//! - [`Field`] - One of the fixed fields of a device object
//! - [`FieldValue`] - Scalar stored in a field
//! - [`PowerState`] - Relay on/off

mod address;
mod field;
mod power;
mod value;

pub use address::{DeviceAddress, ObjectId, StatePath};
pub use field::{Field, UnknownField, ValueKind};
pub use power::PowerState;
pub use value::FieldValue;
