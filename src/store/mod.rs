// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! The host state store seam.
//!
//! The store keeps one [`ExposedObject`] per device and a set of typed
//! fields below it. Objects are created and deleted only by the
//! [`Reconciler`](crate::reconcile::Reconciler); field values are written by
//! the [`PollScheduler`](crate::poll::PollScheduler). Operators write the
//! `state` field, which the store reports as an unacknowledged
//! [`WriteIntent`].
//!
//! [`MemoryStore`] is a complete in-process implementation, suitable for
//! tests and for hosts without durable storage.

mod memory;

use std::collections::BTreeMap;
use std::future::Future;

use serde::{Deserialize, Serialize};
use tokio::sync::broadcast;

use crate::error::StoreError;
use crate::types::{DeviceAddress, Field, FieldValue, ObjectId, ValueKind};

pub use memory::MemoryStore;

/// Object-level metadata.
///
/// `read`/`write` are `None` on objects created before permissions were
/// recorded as booleans; the reconciler upgrades those.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ObjectMeta {
    /// Display name.
    pub name: String,
    /// Readable flag.
    pub read: Option<bool>,
    /// Writable flag.
    pub write: Option<bool>,
}

impl ObjectMeta {
    /// Metadata for a read-only telemetry mirror.
    #[must_use]
    pub fn read_only(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            read: Some(true),
            write: Some(false),
        }
    }

    /// Returns true if both permissions are recorded.
    #[must_use]
    pub fn has_permissions(&self) -> bool {
        self.read.is_some() && self.write.is_some()
    }

    /// Applies a partial update.
    pub fn apply(&mut self, patch: &MetadataPatch) {
        if let Some(name) = &patch.name {
            self.name.clone_from(name);
        }
        if let Some(read) = patch.read {
            self.read = Some(read);
        }
        if let Some(write) = patch.write {
            self.write = Some(write);
        }
    }
}

/// Partial object metadata; `None` leaves the current value untouched.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MetadataPatch {
    /// New display name.
    pub name: Option<String>,
    /// New readable flag.
    pub read: Option<bool>,
    /// New writable flag.
    pub write: Option<bool>,
}

impl MetadataPatch {
    /// Patch that only records the read-only permission convention.
    #[must_use]
    pub fn permissions() -> Self {
        Self {
            name: None,
            read: Some(true),
            write: Some(false),
        }
    }

    /// Patch that renames the object and records permissions.
    #[must_use]
    pub fn rename(name: impl Into<String>) -> Self {
        Self {
            name: Some(name.into()),
            ..Self::permissions()
        }
    }
}

/// Field-level metadata declared at creation time.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FieldMeta {
    /// Declared value kind.
    pub kind: ValueKind,
    /// Store role.
    pub role: String,
    /// Human readable description.
    pub description: String,
    /// Initial value.
    pub default: FieldValue,
    /// Readable flag.
    pub read: bool,
    /// Writable flag.
    pub write: bool,
}

impl FieldMeta {
    /// Builds the metadata of `field` with the given initial value.
    #[must_use]
    pub fn for_field(field: Field, default: FieldValue) -> Self {
        Self {
            kind: field.kind(),
            role: field.role().to_string(),
            description: field.description().to_string(),
            default,
            read: true,
            write: field.is_writable(),
        }
    }
}

/// A field together with its current value.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FieldState {
    /// Declared metadata.
    pub meta: FieldMeta,
    /// Current value.
    pub value: FieldValue,
    /// True if the value was confirmed by the device.
    pub ack: bool,
}

/// One exposed device object, as listed by the store.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExposedObject {
    /// Identifier relative to the namespace.
    pub id: ObjectId,
    /// Address recorded at creation. Missing on objects the store cannot
    /// attribute to a device.
    pub address: Option<DeviceAddress>,
    /// Object metadata.
    pub meta: ObjectMeta,
    /// Fields by kind.
    pub fields: BTreeMap<Field, FieldState>,
}

impl ExposedObject {
    /// Returns the current value of `field`.
    #[must_use]
    pub fn value(&self, field: Field) -> Option<&FieldValue> {
        self.fields.get(&field).map(|state| &state.value)
    }

    /// Returns true if the object carries `field`.
    #[must_use]
    pub fn has_field(&self, field: Field) -> bool {
        self.fields.contains_key(&field)
    }
}

/// A write to a field, as observed by subscribers.
///
/// Writes issued by this crate carry `ack == true`; operator requests carry
/// `ack == false`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WriteIntent {
    /// Fully qualified state path, `<namespace>.<object>.<field>`.
    pub path: String,
    /// Requested value.
    pub value: FieldValue,
    /// Whether the value is a device confirmation.
    pub ack: bool,
}

/// Durable store of exposed device objects.
pub trait StateStore: Send + Sync {
    /// Namespace all objects live in, e.g. `hs100.0`.
    fn namespace(&self) -> &str;

    /// Creates `field` below object `id`, creating the object on first use.
    ///
    /// `object` and `address` are recorded only when the object is new.
    ///
    /// # Errors
    ///
    /// Returns `StoreError` if the store rejects the creation.
    fn create_field(
        &self,
        id: &ObjectId,
        field: Field,
        object: &ObjectMeta,
        meta: FieldMeta,
        address: &DeviceAddress,
    ) -> impl Future<Output = Result<(), StoreError>> + Send;

    /// Lists every object in the namespace.
    ///
    /// # Errors
    ///
    /// Returns `StoreError` if the store cannot be read.
    fn list_objects(&self) -> impl Future<Output = Result<Vec<ExposedObject>, StoreError>> + Send;

    /// Merges `patch` into the metadata of object `id`.
    ///
    /// # Errors
    ///
    /// Returns `StoreError::ObjectNotFound` for an unknown object.
    fn extend_object(
        &self,
        id: &ObjectId,
        patch: &MetadataPatch,
    ) -> impl Future<Output = Result<(), StoreError>> + Send;

    /// Deletes object `id` and all of its fields.
    ///
    /// # Errors
    ///
    /// Returns `StoreError` if the store rejects the deletion.
    fn delete_object(&self, id: &ObjectId) -> impl Future<Output = Result<(), StoreError>> + Send;

    /// Writes a field value.
    ///
    /// # Errors
    ///
    /// Returns `StoreError` if the object or field does not exist.
    fn write_value(
        &self,
        id: &ObjectId,
        field: Field,
        value: FieldValue,
        ack: bool,
    ) -> impl Future<Output = Result<(), StoreError>> + Send;

    /// Subscribes to writes on all managed fields.
    fn subscribe(&self) -> broadcast::Receiver<WriteIntent>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn patch_application() {
        let mut meta = ObjectMeta {
            name: "Old".to_string(),
            read: None,
            write: None,
        };
        assert!(!meta.has_permissions());

        meta.apply(&MetadataPatch::permissions());
        assert_eq!(meta.name, "Old");
        assert!(meta.has_permissions());

        meta.apply(&MetadataPatch::rename("New"));
        assert_eq!(meta, ObjectMeta::read_only("New"));
    }

    #[test]
    fn state_field_meta_is_writable() {
        let meta = FieldMeta::for_field(Field::State, FieldValue::Bool(false));
        assert!(meta.write);
        assert_eq!(meta.role, "switch");
        assert_eq!(meta.kind, ValueKind::Boolean);
    }
}
