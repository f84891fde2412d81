// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! In-memory state store.

use std::collections::BTreeMap;

use parking_lot::RwLock;
use tokio::sync::broadcast;

use crate::error::StoreError;
use crate::types::{DeviceAddress, Field, FieldValue, ObjectId, StatePath};

use super::{
    ExposedObject, FieldMeta, FieldState, MetadataPatch, ObjectMeta, StateStore, WriteIntent,
};

/// Default channel capacity for write notifications.
const DEFAULT_CHANNEL_CAPACITY: usize = 256;

/// A [`StateStore`] that keeps everything in process memory.
///
/// Every write, confirmed or not, is broadcast to subscribers the way a
/// host store notifies state changes.
///
/// # Examples
///
/// ```
/// use plugsync::store::MemoryStore;
///
/// let store = MemoryStore::new("hs100.0");
/// assert!(store.object_ids().is_empty());
/// ```
#[derive(Debug)]
pub struct MemoryStore {
    namespace: String,
    objects: RwLock<BTreeMap<ObjectId, ExposedObject>>,
    sender: broadcast::Sender<WriteIntent>,
}

impl MemoryStore {
    /// Creates an empty store for `namespace`.
    #[must_use]
    pub fn new(namespace: impl Into<String>) -> Self {
        let (sender, _) = broadcast::channel(DEFAULT_CHANNEL_CAPACITY);
        Self {
            namespace: namespace.into(),
            objects: RwLock::new(BTreeMap::new()),
            sender,
        }
    }

    /// Inserts an object as-is, bypassing the creation path.
    ///
    /// Used to seed objects left behind by an earlier run.
    pub fn insert(&self, object: ExposedObject) {
        self.objects.write().insert(object.id.clone(), object);
    }

    /// Returns a copy of object `id`.
    #[must_use]
    pub fn get(&self, id: &ObjectId) -> Option<ExposedObject> {
        self.objects.read().get(id).cloned()
    }

    /// Returns the current value of a field.
    #[must_use]
    pub fn value(&self, id: &ObjectId, field: Field) -> Option<FieldValue> {
        self.objects
            .read()
            .get(id)
            .and_then(|object| object.value(field).cloned())
    }

    /// Returns all object identifiers in order.
    #[must_use]
    pub fn object_ids(&self) -> Vec<ObjectId> {
        self.objects.read().keys().cloned().collect()
    }

    /// Records an operator write and notifies subscribers with `ack == false`.
    ///
    /// # Errors
    ///
    /// Returns `StoreError::ObjectNotFound` if the field does not exist.
    pub fn request(&self, id: &ObjectId, field: Field, value: FieldValue) -> Result<(), StoreError> {
        self.store_value(id, field, value, false)
    }

    fn store_value(
        &self,
        id: &ObjectId,
        field: Field,
        value: FieldValue,
        ack: bool,
    ) -> Result<(), StoreError> {
        {
            let mut objects = self.objects.write();
            let state = objects
                .get_mut(id)
                .and_then(|object| object.fields.get_mut(&field))
                .ok_or_else(|| {
                    StoreError::ObjectNotFound(
                        StatePath::new(&self.namespace, id.clone(), field.id()).to_string(),
                    )
                })?;
            state.value = value.clone();
            state.ack = ack;
        }

        let path = StatePath::new(&self.namespace, id.clone(), field.id());
        // No subscribers is fine
        let _ = self.sender.send(WriteIntent {
            path: path.to_string(),
            value,
            ack,
        });
        Ok(())
    }
}

impl StateStore for MemoryStore {
    fn namespace(&self) -> &str {
        &self.namespace
    }

    async fn create_field(
        &self,
        id: &ObjectId,
        field: Field,
        object: &ObjectMeta,
        meta: FieldMeta,
        address: &DeviceAddress,
    ) -> Result<(), StoreError> {
        let mut objects = self.objects.write();
        let entry = objects.entry(id.clone()).or_insert_with(|| ExposedObject {
            id: id.clone(),
            address: Some(address.clone()),
            meta: object.clone(),
            fields: BTreeMap::new(),
        });
        let value = meta.default.clone();
        entry.fields.insert(
            field,
            FieldState {
                meta,
                value,
                ack: true,
            },
        );
        Ok(())
    }

    async fn list_objects(&self) -> Result<Vec<ExposedObject>, StoreError> {
        Ok(self.objects.read().values().cloned().collect())
    }

    async fn extend_object(&self, id: &ObjectId, patch: &MetadataPatch) -> Result<(), StoreError> {
        let mut objects = self.objects.write();
        let object = objects
            .get_mut(id)
            .ok_or_else(|| StoreError::ObjectNotFound(id.to_string()))?;
        object.meta.apply(patch);
        Ok(())
    }

    async fn delete_object(&self, id: &ObjectId) -> Result<(), StoreError> {
        self.objects
            .write()
            .remove(id)
            .map(|_| ())
            .ok_or_else(|| StoreError::ObjectNotFound(id.to_string()))
    }

    async fn write_value(
        &self,
        id: &ObjectId,
        field: Field,
        value: FieldValue,
        ack: bool,
    ) -> Result<(), StoreError> {
        self.store_value(id, field, value, ack)
    }

    fn subscribe(&self) -> broadcast::Receiver<WriteIntent> {
        self.sender.subscribe()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn seed(store: &MemoryStore, address: &str) -> ObjectId {
        let address = DeviceAddress::new(address);
        let id = address.object_id();
        futures::executor::block_on(store.create_field(
            &id,
            Field::State,
            &ObjectMeta::read_only("Plug"),
            FieldMeta::for_field(Field::State, FieldValue::Bool(false)),
            &address,
        ))
        .unwrap();
        id
    }

    #[test]
    fn create_records_address_once() {
        let store = MemoryStore::new("hs100.0");
        let id = seed(&store, "10.0.0.9");
        let object = store.get(&id).unwrap();
        assert_eq!(object.address, Some(DeviceAddress::new("10.0.0.9")));
        assert_eq!(object.value(Field::State), Some(&FieldValue::Bool(false)));
    }

    #[tokio::test]
    async fn writes_are_broadcast() {
        let store = MemoryStore::new("hs100.0");
        let id = seed(&store, "10.0.0.9");
        let mut rx = store.subscribe();

        store
            .write_value(&id, Field::State, FieldValue::Bool(true), true)
            .await
            .unwrap();

        let intent = rx.recv().await.unwrap();
        assert_eq!(intent.path, "hs100.0.10_0_0_9.state");
        assert!(intent.ack);
    }

    #[tokio::test]
    async fn operator_request_is_unacknowledged() {
        let store = MemoryStore::new("hs100.0");
        let id = seed(&store, "10.0.0.9");
        let mut rx = store.subscribe();

        store.request(&id, Field::State, FieldValue::Bool(true)).unwrap();

        let intent = rx.recv().await.unwrap();
        assert!(!intent.ack);
        assert_eq!(store.value(&id, Field::State), Some(FieldValue::Bool(true)));
    }

    #[tokio::test]
    async fn write_to_missing_field_fails() {
        let store = MemoryStore::new("hs100.0");
        let id = seed(&store, "10.0.0.9");
        let err = store
            .write_value(&id, Field::Power, FieldValue::from(1u32), true)
            .await
            .unwrap_err();
        assert_eq!(
            err,
            StoreError::ObjectNotFound("hs100.0.10_0_0_9.power".to_string())
        );
    }

    #[tokio::test]
    async fn delete_and_extend_unknown_objects() {
        let store = MemoryStore::new("hs100.0");
        let id = ObjectId::new("nope");
        assert!(store.delete_object(&id).await.is_err());
        assert!(
            store
                .extend_object(&id, &MetadataPatch::permissions())
                .await
                .is_err()
        );
    }
}
