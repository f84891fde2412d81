// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Edit-script planning.
//!
//! Planning is a pure function of the configuration and the objects the
//! store currently lists, so it can be inspected and tested without any
//! I/O.

use crate::config::AdapterConfig;
use crate::store::{ExposedObject, MetadataPatch};
use crate::types::{DeviceAddress, ObjectId};

/// A pending edit of an existing object.
///
/// Tasks are applied strictly one at a time, in order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReconcileTask {
    /// Merge new metadata into an object.
    Extend {
        /// Object to edit.
        id: ObjectId,
        /// Metadata to merge.
        patch: MetadataPatch,
    },
    /// Remove an object and all of its fields.
    Delete {
        /// Object to remove.
        id: ObjectId,
    },
}

impl ReconcileTask {
    /// Returns the object this task edits.
    #[must_use]
    pub fn id(&self) -> &ObjectId {
        match self {
            Self::Extend { id, .. } | Self::Delete { id } => id,
        }
    }

    /// Returns a short name for logging.
    #[must_use]
    pub const fn kind(&self) -> &'static str {
        match self {
            Self::Extend { .. } => "extend",
            Self::Delete { .. } => "delete",
        }
    }
}

/// A device that has no object yet.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CreateTask {
    /// Address to provision.
    pub address: DeviceAddress,
    /// Display name of the new object.
    pub name: String,
}

impl CreateTask {
    /// Returns the identifier the object will be created under.
    #[must_use]
    pub fn id(&self) -> ObjectId {
        self.address.object_id()
    }
}

/// Everything needed to bring the store in line with the configuration.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EditScript {
    /// Edits of existing objects, applied first and sequentially.
    pub tasks: Vec<ReconcileTask>,
    /// Objects to create once all edits are done.
    pub creates: Vec<CreateTask>,
}

impl EditScript {
    /// Returns true if nothing needs to change.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.tasks.is_empty() && self.creates.is_empty()
    }

    /// Returns the number of delete tasks.
    #[must_use]
    pub fn delete_count(&self) -> usize {
        self.tasks
            .iter()
            .filter(|t| matches!(t, ReconcileTask::Delete { .. }))
            .count()
    }

    /// Returns the number of extend tasks.
    #[must_use]
    pub fn extend_count(&self) -> usize {
        self.tasks.len() - self.delete_count()
    }
}

/// Computes the edit script for `config` against the `existing` objects.
///
/// - Objects whose recorded address is no longer configured (or no longer
///   active) are deleted.
/// - Objects whose address is still wanted are kept; they are renamed when
///   the configured display name changed, or upgraded when they lack
///   boolean read/write permissions.
/// - Only an object under the canonical identifier of its address counts
///   as provisioned. Objects filed under any other identifier are deleted,
///   and the address is created again under its canonical identifier.
/// - Objects without a recorded address are left alone.
/// - Wanted addresses with no object are returned as creates, in
///   configuration order.
#[must_use]
pub fn plan(config: &AdapterConfig, existing: &[ExposedObject]) -> EditScript {
    let mut desired = config.pollable_addresses();
    let mut script = EditScript::default();

    for object in existing {
        let Some(address) = &object.address else {
            tracing::warn!(id = %object.id, "Object has no recorded address, leaving it untouched");
            continue;
        };

        // pollers and the dispatcher only address canonical identifiers
        if address.object_id() != object.id {
            tracing::debug!(id = %object.id, %address, "Object is not under its canonical id, replacing it");
            script.tasks.push(ReconcileTask::Delete {
                id: object.id.clone(),
            });
            continue;
        }

        let Some(pos) = desired.iter().position(|a| a == address) else {
            script.tasks.push(ReconcileTask::Delete {
                id: object.id.clone(),
            });
            continue;
        };
        desired.remove(pos);

        let Some(device) = config.device(address) else {
            continue;
        };
        if object.meta.name != device.display_name() {
            script.tasks.push(ReconcileTask::Extend {
                id: object.id.clone(),
                patch: MetadataPatch::rename(device.display_name()),
            });
        } else if !object.meta.has_permissions() {
            script.tasks.push(ReconcileTask::Extend {
                id: object.id.clone(),
                patch: MetadataPatch::permissions(),
            });
        }
    }

    script.creates = desired
        .into_iter()
        .map(|address| {
            let name = config
                .device(&address)
                .map_or_else(|| address.to_string(), |d| d.display_name().to_string());
            CreateTask { address, name }
        })
        .collect();

    script
}

#[cfg(test)]
mod tests {
    use std::collections::BTreeMap;

    use super::*;
    use crate::config::DeviceConfig;
    use crate::store::ObjectMeta;

    fn object(address: &str, name: &str) -> ExposedObject {
        let address = DeviceAddress::new(address);
        ExposedObject {
            id: address.object_id(),
            address: Some(address),
            meta: ObjectMeta::read_only(name),
            fields: BTreeMap::new(),
        }
    }

    #[test]
    fn new_device_becomes_create() {
        let config = AdapterConfig::new(vec![
            DeviceConfig::new("192.168.1.5").with_name("Lamp").active(true),
        ]);
        let script = plan(&config, &[]);

        assert!(script.tasks.is_empty());
        assert_eq!(script.creates.len(), 1);
        assert_eq!(script.creates[0].id().as_str(), "192_168_1_5");
        assert_eq!(script.creates[0].name, "Lamp");
    }

    #[test]
    fn rename_yields_single_extend() {
        let config =
            AdapterConfig::new(vec![DeviceConfig::new("10.0.0.9").with_name("New").active(true)]);
        let script = plan(&config, &[object("10.0.0.9", "Old")]);

        assert_eq!(
            script.tasks,
            vec![ReconcileTask::Extend {
                id: ObjectId::new("10_0_0_9"),
                patch: MetadataPatch::rename("New"),
            }]
        );
        assert!(script.creates.is_empty());
    }

    #[test]
    fn name_comes_from_the_active_entry() {
        let config = AdapterConfig::new(vec![
            DeviceConfig::new("10.0.0.9").with_name("Retired").active(false),
            DeviceConfig::new("10.0.0.9").with_name("Desk").active(true),
        ]);
        let script = plan(&config, &[object("10.0.0.9", "Desk")]);

        assert!(script.tasks.is_empty());
        assert!(script.creates.is_empty());

        let script = plan(&config, &[]);
        assert_eq!(script.creates[0].name, "Desk");
    }

    #[test]
    fn removed_device_becomes_delete() {
        let config = AdapterConfig::new(vec![DeviceConfig::new("10.0.0.3").active(true)]);
        let script = plan(
            &config,
            &[object("10.0.0.2", "10.0.0.2"), object("10.0.0.3", "10.0.0.3")],
        );

        assert_eq!(
            script.tasks,
            vec![ReconcileTask::Delete {
                id: ObjectId::new("10_0_0_2"),
            }]
        );
        assert!(script.creates.is_empty());
    }

    #[test]
    fn deactivated_device_is_deleted() {
        let config = AdapterConfig::new(vec![DeviceConfig::new("10.0.0.2").active(false)]);
        let script = plan(&config, &[object("10.0.0.2", "10.0.0.2")]);
        assert_eq!(script.delete_count(), 1);
    }

    #[test]
    fn legacy_permissions_are_upgraded() {
        let config = AdapterConfig::new(vec![DeviceConfig::new("10.0.0.9").active(true)]);
        let mut legacy = object("10.0.0.9", "10.0.0.9");
        legacy.meta.read = None;
        legacy.meta.write = None;

        let script = plan(&config, &[legacy]);
        assert_eq!(
            script.tasks,
            vec![ReconcileTask::Extend {
                id: ObjectId::new("10_0_0_9"),
                patch: MetadataPatch::permissions(),
            }]
        );
    }

    #[test]
    fn object_without_address_is_ignored() {
        let config = AdapterConfig::new(vec![DeviceConfig::new("10.0.0.9").active(true)]);
        let mut orphan = object("10.0.0.9", "x");
        orphan.address = None;

        let script = plan(&config, &[orphan]);
        assert!(script.tasks.is_empty());
        assert_eq!(script.creates.len(), 1);
    }

    #[test]
    fn duplicate_legacy_object_is_deleted() {
        let config = AdapterConfig::new(vec![DeviceConfig::new("10.0.0.9").active(true)]);
        let mut legacy = object("10.0.0.9", "10.0.0.9");
        legacy.id = ObjectId::new("10-0-0-9");

        let script = plan(&config, &[legacy, object("10.0.0.9", "10.0.0.9")]);
        assert_eq!(
            script.tasks,
            vec![ReconcileTask::Delete {
                id: ObjectId::new("10-0-0-9"),
            }]
        );
    }

    #[test]
    fn legacy_id_is_replaced_by_canonical_create() {
        let config = AdapterConfig::new(vec![
            DeviceConfig::new("192.168.1.5").with_name("Lamp").active(true),
        ]);
        let mut legacy = object("192.168.1.5", "Lamp");
        legacy.id = ObjectId::new("lamp");

        let script = plan(&config, &[legacy]);
        assert_eq!(
            script.tasks,
            vec![ReconcileTask::Delete {
                id: ObjectId::new("lamp"),
            }]
        );
        assert_eq!(script.creates.len(), 1);
        assert_eq!(script.creates[0].id().as_str(), "192_168_1_5");
    }

    #[test]
    fn unchanged_configuration_is_noop() {
        let config = AdapterConfig::new(vec![
            DeviceConfig::new("10.0.0.9").with_name("Heater").active(true),
        ]);
        let script = plan(&config, &[object("10.0.0.9", "Heater")]);
        assert!(script.is_empty());
    }

    #[test]
    fn short_addresses_are_never_provisioned() {
        let config = AdapterConfig::new(vec![DeviceConfig::new("1.2.3").active(true)]);
        assert!(plan(&config, &[]).is_empty());
    }
}
