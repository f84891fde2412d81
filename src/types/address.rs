// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Device addresses and the object identifiers derived from them.
//!
//! # Identifier layout
//!
//! Every device is exposed as one object whose identifier is derived from the
//! configured network address: each maximal run of `.` or whitespace
//! characters is replaced by a single `_`.
//!
//! | address           | object id        |
//! |-------------------|------------------|
//! | `192.168.1.5`     | `192_168_1_5`    |
//! | `plug.local`      | `plug_local`     |
//! | `10.0.0.9`        | `10_0_0_9`       |
//!
//! Individual values live below the object as `<namespace>.<object>.<field>`,
//! for example `hs100.0.192_168_1_5.state`.
//!
//! The mapping is not injective (`10.0.0.1` and `10 0 0 1` collide), so the
//! raw address is persisted next to each object and configurations whose
//! addresses collide are rejected by
//! [`AdapterConfig::validate`](crate::config::AdapterConfig::validate).

use std::fmt;

use serde::{Deserialize, Serialize};

/// Network address of a device, as configured.
///
/// # Examples
///
/// ```
/// use plugsync::types::DeviceAddress;
///
/// let addr = DeviceAddress::new("192.168.1.5");
/// assert_eq!(addr.object_id().as_str(), "192_168_1_5");
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct DeviceAddress(String);

impl DeviceAddress {
    /// Creates an address from its textual form.
    #[must_use]
    pub fn new(address: impl Into<String>) -> Self {
        Self(address.into())
    }

    /// Returns the address as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Returns the object identifier this address is exposed under.
    #[must_use]
    pub fn object_id(&self) -> ObjectId {
        ObjectId::from(self)
    }
}

impl fmt::Display for DeviceAddress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for DeviceAddress {
    fn from(value: &str) -> Self {
        Self::new(value)
    }
}

/// Identifier of an exposed device object, relative to the adapter namespace.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ObjectId(String);

impl ObjectId {
    /// Wraps an already normalised identifier.
    #[must_use]
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Returns the identifier as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<&DeviceAddress> for ObjectId {
    fn from(address: &DeviceAddress) -> Self {
        let mut id = String::with_capacity(address.0.len());
        let mut in_separator = false;
        for c in address.0.chars() {
            if c == '.' || c.is_whitespace() {
                if !in_separator {
                    id.push('_');
                }
                in_separator = true;
            } else {
                id.push(c);
                in_separator = false;
            }
        }
        Self(id)
    }
}

impl fmt::Display for ObjectId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Fully qualified path of a single value: `<namespace>.<object>.<field>`.
///
/// # Examples
///
/// ```
/// use plugsync::types::StatePath;
///
/// let path = StatePath::parse("hs100.0.192_168_1_5.state").unwrap();
/// assert_eq!(path.namespace, "hs100.0");
/// assert_eq!(path.object.as_str(), "192_168_1_5");
/// assert_eq!(path.field, "state");
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct StatePath {
    /// Adapter namespace, may itself contain dots.
    pub namespace: String,
    /// Object the value belongs to.
    pub object: ObjectId,
    /// Field id within the object.
    pub field: String,
}

impl StatePath {
    /// Builds a path from its parts.
    #[must_use]
    pub fn new(namespace: impl Into<String>, object: ObjectId, field: impl Into<String>) -> Self {
        Self {
            namespace: namespace.into(),
            object,
            field: field.into(),
        }
    }

    /// Splits a path at its last two dots.
    ///
    /// A path with a single dot has an empty namespace. Returns `None` when
    /// there is no dot at all or the object or field segment is empty.
    #[must_use]
    pub fn parse(path: &str) -> Option<Self> {
        let (rest, field) = path.rsplit_once('.')?;
        let (namespace, object) = rest.rsplit_once('.').unwrap_or(("", rest));
        if object.is_empty() || field.is_empty() {
            return None;
        }
        Some(Self::new(namespace, ObjectId::new(object), field))
    }
}

impl fmt::Display for StatePath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.namespace.is_empty() {
            write!(f, "{}.{}", self.object, self.field)
        } else {
            write!(f, "{}.{}.{}", self.namespace, self.object, self.field)
        }
    }
}
