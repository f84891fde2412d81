// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Error types for `plugsync`.
//!
//! Failures fall into three families: talking to a device, talking to the
//! host's state store, and interpreting the configuration. Device and store
//! failures are contained by the reconciler and the poll scheduler; they are
//! logged and never abort a cycle.

use thiserror::Error;

/// The main error type for this library.
#[derive(Debug, Error)]
pub enum Error {
    /// A device could not be queried or commanded.
    #[error("device error: {0}")]
    Device(#[from] DeviceError),

    /// The state store rejected or did not acknowledge an operation.
    #[error("store error: {0}")]
    Store(#[from] StoreError),

    /// The configuration cannot be used.
    #[error("configuration error: {0}")]
    Config(#[from] ConfigError),

    /// The operation was abandoned because a stop was requested.
    #[error("stopped")]
    Stopped,

    /// The service is already running.
    #[error("service already started")]
    AlreadyStarted,
}

/// Errors raised by a [`DeviceClient`](crate::protocol::DeviceClient).
///
/// Every variant is treated as "device unreachable": the affected device is
/// skipped for the current step and retried on the next one.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum DeviceError {
    /// The device did not answer or refused the connection.
    #[error("device {address} unreachable: {message}")]
    Unreachable {
        /// Address that was queried.
        address: String,
        /// Transport-level description.
        message: String,
    },

    /// The device did not answer within the client's own timeout.
    #[error("device request timed out after {0} ms")]
    Timeout(u64),

    /// The device answered with a protocol-level error.
    #[error("protocol error: {0}")]
    Protocol(String),

    /// The device answered with a payload we could not interpret.
    #[error("unexpected response: {0}")]
    UnexpectedResponse(String),
}

/// Errors raised by a [`StateStore`](crate::store::StateStore).
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum StoreError {
    /// No object exists with the given identifier.
    #[error("object not found: {0}")]
    ObjectNotFound(String),

    /// The store refused the operation.
    #[error("operation rejected: {0}")]
    Rejected(String),

    /// The store did not acknowledge an edit within the bound.
    #[error("no acknowledgement within {0} ms")]
    AckTimeout(u64),
}

/// Errors related to the adapter configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// No device is configured at all.
    #[error("no devices configured")]
    NoDevices,

    /// Two configured addresses map to the same object identifier.
    #[error("addresses {first} and {second} both normalise to object id {id}")]
    IdentifierCollision {
        /// First configured address.
        first: String,
        /// Second configured address.
        second: String,
        /// Shared object identifier.
        id: String,
    },

    /// The poll interval is not an integer.
    #[error("invalid poll interval: {0}")]
    InvalidInterval(String),

    /// The configuration document could not be parsed.
    #[error("JSON parse error: {0}")]
    Json(#[from] serde_json::Error),
}

/// A specialized Result type for this library.
pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn device_error_display() {
        let err = DeviceError::Unreachable {
            address: "10.0.0.9".to_string(),
            message: "connection refused".to_string(),
        };
        assert_eq!(
            err.to_string(),
            "device 10.0.0.9 unreachable: connection refused"
        );
    }

    #[test]
    fn error_from_store_error() {
        let err: Error = StoreError::AckTimeout(1000).into();
        assert!(matches!(err, Error::Store(StoreError::AckTimeout(1000))));
    }

    #[test]
    fn lifecycle_display() {
        assert_eq!(Error::Stopped.to_string(), "stopped");
        assert_eq!(Error::AlreadyStarted.to_string(), "service already started");
    }

    #[test]
    fn collision_display() {
        let err = ConfigError::IdentifierCollision {
            first: "10.0.0.1".to_string(),
            second: "10 0 0 1".to_string(),
            id: "10_0_0_1".to_string(),
        };
        assert_eq!(
            err.to_string(),
            "addresses 10.0.0.1 and 10 0 0 1 both normalise to object id 10_0_0_1"
        );
    }
}
