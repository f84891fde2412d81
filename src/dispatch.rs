// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Forwarding operator power requests to devices.
//!
//! The dispatcher never writes the `state` field itself. The next poll
//! reads the relay back and records the value the device actually took.

use std::collections::HashMap;
use std::sync::Arc;

use tokio::sync::broadcast;
use tokio::sync::broadcast::error::RecvError;
use tokio_util::sync::CancellationToken;

use crate::config::AdapterConfig;
use crate::error::{DeviceError, Error};
use crate::protocol::DeviceClient;
use crate::store::WriteIntent;
use crate::types::{DeviceAddress, Field, ObjectId, PowerState, StatePath};

/// What the dispatcher did with a write intent.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Dispatch {
    /// A power command was sent.
    Sent {
        /// Target device.
        address: DeviceAddress,
        /// Requested state.
        state: PowerState,
    },
    /// The intent was not an operator power request.
    Ignored,
}

/// Turns unacknowledged writes of the `state` field into device commands.
#[derive(Debug)]
pub struct CommandDispatcher<C> {
    client: Arc<C>,
    namespace: String,
    addresses: HashMap<ObjectId, DeviceAddress>,
}

impl<C: DeviceClient> CommandDispatcher<C> {
    /// Creates a dispatcher for the devices of `config`.
    #[must_use]
    pub fn new(client: Arc<C>, namespace: impl Into<String>, config: &AdapterConfig) -> Self {
        Self {
            client,
            namespace: namespace.into(),
            addresses: config.address_book(),
        }
    }

    /// Resolves the device address behind an object identifier.
    #[must_use]
    pub fn resolve(&self, id: &ObjectId) -> Option<&DeviceAddress> {
        self.addresses.get(id)
    }

    /// Handles one write intent.
    ///
    /// Confirmations (`ack == true`), other fields, other namespaces and
    /// non-boolean values are ignored.
    ///
    /// # Errors
    ///
    /// Returns `Error::Device` if the device rejects the command.
    pub async fn handle(&self, intent: &WriteIntent) -> Result<Dispatch, Error> {
        if intent.ack {
            return Ok(Dispatch::Ignored);
        }
        let Some(path) = StatePath::parse(&intent.path) else {
            return Ok(Dispatch::Ignored);
        };
        if path.namespace != self.namespace || path.field != Field::State.id() {
            return Ok(Dispatch::Ignored);
        }

        let Some(address) = self.resolve(&path.object) else {
            tracing::warn!(path = %intent.path, "Power request for unknown device");
            return Ok(Dispatch::Ignored);
        };
        let Some(requested) = intent.value.as_bool() else {
            tracing::warn!(path = %intent.path, value = %intent.value, "Power request is not a boolean");
            return Ok(Dispatch::Ignored);
        };

        let state = PowerState::from(requested);
        tracing::debug!(%address, %state, "Forwarding power request");
        self.client
            .set_power(address, state)
            .await
            .map_err(Error::Device)?;

        Ok(Dispatch::Sent {
            address: address.clone(),
            state,
        })
    }

    /// Consumes write intents until cancelled or the channel closes.
    ///
    /// Subscribe with
    /// [`StateStore::subscribe`](crate::store::StateStore::subscribe)
    /// before spawning so no request is missed. Device failures are logged; the loop keeps going.
    pub async fn run(
        self,
        mut intents: broadcast::Receiver<WriteIntent>,
        cancel: CancellationToken,
    ) {
        loop {
            let intent = tokio::select! {
                biased;
                () = cancel.cancelled() => break,
                intent = intents.recv() => intent,
            };

            match intent {
                Ok(intent) => {
                    if let Err(e) = self.handle(&intent).await {
                        log_failure(&intent, &e);
                    }
                }
                Err(RecvError::Lagged(skipped)) => {
                    tracing::warn!(skipped, "Command dispatcher lagged, requests dropped");
                }
                Err(RecvError::Closed) => break,
            }
        }
        tracing::debug!("Command dispatcher stopped");
    }
}

fn log_failure(intent: &WriteIntent, error: &Error) {
    match error {
        Error::Device(DeviceError::Unreachable { .. } | DeviceError::Timeout(_)) => {
            tracing::warn!(path = %intent.path, %error, "Device unreachable, power request lost");
        }
        _ => tracing::warn!(path = %intent.path, %error, "Power request failed"),
    }
}
