// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Sequential device polling.
//!
//! The [`PollScheduler`] walks the active devices one at a time. A device
//! poll (snapshot plus any metering or brightness sub-queries) always
//! completes before the next device is queried, so at most one device is
//! busy and at most one poll-driven write is in flight.
//!
//! ```text
//!            ┌──────── remaining non-empty: poll one ───────┐
//!            v                                              │
//!   Idle ──> Polling ── remaining empty ──> WaitingForNextCycle
//!                ^                                │
//!                └──── interval elapsed, reseed ──┘
//! ```
//!
//! A cancelled [`CancellationToken`] moves the scheduler to `Stopped` from
//! any state; the inter-cycle wait is abandoned immediately.

mod refresh;

use std::collections::VecDeque;
use std::sync::Arc;

use tokio_util::sync::CancellationToken;

use crate::config::{AdapterConfig, PollInterval};
use crate::error::DeviceError;
use crate::protocol::DeviceClient;
use crate::store::StateStore;
use crate::types::DeviceAddress;

pub use refresh::{DeviceRefresh, format_last_update};

/// Scheduler state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SchedulerState {
    /// Constructed, no step taken yet.
    Idle,
    /// Working through the current cycle.
    Polling,
    /// Cycle finished, waiting for the interval to elapse.
    WaitingForNextCycle,
    /// Stop acknowledged; no further writes happen.
    Stopped,
}

/// What a single [`PollScheduler::step`] did.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Step {
    /// One device was polled.
    Polled {
        /// The device.
        address: DeviceAddress,
        /// Refresh result; an error means the device was skipped.
        result: Result<DeviceRefresh, DeviceError>,
    },
    /// The cycle is exhausted; the next step waits.
    CycleComplete,
    /// The interval elapsed and the address list was reseeded.
    CycleStarted {
        /// Number of devices in the new cycle.
        devices: usize,
    },
    /// The scheduler is stopped.
    Stopped,
}

/// Polls devices one at a time and writes their state to the store.
#[derive(Debug)]
pub struct PollScheduler<C, S> {
    client: Arc<C>,
    store: Arc<S>,
    addresses: Vec<DeviceAddress>,
    interval: PollInterval,
    remaining: VecDeque<DeviceAddress>,
    state: SchedulerState,
    cycles: u64,
    cancel: CancellationToken,
}

impl<C: DeviceClient, S: StateStore> PollScheduler<C, S> {
    /// Creates a scheduler for the pollable devices of `config`.
    #[must_use]
    pub fn new(client: Arc<C>, store: Arc<S>, config: &AdapterConfig) -> Self {
        let addresses = config.pollable_addresses();
        Self {
            client,
            store,
            remaining: addresses.iter().cloned().collect(),
            addresses,
            interval: config.interval,
            state: SchedulerState::Idle,
            cycles: 0,
            cancel: CancellationToken::new(),
        }
    }

    /// Uses `cancel` as the stop signal.
    #[must_use]
    pub fn with_cancellation(mut self, cancel: CancellationToken) -> Self {
        self.cancel = cancel;
        self
    }

    /// Returns the current state.
    #[must_use]
    pub fn state(&self) -> SchedulerState {
        self.state
    }

    /// Returns the number of completed cycles.
    #[must_use]
    pub fn cycles(&self) -> u64 {
        self.cycles
    }

    /// Returns the devices not yet polled in the current cycle.
    #[must_use]
    pub fn remaining(&self) -> impl ExactSizeIterator<Item = &DeviceAddress> {
        self.remaining.iter()
    }

    /// Returns a token that stops this scheduler when cancelled.
    #[must_use]
    pub fn stop_token(&self) -> CancellationToken {
        self.cancel.clone()
    }

    /// Performs one transition of the state machine.
    pub async fn step(&mut self) -> Step {
        if self.cancel.is_cancelled() {
            return self.stop();
        }

        match self.state {
            SchedulerState::Stopped => Step::Stopped,
            SchedulerState::Idle | SchedulerState::Polling => {
                let Some(address) = self.remaining.pop_front() else {
                    self.state = SchedulerState::WaitingForNextCycle;
                    self.cycles += 1;
                    return Step::CycleComplete;
                };
                self.state = SchedulerState::Polling;

                let result = tokio::select! {
                    biased;
                    () = self.cancel.cancelled() => None,
                    result = refresh::refresh_device(&*self.client, &*self.store, &address) => Some(result),
                };
                let Some(result) = result else {
                    return self.stop();
                };
                if let Err(e) = &result {
                    tracing::debug!(%address, error = %e, "Device not reachable, skipping");
                }
                Step::Polled { address, result }
            }
            SchedulerState::WaitingForNextCycle => {
                let cancelled = tokio::select! {
                    biased;
                    () = self.cancel.cancelled() => true,
                    () = tokio::time::sleep(self.interval.as_duration()) => false,
                };
                if cancelled {
                    return self.stop();
                }
                self.remaining = self.addresses.iter().cloned().collect();
                self.state = SchedulerState::Polling;
                Step::CycleStarted {
                    devices: self.remaining.len(),
                }
            }
        }
    }

    /// Runs until cancelled.
    pub async fn run(mut self) {
        tracing::info!(
            devices = self.addresses.len(),
            interval = %self.interval,
            "Starting poll scheduler"
        );
        if self.addresses.is_empty() {
            tracing::info!("No active devices, waiting for configuration");
        }

        while self.step().await != Step::Stopped {}

        tracing::info!(cycles = self.cycles, "Poll scheduler stopped");
    }

    fn stop(&mut self) -> Step {
        self.state = SchedulerState::Stopped;
        self.remaining.clear();
        Step::Stopped
    }
}
