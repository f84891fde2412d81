// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Service lifecycle.
//!
//! A [`Service`] ties the pieces together: it validates the configuration,
//! reconciles the store once, then runs the [`PollScheduler`] and the
//! [`CommandDispatcher`] as background tasks until stopped.
//!
//! # Examples
//!
//! ```no_run
//! # use std::sync::Arc;
//! # use plugsync::config::AdapterConfig;
//! # use plugsync::protocol::DeviceClient;
//! # use plugsync::service::Service;
//! # use plugsync::store::MemoryStore;
//! # async fn example(client: Arc<impl DeviceClient + 'static>) -> plugsync::Result<()> {
//! let config = AdapterConfig::from_json_str(
//!     r#"{"devices":[{"ip":"192.168.1.5","name":"Lamp","active":true}],"interval":30000}"#,
//! )?;
//! let store = Arc::new(MemoryStore::new("hs100.0"));
//!
//! let mut service = Service::new(client, store, config);
//! service.start().await?;
//! // ... until the host unloads the adapter
//! service.shutdown().await;
//! # Ok(())
//! # }
//! ```

use std::sync::Arc;
use std::time::Duration;

use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;

use crate::config::{AdapterConfig, RunMode};
use crate::dispatch::CommandDispatcher;
use crate::error::{ConfigError, Error};
use crate::poll::PollScheduler;
use crate::protocol::DeviceClient;
use crate::reconcile::{ReconcileOptions, ReconcileReport, Reconciler};
use crate::store::StateStore;

/// Delay between a stop request and the actual stop in schedule mode.
pub const GRACE_PERIOD: Duration = Duration::from_secs(30);

/// Outcome of [`Service::start`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ServiceStatus {
    /// The store was reconciled and polling is running.
    Running(ReconcileReport),
    /// No devices are configured; nothing runs.
    Quiescent,
}

/// Owns the background tasks of one adapter instance.
#[derive(Debug)]
pub struct Service<C, S> {
    client: Arc<C>,
    store: Arc<S>,
    config: AdapterConfig,
    options: ReconcileOptions,
    cancel: CancellationToken,
    tasks: Vec<JoinHandle<()>>,
    pending_stop: Option<JoinHandle<()>>,
}

impl<C, S> Service<C, S>
where
    C: DeviceClient + 'static,
    S: StateStore + 'static,
{
    /// Creates a stopped service.
    #[must_use]
    pub fn new(client: Arc<C>, store: Arc<S>, config: AdapterConfig) -> Self {
        Self {
            client,
            store,
            config,
            options: ReconcileOptions::default(),
            cancel: CancellationToken::new(),
            tasks: Vec::new(),
            pending_stop: None,
        }
    }

    /// Overrides the reconciler tunables.
    #[must_use]
    pub fn with_reconcile_options(mut self, options: ReconcileOptions) -> Self {
        self.options = options;
        self
    }

    /// Returns the configuration this service runs.
    #[must_use]
    pub fn config(&self) -> &AdapterConfig {
        &self.config
    }

    /// Returns a token that is cancelled once the service stops.
    #[must_use]
    pub fn stop_token(&self) -> CancellationToken {
        self.cancel.clone()
    }

    /// Returns true once a stop took effect.
    #[must_use]
    pub fn is_stopped(&self) -> bool {
        self.cancel.is_cancelled()
    }

    /// Reconciles the store and starts polling and command dispatch.
    ///
    /// With no devices configured the service goes quiescent; in schedule
    /// mode it additionally requests its own stop.
    ///
    /// # Errors
    ///
    /// Returns `Error::AlreadyStarted` if the service is running,
    /// `Error::Config` for an unusable configuration, `Error::Store` if the
    /// store cannot be listed and `Error::Stopped` if a stop arrived before
    /// or while reconciling.
    pub async fn start(&mut self) -> Result<ServiceStatus, Error> {
        if !self.tasks.is_empty() {
            return Err(Error::AlreadyStarted);
        }
        if self.cancel.is_cancelled() {
            return Err(Error::Stopped);
        }

        match self.config.validate() {
            Ok(()) => {}
            Err(ConfigError::NoDevices) => {
                tracing::info!("No devices configured");
                if self.config.mode == RunMode::Schedule {
                    self.request_stop();
                }
                return Ok(ServiceStatus::Quiescent);
            }
            Err(e) => return Err(e.into()),
        }

        let report = Reconciler::new(
            Arc::clone(&self.client),
            Arc::clone(&self.store),
            self.options.clone(),
        )
        .with_cancellation(self.cancel.child_token())
        .reconcile(&self.config)
        .await?;

        let intents = self.store.subscribe();
        let dispatcher = CommandDispatcher::new(
            Arc::clone(&self.client),
            self.store.namespace(),
            &self.config,
        );
        self.tasks
            .push(tokio::spawn(dispatcher.run(intents, self.cancel.child_token())));

        let scheduler = PollScheduler::new(
            Arc::clone(&self.client),
            Arc::clone(&self.store),
            &self.config,
        )
        .with_cancellation(self.cancel.child_token());
        self.tasks.push(tokio::spawn(scheduler.run()));

        tracing::info!(mode = ?self.config.mode, "Service started");
        Ok(ServiceStatus::Running(report))
    }

    /// Stops the service the way its run mode asks for.
    ///
    /// In schedule mode the stop takes effect after [`GRACE_PERIOD`]; a
    /// daemon stops immediately. Repeated requests keep the first deadline.
    pub fn request_stop(&mut self) {
        match self.config.mode {
            RunMode::Daemon => self.cancel.cancel(),
            RunMode::Schedule => {
                if self.pending_stop.is_some() || self.cancel.is_cancelled() {
                    return;
                }
                tracing::debug!(grace_secs = GRACE_PERIOD.as_secs(), "Stop scheduled");
                let cancel = self.cancel.clone();
                self.pending_stop = Some(tokio::spawn(async move {
                    tokio::select! {
                        () = cancel.cancelled() => {}
                        () = tokio::time::sleep(GRACE_PERIOD) => cancel.cancel(),
                    }
                }));
            }
        }
    }

    /// Resolves once the service has stopped.
    pub async fn stopped(&self) {
        self.cancel.cancelled().await;
    }

    /// Stops immediately and waits for the background tasks to finish.
    pub async fn shutdown(mut self) {
        self.cancel.cancel();
        if let Some(pending) = self.pending_stop.take() {
            pending.abort();
        }
        for task in self.tasks.drain(..) {
            if let Err(e) = task.await {
                tracing::warn!(error = %e, "Background task ended abnormally");
            }
        }
        tracing::info!("Service stopped");
    }
}
