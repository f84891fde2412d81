// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Configuration reconciliation.
//!
//! The [`Reconciler`] aligns the exposed objects with the configured device
//! list in three phases:
//!
//! 1. **Plan**: list the store and compute an [`EditScript`] with [`plan`].
//! 2. **Edit**: apply extend and delete tasks one at a time. Each task waits
//!    at most [`ReconcileOptions::ack_timeout`] for the store; a task that is
//!    not acknowledged in time is retried, never dropped.
//! 3. **Create**: query each new device for its model and create the
//!    matching field set. Creates for different devices run concurrently,
//!    bounded by [`ReconcileOptions::create_concurrency`]. An unreachable
//!    device gets no object; it is provisioned by a later reconciliation.
//!
//! # Examples
//!
//! ```no_run
//! # use std::sync::Arc;
//! # use plugsync::config::AdapterConfig;
//! # use plugsync::protocol::DeviceClient;
//! # use plugsync::reconcile::{Reconciler, ReconcileOptions};
//! # use plugsync::store::MemoryStore;
//! # async fn example(client: Arc<impl DeviceClient>, config: AdapterConfig) -> plugsync::Result<()> {
//! let store = Arc::new(MemoryStore::new("hs100.0"));
//! let reconciler = Reconciler::new(client, store, ReconcileOptions::default());
//!
//! let report = reconciler.reconcile(&config).await?;
//! println!("created {} objects", report.created);
//! # Ok(())
//! # }
//! ```

mod plan;
mod provision;

use std::sync::Arc;
use std::time::Duration;

use futures::StreamExt;
use tokio_util::sync::CancellationToken;

use crate::config::AdapterConfig;
use crate::error::{Error, StoreError};
use crate::protocol::DeviceClient;
use crate::store::{ObjectMeta, StateStore};

pub use plan::{CreateTask, EditScript, ReconcileTask, plan};
pub(crate) use provision::text_or_undefined;

/// Tunables of the reconciler.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReconcileOptions {
    /// How long a single edit may go unacknowledged before it is retried.
    pub ack_timeout: Duration,
    /// Maximum number of devices provisioned at the same time.
    pub create_concurrency: usize,
}

impl ReconcileOptions {
    /// Sets the acknowledgement bound for edits.
    #[must_use]
    pub fn with_ack_timeout(mut self, timeout: Duration) -> Self {
        self.ack_timeout = timeout;
        self
    }

    /// Sets the provisioning concurrency; at least one.
    #[must_use]
    pub fn with_create_concurrency(mut self, limit: usize) -> Self {
        self.create_concurrency = limit.max(1);
        self
    }
}

impl Default for ReconcileOptions {
    fn default() -> Self {
        Self {
            ack_timeout: Duration::from_secs(1),
            create_concurrency: 4,
        }
    }
}

/// Summary of one reconciliation.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ReconcileReport {
    /// Objects whose metadata was extended.
    pub extended: usize,
    /// Objects deleted.
    pub deleted: usize,
    /// Objects created.
    pub created: usize,
    /// Creates skipped because the device did not answer.
    pub unreachable: usize,
    /// Edits or creates the store rejected.
    pub failed: usize,
    /// Edit attempts repeated after an acknowledgement timeout.
    pub retries: usize,
}

impl ReconcileReport {
    /// Returns true if nothing was attempted.
    #[must_use]
    pub fn is_noop(&self) -> bool {
        *self == Self::default()
    }
}

enum TaskOutcome {
    Applied,
    Rejected,
}

enum CreateOutcome {
    Created,
    Unreachable,
    Failed,
    Skipped,
}

/// Applies edit scripts through a [`StateStore`].
#[derive(Debug)]
pub struct Reconciler<C, S> {
    client: Arc<C>,
    store: Arc<S>,
    options: ReconcileOptions,
    cancel: CancellationToken,
}

impl<C: DeviceClient, S: StateStore> Reconciler<C, S> {
    /// Creates a reconciler.
    #[must_use]
    pub fn new(client: Arc<C>, store: Arc<S>, options: ReconcileOptions) -> Self {
        Self {
            client,
            store,
            options,
            cancel: CancellationToken::new(),
        }
    }

    /// Uses `cancel` as the stop signal.
    ///
    /// Once cancelled, no further edit or create is started and pending
    /// retries are abandoned.
    #[must_use]
    pub fn with_cancellation(mut self, cancel: CancellationToken) -> Self {
        self.cancel = cancel;
        self
    }

    /// Lists the store and computes the edit script for `config`.
    ///
    /// # Errors
    ///
    /// Returns `Error::Store` if the store cannot be listed.
    pub async fn plan(&self, config: &AdapterConfig) -> Result<EditScript, Error> {
        let existing = self.store.list_objects().await?;
        Ok(plan(config, &existing))
    }

    /// Brings the store in line with `config`.
    ///
    /// # Errors
    ///
    /// Returns `Error::Store` if the store cannot be listed and
    /// `Error::Stopped` if cancelled before completion. Per-object failures
    /// are counted in the report instead.
    pub async fn reconcile(&self, config: &AdapterConfig) -> Result<ReconcileReport, Error> {
        let script = self.plan(config).await?;
        tracing::debug!(
            extends = script.extend_count(),
            deletes = script.delete_count(),
            creates = script.creates.len(),
            "Planned reconciliation"
        );

        let mut report = ReconcileReport::default();
        for task in &script.tasks {
            match self.apply_task(task, &mut report).await? {
                TaskOutcome::Applied => match task {
                    ReconcileTask::Extend { .. } => report.extended += 1,
                    ReconcileTask::Delete { .. } => report.deleted += 1,
                },
                TaskOutcome::Rejected => report.failed += 1,
            }
        }

        let outcomes: Vec<CreateOutcome> = futures::stream::iter(&script.creates)
            .map(|create| self.provision(create))
            .buffer_unordered(self.options.create_concurrency.max(1))
            .collect()
            .await;

        if self.cancel.is_cancelled() {
            return Err(Error::Stopped);
        }

        for outcome in outcomes {
            match outcome {
                CreateOutcome::Created => report.created += 1,
                CreateOutcome::Unreachable => report.unreachable += 1,
                CreateOutcome::Failed => report.failed += 1,
                CreateOutcome::Skipped => {}
            }
        }

        tracing::info!(
            created = report.created,
            extended = report.extended,
            deleted = report.deleted,
            unreachable = report.unreachable,
            failed = report.failed,
            "Reconciliation complete"
        );
        Ok(report)
    }

    /// Runs [`reconcile`](Self::reconcile) and hands the result to
    /// `on_complete`, which is called exactly once.
    pub async fn reconcile_with<F>(&self, config: &AdapterConfig, on_complete: F)
    where
        F: FnOnce(Result<ReconcileReport, Error>),
    {
        on_complete(self.reconcile(config).await);
    }

    async fn apply_task(
        &self,
        task: &ReconcileTask,
        report: &mut ReconcileReport,
    ) -> Result<TaskOutcome, Error> {
        let bound = self.options.ack_timeout;
        loop {
            let result = tokio::select! {
                biased;
                () = self.cancel.cancelled() => return Err(Error::Stopped),
                result = tokio::time::timeout(bound, self.execute(task)) => result,
            };

            match result {
                Ok(Ok(())) => {
                    tracing::debug!(id = %task.id(), kind = task.kind(), "Applied edit");
                    return Ok(TaskOutcome::Applied);
                }
                Ok(Err(StoreError::ObjectNotFound(_))) if matches!(task, ReconcileTask::Delete { .. }) => {
                    tracing::debug!(id = %task.id(), "Object already gone");
                    return Ok(TaskOutcome::Applied);
                }
                Ok(Err(e)) => {
                    tracing::warn!(id = %task.id(), kind = task.kind(), error = %e, "Store rejected edit");
                    return Ok(TaskOutcome::Rejected);
                }
                Err(_) => {
                    report.retries += 1;
                    tracing::warn!(
                        id = %task.id(),
                        kind = task.kind(),
                        timeout_ms = u64::try_from(bound.as_millis()).unwrap_or(u64::MAX),
                        "Host did not acknowledge edit in time, retrying; consider upgrading the host"
                    );
                }
            }
        }
    }

    async fn execute(&self, task: &ReconcileTask) -> Result<(), StoreError> {
        match task {
            ReconcileTask::Extend { id, patch } => self.store.extend_object(id, patch).await,
            ReconcileTask::Delete { id } => self.store.delete_object(id).await,
        }
    }

    async fn provision(&self, create: &CreateTask) -> CreateOutcome {
        if self.cancel.is_cancelled() {
            return CreateOutcome::Skipped;
        }

        let result = tokio::select! {
            biased;
            () = self.cancel.cancelled() => return CreateOutcome::Skipped,
            result = self.client.get_snapshot(&create.address) => result,
        };
        let snapshot = match result {
            Ok(snapshot) => snapshot,
            Err(e) => {
                tracing::warn!(address = %create.address, error = %e, "Device unreachable, not provisioning");
                return CreateOutcome::Unreachable;
            }
        };

        let id = create.id();
        let object = ObjectMeta::read_only(&create.name);
        let mut outcome = CreateOutcome::Created;
        for (field, meta) in provision::initial_fields(&snapshot) {
            if let Err(e) = self
                .store
                .create_field(&id, field, &object, meta, &create.address)
                .await
            {
                tracing::warn!(%id, %field, error = %e, "Failed to create field");
                outcome = CreateOutcome::Failed;
            }
        }

        tracing::debug!(%id, model = %snapshot.model, "Provisioned device");
        outcome
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_options() {
        let options = ReconcileOptions::default();
        assert_eq!(options.ack_timeout, Duration::from_millis(1000));
        assert_eq!(options.create_concurrency, 4);
    }

    #[test]
    fn concurrency_is_at_least_one() {
        let options = ReconcileOptions::default().with_create_concurrency(0);
        assert_eq!(options.create_concurrency, 1);
    }

    #[test]
    fn empty_report_is_noop() {
        assert!(ReconcileReport::default().is_noop());
        let report = ReconcileReport {
            retries: 1,
            ..ReconcileReport::default()
        };
        assert!(!report.is_noop());
    }
}
