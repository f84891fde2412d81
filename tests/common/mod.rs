// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Test doubles shared by the integration tests.

#![allow(dead_code)]

use std::collections::{BTreeMap, HashMap};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use chrono::Datelike;
use parking_lot::Mutex;
use plugsync::error::{DeviceError, StoreError};
use plugsync::response::{DeviceSnapshot, LightState, MonthEnergy, MonthStats, RealtimeMetering};
use plugsync::store::{
    ExposedObject, FieldMeta, MemoryStore, MetadataPatch, ObjectMeta, StateStore, WriteIntent,
};
use plugsync::types::{DeviceAddress, Field, FieldValue, ObjectId, PowerState};
use plugsync::{AdapterConfig, DeviceClient, DeviceConfig};
use tokio::sync::broadcast;

// ============================================================================
// Configuration helpers
// ============================================================================

/// Builds a config of active devices `(address, name)` with a 5 s interval.
pub fn config(devices: &[(&str, &str)]) -> AdapterConfig {
    AdapterConfig::new(
        devices
            .iter()
            .map(|(address, name)| DeviceConfig::new(*address).with_name(*name).active(true))
            .collect(),
    )
    .with_interval_millis(5000)
}

pub fn id(address: &str) -> ObjectId {
    DeviceAddress::new(address).object_id()
}

/// An object left behind by an earlier run.
pub fn existing_object(id: &str, address: &str, name: &str) -> ExposedObject {
    ExposedObject {
        id: ObjectId::new(id),
        address: Some(DeviceAddress::new(address)),
        meta: ObjectMeta::read_only(name),
        fields: BTreeMap::new(),
    }
}

// ============================================================================
// Scripted device client
// ============================================================================

/// What one simulated device answers.
#[derive(Debug, Clone)]
pub struct DeviceScript {
    pub snapshot: DeviceSnapshot,
    pub reachable: bool,
    pub realtime: Option<RealtimeMetering>,
    pub months: Option<MonthStats>,
    pub light: Option<LightState>,
}

impl DeviceScript {
    /// A reachable device reporting `model`, switched off.
    pub fn device(model: &str) -> Self {
        Self {
            snapshot: DeviceSnapshot::new(model)
                .with_power(PowerState::Off)
                .with_mac("50:C7:BF:00:00:01")
                .with_versions("1.5.4", "2.0"),
            reachable: true,
            realtime: None,
            months: None,
            light: None,
        }
    }

    /// A metering plug with working meter queries.
    pub fn metering_plug() -> Self {
        Self::device("HS110(EU)")
            .with_realtime(RealtimeMetering {
                current_ma: Some(120.0),
                power_mw: Some(23_500.0),
                voltage_mv: Some(230_400.0),
                total_wh: Some(1_234.0),
            })
            .with_month_energy(377.0)
    }

    pub fn with_power(mut self, state: PowerState) -> Self {
        self.snapshot = self.snapshot.with_power(state);
        self
    }

    pub fn with_realtime(mut self, reading: RealtimeMetering) -> Self {
        self.realtime = Some(reading);
        self
    }

    /// Reports `energy` for the current month of the current year.
    pub fn with_month_energy(mut self, energy: f64) -> Self {
        let now = chrono::Local::now();
        self.months = Some(MonthStats {
            month_list: vec![MonthEnergy {
                year: now.year(),
                month: now.month(),
                energy: Some(energy),
            }],
        });
        self
    }

    pub fn with_light(mut self, light: LightState) -> Self {
        self.light = Some(light);
        self
    }

    pub fn unreachable(mut self) -> Self {
        self.reachable = false;
        self
    }
}

#[derive(Debug, Default)]
struct ClientLog {
    calls: Vec<(DeviceAddress, &'static str)>,
    busy: HashMap<DeviceAddress, usize>,
    max_busy_devices: usize,
    commands: Vec<(DeviceAddress, PowerState)>,
}

/// A [`DeviceClient`] answering from per-address scripts.
///
/// Every query sleeps for `latency` so overlapping queries can be observed;
/// the number of devices with a query in flight is tracked.
#[derive(Debug, Default)]
pub struct ScriptedClient {
    devices: Mutex<HashMap<DeviceAddress, DeviceScript>>,
    log: Mutex<ClientLog>,
    latency: Duration,
}

impl ScriptedClient {
    pub fn new() -> Self {
        Self {
            latency: Duration::from_millis(50),
            ..Self::default()
        }
    }

    pub fn with_latency(mut self, latency: Duration) -> Self {
        self.latency = latency;
        self
    }

    pub fn with_device(self, address: &str, script: DeviceScript) -> Self {
        self.set(address, script);
        self
    }

    pub fn set(&self, address: &str, script: DeviceScript) {
        self.devices.lock().insert(DeviceAddress::new(address), script);
    }

    pub fn set_reachable(&self, address: &str, reachable: bool) {
        if let Some(script) = self.devices.lock().get_mut(&DeviceAddress::new(address)) {
            script.reachable = reachable;
        }
    }

    /// Every query issued so far, in order.
    pub fn calls(&self) -> Vec<(DeviceAddress, &'static str)> {
        self.log.lock().calls.clone()
    }

    /// Addresses of snapshot queries, in order.
    pub fn snapshot_order(&self) -> Vec<String> {
        self.calls()
            .into_iter()
            .filter(|(_, op)| *op == "snapshot")
            .map(|(address, _)| address.to_string())
            .collect()
    }

    pub fn calls_of(&self, op: &str) -> usize {
        self.log.lock().calls.iter().filter(|(_, o)| *o == op).count()
    }

    /// Highest number of distinct devices that had a query in flight at once.
    pub fn max_busy_devices(&self) -> usize {
        self.log.lock().max_busy_devices
    }

    pub fn commands(&self) -> Vec<(DeviceAddress, PowerState)> {
        self.log.lock().commands.clone()
    }

    /// Forgets recorded calls and concurrency.
    pub fn clear_log(&self) {
        let mut log = self.log.lock();
        log.calls.clear();
        log.max_busy_devices = 0;
    }

    fn enter(&self, address: &DeviceAddress, op: &'static str) -> InFlight<'_> {
        let mut log = self.log.lock();
        log.calls.push((address.clone(), op));
        *log.busy.entry(address.clone()).or_default() += 1;
        let busy = log.busy.values().filter(|n| **n > 0).count();
        log.max_busy_devices = log.max_busy_devices.max(busy);
        InFlight {
            client: self,
            address: address.clone(),
        }
    }

    async fn answer<T>(
        &self,
        address: &DeviceAddress,
        op: &'static str,
        read: impl FnOnce(&DeviceScript) -> Option<T>,
    ) -> Result<T, DeviceError> {
        let _in_flight = self.enter(address, op);
        tokio::time::sleep(self.latency).await;

        let devices = self.devices.lock();
        match devices.get(address) {
            Some(script) if script.reachable => read(script)
                .ok_or_else(|| DeviceError::Protocol(format!("{op} not supported"))),
            _ => Err(DeviceError::Unreachable {
                address: address.to_string(),
                message: "connection refused".to_string(),
            }),
        }
    }
}

struct InFlight<'a> {
    client: &'a ScriptedClient,
    address: DeviceAddress,
}

impl Drop for InFlight<'_> {
    fn drop(&mut self) {
        let mut log = self.client.log.lock();
        if let Some(count) = log.busy.get_mut(&self.address) {
            *count = count.saturating_sub(1);
        }
    }
}

impl DeviceClient for ScriptedClient {
    async fn get_snapshot(&self, address: &DeviceAddress) -> Result<DeviceSnapshot, DeviceError> {
        self.answer(address, "snapshot", |s| Some(s.snapshot.clone()))
            .await
    }

    async fn get_realtime_metering(
        &self,
        address: &DeviceAddress,
    ) -> Result<RealtimeMetering, DeviceError> {
        self.answer(address, "realtime", |s| s.realtime.clone()).await
    }

    async fn get_month_stats(
        &self,
        address: &DeviceAddress,
        _year: i32,
    ) -> Result<MonthStats, DeviceError> {
        self.answer(address, "months", |s| s.months.clone()).await
    }

    async fn get_light_state(&self, address: &DeviceAddress) -> Result<LightState, DeviceError> {
        self.answer(address, "light", |s| s.light.clone()).await
    }

    async fn set_power(&self, address: &DeviceAddress, state: PowerState) -> Result<(), DeviceError> {
        self.answer(address, "set_power", |_| Some(())).await?;
        if let Some(script) = self.devices.lock().get_mut(address) {
            script.snapshot = script.snapshot.clone().with_power(state);
        }
        self.log.lock().commands.push((address.clone(), state));
        Ok(())
    }
}

// ============================================================================
// Recording store
// ============================================================================

/// A [`MemoryStore`] wrapper that records object edits and can withhold
/// acknowledgements.
#[derive(Debug)]
pub struct RecordingStore {
    pub inner: MemoryStore,
    withheld: AtomicUsize,
    ops: Mutex<Vec<String>>,
}

impl RecordingStore {
    pub fn new(namespace: &str) -> Self {
        Self {
            inner: MemoryStore::new(namespace),
            withheld: AtomicUsize::new(0),
            ops: Mutex::new(Vec::new()),
        }
    }

    /// The next `count` extend or delete calls never complete.
    pub fn withhold_acks(&self, count: usize) {
        self.withheld.store(count, Ordering::SeqCst);
    }

    /// Object-level operations in the order they were issued, e.g.
    /// `delete:10_0_0_2` or `create:192_168_1_5`.
    pub fn ops(&self) -> Vec<String> {
        self.ops.lock().clone()
    }

    fn record(&self, op: String) {
        self.ops.lock().push(op);
    }

    async fn maybe_withhold(&self) {
        let withhold = self
            .withheld
            .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |n| n.checked_sub(1))
            .is_ok();
        if withhold {
            std::future::pending::<()>().await;
        }
    }
}

impl StateStore for RecordingStore {
    fn namespace(&self) -> &str {
        self.inner.namespace()
    }

    async fn create_field(
        &self,
        id: &ObjectId,
        field: Field,
        object: &ObjectMeta,
        meta: FieldMeta,
        address: &DeviceAddress,
    ) -> Result<(), StoreError> {
        if field == Field::LastUpdate {
            self.record(format!("create:{id}"));
        }
        self.inner
            .create_field(id, field, object, meta, address)
            .await
    }

    async fn list_objects(&self) -> Result<Vec<ExposedObject>, StoreError> {
        self.inner.list_objects().await
    }

    async fn extend_object(&self, id: &ObjectId, patch: &MetadataPatch) -> Result<(), StoreError> {
        self.record(format!("extend:{id}"));
        self.maybe_withhold().await;
        self.inner.extend_object(id, patch).await
    }

    async fn delete_object(&self, id: &ObjectId) -> Result<(), StoreError> {
        self.record(format!("delete:{id}"));
        self.maybe_withhold().await;
        self.inner.delete_object(id).await
    }

    async fn write_value(
        &self,
        id: &ObjectId,
        field: Field,
        value: FieldValue,
        ack: bool,
    ) -> Result<(), StoreError> {
        self.inner.write_value(id, field, value, ack).await
    }

    fn subscribe(&self) -> broadcast::Receiver<WriteIntent> {
        self.inner.subscribe()
    }
}

/// Drains everything currently buffered in `rx`.
pub fn drain(rx: &mut broadcast::Receiver<WriteIntent>) -> Vec<WriteIntent> {
    let mut writes = Vec::new();
    while let Ok(intent) = rx.try_recv() {
        writes.push(intent);
    }
    writes
}
