// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! `plugsync` - keep a home-automation state store in sync with smart plugs.
//!
//! The crate mirrors a configured list of network plugs and bulbs into a
//! hierarchical state store. Each device becomes one object with a set of
//! typed fields (relay state, firmware, energy readings, brightness), and
//! operator writes to the relay field are forwarded back to the device.
//!
//! # Components
//!
//! - [`reconcile::Reconciler`]: aligns the store's objects with the
//!   configuration (create, rename, delete).
//! - [`poll::PollScheduler`]: queries devices one at a time on a fixed
//!   interval and records what they report.
//! - [`dispatch::CommandDispatcher`]: turns operator power requests into
//!   device commands.
//! - [`service::Service`]: runs all of the above until stopped.
//!
//! The device transport and the host store are traits
//! ([`protocol::DeviceClient`], [`store::StateStore`]); the crate ships an
//! in-memory store ([`store::MemoryStore`]).
//!
//! # Quick Start
//!
//! ```no_run
//! use std::sync::Arc;
//!
//! use plugsync::config::AdapterConfig;
//! use plugsync::protocol::DeviceClient;
//! use plugsync::service::{Service, ServiceStatus};
//! use plugsync::store::MemoryStore;
//!
//! async fn run(client: Arc<impl DeviceClient + 'static>) -> plugsync::Result<()> {
//!     let config = AdapterConfig::from_json_str(
//!         r#"{
//!             "devices": [
//!                 {"ip": "192.168.1.5", "name": "Kitchen", "active": true},
//!                 {"ip": "192.168.1.6", "name": "Desk lamp", "active": true}
//!             ],
//!             "interval": 30000
//!         }"#,
//!     )?;
//!     let store = Arc::new(MemoryStore::new("hs100.0"));
//!
//!     let mut service = Service::new(client, Arc::clone(&store), config);
//!     if let ServiceStatus::Running(report) = service.start().await? {
//!         println!("provisioned {} devices", report.created);
//!     }
//!
//!     service.stopped().await;
//!     Ok(())
//! }
//! ```
//!
//! # Capability classes
//!
//! ```
//! use plugsync::Capabilities;
//!
//! assert!(Capabilities::from_model("HS110(EU)").metering);
//! assert!(Capabilities::from_model("XXLB130(EU)").lighting);
//! assert_eq!(Capabilities::from_model("HS100(EU)"), Capabilities::basic());
//! ```

mod capabilities;
pub mod config;
pub mod dispatch;
pub mod error;
pub mod poll;
pub mod protocol;
pub mod reconcile;
pub mod response;
pub mod service;
pub mod store;
pub mod types;

pub use capabilities::{Capabilities, Capability, MODEL_RULES, ModelRule};
pub use config::{AdapterConfig, DeviceConfig, PollInterval, RunMode};
pub use dispatch::{CommandDispatcher, Dispatch};
pub use error::{ConfigError, DeviceError, Error, Result, StoreError};
pub use poll::{DeviceRefresh, PollScheduler, SchedulerState, Step};
pub use protocol::DeviceClient;
pub use reconcile::{ReconcileOptions, ReconcileReport, Reconciler};
pub use service::{GRACE_PERIOD, Service, ServiceStatus};
pub use store::{MemoryStore, StateStore, WriteIntent};
pub use types::{DeviceAddress, Field, FieldValue, ObjectId, PowerState};
