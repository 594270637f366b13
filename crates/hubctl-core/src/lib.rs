//! Client-side sync and reconciliation engine for a USB-over-IP hub.
//!
//! This crate owns the domain model and the reactive state machinery that
//! sits between `hubctl-api` and a front end:
//!
//! - **[`Engine`]**: Central facade. [`start()`](Engine::start) loads the
//!   agent's configuration once, then spawns one state-owner task, a
//!   persistence bridge and an independent poller per data source.
//!   [`Engine::oneshot()`] skips the pollers for single CLI invocations.
//!
//! - **[`ConfigStore`]**: Three-way state (confirmed / draft / blocked) for
//!   every configurable subsystem plus port power. Pure and synchronous;
//!   every mutation that must reach the agent returns the full
//!   [`ConfigDocument`](hubctl_api::ConfigDocument) to persist.
//!
//! - **[`SnapshotStream`]**: Subscription handle over published
//!   [`EngineSnapshot`]s. Exposes `current()` / `latest()` / `changed()`.
//!
//! - **[`Command`]**: User intents routed through the owner's channel
//!   with a one-shot reply, so edits apply in the order they were issued.
//!
//! - **Derived views**: [`resolver`] maps volatile interface names onto
//!   network categories, [`device_tree`] nests attached USB devices under
//!   their physical ports.

pub mod command;
pub mod config;
pub mod convert;
pub mod device_tree;
pub mod engine;
pub mod error;
pub mod model;
mod poller;
pub mod resolver;
pub mod snapshot;
pub mod store;
pub mod stream;

// ── Primary re-exports ──────────────────────────────────────────────
pub use command::{Command, CommandResult, DraftPatch};
pub use config::{EngineConfig, PollIntervals, TlsVerification};
pub use device_tree::{DeviceNode, NodeKind, PortState, PortView};
pub use engine::{Engine, EngineStatus};
pub use error::CoreError;
pub use resolver::{Category, LiveStatus, Resolver};
pub use snapshot::EngineSnapshot;
pub use store::{ConfigStore, NotificationQueue, ThroughputHistory};
pub use stream::SnapshotStream;

pub use model::{
    AttachedDevice, EthernetConfig, EthernetPatch, HostMetrics, InterfaceAddresses,
    InterfaceSnapshot, NetworkMode, Notification, Port, Subsystem, SubsystemKind,
    SubsystemPayload, TailscaleConfig, TailscalePatch, ThroughputSample, VpnStatus, WifiConfig,
    WifiNetwork, WifiPatch, WifiSecurity, WireguardConfig, WireguardPatch,
};
