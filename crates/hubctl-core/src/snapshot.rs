// ── Engine snapshot ──
//
// Immutable view of everything the engine knows, published after every
// mutation. Derived views (port tree, live status) are computed on
// demand from the raw data held here.

use serde::Serialize;

use crate::device_tree::{self, PortView};
use crate::model::{
    AttachedDevice, HostMetrics, InterfaceSnapshot, Notification, SubsystemKind,
    ThroughputSample, WifiNetwork,
};
use crate::resolver::{Category, LiveStatus, Resolver};
use crate::store::{ConfigStore, ThroughputHistory};

/// Version label shown until the agent reports one.
pub const VERSION_PENDING: &str = "...";
/// Version label when the agent cannot say.
pub const VERSION_UNKNOWN: &str = "unknown";

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct EngineSnapshot {
    pub config: ConfigStore,
    /// `false` until the agent's configuration has been loaded once.
    pub config_loaded: bool,
    pub devices: Vec<AttachedDevice>,
    pub interfaces: InterfaceSnapshot,
    /// Oldest first, always full.
    pub throughput: Vec<ThroughputSample>,
    pub metrics: HostMetrics,
    pub notifications: Vec<Notification>,
    pub wifi_networks: Vec<WifiNetwork>,
    pub wifi_scanning: bool,
    pub agent_version: String,
}

impl Default for EngineSnapshot {
    fn default() -> Self {
        Self {
            config: ConfigStore::new(),
            config_loaded: false,
            devices: Vec::new(),
            interfaces: InterfaceSnapshot::default(),
            throughput: ThroughputHistory::default().to_vec(),
            metrics: HostMetrics::default(),
            notifications: Vec::new(),
            wifi_networks: Vec::new(),
            wifi_scanning: false,
            agent_version: VERSION_PENDING.into(),
        }
    }
}

impl EngineSnapshot {
    /// Per-port device trees, honouring port power.
    pub fn port_tree(&self) -> Vec<PortView> {
        device_tree::build(self.config.ports(), &self.devices)
    }

    pub fn live_status(&self, category: Category) -> Option<LiveStatus> {
        Resolver::standard().live_status(category, &self.interfaces)
    }

    pub fn has_live_address(&self, category: Category) -> bool {
        Resolver::standard().has_live_address(category, &self.interfaces)
    }

    pub fn is_dirty(&self, kind: SubsystemKind) -> bool {
        self.config.is_dirty(kind)
    }

    pub fn latest_throughput(&self) -> ThroughputSample {
        self.throughput.last().copied().unwrap_or_default()
    }
}
