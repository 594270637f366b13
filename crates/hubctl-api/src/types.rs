// Wire types for the hub agent's JSON API.
//
// These mirror the agent's payloads field-for-field. Domain types with
// invariants (subsystem envelopes, port views) live in `hubctl-core`;
// this module only cares about getting bytes on and off the wire.

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

// ── Polled status ───────────────────────────────────────────────────

/// `GET /api/network` -- instantaneous throughput in MB/s.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct NetworkSample {
    #[serde(default)]
    pub rx: f64,
    #[serde(default)]
    pub tx: f64,
}

/// `GET /api/usb/devices` -- one exportable USB device.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UsbDevice {
    #[serde(rename = "busid")]
    pub bus_id: String,
    #[serde(default)]
    pub vendor_id: String,
    #[serde(default)]
    pub product_id: String,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub port: u32,
    #[serde(default)]
    pub occupied: bool,
}

/// Addresses bound to one network interface.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct InterfaceInfo {
    #[serde(default)]
    pub ipv4: Vec<String>,
    #[serde(default)]
    pub ipv6: Vec<String>,
    #[serde(default)]
    pub mac: String,
}

/// `GET /api/interfaces` -- interface name to addresses, in agent order.
pub type InterfaceMap = IndexMap<String, InterfaceInfo>;

/// `GET /api/metrics` -- host load figures.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct HostMetrics {
    #[serde(default)]
    pub cpu: u32,
    #[serde(default)]
    pub ram: u32,
    #[serde(default)]
    pub uptime: String,
}

/// `GET /api/errors` -- one queued command failure.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CommandError {
    pub message: String,
}

/// `GET /api/version`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AgentVersion {
    pub version: String,
}

/// `GET /api/wifi/scan` -- one visible access point.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WifiNetwork {
    pub ssid: String,
    /// Signal strength in dBm.
    #[serde(default)]
    pub signal: i32,
    #[serde(default)]
    pub security: String,
}

// ── Configuration ───────────────────────────────────────────────────

/// Power state of one physical port.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PortPower {
    pub id: u8,
    pub power: bool,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EthernetSettings {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub blocked: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub mode: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ip: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub mask: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub gateway: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub dns: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WifiSettings {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub blocked: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub enabled: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ssid: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub password: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ip: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub security: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WireguardSettings {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub blocked: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub enabled: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub config: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TailscaleSettings {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub blocked: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub enabled: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub preauthkey: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub exit_node: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub server_url: Option<String>,
}

/// `GET /api/config` -- whatever the agent has persisted.
///
/// Every section is optional: a fresh agent may know nothing about a
/// subsystem, in which case the console keeps its own defaults.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AgentConfig {
    #[serde(default)]
    pub ports: Option<Vec<PortPower>>,
    #[serde(default)]
    pub ethernet: Option<EthernetSettings>,
    #[serde(default)]
    pub wifi: Option<WifiSettings>,
    #[serde(default)]
    pub wireguard: Option<WireguardSettings>,
    #[serde(default)]
    pub tailscale: Option<TailscaleSettings>,
}

/// `PUT /api/config` -- the complete configuration, always sent whole.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConfigDocument {
    pub ports: Vec<PortPower>,
    pub ethernet: EthernetSettings,
    pub wifi: WifiSettings,
    pub wireguard: WireguardSettings,
    pub tailscale: TailscaleSettings,
}
