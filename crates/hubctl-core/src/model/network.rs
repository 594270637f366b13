// ── Network subsystem payloads ──

use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};

use super::hardware::WifiNetwork;
use super::subsystem::{SubsystemKind, SubsystemPayload};

/// Address assignment mode for the wired interface.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, Display, EnumString,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase", ascii_case_insensitive)]
pub enum NetworkMode {
    #[default]
    Dhcp,
    Static,
}

/// WiFi authentication scheme.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, Display, EnumString,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase", ascii_case_insensitive)]
pub enum WifiSecurity {
    #[default]
    Wpa2,
    Wpa,
    Open,
}

impl WifiSecurity {
    /// Lenient parse for agent-reported values. Anything unrecognised is
    /// treated as secured.
    pub fn from_wire(raw: &str) -> Self {
        raw.parse().unwrap_or_default()
    }

    pub fn requires_password(self) -> bool {
        !matches!(self, Self::Open)
    }
}

/// Local link indicator for the VPN subsystems. Never sent to the agent.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, Display, EnumString,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum VpnStatus {
    Connected,
    #[default]
    Disconnected,
    Connecting,
}

// ── Ethernet ────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EthernetConfig {
    pub mode: NetworkMode,
    pub ip: Option<String>,
    pub mask: Option<String>,
    pub gateway: Option<String>,
    pub dns: Option<String>,
}

impl Default for EthernetConfig {
    fn default() -> Self {
        Self {
            mode: NetworkMode::Dhcp,
            ip: Some("192.168.1.142".into()),
            mask: None,
            gateway: Some("192.168.1.1".into()),
            dns: None,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EthernetPatch {
    pub mode: Option<NetworkMode>,
    pub ip: Option<String>,
    pub mask: Option<String>,
    pub gateway: Option<String>,
    pub dns: Option<String>,
}

impl SubsystemPayload for EthernetConfig {
    type Patch = EthernetPatch;
    const KIND: SubsystemKind = SubsystemKind::Ethernet;

    fn apply_patch(&mut self, patch: EthernetPatch) {
        if let Some(mode) = patch.mode {
            self.mode = mode;
        }
        set_if_some(&mut self.ip, patch.ip);
        set_if_some(&mut self.mask, patch.mask);
        set_if_some(&mut self.gateway, patch.gateway);
        set_if_some(&mut self.dns, patch.dns);
    }
}

// ── WiFi ────────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WifiConfig {
    pub enabled: bool,
    pub ssid: Option<String>,
    pub password: Option<String>,
    pub ip: Option<String>,
    pub security: Option<WifiSecurity>,
}

impl Default for WifiConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            ssid: Some("Home_Network_5G".into()),
            password: Some(String::new()),
            ip: Some("192.168.1.143".into()),
            security: None,
        }
    }
}

impl WifiConfig {
    /// Security in effect; unset means WPA2.
    pub fn effective_security(&self) -> WifiSecurity {
        self.security.unwrap_or_default()
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct WifiPatch {
    pub ssid: Option<String>,
    pub password: Option<String>,
    pub ip: Option<String>,
    pub security: Option<WifiSecurity>,
}

impl WifiPatch {
    /// Patch that joins a scanned network: its SSID and security scheme.
    pub fn select_network(network: &WifiNetwork) -> Self {
        Self {
            ssid: Some(network.ssid.clone()),
            security: Some(network.security),
            ..Default::default()
        }
    }
}

impl SubsystemPayload for WifiConfig {
    type Patch = WifiPatch;
    const KIND: SubsystemKind = SubsystemKind::Wifi;

    fn apply_patch(&mut self, patch: WifiPatch) {
        set_if_some(&mut self.ssid, patch.ssid);
        set_if_some(&mut self.password, patch.password);
        set_if_some(&mut self.ip, patch.ip);
        if let Some(security) = patch.security {
            self.security = Some(security);
        }
    }

    fn toggle_enabled(&mut self) -> bool {
        self.enabled = !self.enabled;
        true
    }

    fn mirror_enabled(&mut self, from: &Self) {
        self.enabled = from.enabled;
    }
}

// ── WireGuard ───────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WireguardConfig {
    pub enabled: bool,
    pub status: VpnStatus,
    pub config: Option<String>,
}

impl Default for WireguardConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            status: VpnStatus::Disconnected,
            config: Some("[Interface]\nPrivateKey = ...\nAddress = 10.0.0.5/32".into()),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct WireguardPatch {
    pub config: Option<String>,
}

impl SubsystemPayload for WireguardConfig {
    type Patch = WireguardPatch;
    const KIND: SubsystemKind = SubsystemKind::Wireguard;

    fn apply_patch(&mut self, patch: WireguardPatch) {
        set_if_some(&mut self.config, patch.config);
    }

    fn toggle_enabled(&mut self) -> bool {
        self.enabled = !self.enabled;
        self.status = if self.enabled {
            VpnStatus::Connected
        } else {
            VpnStatus::Disconnected
        };
        true
    }

    fn mirror_enabled(&mut self, from: &Self) {
        self.enabled = from.enabled;
        self.status = from.status;
    }
}

// ── Tailscale ───────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TailscaleConfig {
    pub enabled: bool,
    pub status: VpnStatus,
    pub preauthkey: Option<String>,
    pub exit_node: Option<bool>,
    pub server_url: Option<String>,
}

impl Default for TailscaleConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            status: VpnStatus::Disconnected,
            preauthkey: Some(String::new()),
            exit_node: Some(false),
            server_url: Some("https://controlplane.tailscale.com".into()),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TailscalePatch {
    pub preauthkey: Option<String>,
    pub exit_node: Option<bool>,
    pub server_url: Option<String>,
}

impl SubsystemPayload for TailscaleConfig {
    type Patch = TailscalePatch;
    const KIND: SubsystemKind = SubsystemKind::Tailscale;

    fn apply_patch(&mut self, patch: TailscalePatch) {
        set_if_some(&mut self.preauthkey, patch.preauthkey);
        if let Some(exit_node) = patch.exit_node {
            self.exit_node = Some(exit_node);
        }
        set_if_some(&mut self.server_url, patch.server_url);
    }

    fn toggle_enabled(&mut self) -> bool {
        self.enabled = !self.enabled;
        // Tailscale takes a while to come up; the agent never reports back.
        self.status = if self.enabled {
            VpnStatus::Connecting
        } else {
            VpnStatus::Disconnected
        };
        true
    }

    fn mirror_enabled(&mut self, from: &Self) {
        self.enabled = from.enabled;
        self.status = from.status;
    }
}

fn set_if_some(slot: &mut Option<String>, value: Option<String>) {
    if let Some(v) = value {
        *slot = Some(v);
    }
}
