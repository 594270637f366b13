// ── Config Store ──
//
// Holds user intent for every configurable subsystem and the port power
// layout, and reconciles it against what the agent confirmed. Operations
// that must reach the agent return the complete `ConfigDocument`; the
// caller hands it to the persistence bridge.

use hubctl_api::{AgentConfig, ConfigDocument, PortPower};
use serde::Serialize;

use crate::convert;
use crate::error::CoreError;
use crate::model::{
    EthernetConfig, EthernetPatch, Port, Subsystem, SubsystemKind, SubsystemPayload,
    TailscaleConfig, TailscalePatch, WifiConfig, WifiPatch, WireguardConfig, WireguardPatch,
};

/// A draft edit addressed to one subsystem.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DraftPatch {
    Ethernet(EthernetPatch),
    Wifi(WifiPatch),
    Wireguard(WireguardPatch),
    Tailscale(TailscalePatch),
}

impl DraftPatch {
    pub fn kind(&self) -> SubsystemKind {
        match self {
            Self::Ethernet(_) => SubsystemKind::Ethernet,
            Self::Wifi(_) => SubsystemKind::Wifi,
            Self::Wireguard(_) => SubsystemKind::Wireguard,
            Self::Tailscale(_) => SubsystemKind::Tailscale,
        }
    }
}

/// Kind-erased view of a [`Subsystem`] for operations that don't touch
/// the payload type.
trait EditSession {
    fn begin_edit(&mut self) -> Result<(), CoreError>;
    fn cancel_edit(&mut self);
    fn commit(&mut self) -> Result<(), CoreError>;
    fn toggle_enabled(&mut self) -> Result<(), CoreError>;
    fn is_dirty(&self) -> bool;
    fn is_editing(&self) -> bool;
    fn is_blocked(&self) -> bool;
}

impl<T: SubsystemPayload> EditSession for Subsystem<T> {
    fn begin_edit(&mut self) -> Result<(), CoreError> {
        Subsystem::begin_edit(self)
    }
    fn cancel_edit(&mut self) {
        Subsystem::cancel_edit(self);
    }
    fn commit(&mut self) -> Result<(), CoreError> {
        Subsystem::commit(self)
    }
    fn toggle_enabled(&mut self) -> Result<(), CoreError> {
        Subsystem::toggle_enabled(self)
    }
    fn is_dirty(&self) -> bool {
        Subsystem::is_dirty(self)
    }
    fn is_editing(&self) -> bool {
        Subsystem::is_editing(self)
    }
    fn is_blocked(&self) -> bool {
        Subsystem::is_blocked(self)
    }
}

/// Confirmed/draft state for all subsystems plus port power.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ConfigStore {
    ethernet: Subsystem<EthernetConfig>,
    wifi: Subsystem<WifiConfig>,
    wireguard: Subsystem<WireguardConfig>,
    tailscale: Subsystem<TailscaleConfig>,
    ports: Vec<Port>,
}

impl Default for ConfigStore {
    fn default() -> Self {
        Self::new()
    }
}

impl ConfigStore {
    /// Bootstrap defaults, used until the agent's configuration arrives.
    pub fn new() -> Self {
        Self {
            ethernet: Subsystem::default(),
            wifi: Subsystem::default(),
            wireguard: Subsystem::default(),
            tailscale: Subsystem::default(),
            ports: Port::defaults(),
        }
    }

    // ── Accessors ────────────────────────────────────────────────────

    pub fn ethernet(&self) -> &Subsystem<EthernetConfig> {
        &self.ethernet
    }

    pub fn wifi(&self) -> &Subsystem<WifiConfig> {
        &self.wifi
    }

    pub fn wireguard(&self) -> &Subsystem<WireguardConfig> {
        &self.wireguard
    }

    pub fn tailscale(&self) -> &Subsystem<TailscaleConfig> {
        &self.tailscale
    }

    pub fn ports(&self) -> &[Port] {
        &self.ports
    }

    pub fn port(&self, id: u8) -> Option<&Port> {
        self.ports.iter().find(|p| p.id == id)
    }

    pub fn is_dirty(&self, kind: SubsystemKind) -> bool {
        self.session(kind).is_dirty()
    }

    pub fn is_editing(&self, kind: SubsystemKind) -> bool {
        self.session(kind).is_editing()
    }

    pub fn is_blocked(&self, kind: SubsystemKind) -> bool {
        self.session(kind).is_blocked()
    }

    fn session(&self, kind: SubsystemKind) -> &dyn EditSession {
        match kind {
            SubsystemKind::Ethernet => &self.ethernet,
            SubsystemKind::Wifi => &self.wifi,
            SubsystemKind::Wireguard => &self.wireguard,
            SubsystemKind::Tailscale => &self.tailscale,
        }
    }

    fn session_mut(&mut self, kind: SubsystemKind) -> &mut dyn EditSession {
        match kind {
            SubsystemKind::Ethernet => &mut self.ethernet,
            SubsystemKind::Wifi => &mut self.wifi,
            SubsystemKind::Wireguard => &mut self.wireguard,
            SubsystemKind::Tailscale => &mut self.tailscale,
        }
    }

    // ── Reconciliation ──────────────────────────────────────────────

    /// Adopt the agent's persisted configuration.
    ///
    /// Sections the agent omits keep their local values, as do omitted
    /// fields inside a present section. Ports are matched by id; unknown
    /// ids are ignored.
    pub fn load(&mut self, remote: AgentConfig) {
        if let Some(eth) = remote.ethernet {
            let blocked = eth.blocked.unwrap_or(self.ethernet.is_blocked());
            let merged = convert::merge_ethernet(self.ethernet.confirmed(), eth);
            self.ethernet.load(merged, blocked);
        }
        if let Some(wifi) = remote.wifi {
            let blocked = wifi.blocked.unwrap_or(self.wifi.is_blocked());
            let merged = convert::merge_wifi(self.wifi.confirmed(), wifi);
            self.wifi.load(merged, blocked);
        }
        if let Some(wg) = remote.wireguard {
            let blocked = wg.blocked.unwrap_or(self.wireguard.is_blocked());
            let merged = convert::merge_wireguard(self.wireguard.confirmed(), wg);
            self.wireguard.load(merged, blocked);
        }
        if let Some(ts) = remote.tailscale {
            let blocked = ts.blocked.unwrap_or(self.tailscale.is_blocked());
            let merged = convert::merge_tailscale(self.tailscale.confirmed(), ts);
            self.tailscale.load(merged, blocked);
        }
        if let Some(remote_ports) = remote.ports {
            for rp in remote_ports {
                if let Some(port) = self.ports.iter_mut().find(|p| p.id == rp.id) {
                    port.power = rp.power;
                }
            }
        }
    }

    // ── Edit sessions ───────────────────────────────────────────────

    pub fn begin_edit(&mut self, kind: SubsystemKind) -> Result<(), CoreError> {
        self.session_mut(kind).begin_edit()
    }

    /// Close the session and reset the draft. Harmless without a session.
    pub fn cancel_edit(&mut self, kind: SubsystemKind) {
        self.session_mut(kind).cancel_edit();
    }

    pub fn update_draft(&mut self, patch: DraftPatch) -> Result<(), CoreError> {
        match patch {
            DraftPatch::Ethernet(p) => self.ethernet.update_draft(p),
            DraftPatch::Wifi(p) => self.wifi.update_draft(p),
            DraftPatch::Wireguard(p) => self.wireguard.update_draft(p),
            DraftPatch::Tailscale(p) => self.tailscale.update_draft(p),
        }
    }

    /// Promote the subsystem's draft and return the document to persist.
    pub fn apply(&mut self, kind: SubsystemKind) -> Result<ConfigDocument, CoreError> {
        self.session_mut(kind).commit()?;
        Ok(self.document())
    }

    // ── Immediate toggles ───────────────────────────────────────────

    /// Flip a subsystem's `enabled` switch outside any session and return
    /// the document to persist.
    pub fn toggle_enabled(&mut self, kind: SubsystemKind) -> Result<ConfigDocument, CoreError> {
        self.session_mut(kind).toggle_enabled()?;
        Ok(self.document())
    }

    /// Flip one port's power and return the document to persist.
    pub fn toggle_port_power(&mut self, id: u8) -> Result<ConfigDocument, CoreError> {
        let port = self
            .ports
            .iter_mut()
            .find(|p| p.id == id)
            .ok_or(CoreError::UnknownPort { port: id })?;
        port.power = !port.power;
        Ok(self.document())
    }

    // ── Persistence ─────────────────────────────────────────────────

    /// The complete confirmed state in the agent's PUT shape.
    pub fn document(&self) -> ConfigDocument {
        ConfigDocument {
            ports: self
                .ports
                .iter()
                .map(|p| PortPower {
                    id: p.id,
                    power: p.power,
                })
                .collect(),
            ethernet: convert::ethernet_settings(&self.ethernet),
            wifi: convert::wifi_settings(&self.wifi),
            wireguard: convert::wireguard_settings(&self.wireguard),
            tailscale: convert::tailscale_settings(&self.tailscale),
        }
    }
}
