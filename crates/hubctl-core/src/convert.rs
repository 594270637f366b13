// ── Wire ↔ domain conversion ──
//
// Status payloads map one-to-one. Configuration sections merge: a field
// the agent omits keeps whatever the console already holds.

use hubctl_api::types as wire;

use crate::model::{
    AttachedDevice, EthernetConfig, HostMetrics, InterfaceAddresses, InterfaceSnapshot,
    NetworkMode, Subsystem, TailscaleConfig, ThroughputSample, WifiConfig, WifiNetwork,
    WifiSecurity, WireguardConfig,
};

// ── Status payloads ─────────────────────────────────────────────────

impl From<wire::UsbDevice> for AttachedDevice {
    fn from(d: wire::UsbDevice) -> Self {
        Self {
            bus_id: d.bus_id,
            vendor_id: d.vendor_id,
            product_id: d.product_id,
            name: d.name,
            // Out-of-range ports match no physical port and stay hidden.
            port: u8::try_from(d.port).unwrap_or(0),
            occupied: d.occupied,
        }
    }
}

impl From<wire::InterfaceInfo> for InterfaceAddresses {
    fn from(i: wire::InterfaceInfo) -> Self {
        Self {
            ipv4: i.ipv4,
            ipv6: i.ipv6,
            hardware_address: i.mac,
        }
    }
}

impl From<wire::InterfaceMap> for InterfaceSnapshot {
    fn from(map: wire::InterfaceMap) -> Self {
        map.into_iter().map(|(k, v)| (k, v.into())).collect()
    }
}

impl From<wire::HostMetrics> for HostMetrics {
    fn from(m: wire::HostMetrics) -> Self {
        Self {
            cpu: m.cpu,
            ram: m.ram,
            uptime: m.uptime,
        }
    }
}

impl From<wire::NetworkSample> for ThroughputSample {
    fn from(s: wire::NetworkSample) -> Self {
        Self { rx: s.rx, tx: s.tx }
    }
}

impl From<wire::WifiNetwork> for WifiNetwork {
    fn from(n: wire::WifiNetwork) -> Self {
        Self {
            security: WifiSecurity::from_wire(&n.security),
            ssid: n.ssid,
            signal: n.signal,
        }
    }
}

// ── Configuration: agent → console ──────────────────────────────────

pub(crate) fn merge_ethernet(
    local: &EthernetConfig,
    remote: wire::EthernetSettings,
) -> EthernetConfig {
    EthernetConfig {
        mode: remote
            .mode
            .and_then(|m| m.parse::<NetworkMode>().ok())
            .unwrap_or(local.mode),
        ip: remote.ip.or_else(|| local.ip.clone()),
        mask: remote.mask.or_else(|| local.mask.clone()),
        gateway: remote.gateway.or_else(|| local.gateway.clone()),
        dns: remote.dns.or_else(|| local.dns.clone()),
    }
}

pub(crate) fn merge_wifi(local: &WifiConfig, remote: wire::WifiSettings) -> WifiConfig {
    WifiConfig {
        enabled: remote.enabled.unwrap_or(local.enabled),
        ssid: remote.ssid.or_else(|| local.ssid.clone()),
        password: remote.password.or_else(|| local.password.clone()),
        ip: remote.ip.or_else(|| local.ip.clone()),
        security: remote
            .security
            .map(|s| WifiSecurity::from_wire(&s))
            .or(local.security),
    }
}

pub(crate) fn merge_wireguard(
    local: &WireguardConfig,
    remote: wire::WireguardSettings,
) -> WireguardConfig {
    WireguardConfig {
        enabled: remote.enabled.unwrap_or(local.enabled),
        status: local.status,
        config: remote.config.or_else(|| local.config.clone()),
    }
}

pub(crate) fn merge_tailscale(
    local: &TailscaleConfig,
    remote: wire::TailscaleSettings,
) -> TailscaleConfig {
    TailscaleConfig {
        enabled: remote.enabled.unwrap_or(local.enabled),
        status: local.status,
        preauthkey: remote.preauthkey.or_else(|| local.preauthkey.clone()),
        exit_node: remote.exit_node.or(local.exit_node),
        server_url: remote.server_url.or_else(|| local.server_url.clone()),
    }
}

// ── Configuration: console → agent ──────────────────────────────────

pub(crate) fn ethernet_settings(s: &Subsystem<EthernetConfig>) -> wire::EthernetSettings {
    let c = s.confirmed();
    wire::EthernetSettings {
        blocked: Some(s.is_blocked()),
        mode: Some(c.mode.to_string()),
        ip: c.ip.clone(),
        mask: c.mask.clone(),
        gateway: c.gateway.clone(),
        dns: c.dns.clone(),
    }
}

pub(crate) fn wifi_settings(s: &Subsystem<WifiConfig>) -> wire::WifiSettings {
    let c = s.confirmed();
    wire::WifiSettings {
        blocked: Some(s.is_blocked()),
        enabled: Some(c.enabled),
        ssid: c.ssid.clone(),
        password: c.password.clone(),
        ip: c.ip.clone(),
        security: c.security.map(|sec| sec.to_string()),
    }
}

/// WireGuard is sent as `{blocked, enabled, config}` only; link status
/// stays local.
pub(crate) fn wireguard_settings(s: &Subsystem<WireguardConfig>) -> wire::WireguardSettings {
    let c = s.confirmed();
    wire::WireguardSettings {
        blocked: Some(s.is_blocked()),
        enabled: Some(c.enabled),
        config: c.config.clone(),
    }
}

pub(crate) fn tailscale_settings(s: &Subsystem<TailscaleConfig>) -> wire::TailscaleSettings {
    let c = s.confirmed();
    wire::TailscaleSettings {
        blocked: Some(s.is_blocked()),
        enabled: Some(c.enabled),
        preauthkey: c.preauthkey.clone(),
        exit_node: c.exit_node,
        server_url: c.server_url.clone(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::VpnStatus;
    use pretty_assertions::assert_eq;

    #[test]
    fn device_port_out_of_range_is_hidden() {
        let dev: AttachedDevice = wire::UsbDevice {
            bus_id: "9-1".into(),
            vendor_id: String::new(),
            product_id: String::new(),
            name: String::new(),
            port: 300,
            occupied: false,
        }
        .into();
        assert_eq!(dev.port, 0);
    }

    #[test]
    fn merge_keeps_fields_the_agent_omits() {
        let local = EthernetConfig::default();
        let merged = merge_ethernet(
            &local,
            wire::EthernetSettings {
                mode: Some("static".into()),
                dns: Some("1.1.1.1".into()),
                ..Default::default()
            },
        );
        assert_eq!(merged.mode, NetworkMode::Static);
        assert_eq!(merged.dns.as_deref(), Some("1.1.1.1"));
        assert_eq!(merged.ip, local.ip);
        assert_eq!(merged.gateway, local.gateway);
    }

    #[test]
    fn merge_ignores_unknown_mode() {
        let local = EthernetConfig::default();
        let merged = merge_ethernet(
            &local,
            wire::EthernetSettings {
                mode: Some("pppoe".into()),
                ..Default::default()
            },
        );
        assert_eq!(merged.mode, NetworkMode::Dhcp);
    }

    #[test]
    fn vpn_status_never_leaves_the_console() {
        let mut wg = Subsystem::new(WireguardConfig::default());
        wg.toggle_enabled().ok();
        assert_eq!(wg.confirmed().status, VpnStatus::Connected);

        let settings = wireguard_settings(&wg);
        assert_eq!(settings.enabled, Some(true));
        assert_eq!(settings.blocked, Some(false));
        let merged = merge_wireguard(wg.confirmed(), settings);
        assert_eq!(merged.status, VpnStatus::Connected);
    }
}
