// ── Hub hardware and host status types ──

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use super::network::WifiSecurity;

/// One of the hub's fixed physical USB ports.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Port {
    pub id: u8,
    pub power: bool,
}

impl Port {
    pub const COUNT: u8 = 4;

    /// Factory power layout: every port on except port 3.
    pub fn defaults() -> Vec<Port> {
        (1..=Self::COUNT)
            .map(|id| Port { id, power: id != 3 })
            .collect()
    }
}

/// A USB device the agent can export, keyed by its bus id.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AttachedDevice {
    pub bus_id: String,
    pub vendor_id: String,
    pub product_id: String,
    pub name: String,
    pub port: u8,
    /// Attached to a remote client right now.
    pub occupied: bool,
}

/// Addresses bound to one interface.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InterfaceAddresses {
    pub ipv4: Vec<String>,
    pub ipv6: Vec<String>,
    pub hardware_address: String,
}

/// Interface name to addresses, in the order the agent listed them.
///
/// Replaced wholesale on every poll: an interface missing from the latest
/// snapshot is down.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct InterfaceSnapshot(IndexMap<String, InterfaceAddresses>);

impl InterfaceSnapshot {
    pub fn new(entries: IndexMap<String, InterfaceAddresses>) -> Self {
        Self(entries)
    }

    pub fn get(&self, name: &str) -> Option<&InterfaceAddresses> {
        self.0.get(name)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &InterfaceAddresses)> {
        self.0.iter().map(|(k, v)| (k.as_str(), v))
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl FromIterator<(String, InterfaceAddresses)> for InterfaceSnapshot {
    fn from_iter<I: IntoIterator<Item = (String, InterfaceAddresses)>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}

/// Host load as reported by the agent.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HostMetrics {
    /// CPU utilisation, percent.
    pub cpu: u32,
    /// Memory utilisation, percent.
    pub ram: u32,
    /// Human-readable uptime (`"3d 4h 12m"`).
    pub uptime: String,
}

impl Default for HostMetrics {
    fn default() -> Self {
        Self {
            cpu: 0,
            ram: 0,
            uptime: "...".into(),
        }
    }
}

/// Network throughput in MB/s.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct ThroughputSample {
    pub rx: f64,
    pub tx: f64,
}

/// A WiFi network seen by the hub's radio.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WifiNetwork {
    pub ssid: String,
    /// Signal strength in dBm.
    pub signal: i32,
    pub security: WifiSecurity,
}

impl WifiNetwork {
    /// Signal strength as 1..=4 bars.
    pub fn signal_bars(&self) -> u8 {
        match self.signal {
            s if s >= -55 => 4,
            s if s >= -65 => 3,
            s if s >= -75 => 2,
            _ => 1,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn net(signal: i32) -> WifiNetwork {
        WifiNetwork {
            ssid: "x".into(),
            signal,
            security: WifiSecurity::Wpa2,
        }
    }

    #[test]
    fn signal_bar_thresholds() {
        assert_eq!(net(-40).signal_bars(), 4);
        assert_eq!(net(-55).signal_bars(), 4);
        assert_eq!(net(-56).signal_bars(), 3);
        assert_eq!(net(-65).signal_bars(), 3);
        assert_eq!(net(-75).signal_bars(), 2);
        assert_eq!(net(-90).signal_bars(), 1);
    }

    #[test]
    fn default_port_layout() {
        let ports = Port::defaults();
        let power: Vec<bool> = ports.iter().map(|p| p.power).collect();
        assert_eq!(power, vec![true, true, false, true]);
        assert_eq!(ports[0].id, 1);
    }
}
