// hubctl-api: Async Rust client for the USB-over-IP hub agent

pub mod client;
pub mod error;
pub mod transport;
pub mod types;

pub use client::AgentClient;
pub use error::Error;
pub use transport::{TlsMode, TransportConfig};
pub use types::{
    AgentConfig, AgentVersion, CommandError, ConfigDocument, EthernetSettings, HostMetrics,
    InterfaceInfo, InterfaceMap, NetworkSample, PortPower, TailscaleSettings, UsbDevice,
    WifiNetwork, WifiSettings, WireguardSettings,
};
