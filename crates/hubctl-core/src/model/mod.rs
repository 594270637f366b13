// ── Domain model ──
//
// Canonical types the engine and its consumers work with. Wire shapes
// live in `hubctl_api::types`; `crate::convert` bridges the two.

pub mod hardware;
pub mod network;
pub mod notification;
pub mod subsystem;

// ── Re-exports ──────────────────────────────────────────────────────

pub use hardware::{
    AttachedDevice, HostMetrics, InterfaceAddresses, InterfaceSnapshot, Port, ThroughputSample,
    WifiNetwork,
};
pub use network::{
    EthernetConfig, EthernetPatch, NetworkMode, TailscaleConfig, TailscalePatch, VpnStatus,
    WifiConfig, WifiPatch, WifiSecurity, WireguardConfig, WireguardPatch,
};
pub use notification::Notification;
pub use subsystem::{Subsystem, SubsystemKind, SubsystemPayload};
