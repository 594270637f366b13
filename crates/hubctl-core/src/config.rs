// ── Runtime engine configuration ──
//
// These types describe *how* to talk to a hub agent and how often to
// poll it. They never touch disk: the CLI builds an `EngineConfig` from
// its profile and hands it in.

use std::time::Duration;

use url::Url;

/// TLS verification strategy.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum TlsVerification {
    /// System CA store (strict).
    #[default]
    SystemDefaults,
    /// Skip verification (self-signed agents behind a reverse proxy).
    DangerAcceptInvalid,
}

/// Per-source polling cadence. A zero duration disables that poller.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PollIntervals {
    pub interfaces: Duration,
    pub devices: Duration,
    pub network: Duration,
    pub errors: Duration,
    pub metrics: Duration,
}

impl Default for PollIntervals {
    fn default() -> Self {
        Self {
            interfaces: Duration::from_secs(10),
            devices: Duration::from_secs(5),
            network: Duration::from_secs(1),
            errors: Duration::from_secs(5),
            metrics: Duration::from_secs(3),
        }
    }
}

impl PollIntervals {
    /// All pollers disabled. Used by one-shot invocations.
    pub fn disabled() -> Self {
        Self {
            interfaces: Duration::ZERO,
            devices: Duration::ZERO,
            network: Duration::ZERO,
            errors: Duration::ZERO,
            metrics: Duration::ZERO,
        }
    }
}

/// Configuration for driving a single hub agent.
#[derive(Debug, Clone)]
pub struct EngineConfig {
    /// Agent base URL (e.g., `http://hub.local:8080`).
    pub agent_url: Url,
    /// TLS verification strategy.
    pub tls: TlsVerification,
    /// HTTP request timeout. The engine itself imposes none.
    pub timeout: Duration,
    /// Poller cadences.
    pub poll: PollIntervals,
    /// How long a reported agent error stays visible.
    pub notification_ttl: Duration,
}

impl EngineConfig {
    pub const DEFAULT_NOTIFICATION_TTL: Duration = Duration::from_secs(15);
    pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(10);

    /// Defaults for everything except the agent address.
    pub fn new(agent_url: Url) -> Self {
        Self {
            agent_url,
            tls: TlsVerification::default(),
            timeout: Self::DEFAULT_TIMEOUT,
            poll: PollIntervals::default(),
            notification_ttl: Self::DEFAULT_NOTIFICATION_TTL,
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn default_cadences() {
        let p = PollIntervals::default();
        assert_eq!(p.network, Duration::from_secs(1));
        assert_eq!(p.metrics, Duration::from_secs(3));
        assert_eq!(p.devices, Duration::from_secs(5));
        assert_eq!(p.errors, Duration::from_secs(5));
        assert_eq!(p.interfaces, Duration::from_secs(10));
    }

    #[test]
    fn new_uses_fifteen_second_ttl() {
        let cfg = EngineConfig::new("http://hub.local:8080".parse().unwrap());
        assert_eq!(cfg.notification_ttl, Duration::from_secs(15));
        assert_eq!(cfg.tls, TlsVerification::SystemDefaults);
    }
}
