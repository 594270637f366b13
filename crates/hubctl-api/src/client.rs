// Hub agent HTTP client
//
// Wraps `reqwest::Client` with agent URL construction and response
// decoding. Every endpoint of the agent is a plain JSON document, so the
// endpoint methods below are thin wrappers over `get_json` / `put_json`.

use serde::Serialize;
use serde::de::DeserializeOwned;
use tracing::debug;
use url::Url;

use crate::error::Error;
use crate::transport::TransportConfig;
use crate::types::{
    AgentConfig, AgentVersion, CommandError, ConfigDocument, HostMetrics, InterfaceMap,
    NetworkSample, UsbDevice, WifiNetwork,
};

/// Max characters of a response body carried in error messages.
const BODY_PREVIEW_CHARS: usize = 200;

/// Raw HTTP client for the hub agent's `/api` surface.
///
/// Cheap to clone: the inner `reqwest::Client` is reference-counted, so
/// pollers each hold their own copy.
#[derive(Debug, Clone)]
pub struct AgentClient {
    http: reqwest::Client,
    base_url: Url,
}

impl AgentClient {
    /// Create a new client from a `TransportConfig`.
    ///
    /// `base_url` is the agent root, e.g. `http://hub.local:8080`. A path
    /// prefix (reverse proxy mount point) is preserved.
    pub fn new(base_url: Url, transport: &TransportConfig) -> Result<Self, Error> {
        let http = transport.build_client()?;
        Ok(Self { http, base_url })
    }

    /// Create a client with a pre-built `reqwest::Client`.
    pub fn with_client(http: reqwest::Client, base_url: Url) -> Self {
        Self { http, base_url }
    }

    /// The agent base URL.
    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    // ── URL builders ─────────────────────────────────────────────────

    /// Build `{base}/api/{path}`.
    pub(crate) fn api_url(&self, path: &str) -> Result<Url, Error> {
        let base = self.base_url.as_str().trim_end_matches('/');
        Ok(Url::parse(&format!("{base}/api/{path}"))?)
    }

    // ── Request helpers ──────────────────────────────────────────────

    async fn get_json<T: DeserializeOwned>(&self, path: &str) -> Result<T, Error> {
        let url = self.api_url(path)?;
        debug!("GET {}", url);

        let resp = self.http.get(url).send().await.map_err(Error::Transport)?;
        Self::parse_json(resp).await
    }

    async fn put_json(&self, path: &str, body: &(impl Serialize + Sync)) -> Result<(), Error> {
        let url = self.api_url(path)?;
        debug!("PUT {}", url);

        let resp = self
            .http
            .put(url)
            .json(body)
            .send()
            .await
            .map_err(Error::Transport)?;

        let status = resp.status();
        if !status.is_success() {
            let body = resp.text().await.unwrap_or_default();
            return Err(Error::Status {
                status: status.as_u16(),
                message: preview(&body),
            });
        }
        Ok(())
    }

    async fn parse_json<T: DeserializeOwned>(resp: reqwest::Response) -> Result<T, Error> {
        let status = resp.status();
        if !status.is_success() {
            let body = resp.text().await.unwrap_or_default();
            return Err(Error::Status {
                status: status.as_u16(),
                message: preview(&body),
            });
        }

        let body = resp.text().await.map_err(Error::Transport)?;
        serde_json::from_str(&body).map_err(|e| Error::Deserialization {
            message: format!("{e} (body preview: {:?})", preview(&body)),
            body,
        })
    }

    // ── Endpoints ────────────────────────────────────────────────────

    /// Current rx/tx throughput in MB/s.
    pub async fn network_sample(&self) -> Result<NetworkSample, Error> {
        self.get_json("network").await
    }

    /// Every USB device the agent can export, across all ports.
    pub async fn usb_devices(&self) -> Result<Vec<UsbDevice>, Error> {
        self.get_json("usb/devices").await
    }

    /// The agent's persisted configuration.
    pub async fn get_config(&self) -> Result<AgentConfig, Error> {
        self.get_json("config").await
    }

    /// Replace the agent's configuration wholesale.
    pub async fn put_config(&self, doc: &ConfigDocument) -> Result<(), Error> {
        self.put_json("config", doc).await
    }

    /// Scan for visible WiFi networks. Slow: the agent blocks on the radio.
    pub async fn wifi_scan(&self) -> Result<Vec<WifiNetwork>, Error> {
        self.get_json("wifi/scan").await
    }

    /// Drain the agent's queue of failed background commands.
    ///
    /// Each call returns only errors recorded since the previous call.
    pub async fn drain_errors(&self) -> Result<Vec<CommandError>, Error> {
        self.get_json("errors").await
    }

    /// Host CPU/RAM/uptime.
    pub async fn metrics(&self) -> Result<HostMetrics, Error> {
        self.get_json("metrics").await
    }

    /// Interface name to addresses, in agent order.
    pub async fn interfaces(&self) -> Result<InterfaceMap, Error> {
        self.get_json("interfaces").await
    }

    /// Agent build version string.
    pub async fn version(&self) -> Result<String, Error> {
        let v: AgentVersion = self.get_json("version").await?;
        Ok(v.version)
    }
}

fn preview(body: &str) -> String {
    body.chars().take(BODY_PREVIEW_CHARS).collect()
}
