// ── Core error types ──
//
// Errors surfaced by the engine to its callers. Poll failures never show
// up here: they are logged and swallowed by the pollers. What remains is
// lifecycle trouble, ad-hoc query failures, and caller misuse.

use thiserror::Error;

use crate::model::SubsystemKind;

/// Unified error type for the core crate.
#[derive(Debug, Error)]
pub enum CoreError {
    // ── Lifecycle ────────────────────────────────────────────────────
    #[error("Engine is not running")]
    EngineStopped,

    #[error("Engine already started")]
    AlreadyStarted,

    #[error("Cannot reach hub agent at {url}: {reason}")]
    AgentUnreachable { url: String, reason: String },

    #[error("Hub agent request timed out after {timeout_secs}s")]
    Timeout { timeout_secs: u64 },

    // ── Caller misuse ────────────────────────────────────────────────
    #[error("{kind} has no pending changes to apply")]
    NothingToApply { kind: SubsystemKind },

    #[error("{kind} has no open edit session")]
    NoEditSession { kind: SubsystemKind },

    #[error("{kind} is locked by the administrator")]
    Blocked { kind: SubsystemKind },

    #[error("{kind} does not support {operation}")]
    Unsupported {
        kind: SubsystemKind,
        operation: &'static str,
    },

    #[error("Unknown port: {port}")]
    UnknownPort { port: u8 },

    // ── API errors (wrapped, not exposed raw) ────────────────────────
    #[error("API error: {message}")]
    Api {
        message: String,
        /// HTTP status code (if applicable).
        status: Option<u16>,
    },

    // ── Configuration errors ─────────────────────────────────────────
    #[error("Configuration error: {message}")]
    Config { message: String },

    // ── Internal errors ──────────────────────────────────────────────
    #[error("Internal error: {0}")]
    Internal(String),
}

impl CoreError {
    /// `true` for errors caused by how the engine was called rather than
    /// by the agent or the network.
    pub fn is_misuse(&self) -> bool {
        matches!(
            self,
            Self::NothingToApply { .. }
                | Self::NoEditSession { .. }
                | Self::Blocked { .. }
                | Self::Unsupported { .. }
                | Self::UnknownPort { .. }
        )
    }
}

// ── Conversion from transport-layer errors ───────────────────────────

impl From<hubctl_api::Error> for CoreError {
    fn from(err: hubctl_api::Error) -> Self {
        match err {
            hubctl_api::Error::Transport(ref e) => {
                if e.is_timeout() {
                    CoreError::Timeout { timeout_secs: 0 }
                } else if e.is_connect() {
                    CoreError::AgentUnreachable {
                        url: e
                            .url()
                            .map(ToString::to_string)
                            .unwrap_or_else(|| "<unknown>".into()),
                        reason: e.to_string(),
                    }
                } else {
                    CoreError::Api {
                        message: e.to_string(),
                        status: e.status().map(|s| s.as_u16()),
                    }
                }
            }
            hubctl_api::Error::InvalidUrl(e) => CoreError::Config {
                message: format!("Invalid URL: {e}"),
            },
            hubctl_api::Error::Timeout { timeout_secs } => CoreError::Timeout { timeout_secs },
            hubctl_api::Error::Tls(msg) => CoreError::AgentUnreachable {
                url: String::new(),
                reason: format!("TLS error: {msg}"),
            },
            hubctl_api::Error::Status { status, message } => CoreError::Api {
                message,
                status: Some(status),
            },
            hubctl_api::Error::Deserialization { message, body: _ } => {
                CoreError::Internal(format!("Deserialization error: {message}"))
            }
        }
    }
}
