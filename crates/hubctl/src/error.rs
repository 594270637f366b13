//! CLI error types with miette diagnostics.
//!
//! Maps `CoreError` variants into user-facing errors with actionable help text.

use miette::Diagnostic;
use thiserror::Error;

use hubctl_config::ConfigError;
use hubctl_core::CoreError;

/// Process exit codes.
pub mod exit_code {
    pub const GENERAL: i32 = 1;
    pub const USAGE: i32 = 2;
    pub const NOT_FOUND: i32 = 4;
    pub const CONFLICT: i32 = 6;
    pub const CONNECTION: i32 = 7;
    pub const TIMEOUT: i32 = 8;
}

#[derive(Debug, Error, Diagnostic)]
pub enum CliError {
    // ── Connection ───────────────────────────────────────────────────

    #[error("Could not reach the hub agent at {url}: {reason}")]
    #[diagnostic(
        code(hubctl::connection_failed),
        help(
            "Check that the hub is powered and the agent is running.\n\
             URL: {url}\n\
             Try: hubctl status --agent http://<hub-address>:8080"
        )
    )]
    ConnectionFailed { url: String, reason: String },

    #[error("Hub configuration could not be loaded from {url}")]
    #[diagnostic(
        code(hubctl::config_not_loaded),
        help(
            "Changes are refused while the hub's stored settings are unknown,\n\
             since applying them would overwrite the agent with defaults.\n\
             Check the agent with: hubctl status"
        )
    )]
    ConfigNotLoaded { url: String },

    // ── Hub state ────────────────────────────────────────────────────

    #[error("{subsystem} is locked by the administrator")]
    #[diagnostic(
        code(hubctl::blocked),
        help("Blocked subsystems can only be changed on the hub itself.")
    )]
    Blocked { subsystem: String },

    #[error("No changes to apply for {subsystem}")]
    #[diagnostic(
        code(hubctl::nothing_to_apply),
        help("Pass at least one setting that differs from the current value.")
    )]
    NothingToApply { subsystem: String },

    #[error("Port {port} does not exist")]
    #[diagnostic(code(hubctl::not_found), help("Run: hubctl ports list"))]
    UnknownPort { port: u8 },

    #[error("{subsystem} does not support {operation}")]
    #[diagnostic(code(hubctl::unsupported))]
    Unsupported { subsystem: String, operation: String },

    // ── API ──────────────────────────────────────────────────────────

    #[error("Agent error: {message}")]
    #[diagnostic(code(hubctl::api_error))]
    ApiError { message: String, status: Option<u16> },

    #[error("Internal error: {0}")]
    #[diagnostic(code(hubctl::internal))]
    Internal(String),

    // ── Validation ───────────────────────────────────────────────────

    #[error("Invalid value for {field}: {reason}")]
    #[diagnostic(code(hubctl::validation))]
    Validation { field: String, reason: String },

    // ── Configuration ────────────────────────────────────────────────

    #[error("Profile '{name}' not found in configuration")]
    #[diagnostic(
        code(hubctl::profile_not_found),
        help(
            "Available profiles: {available}\n\
             Create one with: hubctl config init"
        )
    )]
    ProfileNotFound { name: String, available: String },

    #[error("No hub agent configured")]
    #[diagnostic(
        code(hubctl::no_config),
        help(
            "Create a profile with: hubctl config init\n\
             Or pass --agent / set HUBCTL_AGENT.\n\
             Expected config at: {path}"
        )
    )]
    NoConfig { path: String },

    #[error(transparent)]
    #[diagnostic(code(hubctl::config))]
    Config(#[from] ConfigError),

    // ── Interactive ──────────────────────────────────────────────────

    #[error("Operation '{action}' requires confirmation")]
    #[diagnostic(
        code(hubctl::confirmation_required),
        help("Use --yes (-y) to skip confirmation in non-interactive contexts.")
    )]
    NonInteractiveRequiresYes { action: String },

    // ── Timeout ──────────────────────────────────────────────────────

    #[error("Request timed out after {seconds}s")]
    #[diagnostic(
        code(hubctl::timeout),
        help("Increase timeout with --timeout or check the agent's responsiveness.")
    )]
    Timeout { seconds: u64 },

    // ── IO / Serialization ────────────────────────────────────────────

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error("Failed to render output: {0}")]
    #[diagnostic(code(hubctl::render))]
    Render(String),
}

impl CliError {
    /// Map this error to an exit code for process termination.
    pub fn exit_code(&self) -> i32 {
        match self {
            Self::ConnectionFailed { .. } | Self::ConfigNotLoaded { .. } => exit_code::CONNECTION,
            Self::UnknownPort { .. } | Self::ProfileNotFound { .. } => exit_code::NOT_FOUND,
            Self::ApiError {
                status: Some(404), ..
            } => exit_code::NOT_FOUND,
            Self::Blocked { .. } | Self::NothingToApply { .. } => exit_code::CONFLICT,
            Self::Timeout { .. } => exit_code::TIMEOUT,
            Self::Validation { .. }
            | Self::NonInteractiveRequiresYes { .. }
            | Self::Unsupported { .. }
            | Self::NoConfig { .. } => exit_code::USAGE,
            _ => exit_code::GENERAL,
        }
    }
}

// ── CoreError → CliError mapping ─────────────────────────────────────

impl From<CoreError> for CliError {
    fn from(err: CoreError) -> Self {
        match err {
            CoreError::AgentUnreachable { url, reason } => {
                CliError::ConnectionFailed { url, reason }
            }

            CoreError::EngineStopped | CoreError::AlreadyStarted => {
                CliError::Internal(err.to_string())
            }

            CoreError::Timeout { timeout_secs } => CliError::Timeout {
                seconds: timeout_secs,
            },

            CoreError::NothingToApply { kind } => CliError::NothingToApply {
                subsystem: kind.to_string(),
            },

            CoreError::NoEditSession { kind } => {
                CliError::Internal(format!("no edit session open for {kind}"))
            }

            CoreError::Blocked { kind } => CliError::Blocked {
                subsystem: kind.to_string(),
            },

            CoreError::Unsupported { kind, operation } => CliError::Unsupported {
                subsystem: kind.to_string(),
                operation: operation.into(),
            },

            CoreError::UnknownPort { port } => CliError::UnknownPort { port },

            CoreError::Api { message, status } => CliError::ApiError { message, status },

            CoreError::Config { message } => CliError::Validation {
                field: "config".into(),
                reason: message,
            },

            CoreError::Internal(message) => CliError::Internal(message),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use hubctl_core::SubsystemKind;

    #[test]
    fn core_errors_map_to_stable_exit_codes() {
        let blocked: CliError = CoreError::Blocked {
            kind: SubsystemKind::Tailscale,
        }
        .into();
        assert_eq!(blocked.exit_code(), exit_code::CONFLICT);
        assert_eq!(blocked.to_string(), "tailscale is locked by the administrator");

        let unreachable: CliError = CoreError::AgentUnreachable {
            url: "http://hub.local".into(),
            reason: "connection refused".into(),
        }
        .into();
        assert_eq!(unreachable.exit_code(), exit_code::CONNECTION);

        let port: CliError = CoreError::UnknownPort { port: 7 }.into();
        assert_eq!(port.exit_code(), exit_code::NOT_FOUND);
    }
}
