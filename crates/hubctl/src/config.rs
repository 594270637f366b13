//! CLI configuration: a thin wrapper around `hubctl_config` shared types.
//!
//! Re-exports the shared types and adds CLI-specific resolution that
//! respects `GlobalOpts` flag overrides.

use std::time::Duration;

use hubctl_core::{EngineConfig, TlsVerification};

use crate::cli::GlobalOpts;
use crate::error::CliError;

// ── Re-exports from shared crate ────────────────────────────────────

pub use hubctl_config::{
    Config, Defaults, Profile, config_path, load_config_or_default, profile_to_engine_config,
    save_config,
};

// ── CLI-specific helpers ────────────────────────────────────────────

/// Resolve the active profile name from CLI flags and config.
pub fn active_profile_name(global: &GlobalOpts, config: &Config) -> String {
    global
        .profile
        .clone()
        .or_else(|| config.default_profile.clone())
        .unwrap_or_else(|| "default".into())
}

/// Comma-separated profile names for error help text.
pub fn available_profiles(config: &Config) -> String {
    let mut names: Vec<_> = config.profiles.keys().cloned().collect();
    if names.is_empty() {
        return "(none)".into();
    }
    names.sort();
    names.join(", ")
}

/// Build an `EngineConfig` from the config file, profile, and CLI overrides.
///
/// Flag overrides take priority over profile values. Without a matching
/// profile, `--agent` alone is enough.
pub fn resolve_engine_config(global: &GlobalOpts) -> Result<EngineConfig, CliError> {
    let cfg = load_config_or_default();
    let profile_name = active_profile_name(global, &cfg);

    let profile = match (cfg.profiles.get(&profile_name), &global.agent) {
        (Some(profile), Some(agent)) => Profile {
            agent: agent.clone(),
            ..profile.clone()
        },
        (Some(profile), None) => profile.clone(),
        (None, Some(agent)) => Profile {
            agent: agent.clone(),
            insecure: None,
            timeout: None,
            poll: None,
        },
        (None, None) if global.profile.is_some() => {
            return Err(CliError::ProfileNotFound {
                name: profile_name,
                available: available_profiles(&cfg),
            });
        }
        (None, None) => {
            return Err(CliError::NoConfig {
                path: config_path().display().to_string(),
            });
        }
    };

    let mut engine = profile_to_engine_config(&profile, &cfg.defaults)?;
    if global.insecure {
        engine.tls = TlsVerification::DangerAcceptInvalid;
    }
    if let Some(secs) = global.timeout {
        engine.timeout = Duration::from_secs(secs);
    }
    Ok(engine)
}
