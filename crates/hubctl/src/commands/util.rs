//! Shared helpers for command handlers.

use std::io::IsTerminal;
use std::sync::Arc;

use hubctl_core::{Engine, EngineConfig, EngineSnapshot};

use crate::error::CliError;

/// Start a poller-less engine, fetch every source once, and return the
/// resulting snapshot.
pub async fn fetch_snapshot(config: EngineConfig) -> Result<Arc<EngineSnapshot>, CliError> {
    Engine::oneshot(config, |engine| async move {
        engine.refresh().await?;
        Ok(engine.snapshot())
    })
    .await
}

/// Refuse to mutate when the agent's stored settings were never loaded;
/// applying would push bootstrap defaults over the hub's real settings.
pub fn require_loaded(engine: &Engine) -> Result<(), CliError> {
    if engine.snapshot().config_loaded {
        Ok(())
    } else {
        Err(CliError::ConfigNotLoaded {
            url: engine.config().agent_url.to_string(),
        })
    }
}

/// Prompt for confirmation, auto-approving if `--yes` was passed.
pub fn confirm(message: &str, yes_flag: bool) -> Result<bool, CliError> {
    if yes_flag {
        return Ok(true);
    }
    if !std::io::stdin().is_terminal() {
        return Err(CliError::NonInteractiveRequiresYes {
            action: message.into(),
        });
    }
    let confirmed = dialoguer::Confirm::new()
        .with_prompt(message)
        .default(false)
        .interact()
        .map_err(prompt_err)?;
    Ok(confirmed)
}

/// Map a dialoguer / interactive I/O failure into CliError.
pub fn prompt_err(e: impl std::fmt::Display) -> CliError {
    CliError::Validation {
        field: "interactive".into(),
        reason: format!("prompt failed: {e}"),
    }
}

/// Prompt for a secret without echo, rejecting empty input.
pub fn prompt_secret(label: &str, field: &str) -> Result<String, CliError> {
    let secret = rpassword::prompt_password(label).map_err(prompt_err)?;
    if secret.is_empty() {
        return Err(CliError::Validation {
            field: field.into(),
            reason: "value cannot be empty".into(),
        });
    }
    Ok(secret)
}

/// A steady-ticking spinner on stderr, hidden in quiet mode.
pub fn spinner(message: &'static str, quiet: bool) -> indicatif::ProgressBar {
    if quiet {
        return indicatif::ProgressBar::hidden();
    }
    let bar = indicatif::ProgressBar::new_spinner();
    if let Ok(style) = indicatif::ProgressStyle::with_template("{spinner} {msg}") {
        bar.set_style(style);
    }
    bar.set_message(message);
    bar.enable_steady_tick(std::time::Duration::from_millis(100));
    bar
}
