//! Command dispatch: bridges CLI args -> engine operations -> output formatting.

pub mod config_cmd;
pub mod interfaces;
pub mod ports;
pub mod scan;
pub mod settings;
pub mod status;
pub mod util;
pub mod watch;

use hubctl_core::EngineConfig;

use crate::cli::{Command, GlobalOpts};
use crate::error::CliError;

/// Dispatch an agent-bound command to the appropriate handler.
pub async fn dispatch(
    cmd: Command,
    config: EngineConfig,
    global: &GlobalOpts,
) -> Result<(), CliError> {
    match cmd {
        Command::Status => status::handle(config, global).await,
        Command::Ports(args) => ports::handle(config, args, global).await,
        Command::Interfaces => interfaces::handle(config, global).await,
        Command::Settings(args) => settings::handle(config, args, global).await,
        Command::Toggle { subsystem } => settings::toggle(config, subsystem, global).await,
        Command::Scan => scan::handle(config, global).await,
        Command::Watch(args) => watch::handle(config, args, global).await,
        // Config and Completions are handled before dispatch
        Command::Config(_) | Command::Completions(_) => Err(CliError::Internal(
            "local command reached agent dispatch".into(),
        )),
    }
}
