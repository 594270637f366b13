//! WiFi scan.

use tabled::Tabled;

use hubctl_core::{Engine, EngineConfig, WifiNetwork};

use crate::cli::GlobalOpts;
use crate::error::CliError;
use crate::output;

use super::util;

#[derive(Tabled)]
pub(crate) struct NetworkRow {
    #[tabled(rename = "SSID")]
    ssid: String,
    #[tabled(rename = "Signal")]
    signal: String,
    #[tabled(rename = "Security")]
    security: String,
}

impl From<&WifiNetwork> for NetworkRow {
    fn from(n: &WifiNetwork) -> Self {
        Self {
            ssid: n.ssid.clone(),
            signal: format!("{} {} dBm", bars(n), n.signal),
            security: n.security.to_string(),
        }
    }
}

/// Signal strength drawn as four bars.
pub(crate) fn bars(network: &WifiNetwork) -> String {
    let filled = usize::from(network.signal_bars());
    format!("{}{}", "▮".repeat(filled), "▯".repeat(4 - filled))
}

pub async fn handle(config: EngineConfig, global: &GlobalOpts) -> Result<(), CliError> {
    let quiet = global.quiet;
    let networks = Engine::oneshot(config, |engine| async move {
        let bar = util::spinner("Scanning for WiFi networks", quiet);
        let result = engine.scan_wifi().await;
        bar.finish_and_clear();
        Ok::<_, CliError>(result?)
    })
    .await?;

    let out = output::render_list(
        &global.output,
        &networks,
        |n| NetworkRow::from(n),
        |n| n.ssid.clone(),
    )?;
    output::print_output(&out, global.quiet);
    Ok(())
}
