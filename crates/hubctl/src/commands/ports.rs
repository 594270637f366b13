//! Port command handlers.

use tabled::Tabled;

use hubctl_core::{DeviceNode, Engine, EngineConfig, NodeKind, PortState, PortView};

use crate::cli::{GlobalOpts, PortsArgs, PortsCommand, PowerState};
use crate::error::CliError;
use crate::output;

use super::util;

// ── Table row ───────────────────────────────────────────────────────

#[derive(Tabled)]
struct PortRow {
    #[tabled(rename = "Port")]
    id: u8,
    #[tabled(rename = "Power")]
    power: String,
    #[tabled(rename = "Devices")]
    devices: String,
}

impl From<&PortView> for PortRow {
    fn from(view: &PortView) -> Self {
        let devices = match &view.state {
            PortState::PowerDisabled => "-".into(),
            PortState::Empty => "(empty)".into(),
            PortState::Populated(nodes) => {
                let mut lines = Vec::new();
                for node in nodes {
                    tree_lines(node, 0, &mut lines);
                }
                lines.join("\n")
            }
        };
        Self {
            id: view.id,
            power: if view.power { "on" } else { "off" }.into(),
            devices,
        }
    }
}

/// Flatten a device tree into indented lines.
fn tree_lines(node: &DeviceNode, depth: usize, out: &mut Vec<String>) {
    let marker = match node.kind {
        NodeKind::Hub => "hub ",
        NodeKind::Device => "",
    };
    let busy = if node.busy { " [in use]" } else { "" };
    out.push(format!(
        "{}{marker}{} ({}:{}){busy}",
        "  ".repeat(depth),
        node.name,
        node.vendor_id,
        node.product_id
    ));
    for child in &node.children {
        tree_lines(child, depth + 1, out);
    }
}

// ── Handler ─────────────────────────────────────────────────────────

pub async fn handle(
    config: EngineConfig,
    args: PortsArgs,
    global: &GlobalOpts,
) -> Result<(), CliError> {
    match args.command {
        PortsCommand::List => {
            let snap = util::fetch_snapshot(config).await?;
            let views = snap.port_tree();
            let out = output::render_list(
                &global.output,
                &views,
                |v| PortRow::from(v),
                |v| format!("{} {}", v.id, if v.power { "on" } else { "off" }),
            )?;
            output::print_output(&out, global.quiet);
            Ok(())
        }

        PortsCommand::Power { port, state } => {
            let quiet = global.quiet;
            let yes = global.yes;
            Engine::oneshot(config, |engine| async move {
                util::require_loaded(&engine)?;
                engine.refresh().await?;

                let snap = engine.snapshot();
                let current = snap
                    .config
                    .port(port)
                    .ok_or(CliError::UnknownPort { port })?
                    .power;
                let wanted = state.map_or(!current, |s| s == PowerState::On);
                if wanted == current {
                    if !quiet {
                        eprintln!("Port {port} is already {}", if current { "on" } else { "off" });
                    }
                    return Ok(());
                }

                let in_use = snap
                    .port_tree()
                    .iter()
                    .find(|v| v.id == port)
                    .is_some_and(|v| !v.devices().is_empty());
                if current
                    && in_use
                    && !util::confirm(
                        &format!("Power off port {port}? Attached devices will disconnect."),
                        yes,
                    )?
                {
                    return Ok(());
                }

                engine.toggle_port_power(port).await?;
                if !quiet {
                    eprintln!("Port {port} powered {}", if wanted { "on" } else { "off" });
                }
                Ok(())
            })
            .await
        }
    }
}
