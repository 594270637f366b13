//! Hub overview.

use std::fmt::Write;

use strum::IntoEnumIterator;

use hubctl_core::{Category, DeviceNode, EngineConfig, EngineSnapshot, PortState, SubsystemKind};

use crate::cli::GlobalOpts;
use crate::error::CliError;
use crate::output;

use super::util;

fn subsystem_for(category: Category) -> SubsystemKind {
    match category {
        Category::Ethernet => SubsystemKind::Ethernet,
        Category::Wifi => SubsystemKind::Wifi,
        Category::Wireguard => SubsystemKind::Wireguard,
        Category::Tailscale => SubsystemKind::Tailscale,
    }
}

fn port_summary(snap: &EngineSnapshot, color: bool) -> Vec<String> {
    snap.port_tree()
        .iter()
        .map(|view| {
            let state = match &view.state {
                PortState::PowerDisabled => output::status_word("off", false, color),
                PortState::Empty => output::status_word("on, empty", true, color),
                PortState::Populated(nodes) => {
                    let count: usize = nodes.iter().map(DeviceNode::count).sum();
                    let noun = if count == 1 { "device" } else { "devices" };
                    output::status_word(&format!("on, {count} {noun}"), true, color)
                }
            };
            format!("  port {}  {state}", view.id)
        })
        .collect()
}

fn network_summary(snap: &EngineSnapshot, color: bool) -> Vec<String> {
    Category::iter()
        .map(|category| {
            let kind = subsystem_for(category);
            let (iface, addr, live) = match snap.live_status(category) {
                Some(status) => (
                    status.interface.clone(),
                    status.address_summary(),
                    status.has_live_address(),
                ),
                None => ("-".into(), "no interface".into(), false),
            };
            let mut line = format!(
                "  {:<10} {:<12} {}",
                category.to_string(),
                iface,
                output::status_word(&addr, live, color)
            );
            if snap.config.is_blocked(kind) {
                line.push_str("  (blocked)");
            }
            line
        })
        .collect()
}

pub(crate) fn detail(snap: &EngineSnapshot, color: bool) -> String {
    let mut out = String::new();
    if !snap.config_loaded {
        let _ = writeln!(
            out,
            "{}",
            output::warning("Agent settings not loaded; showing defaults", color)
        );
    }
    let rate = snap.latest_throughput();
    let _ = writeln!(out, "Agent:      {}", snap.agent_version);
    let _ = writeln!(out, "Uptime:     {}", snap.metrics.uptime);
    let _ = writeln!(out, "CPU / RAM:  {}% / {}%", snap.metrics.cpu, snap.metrics.ram);
    let _ = writeln!(out, "Throughput: rx {:.2} MB/s  tx {:.2} MB/s", rate.rx, rate.tx);
    let _ = writeln!(out, "Ports:");
    for line in port_summary(snap, color) {
        let _ = writeln!(out, "{line}");
    }
    let _ = writeln!(out, "Network:");
    for line in network_summary(snap, color) {
        let _ = writeln!(out, "{line}");
    }
    if !snap.notifications.is_empty() {
        let _ = writeln!(out, "Notifications:");
        for n in &snap.notifications {
            let _ = writeln!(out, "  {}", output::warning(&n.message, color));
        }
    }
    out.trim_end().to_owned()
}

pub async fn handle(config: EngineConfig, global: &GlobalOpts) -> Result<(), CliError> {
    let snap = util::fetch_snapshot(config).await?;
    let color = output::should_color(&global.color);
    let out = output::render_single(
        &global.output,
        snap.as_ref(),
        |s| detail(s, color),
        |s| s.agent_version.clone(),
    )?;
    output::print_output(&out, global.quiet);
    Ok(())
}
