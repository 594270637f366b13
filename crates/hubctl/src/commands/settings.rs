//! Network settings: show, edit-and-apply, toggle.

use std::fmt::Write;
use std::sync::Arc;
use std::time::Duration;

use dialoguer::Select;

use hubctl_core::{
    ConfigStore, DraftPatch, Engine, EngineConfig, EngineSnapshot, EthernetPatch, NetworkMode,
    SubsystemKind, TailscalePatch, WifiNetwork, WifiPatch, WifiSecurity, WireguardPatch,
};

use crate::cli::{
    GlobalOpts, ModeArg, SecurityArg, SetCommand, SettingsArgs, SettingsCommand, SubsystemArg,
};
use crate::error::CliError;
use crate::output;

use super::{scan, util};

/// How long `set wifi --scan` waits for the hub's radio.
const SCAN_TIMEOUT: Duration = Duration::from_secs(30);

// ── Argument conversions ────────────────────────────────────────────

impl From<SubsystemArg> for SubsystemKind {
    fn from(arg: SubsystemArg) -> Self {
        match arg {
            SubsystemArg::Ethernet => Self::Ethernet,
            SubsystemArg::Wifi => Self::Wifi,
            SubsystemArg::Wireguard => Self::Wireguard,
            SubsystemArg::Tailscale => Self::Tailscale,
        }
    }
}

impl From<ModeArg> for NetworkMode {
    fn from(arg: ModeArg) -> Self {
        match arg {
            ModeArg::Dhcp => Self::Dhcp,
            ModeArg::Static => Self::Static,
        }
    }
}

impl From<SecurityArg> for WifiSecurity {
    fn from(arg: SecurityArg) -> Self {
        match arg {
            SecurityArg::Wpa2 => Self::Wpa2,
            SecurityArg::Wpa => Self::Wpa,
            SecurityArg::Open => Self::Open,
        }
    }
}

// ── Detail views ────────────────────────────────────────────────────

fn flag(on: bool) -> &'static str {
    if on { "enabled" } else { "disabled" }
}

fn opt(value: Option<&str>) -> &str {
    match value {
        Some(v) if !v.is_empty() => v,
        _ => "-",
    }
}

fn secret(value: Option<&str>) -> &'static str {
    if value.is_some_and(|v| !v.is_empty()) {
        "****"
    } else {
        "-"
    }
}

fn section(out: &mut String, store: &ConfigStore, kind: SubsystemKind) {
    let mut heading = kind.to_string();
    if store.is_blocked(kind) {
        heading.push_str(" (blocked)");
    }
    let _ = writeln!(out, "[{heading}]");

    match kind {
        SubsystemKind::Ethernet => {
            let c = store.ethernet().confirmed();
            let _ = writeln!(out, "mode     {}", c.mode);
            let _ = writeln!(out, "ip       {}", opt(c.ip.as_deref()));
            let _ = writeln!(out, "mask     {}", opt(c.mask.as_deref()));
            let _ = writeln!(out, "gateway  {}", opt(c.gateway.as_deref()));
            let _ = writeln!(out, "dns      {}", opt(c.dns.as_deref()));
        }
        SubsystemKind::Wifi => {
            let c = store.wifi().confirmed();
            let _ = writeln!(out, "state    {}", flag(c.enabled));
            let _ = writeln!(out, "ssid     {}", opt(c.ssid.as_deref()));
            let _ = writeln!(out, "security {}", c.effective_security());
            let _ = writeln!(out, "password {}", secret(c.password.as_deref()));
            let _ = writeln!(out, "ip       {}", opt(c.ip.as_deref()));
        }
        SubsystemKind::Wireguard => {
            let c = store.wireguard().confirmed();
            let lines = c.config.as_deref().map_or(0, |s| s.lines().count());
            let _ = writeln!(out, "state    {} ({})", flag(c.enabled), c.status);
            let _ = writeln!(out, "config   {lines} lines");
        }
        SubsystemKind::Tailscale => {
            let c = store.tailscale().confirmed();
            let _ = writeln!(out, "state    {} ({})", flag(c.enabled), c.status);
            let _ = writeln!(out, "server   {}", opt(c.server_url.as_deref()));
            let _ = writeln!(out, "exitnode {}", c.exit_node.unwrap_or(false));
            let _ = writeln!(out, "authkey  {}", secret(c.preauthkey.as_deref()));
        }
    }
}

fn detail(snap: &EngineSnapshot, only: Option<SubsystemKind>) -> String {
    let mut out = String::new();
    if !snap.config_loaded {
        let _ = writeln!(out, "# agent settings not loaded; showing defaults\n");
    }
    let kinds = [
        SubsystemKind::Ethernet,
        SubsystemKind::Wifi,
        SubsystemKind::Wireguard,
        SubsystemKind::Tailscale,
    ];
    for kind in kinds.into_iter().filter(|k| only.is_none_or(|o| o == *k)) {
        section(&mut out, &snap.config, kind);
        out.push('\n');
    }
    out.trim_end().to_owned()
}

/// Structured view of one subsystem, or the whole store.
fn structured(
    store: &ConfigStore,
    only: Option<SubsystemKind>,
) -> Result<serde_json::Value, CliError> {
    let value = match only {
        None => serde_json::to_value(store),
        Some(SubsystemKind::Ethernet) => serde_json::to_value(store.ethernet()),
        Some(SubsystemKind::Wifi) => serde_json::to_value(store.wifi()),
        Some(SubsystemKind::Wireguard) => serde_json::to_value(store.wireguard()),
        Some(SubsystemKind::Tailscale) => serde_json::to_value(store.tailscale()),
    };
    value.map_err(|e| CliError::Render(e.to_string()))
}

// ── Edit flows ──────────────────────────────────────────────────────

/// Open a session, stage `patch`, and apply it. The session is closed
/// again if the apply is rejected.
async fn stage_and_apply(engine: &Engine, patch: DraftPatch) -> Result<(), CliError> {
    let kind = patch.kind();
    engine.begin_edit(kind).await?;
    engine.update_draft(patch).await?;
    if let Err(e) = engine.apply(kind).await {
        let _ = engine.cancel_edit(kind).await;
        return Err(e.into());
    }
    Ok(())
}

/// Wait until the session-triggered scan has finished.
async fn scanned_networks(engine: &Engine, quiet: bool) -> Result<Vec<WifiNetwork>, CliError> {
    let bar = util::spinner("Scanning for WiFi networks", quiet);
    let mut stream = engine.subscribe();
    let result = tokio::time::timeout(SCAN_TIMEOUT, async {
        let mut snap: Arc<EngineSnapshot> = stream.latest();
        while snap.wifi_scanning {
            match stream.changed().await {
                Some(next) => snap = next,
                None => break,
            }
        }
        snap.wifi_networks.clone()
    })
    .await;
    bar.finish_and_clear();

    let networks = result.map_err(|_| CliError::Timeout {
        seconds: SCAN_TIMEOUT.as_secs(),
    })?;
    if networks.is_empty() {
        return Err(CliError::Validation {
            field: "scan".into(),
            reason: "no WiFi networks found".into(),
        });
    }
    Ok(networks)
}

fn pick_network(networks: &[WifiNetwork]) -> Result<&WifiNetwork, CliError> {
    let items: Vec<String> = networks
        .iter()
        .map(|n| format!("{:<32} {} {}", n.ssid, scan::bars(n), n.security))
        .collect();
    let index = Select::new()
        .with_prompt("Network")
        .items(&items)
        .default(0)
        .interact()
        .map_err(util::prompt_err)?;
    networks.get(index).ok_or_else(|| CliError::Validation {
        field: "network".into(),
        reason: "selection out of range".into(),
    })
}

async fn set_wifi_from_scan(
    engine: &Engine,
    ip: Option<String>,
    quiet: bool,
) -> Result<(), CliError> {
    let kind = SubsystemKind::Wifi;
    engine.begin_edit(kind).await?;

    let chosen = match scanned_networks(engine, quiet).await {
        Ok(networks) => pick_network(&networks).cloned(),
        Err(e) => Err(e),
    };
    let network = match chosen {
        Ok(n) => n,
        Err(e) => {
            let _ = engine.cancel_edit(kind).await;
            return Err(e);
        }
    };

    let mut patch = WifiPatch::select_network(&network);
    patch.ip = ip;
    if network.security.requires_password() {
        patch.password = Some(util::prompt_secret("Passphrase: ", "password")?);
    }
    engine.update_draft(DraftPatch::Wifi(patch)).await?;
    if let Err(e) = engine.apply(kind).await {
        let _ = engine.cancel_edit(kind).await;
        return Err(e.into());
    }
    Ok(())
}

fn build_patch(cmd: SetCommand) -> Result<DraftPatch, CliError> {
    Ok(match cmd {
        SetCommand::Ethernet {
            mode,
            ip,
            mask,
            gateway,
            dns,
        } => DraftPatch::Ethernet(EthernetPatch {
            mode: mode.map(Into::into),
            ip,
            mask,
            gateway,
            dns,
        }),
        SetCommand::Wifi {
            ssid,
            security,
            ip,
            password,
            scan: _,
        } => DraftPatch::Wifi(WifiPatch {
            ssid,
            password: if password {
                Some(util::prompt_secret("Passphrase: ", "password")?)
            } else {
                None
            },
            ip,
            security: security.map(Into::into),
        }),
        SetCommand::Wireguard { config_file } => {
            let contents = std::fs::read_to_string(&config_file)?;
            if !contents.contains("[Interface]") {
                return Err(CliError::Validation {
                    field: "config-file".into(),
                    reason: format!("{} has no [Interface] section", config_file.display()),
                });
            }
            DraftPatch::Wireguard(WireguardPatch {
                config: Some(contents),
            })
        }
        SetCommand::Tailscale {
            preauthkey,
            exit_node,
            server_url,
        } => DraftPatch::Tailscale(TailscalePatch {
            preauthkey: if preauthkey {
                Some(util::prompt_secret("Pre-auth key: ", "preauthkey")?)
            } else {
                None
            },
            exit_node,
            server_url,
        }),
    })
}

// ── Handlers ────────────────────────────────────────────────────────

pub async fn handle(
    config: EngineConfig,
    args: SettingsArgs,
    global: &GlobalOpts,
) -> Result<(), CliError> {
    match args.command {
        SettingsCommand::Show { subsystem } => {
            let only = subsystem.map(SubsystemKind::from);
            let snap = Engine::oneshot(config, |engine| async move {
                Ok::<_, CliError>(engine.snapshot())
            })
            .await?;
            let value = structured(&snap.config, only)?;
            let out = output::render_single(
                &global.output,
                &value,
                |_| detail(&snap, only),
                |_| snap.agent_version.clone(),
            )?;
            output::print_output(&out, global.quiet);
            Ok(())
        }

        SettingsCommand::Set(cmd) => {
            let quiet = global.quiet;
            let kind = match &cmd {
                SetCommand::Ethernet { .. } => SubsystemKind::Ethernet,
                SetCommand::Wifi { .. } => SubsystemKind::Wifi,
                SetCommand::Wireguard { .. } => SubsystemKind::Wireguard,
                SetCommand::Tailscale { .. } => SubsystemKind::Tailscale,
            };

            Engine::oneshot(config, |engine| async move {
                util::require_loaded(&engine)?;
                match cmd {
                    SetCommand::Wifi { scan: true, ip, .. } => {
                        set_wifi_from_scan(&engine, ip, quiet).await?;
                    }
                    other => stage_and_apply(&engine, build_patch(other)?).await?,
                }
                Ok::<_, CliError>(())
            })
            .await?;

            if !quiet {
                eprintln!("✓ {kind} settings applied");
            }
            Ok(())
        }
    }
}

pub async fn toggle(
    config: EngineConfig,
    subsystem: SubsystemArg,
    global: &GlobalOpts,
) -> Result<(), CliError> {
    let kind = SubsystemKind::from(subsystem);
    let yes = global.yes;

    let enabled = Engine::oneshot(config, |engine| async move {
        util::require_loaded(&engine)?;
        let snap = engine.snapshot();
        let currently = match kind {
            SubsystemKind::Wifi => snap.config.wifi().confirmed().enabled,
            SubsystemKind::Wireguard => snap.config.wireguard().confirmed().enabled,
            SubsystemKind::Tailscale => snap.config.tailscale().confirmed().enabled,
            SubsystemKind::Ethernet => false,
        };
        if currently
            && kind == SubsystemKind::Wifi
            && !util::confirm("Disable WiFi? The hub may become unreachable.", yes)?
        {
            return Ok(currently);
        }
        engine.toggle_enabled(kind).await?;
        Ok::<_, CliError>(!currently)
    })
    .await?;

    if !global.quiet {
        eprintln!("✓ {kind} {}", flag(enabled));
    }
    Ok(())
}
