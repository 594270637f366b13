//! Clap derive structures for the `hubctl` CLI.
//!
//! Defines the complete command tree, global flags, and shared types.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand, ValueEnum};

// ── Top-Level CLI ────────────────────────────────────────────────────

/// hubctl -- console for USB-over-IP hubs
#[derive(Debug, Parser)]
#[command(
    name = "hubctl",
    version,
    about = "Manage a USB-over-IP hub from the command line",
    long_about = "Inspect and configure a USB-over-IP hub through its agent.\n\n\
        Shows port power and attached devices, live network status and host\n\
        metrics, and edits Ethernet, WiFi, WireGuard and Tailscale settings.",
    propagate_version = true,
    subcommand_required = true,
    arg_required_else_help = true
)]
pub struct Cli {
    #[command(flatten)]
    pub global: GlobalOpts,

    #[command(subcommand)]
    pub command: Command,
}

// ── Global Options ───────────────────────────────────────────────────

#[derive(Debug, Args)]
pub struct GlobalOpts {
    /// Agent profile to use
    #[arg(long, short = 'p', env = "HUBCTL_PROFILE", global = true)]
    pub profile: Option<String>,

    /// Agent URL (overrides profile)
    #[arg(long, short = 'a', env = "HUBCTL_AGENT", global = true)]
    pub agent: Option<String>,

    /// Output format
    #[arg(
        long,
        short = 'o',
        env = "HUBCTL_OUTPUT",
        default_value = "table",
        global = true
    )]
    pub output: OutputFormat,

    /// When to use color output
    #[arg(long, default_value = "auto", global = true)]
    pub color: ColorMode,

    /// Increase verbosity (-v, -vv, -vvv)
    #[arg(long, short = 'v', action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Log line format on stderr
    #[arg(long, default_value = "text", global = true)]
    pub log_format: LogFormat,

    /// Suppress non-error output
    #[arg(long, short = 'q', global = true)]
    pub quiet: bool,

    /// Skip confirmation prompts
    #[arg(long, short = 'y', global = true)]
    pub yes: bool,

    /// Accept self-signed TLS certificates
    #[arg(long, short = 'k', env = "HUBCTL_INSECURE", global = true)]
    pub insecure: bool,

    /// Request timeout in seconds (overrides profile)
    #[arg(long, env = "HUBCTL_TIMEOUT", global = true)]
    pub timeout: Option<u64>,
}

// ── Output & Color Enums ─────────────────────────────────────────────

#[derive(Debug, Clone, ValueEnum)]
pub enum OutputFormat {
    /// Pretty table (default, interactive)
    Table,
    /// Pretty-printed JSON
    Json,
    /// Compact single-line JSON
    JsonCompact,
    /// YAML
    Yaml,
    /// Plain text, one value per line (scripting)
    Plain,
}

#[derive(Debug, Clone, ValueEnum)]
pub enum ColorMode {
    /// Auto-detect (color if terminal is interactive)
    Auto,
    /// Always emit color codes
    Always,
    /// Never emit color codes
    Never,
}

#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum LogFormat {
    /// Human-readable lines
    Text,
    /// One JSON object per line
    Json,
}

// ── Domain value enums ───────────────────────────────────────────────

/// A configurable network subsystem.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum SubsystemArg {
    #[value(alias = "eth")]
    Ethernet,
    Wifi,
    #[value(alias = "wg")]
    Wireguard,
    #[value(alias = "ts")]
    Tailscale,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum ModeArg {
    Dhcp,
    Static,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum SecurityArg {
    Wpa2,
    Wpa,
    Open,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum PowerState {
    On,
    Off,
}

// ── Top-Level Command Enum ───────────────────────────────────────────

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Show hub overview: ports, network status and host metrics
    #[command(alias = "st")]
    Status,

    /// Inspect and power USB ports
    Ports(PortsArgs),

    /// Show live address status for each network category
    #[command(alias = "if")]
    Interfaces,

    /// Show or edit network settings
    #[command(alias = "net")]
    Settings(SettingsArgs),

    /// Enable or disable a network subsystem
    Toggle {
        /// Subsystem to toggle (wifi, wireguard, tailscale)
        subsystem: SubsystemArg,
    },

    /// Scan for nearby WiFi networks
    Scan,

    /// Follow live status until interrupted
    #[command(alias = "w")]
    Watch(WatchArgs),

    /// Manage CLI configuration and profiles
    Config(ConfigArgs),

    /// Generate shell completions
    Completions(CompletionsArgs),
}

// ── Ports ────────────────────────────────────────────────────────────

#[derive(Debug, Args)]
pub struct PortsArgs {
    #[command(subcommand)]
    pub command: PortsCommand,
}

#[derive(Debug, Subcommand)]
pub enum PortsCommand {
    /// List ports with their attached device tree
    #[command(alias = "ls")]
    List,

    /// Switch a port's power
    Power {
        /// Port number (1-4)
        port: u8,

        /// Desired state; flips the current state when omitted
        state: Option<PowerState>,
    },
}

// ── Settings ─────────────────────────────────────────────────────────

#[derive(Debug, Args)]
pub struct SettingsArgs {
    #[command(subcommand)]
    pub command: SettingsCommand,
}

#[derive(Debug, Subcommand)]
pub enum SettingsCommand {
    /// Show confirmed settings
    Show {
        /// Limit output to one subsystem
        subsystem: Option<SubsystemArg>,
    },

    /// Edit and apply settings for one subsystem
    #[command(subcommand)]
    Set(SetCommand),
}

#[derive(Debug, Subcommand)]
pub enum SetCommand {
    /// Wired interface addressing
    #[command(alias = "eth")]
    Ethernet {
        #[arg(long)]
        mode: Option<ModeArg>,
        #[arg(long)]
        ip: Option<String>,
        #[arg(long)]
        mask: Option<String>,
        #[arg(long)]
        gateway: Option<String>,
        #[arg(long)]
        dns: Option<String>,
    },

    /// WiFi client credentials
    Wifi {
        /// Network name
        #[arg(long, conflicts_with = "scan")]
        ssid: Option<String>,

        /// Pick the network from a fresh scan
        #[arg(long)]
        scan: bool,

        #[arg(long)]
        security: Option<SecurityArg>,

        #[arg(long)]
        ip: Option<String>,

        /// Prompt for the passphrase
        #[arg(long)]
        password: bool,
    },

    /// WireGuard tunnel configuration
    #[command(alias = "wg")]
    Wireguard {
        /// Read the wg-quick style config from this file
        #[arg(long)]
        config_file: PathBuf,
    },

    /// Tailscale login settings
    #[command(alias = "ts")]
    Tailscale {
        /// Prompt for a pre-auth key
        #[arg(long)]
        preauthkey: bool,

        /// Advertise this hub as an exit node
        #[arg(long)]
        exit_node: Option<bool>,

        /// Control server URL
        #[arg(long)]
        server_url: Option<String>,
    },
}

// ── Watch ────────────────────────────────────────────────────────────

#[derive(Debug, Args)]
pub struct WatchArgs {
    /// Stop after this many updates
    #[arg(long, short = 'n')]
    pub count: Option<usize>,
}

// ── Config ───────────────────────────────────────────────────────────

#[derive(Debug, Args)]
pub struct ConfigArgs {
    #[command(subcommand)]
    pub command: ConfigCommand,
}

#[derive(Debug, Subcommand)]
pub enum ConfigCommand {
    /// Create initial config file with guided setup
    Init,

    /// Display current resolved configuration
    Show,

    /// Set a configuration value on the active profile
    Set {
        /// Config key (agent, insecure, timeout)
        key: String,

        /// Value to set
        value: String,
    },

    /// List configured profiles
    Profiles,

    /// Set the default profile
    Use {
        /// Profile name to set as default
        name: String,
    },
}

// ── Completions ──────────────────────────────────────────────────────

#[derive(Debug, Args)]
pub struct CompletionsArgs {
    /// Shell to generate completions for
    pub shell: clap_complete::Shell,
}
