//! Live status follower.
//!
//! Runs the engine with its pollers and prints one summary line per
//! second, plus agent-reported failures as they arrive.

use std::collections::HashSet;
use std::time::Duration;

use serde::Serialize;

use hubctl_core::{Engine, EngineConfig, EngineSnapshot};

use crate::cli::{GlobalOpts, OutputFormat, WatchArgs};
use crate::error::CliError;
use crate::output;

const TICK: Duration = Duration::from_secs(1);

#[derive(Serialize)]
struct WatchLine<'a> {
    time: String,
    rx: f64,
    tx: f64,
    cpu: u32,
    ram: u32,
    devices: usize,
    notifications: Vec<&'a str>,
}

fn line(snap: &EngineSnapshot) -> WatchLine<'_> {
    let rate = snap.latest_throughput();
    WatchLine {
        time: chrono::Local::now().format("%H:%M:%S").to_string(),
        rx: rate.rx,
        tx: rate.tx,
        cpu: snap.metrics.cpu,
        ram: snap.metrics.ram,
        devices: snap.devices.len(),
        notifications: snap.notifications.iter().map(|n| n.message.as_str()).collect(),
    }
}

fn render(format: &OutputFormat, snap: &EngineSnapshot) -> Result<String, CliError> {
    let l = line(snap);
    match format {
        OutputFormat::Table | OutputFormat::Plain => Ok(format!(
            "{}  rx {:>7.2}  tx {:>7.2}  cpu {:>3}%  ram {:>3}%  devices {}",
            l.time, l.rx, l.tx, l.cpu, l.ram, l.devices
        )),
        OutputFormat::Json | OutputFormat::JsonCompact | OutputFormat::Yaml => {
            output::render_json(&l, true)
        }
    }
}

pub async fn handle(
    config: EngineConfig,
    args: WatchArgs,
    global: &GlobalOpts,
) -> Result<(), CliError> {
    let engine = Engine::new(config)?;
    engine.start().await?;

    let color = output::should_color(&global.color);
    let mut stream = engine.subscribe();
    let mut ticker = tokio::time::interval(TICK);
    let mut seen: HashSet<u64> = HashSet::new();
    let mut printed = 0usize;

    let result = loop {
        tokio::select! {
            _ = tokio::signal::ctrl_c() => break Ok(()),

            _ = ticker.tick() => {
                let snap = stream.latest();
                match render(&global.output, &snap) {
                    Ok(text) => output::print_output(&text, global.quiet),
                    Err(e) => break Err(e),
                }
                printed += 1;
                if args.count.is_some_and(|n| printed >= n) {
                    break Ok(());
                }
            }

            changed = stream.changed() => {
                let Some(snap) = changed else { break Ok(()) };
                for n in &snap.notifications {
                    if seen.insert(n.id) && !global.quiet {
                        eprintln!("{}", output::warning(&format!("! {}", n.message), color));
                    }
                }
            }
        }
    };

    engine.shutdown().await;
    result
}
