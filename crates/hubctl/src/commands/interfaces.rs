//! Live network status per configuration category.

use serde::Serialize;
use strum::IntoEnumIterator;
use tabled::Tabled;

use hubctl_core::{Category, EngineConfig, LiveStatus};

use crate::cli::GlobalOpts;
use crate::error::CliError;
use crate::output;

use super::util;

#[derive(Serialize)]
struct CategoryStatus {
    category: Category,
    live: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    status: Option<LiveStatus>,
}

#[derive(Tabled)]
struct InterfaceRow {
    #[tabled(rename = "Category")]
    category: String,
    #[tabled(rename = "Interface")]
    interface: String,
    #[tabled(rename = "MAC")]
    mac: String,
    #[tabled(rename = "IPv4")]
    ipv4: String,
    #[tabled(rename = "IPv6")]
    ipv6: String,
}

impl From<&CategoryStatus> for InterfaceRow {
    fn from(entry: &CategoryStatus) -> Self {
        let category = entry.category.to_string();
        match &entry.status {
            Some(s) => Self {
                category,
                interface: s.interface.clone(),
                mac: if s.hardware_address.is_empty() {
                    "-".into()
                } else {
                    s.hardware_address.clone()
                },
                ipv4: s.address_summary(),
                ipv6: if s.ipv6.is_empty() {
                    "-".into()
                } else {
                    s.ipv6.join("\n")
                },
            },
            None => Self {
                category,
                interface: "-".into(),
                mac: "-".into(),
                ipv4: LiveStatus::NO_ADDRESS.into(),
                ipv6: "-".into(),
            },
        }
    }
}

pub async fn handle(config: EngineConfig, global: &GlobalOpts) -> Result<(), CliError> {
    let snap = util::fetch_snapshot(config).await?;
    let entries: Vec<CategoryStatus> = Category::iter()
        .map(|category| {
            let status = snap.live_status(category);
            CategoryStatus {
                category,
                live: status.as_ref().is_some_and(LiveStatus::has_live_address),
                status,
            }
        })
        .collect();

    let out = output::render_list(
        &global.output,
        &entries,
        |e| InterfaceRow::from(e),
        |e| {
            format!(
                "{} {}",
                e.category,
                e.status.as_ref().map_or("-", |s| s.interface.as_str())
            )
        },
    )?;
    output::print_output(&out, global.quiet);
    Ok(())
}
