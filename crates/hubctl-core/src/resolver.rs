// ── Live-Status Resolver ──
//
// Interface names are volatile (`eth0` on one image, `enp3s0` on the
// next), so live status is looked up by category: each category carries
// ordered name patterns and the first interface in snapshot order that
// matches any of them wins.

use std::sync::LazyLock;

use regex::Regex;
use serde::{Deserialize, Serialize};
use strum::{Display, EnumIter, EnumString};

use crate::model::{InterfaceAddresses, InterfaceSnapshot, SubsystemKind};

/// Logical network categories that live status is reported for.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    Serialize,
    Deserialize,
    Display,
    EnumString,
    EnumIter,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase", ascii_case_insensitive)]
pub enum Category {
    Ethernet,
    Wifi,
    Wireguard,
    Tailscale,
}

impl From<SubsystemKind> for Category {
    fn from(kind: SubsystemKind) -> Self {
        match kind {
            SubsystemKind::Ethernet => Self::Ethernet,
            SubsystemKind::Wifi => Self::Wifi,
            SubsystemKind::Wireguard => Self::Wireguard,
            SubsystemKind::Tailscale => Self::Tailscale,
        }
    }
}

/// Compile one of the built-in interface patterns.
fn compile(pattern: &str) -> Regex {
    match Regex::new(pattern) {
        Ok(re) => re,
        Err(_) => unreachable!("static regex pattern"),
    }
}

static STANDARD: LazyLock<Resolver> = LazyLock::new(|| {
    Resolver::new(vec![
        (
            Category::Ethernet,
            vec![compile(r"^eth\d"), compile(r"^en[opsx]?\d"), compile(r"^en\d")],
        ),
        (
            Category::Wifi,
            vec![compile(r"^wlan\d"), compile(r"^wlp\d"), compile(r"^wl\d")],
        ),
        (Category::Wireguard, vec![compile(r"^wg\d")]),
        (Category::Tailscale, vec![compile(r"^tailscale")]),
    ])
});

/// First entry of `snapshot`, in snapshot order, whose name matches any
/// of `patterns`.
pub fn resolve_with<'a>(
    patterns: &[Regex],
    snapshot: &'a InterfaceSnapshot,
) -> Option<(&'a str, &'a InterfaceAddresses)> {
    snapshot
        .iter()
        .find(|(name, _)| patterns.iter().any(|re| re.is_match(name)))
}

/// Per-category pattern rules.
#[derive(Debug, Clone)]
pub struct Resolver {
    rules: Vec<(Category, Vec<Regex>)>,
}

impl Default for Resolver {
    fn default() -> Self {
        STANDARD.clone()
    }
}

impl Resolver {
    /// The built-in rules, shared.
    pub fn standard() -> &'static Resolver {
        &STANDARD
    }

    /// Custom rules. Categories without a rule never resolve.
    pub fn new(rules: Vec<(Category, Vec<Regex>)>) -> Self {
        Self { rules }
    }

    fn patterns(&self, category: Category) -> &[Regex] {
        match self.rules.iter().find(|(c, _)| *c == category) {
            Some((_, patterns)) => patterns,
            None => &[],
        }
    }

    pub fn resolve<'a>(
        &self,
        category: Category,
        snapshot: &'a InterfaceSnapshot,
    ) -> Option<(&'a str, &'a InterfaceAddresses)> {
        resolve_with(self.patterns(category), snapshot)
    }

    /// Resolved AND carrying at least one IPv4 address.
    pub fn has_live_address(&self, category: Category, snapshot: &InterfaceSnapshot) -> bool {
        self.resolve(category, snapshot)
            .is_some_and(|(_, addrs)| !addrs.ipv4.is_empty())
    }

    /// Display summary for one category, if any interface matches.
    pub fn live_status(
        &self,
        category: Category,
        snapshot: &InterfaceSnapshot,
    ) -> Option<LiveStatus> {
        self.resolve(category, snapshot)
            .map(|(name, addrs)| LiveStatus {
                category,
                interface: name.to_owned(),
                hardware_address: addrs.hardware_address.clone(),
                ipv4: addrs.ipv4.clone(),
                ipv6: addrs.ipv6.clone(),
            })
    }
}

/// Resolved interface for one category.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LiveStatus {
    pub category: Category,
    pub interface: String,
    pub hardware_address: String,
    pub ipv4: Vec<String>,
    pub ipv6: Vec<String>,
}

impl LiveStatus {
    pub const NO_ADDRESS: &'static str = "no address";

    pub fn has_live_address(&self) -> bool {
        !self.ipv4.is_empty()
    }

    /// IPv4 addresses joined with ` · `, or a fallback label.
    pub fn address_summary(&self) -> String {
        if self.ipv4.is_empty() {
            Self::NO_ADDRESS.to_owned()
        } else {
            self.ipv4.join(" · ")
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn iface(ipv4: &[&str], mac: &str) -> InterfaceAddresses {
        InterfaceAddresses {
            ipv4: ipv4.iter().map(|s| (*s).to_owned()).collect(),
            ipv6: Vec::new(),
            hardware_address: mac.into(),
        }
    }

    fn snapshot(entries: &[(&str, InterfaceAddresses)]) -> InterfaceSnapshot {
        entries
            .iter()
            .map(|(n, a)| ((*n).to_owned(), a.clone()))
            .collect()
    }

    #[test]
    fn resolves_single_pattern() {
        let snap = snapshot(&[("eth0", iface(&["10.0.0.2"], "aa:bb"))]);
        let (name, addrs) = resolve_with(&[compile(r"^eth\d")], &snap).unwrap();
        assert_eq!(name, "eth0");
        assert_eq!(addrs.hardware_address, "aa:bb");
    }

    #[test]
    fn empty_snapshot_resolves_nothing() {
        let r = Resolver::default();
        let snap = InterfaceSnapshot::default();
        assert!(r.resolve(Category::Ethernet, &snap).is_none());
        assert!(!r.has_live_address(Category::Ethernet, &snap));
    }

    #[test]
    fn first_match_in_snapshot_order_wins() {
        let snap = snapshot(&[
            ("lo", iface(&["127.0.0.1"], "")),
            ("enp3s0", iface(&[], "11:11")),
            ("eth0", iface(&["10.0.0.2"], "22:22")),
        ]);
        let r = Resolver::default();
        let (name, _) = r.resolve(Category::Ethernet, &snap).unwrap();
        assert_eq!(name, "enp3s0");
        // Resolved, but without IPv4 it is not live.
        assert!(!r.has_live_address(Category::Ethernet, &snap));
    }

    #[test]
    fn default_rules_cover_each_category() {
        let snap = snapshot(&[
            ("wlp2s0", iface(&["192.168.1.143"], "")),
            ("wg0", iface(&["10.0.0.5"], "")),
            ("tailscale0", iface(&["100.64.0.1", "100.64.0.2"], "")),
        ]);
        let r = Resolver::default();
        assert!(r.has_live_address(Category::Wifi, &snap));
        assert!(r.has_live_address(Category::Wireguard, &snap));
        let ts = r.live_status(Category::Tailscale, &snap).unwrap();
        assert_eq!(ts.address_summary(), "100.64.0.1 · 100.64.0.2");
        assert!(r.live_status(Category::Ethernet, &snap).is_none());
    }

    #[test]
    fn summary_falls_back_without_ipv4() {
        let snap = snapshot(&[("wg0", iface(&[], ""))]);
        let status = Resolver::default()
            .live_status(Category::Wireguard, &snap)
            .unwrap();
        assert!(!status.has_live_address());
        assert_eq!(status.address_summary(), LiveStatus::NO_ADDRESS);
    }

    #[test]
    fn custom_rules_replace_defaults() {
        let r = Resolver::new(vec![(Category::Ethernet, vec![compile(r"^lan")])]);
        let snap = snapshot(&[
            ("eth0", iface(&["1.2.3.4"], "")),
            ("lan1", iface(&["5.6.7.8"], "")),
        ]);
        assert_eq!(r.resolve(Category::Ethernet, &snap).unwrap().0, "lan1");
        assert!(r.resolve(Category::Wifi, &snap).is_none());
    }
}
