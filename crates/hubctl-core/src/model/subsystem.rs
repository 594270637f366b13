// ── Configurable subsystem envelope ──
//
// Every configurable subsystem carries the same three-way state: what the
// agent last accepted, what the user is editing, and whether an
// administrator has locked it. The payload type decides what is edited.

use std::fmt;

use serde::{Deserialize, Serialize};
use strum::{Display, EnumIter, EnumString};

use crate::error::CoreError;

/// The four configurable network subsystems.
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
pub enum SubsystemKind {
    Ethernet,
    Wifi,
    Wireguard,
    Tailscale,
}

impl SubsystemKind {
    /// Whether the subsystem has an `enabled` switch that can be flipped
    /// outside an edit session.
    pub fn is_toggleable(self) -> bool {
        !matches!(self, Self::Ethernet)
    }
}

/// Per-kind payload held inside a [`Subsystem`].
pub trait SubsystemPayload: Clone + PartialEq + fmt::Debug + Send + Sync + 'static {
    /// Partial update merged into the draft.
    type Patch: Clone + fmt::Debug + Send + 'static;

    const KIND: SubsystemKind;

    /// Merge `patch` into `self`. Fields the patch leaves unset are kept.
    fn apply_patch(&mut self, patch: Self::Patch);

    /// Flip the `enabled` switch. Returns `false` (and changes nothing)
    /// when the payload has no such switch.
    fn toggle_enabled(&mut self) -> bool {
        false
    }

    /// Copy the fields touched by [`toggle_enabled`](Self::toggle_enabled)
    /// from `from`.
    fn mirror_enabled(&mut self, _from: &Self) {}
}

/// Confirmed/draft envelope for one subsystem.
///
/// `draft` is only written while an edit session is open; outside a
/// session it always equals `confirmed`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Subsystem<T> {
    confirmed: T,
    draft: T,
    blocked: bool,
    editing: bool,
}

impl<T: SubsystemPayload> Subsystem<T> {
    pub fn new(initial: T) -> Self {
        Self {
            draft: initial.clone(),
            confirmed: initial,
            blocked: false,
            editing: false,
        }
    }

    pub fn kind(&self) -> SubsystemKind {
        T::KIND
    }

    /// Last value known to be accepted by the agent.
    pub fn confirmed(&self) -> &T {
        &self.confirmed
    }

    /// Value being edited. Equals `confirmed` outside an edit session.
    pub fn draft(&self) -> &T {
        &self.draft
    }

    pub fn is_blocked(&self) -> bool {
        self.blocked
    }

    pub fn is_editing(&self) -> bool {
        self.editing
    }

    pub fn is_dirty(&self) -> bool {
        self.draft != self.confirmed
    }

    /// Replace confirmed state with what the agent reported and close any
    /// session.
    pub fn load(&mut self, confirmed: T, blocked: bool) {
        self.draft = confirmed.clone();
        self.confirmed = confirmed;
        self.blocked = blocked;
        self.editing = false;
    }

    /// Open an edit session. Re-opening an open session keeps its draft.
    pub fn begin_edit(&mut self) -> Result<(), CoreError> {
        if self.blocked {
            return Err(CoreError::Blocked { kind: T::KIND });
        }
        self.editing = true;
        Ok(())
    }

    /// Close the session and throw the draft away.
    pub fn cancel_edit(&mut self) {
        self.draft = self.confirmed.clone();
        self.editing = false;
    }

    pub fn update_draft(&mut self, patch: T::Patch) -> Result<(), CoreError> {
        if !self.editing {
            return Err(CoreError::NoEditSession { kind: T::KIND });
        }
        self.draft.apply_patch(patch);
        Ok(())
    }

    /// Promote the draft to confirmed and close the session.
    pub fn commit(&mut self) -> Result<(), CoreError> {
        if !self.is_dirty() {
            return Err(CoreError::NothingToApply { kind: T::KIND });
        }
        self.confirmed = self.draft.clone();
        self.editing = false;
        Ok(())
    }

    /// Flip `enabled` on the confirmed value, bypassing the session.
    ///
    /// An open draft receives the same flip so the toggle never shows up
    /// as a pending edit.
    pub fn toggle_enabled(&mut self) -> Result<(), CoreError> {
        if self.blocked {
            return Err(CoreError::Blocked { kind: T::KIND });
        }
        if !self.confirmed.toggle_enabled() {
            return Err(CoreError::Unsupported {
                kind: T::KIND,
                operation: "toggling",
            });
        }
        if self.editing {
            self.draft.mirror_enabled(&self.confirmed);
        } else {
            self.draft = self.confirmed.clone();
        }
        Ok(())
    }
}

impl<T: SubsystemPayload + Default> Default for Subsystem<T> {
    fn default() -> Self {
        Self::new(T::default())
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::model::{EthernetConfig, EthernetPatch, NetworkMode, WifiConfig, WifiPatch};
    use pretty_assertions::assert_eq;

    fn static_mode() -> EthernetPatch {
        EthernetPatch {
            mode: Some(NetworkMode::Static),
            ..Default::default()
        }
    }

    #[test]
    fn kind_parses_case_insensitively() {
        assert_eq!("WiFi".parse::<SubsystemKind>().unwrap(), SubsystemKind::Wifi);
        assert_eq!(SubsystemKind::Wireguard.to_string(), "wireguard");
        assert!("bluetooth".parse::<SubsystemKind>().is_err());
    }

    #[test]
    fn draft_requires_session() {
        let mut eth = Subsystem::new(EthernetConfig::default());
        let err = eth.update_draft(static_mode()).unwrap_err();
        assert!(matches!(err, CoreError::NoEditSession { .. }));
        assert!(!eth.is_dirty());
    }

    #[test]
    fn cancel_restores_confirmed() {
        let mut eth = Subsystem::new(EthernetConfig::default());
        eth.begin_edit().unwrap();
        eth.update_draft(static_mode()).unwrap();
        assert!(eth.is_dirty());

        eth.cancel_edit();
        assert_eq!(eth.draft(), eth.confirmed());
        assert!(!eth.is_editing());
    }

    #[test]
    fn commit_rejected_when_clean() {
        let mut wifi = Subsystem::new(WifiConfig::default());
        wifi.begin_edit().unwrap();
        let err = wifi.commit().unwrap_err();
        assert!(matches!(err, CoreError::NothingToApply { kind: SubsystemKind::Wifi }));
        assert!(wifi.is_editing());
    }

    #[test]
    fn commit_promotes_draft() {
        let mut wifi = Subsystem::new(WifiConfig::default());
        wifi.begin_edit().unwrap();
        wifi.update_draft(WifiPatch {
            ssid: Some("Office".into()),
            ..Default::default()
        })
        .unwrap();
        wifi.commit().unwrap();

        assert_eq!(wifi.confirmed().ssid.as_deref(), Some("Office"));
        assert!(!wifi.is_dirty());
        assert!(!wifi.is_editing());
    }

    #[test]
    fn blocked_subsystem_cannot_be_edited() {
        let mut eth = Subsystem::new(EthernetConfig::default());
        eth.load(EthernetConfig::default(), true);
        assert!(matches!(eth.begin_edit(), Err(CoreError::Blocked { .. })));
        assert!(!eth.is_editing());
    }

    #[test]
    fn toggle_mirrors_into_open_draft() {
        let mut wifi = Subsystem::new(WifiConfig::default());
        wifi.begin_edit().unwrap();
        wifi.update_draft(WifiPatch {
            ssid: Some("Office".into()),
            ..Default::default()
        })
        .unwrap();

        wifi.toggle_enabled().unwrap();
        assert!(wifi.confirmed().enabled);
        assert!(wifi.draft().enabled);
        // The pending SSID edit survives; only the switch was mirrored.
        assert_eq!(wifi.draft().ssid.as_deref(), Some("Office"));
        assert_eq!(wifi.confirmed().ssid.as_deref(), Some("Home_Network_5G"));
    }

    #[test]
    fn toggle_without_session_leaves_clean() {
        let mut wifi = Subsystem::new(WifiConfig::default());
        wifi.toggle_enabled().unwrap();
        assert!(wifi.confirmed().enabled);
        assert!(!wifi.is_dirty());
    }

    #[test]
    fn ethernet_has_no_switch() {
        let mut eth = Subsystem::new(EthernetConfig::default());
        let before = eth.clone();
        assert!(matches!(
            eth.toggle_enabled(),
            Err(CoreError::Unsupported { .. })
        ));
        assert_eq!(eth, before);
    }
}
