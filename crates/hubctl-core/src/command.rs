// ── Command API ──
//
// User intents flow through the owner task's channel in the order they
// were issued, so an `Apply` always sees the drafts produced by the
// `BeginEdit` / `UpdateDraft` calls before it.

use hubctl_api::ConfigDocument;

use crate::error::CoreError;
use crate::model::SubsystemKind;

pub use crate::store::DraftPatch;

/// A command envelope sent through the owner's channel.
/// Contains the command and a oneshot response channel.
pub(crate) struct CommandEnvelope {
    pub command: Command,
    pub response_tx: tokio::sync::oneshot::Sender<Result<CommandResult, CoreError>>,
}

/// Every state change a caller can request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    // ── Edit sessions ───────────────────────────────────────────────
    BeginEdit { kind: SubsystemKind },
    CancelEdit { kind: SubsystemKind },
    UpdateDraft(DraftPatch),
    Apply { kind: SubsystemKind },

    // ── Immediate toggles ───────────────────────────────────────────
    ToggleEnabled { kind: SubsystemKind },
    TogglePortPower { port: u8 },

    // ── Notifications ───────────────────────────────────────────────
    DismissNotification { id: u64 },

    // ── WiFi ────────────────────────────────────────────────────────
    /// Re-run the network scan. Requires an open WiFi session.
    RescanWifi,

    /// No-op barrier: resolves once every earlier message was applied.
    Sync,
}

/// Result of a successfully executed command.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CommandResult {
    Ok,
    /// State changed and this document was queued for the agent.
    Persisting(ConfigDocument),
    Dismissed { removed: bool },
}
