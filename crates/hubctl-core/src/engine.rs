// ── Engine ──
//
// Full lifecycle for one hub agent. A single owner task holds all mutable
// state; pollers and callers reach it through one channel. The owner
// never performs I/O: network calls happen in pollers (before an update),
// in the persistence bridge and in WiFi scan tasks (after one).

use std::future::Future;
use std::sync::Arc;

use hubctl_api::types::{CommandError, HostMetrics as WireMetrics, InterfaceMap, NetworkSample};
use hubctl_api::{AgentClient, ConfigDocument, TlsMode, TransportConfig, UsbDevice};
use tokio::sync::{Mutex, mpsc, oneshot, watch};
use tokio::task::{JoinHandle, JoinSet};
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use crate::command::{Command, CommandEnvelope, CommandResult, DraftPatch};
use crate::config::{EngineConfig, PollIntervals, TlsVerification};
use crate::error::CoreError;
use crate::model::{
    AttachedDevice, HostMetrics, InterfaceSnapshot, SubsystemKind, ThroughputSample, WifiNetwork,
};
use crate::poller;
use crate::snapshot::{EngineSnapshot, VERSION_UNKNOWN};
use crate::store::{ConfigStore, NotificationQueue, ThroughputHistory};
use crate::stream::SnapshotStream;

const MESSAGE_CHANNEL_SIZE: usize = 256;

// ── EngineStatus ─────────────────────────────────────────────────

/// Lifecycle state observable by consumers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EngineStatus {
    Idle,
    Running,
    Stopped,
}

// ── Owner channel messages ───────────────────────────────────────

pub(crate) enum Message {
    Update(Update),
    Command(CommandEnvelope),
}

/// Fresh external state, produced outside the owner.
pub(crate) enum Update {
    Network(ThroughputSample),
    Devices(Vec<AttachedDevice>),
    Interfaces(InterfaceSnapshot),
    Metrics(HostMetrics),
    Errors(Vec<String>),
    /// `networks` is `None` when the scan failed.
    WifiScan {
        generation: u64,
        networks: Option<Vec<WifiNetwork>>,
    },
}

// ── Engine ───────────────────────────────────────────────────────

/// The main entry point for consumers.
///
/// Cheaply cloneable via `Arc<EngineInner>`. Manages the engine
/// lifecycle: initial configuration load, background polling, command
/// routing, persistence and snapshot publishing.
#[derive(Clone)]
pub struct Engine {
    inner: Arc<EngineInner>,
}

struct EngineInner {
    config: EngineConfig,
    client: AgentClient,
    snapshot: watch::Sender<Arc<EngineSnapshot>>,
    status: watch::Sender<EngineStatus>,
    message_tx: mpsc::Sender<Message>,
    message_rx: Mutex<Option<mpsc::Receiver<Message>>>,
    cancel: CancellationToken,
    task_handles: Mutex<Vec<JoinHandle<()>>>,
}

impl Engine {
    /// Create an engine from configuration. Does NOT contact the agent --
    /// call [`start()`](Self::start) to load state and spawn tasks.
    pub fn new(config: EngineConfig) -> Result<Self, CoreError> {
        let client = AgentClient::new(config.agent_url.clone(), &build_transport(&config))?;
        let (snapshot, _) = watch::channel(Arc::new(EngineSnapshot::default()));
        let (status, _) = watch::channel(EngineStatus::Idle);
        let (message_tx, message_rx) = mpsc::channel(MESSAGE_CHANNEL_SIZE);

        Ok(Self {
            inner: Arc::new(EngineInner {
                config,
                client,
                snapshot,
                status,
                message_tx,
                message_rx: Mutex::new(Some(message_rx)),
                cancel: CancellationToken::new(),
                task_handles: Mutex::new(Vec::new()),
            }),
        })
    }

    /// Access the engine configuration.
    pub fn config(&self) -> &EngineConfig {
        &self.inner.config
    }

    /// Access the underlying agent client for ad-hoc queries.
    pub fn client(&self) -> &AgentClient {
        &self.inner.client
    }

    // ── Lifecycle ────────────────────────────────────────────────

    /// Load the agent's configuration and version once, then spawn the
    /// owner task, the persistence bridge and one poller per enabled
    /// cadence.
    ///
    /// An unreachable agent is not fatal: the engine runs on bootstrap
    /// defaults and the snapshot reports `config_loaded == false`.
    pub async fn start(&self) -> Result<(), CoreError> {
        let Some(rx) = self.inner.message_rx.lock().await.take() else {
            return Err(CoreError::AlreadyStarted);
        };

        let client = &self.inner.client;
        let (remote_config, version) = tokio::join!(client.get_config(), client.version());

        let mut config = ConfigStore::new();
        let config_loaded = match remote_config {
            Ok(remote) => {
                config.load(remote);
                true
            }
            Err(e) => {
                warn!(error = %e, "could not load agent configuration, using defaults");
                false
            }
        };
        let agent_version = version.unwrap_or_else(|e| {
            debug!(error = %e, "version query failed");
            VERSION_UNKNOWN.to_owned()
        });

        let state = EngineState::new(
            config,
            config_loaded,
            agent_version,
            NotificationQueue::new(self.inner.config.notification_ttl),
        );
        self.inner
            .snapshot
            .send_replace(Arc::new(state.snapshot()));

        let (persist_tx, persist_rx) = mpsc::unbounded_channel();
        let mut handles = self.inner.task_handles.lock().await;

        handles.push(tokio::spawn(persistence_task(client.clone(), persist_rx)));

        let owner = Owner {
            engine: self.clone(),
            state,
            persist_tx,
            scans: JoinSet::new(),
        };
        handles.push(tokio::spawn(owner.run(rx, self.inner.cancel.clone())));

        self.spawn_pollers(&mut handles);

        self.inner.status.send_replace(EngineStatus::Running);
        info!(agent = %self.inner.config.agent_url, "engine started");
        Ok(())
    }

    fn spawn_pollers(&self, handles: &mut Vec<JoinHandle<()>>) {
        let PollIntervals {
            interfaces,
            devices,
            network,
            errors,
            metrics,
        } = self.inner.config.poll.clone();
        let tx = &self.inner.message_tx;
        let cancel = &self.inner.cancel;

        if !network.is_zero() {
            let c = self.inner.client.clone();
            handles.push(poller::spawn(
                "network",
                network,
                move || {
                    let c = c.clone();
                    async move { c.network_sample().await }
                },
                |s: NetworkSample| Update::Network(s.into()),
                tx.clone(),
                cancel.clone(),
            ));
        }
        if !devices.is_zero() {
            let c = self.inner.client.clone();
            handles.push(poller::spawn(
                "devices",
                devices,
                move || {
                    let c = c.clone();
                    async move { c.usb_devices().await }
                },
                |d: Vec<UsbDevice>| Update::Devices(d.into_iter().map(Into::into).collect()),
                tx.clone(),
                cancel.clone(),
            ));
        }
        if !interfaces.is_zero() {
            let c = self.inner.client.clone();
            handles.push(poller::spawn(
                "interfaces",
                interfaces,
                move || {
                    let c = c.clone();
                    async move { c.interfaces().await }
                },
                |m: InterfaceMap| Update::Interfaces(m.into()),
                tx.clone(),
                cancel.clone(),
            ));
        }
        if !metrics.is_zero() {
            let c = self.inner.client.clone();
            handles.push(poller::spawn(
                "metrics",
                metrics,
                move || {
                    let c = c.clone();
                    async move { c.metrics().await }
                },
                |m: WireMetrics| Update::Metrics(m.into()),
                tx.clone(),
                cancel.clone(),
            ));
        }
        if !errors.is_zero() {
            let c = self.inner.client.clone();
            handles.push(poller::spawn(
                "errors",
                errors,
                move || {
                    let c = c.clone();
                    async move { c.drain_errors().await }
                },
                |e: Vec<CommandError>| Update::Errors(e.into_iter().map(|e| e.message).collect()),
                tx.clone(),
                cancel.clone(),
            ));
        }
    }

    /// Stop every task and wait for them to finish.
    ///
    /// Configuration documents already queued are still sent to the agent
    /// before this returns. Pending notification expiries are dropped.
    pub async fn shutdown(&self) {
        if *self.inner.status.borrow() != EngineStatus::Running {
            return;
        }
        self.inner.cancel.cancel();

        let mut handles = self.inner.task_handles.lock().await;
        for handle in handles.drain(..) {
            let _ = handle.await;
        }

        self.inner.status.send_replace(EngineStatus::Stopped);
        debug!("engine stopped");
    }

    /// Fetch every polled source once and wait until the results have
    /// been applied.
    ///
    /// Individual failures are swallowed like a poll tick's; only when
    /// every source fails is the first error returned.
    pub async fn refresh(&self) -> Result<(), CoreError> {
        self.ensure_running()?;
        let c = &self.inner.client;
        let (network, devices, interfaces, metrics, errors) = tokio::join!(
            c.network_sample(),
            c.usb_devices(),
            c.interfaces(),
            c.metrics(),
            c.drain_errors(),
        );

        let mut batch = RefreshBatch::default();
        batch.record("network", network, |s| Update::Network(s.into()));
        batch.record("devices", devices, |d| {
            Update::Devices(d.into_iter().map(Into::into).collect())
        });
        batch.record("interfaces", interfaces, |m| Update::Interfaces(m.into()));
        batch.record("metrics", metrics, |m| Update::Metrics(m.into()));
        batch.record("errors", errors, |e| {
            Update::Errors(e.into_iter().map(|e| e.message).collect())
        });

        if batch.updates.is_empty() {
            if let Some(e) = batch.first_error {
                return Err(e.into());
            }
        }

        for update in batch.updates {
            self.inner
                .message_tx
                .send(Message::Update(update))
                .await
                .map_err(|_| CoreError::EngineStopped)?;
        }
        self.execute(Command::Sync).await?;
        Ok(())
    }

    // ── Command execution ────────────────────────────────────────

    /// Execute a command against the engine state.
    ///
    /// Sends the command through the owner's channel and awaits the
    /// result. The published snapshot already reflects the command when
    /// this returns.
    pub async fn execute(&self, cmd: Command) -> Result<CommandResult, CoreError> {
        self.ensure_running()?;

        let (tx, rx) = oneshot::channel();
        self.inner
            .message_tx
            .send(Message::Command(CommandEnvelope {
                command: cmd,
                response_tx: tx,
            }))
            .await
            .map_err(|_| CoreError::EngineStopped)?;

        rx.await.map_err(|_| CoreError::EngineStopped)?
    }

    fn ensure_running(&self) -> Result<(), CoreError> {
        if *self.inner.status.borrow() == EngineStatus::Running {
            Ok(())
        } else {
            Err(CoreError::EngineStopped)
        }
    }

    pub async fn begin_edit(&self, kind: SubsystemKind) -> Result<(), CoreError> {
        self.execute(Command::BeginEdit { kind }).await.map(drop)
    }

    pub async fn cancel_edit(&self, kind: SubsystemKind) -> Result<(), CoreError> {
        self.execute(Command::CancelEdit { kind }).await.map(drop)
    }

    pub async fn update_draft(&self, patch: DraftPatch) -> Result<(), CoreError> {
        self.execute(Command::UpdateDraft(patch)).await.map(drop)
    }

    /// Apply the subsystem's draft. Returns the document queued for the
    /// agent; a failed upload is logged, never rolled back.
    pub async fn apply(&self, kind: SubsystemKind) -> Result<ConfigDocument, CoreError> {
        persisted(self.execute(Command::Apply { kind }).await?)
    }

    pub async fn toggle_enabled(&self, kind: SubsystemKind) -> Result<ConfigDocument, CoreError> {
        persisted(self.execute(Command::ToggleEnabled { kind }).await?)
    }

    pub async fn toggle_port_power(&self, port: u8) -> Result<ConfigDocument, CoreError> {
        persisted(self.execute(Command::TogglePortPower { port }).await?)
    }

    /// Returns `false` if the notification had already gone.
    pub async fn dismiss_notification(&self, id: u64) -> Result<bool, CoreError> {
        match self.execute(Command::DismissNotification { id }).await? {
            CommandResult::Dismissed { removed } => Ok(removed),
            other => Err(unexpected(&other)),
        }
    }

    pub async fn rescan_wifi(&self) -> Result<(), CoreError> {
        self.execute(Command::RescanWifi).await.map(drop)
    }

    // ── One-shot convenience ─────────────────────────────────────

    /// One-shot: start, run closure, shut down.
    ///
    /// Optimized for CLI: disables every poller since we only need a
    /// single request-response cycle. Call [`refresh()`](Self::refresh)
    /// inside the closure for live status.
    ///
    /// The closure may use its own error type as long as engine errors
    /// convert into it.
    pub async fn oneshot<F, Fut, T, E>(config: EngineConfig, f: F) -> Result<T, E>
    where
        F: FnOnce(Engine) -> Fut,
        Fut: Future<Output = Result<T, E>>,
        E: From<CoreError>,
    {
        let mut cfg = config;
        cfg.poll = PollIntervals::disabled();

        let engine = Engine::new(cfg)?;
        engine.start().await?;
        let result = f(engine.clone()).await;
        engine.shutdown().await;
        result
    }

    // ── State observation ────────────────────────────────────────

    /// Subscribe to lifecycle changes.
    pub fn status(&self) -> watch::Receiver<EngineStatus> {
        self.inner.status.subscribe()
    }

    /// The most recently published snapshot.
    pub fn snapshot(&self) -> Arc<EngineSnapshot> {
        self.inner.snapshot.borrow().clone()
    }

    pub fn subscribe(&self) -> SnapshotStream {
        SnapshotStream::new(self.inner.snapshot.subscribe())
    }

    // ── Ad-hoc queries (bypass the owner) ────────────────────────

    /// Scan for WiFi networks without touching engine state.
    pub async fn scan_wifi(&self) -> Result<Vec<WifiNetwork>, CoreError> {
        let networks = self.inner.client.wifi_scan().await?;
        Ok(networks.into_iter().map(Into::into).collect())
    }
}

// ── Owner task ───────────────────────────────────────────────────

/// Everything the owner task mutates.
struct EngineState {
    config: ConfigStore,
    config_loaded: bool,
    devices: Vec<AttachedDevice>,
    interfaces: InterfaceSnapshot,
    throughput: ThroughputHistory,
    metrics: HostMetrics,
    notifications: NotificationQueue,
    wifi_networks: Vec<WifiNetwork>,
    wifi_scanning: bool,
    /// Bumped whenever a scan starts or the WiFi session closes; scan
    /// results carrying an older generation are discarded.
    wifi_scan_generation: u64,
    agent_version: String,
}

impl EngineState {
    fn new(
        config: ConfigStore,
        config_loaded: bool,
        agent_version: String,
        notifications: NotificationQueue,
    ) -> Self {
        Self {
            config,
            config_loaded,
            devices: Vec::new(),
            interfaces: InterfaceSnapshot::default(),
            throughput: ThroughputHistory::default(),
            metrics: HostMetrics::default(),
            notifications,
            wifi_networks: Vec::new(),
            wifi_scanning: false,
            wifi_scan_generation: 0,
            agent_version,
        }
    }

    fn snapshot(&self) -> EngineSnapshot {
        EngineSnapshot {
            config: self.config.clone(),
            config_loaded: self.config_loaded,
            devices: self.devices.clone(),
            interfaces: self.interfaces.clone(),
            throughput: self.throughput.to_vec(),
            metrics: self.metrics.clone(),
            notifications: self.notifications.iter().cloned().collect(),
            wifi_networks: self.wifi_networks.clone(),
            wifi_scanning: self.wifi_scanning,
            agent_version: self.agent_version.clone(),
        }
    }

    fn close_wifi_session(&mut self) {
        self.wifi_networks.clear();
        self.wifi_scanning = false;
        self.wifi_scan_generation += 1;
    }
}

struct Owner {
    engine: Engine,
    state: EngineState,
    persist_tx: mpsc::UnboundedSender<ConfigDocument>,
    scans: JoinSet<()>,
}

impl Owner {
    async fn run(mut self, mut rx: mpsc::Receiver<Message>, cancel: CancellationToken) {
        debug!("owner task started");
        loop {
            tokio::select! {
                biased;
                () = cancel.cancelled() => break,
                Some(id) = self.state.notifications.next_expired(),
                    if !self.state.notifications.is_empty() =>
                {
                    debug!(id, "notification expired");
                    self.publish();
                }
                Some(_) = self.scans.join_next(), if !self.scans.is_empty() => {}
                msg = rx.recv() => {
                    let Some(msg) = msg else { break };
                    match msg {
                        Message::Update(update) => {
                            if self.apply_update(update) {
                                self.publish();
                            }
                        }
                        Message::Command(envelope) => {
                            let result = self.route_command(envelope.command);
                            if result.is_ok() {
                                self.publish();
                            }
                            let _ = envelope.response_tx.send(result);
                        }
                    }
                }
            }
        }

        self.scans.shutdown().await;
        self.state.notifications.clear();
        self.publish();
        debug!("owner task stopped");
    }

    fn publish(&self) {
        self.engine
            .inner
            .snapshot
            .send_replace(Arc::new(self.state.snapshot()));
    }

    /// Returns `true` if anything visible changed.
    fn apply_update(&mut self, update: Update) -> bool {
        let state = &mut self.state;
        match update {
            Update::Network(sample) => state.throughput.push(sample),
            Update::Devices(devices) => state.devices = devices,
            Update::Interfaces(interfaces) => state.interfaces = interfaces,
            Update::Metrics(metrics) => state.metrics = metrics,
            Update::Errors(messages) => {
                if messages.is_empty() {
                    return false;
                }
                for message in messages {
                    let id = state.notifications.push(message);
                    debug!(id, "agent reported a command failure");
                }
            }
            Update::WifiScan {
                generation,
                networks,
            } => {
                if generation != state.wifi_scan_generation
                    || !state.config.is_editing(SubsystemKind::Wifi)
                {
                    debug!(generation, "discarding stale wifi scan");
                    return false;
                }
                state.wifi_scanning = false;
                if let Some(networks) = networks {
                    state.wifi_networks = networks;
                }
            }
        }
        true
    }

    fn route_command(&mut self, cmd: Command) -> Result<CommandResult, CoreError> {
        let config = &mut self.state.config;
        match cmd {
            Command::BeginEdit { kind } => {
                let was_editing = config.is_editing(kind);
                config.begin_edit(kind)?;
                if kind == SubsystemKind::Wifi && !was_editing {
                    self.start_wifi_scan();
                }
                Ok(CommandResult::Ok)
            }
            Command::CancelEdit { kind } => {
                config.cancel_edit(kind);
                if kind == SubsystemKind::Wifi {
                    self.state.close_wifi_session();
                }
                Ok(CommandResult::Ok)
            }
            Command::UpdateDraft(patch) => {
                config.update_draft(patch)?;
                Ok(CommandResult::Ok)
            }
            Command::Apply { kind } => {
                let doc = config.apply(kind)?;
                if kind == SubsystemKind::Wifi {
                    self.state.close_wifi_session();
                }
                Ok(self.persist(doc))
            }
            Command::ToggleEnabled { kind } => {
                let doc = config.toggle_enabled(kind)?;
                Ok(self.persist(doc))
            }
            Command::TogglePortPower { port } => {
                let doc = config.toggle_port_power(port)?;
                Ok(self.persist(doc))
            }
            Command::DismissNotification { id } => Ok(CommandResult::Dismissed {
                removed: self.state.notifications.dismiss(id),
            }),
            Command::RescanWifi => {
                if !config.is_editing(SubsystemKind::Wifi) {
                    return Err(CoreError::NoEditSession {
                        kind: SubsystemKind::Wifi,
                    });
                }
                self.start_wifi_scan();
                Ok(CommandResult::Ok)
            }
            Command::Sync => Ok(CommandResult::Ok),
        }
    }

    /// Hand the document to the persistence bridge. Confirmed state is
    /// already updated and stays that way whatever the agent says.
    fn persist(&self, doc: ConfigDocument) -> CommandResult {
        if self.persist_tx.send(doc.clone()).is_err() {
            warn!("persistence bridge is gone, configuration not sent");
        }
        CommandResult::Persisting(doc)
    }

    fn start_wifi_scan(&mut self) {
        self.state.wifi_scan_generation += 1;
        self.state.wifi_scanning = true;
        let generation = self.state.wifi_scan_generation;
        let client = self.engine.inner.client.clone();
        let tx = self.engine.inner.message_tx.clone();

        self.scans.spawn(async move {
            let networks = match client.wifi_scan().await {
                Ok(list) => Some(list.into_iter().map(Into::into).collect()),
                Err(e) => {
                    debug!(error = %e, "wifi scan failed");
                    None
                }
            };
            let _ = tx
                .send(Message::Update(Update::WifiScan {
                    generation,
                    networks,
                }))
                .await;
        });
    }
}

// ── Persistence bridge ───────────────────────────────────────────

/// Send configuration documents to the agent one at a time, in order.
///
/// Runs until the owner drops its sender, so documents queued before
/// shutdown still go out.
async fn persistence_task(client: AgentClient, mut rx: mpsc::UnboundedReceiver<ConfigDocument>) {
    while let Some(doc) = rx.recv().await {
        match client.put_config(&doc).await {
            Ok(()) => debug!("configuration persisted"),
            Err(e) => warn!(error = %e, "failed to persist configuration, keeping local state"),
        }
    }
    debug!("persistence bridge stopped");
}

// ── Helpers ──────────────────────────────────────────────────────

/// Successful fetches from one `refresh()` round.
#[derive(Default)]
struct RefreshBatch {
    updates: Vec<Update>,
    first_error: Option<hubctl_api::Error>,
}

impl RefreshBatch {
    fn record<T>(
        &mut self,
        source: &'static str,
        result: Result<T, hubctl_api::Error>,
        into_update: impl FnOnce(T) -> Update,
    ) {
        match result {
            Ok(value) => self.updates.push(into_update(value)),
            Err(e) => {
                debug!(source, error = %e, "refresh fetch failed");
                self.first_error.get_or_insert(e);
            }
        }
    }
}

fn persisted(result: CommandResult) -> Result<ConfigDocument, CoreError> {
    match result {
        CommandResult::Persisting(doc) => Ok(doc),
        other => Err(unexpected(&other)),
    }
}

fn unexpected(result: &CommandResult) -> CoreError {
    CoreError::Internal(format!("unexpected command result: {result:?}"))
}

fn build_transport(config: &EngineConfig) -> TransportConfig {
    TransportConfig {
        tls: match config.tls {
            TlsVerification::SystemDefaults => TlsMode::System,
            TlsVerification::DangerAcceptInvalid => TlsMode::DangerAcceptInvalid,
        },
        timeout: config.timeout,
    }
}
