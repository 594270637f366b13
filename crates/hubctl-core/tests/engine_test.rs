#![allow(clippy::unwrap_used)]
// Integration tests for `Engine` against a wiremock agent.

use std::sync::Arc;
use std::time::Duration;

use pretty_assertions::assert_eq;
use serde_json::{Value, json};
use url::Url;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use hubctl_core::{
    Category, CoreError, DraftPatch, Engine, EngineConfig, EngineSnapshot, EngineStatus,
    EthernetPatch, NetworkMode, PollIntervals, PortState, SubsystemKind, VpnStatus,
};

// ── Helpers ─────────────────────────────────────────────────────────

fn config_for(server: &MockServer) -> EngineConfig {
    let mut cfg = EngineConfig::new(Url::parse(&server.uri()).unwrap());
    cfg.poll = PollIntervals::disabled();
    cfg.timeout = Duration::from_secs(2);
    cfg
}

async fn mock_get(server: &MockServer, route: &str, body: Value) {
    Mock::given(method("GET"))
        .and(path(route))
        .respond_with(ResponseTemplate::new(200).set_body_json(body))
        .mount(server)
        .await;
}

async fn mock_put_config(server: &MockServer, status: u16) {
    Mock::given(method("PUT"))
        .and(path("/api/config"))
        .respond_with(ResponseTemplate::new(status))
        .mount(server)
        .await;
}

/// An agent with a stored configuration and live status on every route.
async fn full_agent() -> MockServer {
    let server = MockServer::start().await;
    mock_get(
        &server,
        "/api/config",
        json!({
            "ports": [{ "id": 1, "power": true }, { "id": 2, "power": false },
                      { "id": 3, "power": true }, { "id": 4, "power": true }],
            "ethernet": { "mode": "dhcp" },
            "wireguard": { "blocked": true, "enabled": false, "config": "" }
        }),
    )
    .await;
    mock_get(&server, "/api/version", json!({ "version": "2.1.0" })).await;
    mock_get(&server, "/api/network", json!({ "rx": 3.5, "tx": 1.25 })).await;
    mock_get(
        &server,
        "/api/metrics",
        json!({ "cpu": 17, "ram": 42, "uptime": "0d 3h 7m" }),
    )
    .await;
    mock_get(
        &server,
        "/api/usb/devices",
        json!([
            { "busid": "1-1", "vendorId": "05e3", "productId": "0610", "name": "Hub", "port": 1, "occupied": false },
            { "busid": "1-1.2", "vendorId": "046d", "productId": "c52b", "name": "Receiver", "port": 1, "occupied": true },
            { "busid": "2-1", "vendorId": "0781", "productId": "5581", "name": "Disk", "port": 2, "occupied": false }
        ]),
    )
    .await;
    Mock::given(method("GET"))
        .and(path("/api/interfaces"))
        .respond_with(ResponseTemplate::new(200).set_body_raw(
            r#"{"lo":{"ipv4":["127.0.0.1"],"ipv6":[],"mac":""},"eth0":{"ipv4":["192.168.1.142"],"ipv6":[],"mac":"aa:bb:cc:00:11:22"},"wg0":{"ipv4":[],"ipv6":[],"mac":""}}"#,
            "application/json",
        ))
        .mount(&server)
        .await;
    mock_get(&server, "/api/errors", json!([{ "message": "tailscale up: exit status 1" }])).await;
    mock_get(
        &server,
        "/api/wifi/scan",
        json!([{ "ssid": "Office", "signal": -50, "security": "wpa2" },
               { "ssid": "Cafe", "signal": -80, "security": "open" }]),
    )
    .await;
    mock_put_config(&server, 200).await;
    server
}

async fn wait_for(engine: &Engine, pred: impl Fn(&EngineSnapshot) -> bool) -> Arc<EngineSnapshot> {
    let mut stream = engine.subscribe();
    if pred(&stream.latest()) {
        return stream.latest();
    }
    tokio::time::timeout(Duration::from_secs(5), async {
        loop {
            let snap = stream.changed().await.expect("engine dropped");
            if pred(&snap) {
                return snap;
            }
        }
    })
    .await
    .expect("condition not reached in time")
}

async fn put_bodies(server: &MockServer) -> Vec<Value> {
    server
        .received_requests()
        .await
        .unwrap()
        .into_iter()
        .filter(|r| r.method == wiremock::http::Method::PUT)
        .map(|r| serde_json::from_slice(&r.body).unwrap())
        .collect()
}

// ── Lifecycle ───────────────────────────────────────────────────────

#[tokio::test]
async fn test_start_loads_config_and_version() {
    let server = full_agent().await;
    let engine = Engine::new(config_for(&server)).unwrap();
    engine.start().await.unwrap();

    let snap = engine.snapshot();
    assert!(snap.config_loaded);
    assert_eq!(snap.agent_version, "2.1.0");
    assert!(!snap.config.port(2).unwrap().power);
    assert!(snap.config.port(3).unwrap().power);
    assert!(snap.config.is_blocked(SubsystemKind::Wireguard));
    // Absent from the agent's config: bootstrap default kept.
    assert_eq!(
        snap.config.wifi().confirmed().ssid.as_deref(),
        Some("Home_Network_5G")
    );

    engine.shutdown().await;
    assert_eq!(*engine.status().borrow(), EngineStatus::Stopped);
}

#[tokio::test]
async fn test_unreachable_agent_degrades_to_defaults() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(500))
        .mount(&server)
        .await;

    let engine = Engine::new(config_for(&server)).unwrap();
    engine.start().await.unwrap();

    let snap = engine.snapshot();
    assert!(!snap.config_loaded);
    assert_eq!(snap.agent_version, "unknown");
    assert_eq!(snap.config.ports().len(), 4);

    let err = engine.refresh().await.unwrap_err();
    assert!(matches!(err, CoreError::Api { status: Some(500), .. }), "got {err:?}");
    engine.shutdown().await;
}

#[tokio::test]
async fn test_commands_rejected_when_not_running() {
    let server = full_agent().await;
    let engine = Engine::new(config_for(&server)).unwrap();

    let err = engine.begin_edit(SubsystemKind::Ethernet).await.unwrap_err();
    assert!(matches!(err, CoreError::EngineStopped));

    engine.start().await.unwrap();
    assert!(matches!(engine.start().await, Err(CoreError::AlreadyStarted)));

    engine.shutdown().await;
    let err = engine.toggle_port_power(1).await.unwrap_err();
    assert!(matches!(err, CoreError::EngineStopped));
}

// ── Edit sessions and persistence ───────────────────────────────────

#[tokio::test]
async fn test_apply_when_clean_is_rejected_without_put() {
    let server = full_agent().await;
    let engine = Engine::new(config_for(&server)).unwrap();
    engine.start().await.unwrap();

    engine.begin_edit(SubsystemKind::Ethernet).await.unwrap();
    let err = engine.apply(SubsystemKind::Ethernet).await.unwrap_err();
    assert!(matches!(err, CoreError::NothingToApply { .. }));

    engine.shutdown().await;
    assert!(put_bodies(&server).await.is_empty());
}

#[tokio::test]
async fn test_apply_persists_full_document() {
    let server = full_agent().await;
    let engine = Engine::new(config_for(&server)).unwrap();
    engine.start().await.unwrap();

    engine.begin_edit(SubsystemKind::Ethernet).await.unwrap();
    engine
        .update_draft(DraftPatch::Ethernet(EthernetPatch {
            mode: Some(NetworkMode::Static),
            ip: Some("10.0.0.20".into()),
            mask: Some("255.255.255.0".into()),
            ..Default::default()
        }))
        .await
        .unwrap();
    assert!(engine.snapshot().is_dirty(SubsystemKind::Ethernet));

    let doc = engine.apply(SubsystemKind::Ethernet).await.unwrap();
    assert_eq!(doc.ethernet.mode.as_deref(), Some("static"));
    assert!(!engine.snapshot().is_dirty(SubsystemKind::Ethernet));

    engine.shutdown().await;
    let bodies = put_bodies(&server).await;
    assert_eq!(bodies.len(), 1);
    let body = &bodies[0];
    assert_eq!(body["ethernet"]["ip"], json!("10.0.0.20"));
    assert_eq!(body["ports"].as_array().unwrap().len(), 4);
    assert_eq!(body["wireguard"]["blocked"], json!(true));
    assert!(body["wireguard"].get("status").is_none());
    assert_eq!(body["tailscale"]["exitNode"], json!(false));
}

#[tokio::test]
async fn test_persist_failure_keeps_optimistic_state() {
    let server = MockServer::start().await;
    mock_get(&server, "/api/config", json!({})).await;
    mock_get(&server, "/api/version", json!({ "version": "1.0" })).await;
    mock_put_config(&server, 500).await;

    let engine = Engine::new(config_for(&server)).unwrap();
    engine.start().await.unwrap();

    engine.toggle_enabled(SubsystemKind::Tailscale).await.unwrap();
    engine.shutdown().await;

    let snap = engine.snapshot();
    assert!(snap.config.tailscale().confirmed().enabled);
    assert_eq!(snap.config.tailscale().confirmed().status, VpnStatus::Connecting);
    assert_eq!(put_bodies(&server).await.len(), 1);
}

#[tokio::test]
async fn test_port_toggle_leaves_devices_until_next_poll() {
    let server = full_agent().await;
    let engine = Engine::new(config_for(&server)).unwrap();
    engine.start().await.unwrap();
    engine.refresh().await.unwrap();
    let devices_before = engine.snapshot().devices.clone();

    let doc = engine.toggle_port_power(1).await.unwrap();
    assert!(!doc.ports[0].power);

    let snap = engine.snapshot();
    assert_eq!(snap.devices, devices_before);
    // Still reported by the agent, but hidden behind the power interlock.
    assert_eq!(snap.port_tree()[0].state, PortState::PowerDisabled);

    engine.shutdown().await;
    let bodies = put_bodies(&server).await;
    assert_eq!(bodies[0]["ports"][0], json!({ "id": 1, "power": false }));
}

#[tokio::test]
async fn test_blocked_subsystem_and_unknown_port() {
    let server = full_agent().await;
    let engine = Engine::new(config_for(&server)).unwrap();
    engine.start().await.unwrap();

    assert!(matches!(
        engine.begin_edit(SubsystemKind::Wireguard).await,
        Err(CoreError::Blocked { .. })
    ));
    assert!(matches!(
        engine.toggle_port_power(9).await,
        Err(CoreError::UnknownPort { port: 9 })
    ));

    engine.shutdown().await;
    assert!(put_bodies(&server).await.is_empty());
}

// ── Status merging ──────────────────────────────────────────────────

#[tokio::test]
async fn test_refresh_merges_every_source() {
    let server = full_agent().await;
    let engine = Engine::new(config_for(&server)).unwrap();
    engine.start().await.unwrap();
    engine.refresh().await.unwrap();

    let snap = engine.snapshot();
    assert_eq!(snap.metrics.cpu, 17);
    assert_eq!(snap.throughput.len(), 60);
    assert!((snap.latest_throughput().rx - 3.5).abs() < f64::EPSILON);
    assert_eq!(snap.notifications.len(), 1);
    assert_eq!(snap.notifications[0].message, "tailscale up: exit status 1");

    let eth = snap.live_status(Category::Ethernet).unwrap();
    assert_eq!(eth.interface, "eth0");
    assert!(snap.has_live_address(Category::Ethernet));
    assert!(!snap.has_live_address(Category::Wireguard));
    assert!(snap.live_status(Category::Wifi).is_none());

    let tree = snap.port_tree();
    let hub = &tree[0].devices()[0];
    assert_eq!(hub.children[0].name, "Receiver");
    // Port 2 is off in the agent's stored config.
    assert_eq!(tree[1].state, PortState::PowerDisabled);

    engine.shutdown().await;
}

#[tokio::test]
async fn test_pollers_feed_snapshots() {
    let server = full_agent().await;
    let mut cfg = config_for(&server);
    cfg.poll = PollIntervals {
        interfaces: Duration::from_millis(50),
        devices: Duration::from_millis(50),
        network: Duration::from_millis(20),
        errors: Duration::ZERO,
        metrics: Duration::from_millis(50),
    };
    let engine = Engine::new(cfg).unwrap();
    engine.start().await.unwrap();

    let snap = wait_for(&engine, |s| {
        s.devices.len() == 3 && s.metrics.cpu == 17 && !s.interfaces.is_empty()
    })
    .await;
    assert!(snap.notifications.is_empty());

    engine.shutdown().await;
}

#[tokio::test]
async fn test_stalled_and_failing_pollers_stay_isolated_until_shutdown() {
    let server = MockServer::start().await;
    mock_get(&server, "/api/config", json!({})).await;
    mock_get(&server, "/api/version", json!({ "version": "2.1.0" })).await;
    Mock::given(method("GET"))
        .and(path("/api/network"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(json!({ "rx": 1.0, "tx": 1.0 }))
                .set_delay(Duration::from_secs(5)),
        )
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/api/metrics"))
        .respond_with(ResponseTemplate::new(500))
        .mount(&server)
        .await;
    mock_get(
        &server,
        "/api/usb/devices",
        json!([{ "busid": "3-1", "vendorId": "0781", "productId": "5581",
                 "name": "Disk", "port": 4, "occupied": false }]),
    )
    .await;

    let mut cfg = config_for(&server);
    cfg.timeout = Duration::from_secs(10);
    cfg.poll = PollIntervals {
        interfaces: Duration::ZERO,
        devices: Duration::from_millis(50),
        network: Duration::from_millis(50),
        errors: Duration::ZERO,
        metrics: Duration::from_millis(50),
    };
    let engine = Engine::new(cfg).unwrap();
    engine.start().await.unwrap();
    assert_eq!(*engine.status().borrow(), EngineStatus::Running);

    let snap = wait_for(&engine, |s| s.devices.len() == 1).await;
    tokio::time::sleep(Duration::from_millis(400)).await;

    let network_requests = |requests: &[wiremock::Request]| {
        requests.iter().filter(|r| r.url.path() == "/api/network").count()
    };
    let requests = server.received_requests().await.unwrap();
    // Every tick starts a fetch even though none has answered yet.
    assert!(network_requests(&requests) >= 3, "{}", network_requests(&requests));
    assert_eq!(engine.snapshot().metrics.cpu, 0);
    assert_eq!(snap.devices[0].bus_id, "3-1");

    engine.shutdown().await;
    assert_eq!(*engine.status().borrow(), EngineStatus::Stopped);

    let after_shutdown = server.received_requests().await.unwrap().len();
    tokio::time::sleep(Duration::from_millis(300)).await;
    assert_eq!(server.received_requests().await.unwrap().len(), after_shutdown);
    assert!(matches!(engine.refresh().await, Err(CoreError::EngineStopped)));
}

#[tokio::test]
async fn test_notifications_expire_and_can_be_dismissed() {
    let server = full_agent().await;
    let mut cfg = config_for(&server);
    cfg.notification_ttl = Duration::from_secs(1);
    let engine = Engine::new(cfg).unwrap();
    engine.start().await.unwrap();

    engine.refresh().await.unwrap();
    engine.refresh().await.unwrap();
    let ids: Vec<u64> = engine.snapshot().notifications.iter().map(|n| n.id).collect();
    assert_eq!(ids.len(), 2);
    assert!(ids[0] < ids[1]);

    assert!(engine.dismiss_notification(ids[0]).await.unwrap());
    assert!(!engine.dismiss_notification(ids[0]).await.unwrap());

    let snap = wait_for(&engine, |s| s.notifications.is_empty()).await;
    assert!(snap.notifications.is_empty());

    engine.shutdown().await;
}

// ── WiFi session ────────────────────────────────────────────────────

#[tokio::test]
async fn test_wifi_session_scans_and_clears() {
    let server = full_agent().await;
    let engine = Engine::new(config_for(&server)).unwrap();
    engine.start().await.unwrap();

    assert!(matches!(
        engine.rescan_wifi().await,
        Err(CoreError::NoEditSession { kind: SubsystemKind::Wifi })
    ));

    engine.begin_edit(SubsystemKind::Wifi).await.unwrap();
    let snap = wait_for(&engine, |s| !s.wifi_scanning && !s.wifi_networks.is_empty()).await;
    assert_eq!(snap.wifi_networks[0].ssid, "Office");
    assert_eq!(snap.wifi_networks[0].signal_bars(), 4);

    engine.cancel_edit(SubsystemKind::Wifi).await.unwrap();
    assert!(engine.snapshot().wifi_networks.is_empty());

    engine.shutdown().await;
}

#[tokio::test]
async fn test_oneshot_runs_closure_and_stops() {
    let server = full_agent().await;
    let engine_out = Engine::oneshot(config_for(&server), |engine| async move {
        engine.toggle_enabled(SubsystemKind::Wifi).await?;
        Ok::<_, CoreError>(engine)
    })
    .await
    .unwrap();

    assert_eq!(*engine_out.status().borrow(), EngineStatus::Stopped);
    let bodies = put_bodies(&server).await;
    assert_eq!(bodies.len(), 1);
    assert_eq!(bodies[0]["wifi"]["enabled"], json!(true));
}
