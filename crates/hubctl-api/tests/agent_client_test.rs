#![allow(clippy::unwrap_used)]
// Integration tests for `AgentClient` using wiremock.

use pretty_assertions::assert_eq;
use serde_json::json;
use url::Url;
use wiremock::matchers::{body_json, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use hubctl_api::{
    AgentClient, ConfigDocument, EthernetSettings, Error, PortPower, TailscaleSettings,
    WifiSettings, WireguardSettings,
};

// ── Helpers ─────────────────────────────────────────────────────────

async fn setup() -> (MockServer, AgentClient) {
    let server = MockServer::start().await;
    let base_url = Url::parse(&server.uri()).unwrap();
    let client = AgentClient::with_client(reqwest::Client::new(), base_url);
    (server, client)
}

async fn mock_get(server: &MockServer, route: &str, body: serde_json::Value) {
    Mock::given(method("GET"))
        .and(path(route))
        .respond_with(ResponseTemplate::new(200).set_body_json(body))
        .mount(server)
        .await;
}

// ── Status endpoints ────────────────────────────────────────────────

#[tokio::test]
async fn test_network_sample() {
    let (server, client) = setup().await;
    mock_get(&server, "/api/network", json!({ "rx": 1.5, "tx": 0.25 })).await;

    let sample = client.network_sample().await.unwrap();
    assert!((sample.rx - 1.5).abs() < f64::EPSILON);
    assert!((sample.tx - 0.25).abs() < f64::EPSILON);
}

#[tokio::test]
async fn test_usb_devices() {
    let (server, client) = setup().await;
    mock_get(
        &server,
        "/api/usb/devices",
        json!([
            { "busid": "1-1", "vendorId": "0781", "productId": "5581", "name": "SanDisk Ultra", "port": 1, "occupied": false },
            { "busid": "3-1.3", "vendorId": "046d", "productId": "c52b", "name": "Unifying Receiver", "port": 3, "occupied": true }
        ]),
    )
    .await;

    let devices = client.usb_devices().await.unwrap();
    assert_eq!(devices.len(), 2);
    assert_eq!(devices[1].bus_id, "3-1.3");
    assert_eq!(devices[1].port, 3);
    assert!(devices[1].occupied);
}

#[tokio::test]
async fn test_interfaces_keep_order() {
    let (server, client) = setup().await;
    // Raw body so key order is exactly what the agent sent.
    Mock::given(method("GET"))
        .and(path("/api/interfaces"))
        .respond_with(ResponseTemplate::new(200).set_body_raw(
            r#"{"wg0":{"ipv4":["10.0.0.5"],"ipv6":[],"mac":""},"eth0":{"ipv4":["192.168.1.142"],"ipv6":["fe80::1"],"mac":"aa:bb:cc:dd:ee:ff"}}"#,
            "application/json",
        ))
        .mount(&server)
        .await;

    let map = client.interfaces().await.unwrap();
    let names: Vec<&str> = map.keys().map(String::as_str).collect();
    assert_eq!(names, vec!["wg0", "eth0"]);
    assert_eq!(map["eth0"].mac, "aa:bb:cc:dd:ee:ff");
}

#[tokio::test]
async fn test_metrics_and_version() {
    let (server, client) = setup().await;
    mock_get(&server, "/api/metrics", json!({ "cpu": 12, "ram": 40, "uptime": "1d 2h 3m" })).await;
    mock_get(&server, "/api/version", json!({ "version": "1.4.2" })).await;

    let m = client.metrics().await.unwrap();
    assert_eq!(m.cpu, 12);
    assert_eq!(m.uptime, "1d 2h 3m");
    assert_eq!(client.version().await.unwrap(), "1.4.2");
}

#[tokio::test]
async fn test_drain_errors_empty() {
    let (server, client) = setup().await;
    mock_get(&server, "/api/errors", json!([])).await;

    assert!(client.drain_errors().await.unwrap().is_empty());
}

#[tokio::test]
async fn test_wifi_scan() {
    let (server, client) = setup().await;
    mock_get(
        &server,
        "/api/wifi/scan",
        json!([{ "ssid": "Office", "signal": -48, "security": "wpa2" }]),
    )
    .await;

    let nets = client.wifi_scan().await.unwrap();
    assert_eq!(nets[0].ssid, "Office");
    assert_eq!(nets[0].signal, -48);
}

// ── Configuration ───────────────────────────────────────────────────

#[tokio::test]
async fn test_get_partial_config() {
    let (server, client) = setup().await;
    mock_get(
        &server,
        "/api/config",
        json!({ "ports": [{ "id": 3, "power": true }], "ethernet": { "mode": "static", "ip": "10.1.1.2" } }),
    )
    .await;

    let cfg = client.get_config().await.unwrap();
    assert!(cfg.wifi.is_none());
    assert_eq!(cfg.ports.unwrap(), vec![PortPower { id: 3, power: true }]);
    assert_eq!(cfg.ethernet.unwrap().ip.as_deref(), Some("10.1.1.2"));
}

#[tokio::test]
async fn test_put_config_sends_whole_document() {
    let (server, client) = setup().await;

    let doc = ConfigDocument {
        ports: vec![PortPower { id: 1, power: false }],
        ethernet: EthernetSettings {
            blocked: Some(false),
            mode: Some("dhcp".into()),
            ..Default::default()
        },
        wifi: WifiSettings {
            enabled: Some(true),
            ssid: Some("Office".into()),
            ..Default::default()
        },
        wireguard: WireguardSettings {
            blocked: Some(false),
            enabled: Some(false),
            config: Some(String::new()),
        },
        tailscale: TailscaleSettings {
            blocked: Some(false),
            enabled: Some(true),
            preauthkey: Some("tskey".into()),
            exit_node: Some(false),
            server_url: Some("https://controlplane.tailscale.com".into()),
        },
    };

    Mock::given(method("PUT"))
        .and(path("/api/config"))
        .and(body_json(json!({
            "ports": [{ "id": 1, "power": false }],
            "ethernet": { "blocked": false, "mode": "dhcp" },
            "wifi": { "enabled": true, "ssid": "Office" },
            "wireguard": { "blocked": false, "enabled": false, "config": "" },
            "tailscale": {
                "blocked": false,
                "enabled": true,
                "preauthkey": "tskey",
                "exitNode": false,
                "serverUrl": "https://controlplane.tailscale.com"
            }
        })))
        .respond_with(ResponseTemplate::new(200))
        .expect(1)
        .mount(&server)
        .await;

    client.put_config(&doc).await.unwrap();
}

// ── Error handling ──────────────────────────────────────────────────

#[tokio::test]
async fn test_http_error_status() {
    let (server, client) = setup().await;

    Mock::given(method("GET"))
        .and(path("/api/metrics"))
        .respond_with(ResponseTemplate::new(500).set_body_string("boom"))
        .mount(&server)
        .await;

    let result = client.metrics().await;
    match result {
        Err(Error::Status { status, ref message }) => {
            assert_eq!(status, 500);
            assert_eq!(message, "boom");
        }
        other => panic!("expected Status error, got: {other:?}"),
    }
}

#[tokio::test]
async fn test_malformed_body() {
    let (server, client) = setup().await;

    Mock::given(method("GET"))
        .and(path("/api/network"))
        .respond_with(ResponseTemplate::new(200).set_body_string("not json"))
        .mount(&server)
        .await;

    let result = client.network_sample().await;
    assert!(
        matches!(result, Err(Error::Deserialization { ref body, .. }) if body == "not json"),
        "expected Deserialization error, got: {result:?}"
    );
}
