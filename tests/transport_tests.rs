//! Integration tests for the HTTP factory against a mock Starr server
//!
//! These tests verify:
//! - API version prefixes per application kind
//! - API key header and forceSave query parameter
//! - Remote error bodies unpacked into failure messages

use camino::Utf8PathBuf;
use serde_json::json;
use starrdesk::models::{AppConfig, AppKind, DownloadClient};
use starrdesk::notify::Notifier;
use starrdesk::starrs::BusyFloor;
use starrdesk::storage::DirectoryStore;
use starrdesk::{StarrError, Starrs};
use std::sync::Arc;
use std::time::Duration;
use tokio_test::{assert_err, assert_ok};
use wiremock::matchers::{body_partial_json, header, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

const API_KEY: &str = "0123456789abcdef";

fn starrs() -> Starrs {
    let dir = Utf8PathBuf::try_from(std::env::temp_dir()).unwrap();
    Starrs::new(Arc::new(Notifier::default()), Arc::new(DirectoryStore::new(dir)))
        .with_busy_floor(BusyFloor::new(Duration::ZERO))
}

fn instance(app: AppKind, server: &MockServer) -> AppConfig {
    AppConfig::new(app, "Main", server.uri()).with_api_key(API_KEY)
}

fn qbit(id: i64) -> serde_json::Value {
    json!({
        "id": id,
        "name": "qBit",
        "enable": true,
        "protocol": "torrent",
        "priority": 1,
        "implementation": "QBittorrent",
        "configContract": "QBittorrentSettings",
        "fields": [{"name": "host", "value": "localhost"}],
        "tags": []
    })
}

#[tokio::test]
async fn test_list_sends_api_key_to_v3() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/v3/downloadclient"))
        .and(header("X-Api-Key", API_KEY))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([qbit(1), qbit(2)])))
        .expect(1)
        .mount(&server)
        .await;

    let clients = assert_ok!(starrs().download_clients(&instance(AppKind::Sonarr, &server)).await);
    assert_eq!(clients.len(), 2);
    assert_eq!(clients[1].id, 2);
}

#[tokio::test]
async fn test_v1_apps_use_v1_prefix() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/v1/metadataprofile/3"))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(json!({"id": 3, "name": "Standard"})),
        )
        .expect(1)
        .mount(&server)
        .await;

    let profile = assert_ok!(
        starrs()
            .metadata_profile(&instance(AppKind::Lidarr, &server), 3)
            .await
    );
    assert_eq!(profile.name, "Standard");
}

#[tokio::test]
async fn test_update_forwards_force_flag() {
    let server = MockServer::start().await;
    Mock::given(method("PUT"))
        .and(path("/api/v3/downloadclient/7"))
        .and(query_param("forceSave", "true"))
        .and(body_partial_json(json!({"id": 7, "name": "qBit"})))
        .respond_with(ResponseTemplate::new(202).set_body_json(qbit(7)))
        .expect(1)
        .mount(&server)
        .await;

    let client: DownloadClient = serde_json::from_value(qbit(7)).unwrap();
    let reply = assert_ok!(
        starrs()
            .update_download_client(&instance(AppKind::Radarr, &server), &client, true)
            .await
    );
    assert_eq!(reply.msg, "Updated Main download client qBit (7).");
}

#[tokio::test]
async fn test_add_omits_unassigned_id() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/v1/downloadclient"))
        .respond_with(ResponseTemplate::new(201).set_body_json(qbit(12)))
        .expect(1)
        .mount(&server)
        .await;

    let template: DownloadClient = serde_json::from_value(qbit(0)).unwrap();
    let reply = assert_ok!(
        starrs()
            .add_download_client(&instance(AppKind::Prowlarr, &server), &template)
            .await
    );
    assert_eq!(reply.data.id, 12);

    let requests = server.received_requests().await.unwrap();
    let sent: serde_json::Value = serde_json::from_slice(&requests[0].body).unwrap();
    assert!(sent.get("id").is_none());
}

#[tokio::test]
async fn test_validation_error_is_unpacked() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/v3/downloadclient/test"))
        .respond_with(ResponseTemplate::new(400).set_body_json(json!([{
            "propertyName": "Host",
            "errorMessage": "Unable to connect to qBittorrent",
            "severity": "error"
        }])))
        .mount(&server)
        .await;

    let client: DownloadClient = serde_json::from_value(qbit(4)).unwrap();
    let failure = assert_err!(
        starrs()
            .test_download_client(&instance(AppKind::Whisparr, &server), &client)
            .await
    );

    assert_eq!(
        failure.message,
        "Testing Main download client: qBit (4): Host: Unable to connect to qBittorrent"
    );
    assert!(matches!(failure.cause, StarrError::Request(ref req) if req.code == 400));
}

#[tokio::test]
async fn test_delete_and_test_succeed_on_empty_bodies() {
    let server = MockServer::start().await;
    Mock::given(method("DELETE"))
        .and(path("/api/v3/downloadclient/7"))
        .respond_with(ResponseTemplate::new(200))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/api/v3/downloadclient/test"))
        .respond_with(ResponseTemplate::new(200))
        .expect(1)
        .mount(&server)
        .await;

    let starrs = starrs();
    let config = instance(AppKind::Sonarr, &server);
    let client: DownloadClient = serde_json::from_value(qbit(7)).unwrap();

    let msg = assert_ok!(starrs.delete_download_client(&config, 7).await);
    assert_eq!(msg, "Deleted Main download client with ID 7.");

    let msg = assert_ok!(starrs.test_download_client(&config, &client).await);
    assert_eq!(msg, "Tested Main download client qBit (7).");
}

#[tokio::test]
async fn test_unauthorized_plain_body() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/v3/qualityprofile"))
        .respond_with(ResponseTemplate::new(401).set_body_string("Unauthorized"))
        .mount(&server)
        .await;

    let failure = assert_err!(
        starrs()
            .quality_profiles(&instance(AppKind::Sonarr, &server))
            .await
    );
    assert_eq!(
        failure.message,
        "Getting Main quality profiles: invalid status code 401: Unauthorized"
    );
}

#[tokio::test]
async fn test_basic_auth_sent_when_configured() {
    let server = MockServer::start().await;
    // "admin:secret"
    Mock::given(method("GET"))
        .and(path("/api/v3/downloadclient"))
        .and(header("Authorization", "Basic YWRtaW46c2VjcmV0"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([])))
        .expect(1)
        .mount(&server)
        .await;

    let mut config = instance(AppKind::Radarr, &server);
    config.username = "admin".to_string();
    config.password = "secret".to_string();

    let clients = assert_ok!(starrs().download_clients(&config).await);
    assert!(clients.is_empty());
}
