#![allow(clippy::unwrap_used)]
// Bridge connection and accessory discovery against wiremock.

use std::time::Duration;

use secrecy::SecretString;
use serde_json::json;
use url::Url;
use wiremock::matchers::{basic_auth, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

use verisure_api::VerisureClient;
use verisure_core::bridge::ConnectionState;
use verisure_core::{
    AccessoryValue, Bridge, BridgeConfig, CoreError, LockState, PollPolicy, SecurityState,
    ServiceKind, Session,
};

// ── Helpers ─────────────────────────────────────────────────────────

async fn setup(alarm_code: Option<&str>) -> (MockServer, Bridge) {
    setup_with(alarm_code, |_| {}).await
}

async fn setup_with(
    alarm_code: Option<&str>,
    configure: impl FnOnce(&mut BridgeConfig),
) -> (MockServer, Bridge) {
    let server = MockServer::start().await;
    let base_url = Url::parse(&server.uri()).unwrap();

    let mut config = BridgeConfig::new(
        base_url.clone(),
        "owner@example.com",
        SecretString::from("hunter2".to_string()),
    );
    config.alarm_code = alarm_code.map(|c| SecretString::from(c.to_string()));
    config.door_code = Some(SecretString::from("5678".to_string()));
    config.poll = PollPolicy {
        interval: Duration::from_millis(10),
        max_retries: 8,
    };
    configure(&mut config);

    let session = Session::new(VerisureClient::with_client(reqwest::Client::new(), base_url));
    (server, Bridge::with_session(config, session))
}

async fn mount_login(server: &MockServer) {
    Mock::given(method("POST"))
        .and(path("/cookie"))
        .and(basic_auth("CPE/owner@example.com", "hunter2"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "cookie": "tok" })))
        .mount(server)
        .await;
}

async fn mount_installations(server: &MockServer, body: serde_json::Value) {
    Mock::given(method("GET"))
        .and(path("/installation/search"))
        .and(query_param("email", "owner@example.com"))
        .respond_with(ResponseTemplate::new(200).set_body_json(body))
        .mount(server)
        .await;
}

fn full_overview() -> serde_json::Value {
    json!({
        "armState": { "statusType": "ARMED_HOME", "date": "2024-03-01T18:04:11.000Z" },
        "climateValues": [
            { "deviceLabel": "SMK1", "deviceArea": "Hall", "deviceType": "SMOKE2", "temperature": 21.0 },
            { "deviceLabel": "SMK2", "deviceArea": "Hall", "deviceType": "SMOKE2", "temperature": 19.5 },
            { "deviceLabel": "HUM1", "deviceArea": "Bad", "deviceType": "HUMIDITY1", "temperature": 24.0 }
        ],
        "smartPlugs": [
            { "deviceLabel": "P1", "area": "Kitchen", "currentState": "ON" },
            { "deviceLabel": "P2", "area": "Kitchen", "currentState": "OFF" },
            { "deviceLabel": "P3", "area": "Kitchen", "currentState": "OFF" }
        ],
        "doorLockStatusList": [
            { "deviceLabel": "LOCK1", "area": "Entré", "lockedState": "LOCKED" }
        ]
    })
}

// ── Tests ───────────────────────────────────────────────────────────

#[tokio::test]
async fn test_discovery_names_and_order() {
    let (server, mut bridge) = setup(Some("1234")).await;
    mount_login(&server).await;
    mount_installations(&server, json!([{ "giid": "111", "street": "Storgatan 1" }])).await;
    Mock::given(method("GET"))
        .and(path("/installation/111/overview"))
        .respond_with(ResponseTemplate::new(200).set_body_json(full_overview()))
        .expect(1)
        .mount(&server)
        .await;

    let accessories = bridge.discover().await.unwrap();
    let names: Vec<_> = accessories.iter().map(|a| a.name()).collect();

    assert_eq!(
        names,
        [
            "Larm (Storgatan 1)",
            "Rökdetektor (Hall)",
            "Rökdetektor (Hall) #2",
            "Klimatdetektor (Bad)",
            "Smart plug (Kitchen)",
            "Smart plug (Kitchen) #2",
            "Smart plug (Kitchen) #3",
            "Entré",
        ]
    );

    let alarm = &accessories[0];
    assert_eq!(alarm.info().serial_number, "111");
    assert_eq!(alarm.info().service, ServiceKind::SecuritySystem);
    assert_eq!(
        alarm.last_known().current,
        AccessoryValue::Security(SecurityState::Stay)
    );

    let lock = &accessories[7];
    assert_eq!(lock.info().category, Some(6));
    assert_eq!(lock.info().model, "Yale Doorman");
    assert_eq!(lock.last_known().current, AccessoryValue::Lock(LockState::Secured));

    assert_eq!(accessories[4].last_known().current, AccessoryValue::Switch(true));
    assert_eq!(*bridge.connection_state().borrow(), ConnectionState::Connected);
    assert!(bridge.accessory("entré").is_some());
}

#[tokio::test]
async fn test_no_alarm_without_code() {
    let (server, mut bridge) = setup(None).await;
    mount_login(&server).await;
    mount_installations(&server, json!([{ "giid": "111", "street": "Storgatan 1" }])).await;
    Mock::given(method("GET"))
        .and(path("/installation/111/overview"))
        .respond_with(ResponseTemplate::new(200).set_body_json(full_overview()))
        .mount(&server)
        .await;

    let accessories = bridge.discover().await.unwrap();
    assert_eq!(accessories.len(), 7);
    assert!(
        accessories
            .iter()
            .all(|a| a.info().service != ServiceKind::SecuritySystem)
    );
}

#[tokio::test]
async fn test_ignored_installation_gets_no_alarm() {
    let (server, mut bridge) = setup_with(Some("1234"), |config| {
        config.ignore_alarms.insert("111".into());
    })
    .await;
    mount_login(&server).await;
    mount_installations(&server, json!([{ "giid": "111", "street": "Storgatan 1" }])).await;
    Mock::given(method("GET"))
        .and(path("/installation/111/overview"))
        .respond_with(ResponseTemplate::new(200).set_body_json(full_overview()))
        .mount(&server)
        .await;

    let accessories = bridge.discover().await.unwrap();
    assert_eq!(accessories.len(), 7);
    assert_eq!(accessories[0].name(), "Rökdetektor (Hall)");
}

#[tokio::test]
async fn test_names_unique_across_installations() {
    let (server, mut bridge) = setup(None).await;
    mount_login(&server).await;
    mount_installations(
        &server,
        json!([{ "giid": "111", "street": "A" }, { "giid": "222", "street": "B" }]),
    )
    .await;
    for giid in ["111", "222"] {
        Mock::given(method("GET"))
            .and(path(format!("/installation/{giid}/overview")))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "smartPlugs": [{ "deviceLabel": format!("P-{giid}"), "area": "Kitchen", "currentState": "ON" }]
            })))
            .mount(&server)
            .await;
    }

    let names: Vec<_> = bridge
        .discover()
        .await
        .unwrap()
        .iter()
        .map(|a| a.name().to_owned())
        .collect();
    assert_eq!(names, ["Smart plug (Kitchen)", "Smart plug (Kitchen) #2"]);
}

#[tokio::test]
async fn test_unknown_arm_state_skips_installation() {
    let (server, mut bridge) = setup(Some("1234")).await;
    mount_login(&server).await;
    mount_installations(&server, json!([{ "giid": "111" }])).await;
    Mock::given(method("GET"))
        .and(path("/installation/111/overview"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(json!({ "armState": { "statusType": "ARMED_PARTY" } })),
        )
        .mount(&server)
        .await;

    let err = bridge.discover().await.unwrap_err();
    assert!(matches!(err, CoreError::UnknownState { kind: "arm", .. }));
}

#[tokio::test]
async fn test_bad_credentials_fail_connect() {
    let (server, mut bridge) = setup(None).await;
    Mock::given(method("POST"))
        .and(path("/cookie"))
        .respond_with(ResponseTemplate::new(401))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/installation/search"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([])))
        .expect(0)
        .mount(&server)
        .await;

    let err = bridge.connect().await.unwrap_err();
    assert!(err.is_auth());
    assert_eq!(*bridge.connection_state().borrow(), ConnectionState::Failed);
}
