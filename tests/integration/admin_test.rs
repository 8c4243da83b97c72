//! End-to-end tests through the Admin facade

use crate::support::{MockServer, Mode};
use paanj_admin::{Admin, AdminOptions};
use serde_json::{json, Value};
use std::time::Duration;
use tokio::sync::mpsc;
use wiremock::matchers::{header, method, path};
use wiremock::{Mock, ResponseTemplate};

#[tokio::test]
async fn test_admin_events_and_requests() {
    let mut ws_server = MockServer::start(Mode::Hold).await;
    let http_server = wiremock::MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/stats"))
        .and(header("X-API-Key", "sk_admin"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"online": 3})))
        .mount(&http_server)
        .await;

    let admin = Admin::new(
        "sk_admin",
        AdminOptions {
            api_url: http_server.uri(),
            ws_url: ws_server.url(),
            reconnect_interval: Duration::from_millis(50),
            ..Default::default()
        },
    )
    .unwrap();

    let (tx, mut rx) = mpsc::unbounded_channel::<Value>();
    admin
        .on("user.created", move |data| {
            let _ = tx.send(data);
        })
        .await;

    admin.connect().await.unwrap();
    assert!(admin.is_connected().await);
    let mut conn = ws_server.next_conn().await;
    assert_eq!(ws_server.uris(), vec!["/ws/admin?secretKey=sk_admin".to_string()]);

    admin
        .subscribe(&json!({"resource": "users", "events": ["user.created"]}))
        .await
        .unwrap();
    let sent: Value = serde_json::from_str(&conn.recv_text().await.unwrap()).unwrap();
    assert_eq!(sent["type"], "subscribe");
    assert_eq!(sent["data"]["resource"], "users");

    conn.send_text(json!({"type": "user.created", "data": {"id": 11}}).to_string());
    let event = tokio::time::timeout(crate::support::WAIT, rx.recv())
        .await
        .unwrap()
        .unwrap();
    assert_eq!(event, json!({"id": 11}));

    let stats = admin.http().get("/api/stats").await.unwrap();
    assert_eq!(stats, json!({"online": 3}));

    admin.disconnect().await;
    assert!(!admin.is_connected().await);
}
