// tests/telegram.rs
//
// Dispatcher behavior against a wiremock stand-in for the Bot API, plus
// the configuration short-circuit (no network I/O at all).

use wiremock::matchers::{body_string_contains, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use xmonitor::config::TelegramConfig;
use xmonitor::notify::{Button, Notifier, TelegramNotifier};

fn config(token: Option<&str>, chat: Option<&str>) -> TelegramConfig {
    TelegramConfig {
        bot_token: token.map(str::to_string),
        chat_id: chat.map(str::to_string),
    }
}

async fn notifier_against(server: &MockServer) -> TelegramNotifier {
    TelegramNotifier::from_config(&config(Some("TOKEN"), Some("-100"))).with_api_base(&server.uri())
}

#[tokio::test]
async fn missing_credentials_short_circuit_without_io() {
    let server = MockServer::start().await;
    // No mocks registered: any request would 404 and the final expectation
    // of zero received requests would fail.

    for cfg in [
        config(None, Some("-100")),
        config(Some("TOKEN"), None),
        config(None, None),
    ] {
        let notifier = TelegramNotifier::from_config(&cfg).with_api_base(&server.uri());
        assert!(!notifier.send("hello", None).await);
        assert!(!notifier.send_with_buttons("hello", &[Button::new("b", "u")]).await);
    }

    assert!(server.received_requests().await.unwrap().is_empty());
}

#[tokio::test]
async fn delivery_succeeds_on_ok_true() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/botTOKEN/sendMessage"))
        .and(body_string_contains("hello world"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "ok": true,
            "result": {"message_id": 1}
        })))
        .expect(1)
        .mount(&server)
        .await;

    let notifier = notifier_against(&server).await;
    assert!(notifier.send_message("hello world").await);
}

#[tokio::test]
async fn buttons_are_serialized_as_inline_keyboard() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/botTOKEN/sendMessage"))
        .and(body_string_contains("inline_keyboard"))
        .and(body_string_contains("View original"))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(serde_json::json!({"ok": true})),
        )
        .expect(1)
        .mount(&server)
        .await;

    let notifier = notifier_against(&server).await;
    let buttons = vec![
        Button::new("View original", "https://twitter.com/a/status/1"),
        Button::new("ACM/USDT Binance", "https://binance.test"),
        Button::new("ACM/USDT OKX", "https://okx.test"),
    ];
    assert!(notifier.send("alert", Some(&buttons)).await);
}

#[tokio::test]
async fn ok_false_payload_is_a_failure() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/botTOKEN/sendMessage"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "ok": false,
            "description": "Bad Request: chat not found"
        })))
        .mount(&server)
        .await;

    let notifier = notifier_against(&server).await;
    assert!(!notifier.send_message("hello").await);
}

#[tokio::test]
async fn non_200_status_is_a_failure() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/botTOKEN/sendMessage"))
        .respond_with(ResponseTemplate::new(502).set_body_json(serde_json::json!({"ok": false})))
        .mount(&server)
        .await;

    let notifier = notifier_against(&server).await;
    assert!(!notifier.send_message("hello").await);
}

#[tokio::test]
async fn connectivity_self_test_checks_bot_identity() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/botTOKEN/getMe"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "ok": true,
            "result": {"username": "xmonitor_bot"}
        })))
        .expect(1)
        .mount(&server)
        .await;

    let notifier = notifier_against(&server).await;
    assert!(notifier.test_connection().await);

    let unconfigured = TelegramNotifier::from_config(&config(None, None));
    assert!(!unconfigured.test_connection().await);
}

#[tokio::test]
async fn error_notification_uses_the_alert_template() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/botTOKEN/sendMessage"))
        .and(body_string_contains("XMonitor system error"))
        .and(body_string_contains("db write failed"))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(serde_json::json!({"ok": true})),
        )
        .expect(1)
        .mount(&server)
        .await;

    let notifier = notifier_against(&server).await;
    assert!(notifier.send_error_notification("db write failed").await);
}
