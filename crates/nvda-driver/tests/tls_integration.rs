//! The default TLS upgrade against a server with a self-signed certificate.
//!
//! NVDA Remote presents a certificate no trust store knows about.  The fake
//! server here does the same with the identity in `tests/fixtures/`, and the
//! driver must still complete the handshake and hear speech through it.

use std::sync::atomic::Ordering;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use nvda_core::Key;
use nvda_driver::domain::DriverConfig;
use nvda_driver::infrastructure::build_driver_with;
use nvda_driver::infrastructure::process::mock::MockProcessLauncher;
use nvda_driver::infrastructure::TlsUpgrader;
use serde_json::Value;
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};
use tokio::net::TcpListener;
use tokio::task::JoinHandle;

const CERT_PEM: &[u8] = include_bytes!("fixtures/nvdaremote.cert.pem");
const KEY_PEM: &[u8] = include_bytes!("fixtures/nvdaremote.key.pem");
const SERVER_NAME: &str = "nvdaremote.com";

fn acceptor() -> tokio_native_tls::TlsAcceptor {
    let identity = native_tls::Identity::from_pkcs8(CERT_PEM, KEY_PEM).unwrap();
    let acceptor = native_tls::TlsAcceptor::new(identity).unwrap();
    tokio_native_tls::TlsAcceptor::from(acceptor)
}

/// Accepts one TLS client, records its lines and answers like NVDA: a cancel
/// when Control goes down, the window title when T is released.
async fn start_tls_server() -> (u16, Arc<Mutex<Vec<Value>>>, JoinHandle<()>) {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let port = listener.local_addr().unwrap().port();
    let received = Arc::new(Mutex::new(Vec::new()));
    let log = Arc::clone(&received);
    let tls = acceptor();

    let handle = tokio::spawn(async move {
        let (socket, _) = listener.accept().await.unwrap();
        let stream = tls.accept(socket).await.unwrap();
        let (read_half, mut write_half) = tokio::io::split(stream);
        let mut lines = BufReader::new(read_half).lines();

        while let Ok(Some(line)) = lines.next_line().await {
            let value: Value = serde_json::from_str(&line).unwrap();
            let reply = match (value["type"].as_str(), value["vk_code"].as_u64(), value["pressed"].as_bool()) {
                (Some("key"), Some(vk), Some(true)) if vk == u64::from(Key::CONTROL.vk_code) => {
                    Some("{\"type\":\"cancel\"}\n")
                }
                (Some("key"), Some(vk), Some(false)) if vk == u64::from(Key::T.vk_code) => {
                    Some("{\"type\":\"speak\",\"sequence\":[\"Untitled+-+Notepad\"]}\n")
                }
                _ => None,
            };
            if let Some(reply) = reply {
                let _ = write_half.write_all(reply.as_bytes()).await;
                let _ = write_half.flush().await;
            }
            log.lock().unwrap().push(value);
        }
    });

    (port, received, handle)
}

fn config_for(port: u16) -> DriverConfig {
    let mut config = DriverConfig::default();
    config.connection.port = port;
    config.connection.connect_timeout_ms = 2_000;
    config.speech.utterance_timeout_ms = 2_000;
    config.speech.quiet_period_ms = 100;
    config.speech.poll_interval_ms = 50;
    config.speech.stop_speaking_timeout_ms = 500;
    config.process.exit_grace_ms = 10;
    config
}

#[tokio::test]
async fn test_tls_upgrade_accepts_self_signed_certificate() {
    // Arrange
    let (port, received, server) = start_tls_server().await;
    let launcher = Arc::new(MockProcessLauncher::new());
    let driver = build_driver_with(
        &config_for(port),
        Arc::clone(&launcher) as _,
        Arc::new(TlsUpgrader::new(SERVER_NAME)),
    );

    // Act
    driver.connect().await.unwrap();
    let text = driver
        .send_keys_and_get_spoken_text(&[Key::NVDA, Key::T], None, None)
        .await
        .unwrap();
    driver.dispose().await;

    // Assert: speech came back decoded and the handshake went first
    assert_eq!(text, "Untitled - Notepad");
    tokio::time::timeout(Duration::from_secs(5), server)
        .await
        .expect("server should see the connection close")
        .unwrap();
    let received = received.lock().unwrap().clone();
    assert_eq!(received[0], serde_json::json!({"type": "protocol_version", "version": 2}));
    assert_eq!(
        received[1],
        serde_json::json!({"type": "join", "connection_type": "master", "channel": "NvdaRemote"})
    );
    assert_eq!(launcher.launches.load(Ordering::SeqCst), 1);
}
