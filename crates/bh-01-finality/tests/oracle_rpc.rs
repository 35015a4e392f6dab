//! End-to-end checks of the oracle against an in-process JSON-RPC node.

use axum::http::{HeaderMap, StatusCode};
use axum::routing::post;
use axum::{Json, Router};
use bh_01_finality::{AvalancheFinalityOracle, AvalancheRpcConfig, FinalityOracle};
use serde_json::{json, Value};
use std::io::Write;
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::net::TcpListener;
use tracing_subscriber::fmt::MakeWriter;

const H1: &str = "00000000000000000753144f1e8d9f02bd7539543d73dc9fd45355de5b99f504";
const H2: &str = "00000000000000000d92510871d9677ea0cb8341f06e8fae9a5e0c365ce81fa6";

#[derive(Clone, Default)]
struct LogBuffer(Arc<Mutex<Vec<u8>>>);

impl LogBuffer {
    fn contents(&self) -> String {
        String::from_utf8_lossy(&self.0.lock().unwrap()).into_owned()
    }
}

impl Write for LogBuffer {
    fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
        self.0.lock().unwrap().extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> std::io::Result<()> {
        Ok(())
    }
}

impl<'a> MakeWriter<'a> for LogBuffer {
    type Writer = LogBuffer;

    fn make_writer(&'a self) -> Self::Writer {
        self.clone()
    }
}

fn capture_logs() -> (LogBuffer, tracing::subscriber::DefaultGuard) {
    let buffer = LogBuffer::default();
    let subscriber = tracing_subscriber::fmt()
        .with_writer(buffer.clone())
        .with_ansi(false)
        .with_max_level(tracing::Level::DEBUG)
        .finish();
    let guard = tracing::subscriber::set_default(subscriber);
    (buffer, guard)
}

async fn serve(router: Router) -> String {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, router).await.unwrap();
    });
    format!("http://{}", addr)
}

fn canned(status: StatusCode, body: Value) -> Router {
    Router::new().route(
        "/",
        post(move || {
            let body = body.clone();
            async move { (status, Json(body)) }
        }),
    )
}

async fn oracle_for(router: Router) -> AvalancheFinalityOracle {
    let url = serve(router).await;
    AvalancheFinalityOracle::new(AvalancheRpcConfig::new(url))
}

#[tokio::test]
async fn test_finalized_block_returns_true() {
    let oracle = oracle_for(canned(
        StatusCode::OK,
        json!({"result": true, "error": null, "id": "isfinalblock"}),
    ))
    .await;

    assert!(oracle.is_final(H1).await);
}

#[tokio::test]
async fn test_unfinalized_block_returns_false() {
    let oracle = oracle_for(canned(
        StatusCode::OK,
        json!({"result": false, "error": null, "id": "isfinalblock"}),
    ))
    .await;

    assert!(!oracle.is_final(H2).await);
}

#[tokio::test]
async fn test_node_error_returns_false_and_logs_error_object() {
    let bad_hash = "not_a_blockhash";
    let message = format!(
        "blockhash must be of length 64 (not {}, for '{}')",
        bad_hash.len(),
        bad_hash
    );
    let oracle = oracle_for(canned(
        StatusCode::INTERNAL_SERVER_ERROR,
        json!({"result": null, "error": {"code": -8, "message": message}, "id": "isfinalblock"}),
    ))
    .await;

    let (logs, _guard) = capture_logs();
    assert!(!oracle.is_final(bad_hash).await);

    let output = logs.contents();
    assert!(output.contains("Node error from isFinalBlock"), "{}", output);
    assert!(output.contains(r#""code":-8"#), "{}", output);
    assert!(
        output.contains("blockhash must be of length 64 (not 15, for 'not_a_blockhash')"),
        "{}",
        output
    );
}

#[tokio::test]
async fn test_non_success_status_with_true_result_returns_false() {
    let oracle = oracle_for(canned(
        StatusCode::INTERNAL_SERVER_ERROR,
        json!({"result": true, "error": null, "id": "isfinalblock"}),
    ))
    .await;

    let (logs, _guard) = capture_logs();
    assert!(!oracle.is_final(H1).await);

    let output = logs.contents();
    assert!(output.contains(&format!("Error in isFinalBlock({})", H1)), "{}", output);
    assert!(output.contains("HTTP 500"), "{}", output);
}

#[tokio::test]
async fn test_timeout_returns_false_and_logs_hash() {
    let slow = Router::new().route(
        "/",
        post(|| async {
            tokio::time::sleep(Duration::from_millis(1500)).await;
            Json(json!({"result": true, "error": null, "id": "isfinalblock"}))
        }),
    );
    let oracle = oracle_for(slow).await;
    assert_eq!(oracle.config().timeout_ms, 1000);

    let (logs, _guard) = capture_logs();
    assert!(!oracle.is_final(H1).await);

    let output = logs.contents();
    assert!(output.contains(&format!("Error in isFinalBlock({})", H1)), "{}", output);
    assert!(output.contains("timeout of 1000ms exceeded"), "{}", output);
}

#[tokio::test]
async fn test_connection_refused_returns_false() {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);

    let oracle = AvalancheFinalityOracle::new(AvalancheRpcConfig::new(format!("http://{}", addr)));

    let (logs, _guard) = capture_logs();
    assert!(!oracle.is_final(H1).await);
    assert!(logs.contents().contains(H1));
}

#[tokio::test]
async fn test_garbage_body_returns_false() {
    let garbage = Router::new().route("/", post(|| async { "<html>bad gateway</html>" }));
    let oracle = oracle_for(garbage).await;

    assert!(!oracle.is_final(H1).await);
}

#[tokio::test]
async fn test_request_carries_method_params_and_basic_auth() {
    let seen: Arc<Mutex<Option<(Value, Option<String>)>>> = Arc::new(Mutex::new(None));
    let recorder = Arc::clone(&seen);
    let router = Router::new().route(
        "/",
        post(move |headers: HeaderMap, Json(request): Json<Value>| {
            let recorder = Arc::clone(&recorder);
            async move {
                let auth = headers
                    .get("authorization")
                    .and_then(|v| v.to_str().ok())
                    .map(str::to_string);
                *recorder.lock().unwrap() = Some((request, auth));
                Json(json!({"result": true, "error": null, "id": "isfinalblock"}))
            }
        }),
    );
    let url = serve(router).await;
    let config = AvalancheRpcConfig {
        username: Some("user".to_string()),
        password: Some("pass".to_string()),
        ..AvalancheRpcConfig::new(url)
    };
    let oracle = AvalancheFinalityOracle::new(config);

    assert!(oracle.is_final(H1).await);

    let (request, auth) = seen.lock().unwrap().clone().unwrap();
    assert_eq!(request["method"], "isfinalblock");
    assert_eq!(request["params"], json!([H1]));
    // base64("user:pass")
    assert_eq!(auth.as_deref(), Some("Basic dXNlcjpwYXNz"));
}
