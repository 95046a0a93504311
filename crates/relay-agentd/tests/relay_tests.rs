#![cfg(target_family = "unix")]

use std::{
    collections::HashMap,
    sync::{Arc, Mutex},
    time::Duration,
};

use axum::{
    Form, Router,
    extract::State,
    http::{StatusCode, Uri},
    routing::post,
};
use tokio::{net::TcpListener, sync::mpsc, time::timeout};
use tokio_util::sync::CancellationToken;

use relay_core::{RelaySession, SessionConfig, SessionOutcome};
use relay_exec::{WorkerConfig, WorkerProcess};
use relay_model::TaskPayload;
use relay_report::{HttpReporter, ReportEncoding, ReporterConfig};

type Seen = Arc<Mutex<Vec<(String, HashMap<String, String>)>>>;

async fn record(
    State(seen): State<Seen>,
    uri: Uri,
    Form(fields): Form<HashMap<String, String>>,
) -> StatusCode {
    seen.lock().unwrap().push((uri.path().to_string(), fields));
    StatusCode::OK
}

async fn spawn_controller() -> (String, Seen) {
    let seen: Seen = Arc::default();
    let app = Router::new()
        .route("/tasks/42/{endpoint}", post(record))
        .with_state(seen.clone());

    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });
    (format!("http://{addr}/tasks/42/"), seen)
}

fn session(base_url: String, watchdog_interval_ms: u64) -> RelaySession {
    let reporter = HttpReporter::new(&ReporterConfig {
        base_url,
        encoding: ReportEncoding::Form,
        request_timeout_ms: 5_000,
    })
    .unwrap();
    let cfg = SessionConfig {
        watchdog_interval_ms,
        ..Default::default()
    };
    RelaySession::new(cfg, Arc::new(reporter)).unwrap()
}

fn payload() -> TaskPayload {
    TaskPayload::merge(
        r#"{"task": "reduce"}"#,
        &[r#"["part-0.txt"]"#, r#"["part-1.txt"]"#],
    )
    .unwrap()
}

async fn relay(script: &str, session: RelaySession) -> relay_core::SessionReport {
    relay_with(script, &payload(), session).await
}

async fn relay_with(
    script: &str,
    payload: &TaskPayload,
    session: RelaySession,
) -> relay_core::SessionReport {
    let (tx, rx) = mpsc::channel(16);
    let cfg = WorkerConfig::new("sh").with_args(["-c", script]);
    let worker = WorkerProcess::spawn(&cfg, payload, tx).await.unwrap();

    let report = timeout(
        Duration::from_secs(20),
        session.run(rx, CancellationToken::new()),
    )
    .await
    .expect("session did not finish");
    worker.shutdown().await.unwrap();
    report
}

#[tokio::test]
async fn worker_done_is_reported_to_controller() {
    let (base, seen) = spawn_controller().await;
    let script = r#"read line
echo 'LOG: reducing'
echo 'TIMEOUT-RESET:reducing'
echo '["done", {"job": 42}, ["out-0.txt", "out-1.txt"]]'
sleep 5"#;

    let report = relay(script, session(base, 60_000)).await;

    assert_eq!(report.outcome, SessionOutcome::Done);
    assert!(report.submitted);

    let seen = seen.lock().unwrap();
    assert_eq!(seen.len(), 1);
    assert_eq!(seen[0].0, "/tasks/42/done");
    assert_eq!(seen[0].1["metadata"], r#"{"job":42}"#);
    assert_eq!(seen[0].1["result"], r#"["out-0.txt","out-1.txt"]"#);
}

#[tokio::test]
async fn silent_worker_is_cancelled_by_watchdog() {
    let (base, seen) = spawn_controller().await;
    let script = r#"read line
echo 'TIMEOUT-RESET:stuck-on-input'
exec sleep 30"#;

    let report = relay(script, session(base, 200)).await;

    assert_eq!(
        report.outcome,
        SessionOutcome::TimedOut {
            reason: "stuck-on-input".into()
        }
    );
    assert!(report.submitted);

    let seen = seen.lock().unwrap();
    assert_eq!(seen.len(), 1);
    assert_eq!(seen[0].0, "/tasks/42/cancel");
    assert_eq!(seen[0].1["metadata"], "[]");
    assert!(seen[0].1["reason"].contains(r#""message":"stuck-on-input""#));
}

#[tokio::test]
async fn worker_exit_without_outcome_is_cancelled() {
    let (base, seen) = spawn_controller().await;
    let script = r#"read line
echo 'LOG: giving up quietly'"#;

    let report = relay(script, session(base, 60_000)).await;

    assert_eq!(report.outcome, SessionOutcome::WorkerLost);
    assert!(report.submitted);

    let seen = seen.lock().unwrap();
    assert_eq!(seen.len(), 1);
    assert_eq!(seen[0].0, "/tasks/42/cancel");
    assert!(seen[0].1["reason"].contains("worker channel closed"));
}

#[tokio::test]
async fn worker_sees_merged_dependencies() {
    let (base, seen) = spawn_controller().await;
    // Echo the payload back as the done metadata.
    let script = r#"read line
echo "[\"done\", $line, []]""#;

    let report = relay(script, session(base, 60_000)).await;

    assert_eq!(report.outcome, SessionOutcome::Done);
    let seen = seen.lock().unwrap();
    assert_eq!(
        seen[0].1["metadata"],
        r#"{"dependencies":["part-0.txt","part-1.txt"],"task":"reduce"}"#
    );
}

#[tokio::test]
async fn watchdog_fires_while_worker_ignores_a_large_payload() {
    let (base, seen) = spawn_controller().await;
    let details = format!(r#"{{"blob": "{}"}}"#, "x".repeat(1 << 20));
    let payload = TaskPayload::merge(&details, &[r#"["part-0.txt"]"#]).unwrap();
    let script = "echo TIMEOUT-RESET:slow; exec sleep 30";

    let report = relay_with(script, &payload, session(base, 300)).await;

    assert_eq!(
        report.outcome,
        SessionOutcome::TimedOut {
            reason: "slow".into()
        }
    );
    assert!(report.submitted);
    let seen = seen.lock().unwrap();
    assert_eq!(seen.len(), 1);
    assert_eq!(seen[0].0, "/tasks/42/cancel");
}
