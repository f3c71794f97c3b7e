mod http;

use std::env;
use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;
use std::time::Duration;

use vigil_core::models::{CanonicalStatus, MonitorSnapshot, ResourceId, TaskHandle};
use vigil_core::monitor::PollConfig;
use vigil_core::ops::{ReinstallMonitor, RescueMonitor};
use vigil_core::persistence::{InMemorySessionStore, SessionStore};
use vigil_core::remote::ControlPlane;
use vigil_core::sqlite::SqliteSessionStore;

use crate::http::HttpControlPlane;

const USAGE: &str = "usage:
  vigil status <base-url> <resource-id>
  vigil reinstall <base-url> <resource-id> [task-id]
  vigil rescue <base-url> <resource-id> <on|off>

environment:
  VIGIL_SESSION_DB  path of the session-scoped sqlite scratch file";

fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let args: Vec<String> = env::args().skip(1).collect();

    let runtime = match tokio::runtime::Builder::new_multi_thread().enable_all().build() {
        Ok(runtime) => runtime,
        Err(error) => {
            eprintln!("vigil: failed to start async runtime: {error}");
            return ExitCode::FAILURE;
        }
    };

    match runtime.block_on(run(args)) {
        Ok(()) => ExitCode::SUCCESS,
        Err(message) => {
            eprintln!("vigil: {message}");
            ExitCode::FAILURE
        }
    }
}

async fn run(args: Vec<String>) -> Result<(), String> {
    let mut args = args.into_iter();
    let command = args.next().ok_or_else(|| USAGE.to_string())?;

    match command.as_str() {
        "status" => {
            let base_url = args.next().ok_or_else(|| USAGE.to_string())?;
            let resource = ResourceId::new(args.next().ok_or_else(|| USAGE.to_string())?);
            let plane = HttpControlPlane::new(base_url);

            let report = tokio::task::spawn_blocking(move || plane.build_status(&resource))
                .await
                .map_err(|error| format!("status fetch join failure: {error}"))?
                .map_err(|error| error.to_string())?;
            let rendered = serde_json::to_string_pretty(&report)
                .map_err(|error| format!("failed to render report: {error}"))?;
            println!("{rendered}");
            Ok(())
        }
        "reinstall" => {
            let base_url = args.next().ok_or_else(|| USAGE.to_string())?;
            let resource = ResourceId::new(args.next().ok_or_else(|| USAGE.to_string())?);
            let task_id = args.next().map(TaskHandle::new);

            let plane: Arc<dyn ControlPlane> = Arc::new(HttpControlPlane::new(base_url));
            let monitor =
                ReinstallMonitor::attach(resource, plane, session_store(), PollConfig::default())
                    .await;

            let resumed = monitor.snapshot().await;
            if resumed.is_active {
                println!("resuming reinstall already in progress");
            } else {
                monitor.start(task_id).await;
            }
            watch(|| monitor.snapshot()).await
        }
        "rescue" => {
            let base_url = args.next().ok_or_else(|| USAGE.to_string())?;
            let resource = ResourceId::new(args.next().ok_or_else(|| USAGE.to_string())?);
            let direction = args.next().ok_or_else(|| USAGE.to_string())?;

            let plane: Arc<dyn ControlPlane> = Arc::new(HttpControlPlane::new(base_url));
            let monitor =
                RescueMonitor::attach(resource, plane, session_store(), PollConfig::default())
                    .await;

            match direction.as_str() {
                "on" => monitor.enable().await.map_err(|error| error.to_string())?,
                "off" => monitor.disable().await.map_err(|error| error.to_string())?,
                _ => return Err(USAGE.to_string()),
            }
            let outcome = watch(|| monitor.snapshot()).await;

            let snapshot = monitor.snapshot().await;
            if let Some(credentials) = snapshot.credentials {
                println!("rescue login (shown once, not stored):");
                println!("  host:     {}", credentials.server_ip);
                println!("  username: {}", credentials.username);
                println!("  password: {}", credentials.password);
            }
            outcome
        }
        _ => Err(USAGE.to_string()),
    }
}

fn session_store() -> Arc<dyn SessionStore> {
    let path = env::var_os("VIGIL_SESSION_DB")
        .map(PathBuf::from)
        .unwrap_or_else(|| env::temp_dir().join("vigil-session.sqlite"));

    let store = SqliteSessionStore::new(path);
    match store.migrate_to_latest() {
        Ok(()) => Arc::new(store),
        Err(error) => {
            tracing::warn!(
                kind = ?error.kind,
                message = %error.message,
                "session scratch database unavailable; falling back to in-memory store"
            );
            Arc::new(InMemorySessionStore::new())
        }
    }
}

/// Prints timeline rows as they appear and returns once the monitor reaches
/// a terminal status.
async fn watch<F, Fut>(snapshot: F) -> Result<(), String>
where
    F: Fn() -> Fut,
    Fut: Future<Output = MonitorSnapshot>,
{
    let mut printed = 0usize;
    let mut started_at: Option<u64> = None;

    loop {
        let current = snapshot().await;

        for entry in current.timeline.iter().skip(printed) {
            let base = *started_at.get_or_insert(entry.timestamp);
            let elapsed = (entry.timestamp.saturating_sub(base)) as f64 / 1000.0;
            let message = entry.message.as_deref().unwrap_or("");
            println!(
                "[{elapsed:>7.1}s] {:<12} {:>3}%  {message}",
                entry.status.as_str(),
                current.percent
            );
        }
        printed = current.timeline.len();

        match current.status {
            CanonicalStatus::Complete => return Ok(()),
            CanonicalStatus::Failed => {
                return Err(current
                    .error
                    .unwrap_or_else(|| "operation failed".to_string()));
            }
            _ if !current.is_active => return Ok(()),
            _ => tokio::time::sleep(Duration::from_millis(500)).await,
        }
    }
}
