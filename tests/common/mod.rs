#![allow(dead_code)]

use std::process::{Child, Command, Stdio};
use std::sync::{Mutex, OnceLock};
use std::time::{Duration, Instant};

use anyhow::{Context, Result};
use reqwest::StatusCode;

static SERVER: OnceLock<TestServer> = OnceLock::new();

pub struct TestServer {
    pub port: u16,
    pub base_url: String,
    child: Mutex<Child>,
}

impl TestServer {
    fn spawn() -> Result<Self> {
        // Pick an unused port for isolation
        let port = portpicker::pick_unused_port().context("failed to pick free port")?;
        let base_url = format!("http://127.0.0.1:{}", port);

        // Inherit environment so the server sees DB_HOST, DB_NAME, etc.
        let child = server_command(port).spawn().context("failed to spawn server binary")?;

        Ok(Self {
            port,
            base_url,
            child: Mutex::new(child),
        })
    }

    async fn wait_ready(&self, timeout: Duration) -> Result<()> {
        let client = reqwest::Client::new();
        let deadline = Instant::now() + timeout;
        loop {
            if Instant::now() > deadline {
                break;
            }
            if let Some(status) = self.child.lock().unwrap().try_wait()? {
                anyhow::bail!("server exited during startup with {}", status);
            }
            let url = format!("{}/health", self.base_url);
            if let Ok(resp) = client.get(&url).send().await {
                if resp.status() == StatusCode::OK {
                    return Ok(());
                }
            }
            tokio::time::sleep(Duration::from_millis(150)).await;
        }
        anyhow::bail!("server did not become ready on {} within {:?}", self.base_url, timeout)
    }

    pub fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }
}

/// The server binary, told to listen on `port`
pub fn server_command(port: u16) -> Command {
    let mut cmd = Command::new(env!("CARGO_BIN_EXE_collection-api"));
    cmd.env("PORT", port.to_string())
        .stdin(Stdio::null())
        .stdout(Stdio::inherit())
        .stderr(Stdio::inherit());
    cmd
}

/// Start the server once for the whole test binary.
///
/// Returns `None` when no database is configured (`DB_NAME` unset), so the
/// suite passes on machines without PostgreSQL. The schema in
/// `sql/schema.sql` must already be applied.
pub async fn ensure_server() -> Result<Option<&'static TestServer>> {
    if std::env::var("DB_NAME").is_err() {
        eprintln!("DB_NAME not set, skipping integration test");
        return Ok(None);
    }

    let server = SERVER.get_or_init(|| TestServer::spawn().expect("failed to spawn server binary"));
    server.wait_ready(Duration::from_secs(10)).await?;
    Ok(Some(server))
}

/// A uid no other test run has used
pub fn unique_uid(prefix: &str) -> String {
    format!("{}_{}", prefix, uuid::Uuid::new_v4().simple())
}
