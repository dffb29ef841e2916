use std::process::{Child, Command, Stdio};
use std::sync::OnceLock;
use std::time::{Duration, Instant};

use anyhow::{Context, Result};
use reqwest::StatusCode;

static SERVER: OnceLock<TestServer> = OnceLock::new();

pub struct TestServer {
    pub port: u16,
    pub base_url: String,
    #[allow(dead_code)]
    child: Child,
}

impl TestServer {
    fn spawn() -> Result<Self> {
        // Pick an unused port for isolation
        let port = portpicker::pick_unused_port().context("failed to pick free port")?;
        let base_url = format!("http://127.0.0.1:{}", port);

        // Spawn the already-built binary to keep start fast during tests
        // Assumes debug profile; adjust if you run tests with --release
        let mut cmd = Command::new("target/debug/tutorhub-api");
        cmd.env("TUTORHUB_API_PORT", port.to_string())
            .stdin(Stdio::null())
            .stdout(Stdio::inherit())
            .stderr(Stdio::inherit());

        // Inherit environment so the server can see DATABASE_URL from .env
        let child = cmd.spawn().context("failed to spawn server binary")?;

        Ok(Self {
            port,
            base_url,
            child,
        })
    }

    async fn wait_ready(&self, timeout: Duration) -> Result<()> {
        let client = reqwest::Client::new();
        let deadline = Instant::now() + timeout;
        loop {
            if Instant::now() > deadline {
                break;
            }
            let url = format!("{}/health", self.base_url);
            if let Ok(resp) = client.get(&url).send().await {
                // Ready as soon as the router answers, database or not
                if resp.status() == StatusCode::OK
                    || resp.status() == StatusCode::SERVICE_UNAVAILABLE
                {
                    return Ok(());
                }
            }
            tokio::time::sleep(Duration::from_millis(150)).await;
        }
        anyhow::bail!(
            "server did not become ready on {} within {:?}",
            self.base_url,
            timeout
        )
    }
}

pub async fn ensure_server() -> Result<&'static TestServer> {
    let server =
        SERVER.get_or_init(|| TestServer::spawn().expect("failed to spawn server binary"));
    server.wait_ready(Duration::from_secs(10)).await?;
    Ok(server)
}

/// Whether the server has a working database behind it. Flows that need
/// real rows skip themselves when this is false, so the suite still runs
/// on machines without a local Postgres.
#[allow(dead_code)]
pub async fn db_available(server: &TestServer) -> bool {
    let client = reqwest::Client::new();
    match client
        .get(format!("{}/health", server.base_url))
        .send()
        .await
    {
        Ok(resp) => resp.status() == StatusCode::OK,
        Err(_) => false,
    }
}

/// Unique email per test run to keep signup tests re-runnable.
#[allow(dead_code)]
pub fn unique_email(prefix: &str) -> String {
    format!("{}+{}@example.com", prefix, uuid::Uuid::new_v4().simple())
}

/// Known admin credentials for flows that need moderation.
#[allow(dead_code)]
pub const ADMIN_EMAIL: &str = "harness.admin@example.com";
#[allow(dead_code)]
pub const ADMIN_PASSWORD: &str = "harness-admin-password";

/// Run the ops CLI binary and wait for it to finish.
#[allow(dead_code)]
pub fn run_cli(args: &[&str]) -> Result<()> {
    let status = Command::new("target/debug/tutorhub")
        .args(args)
        .stdin(Stdio::null())
        .status()
        .context("failed to run cli binary")?;
    anyhow::ensure!(status.success(), "cli {:?} exited with {}", args, status);
    Ok(())
}

static FIXTURES: OnceLock<()> = OnceLock::new();

/// Migrate and seed the catalog plus a known admin. Every command is
/// idempotent on the database side, the lock only avoids repeat work
/// within one test binary.
#[allow(dead_code)]
pub fn ensure_fixtures() -> Result<()> {
    FIXTURES.get_or_init(|| {
        run_cli(&["migrate"]).expect("migrate failed");
        run_cli(&["seed", "catalog"]).expect("seed catalog failed");
        run_cli(&[
            "seed",
            "admin",
            "--email",
            ADMIN_EMAIL,
            "--password",
            ADMIN_PASSWORD,
        ])
        .expect("seed admin failed");
    });
    Ok(())
}
