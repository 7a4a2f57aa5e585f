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

        // Spawn the compiled server binary; cargo exposes its path to
        // integration tests
        let mut cmd = Command::new(env!("CARGO_BIN_EXE_store-ratings-api"));
        cmd.env("PORT", port.to_string())
            // Token-shape tests need a signing secret even without a database
            .env("JWT_SECRET", "integration-test-secret")
            // Fail fast instead of hanging health checks when no database is up
            .env("DATABASE_ACQUIRE_TIMEOUT_SECS", "2")
            .stdin(Stdio::null())
            // Use null (not inherit) so the helper server does not hold the
            // test binary's stdout/stderr open after tests finish — otherwise
            // the never-dropped OnceLock child keeps cargo's output pipe from
            // reaching EOF and `cargo test` hangs forever.
            .stdout(Stdio::null())
            .stderr(Stdio::null());

        // Inherit the rest of the environment so the server can see a
        // DATABASE_URL when one is configured
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
            let url = format!("{}/api/health", self.base_url);
            if let Ok(resp) = client.get(&url).send().await {
                // Ready on either outcome; health degrades to 503 without a database
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
    let server = SERVER.get_or_init(|| TestServer::spawn().expect("failed to spawn server binary"));
    server.wait_ready(Duration::from_secs(30)).await?;
    Ok(server)
}
