use std::net::SocketAddr;
use std::path::PathBuf;

use anyhow::Context;
use clap::Parser;
use presentationer::server::{self, AppState, ServerConfig};
use presentationer::{create_session_store, FileSessionStore, SessionBackendConfig};
use tracing::info;

const CONFIG_DIR: &str = ".presentationer";
const SESSIONS_DIR: &str = "sessions";

#[derive(Parser)]
#[command(
    name = "presentationer",
    about = "Serve the presentation session API",
    version
)]
struct Cli {
    /// Address to bind
    #[arg(long, default_value = "127.0.0.1", env = "PRESENTATIONER_HOST")]
    host: String,

    /// Port to listen on
    #[arg(short, long, default_value_t = 8080, env = "PRESENTATIONER_PORT")]
    port: u16,

    /// Directory holding one sub-directory per session (default: ~/.presentationer/sessions)
    #[arg(long, env = "PRESENTATIONER_SESSIONS_DIR", conflicts_with = "in_memory")]
    sessions_dir: Option<PathBuf>,

    /// Keep sessions in memory only
    #[arg(long)]
    in_memory: bool,

    /// Largest accepted avatar upload, in MiB
    #[arg(long, default_value_t = 10)]
    max_avatar_mib: usize,

    /// Do not upgrade sessions still stored as a single pages.json
    #[arg(long)]
    skip_migration: bool,
}

impl Cli {
    fn backend(&self) -> anyhow::Result<SessionBackendConfig> {
        if self.in_memory {
            return Ok(SessionBackendConfig::InMemory);
        }
        let root = match &self.sessions_dir {
            Some(dir) => dir.clone(),
            None => dirs::home_dir()
                .context("cannot determine home directory; pass --sessions-dir")?
                .join(CONFIG_DIR)
                .join(SESSIONS_DIR),
        };
        Ok(SessionBackendConfig::File { root })
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "presentationer=info,tower_http=info".into()),
        )
        .init();

    let cli = Cli::parse();
    let backend = cli.backend()?;

    if let SessionBackendConfig::File { root } = &backend {
        info!(root = %root.display(), "using sessions directory");
        if !cli.skip_migration {
            let report = FileSessionStore::new(root)
                .migrate_legacy_layouts()
                .context("migrating legacy session layouts")?;
            if !report.is_empty() {
                info!(
                    migrated = report.migrated.len(),
                    skipped = report.skipped.len(),
                    failed = report.failed.len(),
                    "legacy layout migration finished"
                );
            }
        }
    }

    let store = create_session_store(backend).context("building session store")?;
    let config = ServerConfig {
        max_avatar_bytes: cli.max_avatar_mib.saturating_mul(1 << 20),
    };

    let addr: SocketAddr = format!("{}:{}", cli.host, cli.port)
        .parse()
        .with_context(|| format!("invalid listen address {}:{}", cli.host, cli.port))?;
    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("binding {addr}"))?;
    info!("serving presentation API at http://{}", listener.local_addr()?);

    server::serve(listener, AppState::new(store, config)).await?;
    Ok(())
}
