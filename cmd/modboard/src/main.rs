//! # modboard
//!
//! The entry point that assembles the board from configuration.

use std::sync::Arc;

use anyhow::Context;
use api_adapters::{router, AppState, IdentityHeaders};
use auth_adapters::{Sha256CredentialHasher, TrustedHeaderIdentity};
use configs::{LogSettings, Settings, StorageBackend};
use domains::{BoardRepo, SystemClock};
use secrecy::ExposeSecret;
use services::{CommandService, PostService};
use storage_adapters::{MemoryBoardRepo, SqliteBoardRepo};
use tokio::net::TcpListener;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let settings = Settings::load()?;
    init_tracing(&settings.log);

    // 1. Storage
    let repo: Arc<dyn BoardRepo> = match settings.database.backend {
        StorageBackend::Sqlite => Arc::new(
            SqliteBoardRepo::connect(
                settings.database.url.expose_secret(),
                settings.database.max_connections,
            )
            .await?,
        ),
        StorageBackend::Memory => {
            warn!("using in-memory storage, posts are lost on shutdown");
            Arc::new(MemoryBoardRepo::new())
        }
    };

    // 2. Identity
    let headers = IdentityHeaders::new(&settings.auth.role_header, &settings.auth.user_header)
        .context("invalid identity header name")?;
    warn!(
        role_header = %headers.role,
        user_header = %headers.user,
        "caller identity is taken from trusted headers; put an authenticating proxy in front"
    );

    // 3. Services
    let state = AppState {
        posts: Arc::new(PostService::new(
            repo.clone(),
            Arc::new(Sha256CredentialHasher),
            Arc::new(SystemClock),
            settings.policy()?,
        )),
        commands: Arc::new(CommandService::new(repo)),
        identity: Arc::new(TrustedHeaderIdentity),
        headers,
    };

    let addr = settings.listen_addr();
    let listener = TcpListener::bind(addr)
        .await
        .with_context(|| format!("failed to bind {addr}"))?;
    info!(%addr, cooldown_secs = settings.board.cooldown_secs, "modboard listening");

    axum::serve(listener, router(state))
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("modboard stopped");
    Ok(())
}

fn init_tracing(log: &LogSettings) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&log.filter));
    let builder = tracing_subscriber::fmt().with_env_filter(filter);
    if log.json {
        builder.json().init();
    } else {
        builder.init();
    }
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        warn!(error = %e, "failed to listen for ctrl-c");
        std::future::pending::<()>().await;
    }
    info!("shutdown requested");
}
