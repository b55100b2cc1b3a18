//! Creates (or promotes) the operator account named by `OPERATOR_ID`.

use anyhow::{bail, Context};
use auth_adapters::Sha256CredentialHasher;
use configs::{Settings, StorageBackend};
use secrecy::ExposeSecret;
use services::accounts::ensure_operator;
use storage_adapters::SqliteBoardRepo;
use tracing::info;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let settings = Settings::load()?;
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&settings.log.filter)),
        )
        .init();

    let operator = settings
        .operator_id
        .as_deref()
        .filter(|name| !name.trim().is_empty())
        .context("OPERATOR_ID is not set")?;

    if settings.database.backend != StorageBackend::Sqlite {
        bail!("seeding needs persistent storage; database.backend is not sqlite");
    }

    let repo = SqliteBoardRepo::connect(
        settings.database.url.expose_secret(),
        settings.database.max_connections,
    )
    .await?;

    let user = ensure_operator(&repo, &Sha256CredentialHasher, operator).await?;
    info!(username = %user.username, user_id = user.id, role = %user.role, "seed complete");
    Ok(())
}
