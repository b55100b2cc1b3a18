//! # configs
//!
//! Layered settings: built-in defaults, then `config/default.toml`, then
//! `config/local.toml`, then `MODBOARD__*` environment variables
//! (`MODBOARD__BOARD__COOLDOWN_SECS=10`). A `.env` file is read first.

use std::net::{IpAddr, SocketAddr};

use config::{Config, Environment, File};
use domains::BoardPolicy;
use secrecy::SecretString;
use serde::Deserialize;
use thiserror::Error;

const ENV_PREFIX: &str = "MODBOARD";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to load configuration: {0}")]
    Load(#[from] config::ConfigError),

    #[error("invalid configuration: {0}")]
    Invalid(String),
}

#[derive(Debug, Deserialize)]
pub struct Settings {
    pub server: ServerSettings,
    pub database: DatabaseSettings,
    pub board: BoardSettings,
    pub auth: AuthSettings,
    pub log: LogSettings,
    /// Username the `seed` binary promotes to operator
    pub operator_id: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ServerSettings {
    pub host: IpAddr,
    pub port: u16,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StorageBackend {
    Sqlite,
    Memory,
}

#[derive(Debug, Deserialize)]
pub struct DatabaseSettings {
    pub backend: StorageBackend,
    /// May embed credentials, so it stays out of Debug output
    pub url: SecretString,
    pub max_connections: u32,
}

#[derive(Debug, Clone, Deserialize)]
pub struct BoardSettings {
    pub cooldown_secs: i64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct AuthSettings {
    /// Header carrying the caller's tier name
    pub role_header: String,
    /// Header carrying the caller's username
    pub user_header: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct LogSettings {
    /// `tracing_subscriber::EnvFilter` directive, overridden by `RUST_LOG`
    pub filter: String,
    pub json: bool,
}

impl Settings {
    /// Loads `.env`, the config files and the environment.
    pub fn load() -> Result<Self, ConfigError> {
        if let Ok(path) = dotenvy::dotenv() {
            tracing::debug!(path = %path.display(), "loaded .env");
        }
        Self::from_config(
            Self::builder()?
                .add_source(File::with_name("config/default").required(false))
                .add_source(File::with_name("config/local").required(false))
                .add_source(
                    Environment::with_prefix(ENV_PREFIX)
                        .separator("__")
                        .try_parsing(true),
                )
                // Plain OPERATOR_ID, as the seed tool has always read it
                .set_override_option("operator_id", std::env::var("OPERATOR_ID").ok())?
                .build()?,
        )
    }

    /// Defaults only; used by tests and as the base layer of [`Settings::load`].
    pub fn defaults() -> Result<Self, ConfigError> {
        Self::from_config(Self::builder()?.build()?)
    }

    fn builder() -> Result<config::ConfigBuilder<config::builder::DefaultState>, ConfigError> {
        Ok(Config::builder()
            .set_default("server.host", "127.0.0.1")?
            .set_default("server.port", 8080)?
            .set_default("database.backend", "sqlite")?
            .set_default("database.url", "sqlite://modboard.db")?
            .set_default("database.max_connections", 5)?
            .set_default("board.cooldown_secs", BoardPolicy::DEFAULT_COOLDOWN_SECS)?
            .set_default("auth.role_header", "X-User-Role")?
            .set_default("auth.user_header", "X-User-Name")?
            .set_default("log.filter", "info,sqlx=warn")?
            .set_default("log.json", false)?)
    }

    fn from_config(config: Config) -> Result<Self, ConfigError> {
        let settings: Settings = config.try_deserialize()?;
        settings.validate()?;
        Ok(settings)
    }

    fn validate(&self) -> Result<(), ConfigError> {
        if self.board.cooldown_secs < 0 {
            return Err(ConfigError::Invalid(
                "board.cooldown_secs must not be negative".into(),
            ));
        }
        self.policy()?;
        if self.auth.role_header.trim().is_empty() || self.auth.user_header.trim().is_empty() {
            return Err(ConfigError::Invalid("auth headers must be named".into()));
        }
        Ok(())
    }

    pub fn listen_addr(&self) -> SocketAddr {
        SocketAddr::new(self.server.host, self.server.port)
    }

    /// The immutable posting policy handed to the services.
    pub fn policy(&self) -> Result<BoardPolicy, ConfigError> {
        BoardPolicy::with_cooldown_secs(self.board.cooldown_secs).ok_or_else(|| {
            ConfigError::Invalid(format!(
                "board.cooldown_secs {} is out of range",
                self.board.cooldown_secs
            ))
        })
    }
}
