use anyhow::{Context, Result};
use config::{Config, Environment, File};
use migration::{Migrator, MigratorTrait};
use sea_orm::{ConnectOptions, Database, DatabaseConnection};
use serde::Deserialize;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, info};

use crate::auth::JwtVerifier;
use crate::messages::MessageCatalog;
use crate::schemas::AppState;

/// Runtime settings.
///
/// Layered from built-in defaults, an optional `items_exchange.toml` in the
/// working directory and the process environment (after `.env` is loaded).
/// CLI flags override the result.
#[derive(Debug, Clone, Deserialize)]
pub struct Settings {
    pub database_url: String,
    pub bind_address: String,
    pub jwt_secret: String,
    /// Optional YAML file overriding built-in messages.
    pub messages_path: Option<String>,
    pub request_timeout_secs: u64,
}

impl Settings {
    pub fn load() -> Result<Self> {
        dotenvy::dotenv().ok();

        let settings = Config::builder()
            .set_default("database_url", "sqlite://items_exchange.db?mode=rwc")?
            .set_default("bind_address", "0.0.0.0:8080")?
            .set_default("jwt_secret", "change-me")?
            .set_default("request_timeout_secs", 30)?
            .add_source(File::with_name("items_exchange").required(false))
            .add_source(Environment::default().try_parsing(true))
            .build()
            .context("Failed to read configuration")?
            .try_deserialize::<Settings>()
            .context("Invalid configuration")?;

        debug!(
            "Configuration loaded: bind_address={}, request_timeout_secs={}",
            settings.bind_address, settings.request_timeout_secs
        );
        Ok(settings)
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }
}

/// Open a connection pool to `database_url`.
pub async fn connect(database_url: &str) -> Result<DatabaseConnection> {
    info!("Connecting to database: {}", database_url);
    let options = ConnectOptions::new(database_url.to_string());
    let db = Database::connect(options)
        .await
        .with_context(|| format!("Failed to connect to database '{}'", database_url))?;
    Ok(db)
}

/// Apply all pending migrations.
pub async fn migrate(db: &DatabaseConnection) -> Result<()> {
    info!("Running database migrations");
    Migrator::up(db, None)
        .await
        .context("Failed to run database migrations")?;
    info!("Database migrations completed successfully");
    Ok(())
}

/// Build application state from settings and an open connection.
pub fn build_app_state(settings: &Settings, db: DatabaseConnection) -> Result<AppState> {
    let messages = match &settings.messages_path {
        Some(path) => {
            info!("Loading message overrides from {}", path);
            MessageCatalog::from_yaml_file(path)?
        }
        None => MessageCatalog::builtin(),
    };

    Ok(AppState {
        db,
        auth: Arc::new(JwtVerifier::new(&settings.jwt_secret)),
        messages: Arc::new(messages),
    })
}
