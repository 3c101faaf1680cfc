use anyhow::Result;
use sea_orm::DatabaseConnection;
use tokio::net::TcpListener;
use tracing::{debug, error, info, trace};

use crate::config::{build_app_state, connect, Settings};
use crate::router::create_router;

/// Resolve settings, letting CLI flags win over configuration.
pub(crate) fn resolve_settings(
    database_url: Option<String>,
    bind_address: Option<String>,
) -> Result<Settings> {
    let mut settings = Settings::load()?;
    if let Some(database_url) = database_url {
        settings.database_url = database_url;
    }
    if let Some(bind_address) = bind_address {
        settings.bind_address = bind_address;
    }
    Ok(settings)
}

pub async fn serve(database_url: Option<String>, bind_address: Option<String>) -> Result<()> {
    trace!("Entering serve function");
    info!("Items exchange application starting up");

    let settings = resolve_settings(database_url, bind_address)?;
    let db = connect(&settings.database_url).await?;

    run_server(&settings, db).await
}

/// Build the router over `db` and serve it until Ctrl-C.
pub(crate) async fn run_server(settings: &Settings, db: DatabaseConnection) -> Result<()> {
    trace!("Initializing application state");
    let state = build_app_state(settings, db)?;
    debug!("Application state initialized successfully");

    let app = create_router(state, settings.request_timeout());
    debug!("Router created successfully");

    let bind_address = settings.bind_address.as_str();
    info!("Starting server on {}", bind_address);
    let listener = match TcpListener::bind(bind_address).await {
        Ok(listener) => {
            debug!("Successfully bound to address: {}", bind_address);
            listener
        }
        Err(e) => {
            error!("Failed to bind to address {}: {}", bind_address, e);
            return Err(e.into());
        }
    };

    info!("Items exchange API server running on http://{}", bind_address);
    info!("Swagger UI available at http://{}/swagger-ui", bind_address);

    if let Err(e) = axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
    {
        error!("Server error: {}", e);
        return Err(e.into());
    }

    info!("Server shutdown gracefully");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        error!("Failed to listen for shutdown signal: {}", e);
        std::future::pending::<()>().await;
    }
    info!("Shutdown signal received");
}
