use anyhow::Result;
use tracing::{info, trace};

use crate::config::{connect, migrate};

pub async fn init_database(database_url: &str) -> Result<()> {
    trace!("Entering init_database function");
    info!("Initializing database");

    let db = connect(database_url).await?;
    migrate(&db).await?;

    info!("Database initialization completed successfully!");
    Ok(())
}
