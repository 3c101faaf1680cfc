use anyhow::Result;
use tracing::{debug, info, trace};

use super::serve::{resolve_settings, run_server};
use crate::config::{connect, migrate};

pub async fn migrate_and_serve(
    database_url: Option<String>,
    bind_address: Option<String>,
) -> Result<()> {
    trace!("Entering migrate_and_serve function");
    info!("Applying database migrations and starting server");

    let settings = resolve_settings(database_url, bind_address)?;
    debug!("Bind address: {}", settings.bind_address);

    let db = connect(&settings.database_url).await?;
    migrate(&db).await?;

    run_server(&settings, db).await
}
