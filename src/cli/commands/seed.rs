use anyhow::{Context, Result};
use tracing::{debug, info, trace};

use super::serve::resolve_settings;
use crate::config::connect;
use crate::fixtures::Dataset;

pub async fn seed(dataset_path: &str, database_url: Option<String>) -> Result<()> {
    trace!("Entering seed function");
    info!("Seeding database from {}", dataset_path);

    let dataset = Dataset::from_yaml_file(dataset_path)?;
    debug!(
        "Dataset parsed: {} users, {} categories",
        dataset.users.len(),
        dataset.categories.len()
    );

    let settings = resolve_settings(database_url, None)?;
    let db = connect(&settings.database_url).await?;

    dataset
        .load(&db)
        .await
        .with_context(|| format!("Failed to load dataset {}", dataset_path))?;

    info!("Database seeded successfully!");
    Ok(())
}
