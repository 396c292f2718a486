use sea_orm::DatabaseConnection;
use tracing::info;

use super::providers;
use crate::config::DatabaseConfig;

/// Connects through the provider matching the URL scheme and syncs the schema.
pub async fn connect(cfg: &DatabaseConfig) -> anyhow::Result<DatabaseConnection> {
    let registry = providers::default_registry()?;
    let provider = registry.provider_for_url(&cfg.url)?;
    info!(provider = provider.id().as_str(), "connecting to database");

    let db = provider.connect(cfg).await?;
    provider.post_connect(&db, cfg).await?;
    sync_schema(&db).await?;
    Ok(db)
}

pub async fn sync_schema(db: &DatabaseConnection) -> anyhow::Result<()> {
    info!("syncing database schema from entities");
    db.get_schema_registry("pos_core::db::entities::*")
        .sync(db)
        .await?;
    Ok(())
}
