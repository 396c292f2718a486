mod backends;
mod registry;

use std::sync::Arc;

pub use registry::{DbProvider, DbProviderId, DbProviders};

use self::backends::{PostgresDbProvider, SqliteDbProvider};

pub fn default_registry() -> anyhow::Result<DbProviders> {
    DbProviders::new()
        .with_provider(Arc::new(PostgresDbProvider))?
        .with_provider(Arc::new(SqliteDbProvider))
}

pub(crate) fn connect_options(cfg: &crate::config::DatabaseConfig) -> sea_orm::ConnectOptions {
    let mut options = sea_orm::ConnectOptions::new(cfg.url.clone());
    options
        .max_connections(cfg.max_connections)
        .min_connections(cfg.min_idle)
        .connect_timeout(std::time::Duration::from_secs(cfg.connect_timeout_secs))
        .sqlx_logging(false);
    options
}
