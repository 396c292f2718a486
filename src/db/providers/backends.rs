use anyhow::Result;
use async_trait::async_trait;
use sea_orm::{ConnectionTrait, Database, DatabaseConnection};

use super::registry::{DbProvider, DbProviderId, url_scheme};
use super::connect_options;
use crate::config::DatabaseConfig;

/// Cascading deletes of order items and memberships rely on enforced foreign keys.
const SQLITE_PRAGMAS: &[&str] = &["PRAGMA foreign_keys = ON", "PRAGMA busy_timeout = 5000"];

pub struct PostgresDbProvider;

#[async_trait]
impl DbProvider for PostgresDbProvider {
    fn id(&self) -> DbProviderId {
        DbProviderId::Postgres
    }

    fn supports_url(&self, url: &str) -> bool {
        matches!(url_scheme(url).as_deref(), Some("postgres" | "postgresql"))
    }

    async fn connect(&self, cfg: &DatabaseConfig) -> Result<DatabaseConnection> {
        Ok(Database::connect(connect_options(cfg)).await?)
    }
}

pub struct SqliteDbProvider;

#[async_trait]
impl DbProvider for SqliteDbProvider {
    fn id(&self) -> DbProviderId {
        DbProviderId::Sqlite
    }

    fn supports_url(&self, url: &str) -> bool {
        url_scheme(url).as_deref() == Some("sqlite")
    }

    async fn connect(&self, cfg: &DatabaseConfig) -> Result<DatabaseConnection> {
        Ok(Database::connect(connect_options(cfg)).await?)
    }

    async fn post_connect(&self, db: &DatabaseConnection, _cfg: &DatabaseConfig) -> Result<()> {
        for pragma in SQLITE_PRAGMAS {
            db.execute_unprepared(pragma).await?;
        }
        Ok(())
    }
}
