use std::sync::Arc;

use anyhow::{Result, anyhow, bail};
use async_trait::async_trait;
use sea_orm::DatabaseConnection;

use crate::config::DatabaseConfig;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DbProviderId {
    Postgres,
    Sqlite,
}

impl DbProviderId {
    pub fn as_str(self) -> &'static str {
        match self {
            DbProviderId::Postgres => "postgres",
            DbProviderId::Sqlite => "sqlite",
        }
    }
}

#[async_trait]
pub trait DbProvider: Send + Sync {
    fn id(&self) -> DbProviderId;
    fn supports_url(&self, url: &str) -> bool;
    async fn connect(&self, cfg: &DatabaseConfig) -> Result<DatabaseConnection>;
    async fn post_connect(&self, _db: &DatabaseConnection, _cfg: &DatabaseConfig) -> Result<()> {
        Ok(())
    }
}

/// Providers in registration order; the first one accepting a URL wins.
#[derive(Default)]
pub struct DbProviders {
    providers: Vec<Arc<dyn DbProvider>>,
}

impl DbProviders {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_provider(mut self, provider: Arc<dyn DbProvider>) -> Result<Self> {
        self.add(provider)?;
        Ok(self)
    }

    pub fn add(&mut self, provider: Arc<dyn DbProvider>) -> Result<()> {
        let id = provider.id();
        if self.providers.iter().any(|existing| existing.id() == id) {
            bail!("database provider already registered: {}", id.as_str());
        }
        self.providers.push(provider);
        Ok(())
    }

    pub fn provider_for_url(&self, url: &str) -> Result<Arc<dyn DbProvider>> {
        self.providers
            .iter()
            .find(|provider| provider.supports_url(url))
            .cloned()
            .ok_or_else(|| {
                let known: Vec<&str> = self.providers.iter().map(|p| p.id().as_str()).collect();
                anyhow!(
                    "unsupported database url '{}'; registered providers: [{}]",
                    redact_url(url),
                    known.join(", ")
                )
            })
    }
}

/// Lowercased scheme of a connection URL, e.g. `sqlite` for `sqlite::memory:`.
pub(crate) fn url_scheme(url: &str) -> Option<String> {
    match url.trim().split_once(':') {
        Some((scheme, _)) if !scheme.is_empty() => Some(scheme.to_ascii_lowercase()),
        _ => None,
    }
}

/// Keeps only the scheme so credentials never reach the logs.
fn redact_url(url: &str) -> String {
    match url_scheme(url) {
        Some(scheme) => format!("{scheme}:<redacted>"),
        None => "<invalid-url>".to_string(),
    }
}
