use std::sync::Arc;

use chrono::Duration;
use sea_orm::DatabaseConnection;

use crate::{
    clock::Clock,
    config::AuthConfig,
    db::dao::DaoContext,
    services::auth_service::AuthService,
};

use super::{
    google::{DisabledVerifier, GoogleTokenInfoVerifier, IdTokenVerifier},
    jwt::JwtKeys,
    password::Argon2Hasher,
};

/// Picks the Google verifier from config; Google login is refused without a client id.
pub fn google_verifier(cfg: &AuthConfig) -> Arc<dyn IdTokenVerifier> {
    match cfg.google_client_id.as_deref().map(str::trim) {
        Some(client_id) if !client_id.is_empty() => {
            Arc::new(GoogleTokenInfoVerifier::new(client_id))
        }
        _ => {
            tracing::info!("google login disabled: no client id configured");
            Arc::new(DisabledVerifier)
        }
    }
}

pub fn build_auth_service(
    cfg: &AuthConfig,
    db: &DatabaseConnection,
    clock: Arc<dyn Clock>,
    google: Arc<dyn IdTokenVerifier>,
) -> AuthService {
    let daos = DaoContext::new(db);
    AuthService::new(
        Arc::new(daos.user()),
        Arc::new(daos.refresh_token()),
        Arc::new(Argon2Hasher),
        google,
        clock,
        JwtKeys::from_secret(cfg.jwt_secret.as_bytes()),
        cfg.access_ttl_secs,
        Duration::days(cfg.refresh_ttl_days),
    )
}

/// Builds the auth service and seeds the configured admin account.
pub async fn init_auth(
    cfg: &AuthConfig,
    db: &DatabaseConnection,
    clock: Arc<dyn Clock>,
) -> anyhow::Result<AuthService> {
    let service = build_auth_service(cfg, db, clock, google_verifier(cfg));
    if let (Some(email), Some(password)) = (cfg.admin_email.as_deref(), cfg.admin_password.as_deref())
    {
        service.seed_admin(email, password).await?;
    }
    Ok(service)
}

#[cfg(test)]
mod tests {
    use super::google_verifier;
    use crate::config::AuthConfig;

    #[tokio::test]
    async fn blank_client_id_disables_google_login() {
        let mut cfg = AuthConfig::new("secret");
        cfg.google_client_id = Some("  ".to_string());

        let err = google_verifier(&cfg)
            .verify("token")
            .await
            .expect_err("google login should be disabled");
        assert_eq!(err.message(), "Google login is not enabled");
    }
}
