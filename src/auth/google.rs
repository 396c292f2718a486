//! Google ID-token verification.
//!
//! Tokens are checked with Google's `tokeninfo` endpoint, which validates the
//! signature and expiry server-side; the audience is checked here.

use std::time::Duration;

use async_trait::async_trait;
use serde::Deserialize;

use crate::error::AppError;

pub const GOOGLE_TOKENINFO_URL: &str = "https://oauth2.googleapis.com/tokeninfo";
pub const GOOGLE_REQUEST_TIMEOUT: Duration = Duration::from_secs(10);

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VerifiedIdentity {
    pub email: String,
    pub name: String,
    pub subject: String,
    pub picture: Option<String>,
}

#[async_trait]
pub trait IdTokenVerifier: Send + Sync {
    async fn verify(&self, id_token: &str) -> Result<VerifiedIdentity, AppError>;
}

#[derive(Debug, Deserialize)]
struct TokenInfo {
    aud: String,
    sub: String,
    email: Option<String>,
    email_verified: Option<String>,
    name: Option<String>,
    picture: Option<String>,
}

#[derive(Clone)]
pub struct GoogleTokenInfoVerifier {
    http: reqwest::Client,
    client_id: String,
    endpoint: String,
}

impl GoogleTokenInfoVerifier {
    pub fn new(client_id: impl Into<String>) -> Self {
        Self::with_endpoint(client_id, GOOGLE_TOKENINFO_URL)
    }

    pub fn with_endpoint(client_id: impl Into<String>, endpoint: impl Into<String>) -> Self {
        Self {
            http: http_client(GOOGLE_REQUEST_TIMEOUT),
            client_id: client_id.into(),
            endpoint: endpoint.into(),
        }
    }

    /// Caps the whole tokeninfo round trip, connect included.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.http = http_client(timeout);
        self
    }
}

fn http_client(timeout: Duration) -> reqwest::Client {
    reqwest::Client::builder()
        .connect_timeout(timeout)
        .timeout(timeout)
        .build()
        .unwrap_or_else(|err| {
            tracing::error!("could not build google http client: {err}");
            reqwest::Client::default()
        })
}

fn invalid_token() -> AppError {
    AppError::unauthorized("Invalid Google token")
}

fn identity_from(info: TokenInfo, client_id: &str) -> Result<VerifiedIdentity, AppError> {
    if info.aud != client_id {
        tracing::warn!(aud = %info.aud, "google token issued for another client");
        return Err(invalid_token());
    }
    let email = match info.email {
        Some(email) if !email.trim().is_empty() => email,
        _ => return Err(AppError::unauthorized("Email not found in Google token")),
    };
    if info.email_verified.as_deref() != Some("true") {
        return Err(AppError::unauthorized("Google email is not verified"));
    }

    Ok(VerifiedIdentity {
        name: info.name.unwrap_or_else(|| email.clone()),
        email,
        subject: info.sub,
        picture: info.picture,
    })
}

#[async_trait]
impl IdTokenVerifier for GoogleTokenInfoVerifier {
    async fn verify(&self, id_token: &str) -> Result<VerifiedIdentity, AppError> {
        let response = self
            .http
            .get(&self.endpoint)
            .query(&[("id_token", id_token)])
            .send()
            .await
            .map_err(|err| {
                tracing::warn!("google tokeninfo request failed: {err}");
                invalid_token()
            })?;

        if !response.status().is_success() {
            return Err(invalid_token());
        }

        let info = response.json::<TokenInfo>().await.map_err(|err| {
            tracing::warn!("google tokeninfo response unreadable: {err}");
            invalid_token()
        })?;
        identity_from(info, &self.client_id)
    }
}

/// Used when no Google client id is configured.
#[derive(Debug, Clone, Copy, Default)]
pub struct DisabledVerifier;

#[async_trait]
impl IdTokenVerifier for DisabledVerifier {
    async fn verify(&self, _id_token: &str) -> Result<VerifiedIdentity, AppError> {
        Err(AppError::unauthorized("Google login is not enabled"))
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use tokio::net::TcpListener;

    use super::{GoogleTokenInfoVerifier, IdTokenVerifier, TokenInfo, identity_from};

    fn info(aud: &str, verified: &str) -> TokenInfo {
        TokenInfo {
            aud: aud.to_string(),
            sub: "1234".to_string(),
            email: Some("alice@x.com".to_string()),
            email_verified: Some(verified.to_string()),
            name: None,
            picture: None,
        }
    }

    #[test]
    fn accepts_verified_token_for_our_client() {
        let identity = identity_from(info("client-1", "true"), "client-1")
            .expect("identity should verify");

        assert_eq!(identity.subject, "1234");
        assert_eq!(identity.name, "alice@x.com");
    }

    #[test]
    fn rejects_foreign_audience_and_unverified_email() {
        assert!(identity_from(info("client-2", "true"), "client-1").is_err());
        assert!(identity_from(info("client-1", "false"), "client-1").is_err());
    }

    #[tokio::test]
    async fn unresponsive_tokeninfo_endpoint_times_out() {
        let listener = TcpListener::bind("127.0.0.1:0")
            .await
            .expect("listener should bind");
        let addr = listener.local_addr().expect("listener should have an address");
        // accept and then never answer
        let stalled = tokio::spawn(async move {
            let (_socket, _) = listener.accept().await.expect("client should connect");
            tokio::time::sleep(Duration::from_secs(30)).await;
        });

        let verifier =
            GoogleTokenInfoVerifier::with_endpoint("client-1", format!("http://{addr}/tokeninfo"))
                .with_timeout(Duration::from_millis(200));
        let err = tokio::time::timeout(Duration::from_secs(5), verifier.verify("id-token"))
            .await
            .expect("request should give up before the outer deadline")
            .expect_err("stalled endpoint should be rejected");

        assert_eq!(err.message(), "Invalid Google token");
        stalled.abort();
    }
}
