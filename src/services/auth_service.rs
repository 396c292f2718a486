use std::sync::Arc;

use chrono::{DateTime, Duration, FixedOffset};
use sea_orm::ActiveValue::Set;
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

use crate::{
    auth::{
        Claims, IdentityProvider, Role, TokenBundle,
        google::IdTokenVerifier,
        jwt::{JwtKeys, decode_token, encode_token, make_access_claims},
        password::PasswordHasher,
        refresh::generate_refresh_token,
    },
    clock::Clock,
    db::dao::{RefreshTokenStore, UserStore},
    db::entities::user,
    error::{AppError, conflict_on_duplicate},
    services::validation::validate_request,
};

const INVALID_CREDENTIALS: &str = "invalid credentials";
const INVALID_REFRESH_TOKEN: &str = "invalid refresh token";

#[derive(Debug, Clone, Deserialize, Validate)]
pub struct RegisterRequest {
    #[validate(length(min = 3, message = "username must be at least 3 characters"))]
    pub username: String,
    #[validate(email(message = "invalid email"))]
    pub email: String,
    #[validate(length(min = 6, message = "password must be at least 6 characters"))]
    pub password: String,
}

#[derive(Debug, Clone, Deserialize, Validate)]
pub struct LoginRequest {
    #[validate(email(message = "invalid email"))]
    pub email: String,
    #[validate(length(min = 1, message = "password is required"))]
    pub password: String,
}

#[derive(Debug, Clone, Deserialize, Validate)]
pub struct GoogleLoginRequest {
    #[validate(length(min = 1, message = "id_token is required"))]
    pub id_token: String,
}

#[derive(Debug, Clone, Deserialize, Validate)]
pub struct RefreshRequest {
    #[validate(length(min = 1, message = "refresh_token is required"))]
    pub refresh_token: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct UserResponse {
    pub id: Uuid,
    pub full_name: String,
    pub email: String,
    pub google_id: Option<String>,
    pub picture: Option<String>,
    pub provider: String,
    pub role: String,
    pub last_login_at: Option<DateTime<FixedOffset>>,
    pub is_active: bool,
    pub created_at: DateTime<FixedOffset>,
    pub updated_at: DateTime<FixedOffset>,
}

impl From<user::Model> for UserResponse {
    fn from(user: user::Model) -> Self {
        Self {
            id: user.id,
            full_name: user.full_name,
            email: user.email,
            google_id: user.google_id,
            picture: user.picture,
            provider: user.provider,
            role: user.role,
            last_login_at: user.last_login_at,
            is_active: user.is_active,
            created_at: user.created_at,
            updated_at: user.updated_at,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct AuthSession {
    #[serde(flatten)]
    pub tokens: TokenBundle,
    pub user: UserResponse,
}

pub fn normalize_email(email: &str) -> String {
    email.trim().to_ascii_lowercase()
}

#[derive(Clone)]
pub struct AuthService {
    users: Arc<dyn UserStore>,
    tokens: Arc<dyn RefreshTokenStore>,
    hasher: Arc<dyn PasswordHasher>,
    google: Arc<dyn IdTokenVerifier>,
    clock: Arc<dyn Clock>,
    jwt: JwtKeys,
    access_ttl_secs: u64,
    refresh_ttl: Duration,
}

impl AuthService {
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        users: Arc<dyn UserStore>,
        tokens: Arc<dyn RefreshTokenStore>,
        hasher: Arc<dyn PasswordHasher>,
        google: Arc<dyn IdTokenVerifier>,
        clock: Arc<dyn Clock>,
        jwt: JwtKeys,
        access_ttl_secs: u64,
        refresh_ttl: Duration,
    ) -> Self {
        Self {
            users,
            tokens,
            hasher,
            google,
            clock,
            jwt,
            access_ttl_secs,
            refresh_ttl,
        }
    }

    pub fn hasher(&self) -> Arc<dyn PasswordHasher> {
        Arc::clone(&self.hasher)
    }

    pub async fn register(&self, request: RegisterRequest) -> Result<AuthSession, AppError> {
        validate_request(&request)?;
        let email = normalize_email(&request.email);
        if self.users.find_user_by_email(&email).await?.is_some() {
            return Err(AppError::conflict("email already registered"));
        }

        let now = self.clock.now().fixed_offset();
        let model = user::ActiveModel {
            full_name: Set(request.username.trim().to_string()),
            email: Set(email),
            password_hash: Set(Some(self.hasher.hash(&request.password)?)),
            google_id: Set(None),
            picture: Set(None),
            provider: Set(IdentityProvider::Local.as_str().to_string()),
            role: Set(Role::Owner.as_str().to_string()),
            last_login_at: Set(Some(now)),
            ..Default::default()
        };
        let user = self
            .users
            .create_user(model)
            .await
            .map_err(|err| conflict_on_duplicate(err, "email already registered"))?;
        tracing::info!(user_id = %user.id, "user registered");

        self.start_session(user).await
    }

    pub async fn login(&self, request: LoginRequest) -> Result<AuthSession, AppError> {
        validate_request(&request)?;
        let user = self
            .users
            .find_user_by_email(&normalize_email(&request.email))
            .await?
            .filter(|user| user.is_active)
            .ok_or_else(|| AppError::unauthorized(INVALID_CREDENTIALS))?;

        let verified = user
            .password_hash
            .as_deref()
            .is_some_and(|hash| self.hasher.verify(&request.password, hash));
        if !verified {
            return Err(AppError::unauthorized(INVALID_CREDENTIALS));
        }

        self.users
            .update_last_login(user.id, self.clock.now().fixed_offset())
            .await?;
        self.start_session(user).await
    }

    /// Signs in with a Google ID token, creating an owner account on first use.
    pub async fn google_login(&self, request: GoogleLoginRequest) -> Result<AuthSession, AppError> {
        validate_request(&request)?;
        let identity = self.google.verify(&request.id_token).await?;
        let email = normalize_email(&identity.email);
        let now = self.clock.now().fixed_offset();

        let user = match self.users.find_user_by_email(&email).await? {
            Some(user) if !user.is_active => {
                return Err(AppError::unauthorized(INVALID_CREDENTIALS));
            }
            Some(user) => {
                self.users.update_last_login(user.id, now).await?;
                if user.google_id.is_none() {
                    tracing::info!(user_id = %user.id, "linking google account");
                    self.users
                        .link_google(user.id, &identity.subject, identity.picture)
                        .await?
                } else {
                    user
                }
            }
            None => {
                let model = user::ActiveModel {
                    full_name: Set(identity.name),
                    email: Set(email),
                    password_hash: Set(None),
                    google_id: Set(Some(identity.subject)),
                    picture: Set(identity.picture),
                    provider: Set(IdentityProvider::Google.as_str().to_string()),
                    role: Set(Role::Owner.as_str().to_string()),
                    last_login_at: Set(Some(now)),
                    ..Default::default()
                };
                let user = self
                    .users
                    .create_user(model)
                    .await
                    .map_err(|err| conflict_on_duplicate(err, "email already registered"))?;
                tracing::info!(user_id = %user.id, "user registered via google");
                user
            }
        };

        self.start_session(user).await
    }

    /// Rotates a refresh token: the presented token is revoked and exactly one
    /// replacement is issued to the same owner.
    pub async fn refresh(&self, request: RefreshRequest) -> Result<AuthSession, AppError> {
        validate_request(&request)?;
        let now = self.clock.now().fixed_offset();
        let current = self
            .tokens
            .find_active(&request.refresh_token, now)
            .await?
            .ok_or_else(|| AppError::unauthorized(INVALID_REFRESH_TOKEN))?;

        let user = self
            .users
            .find_user(current.user_id)
            .await?
            .ok_or_else(|| AppError::not_found("user not found"))?;
        if !user.is_active {
            return Err(AppError::unauthorized(INVALID_REFRESH_TOKEN));
        }

        // a concurrent refresh may have consumed the token since the lookup
        if !self.tokens.revoke(current.id, now).await? {
            return Err(AppError::unauthorized(INVALID_REFRESH_TOKEN));
        }

        let session = self.issue(user, now).await?;
        tracing::info!(user_id = %current.user_id, "refresh token rotated");
        Ok(session)
    }

    pub async fn logout(&self, refresh_token: &str, caller: Uuid) -> Result<(), AppError> {
        let now = self.clock.now().fixed_offset();
        let current = self
            .tokens
            .find_active(refresh_token, now)
            .await?
            .filter(|token| token.user_id == caller)
            .ok_or_else(|| AppError::unauthorized(INVALID_REFRESH_TOKEN))?;

        if !self.tokens.revoke(current.id, now).await? {
            return Err(AppError::unauthorized(INVALID_REFRESH_TOKEN));
        }
        tracing::info!(user_id = %caller, "session logged out");
        Ok(())
    }

    pub fn verify(&self, access_token: &str) -> Result<Claims, AppError> {
        decode_token(&self.jwt, access_token, self.clock.now())
    }

    /// Creates the configured admin account when no user holds that email yet.
    pub async fn seed_admin(&self, email: &str, password: &str) -> anyhow::Result<()> {
        let email = normalize_email(email);
        if let Some(existing) = self
            .users
            .find_user_by_email(&email)
            .await
            .map_err(|err| anyhow::anyhow!("admin lookup failed: {err}"))?
        {
            tracing::info!("admin user already present: {}", existing.email);
            return Ok(());
        }

        let hash = self
            .hasher
            .hash(password)
            .map_err(|err| anyhow::anyhow!("admin seed hash error: {err}"))?;
        let model = user::ActiveModel {
            full_name: Set("Administrator".to_string()),
            email: Set(email),
            password_hash: Set(Some(hash)),
            google_id: Set(None),
            picture: Set(None),
            provider: Set(IdentityProvider::Local.as_str().to_string()),
            role: Set(Role::Admin.as_str().to_string()),
            last_login_at: Set(None),
            ..Default::default()
        };
        let user = self
            .users
            .create_user(model)
            .await
            .map_err(|err| anyhow::anyhow!("admin seed failed: {err}"))?;
        tracing::info!("seeded admin user {}", user.email);
        Ok(())
    }

    /// Revokes every live refresh token of the user, then issues one new session.
    async fn start_session(&self, user: user::Model) -> Result<AuthSession, AppError> {
        let now = self.clock.now().fixed_offset();
        let revoked = self.tokens.revoke_all_for_user(user.id, now).await?;
        tracing::debug!(user_id = %user.id, revoked, "previous sessions revoked");
        let session = self.issue(user, now).await?;
        tracing::info!(user_id = %session.user.id, "session issued");
        Ok(session)
    }

    async fn issue(
        &self,
        user: user::Model,
        now: DateTime<FixedOffset>,
    ) -> Result<AuthSession, AppError> {
        let role = Role::try_from(user.role.as_str()).map_err(|_| {
            AppError::internal_with_source("Unknown user role", format!("role={}", user.role))
        })?;
        let claims =
            make_access_claims(user.id, role, self.access_ttl_secs, now.with_timezone(&chrono::Utc));
        let access_token = encode_token(&self.jwt, &claims)?;

        let refresh = self
            .tokens
            .create_token(user.id, &generate_refresh_token(), now, now + self.refresh_ttl)
            .await?;

        Ok(AuthSession {
            tokens: TokenBundle {
                access_token,
                refresh_token: refresh.token,
                token_type: "Bearer",
                expires_in: self.access_ttl_secs,
            },
            user: user.into(),
        })
    }
}
