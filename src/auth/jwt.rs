use chrono::{DateTime, Utc};
use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation, decode, encode};
use uuid::Uuid;

use super::{Claims, Role};
use crate::error::AppError;

#[derive(Clone)]
pub struct JwtKeys {
    pub enc: EncodingKey,
    pub dec: DecodingKey,
}

impl JwtKeys {
    pub fn from_secret(secret: &[u8]) -> Self {
        Self {
            enc: EncodingKey::from_secret(secret),
            dec: DecodingKey::from_secret(secret),
        }
    }
}

pub fn encode_token(keys: &JwtKeys, claims: &Claims) -> Result<String, AppError> {
    let mut header = Header::new(Algorithm::HS256);
    header.typ = Some("JWT".into());

    encode(&header, claims, &keys.enc)
        .map_err(|err| AppError::internal_with_source("Token encoding failed", err))
}

/// Checks the signature, then expiry against `now` rather than the system clock.
pub fn decode_token(keys: &JwtKeys, token: &str, now: DateTime<Utc>) -> Result<Claims, AppError> {
    let mut validation = Validation::new(Algorithm::HS256);
    validation.validate_exp = false;

    let data = decode::<Claims>(token, &keys.dec, &validation)?;
    if data.claims.exp <= now.timestamp() {
        return Err(AppError::unauthorized("Invalid or expired token"));
    }
    Ok(data.claims)
}

pub fn make_access_claims(user_id: Uuid, role: Role, ttl_secs: u64, now: DateTime<Utc>) -> Claims {
    let iat = now.timestamp();
    Claims {
        sub: user_id.to_string(),
        role,
        iat,
        exp: iat.saturating_add(i64::try_from(ttl_secs).unwrap_or(i64::MAX)),
    }
}

impl From<jsonwebtoken::errors::Error> for AppError {
    fn from(err: jsonwebtoken::errors::Error) -> Self {
        tracing::debug!("rejected access token: {err}");
        AppError::unauthorized("Invalid or expired token")
    }
}

#[cfg(test)]
mod tests {
    use chrono::{Duration, TimeZone, Utc};
    use uuid::Uuid;

    use super::{JwtKeys, Role, decode_token, encode_token, make_access_claims};
    use crate::error::AppError;

    fn now() -> chrono::DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 1, 1, 0, 0, 0)
            .single()
            .expect("timestamp should be valid")
    }

    #[test]
    fn makes_claims_with_expected_subject_role_and_ttl() {
        let user_id = Uuid::new_v4();
        let claims = make_access_claims(user_id, Role::Owner, 60, now());

        assert_eq!(claims.sub, user_id.to_string());
        assert_eq!(claims.role, Role::Owner);
        assert_eq!(claims.exp - claims.iat, 60);
    }

    #[test]
    fn token_roundtrips_before_expiry() {
        let keys = JwtKeys::from_secret(b"unit-test-secret");
        let claims = make_access_claims(Uuid::new_v4(), Role::Admin, 600, now());
        let token = encode_token(&keys, &claims).expect("token should encode");

        let decoded = decode_token(&keys, &token, now() + Duration::seconds(599))
            .expect("token should decode");
        assert_eq!(decoded, claims);
    }

    #[test]
    fn token_is_rejected_at_expiry() {
        let keys = JwtKeys::from_secret(b"unit-test-secret");
        let claims = make_access_claims(Uuid::new_v4(), Role::Worker, 600, now());
        let token = encode_token(&keys, &claims).expect("token should encode");

        let err = decode_token(&keys, &token, now() + Duration::seconds(600))
            .expect_err("expired token should fail");
        assert!(matches!(err, AppError::Unauthorized(_)));
    }

    #[test]
    fn token_signed_with_other_secret_is_unauthorized() {
        let claims = make_access_claims(Uuid::new_v4(), Role::Owner, 600, now());
        let token = encode_token(&JwtKeys::from_secret(b"other"), &claims)
            .expect("token should encode");

        let err = decode_token(&JwtKeys::from_secret(b"unit-test-secret"), &token, now())
            .expect_err("foreign signature should fail");
        assert_eq!(err.message(), "Invalid or expired token");
    }
}
