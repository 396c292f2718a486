use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::AppError;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Owner,
    Worker,
    Admin,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Owner => "owner",
            Role::Worker => "worker",
            Role::Admin => "admin",
        }
    }
}

impl TryFrom<&str> for Role {
    type Error = ();

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        match value {
            "owner" => Ok(Role::Owner),
            "worker" => Ok(Role::Worker),
            "admin" => Ok(Role::Admin),
            _ => Err(()),
        }
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum IdentityProvider {
    Local,
    Google,
}

impl IdentityProvider {
    pub fn as_str(&self) -> &'static str {
        match self {
            IdentityProvider::Local => "local",
            IdentityProvider::Google => "google",
        }
    }
}

pub trait RequiredRole {
    fn allows(role: Role) -> bool;
}

pub struct AdminRole;

impl RequiredRole for AdminRole {
    fn allows(role: Role) -> bool {
        role == Role::Admin
    }
}

/// Admins and store owners.
pub struct ManagerRole;

impl RequiredRole for ManagerRole {
    fn allows(role: Role) -> bool {
        matches!(role, Role::Admin | Role::Owner)
    }
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq)]
pub struct Claims {
    pub sub: String, // user id
    pub role: Role,
    pub iat: i64,
    pub exp: i64,
}

impl Claims {
    pub fn user_id(&self) -> Result<Uuid, AppError> {
        Uuid::parse_str(&self.sub).map_err(|_| AppError::unauthorized("Invalid token subject"))
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct TokenBundle {
    pub access_token: String,
    pub refresh_token: String,
    pub token_type: &'static str,
    pub expires_in: u64,
}

#[cfg(test)]
mod tests {
    use super::{AdminRole, Claims, ManagerRole, RequiredRole, Role};

    #[test]
    fn role_string_roundtrip() {
        for role in [Role::Owner, Role::Worker, Role::Admin] {
            assert_eq!(Role::try_from(role.as_str()), Ok(role));
        }
        assert!(Role::try_from("user").is_err());
    }

    #[test]
    fn manager_role_admits_admins_and_owners_only() {
        assert!(ManagerRole::allows(Role::Admin));
        assert!(ManagerRole::allows(Role::Owner));
        assert!(!ManagerRole::allows(Role::Worker));
        assert!(AdminRole::allows(Role::Admin));
        assert!(!AdminRole::allows(Role::Owner));
    }

    #[test]
    fn claims_reject_non_uuid_subject() {
        let claims = Claims {
            sub: "alice".to_string(),
            role: Role::Owner,
            iat: 0,
            exp: 60,
        };
        assert!(claims.user_id().is_err());
    }
}
