use std::sync::Arc;

use sea_orm::Set;
use serde::Deserialize;
use uuid::Uuid;
use validator::Validate;

use crate::{
    auth::{IdentityProvider, Role, password::PasswordHasher},
    db::dao::{DaoBase, PageRequest, PaginatedResponse, UserDao},
    db::entities::user,
    error::{AppError, conflict_on_duplicate},
    services::{
        auth_service::{UserResponse, normalize_email},
        crud_service::{CrudService},
        validation::validate_request,
    },
};

#[derive(Debug, Clone, Deserialize, Validate)]
pub struct CreateUserRequest {
    #[validate(length(min = 1, message = "full_name is required"))]
    pub full_name: String,
    #[validate(email(message = "invalid email"))]
    pub email: String,
    #[validate(length(min = 6, message = "password must be at least 6 characters"))]
    pub password: String,
    pub role: String,
}

#[derive(Clone)]
pub struct UserService {
    user_dao: UserDao,
    hasher: Arc<dyn PasswordHasher>,
}

impl CrudService for UserService {
    type Dao = UserDao;
    const RESOURCE: &'static str = "user";

    fn dao(&self) -> &Self::Dao {
        &self.user_dao
    }
}

impl UserService {
    pub fn new(user_dao: UserDao, hasher: Arc<dyn PasswordHasher>) -> Self {
        Self { user_dao, hasher }
    }

    pub async fn find_by_id(&self, id: Uuid) -> Result<UserResponse, AppError> {
        CrudService::find_by_id(self, id).await.map(UserResponse::from)
    }

    pub async fn list(&self, page: PageRequest) -> Result<PaginatedResponse<UserResponse>, AppError> {
        Ok(CrudService::list(self, page, Default::default(), |query| query)
            .await?
            .map(UserResponse::from))
    }

    /// Admin-side account creation with an explicit role.
    pub async fn create(
        &self,
        request: CreateUserRequest,
        actor: Option<Uuid>,
    ) -> Result<UserResponse, AppError> {
        validate_request(&request)?;
        let role = Role::try_from(request.role.trim()).map_err(|_| {
            AppError::invalid_field("role", "role must be one of owner, worker, admin")
        })?;

        let email = normalize_email(&request.email);
        if self.user_dao.find_by_email(&email).await?.is_some() {
            return Err(AppError::conflict("email already registered"));
        }

        let model = user::ActiveModel {
            full_name: Set(request.full_name.trim().to_string()),
            email: Set(email),
            password_hash: Set(Some(self.hasher.hash(&request.password)?)),
            google_id: Set(None),
            picture: Set(None),
            provider: Set(IdentityProvider::Local.as_str().to_string()),
            role: Set(role.as_str().to_string()),
            last_login_at: Set(None),
            ..Default::default()
        };
        let created = self
            .user_dao
            .create_as(actor, model)
            .await
            .map_err(|err| conflict_on_duplicate(err, "email already registered"))?;
        Ok(created.into())
    }
}
