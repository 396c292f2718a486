use sea_orm::{DbErr, SqlErr};
use uuid::Uuid;

#[derive(Debug, thiserror::Error)]
pub enum DaoLayerError {
    #[error("Database error: {0}")]
    Db(#[from] DbErr),
    #[error("{entity} not found (id={id})")]
    NotFound { entity: &'static str, id: Uuid },
    #[error("Invalid pagination: limit={limit} (max {max})")]
    InvalidPagination { limit: u64, max: u64 },
}

impl DaoLayerError {
    /// True when an insert or update hit a unique index (duplicate email, store code, token).
    pub fn is_unique_violation(&self) -> bool {
        match self {
            Self::Db(err) => matches!(err.sql_err(), Some(SqlErr::UniqueConstraintViolation(_))),
            _ => false,
        }
    }

    /// True when a write broke a foreign key, e.g. deleting a customer an order still points at.
    pub fn is_foreign_key_violation(&self) -> bool {
        match self {
            Self::Db(err) => matches!(
                err.sql_err(),
                Some(SqlErr::ForeignKeyConstraintViolation(_))
            ),
            _ => false,
        }
    }
}

pub type DaoResult<T> = Result<T, DaoLayerError>;
