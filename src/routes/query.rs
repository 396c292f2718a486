use std::collections::HashMap;

use axum::{
    extract::{FromRequestParts, Query},
    http::request::Parts,
};
use serde::Deserialize;

use crate::{db::dao::PageRequest, error::AppError};

const INVALID_QUERY_MESSAGE: &str = "Invalid query";

#[derive(Debug, Clone, Copy, Default, Deserialize)]
pub struct PageQuery {
    pub limit: Option<u64>,
    pub offset: Option<u64>,
}

impl PageQuery {
    pub fn page(&self) -> PageRequest {
        PageRequest::from_query(self.limit, self.offset)
    }
}

/// `limit`/`offset` plus every other query key as a column filter.
#[derive(Debug, Clone)]
pub struct ListQuery {
    pub page: PageRequest,
    pub filters: HashMap<String, String>,
}

impl ListQuery {
    fn from_pairs(mut pairs: HashMap<String, String>) -> Result<Self, AppError> {
        let limit = take_u64(&mut pairs, "limit")?;
        let offset = take_u64(&mut pairs, "offset")?;
        Ok(Self {
            page: PageRequest::from_query(limit, offset),
            filters: pairs,
        })
    }
}

fn take_u64(pairs: &mut HashMap<String, String>, key: &str) -> Result<Option<u64>, AppError> {
    match pairs.remove(key) {
        None => Ok(None),
        Some(raw) => raw
            .trim()
            .parse()
            .map(Some)
            .map_err(|_| AppError::bad_request(format!("{INVALID_QUERY_MESSAGE}: {key}"))),
    }
}

impl<S: Send + Sync> FromRequestParts<S> for ListQuery {
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let Query(pairs) = Query::<HashMap<String, String>>::from_request_parts(parts, state)
            .await
            .map_err(|err| AppError::bad_request(format!("{INVALID_QUERY_MESSAGE}: {err}")))?;
        Self::from_pairs(pairs)
    }
}
