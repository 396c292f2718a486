use axum::{
    body::to_bytes,
    extract::Request,
    http::{StatusCode, header},
    middleware::Next,
    response::{IntoResponse, Response},
};

use crate::{
    error::{AppError, FieldError},
    response::{JsonApiResponse, log_app_error},
};

const MAX_ERROR_BODY_BYTES: usize = 16 * 1024;
const JSON_REJECTION_PREFIX: &str = "Failed to deserialize the JSON body into the target type: ";

/// Rewrites plain-text error bodies (extractor rejections, unmatched routes) into the JSON envelope.
pub async fn json_error_middleware(req: Request, next: Next) -> Response {
    let response = next.run(req).await;
    let status = response.status();
    if !(status.is_client_error() || status.is_server_error()) || has_json_body(&response) {
        return response;
    }

    let (mut parts, body) = response.into_parts();
    let text = to_bytes(body, MAX_ERROR_BODY_BYTES)
        .await
        .map(|bytes| String::from_utf8_lossy(&bytes).trim().to_string())
        .unwrap_or_default();
    let message = if text.is_empty() {
        status
            .canonical_reason()
            .unwrap_or("Request failed")
            .to_string()
    } else {
        text
    };

    let app_error = error_for(status, message);
    if status.is_server_error() {
        log_app_error(&app_error, status);
    }

    let mut rewritten = JsonApiResponse::from_error(&app_error).into_response();
    parts.headers.remove(header::CONTENT_TYPE);
    parts.headers.remove(header::CONTENT_LENGTH);
    rewritten.headers_mut().extend(parts.headers);
    rewritten
}

fn has_json_body(response: &Response) -> bool {
    response
        .headers()
        .get(header::CONTENT_TYPE)
        .and_then(|value| value.to_str().ok())
        .is_some_and(|value| {
            let value = value.to_ascii_lowercase();
            value.contains("application/json") || value.contains("+json")
        })
}

fn error_for(status: StatusCode, message: String) -> AppError {
    match status {
        StatusCode::UNAUTHORIZED => AppError::unauthorized(message),
        StatusCode::FORBIDDEN => AppError::forbidden(message),
        StatusCode::NOT_FOUND => AppError::not_found(message),
        StatusCode::CONFLICT => AppError::conflict(message),
        // axum reports undeserializable JSON bodies as 422
        StatusCode::UNPROCESSABLE_ENTITY => AppError::validation(vec![body_field_error(&message)]),
        _ if status.is_client_error() => AppError::bad_request(message),
        _ => AppError::internal(message),
    }
}

/// Points a JSON body rejection at the offending field when serde names one.
///
/// `items[0].quantity: invalid type ...` keeps the path, `missing field `email`` names the
/// field, anything else is reported against `body`.
fn body_field_error(message: &str) -> FieldError {
    let detail = message.strip_prefix(JSON_REJECTION_PREFIX).unwrap_or(message);

    if let Some((path, rest)) = detail
        .split_once(": ")
        .filter(|(path, _)| is_field_path(path))
    {
        return FieldError::new(path, rest);
    }

    if let Some(name) = detail
        .strip_prefix("missing field `")
        .and_then(|rest| rest.split_once('`'))
        .map(|(name, _)| name)
    {
        return FieldError::new(name, format!("missing field `{name}`"));
    }

    FieldError::new("body", detail)
}

fn is_field_path(candidate: &str) -> bool {
    !candidate.is_empty()
        && candidate
            .chars()
            .all(|ch| ch.is_ascii_alphanumeric() || matches!(ch, '_' | '.' | '[' | ']'))
}
