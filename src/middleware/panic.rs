use std::any::Any;

use axum::response::{IntoResponse, Response};
use tower_http::catch_panic::CatchPanicLayer;

use crate::{error::AppError, logging::panic_message};

pub fn catch_panic_layer() -> CatchPanicLayer<fn(Box<dyn Any + Send + 'static>) -> Response> {
    CatchPanicLayer::custom(panic_to_json)
}

/// Debug builds echo the panic text to the client; release builds never do.
fn panic_to_json(panic: Box<dyn Any + Send + 'static>) -> Response {
    let details = panic_message(panic.as_ref());
    let message = if cfg!(debug_assertions) {
        format!("internal server error: {details}")
    } else {
        "internal server error".to_string()
    };
    AppError::internal(message).into_response()
}
