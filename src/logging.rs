use std::{any::Any, backtrace::Backtrace};

use tracing_subscriber::{EnvFilter, fmt};

use crate::config::LoggingConfig;

/// `RUST_LOG` wins over the configured directive when both are present.
pub fn init_tracing(cfg: &LoggingConfig) {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&cfg.rust_log));
    if fmt().with_env_filter(filter).with_target(false).try_init().is_err() {
        tracing::debug!("tracing subscriber already installed");
    }
    set_panic_hook();
}

/// Text of a panic payload raised with a string message.
pub(crate) fn panic_message(payload: &(dyn Any + Send)) -> &str {
    if let Some(message) = payload.downcast_ref::<&str>() {
        message
    } else if let Some(message) = payload.downcast_ref::<String>() {
        message.as_str()
    } else {
        "unknown panic"
    }
}

fn set_panic_hook() {
    std::panic::set_hook(Box::new(|info| {
        let message = panic_message(info.payload());

        let backtrace = Backtrace::capture();

        match info.location() {
            Some(location) => tracing::error!(
                panic = %message,
                location = %location,
                backtrace = %backtrace,
                "panic"
            ),
            None => tracing::error!(panic = %message, backtrace = %backtrace, "panic"),
        }
    }));
}
