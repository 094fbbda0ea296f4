//! Logging setup plus per-module gated logging macros.
//!
//! Each module that uses the macros declares its own switch:
//! ```ignore
//! const ENABLE_LOGS: bool = true;
//!
//! use crate::{log_debug, log_info, log_warn, log_error};
//!
//! log_info!("camera {} acquired", id);
//! ```
//! Flipping the const to `false` silences that module without touching
//! `RUST_LOG`, which is handy for the chatty per-frame decode path.

use std::sync::Once;

static INIT: Once = Once::new();

/// Initialize `env_logger` once. Reads `RUST_LOG`, defaulting to Info.
pub fn init_logging() {
    INIT.call_once(|| {
        let _ = env_logger::Builder::from_default_env()
            .filter_level(log::LevelFilter::Info)
            .parse_default_env()
            .try_init();
    });
}

/// Returns true when `STOCKSCAN_DEBUG` is set to `1` or `true`.
pub fn debug_mode() -> bool {
    std::env::var("STOCKSCAN_DEBUG")
        .map(|value| value == "1" || value.eq_ignore_ascii_case("true"))
        .unwrap_or(false)
}

/// Debug logging gated on the calling module's `ENABLE_LOGS`.
#[macro_export]
macro_rules! log_debug {
    ($($arg:tt)*) => {
        if ENABLE_LOGS {
            log::debug!($($arg)*);
        }
    };
}

/// Info logging gated on the calling module's `ENABLE_LOGS`.
#[macro_export]
macro_rules! log_info {
    ($($arg:tt)*) => {
        if ENABLE_LOGS {
            log::info!($($arg)*);
        }
    };
}

/// Warn logging gated on the calling module's `ENABLE_LOGS`.
#[macro_export]
macro_rules! log_warn {
    ($($arg:tt)*) => {
        if ENABLE_LOGS {
            log::warn!($($arg)*);
        }
    };
}

/// Error logging gated on the calling module's `ENABLE_LOGS`.
#[macro_export]
macro_rules! log_error {
    ($($arg:tt)*) => {
        if ENABLE_LOGS {
            log::error!($($arg)*);
        }
    };
}

#[cfg(test)]
mod tests {
    const ENABLE_LOGS: bool = false;

    #[test]
    fn init_logging_is_idempotent() {
        super::init_logging();
        super::init_logging();
    }

    #[test]
    fn gated_macros_expand_in_silenced_modules() {
        let stream = "stream-1";
        crate::log_debug!("decoded frame on {stream}");
        crate::log_info!("{} frames", 3);
        crate::log_warn!("stream {} ended", stream);
        crate::log_error!("open failed: {}", "busy");
    }
}
