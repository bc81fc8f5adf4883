#![deny(missing_docs)]
//! Logging facade for the roster crates.
//!
//! `roster_core` and `roster_engine` log only through these macros; the
//! binary decides where the lines end up (see `roster_app`'s logging setup).

#[doc(hidden)]
pub use log;

/// Logs a debug-level message using the global logging facade.
#[macro_export]
macro_rules! roster_debug {
    ($($arg:tt)*) => {{
        $crate::log::debug!($($arg)*);
    }};
}

/// Logs an info-level message using the global logging facade.
#[macro_export]
macro_rules! roster_info {
    ($($arg:tt)*) => {{
        $crate::log::info!($($arg)*);
    }};
}

/// Logs a warn-level message using the global logging facade.
#[macro_export]
macro_rules! roster_warn {
    ($($arg:tt)*) => {{
        $crate::log::warn!($($arg)*);
    }};
}

/// Logs an error-level message using the global logging facade.
#[macro_export]
macro_rules! roster_error {
    ($($arg:tt)*) => {{
        $crate::log::error!($($arg)*);
    }};
}

/// Routes log output through the test harness so it is captured per test.
///
/// Safe to call from every test; only the first call installs the logger.
pub fn initialize_for_tests() {
    use simplelog::{ConfigBuilder, TestLogger};

    let config = ConfigBuilder::new()
        .add_filter_allow_str("roster_core")
        .add_filter_allow_str("roster_engine")
        .build();
    let _ = TestLogger::init(log::LevelFilter::Debug, config);
}
