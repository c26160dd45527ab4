//! Logging abstraction
//!
//! Provides unified logging macros that work across targets:
//! - Embedded (`defmt-log` feature): uses defmt
//! - Host tests: uses println!/eprintln!
//! - Host non-test: no-op
//!
//! The driver logs channel lifecycle and timing decisions at debug level and
//! refused operations at warn/error level; nothing here is required for
//! correct operation.

/// Log debug message
#[macro_export]
macro_rules! log_debug {
    ($($arg:tt)*) => {{
        #[cfg(feature = "defmt-log")]
        ::defmt::debug!($($arg)*);

        #[cfg(all(not(feature = "defmt-log"), test))]
        println!("[DEBUG] {}", format!($($arg)*));
    }};
}

/// Log info message
#[macro_export]
macro_rules! log_info {
    ($($arg:tt)*) => {{
        #[cfg(feature = "defmt-log")]
        ::defmt::info!($($arg)*);

        #[cfg(all(not(feature = "defmt-log"), test))]
        println!("[INFO] {}", format!($($arg)*));
    }};
}

/// Log warning message
#[macro_export]
macro_rules! log_warn {
    ($($arg:tt)*) => {{
        #[cfg(feature = "defmt-log")]
        ::defmt::warn!($($arg)*);

        #[cfg(all(not(feature = "defmt-log"), test))]
        println!("[WARN] {}", format!($($arg)*));
    }};
}

/// Log error message
#[macro_export]
macro_rules! log_error {
    ($($arg:tt)*) => {{
        #[cfg(feature = "defmt-log")]
        ::defmt::error!($($arg)*);

        #[cfg(all(not(feature = "defmt-log"), test))]
        eprintln!("[ERROR] {}", format!($($arg)*));
    }};
}
