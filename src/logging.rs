use chrono::Local;
use env_logger::{Builder, Env};
use log::LevelFilter;
use std::io::Write;

// Conditional logging macros - only active in debug builds

#[cfg(debug_assertions)]
#[macro_export]
macro_rules! debug_log {
    ($($arg:tt)*) => {
        log::debug!($($arg)*);
    };
}

#[cfg(not(debug_assertions))]
#[macro_export]
macro_rules! debug_log {
    ($($arg:tt)*) => {{}};
}

#[cfg(debug_assertions)]
#[macro_export]
macro_rules! info_log {
    ($($arg:tt)*) => {
        log::info!($($arg)*);
    };
}

#[cfg(not(debug_assertions))]
#[macro_export]
macro_rules! info_log {
    ($($arg:tt)*) => {{}};
}

/// Installs the global logger on stderr.
///
/// Records carry a local timestamp and the `file:line` they came from.
/// `RUST_LOG` takes precedence over `verbose`.
pub fn init_logger(verbose: bool) {
    let default_level = if verbose { LevelFilter::Debug } else { LevelFilter::Info };

    let mut builder = Builder::from_env(Env::default().default_filter_or(default_level.as_str()));
    builder.format(|buf, record| {
        writeln!(
            buf,
            "{} {}:{}: {}",
            Local::now().format("%Y/%m/%d %H:%M:%S"),
            record.file().unwrap_or("?"),
            record.line().unwrap_or(0),
            record.args()
        )
    });
    // A logger may already be installed.
    let _ = builder.try_init();
}
