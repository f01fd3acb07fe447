// Logging macros that call tracing underneath but compile down to nothing
// unless the matching `log_*` feature is enabled for this crate.

macro_rules! log_info {
    ($($t:tt)*) => {
        if cfg!(feature = "log_info") {
            tracing::info!($($t)*);
        }
    };
}

macro_rules! log_warn {
    ($($t:tt)*) => {
        if cfg!(feature = "log_warnings") {
            tracing::warn!($($t)*);
        }
    };
}

macro_rules! log_debug {
    ($($t:tt)*) => {
        if cfg!(feature = "log_debug") {
            tracing::debug!($($t)*);
        }
    };
}

macro_rules! log_error {
    ($($t:tt)*) => {
        if cfg!(feature = "log_errors") {
            tracing::error!($($t)*);
        }
    };
}

pub(crate) use log_debug;
pub(crate) use log_error;
pub(crate) use log_info;
pub(crate) use log_warn;
