#![warn(clippy::all, rust_2018_idioms)]

/// Tracing macros that attach the call site as a `location` field.
/// Library code logs through these so every event carries its origin.
#[macro_export]
macro_rules! trace_debug {
    ($($arg:tt)*) => {
        tracing::debug!(location = concat!(file!(), ":", line!()), $($arg)*);
    };
}

#[macro_export]
macro_rules! trace_info {
    ($($arg:tt)*) => {
        tracing::info!(location = concat!(file!(), ":", line!()), $($arg)*);
    };
}

#[macro_export]
macro_rules! trace_warn {
    ($($arg:tt)*) => {
        tracing::warn!(location = concat!(file!(), ":", line!()), $($arg)*);
    };
}

#[macro_export]
macro_rules! trace_error {
    ($($arg:tt)*) => {
        tracing::error!(location = concat!(file!(), ":", line!()), $($arg)*);
    };
}
