//! # jsearch common
//!
//! The pure part of the reconnaissance pipeline: everything here is free of process
//! and filesystem orchestration so it can be shared by the runner, the stages and the
//! command line front-end.
//!
//! * [`host`] turns raw tool output into canonical, comparable keys.
//! * [`results`] holds the deduplicated views of everything discovered so far.
//! * [`target`] parses the apex domain a run is pointed at.
//! * [`tools`] is the catalogue of external executables the pipeline drives.
//! * [`config`] is the immutable run configuration.
//! * [`summary`] and [`report`] describe what a run leaves behind.

pub mod config;
pub mod error;
pub mod host;
pub mod print;
pub mod report;
pub mod results;
pub mod summary;
pub mod target;
pub mod tools;

/// Target of plain informational events.
pub const LOG_TARGET: &str = "jsearch";
/// Target of events that report a successful step.
pub const SUCCESS_TARGET: &str = "jsearch::success";
/// Target of raw operator lines: stage headers, tool output and tagged discoveries.
pub const PRINT_TARGET: &str = "jsearch::print";

#[macro_export]
macro_rules! info {
    ($($arg:tt)*) => {
        ::tracing::info!(target: $crate::LOG_TARGET, $($arg)*)
    };
}

#[macro_export]
macro_rules! success {
    ($($arg:tt)*) => {
        ::tracing::info!(target: $crate::SUCCESS_TARGET, $($arg)*)
    };
}

#[macro_export]
macro_rules! warn {
    ($($arg:tt)*) => {
        ::tracing::warn!(target: $crate::LOG_TARGET, $($arg)*)
    };
}

#[macro_export]
macro_rules! error {
    ($($arg:tt)*) => {
        ::tracing::error!(target: $crate::LOG_TARGET, $($arg)*)
    };
}

#[macro_export]
macro_rules! debug {
    ($($arg:tt)*) => {
        ::tracing::debug!(target: $crate::LOG_TARGET, $($arg)*)
    };
}
