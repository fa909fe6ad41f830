//! Marker files kept in each job directory.
//!
//! - `<container>.status`: exit code written by the job wrapper, read here.
//! - `StartedAt.time` / `FinishedAt.time`: first observed transition times,
//!   written once by the reconciler.

pub mod exit_code;
pub mod time_marker;

pub use exit_code::read_exit_code;
pub use time_marker::TimeMarker;
