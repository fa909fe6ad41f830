//! Log assembly from job output files.
//!
//! # Pipeline
//!
//! 1. Read `job.out` and `<container>.out` through a [`LogSource`]; job output
//!    comes first, and either one alone is enough
//! 2. Truncate by `tail` lines, or else by `limit_bytes`
//! 3. With `timestamps` and a `since_*` option, keep only lines in the window

pub mod assembler;
pub mod filter;
pub mod query;
pub mod source;

pub use assembler::LogAssembler;
pub use query::{LogOptions, LogQuery};
pub use source::{FileLogSource, LogSource, LogStream, SourceError};
