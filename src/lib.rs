pub mod api;
pub mod config;
pub mod error;
pub mod logs;
pub mod scheduler;
pub mod shutdown;
pub mod sidecar;
pub mod status;
pub mod store;
