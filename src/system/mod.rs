//! Process-level plumbing: logging setup and signal handling.
pub mod logger;
pub mod shutdown_handlers;
