//! Core library for the `strafe` CLI.
//!
//! `strafe` sends one request template at a fixed rate for a fixed duration
//! and reports latency and throughput. The pipeline is a rate scheduler
//! feeding a bounded attack engine, whose results stream into a metrics
//! accumulator that the reporter renders as text or JSON.
mod app;
pub mod args;
pub mod config;
mod entry;
pub mod error;
pub mod http;
pub mod metrics;
pub mod report;
pub mod shutdown;
pub mod system;
pub mod target;

pub use entry::run;
