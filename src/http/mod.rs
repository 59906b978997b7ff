//! Request pacing, dispatch and the HTTP transport.
mod engine;
mod rate;
mod transport;


pub use engine::{Attack, EngineSettings, EngineStats, MAX_CONCURRENCY, attack};
pub use rate::{RatePermit, RatePlan, RateScheduler, SchedulerCancel};
pub use transport::{ClientSettings, ReqwestTransport, Transport, TransportResponse};
