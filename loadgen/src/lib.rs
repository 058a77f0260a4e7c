//! Concurrent HTTP POST load generator.
//!
//! A [`Coordinator`] starts a fixed pool of virtual users, lets them send requests
//! for the configured duration, then stops and joins them and returns a
//! [`RunReport`] with attempted, succeeded and failed counts.

pub mod client;
pub mod config;
pub mod coordinator;
pub mod error;
pub mod pool;
pub mod report;

pub use crate::client::{HttpClient, RequestOutcome};
pub use crate::config::{Cli, RunConfig};
pub use crate::coordinator::{Coordinator, RunState};
pub use crate::error::LoadError;
pub use crate::report::RunReport;
pub use http_load_util::{CountersSnapshot, RunCounters, StopSignal};
