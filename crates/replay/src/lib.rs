//! RUL Replay Client
//!
//! Replays one test unit cycle by cycle against the prediction endpoint,
//! keeping a client-side history of estimates and stopping at the first
//! failure.

mod config;
mod monitor;
mod request;
mod transport;

pub use config::{ConfigError, ReplayConfig, INTERVAL_RANGE, UNIT_RANGE};
pub use monitor::{AbortReason, ReplayMonitor, ReplayState, Snapshot};
pub use request::{row_request, unit_requests};
pub use transport::{HttpTransport, PredictionTransport, TransportError};
