//! Replay Monitor
//!
//! Drives one unit's rows through a [`PredictionTransport`] strictly in cycle
//! order, one call at a time, and stops at the first failure.

use crate::transport::PredictionTransport;
use alerting::RiskStatus;
use inference_engine::{PredictRequest, PredictionPayload};
use std::fmt;
use std::time::Duration;
use tracing::{error, info};

/// Why a run stopped early
#[derive(Debug, Clone, PartialEq)]
pub enum AbortReason {
    /// Timeout, refused connection or non-2xx status
    Transport(String),
    /// The endpoint answered with an `erro` payload
    Prediction(String),
    /// The endpoint answered with a status label we do not know
    UnknownStatus(String),
}

impl fmt::Display for AbortReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AbortReason::Transport(msg) => write!(f, "transport failure: {msg}"),
            AbortReason::Prediction(msg) => write!(f, "prediction error: {msg}"),
            AbortReason::UnknownStatus(label) => write!(f, "unknown status label: {label}"),
        }
    }
}

/// Lifecycle of a replay run
#[derive(Debug, Clone, PartialEq)]
pub enum ReplayState {
    Idle,
    Running,
    Completed,
    Aborted { cycle: u32, reason: AbortReason },
}

impl ReplayState {
    pub fn is_finished(&self) -> bool {
        matches!(self, ReplayState::Completed | ReplayState::Aborted { .. })
    }
}

/// Latest successful prediction
#[derive(Debug, Clone, PartialEq)]
pub struct Snapshot {
    pub cycle: u32,
    pub rul_estimate: f64,
    pub status: RiskStatus,
}

/// Client-side monitor for a single unit
pub struct ReplayMonitor<T> {
    transport: T,
    interval: Duration,
    state: ReplayState,
    history: Vec<(u32, f64)>,
    current: Option<Snapshot>,
    calls: usize,
}

impl<T: PredictionTransport> ReplayMonitor<T> {
    pub fn new(transport: T, interval: Duration) -> Self {
        Self {
            transport,
            interval,
            state: ReplayState::Idle,
            history: Vec::new(),
            current: None,
            calls: 0,
        }
    }

    pub fn state(&self) -> &ReplayState {
        &self.state
    }

    /// (cycle, estimate) for every successful call of the current run
    pub fn history(&self) -> &[(u32, f64)] {
        &self.history
    }

    pub fn current(&self) -> Option<&Snapshot> {
        self.current.as_ref()
    }

    /// Transport calls issued by the current run
    pub fn calls(&self) -> usize {
        self.calls
    }

    pub fn transport(&self) -> &T {
        &self.transport
    }

    /// Start a fresh run over `requests`, ordered by cycle.
    ///
    /// Clears the previous run's history. Sleeps `interval` between calls,
    /// never after the last one.
    pub async fn start(&mut self, unit_id: u32, requests: &[(u32, PredictRequest)]) -> &ReplayState {
        self.history.clear();
        self.current = None;
        self.calls = 0;
        self.state = ReplayState::Running;
        info!("Replaying unit {} over {} cycles", unit_id, requests.len());

        for (i, (cycle, request)) in requests.iter().enumerate() {
            self.calls += 1;
            let outcome = match self.transport.predict(request).await {
                Err(err) => Err(AbortReason::Transport(err.to_string())),
                Ok(PredictionPayload::Failure { erro }) => Err(AbortReason::Prediction(erro)),
                Ok(PredictionPayload::Success {
                    rul_predito,
                    status,
                    ..
                }) => status
                    .parse::<RiskStatus>()
                    .map(|status| (rul_predito, status))
                    .map_err(|e| AbortReason::UnknownStatus(e.0)),
            };

            let (rul_estimate, status) = match outcome {
                Ok(ok) => ok,
                Err(reason) => {
                    error!("Replay of unit {} aborted at cycle {}: {}", unit_id, cycle, reason);
                    self.state = ReplayState::Aborted {
                        cycle: *cycle,
                        reason,
                    };
                    return &self.state;
                }
            };

            self.history.push((*cycle, rul_estimate));
            self.current = Some(Snapshot {
                cycle: *cycle,
                rul_estimate,
                status,
            });
            info!("Unit {} cycle {}: RUL {:.2} ({})", unit_id, cycle, rul_estimate, status);

            if i + 1 < requests.len() {
                tokio::time::sleep(self.interval).await;
            }
        }

        info!(
            "Replay of unit {} completed after {} cycles",
            unit_id,
            self.history.len()
        );
        self.state = ReplayState::Completed;
        &self.state
    }
}
