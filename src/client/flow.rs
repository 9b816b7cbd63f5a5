//! Per-request authentication flow
//!
//! Every outgoing request walks this state machine:
//!
//! ```text
//! Idle -> Sent -> Succeeded
//!              -> Failed
//!              -> AuthRejected -> Refreshing -> Retried -> RetriedSucceeded
//!                                                       -> RetriedFailed
//!                                            -> RefreshFailed
//! ```
//!
//! `Retried` has no edge back to `AuthRejected`, so a request is refreshed
//! and retried at most once.

use std::fmt;
use thiserror::Error;

/// Where a request is in its lifecycle
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    Idle,
    Sent,
    AuthRejected,
    Refreshing,
    Retried,
    Succeeded,
    Failed,
    RetriedSucceeded,
    RetriedFailed,
    RefreshFailed,
}

impl Stage {
    pub fn is_terminal(self) -> bool {
        matches!(
            self,
            Stage::Succeeded
                | Stage::Failed
                | Stage::RetriedSucceeded
                | Stage::RetriedFailed
                | Stage::RefreshFailed
        )
    }
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Stage::Idle => "idle",
            Stage::Sent => "sent",
            Stage::AuthRejected => "auth_rejected",
            Stage::Refreshing => "refreshing",
            Stage::Retried => "retried",
            Stage::Succeeded => "succeeded",
            Stage::Failed => "failed",
            Stage::RetriedSucceeded => "retried_succeeded",
            Stage::RetriedFailed => "retried_failed",
            Stage::RefreshFailed => "refresh_failed",
        };
        f.write_str(name)
    }
}

/// How a dispatched request came back
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    /// 2xx
    Success,
    /// 401
    Unauthorized,
    /// Any other status or a transport failure
    Error,
}

impl Outcome {
    pub fn from_status(status: u16) -> Self {
        match status {
            200..=299 => Outcome::Success,
            401 => Outcome::Unauthorized,
            _ => Outcome::Error,
        }
    }
}

/// Inputs that move a request between stages
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Event {
    Dispatch,
    Response(Outcome),
    BeginRefresh,
    RefreshSucceeded,
    RefreshFailed,
}

/// Rejected transition
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("invalid request transition from {from} on {event:?}")]
pub struct FlowError {
    pub from: Stage,
    pub event: Event,
}

/// State machine for a single original request
#[derive(Debug, Clone)]
pub struct RequestFlow {
    stage: Stage,
    refreshable: bool,
}

impl RequestFlow {
    /// Flow for a request that may recover from a 401 by refreshing
    pub fn new() -> Self {
        Self {
            stage: Stage::Idle,
            refreshable: true,
        }
    }

    /// Flow for a request sent without credentials; a 401 is final
    pub fn anonymous() -> Self {
        Self {
            stage: Stage::Idle,
            refreshable: false,
        }
    }

    pub fn stage(&self) -> Stage {
        self.stage
    }

    /// Apply an event, returning the new stage
    pub fn advance(&mut self, event: Event) -> Result<Stage, FlowError> {
        let next = transition(self.stage, event, self.refreshable).ok_or(FlowError {
            from: self.stage,
            event,
        })?;

        tracing::trace!(from = %self.stage, to = %next, "request transition");
        self.stage = next;
        Ok(next)
    }
}

impl Default for RequestFlow {
    fn default() -> Self {
        Self::new()
    }
}

fn transition(stage: Stage, event: Event, refreshable: bool) -> Option<Stage> {
    use Event::*;
    use Outcome::*;

    let next = match (stage, event) {
        (Stage::Idle, Dispatch) => Stage::Sent,

        (Stage::Sent, Response(Success)) => Stage::Succeeded,
        (Stage::Sent, Response(Unauthorized)) if refreshable => Stage::AuthRejected,
        (Stage::Sent, Response(Unauthorized | Error)) => Stage::Failed,

        (Stage::AuthRejected, BeginRefresh) => Stage::Refreshing,

        (Stage::Refreshing, RefreshSucceeded) => Stage::Retried,
        (Stage::Refreshing, RefreshFailed) => Stage::RefreshFailed,

        (Stage::Retried, Response(Success)) => Stage::RetriedSucceeded,
        (Stage::Retried, Response(Unauthorized | Error)) => Stage::RetriedFailed,

        _ => return None,
    };

    Some(next)
}
