//! Two-step position capture that turns a start and an end fix into a trip
//! distance.
//!
//! The sequencer owns an explicit state machine:
//!
//! ```text
//! Idle -> AwaitingStart -> StartCaptured -> AwaitingEnd -> Completed
//!              |                                 |
//!              +------------> Failed <-----------+
//! ```
//!
//! Every transition is published on a `watch` channel so front ends can bind
//! their start/end controls to [`CaptureState::can_begin`] and
//! [`CaptureState::can_end`].

use std::future::Future;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tokio::sync::watch;
use tracing::{debug, warn};

use crate::ledger::geo::{GeoPoint, distance_km};
use crate::{ClientError, ClientResult};

pub const DEFAULT_CAPTURE_TIMEOUT: Duration = Duration::from_millis(5000);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Error, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CaptureError {
    #[error("No position provider is available.")]
    Unavailable,
    #[error("Permission to read the position was denied.")]
    PermissionDenied,
    #[error("Position request timed out after {timeout_ms} ms.")]
    Timeout { timeout_ms: u64 },
}

impl CaptureError {
    pub const fn code(&self) -> &'static str {
        match self {
            Self::Unavailable => "geolocation_unavailable",
            Self::PermissionDenied => "geolocation_permission_denied",
            Self::Timeout { .. } => "geolocation_timeout",
        }
    }
}

/// Something that can report the device position once per call.
pub trait PositionSource {
    fn request_position(&self) -> impl Future<Output = Result<GeoPoint, CaptureError>> + Send;
}

/// Position typed by the user; `None` means no provider.
#[derive(Debug, Clone, Copy, Default)]
pub struct ManualPosition(pub Option<GeoPoint>);

impl PositionSource for ManualPosition {
    async fn request_position(&self) -> Result<GeoPoint, CaptureError> {
        self.0.ok_or(CaptureError::Unavailable)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CaptureStage {
    Start,
    End,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "state", rename_all = "snake_case")]
pub enum CaptureState {
    Idle,
    AwaitingStart,
    StartCaptured {
        start: GeoPoint,
    },
    AwaitingEnd {
        start: GeoPoint,
    },
    Completed {
        start: GeoPoint,
        end: GeoPoint,
        distance_km: f64,
        round_trip: bool,
    },
    Failed {
        stage: CaptureStage,
        error: CaptureError,
    },
}

impl CaptureState {
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Idle => "idle",
            Self::AwaitingStart => "awaiting_start",
            Self::StartCaptured { .. } => "start_captured",
            Self::AwaitingEnd { .. } => "awaiting_end",
            Self::Completed { .. } => "completed",
            Self::Failed { .. } => "failed",
        }
    }

    pub const fn can_begin(&self) -> bool {
        matches!(
            self,
            Self::Idle | Self::Completed { .. } | Self::Failed { .. }
        )
    }

    pub const fn can_end(&self) -> bool {
        matches!(self, Self::StartCaptured { .. })
    }

    pub const fn is_in_flight(&self) -> bool {
        matches!(self, Self::AwaitingStart | Self::AwaitingEnd { .. })
    }

    /// Distance waiting to be attached to the next revenue record.
    pub const fn pending_distance_km(&self) -> Option<f64> {
        match self {
            Self::Completed { distance_km, .. } => Some(*distance_km),
            _ => None,
        }
    }

    pub const fn start_point(&self) -> Option<GeoPoint> {
        match self {
            Self::StartCaptured { start }
            | Self::AwaitingEnd { start }
            | Self::Completed { start, .. } => Some(*start),
            _ => None,
        }
    }

    pub const fn end_point(&self) -> Option<GeoPoint> {
        match self {
            Self::Completed { end, .. } => Some(*end),
            _ => None,
        }
    }

    /// In-flight states cannot outlive the process that issued the request.
    fn settled(self) -> Self {
        match self {
            Self::AwaitingStart => Self::Idle,
            Self::AwaitingEnd { start } => Self::StartCaptured { start },
            other => other,
        }
    }
}

#[derive(Debug)]
pub struct CaptureSequencer {
    state: watch::Sender<CaptureState>,
    timeout: Duration,
}

impl CaptureSequencer {
    pub fn new(timeout: Duration) -> Self {
        Self::restore(timeout, CaptureState::Idle)
    }

    /// Resumes from a persisted state. A state that was mid-request is
    /// rolled back to the last settled state.
    pub fn restore(timeout: Duration, state: CaptureState) -> Self {
        let (sender, _receiver) = watch::channel(state.settled());
        Self {
            state: sender,
            timeout,
        }
    }

    pub fn state(&self) -> CaptureState {
        self.state.borrow().clone()
    }

    pub fn subscribe(&self) -> watch::Receiver<CaptureState> {
        self.state.subscribe()
    }

    /// Settled state suitable for persistence.
    pub fn snapshot(&self) -> CaptureState {
        self.state().settled()
    }

    pub fn pending_distance_km(&self) -> Option<f64> {
        self.state.borrow().pending_distance_km()
    }

    /// Captures the starting point. Position failures settle the machine in
    /// `Failed`; only an out-of-order call returns an error.
    pub async fn begin_capture<P>(&mut self, source: &P) -> ClientResult<CaptureState>
    where
        P: PositionSource,
    {
        let current = self.state();
        if !current.can_begin() {
            return Err(ClientError::capture_state_conflict(current.as_str(), "start"));
        }

        self.transition(CaptureState::AwaitingStart);
        let next = match self.request(source).await {
            Ok(start) => CaptureState::StartCaptured { start },
            Err(error) => {
                warn!(code = error.code(), "start position capture failed");
                CaptureState::Failed {
                    stage: CaptureStage::Start,
                    error,
                }
            }
        };
        self.transition(next.clone());
        Ok(next)
    }

    /// Captures the end point and derives the trip distance, doubled for
    /// round trips.
    pub async fn end_capture<P>(&mut self, source: &P, round_trip: bool) -> ClientResult<CaptureState>
    where
        P: PositionSource,
    {
        let current = self.state();
        let CaptureState::StartCaptured { start } = current else {
            return Err(ClientError::capture_state_conflict(current.as_str(), "end"));
        };

        self.transition(CaptureState::AwaitingEnd { start });
        let next = match self.request(source).await {
            Ok(end) => {
                let one_way = distance_km(Some(&start), Some(&end));
                let distance = if round_trip { one_way * 2.0 } else { one_way };
                CaptureState::Completed {
                    start,
                    end,
                    distance_km: distance,
                    round_trip,
                }
            }
            Err(error) => {
                warn!(code = error.code(), "end position capture failed");
                CaptureState::Failed {
                    stage: CaptureStage::End,
                    error,
                }
            }
        };
        self.transition(next.clone());
        Ok(next)
    }

    /// Drops the session, including any pending distance.
    pub fn reset(&mut self) {
        self.transition(CaptureState::Idle);
    }

    async fn request<P>(&self, source: &P) -> Result<GeoPoint, CaptureError>
    where
        P: PositionSource,
    {
        match tokio::time::timeout(self.timeout, source.request_position()).await {
            Ok(result) => result,
            Err(_elapsed) => Err(CaptureError::Timeout {
                timeout_ms: u64::try_from(self.timeout.as_millis()).unwrap_or(u64::MAX),
            }),
        }
    }

    fn transition(&self, next: CaptureState) {
        debug!(state = next.as_str(), "capture transition");
        self.state.send_replace(next);
    }
}

impl Default for CaptureSequencer {
    fn default() -> Self {
        Self::new(DEFAULT_CAPTURE_TIMEOUT)
    }
}

#[cfg(test)]
mod tests {
    use super::{CaptureSequencer, CaptureStage, CaptureState, ManualPosition};
    use crate::ledger::geo::GeoPoint;

    #[tokio::test]
    async fn missing_provider_fails_start_and_allows_retry() {
        let mut sequencer = CaptureSequencer::default();
        let result = sequencer.begin_capture(&ManualPosition(None)).await;
        assert!(result.is_ok());
        if let Ok(state) = result {
            assert!(matches!(
                state,
                CaptureState::Failed {
                    stage: CaptureStage::Start,
                    ..
                }
            ));
            assert!(state.can_begin());
            assert!(!state.can_end());
        }
    }

    #[tokio::test]
    async fn end_before_start_is_rejected() {
        let mut sequencer = CaptureSequencer::default();
        let point = ManualPosition(Some(GeoPoint::new(0.0, 0.0)));
        let result = sequencer.end_capture(&point, false).await;
        assert!(result.is_err());
        if let Err(error) = result {
            assert_eq!(error.code, "capture_state_conflict");
        }
        assert_eq!(sequencer.state(), CaptureState::Idle);
    }

    #[test]
    fn restore_rolls_back_in_flight_states() {
        let start = GeoPoint::new(1.0, 2.0);
        let from_awaiting_end = CaptureSequencer::restore(
            super::DEFAULT_CAPTURE_TIMEOUT,
            CaptureState::AwaitingEnd { start },
        );
        assert_eq!(
            from_awaiting_end.state(),
            CaptureState::StartCaptured { start }
        );

        let from_awaiting_start =
            CaptureSequencer::restore(super::DEFAULT_CAPTURE_TIMEOUT, CaptureState::AwaitingStart);
        assert_eq!(from_awaiting_start.state(), CaptureState::Idle);
    }
}
