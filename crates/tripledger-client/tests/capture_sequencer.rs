use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use tripledger_client::ledger::capture::{
    CaptureError, CaptureSequencer, CaptureStage, CaptureState, PositionSource,
};
use tripledger_client::ledger::geo::{GeoPoint, distance_km};

/// Replays a fixed list of fixes, one per request.
struct ScriptedSource {
    fixes: Vec<Result<GeoPoint, CaptureError>>,
    calls: AtomicUsize,
}

impl ScriptedSource {
    fn new(fixes: Vec<Result<GeoPoint, CaptureError>>) -> Self {
        Self {
            fixes,
            calls: AtomicUsize::new(0),
        }
    }
}

impl PositionSource for ScriptedSource {
    async fn request_position(&self) -> Result<GeoPoint, CaptureError> {
        let index = self.calls.fetch_add(1, Ordering::SeqCst);
        self.fixes
            .get(index)
            .copied()
            .unwrap_or(Err(CaptureError::Unavailable))
    }
}

struct NeverAnswers;

impl PositionSource for NeverAnswers {
    async fn request_position(&self) -> Result<GeoPoint, CaptureError> {
        std::future::pending().await
    }
}

fn sao_paulo() -> GeoPoint {
    GeoPoint::new(-23.5505, -46.6333)
}

fn rio() -> GeoPoint {
    GeoPoint::new(-22.9068, -43.1729)
}

#[tokio::test]
async fn one_way_trip_records_the_haversine_distance() {
    let source = ScriptedSource::new(vec![Ok(sao_paulo()), Ok(rio())]);
    let mut sequencer = CaptureSequencer::default();

    let started = sequencer.begin_capture(&source).await;
    assert!(matches!(started, Ok(CaptureState::StartCaptured { .. })));

    let ended = sequencer.end_capture(&source, false).await;
    assert!(ended.is_ok());
    let expected = distance_km(Some(&sao_paulo()), Some(&rio()));
    let pending = sequencer.pending_distance_km();
    assert!(pending.is_some());
    if let Some(distance) = pending {
        assert!((distance - expected).abs() < 1e-9);
        assert!(distance > 357.0 && distance < 361.0);
    }
}

#[tokio::test]
async fn round_trip_doubles_the_distance() {
    let source = ScriptedSource::new(vec![Ok(sao_paulo()), Ok(rio())]);
    let mut sequencer = CaptureSequencer::default();

    assert!(sequencer.begin_capture(&source).await.is_ok());
    let ended = sequencer.end_capture(&source, true).await;
    assert!(ended.is_ok());
    if let Ok(CaptureState::Completed {
        distance_km: distance,
        round_trip,
        ..
    }) = ended
    {
        let one_way = distance_km(Some(&sao_paulo()), Some(&rio()));
        assert!(round_trip);
        assert!((distance - one_way * 2.0).abs() < 1e-9);
    }
}

#[tokio::test]
async fn denied_end_keeps_no_distance_and_allows_a_new_start() {
    let source = ScriptedSource::new(vec![
        Ok(sao_paulo()),
        Err(CaptureError::PermissionDenied),
        Ok(rio()),
    ]);
    let mut sequencer = CaptureSequencer::default();

    assert!(sequencer.begin_capture(&source).await.is_ok());
    let ended = sequencer.end_capture(&source, false).await;
    assert!(matches!(
        ended,
        Ok(CaptureState::Failed {
            stage: CaptureStage::End,
            error: CaptureError::PermissionDenied,
        })
    ));
    assert!(sequencer.pending_distance_km().is_none());

    let again = sequencer.begin_capture(&source).await;
    assert!(matches!(again, Ok(CaptureState::StartCaptured { start }) if start == rio()));
}

#[tokio::test]
async fn second_start_while_start_captured_is_a_conflict() {
    let source = ScriptedSource::new(vec![Ok(sao_paulo()), Ok(rio())]);
    let mut sequencer = CaptureSequencer::default();

    assert!(sequencer.begin_capture(&source).await.is_ok());
    let repeated = sequencer.begin_capture(&source).await;
    assert!(repeated.is_err());
    if let Err(error) = repeated {
        assert_eq!(error.code, "capture_state_conflict");
    }
    assert!(sequencer.state().can_end());
}

#[tokio::test(start_paused = true)]
async fn silent_provider_times_out_into_failed() {
    let mut sequencer = CaptureSequencer::new(Duration::from_millis(5000));
    let result = sequencer.begin_capture(&NeverAnswers).await;
    assert!(matches!(
        result,
        Ok(CaptureState::Failed {
            stage: CaptureStage::Start,
            error: CaptureError::Timeout { timeout_ms: 5000 },
        })
    ));
    assert!(sequencer.state().can_begin());
}

#[tokio::test]
async fn subscribers_observe_every_settled_state() {
    let source = ScriptedSource::new(vec![Ok(sao_paulo()), Ok(rio())]);
    let mut sequencer = CaptureSequencer::default();
    let mut receiver = sequencer.subscribe();
    assert_eq!(*receiver.borrow_and_update(), CaptureState::Idle);

    assert!(sequencer.begin_capture(&source).await.is_ok());
    assert!(receiver.has_changed().unwrap_or(false));
    assert!(receiver.borrow_and_update().can_end());

    assert!(sequencer.end_capture(&source, false).await.is_ok());
    assert_eq!(receiver.borrow_and_update().as_str(), "completed");

    sequencer.reset();
    assert_eq!(*receiver.borrow_and_update(), CaptureState::Idle);
}
