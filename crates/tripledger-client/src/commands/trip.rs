use std::future::Future;
use std::path::Path;

use tracing::info;

use crate::commands::common::LedgerSession;
use crate::contracts::envelope::{SuccessEnvelope, success};
use crate::contracts::types::CaptureData;
use crate::ledger::capture::{CaptureSequencer, ManualPosition, PositionSource};
use crate::ledger::geo::GeoPoint;
use crate::{ClientError, ClientResult};

#[derive(Debug, Default)]
pub struct TripStartOptions<'a> {
    /// Position typed on the command line. Without it no provider is
    /// available and the capture settles in `failed`.
    pub at: Option<GeoPoint>,
    pub home_override: Option<&'a Path>,
}

#[derive(Debug, Default)]
pub struct TripEndOptions<'a> {
    pub at: Option<GeoPoint>,
    pub round_trip: bool,
    pub home_override: Option<&'a Path>,
}

#[derive(Debug, Default)]
pub struct TripStatusOptions<'a> {
    pub home_override: Option<&'a Path>,
}

pub fn start(at: Option<GeoPoint>) -> ClientResult<SuccessEnvelope> {
    start_with_options(TripStartOptions {
        at,
        home_override: None,
    })
}

#[doc(hidden)]
pub fn start_with_options(options: TripStartOptions<'_>) -> ClientResult<SuccessEnvelope> {
    start_with_source(&ManualPosition(options.at), options.home_override)
}

/// Captures the trip start from `source` and persists the session.
pub fn start_with_source<P>(source: &P, home_override: Option<&Path>) -> ClientResult<SuccessEnvelope>
where
    P: PositionSource,
{
    let session = LedgerSession::open(home_override, None)?;
    let mut capture = session.capture()?;
    let state = block_on(capture.begin_capture(source))??;
    session.save_capture(&capture)?;
    info!(state = state.as_str(), "trip start processed");
    success("trip start", CaptureData::from_state(&state))
}

pub fn end(at: Option<GeoPoint>, round_trip: bool) -> ClientResult<SuccessEnvelope> {
    end_with_options(TripEndOptions {
        at,
        round_trip,
        home_override: None,
    })
}

#[doc(hidden)]
pub fn end_with_options(options: TripEndOptions<'_>) -> ClientResult<SuccessEnvelope> {
    end_with_source(
        &ManualPosition(options.at),
        options.round_trip,
        options.home_override,
    )
}

/// Captures the trip end and computes the pending distance.
pub fn end_with_source<P>(
    source: &P,
    round_trip: bool,
    home_override: Option<&Path>,
) -> ClientResult<SuccessEnvelope>
where
    P: PositionSource,
{
    let session = LedgerSession::open(home_override, None)?;
    let mut capture = session.capture()?;
    let state = block_on(capture.end_capture(source, round_trip))??;
    session.save_capture(&capture)?;
    info!(state = state.as_str(), round_trip, "trip end processed");
    success("trip end", CaptureData::from_state(&state))
}

pub fn status() -> ClientResult<SuccessEnvelope> {
    status_with_options(TripStatusOptions::default())
}

#[doc(hidden)]
pub fn status_with_options(options: TripStatusOptions<'_>) -> ClientResult<SuccessEnvelope> {
    let session = LedgerSession::open(options.home_override, None)?;
    let capture = session.capture()?;
    success("trip status", CaptureData::from_state(&capture.snapshot()))
}

pub fn reset() -> ClientResult<SuccessEnvelope> {
    reset_with_options(TripStatusOptions::default())
}

/// Drops the capture session and any pending distance.
#[doc(hidden)]
pub fn reset_with_options(options: TripStatusOptions<'_>) -> ClientResult<SuccessEnvelope> {
    let session = LedgerSession::open(options.home_override, None)?;
    let mut capture: CaptureSequencer = session.capture()?;
    capture.reset();
    session.save_capture(&capture)?;
    success("trip reset", CaptureData::from_state(&capture.snapshot()))
}

fn block_on<F>(future: F) -> ClientResult<F::Output>
where
    F: Future,
{
    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_time()
        .build()
        .map_err(|error| {
            ClientError::new(
                "internal_runtime_error",
                &format!("Could not start the position capture runtime: {error}"),
                vec!["Retry the command.".to_string()],
            )
        })?;
    Ok(runtime.block_on(future))
}
