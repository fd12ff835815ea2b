use std::path::Path;

use chrono::NaiveDate;
use tracing::debug;

use crate::ClientResult;
use crate::commands::common::LedgerSession;
use crate::contracts::envelope::{SuccessEnvelope, success};
use crate::contracts::types::{DistanceSource, RecordSubmitData, RecordView};
use crate::ledger::capture::CaptureState;
use crate::ledger::record::RevenueInput;

#[derive(Debug, Default)]
pub struct RevenueAddOptions<'a> {
    pub client_name: String,
    pub destination: String,
    pub amount: f64,
    /// Defaults to today.
    pub date: Option<String>,
    /// Overrides the distance measured by the trip capture.
    pub distance_km: Option<f64>,
    pub home_override: Option<&'a Path>,
    pub today: Option<NaiveDate>,
}

pub fn add(
    client_name: &str,
    destination: &str,
    amount: f64,
    date: Option<&str>,
    distance_km: Option<f64>,
) -> ClientResult<SuccessEnvelope> {
    add_with_options(RevenueAddOptions {
        client_name: client_name.to_string(),
        destination: destination.to_string(),
        amount,
        date: date.map(std::string::ToString::to_string),
        distance_km,
        home_override: None,
        today: None,
    })
}

/// Records a trip fare. A completed trip capture supplies the distance and
/// coordinates. Any capture session, finished or not, is cleared once the
/// record is saved.
#[doc(hidden)]
pub fn add_with_options(options: RevenueAddOptions<'_>) -> ClientResult<SuccessEnvelope> {
    let mut session = LedgerSession::open(options.home_override, options.today)?;
    let mut capture = session.capture()?;
    let captured = capture.state();
    let completed = matches!(captured, CaptureState::Completed { .. });

    let (distance_km, distance_source) = match (options.distance_km, captured.pending_distance_km())
    {
        (Some(manual), _) => (Some(manual), DistanceSource::Manual),
        (None, Some(measured)) => (Some(measured), DistanceSource::Capture),
        (None, None) => (None, DistanceSource::None),
    };

    let input = RevenueInput {
        client_name: options.client_name,
        destination: options.destination,
        date: options.date.unwrap_or_else(|| session.today_iso()),
        amount: options.amount,
        distance_km,
        start_coord: captured.start_point().filter(|_| completed),
        end_coord: captured.end_point(),
    };

    let record = session.store.submit_revenue(input)?;

    let capture_cleared = captured != CaptureState::Idle;
    if capture_cleared {
        capture.reset();
        session.save_capture(&capture)?;
        debug!("capture session cleared after revenue submission");
    }

    let period = session.store.current_period();
    let data = RecordSubmitData {
        record: RecordView::from(&record),
        distance_source,
        capture_cleared,
        period: period.into(),
        totals: session.store.totals(&period),
    };

    success("revenue add", data)
}
