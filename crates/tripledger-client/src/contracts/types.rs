use serde::Serialize;

use crate::ledger::capture::{CaptureError, CaptureStage, CaptureState};
use crate::ledger::date::{format_display_date, month_name};
use crate::ledger::geo::GeoPoint;
use crate::ledger::period::{CategoryTotal, FilterPeriod, PeriodTotals};
use crate::ledger::record::TripRecord;
use crate::ledger::store::{DeleteOutcome, MergeCounts};

#[derive(Debug, Clone, Serialize)]
pub struct PeriodView {
    pub month: u32,
    pub year: i32,
    pub label: String,
}

impl From<FilterPeriod> for PeriodView {
    fn from(period: FilterPeriod) -> Self {
        Self {
            month: period.month,
            year: period.year,
            label: period.label(),
        }
    }
}

/// Flat rendering of a record for list and submit output.
#[derive(Debug, Clone, Serialize)]
pub struct RecordView {
    pub id: String,
    pub kind: String,
    pub date: String,
    pub display_date: Option<String>,
    pub amount: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub client_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub destination: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub distance_km: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub start_coord: Option<GeoPoint>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub end_coord: Option<GeoPoint>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub category_color: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

impl From<&TripRecord> for RecordView {
    fn from(record: &TripRecord) -> Self {
        let mut view = Self {
            id: record.id().to_string(),
            kind: record.kind().as_str().to_string(),
            date: record.raw_date().to_string(),
            display_date: record.date().as_ref().map(format_display_date),
            amount: record.amount(),
            client_name: None,
            destination: None,
            distance_km: None,
            start_coord: None,
            end_coord: None,
            category: None,
            category_color: None,
            description: None,
        };

        match record {
            TripRecord::Revenue(revenue) => {
                view.client_name = Some(revenue.client_name.clone());
                view.destination = Some(revenue.destination.clone());
                view.distance_km = Some(revenue.distance_km.unwrap_or(0.0));
                view.start_coord = revenue.start_coord;
                view.end_coord = revenue.end_coord;
            }
            TripRecord::Expense(expense) => {
                view.category = Some(expense.category.as_str().to_string());
                view.category_color = Some(expense.category.color().to_string());
                view.description = Some(expense.description.clone());
            }
        }

        view
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct RecordsListData {
    pub period: PeriodView,
    pub total: usize,
    pub rows: Vec<RecordView>,
}

#[derive(Debug, Clone, Serialize)]
pub struct SummaryData {
    pub period: PeriodView,
    pub record_count: usize,
    pub totals: PeriodTotals,
    pub category_breakdown: Vec<CategoryTotal>,
}

#[derive(Debug, Clone, Copy, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum DistanceSource {
    Manual,
    Capture,
    None,
}

#[derive(Debug, Clone, Serialize)]
pub struct RecordSubmitData {
    pub record: RecordView,
    pub distance_source: DistanceSource,
    pub capture_cleared: bool,
    pub period: PeriodView,
    pub totals: PeriodTotals,
}

#[derive(Debug, Clone, Serialize)]
pub struct RecordDeleteData {
    pub record_id: String,
    pub outcome: DeleteOutcome,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub period: Option<PeriodView>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub totals: Option<PeriodTotals>,
}

#[derive(Debug, Clone, Serialize)]
pub struct CaptureFailure {
    pub stage: CaptureStage,
    pub code: String,
    pub message: String,
    pub recovery_steps: Vec<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct CaptureData {
    pub state: String,
    pub can_begin: bool,
    pub can_end: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub start: Option<GeoPoint>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub end: Option<GeoPoint>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub round_trip: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub pending_distance_km: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub failure: Option<CaptureFailure>,
}

impl CaptureData {
    pub fn from_state(state: &CaptureState) -> Self {
        let round_trip = match state {
            CaptureState::Completed { round_trip, .. } => Some(*round_trip),
            _ => None,
        };
        let failure = match state {
            CaptureState::Failed { stage, error } => Some(capture_failure(*stage, error)),
            _ => None,
        };

        Self {
            state: state.as_str().to_string(),
            can_begin: state.can_begin(),
            can_end: state.can_end(),
            start: state.start_point(),
            end: state.end_point(),
            round_trip,
            pending_distance_km: state.pending_distance_km(),
            failure,
        }
    }
}

fn capture_failure(stage: CaptureStage, error: &CaptureError) -> CaptureFailure {
    let client_error = crate::ClientError::from_capture_error(error);
    CaptureFailure {
        stage,
        code: client_error.code,
        message: client_error.message,
        recovery_steps: client_error.recovery_steps,
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct MonthOption {
    pub month: u32,
    pub name: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct PeriodsData {
    pub current: PeriodView,
    pub years: Vec<i32>,
    pub months: Vec<MonthOption>,
}

impl PeriodsData {
    pub fn new(current: FilterPeriod, years: Vec<i32>) -> Self {
        let months = (1..=12)
            .filter_map(|month| {
                month_name(month).map(|name| MonthOption {
                    month,
                    name: name.to_string(),
                })
            })
            .collect();
        Self {
            current: current.into(),
            years,
            months,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct ImportData {
    pub path: String,
    pub summary: MergeCounts,
    pub skipped_malformed: usize,
    pub message: String,
}
