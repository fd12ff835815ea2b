use std::path::Path;

use chrono::NaiveDate;

use crate::commands::common::LedgerSession;
use crate::contracts::envelope::{SuccessEnvelope, success};
use crate::contracts::types::{RecordDeleteData, RecordView, RecordsListData};
use crate::ledger::period::FilterPeriod;
use crate::ledger::record::RecordId;
use crate::ledger::store::DeleteOutcome;
use crate::{ClientError, ClientResult};

#[derive(Debug, Default)]
pub struct RecordsListOptions<'a> {
    pub month: Option<u32>,
    pub year: Option<i32>,
    pub home_override: Option<&'a Path>,
    pub today: Option<NaiveDate>,
}

#[derive(Debug, Default)]
pub struct RecordsDeleteOptions<'a> {
    pub record_id: String,
    pub home_override: Option<&'a Path>,
    pub today: Option<NaiveDate>,
}

pub fn list(month: Option<u32>, year: Option<i32>) -> ClientResult<SuccessEnvelope> {
    list_with_options(RecordsListOptions {
        month,
        year,
        home_override: None,
        today: None,
    })
}

#[doc(hidden)]
pub fn list_with_options(options: RecordsListOptions<'_>) -> ClientResult<SuccessEnvelope> {
    let session = LedgerSession::open(options.home_override, options.today)?;
    let period = FilterPeriod::resolve(options.month, options.year, session.today)?;

    let rows = session
        .store
        .filtered_records(&period)
        .into_iter()
        .map(RecordView::from)
        .collect::<Vec<_>>();

    let data = RecordsListData {
        period: period.into(),
        total: rows.len(),
        rows,
    };
    success("records list", data)
}

/// Deletes one record after `confirm` agrees. An unknown id is an error so
/// scripted callers notice typos.
pub fn delete<F>(record_id: &str, confirm: F) -> ClientResult<SuccessEnvelope>
where
    F: FnOnce(&str) -> bool,
{
    delete_with_options(
        RecordsDeleteOptions {
            record_id: record_id.to_string(),
            home_override: None,
            today: None,
        },
        confirm,
    )
}

#[doc(hidden)]
pub fn delete_with_options<F>(
    options: RecordsDeleteOptions<'_>,
    confirm: F,
) -> ClientResult<SuccessEnvelope>
where
    F: FnOnce(&str) -> bool,
{
    let trimmed = options.record_id.trim();
    if trimmed.is_empty() {
        return Err(ClientError::invalid_argument_for_command(
            "A record id is required.",
            Some("records delete"),
        ));
    }

    let mut session = LedgerSession::open(options.home_override, options.today)?;
    let id = RecordId::parse(trimmed);
    let period = session
        .store
        .find(&id)
        .and_then(|record| record.date())
        .map(FilterPeriod::containing);

    let outcome = session.store.delete_record(&id, confirm)?;
    if outcome == DeleteOutcome::NotFound {
        return Err(ClientError::record_not_found(trimmed));
    }

    let totals = period.map(|value| session.store.totals(&value));
    let data = RecordDeleteData {
        record_id: id.to_string(),
        outcome,
        period: period.map(Into::into),
        totals,
    };
    success("records delete", data)
}
