use std::path::Path;

use chrono::NaiveDate;

use crate::ClientResult;
use crate::commands::common::LedgerSession;
use crate::contracts::envelope::{SuccessEnvelope, success};
use crate::contracts::types::SummaryData;
use crate::ledger::period::FilterPeriod;

#[derive(Debug, Default)]
pub struct SummaryOptions<'a> {
    pub month: Option<u32>,
    pub year: Option<i32>,
    pub home_override: Option<&'a Path>,
    pub today: Option<NaiveDate>,
}

pub fn run(month: Option<u32>, year: Option<i32>) -> ClientResult<SuccessEnvelope> {
    run_with_options(SummaryOptions {
        month,
        year,
        home_override: None,
        today: None,
    })
}

#[doc(hidden)]
pub fn run_with_options(options: SummaryOptions<'_>) -> ClientResult<SuccessEnvelope> {
    let session = LedgerSession::open(options.home_override, options.today)?;
    let period = FilterPeriod::resolve(options.month, options.year, session.today)?;

    let data = SummaryData {
        period: period.into(),
        record_count: session.store.filtered_records(&period).len(),
        totals: session.store.totals(&period),
        category_breakdown: session.store.category_breakdown(&period),
    };
    success("summary", data)
}
