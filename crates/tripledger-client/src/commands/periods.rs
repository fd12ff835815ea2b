use std::path::Path;

use chrono::NaiveDate;

use crate::ClientResult;
use crate::commands::common::LedgerSession;
use crate::contracts::envelope::{SuccessEnvelope, success};
use crate::contracts::types::PeriodsData;

#[derive(Debug, Default)]
pub struct PeriodsOptions<'a> {
    pub home_override: Option<&'a Path>,
    pub today: Option<NaiveDate>,
}

/// Month names plus every year that has records, newest first.
pub fn run() -> ClientResult<SuccessEnvelope> {
    run_with_options(PeriodsOptions::default())
}

#[doc(hidden)]
pub fn run_with_options(options: PeriodsOptions<'_>) -> ClientResult<SuccessEnvelope> {
    let session = LedgerSession::open(options.home_override, options.today)?;
    let years = session.store.available_years(session.today);
    success(
        "periods",
        PeriodsData::new(session.store.current_period(), years),
    )
}
