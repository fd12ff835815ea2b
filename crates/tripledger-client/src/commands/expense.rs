use std::path::Path;

use chrono::NaiveDate;

use crate::ClientResult;
use crate::commands::common::LedgerSession;
use crate::contracts::envelope::{SuccessEnvelope, success};
use crate::contracts::types::{DistanceSource, RecordSubmitData, RecordView};
use crate::ledger::record::ExpenseInput;

#[derive(Debug, Default)]
pub struct ExpenseAddOptions<'a> {
    pub category: String,
    pub description: String,
    pub amount: f64,
    pub date: Option<String>,
    pub home_override: Option<&'a Path>,
    pub today: Option<NaiveDate>,
}

pub fn add(
    category: &str,
    description: Option<&str>,
    amount: f64,
    date: Option<&str>,
) -> ClientResult<SuccessEnvelope> {
    add_with_options(ExpenseAddOptions {
        category: category.to_string(),
        description: description.unwrap_or_default().to_string(),
        amount,
        date: date.map(std::string::ToString::to_string),
        home_override: None,
        today: None,
    })
}

#[doc(hidden)]
pub fn add_with_options(options: ExpenseAddOptions<'_>) -> ClientResult<SuccessEnvelope> {
    let mut session = LedgerSession::open(options.home_override, options.today)?;

    let input = ExpenseInput {
        category: options.category,
        description: options.description,
        date: options.date.unwrap_or_else(|| session.today_iso()),
        amount: options.amount,
    };
    let record = session.store.submit_expense(input)?;

    let period = session.store.current_period();
    let data = RecordSubmitData {
        record: RecordView::from(&record),
        distance_source: DistanceSource::None,
        capture_cleared: false,
        period: period.into(),
        totals: session.store.totals(&period),
    };

    success("expense add", data)
}
