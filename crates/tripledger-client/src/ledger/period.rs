use std::collections::BTreeSet;

use chrono::{Datelike, NaiveDate};
use serde::Serialize;
use tracing::debug;

use crate::ledger::date::month_name;
use crate::ledger::record::{ExpenseCategory, TripRecord};
use crate::{ClientError, ClientResult};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct FilterPeriod {
    pub month: u32,
    pub year: i32,
}

impl FilterPeriod {
    pub fn new(month: u32, year: i32) -> ClientResult<Self> {
        if !(1..=12).contains(&month) {
            return Err(ClientError::validation_failed(
                "month",
                "`month` must be between 1 and 12.",
            ));
        }
        Ok(Self { month, year })
    }

    pub fn containing(date: NaiveDate) -> Self {
        Self {
            month: date.month(),
            year: date.year(),
        }
    }

    /// Uses `today` for whichever half of the period is not given.
    pub fn resolve(month: Option<u32>, year: Option<i32>, today: NaiveDate) -> ClientResult<Self> {
        Self::new(
            month.unwrap_or_else(|| today.month()),
            year.unwrap_or_else(|| today.year()),
        )
    }

    pub fn contains(&self, date: NaiveDate) -> bool {
        date.month() == self.month && date.year() == self.year
    }

    pub fn label(&self) -> String {
        let name = month_name(self.month).unwrap_or("?");
        format!("{name} {}", self.year)
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct PeriodTotals {
    pub revenue: f64,
    pub expense: f64,
    pub balance: f64,
    pub total_distance_km: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CategoryTotal {
    pub category: String,
    pub amount: f64,
    pub color: String,
}

/// Records dated inside `period`, in their original order.
pub fn filter_by_period<'a>(records: &'a [TripRecord], period: &FilterPeriod) -> Vec<&'a TripRecord> {
    records
        .iter()
        .filter(|record| match record.date() {
            Some(date) => period.contains(date),
            None => {
                debug!(
                    record_id = %record.id(),
                    date = record.raw_date(),
                    "skipping record with malformed date"
                );
                false
            }
        })
        .collect()
}

pub fn aggregate_totals<'a, I>(records: I) -> PeriodTotals
where
    I: IntoIterator<Item = &'a TripRecord>,
{
    let mut totals = PeriodTotals::default();
    for record in records {
        match record {
            TripRecord::Revenue(revenue) => {
                totals.revenue += revenue.amount;
                totals.total_distance_km += revenue.distance_km.unwrap_or(0.0);
            }
            TripRecord::Expense(expense) => {
                totals.expense += expense.amount;
            }
        }
    }
    totals.balance = totals.revenue - totals.expense;
    totals
}

/// Expense sums per category, in first-seen order. Aliases from older data
/// count toward their canonical label.
pub fn aggregate_expenses_by_category<'a, I>(records: I) -> Vec<CategoryTotal>
where
    I: IntoIterator<Item = &'a TripRecord>,
{
    let mut totals: Vec<(ExpenseCategory, f64)> = Vec::new();
    for record in records {
        let TripRecord::Expense(expense) = record else {
            continue;
        };
        let label = ExpenseCategory::normalized(expense.category.as_str());
        match totals.iter_mut().find(|(category, _)| *category == label) {
            Some((_, amount)) => *amount += expense.amount,
            None => totals.push((label, expense.amount)),
        }
    }

    totals
        .into_iter()
        .map(|(category, amount)| CategoryTotal {
            color: category.color().to_string(),
            category: category.as_str().to_string(),
            amount,
        })
        .collect()
}

/// Most recent first; records sharing a date keep their relative order.
pub fn sort_for_display(records: &mut [&TripRecord]) {
    records.sort_by(|left, right| right.date().cmp(&left.date()));
}

/// Years offered by the period picker: every year with records plus the
/// current one, newest first.
pub fn available_years(records: &[TripRecord], today: NaiveDate) -> Vec<i32> {
    let mut years = records
        .iter()
        .filter_map(TripRecord::date)
        .map(|date| date.year())
        .collect::<BTreeSet<i32>>();
    years.insert(today.year());
    years.into_iter().rev().collect()
}
