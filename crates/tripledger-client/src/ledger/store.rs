use std::collections::HashSet;

use chrono::NaiveDate;
use serde::Serialize;
use tracing::{info, warn};

use crate::ClientResult;
use crate::ledger::period::{
    CategoryTotal, FilterPeriod, PeriodTotals, aggregate_expenses_by_category, aggregate_totals,
    available_years, filter_by_period, sort_for_display,
};
use crate::ledger::record::{ExpenseInput, RecordId, RevenueInput, TripRecord};
use crate::storage::RecordStorage;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum DeleteOutcome {
    Deleted,
    Declined,
    NotFound,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct MergeCounts {
    pub read: usize,
    pub inserted: usize,
    pub skipped_existing: usize,
}

/// Owns the record collection and the selected period.
///
/// Every mutation validates first, applies to memory, then rewrites the whole
/// collection through the storage backend. A failed write rolls the memory
/// change back, so readers never observe an unsaved record.
#[derive(Debug)]
pub struct RecordStore<S> {
    storage: S,
    records: Vec<TripRecord>,
    period: FilterPeriod,
    load_failed: bool,
}

impl<S> RecordStore<S>
where
    S: RecordStorage,
{
    /// Loads the saved collection. Unreadable storage starts an empty ledger
    /// instead of blocking startup.
    pub fn open(storage: S, today: NaiveDate) -> Self {
        let (records, load_failed) = match storage.load() {
            Ok(Some(records)) => (records, false),
            Ok(None) => (Vec::new(), false),
            Err(error) => {
                warn!(code = %error.code, %error, "ledger storage unreadable, starting empty");
                (Vec::new(), true)
            }
        };

        Self {
            storage,
            records,
            period: FilterPeriod::containing(today),
            load_failed,
        }
    }

    pub fn storage(&self) -> &S {
        &self.storage
    }

    pub fn records(&self) -> &[TripRecord] {
        &self.records
    }

    pub fn current_period(&self) -> FilterPeriod {
        self.period
    }

    pub fn set_period(&mut self, period: FilterPeriod) {
        self.period = period;
    }

    /// Records of `period`, newest first.
    pub fn filtered_records(&self, period: &FilterPeriod) -> Vec<&TripRecord> {
        let mut view = filter_by_period(&self.records, period);
        sort_for_display(&mut view);
        view
    }

    pub fn totals(&self, period: &FilterPeriod) -> PeriodTotals {
        aggregate_totals(filter_by_period(&self.records, period))
    }

    pub fn category_breakdown(&self, period: &FilterPeriod) -> Vec<CategoryTotal> {
        aggregate_expenses_by_category(filter_by_period(&self.records, period))
    }

    pub fn available_years(&self, today: NaiveDate) -> Vec<i32> {
        available_years(&self.records, today)
    }

    pub fn find(&self, id: &RecordId) -> Option<&TripRecord> {
        self.records.iter().find(|record| record.id() == id)
    }

    pub fn submit_revenue(&mut self, input: RevenueInput) -> ClientResult<TripRecord> {
        let record = input.into_record()?;
        self.append(record)
    }

    pub fn submit_expense(&mut self, input: ExpenseInput) -> ClientResult<TripRecord> {
        let record = input.into_record()?;
        self.append(record)
    }

    /// Removes the record with `id` once `confirm` agrees.
    pub fn delete_record<F>(&mut self, id: &RecordId, confirm: F) -> ClientResult<DeleteOutcome>
    where
        F: FnOnce(&str) -> bool,
    {
        self.reload_if_degraded()?;

        let Some(index) = self.records.iter().position(|record| record.id() == id) else {
            return Ok(DeleteOutcome::NotFound);
        };

        if !confirm("Are you sure you want to delete this record?") {
            return Ok(DeleteOutcome::Declined);
        }

        let removed = self.records.remove(index);
        if let Err(error) = self.storage.persist(&self.records) {
            self.records.insert(index, removed);
            return Err(error);
        }

        info!(record_id = %id, kind = removed.kind().as_str(), "deleted record");
        Ok(DeleteOutcome::Deleted)
    }

    /// Appends records not already present by id, in one write.
    pub fn merge_records(&mut self, incoming: Vec<TripRecord>) -> ClientResult<MergeCounts> {
        self.reload_if_degraded()?;

        let mut known = self
            .records
            .iter()
            .map(|record| record.id().clone())
            .collect::<HashSet<RecordId>>();
        let previous_len = self.records.len();
        let mut counts = MergeCounts {
            read: incoming.len(),
            ..MergeCounts::default()
        };

        for record in incoming {
            if known.insert(record.id().clone()) {
                self.records.push(record);
                counts.inserted += 1;
            } else {
                counts.skipped_existing += 1;
            }
        }

        if counts.inserted == 0 {
            return Ok(counts);
        }

        if let Err(error) = self.storage.persist(&self.records) {
            self.records.truncate(previous_len);
            return Err(error);
        }

        info!(inserted = counts.inserted, skipped = counts.skipped_existing, "merged records");
        Ok(counts)
    }

    fn append(&mut self, record: TripRecord) -> ClientResult<TripRecord> {
        self.reload_if_degraded()?;

        self.records.push(record.clone());
        if let Err(error) = self.storage.persist(&self.records) {
            self.records.pop();
            return Err(error);
        }

        if let Some(date) = record.date() {
            self.period = FilterPeriod::containing(date);
        }
        info!(record_id = %record.id(), kind = record.kind().as_str(), "appended record");
        Ok(record)
    }

    /// A write after a failed load would replace data this process never saw,
    /// so the load is retried first. Corrupt payloads are already backed up by
    /// the storage layer and may be replaced.
    fn reload_if_degraded(&mut self) -> ClientResult<()> {
        if !self.load_failed {
            return Ok(());
        }

        match self.storage.load() {
            Ok(saved) => {
                self.records = saved.unwrap_or_default();
                self.load_failed = false;
                Ok(())
            }
            Err(error) if error.code == "ledger_corrupt" => {
                self.load_failed = false;
                Ok(())
            }
            Err(error) => Err(error),
        }
    }
}
