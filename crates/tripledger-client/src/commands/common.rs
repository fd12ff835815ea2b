use std::path::Path;

use chrono::{Local, NaiveDate};

use crate::ClientResult;
use crate::ledger::capture::{CaptureSequencer, CaptureState};
use crate::ledger::date::format_iso_date;
use crate::ledger::store::RecordStore;
use crate::setup::{SetupContext, ensure_initialized_with_home_override};
use crate::storage::SqliteKvStorage;

/// Everything a command needs: the initialized ledger, its key-value
/// storage, and the record store loaded from it.
pub(crate) struct LedgerSession {
    pub(crate) setup: SetupContext,
    pub(crate) kv: SqliteKvStorage,
    pub(crate) store: RecordStore<SqliteKvStorage>,
    pub(crate) today: NaiveDate,
}

impl LedgerSession {
    pub(crate) fn open(home_override: Option<&Path>, today: Option<NaiveDate>) -> ClientResult<Self> {
        let setup = ensure_initialized_with_home_override(home_override)?;
        let kv = SqliteKvStorage::new(&setup.db_path);
        let today = today.unwrap_or_else(local_today);
        let store = RecordStore::open(kv.clone(), today);
        Ok(Self {
            setup,
            kv,
            store,
            today,
        })
    }

    pub(crate) fn today_iso(&self) -> String {
        format_iso_date(&self.today)
    }

    pub(crate) fn capture(&self) -> ClientResult<CaptureSequencer> {
        let saved = self.kv.load_capture_state()?.unwrap_or(CaptureState::Idle);
        Ok(CaptureSequencer::restore(self.setup.capture_timeout, saved))
    }

    pub(crate) fn save_capture(&self, capture: &CaptureSequencer) -> ClientResult<()> {
        self.kv.persist_capture_state(&capture.snapshot())
    }
}

pub(crate) fn local_today() -> NaiveDate {
    Local::now().date_naive()
}
