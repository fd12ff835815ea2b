use std::fs;
use std::path::{Path, PathBuf};

use crate::commands::common::LedgerSession;
use crate::contracts::envelope::{SuccessEnvelope, success};
use crate::contracts::types::ImportData;
use crate::ledger::record::{DecodedRecords, decode_record_array};
use crate::{ClientError, ClientResult};

#[derive(Debug, Default)]
pub struct ImportRunOptions<'a> {
    pub path: PathBuf,
    pub home_override: Option<&'a Path>,
}

pub fn run(path: &Path) -> ClientResult<SuccessEnvelope> {
    run_with_options(ImportRunOptions {
        path: path.to_path_buf(),
        home_override: None,
    })
}

/// Merges a JSON array exported from the browser ledger. Records whose id is
/// already present are skipped, so re-running the same file is harmless.
/// Entries that do not decode as records are counted and left out.
#[doc(hidden)]
pub fn run_with_options(options: ImportRunOptions<'_>) -> ClientResult<SuccessEnvelope> {
    let incoming = read_legacy_file(&options.path)?;
    let skipped_malformed = incoming.skipped;
    let mut session = LedgerSession::open(options.home_override, None)?;
    let summary = session.store.merge_records(incoming.records)?;

    let mut message = if summary.inserted == 0 {
        "Nothing new to import.".to_string()
    } else {
        format!(
            "Imported {} record(s); {} already present.",
            summary.inserted, summary.skipped_existing
        )
    };
    if skipped_malformed > 0 {
        message.push_str(&format!(" Skipped {skipped_malformed} malformed record(s)."));
    }

    let data = ImportData {
        path: options.path.display().to_string(),
        summary,
        skipped_malformed,
        message,
    };
    success("import", data)
}

fn read_legacy_file(path: &Path) -> ClientResult<DecodedRecords> {
    let raw = fs::read_to_string(path)
        .map_err(|error| ClientError::legacy_import_unreadable(path, &error.to_string()))?;
    decode_record_array(&raw)
        .map_err(|error| ClientError::legacy_import_unreadable(path, &error.to_string()))
}
