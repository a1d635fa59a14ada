//! CSV import: reconcile untrusted rows against the vault's categories.
//!
//! Only file-level problems (empty file, missing required columns, unreadable
//! file) are errors. Everything that goes wrong with a single row becomes a
//! warning and the rest of the batch is still imported.

mod reconcile;

pub use reconcile::{reconcile, ImportOutcome, ImportResult};

use std::path::Path;

use crate::csv;
use crate::entity::Category;

/// Tokenize CSV text and reconcile it.
pub fn import_prompts_from_csv(text: &str, existing: &[Category]) -> ImportOutcome {
    let rows = csv::parse(text);
    reconcile(&rows, existing)
}

/// Read a CSV file and reconcile its contents.
///
/// A read failure (missing file, invalid UTF-8) is reported as a failed
/// import rather than returned as an error.
pub async fn import_csv_file(path: &Path, existing: &[Category]) -> ImportOutcome {
    match tokio::fs::read_to_string(path).await {
        Ok(text) => import_prompts_from_csv(&text, existing),
        Err(e) => {
            tracing::warn!(path = %path.display(), error = %e, "failed to read import file");
            ImportOutcome::failed(existing, format!("Error reading file: {}", e))
        }
    }
}
