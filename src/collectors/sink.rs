use anyhow::Result;
use log::{error, info};

use crate::collectors::error_ledger::ErrorLedger;
use crate::utils::archive::ArchiveWriter;

/// Destination of one collection run: the archive plus its error ledger.
///
/// Failures go through [`DumpSink::fail`], which records the ledger entry and
/// archives the error text at the artifact's path in one call.
pub struct DumpSink {
    archive: ArchiveWriter,
    ledger: ErrorLedger,
}

impl DumpSink {
    pub fn new(archive: ArchiveWriter) -> Self {
        Self {
            archive,
            ledger: ErrorLedger::new(),
        }
    }

    /// Archive collected content. A write failure is recorded, not raised.
    pub fn store(&mut self, path: &str, content: &[u8]) {
        if let Err(e) = self.archive.append(path, content) {
            let text = format!("{:#}", e);
            error!("Error: create archive entry {}: {}", path, text);
            self.ledger.record(text, "archive", &[path.to_string()]);
        }
    }

    /// Record a failed step; archive its error text at `path` when the step
    /// was producing an artifact.
    pub fn fail(&mut self, error: &str, command: &str, args: &[String], path: Option<&str>) {
        self.ledger.record(error, command, args);
        if let Some(path) = path {
            self.store(path, error.as_bytes());
        }
    }

    /// Record a failure that belongs in the ledger only
    pub fn ledger_mut(&mut self) -> &mut ErrorLedger {
        &mut self.ledger
    }

    pub fn ledger(&self) -> &ErrorLedger {
        &self.ledger
    }

    /// Write `errors.txt` and close every archive layer
    pub fn finalize(self, errors_path: &str) -> Result<()> {
        let entries = self.archive.entry_count();
        self.ledger.report(errors_path);

        let rendered = self.ledger.render();
        self.archive.finalize(errors_path, rendered.as_bytes())?;

        info!("Archive closed with {} entries plus {}", entries, errors_path);
        Ok(())
    }
}
