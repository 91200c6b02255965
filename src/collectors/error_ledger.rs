//! Run-scoped record of every recoverable failure.
//!
//! The ledger is rendered into `errors.txt`, the last entry of the archive.
//! It is owned by the collection run and handed to each step by `&mut`.

use log::{info, warn};

/// One failed step: what was invoked and what it reported
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LedgerEntry {
    pub command: String,
    pub args: Vec<String>,
    pub error: String,
}

impl LedgerEntry {
    fn render_into(&self, out: &mut String) {
        out.push_str(&self.command);
        out.push(' ');
        out.push_str(&self.args.join(" "));
        out.push('\n');
        out.push_str(&self.error);
        out.push_str("\n\n");
    }
}

/// Append-only list of failures for one collection run
#[derive(Debug, Default)]
pub struct ErrorLedger {
    entries: Vec<LedgerEntry>,
}

impl ErrorLedger {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a failure of `command args...`
    pub fn record(&mut self, error: impl Into<String>, command: &str, args: &[String]) {
        self.entries.push(LedgerEntry {
            command: command.to_string(),
            args: args.to_vec(),
            error: error.into(),
        });
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn entries(&self) -> &[LedgerEntry] {
        &self.entries
    }

    /// Text of `errors.txt`: one `command args\nerror\n\n` block per entry
    pub fn render(&self) -> String {
        let mut out = String::new();
        for entry in &self.entries {
            entry.render_into(&mut out);
        }
        out
    }

    /// Log an end-of-run summary of the recorded failures
    pub fn report(&self, errors_entry: &str) {
        if self.entries.is_empty() {
            info!("Collection finished without errors");
            return;
        }

        warn!("━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━");
        warn!("⚠️  {} collection step(s) failed", self.entries.len());
        for entry in &self.entries {
            let first_line = entry.error.lines().next().unwrap_or("");
            warn!("  • {} {}: {}", entry.command, entry.args.join(" "), first_line);
        }
        warn!("Full error output is in {}", errors_entry);
        warn!("Note: Collection continued past every failure listed above.");
        warn!("━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━");
    }
}
