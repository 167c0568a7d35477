//! Diagnostic sink for documentor progress
//!
//! Every message carries the fixed sender [`SENDER`]. Two sinks ship here:
//! - [`TracingSink`]: forwards to `tracing` at info level (the CLI default)
//! - [`DiagnosticLog`]: thread-safe, append-only record of what was emitted

use std::fmt;
use std::path::PathBuf;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use parking_lot::RwLock;
use serde::{Deserialize, Serialize};

/// Sender identifier attached to every diagnostic
pub const SENDER: &str = "EventSourceDocumentor";

/// One informational message emitted during a run
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Diagnostic {
    /// Source reference resolved to a path that does not exist
    SkippedMissing { path: PathBuf },
    /// Source file is about to be scanned
    Processing { path: PathBuf },
    /// Source file declares no EventSource class
    SkippedUnrecognized { source: String },
    /// Documentation is being generated for a class
    Generating { event_source: String },
    /// Output file written
    Generated { path: PathBuf },
    /// Reading, extracting or writing failed for one source
    Failed { source: String, error: String },
}

impl Diagnostic {
    /// Short snake_case tag, same as the serialized `type`
    pub fn kind(&self) -> &'static str {
        match self {
            Self::SkippedMissing { .. } => "skipped_missing",
            Self::Processing { .. } => "processing",
            Self::SkippedUnrecognized { .. } => "skipped_unrecognized",
            Self::Generating { .. } => "generating",
            Self::Generated { .. } => "generated",
            Self::Failed { .. } => "failed",
        }
    }

    pub fn is_skip(&self) -> bool {
        matches!(
            self,
            Self::SkippedMissing { .. } | Self::SkippedUnrecognized { .. }
        )
    }
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::SkippedMissing { path } => write!(
                f,
                "Skipping EventSource document generation, as there are no files found at: {}",
                path.display()
            ),
            Self::Processing { path } => write!(f, "Processing file: {}", path.display()),
            Self::SkippedUnrecognized { source } => {
                write!(f, "Skipping Non EventSource class at: {}", source)
            }
            Self::Generating { event_source } => write!(
                f,
                "Generating EventSource documentation for EventSource: {}",
                event_source
            ),
            Self::Generated { path } => write!(
                f,
                "EventSource documentation generated at: {}",
                path.display()
            ),
            Self::Failed { source, error } => {
                write!(f, "Failed to document EventSource at: {} ({})", source, error)
            }
        }
    }
}

/// Receiver of documentor diagnostics
pub trait DiagnosticSink {
    fn emit(&self, diagnostic: Diagnostic);
}

impl<S: DiagnosticSink + ?Sized> DiagnosticSink for &S {
    fn emit(&self, diagnostic: Diagnostic) {
        (**self).emit(diagnostic)
    }
}

/// Forwards diagnostics to the `tracing` subscriber
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingSink;

impl DiagnosticSink for TracingSink {
    fn emit(&self, diagnostic: Diagnostic) {
        tracing::info!(
            target: "event_source_documentor",
            sender = SENDER,
            kind = diagnostic.kind(),
            "{}",
            diagnostic
        );
    }
}

/// Recorded diagnostic with its sequence number
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Entry {
    /// Monotonic sequence ID (for ordering)
    pub id: u64,
    pub sender: String,
    pub diagnostic: Diagnostic,
}

/// Thread-safe, append-only diagnostic log
#[derive(Clone, Default)]
pub struct DiagnosticLog {
    entries: Arc<RwLock<Vec<Entry>>>,
    next_id: Arc<AtomicU64>,
}

impl DiagnosticLog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a diagnostic, returning its sequence ID
    pub fn record(&self, diagnostic: Diagnostic) -> u64 {
        let id = self.next_id.fetch_add(1, Ordering::SeqCst);
        self.entries.write().push(Entry {
            id,
            sender: SENDER.to_string(),
            diagnostic,
        });
        id
    }

    /// All entries (cloned)
    pub fn entries(&self) -> Vec<Entry> {
        self.entries.read().clone()
    }

    /// Diagnostics only, in emission order
    pub fn diagnostics(&self) -> Vec<Diagnostic> {
        self.entries
            .read()
            .iter()
            .map(|e| e.diagnostic.clone())
            .collect()
    }

    /// Rendered messages, in emission order
    pub fn messages(&self) -> Vec<String> {
        self.entries
            .read()
            .iter()
            .map(|e| e.diagnostic.to_string())
            .collect()
    }

    pub fn skips(&self) -> Vec<Diagnostic> {
        self.diagnostics()
            .into_iter()
            .filter(Diagnostic::is_skip)
            .collect()
    }

    pub fn len(&self) -> usize {
        self.entries.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl DiagnosticSink for DiagnosticLog {
    fn emit(&self, diagnostic: Diagnostic) {
        self.record(diagnostic);
    }
}

impl fmt::Debug for DiagnosticLog {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DiagnosticLog")
            .field("len", &self.len())
            .finish()
    }
}

/// Sends each diagnostic to two sinks
pub struct Tee<A, B>(pub A, pub B);

impl<A: DiagnosticSink, B: DiagnosticSink> DiagnosticSink for Tee<A, B> {
    fn emit(&self, diagnostic: Diagnostic) {
        self.0.emit(diagnostic.clone());
        self.1.emit(diagnostic);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn messages_match_build_log_wording() {
        let missing = Diagnostic::SkippedMissing {
            path: PathBuf::from("proj/B.cs"),
        };
        assert_eq!(
            missing.to_string(),
            "Skipping EventSource document generation, as there are no files found at: proj/B.cs"
        );

        let generating = Diagnostic::Generating {
            event_source: "Foo".into(),
        };
        assert_eq!(
            generating.to_string(),
            "Generating EventSource documentation for EventSource: Foo"
        );
    }

    #[test]
    fn serializes_with_type_tag() {
        let diagnostic = Diagnostic::SkippedUnrecognized {
            source: "src/Repo.cs".into(),
        };
        let value = serde_json::to_value(&diagnostic).unwrap();
        assert_eq!(value, json!({"type": "skipped_unrecognized", "source": "src/Repo.cs"}));
        assert_eq!(diagnostic.kind(), "skipped_unrecognized");
    }

    #[test]
    fn log_records_in_order_with_sender() {
        let log = DiagnosticLog::new();
        assert!(log.is_empty());

        let first = log.record(Diagnostic::Processing {
            path: PathBuf::from("A.cs"),
        });
        let second = log.record(Diagnostic::SkippedUnrecognized {
            source: "A.cs".into(),
        });

        assert_eq!((first, second), (0, 1));
        let entries = log.entries();
        assert_eq!(entries.len(), 2);
        assert!(entries.iter().all(|e| e.sender == SENDER));
        assert_eq!(log.skips().len(), 1);
    }

    #[test]
    fn clones_share_the_same_log() {
        let log = DiagnosticLog::new();
        let handle = log.clone();
        handle.emit(Diagnostic::Generated {
            path: PathBuf::from("out/Foo.csv"),
        });
        assert_eq!(log.len(), 1);
        assert_eq!(log.messages()[0], "EventSource documentation generated at: out/Foo.csv");
    }

    #[test]
    fn tee_reaches_both_sinks() {
        let left = DiagnosticLog::new();
        let right = DiagnosticLog::new();
        let tee = Tee(left.clone(), right.clone());
        tee.emit(Diagnostic::Processing {
            path: PathBuf::from("A.cs"),
        });
        assert_eq!(left.len(), 1);
        assert_eq!(right.len(), 1);
    }
}
