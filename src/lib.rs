//! EventSource Documentor - CSV documentation for C# EventSource classes
//!
//! Scans source files for classes deriving from `EventSource`, extracts every
//! `[Event]` declaration and writes one `[<assembly>.]<name>.csv` per class.

pub mod config;
pub mod diagnostics;
pub mod documentor;
pub mod error;
pub mod extractor;
pub mod record;
pub mod report;
pub mod writer;

pub use config::{discover_sources, expand_sources, DocumentorConfig};
pub use diagnostics::{Diagnostic, DiagnosticLog, DiagnosticSink, Tee, TracingSink};
pub use documentor::{document, output_file_name, Documentor};
pub use error::{DocumentorError, FixSuggestion};
pub use extractor::{CSharpExtractor, EventSourceClass, EventSourceExtractor};
pub use record::{sort_by_event_id, EventRecord};
pub use report::{ItemOutcome, RunReport};
pub use writer::{write_records, write_records_to};
