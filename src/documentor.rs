//! The documentation step
//!
//! One linear pass over the configured sources. Every source ends in exactly
//! one [`ItemOutcome`]; missing files and files without an EventSource class
//! are skips, and errors while reading, extracting or writing one source are
//! recorded as `Failed` without stopping the batch.

use std::fs;
use std::path::PathBuf;

use tracing::debug;

use crate::config::DocumentorConfig;
use crate::diagnostics::{Diagnostic, DiagnosticSink};
use crate::error::{DocumentorError, Result};
use crate::extractor::EventSourceExtractor;
use crate::record::sort_by_event_id;
use crate::report::{ItemOutcome, RunReport};
use crate::writer::write_records;

/// `[<assembly>.]<class>.csv`; blank assembly names are ignored
pub fn output_file_name(event_source: &str, assembly_name: Option<&str>) -> String {
    match assembly_name.filter(|name| !name.trim().is_empty()) {
        Some(assembly) => format!("{}.{}.csv", assembly, event_source),
        None => format!("{}.csv", event_source),
    }
}

/// Runs the documentation step over a config
pub struct Documentor<E, S> {
    extractor: E,
    sink: S,
}

impl<E: EventSourceExtractor, S: DiagnosticSink> Documentor<E, S> {
    pub fn new(extractor: E, sink: S) -> Self {
        Self { extractor, sink }
    }

    /// Document every source in `config`
    ///
    /// Fails only when the config is invalid or the output directory cannot
    /// be created. Per-source problems are in the returned report.
    pub fn run(&self, config: &DocumentorConfig) -> Result<RunReport> {
        config.validate()?;
        fs::create_dir_all(&config.output_path).map_err(|source| DocumentorError::Write {
            path: config.output_path.clone(),
            source,
        })?;

        let mut report = RunReport::new();
        for source in &config.sources {
            let outcome = match self.document_source(config, source) {
                Ok(outcome) => outcome,
                Err(e) => {
                    debug!(source = %source, error = ?e, "EventSource documentation failed");
                    self.sink.emit(Diagnostic::Failed {
                        source: source.clone(),
                        error: e.to_string(),
                    });
                    ItemOutcome::Failed {
                        source: source.clone(),
                        error: e.to_string(),
                    }
                }
            };
            report.push(outcome);
        }

        debug!(
            generated = report.generated_count(),
            skipped = report.skipped_count(),
            failed = report.failed_count(),
            "Documentor run finished"
        );
        Ok(report)
    }

    fn document_source(&self, config: &DocumentorConfig, source: &str) -> Result<ItemOutcome> {
        let file_path = config.project_path.join(source);
        if !file_path.is_file() {
            self.sink.emit(Diagnostic::SkippedMissing {
                path: file_path.clone(),
            });
            return Ok(ItemOutcome::SkippedMissing {
                source: source.to_string(),
                path: file_path,
            });
        }

        self.sink.emit(Diagnostic::Processing {
            path: file_path.clone(),
        });

        let Some(class) = self.extractor.find_event_source_class(&file_path)? else {
            self.sink.emit(Diagnostic::SkippedUnrecognized {
                source: source.to_string(),
            });
            return Ok(ItemOutcome::SkippedUnrecognized {
                source: source.to_string(),
            });
        };

        let event_source = self.extractor.event_source_name(&class);
        self.sink.emit(Diagnostic::Generating {
            event_source: event_source.clone(),
        });

        let mut records = self.extractor.event_records(&class)?;
        sort_by_event_id(&mut records);

        let output_path = output_path(config, &event_source);
        write_records(&output_path, &records)?;

        self.sink.emit(Diagnostic::Generated {
            path: output_path.clone(),
        });
        Ok(ItemOutcome::Generated {
            source: source.to_string(),
            event_source,
            output_path,
            record_count: records.len(),
        })
    }
}

fn output_path(config: &DocumentorConfig, event_source: &str) -> PathBuf {
    config.output_path.join(output_file_name(
        event_source,
        config.effective_assembly_name(),
    ))
}

/// Run with the default C# extractor
pub fn document<S: DiagnosticSink>(config: &DocumentorConfig, sink: S) -> Result<RunReport> {
    Documentor::new(crate::extractor::CSharpExtractor::new(), sink).run(config)
}
