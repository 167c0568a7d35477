//! # Documentor Tests
//!
//! End-to-end runs of the documentation step over real C# files:
//! - skip behaviour for missing and non-EventSource files
//! - output naming with and without an assembly name
//! - row ordering and idempotent output

use eventsource_documentor::{
    document, Diagnostic, DiagnosticLog, DocumentorConfig, EventRecord, ItemOutcome,
};
use pretty_assertions::assert_eq;
use std::fs;
use std::path::Path;
use tempfile::TempDir;

// ============================================================================
// TEST HELPERS
// ============================================================================

const FOO_SOURCE: &str = r#"
using System.Diagnostics.Tracing;

[EventSource(Name = "Foo")]
internal sealed class FooEventSource : EventSource
{
    public static readonly FooEventSource Log = new FooEventSource();

    [Event(2, Message = "Start")]
    public void Start() { WriteEvent(2); }

    [Event(1, Message = "Stop")]
    public void Stop() { WriteEvent(1); }
}
"#;

const PLAIN_SOURCE: &str = r#"
namespace Contoso
{
    public class OrderRepository
    {
        public void Save() { }
    }
}
"#;

struct Fixture {
    project: TempDir,
    output: TempDir,
}

impl Fixture {
    fn new() -> Self {
        Self {
            project: TempDir::new().unwrap(),
            output: TempDir::new().unwrap(),
        }
    }

    fn write(&self, rel: &str, content: &str) {
        let path = self.project.path().join(rel);
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(path, content).unwrap();
    }

    fn config(&self, sources: &[&str]) -> DocumentorConfig {
        DocumentorConfig::new(self.project.path(), self.output.path())
            .with_sources(sources.iter().copied())
    }

    fn out(&self) -> &Path {
        self.output.path()
    }

    fn output_files(&self) -> Vec<String> {
        let mut names: Vec<String> = fs::read_dir(self.out())
            .unwrap()
            .map(|e| e.unwrap().file_name().to_string_lossy().into_owned())
            .collect();
        names.sort();
        names
    }
}

fn read_records(path: &Path) -> Vec<EventRecord> {
    csv::Reader::from_path(path)
        .unwrap()
        .deserialize()
        .collect::<Result<_, _>>()
        .unwrap()
}

// ============================================================================
// SCENARIOS
// ============================================================================

#[test]
fn documents_class_and_skips_missing_file() {
    let fx = Fixture::new();
    fx.write("A.cs", FOO_SOURCE);
    let config = fx.config(&["A.cs", "B.cs"]).with_assembly_name("MyLib");

    let log = DiagnosticLog::new();
    let report = document(&config, &log).unwrap();

    assert!(report.is_success());
    assert_eq!(fx.output_files(), ["MyLib.Foo.csv"]);

    let records = read_records(&fx.out().join("MyLib.Foo.csv"));
    let rows: Vec<(i32, &str)> = records
        .iter()
        .map(|r| (r.event_id, r.message.as_str()))
        .collect();
    assert_eq!(rows, [(1, "Stop"), (2, "Start")]);

    let skips = log.skips();
    assert_eq!(
        skips,
        [Diagnostic::SkippedMissing {
            path: fx.project.path().join("B.cs")
        }]
    );
    assert!(matches!(report.outcomes[1], ItemOutcome::SkippedMissing { .. }));
}

#[test]
fn file_without_event_class_is_skipped() {
    let fx = Fixture::new();
    fx.write("Repo.cs", PLAIN_SOURCE);

    let log = DiagnosticLog::new();
    let report = document(&fx.config(&["Repo.cs"]), &log).unwrap();

    assert!(report.is_success());
    assert!(fx.output_files().is_empty());
    assert_eq!(
        log.messages(),
        [
            format!("Processing file: {}", fx.project.path().join("Repo.cs").display()),
            "Skipping Non EventSource class at: Repo.cs".to_string(),
        ]
    );
}

#[test]
fn name_without_assembly_prefix() {
    let fx = Fixture::new();
    fx.write("src/Foo.cs", FOO_SOURCE);

    let config = fx.config(&["src/Foo.cs"]).with_assembly_name("  ");
    document(&config, DiagnosticLog::new()).unwrap();

    assert_eq!(fx.output_files(), ["Foo.csv"]);
}

#[test]
fn full_diagnostic_sequence_for_generated_file() {
    let fx = Fixture::new();
    fx.write("A.cs", FOO_SOURCE);

    let log = DiagnosticLog::new();
    document(&fx.config(&["A.cs"]), &log).unwrap();

    let kinds: Vec<&str> = log.diagnostics().iter().map(Diagnostic::kind).collect();
    assert_eq!(kinds, ["processing", "generating", "generated"]);
    assert_eq!(
        log.messages()[2],
        format!(
            "EventSource documentation generated at: {}",
            fx.out().join("Foo.csv").display()
        )
    );
}

#[test]
fn rerun_produces_identical_output() {
    let fx = Fixture::new();
    fx.write("A.cs", FOO_SOURCE);
    let config = fx.config(&["A.cs"]);

    document(&config, DiagnosticLog::new()).unwrap();
    let first = fs::read(fx.out().join("Foo.csv")).unwrap();
    document(&config, DiagnosticLog::new()).unwrap();
    let second = fs::read(fx.out().join("Foo.csv")).unwrap();

    assert_eq!(first, second);
}

#[test]
fn rows_are_non_decreasing_with_duplicate_ids() {
    let fx = Fixture::new();
    fx.write(
        "Dup.cs",
        r#"
        class DupSource : EventSource
        {
            [Event(5)] public void Late() { }
            [Event(3)] public void EarlyA() { }
            [Event(9)] public void Last() { }
            [Event(3)] public void EarlyB() { }
        }
        "#,
    );

    document(&fx.config(&["Dup.cs"]), DiagnosticLog::new()).unwrap();

    let records = read_records(&fx.out().join("DupSource.csv"));
    let names: Vec<&str> = records.iter().map(|r| r.event_name.as_str()).collect();
    assert_eq!(names, ["EarlyA", "EarlyB", "Late", "Last"]);
    assert!(records.windows(2).all(|w| w[0].event_id <= w[1].event_id));
}

#[test]
fn extraction_failure_does_not_stop_the_batch() {
    let fx = Fixture::new();
    fx.write(
        "Broken.cs",
        "class Broken : EventSource { [Event(Unknown.Id)] public void X() { } }",
    );
    fx.write("A.cs", FOO_SOURCE);

    let log = DiagnosticLog::new();
    let report = document(&fx.config(&["Broken.cs", "A.cs"]), &log).unwrap();

    assert!(!report.is_success());
    assert_eq!(report.failed_count(), 1);
    assert_eq!(report.generated_count(), 1);
    assert_eq!(fx.output_files(), ["Foo.csv"]);
    assert!(log
        .diagnostics()
        .iter()
        .any(|d| matches!(d, Diagnostic::Failed { source, .. } if source == "Broken.cs")));
}

#[test]
fn sources_are_processed_in_order() {
    let fx = Fixture::new();
    fx.write("A.cs", FOO_SOURCE);
    fx.write("Repo.cs", PLAIN_SOURCE);

    let report = document(
        &fx.config(&["Repo.cs", "Missing.cs", "A.cs"]),
        DiagnosticLog::new(),
    )
    .unwrap();

    let sources: Vec<&str> = report.outcomes.iter().map(ItemOutcome::source).collect();
    assert_eq!(sources, ["Repo.cs", "Missing.cs", "A.cs"]);
    assert_eq!(report.skipped_count(), 2);
}
