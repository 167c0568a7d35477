//! eventdoc CLI - EventSource documentation generator

use std::io::{self, IsTerminal};
use std::path::{Path, PathBuf};

use clap::{Parser, Subcommand, ValueEnum};
use colored::Colorize;
use serde_json::json;

use eventsource_documentor::{
    discover_sources, document, expand_sources, sort_by_event_id, write_records_to,
    CSharpExtractor, DiagnosticLog, DocumentorConfig, DocumentorError, EventSourceExtractor,
    FixSuggestion, ItemOutcome, RunReport, Tee, TracingSink,
};

#[derive(Parser)]
#[command(name = "eventdoc")]
#[command(about = "Generate CSV documentation for EventSource classes")]
#[command(version)]
struct Cli {
    /// Enable debug logging
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Write one CSV file per EventSource class found in the sources
    Generate {
        /// Source files or glob patterns, relative to the project path
        sources: Vec<String>,

        /// Root used to resolve source references
        #[arg(short, long)]
        project: Option<PathBuf>,

        /// Directory for generated CSV files
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Prefix for output file names (<assembly>.<name>.csv)
        #[arg(short, long)]
        assembly_name: Option<String>,

        /// YAML config file (flags override its values)
        #[arg(short, long)]
        config: Option<PathBuf>,

        /// Also document every .cs file under the project path
        #[arg(long)]
        scan: bool,

        /// Print the run report as JSON
        #[arg(long)]
        json: bool,
    },

    /// Print the events declared in one file (no files written)
    Inspect {
        /// C# source file
        file: PathBuf,

        /// Output format
        #[arg(short, long, value_enum, default_value_t = OutputFormat::Text)]
        format: OutputFormat,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, ValueEnum)]
enum OutputFormat {
    Text,
    Json,
    Csv,
}

fn main() {
    let cli = Cli::parse();

    let level = if cli.verbose {
        tracing::Level::DEBUG
    } else {
        tracing::Level::INFO
    };
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env().add_directive(level.into()),
        )
        .with_writer(io::stderr)
        .with_ansi(io::stderr().is_terminal())
        .with_target(false)
        .init();

    let result = match cli.command {
        Commands::Generate {
            sources,
            project,
            output,
            assembly_name,
            config,
            scan,
            json,
        } => {
            let overrides = Overrides {
                sources,
                project,
                output,
                assembly_name,
            };
            generate(config.as_deref(), overrides, scan, json)
        }
        Commands::Inspect { file, format } => inspect(&file, format),
    };

    match result {
        Ok(true) => {}
        Ok(false) => std::process::exit(1),
        Err(e) => {
            eprintln!("{} {}", "Error:".red().bold(), e);
            if let Some(suggestion) = e.fix_suggestion() {
                eprintln!("  {} {}", "Fix:".yellow(), suggestion);
            }
            std::process::exit(1);
        }
    }
}

/// Values given on the command line
struct Overrides {
    sources: Vec<String>,
    project: Option<PathBuf>,
    output: Option<PathBuf>,
    assembly_name: Option<String>,
}

fn build_config(
    config_file: Option<&Path>,
    overrides: Overrides,
    scan: bool,
) -> Result<DocumentorConfig, DocumentorError> {
    let mut config = match config_file {
        Some(path) => DocumentorConfig::load(path)?,
        None => DocumentorConfig::default(),
    };

    if let Some(project) = overrides.project {
        config.project_path = project;
    }
    if let Some(output) = overrides.output {
        config.output_path = output;
    }
    if let Some(assembly_name) = overrides.assembly_name {
        config.assembly_name = Some(assembly_name);
    }
    config.sources.extend(overrides.sources);
    config.validate()?;

    if scan {
        let discovered = discover_sources(&config.project_path);
        config.sources.extend(discovered);
    }
    config.sources = expand_sources(&config.project_path, &config.sources)?;

    Ok(config)
}

fn generate(
    config_file: Option<&Path>,
    overrides: Overrides,
    scan: bool,
    json: bool,
) -> Result<bool, DocumentorError> {
    let config = build_config(config_file, overrides, scan)?;

    let log = DiagnosticLog::new();
    let report = document(&config, Tee(TracingSink, &log))?;

    if json {
        let value = json!({
            "success": report.is_success(),
            "outcomes": &report.outcomes,
            "diagnostics": log.entries(),
        });
        println!("{}", serde_json::to_string_pretty(&value)?);
    } else {
        print_summary(&report);
    }

    Ok(report.is_success())
}

fn print_summary(report: &RunReport) {
    for outcome in &report.outcomes {
        match outcome {
            ItemOutcome::Generated {
                event_source,
                output_path,
                record_count,
                ..
            } => println!(
                "{} {} → {} ({} events)",
                "✓".green(),
                event_source.bold(),
                output_path.display(),
                record_count
            ),
            ItemOutcome::SkippedMissing { source, .. } => {
                println!("{} {} (not found)", "-".dimmed(), source)
            }
            ItemOutcome::SkippedUnrecognized { source } => {
                println!("{} {} (no EventSource class)", "-".dimmed(), source)
            }
            ItemOutcome::Failed { source, error } => {
                println!("{} {}: {}", "✗".red(), source, error)
            }
        }
    }

    println!(
        "{} generated, {} skipped, {} failed",
        report.generated_count(),
        report.skipped_count(),
        report.failed_count()
    );
}

fn inspect(file: &Path, format: OutputFormat) -> Result<bool, DocumentorError> {
    let extractor = CSharpExtractor::new();
    let Some(class) = extractor.find_event_source_class(file)? else {
        eprintln!(
            "{} No EventSource class in '{}'",
            "✗".red(),
            file.display()
        );
        return Ok(false);
    };

    let name = extractor.event_source_name(&class);
    let mut records = extractor.event_records(&class)?;
    sort_by_event_id(&mut records);

    match format {
        OutputFormat::Text => {
            println!(
                "{} {} ({}, {} events)",
                "✓".green(),
                name.bold(),
                class.identifier,
                records.len()
            );
            for record in &records {
                println!(
                    "  {:>5}  {:<28} {:<14} {}",
                    record.event_id, record.event_name, record.level, record.message
                );
            }
        }
        OutputFormat::Json => {
            let value = json!({
                "event_source": name,
                "class": class.identifier,
                "events": records,
            });
            println!("{}", serde_json::to_string_pretty(&value)?);
        }
        OutputFormat::Csv => write_records_to(io::stdout().lock(), &records)?,
    }

    Ok(true)
}
