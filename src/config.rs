//! Documentor configuration
//!
//! A run is described by [`DocumentorConfig`]. It can be built in code, read
//! from a YAML file, or assembled by the CLI; CLI flags win over file values.
//!
//! ```yaml
//! project_path: .
//! output_path: docs/events
//! assembly_name: Contoso.Orders
//! sources:
//!   - src/Telemetry/OrdersEventSource.cs
//!   - src/**/*EventSource.cs
//! ```

use std::collections::HashSet;
use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};
use walkdir::{DirEntry, WalkDir};

use crate::error::{DocumentorError, Result};

/// Directories never scanned by [`discover_sources`]
const SKIPPED_DIRS: &[&str] = &["bin", "obj", ".git", ".vs"];

/// Inputs for one documentor run
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DocumentorConfig {
    /// Source references, relative to `project_path`, processed in order
    #[serde(default)]
    pub sources: Vec<String>,

    /// Root used to resolve source references
    #[serde(default)]
    pub project_path: PathBuf,

    /// Directory receiving the generated CSV files
    #[serde(default)]
    pub output_path: PathBuf,

    /// Optional prefix for every output file name
    #[serde(default)]
    pub assembly_name: Option<String>,
}

impl DocumentorConfig {
    pub fn new(project_path: impl Into<PathBuf>, output_path: impl Into<PathBuf>) -> Self {
        Self {
            project_path: project_path.into(),
            output_path: output_path.into(),
            ..Self::default()
        }
    }

    pub fn with_sources<I, S>(mut self, sources: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.sources.extend(sources.into_iter().map(Into::into));
        self
    }

    pub fn with_assembly_name(mut self, assembly_name: impl Into<String>) -> Self {
        self.assembly_name = Some(assembly_name.into());
        self
    }

    pub fn from_yaml(yaml: &str) -> Result<Self> {
        Ok(serde_yaml::from_str(yaml)?)
    }

    /// Load from a YAML file
    ///
    /// Relative `project_path`/`output_path` values are taken relative to the
    /// file's directory.
    pub fn load(path: &Path) -> Result<Self> {
        let yaml = fs::read_to_string(path).map_err(|source| DocumentorError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        let mut config = Self::from_yaml(&yaml)?;

        let base = config_dir(path);
        if config.project_path.is_relative() {
            config.project_path = base.join(&config.project_path);
        }
        if config.output_path.is_relative() && !config.output_path.as_os_str().is_empty() {
            config.output_path = base.join(&config.output_path);
        }

        debug!(path = %path.display(), sources = config.sources.len(), "Loaded config");
        Ok(config)
    }

    /// Both paths must be set; sources may be empty
    pub fn validate(&self) -> Result<()> {
        if self.project_path.as_os_str().is_empty() {
            return Err(DocumentorError::config("project_path is required"));
        }
        if self.output_path.as_os_str().is_empty() {
            return Err(DocumentorError::config("output_path is required"));
        }
        Ok(())
    }

    /// Assembly name when present and not blank
    pub fn effective_assembly_name(&self) -> Option<&str> {
        self.assembly_name
            .as_deref()
            .filter(|name| !name.trim().is_empty())
    }
}

/// Directory a config file's relative paths are resolved against
///
/// A bare file name has an empty parent, which means the working directory.
fn config_dir(path: &Path) -> &Path {
    match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    }
}

/// Expand glob patterns in `sources` relative to `project_path`
///
/// Plain references pass through untouched, so a missing file still reaches
/// the documentor and is reported there. Matches of one pattern are sorted.
/// A reference listed twice, directly or through a pattern, is kept once at
/// its first position.
pub fn expand_sources(project_path: &Path, sources: &[String]) -> Result<Vec<String>> {
    let mut expanded = Vec::with_capacity(sources.len());
    let mut seen = HashSet::new();

    for source in sources {
        if !is_pattern(source) {
            if seen.insert(source.clone()) {
                expanded.push(source.clone());
            }
            continue;
        }

        let pattern = project_path.join(source);
        let pattern = pattern.to_string_lossy();
        let paths = glob::glob(&pattern).map_err(|e| DocumentorError::InvalidPattern {
            pattern: source.clone(),
            details: e.to_string(),
        })?;

        let mut matches: Vec<String> = paths
            .filter_map(|entry| match entry {
                Ok(path) => Some(path),
                Err(e) => {
                    warn!(pattern = %source, error = %e, "Unreadable path while expanding pattern");
                    None
                }
            })
            .filter(|path| path.is_file())
            .map(|path| relative_reference(project_path, &path))
            .collect();
        matches.sort();

        if matches.is_empty() {
            info!(pattern = %source, "Source pattern matched no files");
        } else {
            debug!(pattern = %source, matches = matches.len(), "Expanded source pattern");
        }
        expanded.extend(matches.into_iter().filter(|m| seen.insert(m.clone())));
    }

    Ok(expanded)
}

/// Every `*.cs` file under `project_path`, sorted, skipping build output
pub fn discover_sources(project_path: &Path) -> Vec<String> {
    let mut found: Vec<String> = WalkDir::new(project_path)
        .into_iter()
        .filter_entry(|entry| entry.depth() == 0 || !is_skipped_dir(entry))
        .filter_map(|entry| entry.ok())
        .filter(|entry| entry.file_type().is_file())
        .filter(|entry| {
            entry
                .path()
                .extension()
                .is_some_and(|ext| ext.eq_ignore_ascii_case("cs"))
        })
        .map(|entry| relative_reference(project_path, entry.path()))
        .collect();
    found.sort();
    found
}

fn is_pattern(source: &str) -> bool {
    source.contains(['*', '?', '['])
}

fn is_skipped_dir(entry: &DirEntry) -> bool {
    entry.file_type().is_dir()
        && entry
            .file_name()
            .to_str()
            .is_some_and(|name| SKIPPED_DIRS.contains(&name))
}

fn relative_reference(project_path: &Path, path: &Path) -> String {
    path.strip_prefix(project_path)
        .unwrap_or(path)
        .to_string_lossy()
        .into_owned()
}
