//! Error types with fix suggestions

use std::path::PathBuf;

use thiserror::Error;

/// Trait for errors that provide fix suggestions
pub trait FixSuggestion {
    fn fix_suggestion(&self) -> Option<&str>;
}

#[derive(Error, Debug)]
pub enum DocumentorError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to read '{}': {source}", path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to write '{}': {source}", path.display())]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    // ─────────────────────────────────────────────────────────────
    // Configuration
    // ─────────────────────────────────────────────────────────────

    #[error("Config parse error: {0}")]
    ConfigParse(#[from] serde_yaml::Error),

    #[error("Invalid configuration: {reason}")]
    Config { reason: String },

    #[error("Invalid source pattern '{pattern}': {details}")]
    InvalidPattern { pattern: String, details: String },

    // ─────────────────────────────────────────────────────────────
    // Extraction
    // ─────────────────────────────────────────────────────────────

    #[error("Cannot extract events from '{}': {details}", path.display())]
    Extraction { path: PathBuf, details: String },
}

impl DocumentorError {
    pub fn config(reason: impl Into<String>) -> Self {
        Self::Config {
            reason: reason.into(),
        }
    }

    pub fn extraction(path: impl Into<PathBuf>, details: impl Into<String>) -> Self {
        Self::Extraction {
            path: path.into(),
            details: details.into(),
        }
    }
}

impl FixSuggestion for DocumentorError {
    fn fix_suggestion(&self) -> Option<&str> {
        match self {
            DocumentorError::Io(_) => Some("Check file path and permissions"),
            DocumentorError::Read { .. } => Some("Ensure the source file is readable UTF-8 text"),
            DocumentorError::Write { .. } => {
                Some("Check the output directory exists and is writable")
            }
            DocumentorError::Csv(_) => Some("Check the output directory is writable"),
            DocumentorError::Json(_) => None,
            DocumentorError::ConfigParse(_) => {
                Some("Check YAML syntax: indentation and quoting")
            }
            DocumentorError::Config { .. } => {
                Some("Pass --project and --output, or set project_path/output_path in the config file")
            }
            DocumentorError::InvalidPattern { .. } => {
                Some("Use glob syntax such as src/**/*.cs")
            }
            DocumentorError::Extraction { .. } => {
                Some("Use integer literals or `const int` fields as [Event] ids")
            }
        }
    }
}

pub type Result<T, E = DocumentorError> = std::result::Result<T, E>;
