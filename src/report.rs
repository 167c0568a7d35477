//! Per-source outcomes of a documentor run

use std::path::PathBuf;

use serde::Serialize;

/// What happened to one source reference
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum ItemOutcome {
    Generated {
        source: String,
        event_source: String,
        output_path: PathBuf,
        record_count: usize,
    },
    SkippedMissing {
        source: String,
        path: PathBuf,
    },
    SkippedUnrecognized {
        source: String,
    },
    Failed {
        source: String,
        error: String,
    },
}

impl ItemOutcome {
    pub fn source(&self) -> &str {
        match self {
            Self::Generated { source, .. }
            | Self::SkippedMissing { source, .. }
            | Self::SkippedUnrecognized { source }
            | Self::Failed { source, .. } => source,
        }
    }

    pub fn is_generated(&self) -> bool {
        matches!(self, Self::Generated { .. })
    }

    pub fn is_skipped(&self) -> bool {
        matches!(
            self,
            Self::SkippedMissing { .. } | Self::SkippedUnrecognized { .. }
        )
    }

    pub fn is_failed(&self) -> bool {
        matches!(self, Self::Failed { .. })
    }
}

/// Outcomes of a run, in source order
///
/// Skips never make a run unsuccessful; any `Failed` item does.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct RunReport {
    pub outcomes: Vec<ItemOutcome>,
}

impl RunReport {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, outcome: ItemOutcome) {
        self.outcomes.push(outcome);
    }

    pub fn is_success(&self) -> bool {
        !self.outcomes.iter().any(ItemOutcome::is_failed)
    }

    pub fn generated(&self) -> impl Iterator<Item = &ItemOutcome> {
        self.outcomes.iter().filter(|o| o.is_generated())
    }

    /// Paths of every file written
    pub fn output_paths(&self) -> Vec<&PathBuf> {
        self.outcomes
            .iter()
            .filter_map(|o| match o {
                ItemOutcome::Generated { output_path, .. } => Some(output_path),
                _ => None,
            })
            .collect()
    }

    pub fn generated_count(&self) -> usize {
        self.generated().count()
    }

    pub fn skipped_count(&self) -> usize {
        self.outcomes.iter().filter(|o| o.is_skipped()).count()
    }

    pub fn failed_count(&self) -> usize {
        self.outcomes.iter().filter(|o| o.is_failed()).count()
    }

    pub fn len(&self) -> usize {
        self.outcomes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.outcomes.is_empty()
    }
}
