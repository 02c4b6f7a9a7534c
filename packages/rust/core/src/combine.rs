//! Combine a batch result set into one Markdown document.

use std::path::Path;

use serde::{Deserialize, Serialize};
use tracing::{info, instrument};

use guidebook_shared::{GuidebookError, LessonId, LessonOutcome, Result};

use crate::write_text;

/// Placed between lessons, never after the last one.
pub const LESSON_SEPARATOR: &str = "\n\n---\n\n";

/// Successful lessons joined in ascending order, plus run bookkeeping.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Combined {
    /// The joined Markdown document.
    pub content: String,
    /// Lessons included in `content`, ascending.
    pub lessons: Vec<LessonId>,
    /// Lessons without a document, in result-set order.
    pub failed: Vec<LessonId>,
    /// Size of the result set.
    pub total: usize,
}

/// Machine-readable summary of a batch run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BatchReport {
    pub total: usize,
    pub succeeded: Vec<LessonId>,
    pub failed: Vec<LessonId>,
    /// Length of the combined document in characters.
    pub characters: usize,
}

impl Combined {
    pub fn succeeded(&self) -> usize {
        self.lessons.len()
    }

    /// Length of the combined document in characters.
    pub fn characters(&self) -> usize {
        self.content.chars().count()
    }

    pub fn report(&self) -> BatchReport {
        BatchReport {
            total: self.total,
            succeeded: self.lessons.clone(),
            failed: self.failed.clone(),
            characters: self.characters(),
        }
    }
}

/// Keep successful lessons, sort them by lesson number and join them.
pub fn combine(results: &[LessonOutcome]) -> Combined {
    let mut documents: Vec<(LessonId, &str)> = results
        .iter()
        .filter_map(|o| o.document().map(|doc| (o.id, doc)))
        .collect();
    documents.sort_by_key(|(id, _)| *id);

    let failed = results
        .iter()
        .filter(|o| !o.is_success())
        .map(|o| o.id)
        .collect();

    Combined {
        content: documents
            .iter()
            .map(|(_, doc)| *doc)
            .collect::<Vec<_>>()
            .join(LESSON_SEPARATOR),
        lessons: documents.iter().map(|(id, _)| *id).collect(),
        failed,
        total: results.len(),
    }
}

/// Write the combined document as UTF-8.
#[instrument(skip_all, fields(path = %path.display(), lessons = combined.succeeded()))]
pub fn write_combined(path: &Path, combined: &Combined) -> Result<()> {
    write_text(path, &combined.content)?;
    info!(
        succeeded = combined.succeeded(),
        total = combined.total,
        characters = combined.characters(),
        "combined document written"
    );
    Ok(())
}

/// Write a batch report as pretty-printed JSON.
pub fn write_report(path: &Path, report: &BatchReport) -> Result<()> {
    let json = serde_json::to_string_pretty(report)
        .map_err(|e| GuidebookError::validation(format!("failed to serialize report: {e}")))?;
    write_text(path, &json)
}
