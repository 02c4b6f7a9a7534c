//! Core domain types for guidebook lessons and batch runs.

use std::fmt;

use crate::error::{GuidebookError, Result};

// ---------------------------------------------------------------------------
// LessonId
// ---------------------------------------------------------------------------

/// A guidebook lesson (unit) number. Used to build the fetch URL and as the
/// ordering key of combined output.
pub type LessonId = u32;

// ---------------------------------------------------------------------------
// LessonRange
// ---------------------------------------------------------------------------

/// An inclusive, non-empty range of lesson numbers starting at 1 or later.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LessonRange {
    start: LessonId,
    end: LessonId,
}

impl LessonRange {
    /// Validate and build a range. Lesson numbers are positive and `start <= end`.
    pub fn new(start: LessonId, end: LessonId) -> Result<Self> {
        if start == 0 {
            return Err(GuidebookError::validation(
                "lesson numbers start at 1 (got start = 0)",
            ));
        }
        if start > end {
            return Err(GuidebookError::validation(format!(
                "start ({start}) is greater than end ({end})"
            )));
        }
        Ok(Self { start, end })
    }

    pub fn start(&self) -> LessonId {
        self.start
    }

    pub fn end(&self) -> LessonId {
        self.end
    }

    /// Number of lessons in the range.
    pub fn len(&self) -> usize {
        (self.end - self.start) as usize + 1
    }

    /// Always `false`; a validated range holds at least one lesson.
    pub fn is_empty(&self) -> bool {
        false
    }

    pub fn iter(&self) -> impl Iterator<Item = LessonId> {
        self.start..=self.end
    }
}

impl fmt::Display for LessonRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}..={}", self.start, self.end)
    }
}

// ---------------------------------------------------------------------------
// Outcomes
// ---------------------------------------------------------------------------

/// Why a single lesson produced no document.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum FailureReason {
    /// Any response other than `200 OK`.
    #[error("status {0}")]
    Status(u16),

    /// Connection, TLS, or body read failure.
    #[error("transport: {0}")]
    Transport(String),

    /// The per-request timeout elapsed.
    #[error("timed out")]
    Timeout,

    /// The page was fetched but had no guide container.
    #[error("could not find guide content")]
    MissingGuide,

    /// The fetch task itself panicked or was aborted.
    #[error("task failed: {0}")]
    Task(String),
}

impl From<GuidebookError> for FailureReason {
    fn from(err: GuidebookError) -> Self {
        match err {
            GuidebookError::Status { status, .. } => Self::Status(status),
            GuidebookError::Timeout { .. } => Self::Timeout,
            GuidebookError::MissingGuide => Self::MissingGuide,
            other => Self::Transport(other.to_string()),
        }
    }
}

/// Result of fetching and extracting one lesson.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LessonOutcome {
    pub id: LessonId,
    pub result: std::result::Result<String, FailureReason>,
}

impl LessonOutcome {
    pub fn success(id: LessonId, markdown: impl Into<String>) -> Self {
        Self {
            id,
            result: Ok(markdown.into()),
        }
    }

    pub fn failure(id: LessonId, reason: FailureReason) -> Self {
        Self {
            id,
            result: Err(reason),
        }
    }

    pub fn is_success(&self) -> bool {
        self.result.is_ok()
    }

    /// The extracted document, if the lesson succeeded.
    pub fn document(&self) -> Option<&str> {
        self.result.as_deref().ok()
    }
}

/// All outcomes of one batch run, in arrival order.
pub type BatchResultSet = Vec<LessonOutcome>;
