//! Progress events emitted during a batch run.
//!
//! The orchestrator never prints; it reports through an [`EventSink`] chosen
//! by the caller (tracing logs, a progress bar, or nothing at all).

use tracing::{info, warn};

use guidebook_shared::{FailureReason, LessonId, LessonRange};

/// One step of a batch run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BatchEvent {
    /// The batch is about to spawn one task per lesson.
    Started { range: LessonRange },
    /// A lesson task began (it may still wait for a connection slot).
    LessonStarted { id: LessonId },
    /// A lesson was fetched and extracted.
    LessonCompleted { id: LessonId, chars: usize },
    /// A lesson produced no document.
    LessonFailed { id: LessonId, reason: FailureReason },
    /// Every task has resolved.
    Finished { succeeded: usize, total: usize },
}

/// Receiver of batch progress events.
///
/// Called from concurrently running tasks, so implementations must be
/// `Send + Sync` and should return quickly.
pub trait EventSink: Send + Sync {
    fn emit(&self, event: &BatchEvent);
}

/// Forwards events to `tracing`.
pub struct TracingSink;

impl EventSink for TracingSink {
    fn emit(&self, event: &BatchEvent) {
        match event {
            BatchEvent::Started { range } => {
                info!(start = range.start(), end = range.end(), "batch started");
            }
            BatchEvent::LessonStarted { id } => info!(lesson = id, "fetching lesson"),
            BatchEvent::LessonCompleted { id, chars } => {
                info!(lesson = id, chars, "lesson completed");
            }
            BatchEvent::LessonFailed { id, reason } => {
                warn!(lesson = id, %reason, "lesson failed");
            }
            BatchEvent::Finished { succeeded, total } => {
                info!(succeeded, total, "batch finished");
            }
        }
    }
}

/// Discards every event.
pub struct SilentSink;

impl EventSink for SilentSink {
    fn emit(&self, _event: &BatchEvent) {}
}
