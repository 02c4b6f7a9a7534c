//! Concurrent fetch of a contiguous lesson range.

use std::sync::Arc;
use std::time::Instant;

use tracing::{info, instrument, warn};

use guidebook_fetcher::Fetcher;
use guidebook_shared::{BatchResultSet, FailureReason, LessonOutcome, LessonRange};

use crate::events::{BatchEvent, EventSink};

/// Fetch and extract every lesson in `range`.
///
/// One task is spawned per lesson; the fetcher's semaphores cap how many run
/// at once. Returns after every task has resolved, with exactly one outcome
/// per lesson in range order. A failing or panicking task only affects its
/// own lesson.
#[instrument(skip_all, fields(range = %range))]
pub async fn run_batch(
    fetcher: &Fetcher,
    range: LessonRange,
    sink: Arc<dyn EventSink>,
) -> BatchResultSet {
    let start_time = Instant::now();
    sink.emit(&BatchEvent::Started { range });

    let mut handles = Vec::with_capacity(range.len());
    for id in range.iter() {
        let fetcher = fetcher.clone();
        let sink = Arc::clone(&sink);

        handles.push((
            id,
            tokio::spawn(async move {
                sink.emit(&BatchEvent::LessonStarted { id });
                let outcome = fetcher.fetch_lesson(id).await;
                sink.emit(&outcome_event(&outcome));
                outcome
            }),
        ));
    }

    let mut results: BatchResultSet = Vec::with_capacity(handles.len());
    for (id, handle) in handles {
        let outcome = match handle.await {
            Ok(outcome) => outcome,
            Err(e) => {
                warn!(lesson = id, error = %e, "lesson task did not complete");
                let outcome = LessonOutcome::failure(id, FailureReason::Task(e.to_string()));
                sink.emit(&outcome_event(&outcome));
                outcome
            }
        };
        results.push(outcome);
    }

    let succeeded = results.iter().filter(|o| o.is_success()).count();
    sink.emit(&BatchEvent::Finished {
        succeeded,
        total: results.len(),
    });

    info!(
        succeeded,
        total = results.len(),
        duration_ms = start_time.elapsed().as_millis(),
        "batch fetch complete"
    );

    results
}

fn outcome_event(outcome: &LessonOutcome) -> BatchEvent {
    match &outcome.result {
        Ok(markdown) => BatchEvent::LessonCompleted {
            id: outcome.id,
            chars: markdown.chars().count(),
        },
        Err(reason) => BatchEvent::LessonFailed {
            id: outcome.id,
            reason: reason.clone(),
        },
    }
}
