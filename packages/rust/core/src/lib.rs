//! Batch orchestration and output for the guidebook converter.
//!
//! This crate ties the fetcher and the Markdown extractor together:
//! - [`batch`] — fetch a lesson range concurrently into a result set
//! - [`combine`] — sort, join and persist a result set as one document
//! - [`page`] — the single-page pipeline
//! - [`events`] — progress events and their sinks

pub mod batch;
pub mod combine;
pub mod events;
pub mod page;

use std::path::Path;

use guidebook_shared::{GuidebookError, Result};

/// Write `content` to `path`, creating parent directories as needed.
pub(crate) fn write_text(path: &Path, content: &str) -> Result<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent).map_err(|e| GuidebookError::io(parent, e))?;
    }
    std::fs::write(path, content).map_err(|e| GuidebookError::io(path, e))
}
