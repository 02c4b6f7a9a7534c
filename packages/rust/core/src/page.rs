//! Single-page pipeline: fetch one guidebook URL, extract it, save it.

use std::path::Path;
use std::sync::LazyLock;

use regex::Regex;
use tracing::{info, instrument};
use url::Url;

use guidebook_fetcher::Fetcher;
use guidebook_shared::{GuidebookError, LessonId, Result};

use crate::write_text;

/// Lesson number from a URL ending in `/<digits>`.
pub fn lesson_hint_from_url(url: &str) -> Option<LessonId> {
    static TRAILING_NUMBER_RE: LazyLock<Regex> =
        LazyLock::new(|| Regex::new(r"/(\d+)$").expect("valid regex"));

    TRAILING_NUMBER_RE
        .captures(url)
        .and_then(|c| c[1].parse().ok())
}

/// Fetch `url` and convert it to Markdown.
///
/// Without an explicit `lesson`, the number is taken from the URL's last path
/// segment when it is numeric. Fetch failures and missing guide content are
/// returned as errors.
#[instrument(skip(fetcher))]
pub async fn convert_page(fetcher: &Fetcher, url: &str, lesson: Option<LessonId>) -> Result<String> {
    let parsed = Url::parse(url)
        .map_err(|e| GuidebookError::validation(format!("invalid URL '{url}': {e}")))?;
    let lesson = lesson.or_else(|| lesson_hint_from_url(url));

    info!(%parsed, ?lesson, "fetching content");
    let markup = fetcher.fetch_page(&parsed).await?;
    info!(bytes = markup.len(), "page fetched, converting");

    guidebook_markdown::extract(&markup, lesson)
}

/// Save a single lesson document.
pub fn save_markdown(path: &Path, content: &str) -> Result<()> {
    write_text(path, content)?;
    info!(path = %path.display(), "content saved");
    Ok(())
}
