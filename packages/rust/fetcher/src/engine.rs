//! Guidebook page fetcher.
//!
//! One `reqwest` client is shared by every request. Lesson fetches hold a
//! global permit and a per-host permit for the whole request, so at most
//! `concurrency` requests are in flight overall and `per_host` to one host.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use reqwest::{Client, StatusCode};
use tokio::sync::{OwnedSemaphorePermit, Semaphore};
use tracing::{debug, instrument};
use url::Url;

use guidebook_shared::config::LESSON_PLACEHOLDER;
use guidebook_shared::{
    FailureReason, FetchConfig, GuidebookError, LessonId, LessonOutcome, Result,
};

/// Maximum number of redirects followed per request.
const MAX_REDIRECTS: usize = 5;

// ---------------------------------------------------------------------------
// Fetcher
// ---------------------------------------------------------------------------

/// Shared HTTP client for guidebook pages. Cheap to clone.
#[derive(Clone)]
pub struct Fetcher {
    config: FetchConfig,
    client: Client,
    in_flight: Arc<Semaphore>,
    hosts: Arc<HostLimits>,
}

impl Fetcher {
    /// Create a fetcher with the given configuration.
    pub fn new(config: FetchConfig) -> Result<Self> {
        config.validate()?;

        let client = Client::builder()
            .user_agent(config.user_agent.as_str())
            .redirect(reqwest::redirect::Policy::limited(MAX_REDIRECTS))
            .timeout(Duration::from_secs(config.timeout_secs))
            .pool_max_idle_per_host(config.per_host)
            .build()
            .map_err(|e| GuidebookError::Network(format!("failed to build HTTP client: {e}")))?;

        Ok(Self {
            in_flight: Arc::new(Semaphore::new(config.concurrency)),
            hosts: Arc::new(HostLimits::new(config.per_host)),
            config,
            client,
        })
    }

    pub fn config(&self) -> &FetchConfig {
        &self.config
    }

    /// Expand the URL template for one lesson.
    pub fn lesson_url(&self, id: LessonId) -> Result<Url> {
        let raw = self
            .config
            .url_template
            .replace(LESSON_PLACEHOLDER, &id.to_string());
        Url::parse(&raw).map_err(|e| GuidebookError::parse(format!("invalid lesson URL {raw}: {e}")))
    }

    /// Fetch one page and return its body. Any non-2xx status is an error.
    #[instrument(skip_all, fields(url = %url))]
    pub async fn fetch_page(&self, url: &Url) -> Result<String> {
        let response = self.send(url).await?;

        let status = response.status();
        if !status.is_success() {
            return Err(GuidebookError::Status {
                url: url.to_string(),
                status: status.as_u16(),
            });
        }

        read_body(url, response).await
    }

    /// Fetch and extract one lesson.
    ///
    /// Never fails: transport errors, non-200 answers, timeouts and pages
    /// without guide content all become a failed [`LessonOutcome`].
    #[instrument(skip(self))]
    pub async fn fetch_lesson(&self, id: LessonId) -> LessonOutcome {
        debug!(lesson = id, "fetching lesson");

        match self.fetch_lesson_markdown(id).await {
            Ok(markdown) => {
                debug!(lesson = id, chars = markdown.chars().count(), "lesson completed");
                LessonOutcome::success(id, markdown)
            }
            Err(reason) => {
                debug!(lesson = id, %reason, "lesson failed");
                LessonOutcome::failure(id, reason)
            }
        }
    }

    async fn fetch_lesson_markdown(&self, id: LessonId) -> std::result::Result<String, FailureReason> {
        let url = self.lesson_url(id)?;

        let _global = acquire(&self.in_flight).await?;
        let _host = acquire(&self.hosts.for_url(&url)).await?;

        let response = self.send(&url).await?;
        let status = response.status();
        if status != StatusCode::OK {
            return Err(FailureReason::Status(status.as_u16()));
        }

        let markup = read_body(&url, response).await?;
        debug!(lesson = id, bytes = markup.len(), "page downloaded");

        Ok(guidebook_markdown::extract(&markup, Some(id))?)
    }

    async fn send(&self, url: &Url) -> Result<reqwest::Response> {
        self.client
            .get(url.as_str())
            .send()
            .await
            .map_err(|e| request_error(url, e))
    }
}

async fn read_body(url: &Url, response: reqwest::Response) -> Result<String> {
    response
        .text()
        .await
        .map_err(|e| request_error(url, e))
}

fn request_error(url: &Url, err: reqwest::Error) -> GuidebookError {
    if err.is_timeout() {
        GuidebookError::Timeout {
            url: url.to_string(),
        }
    } else {
        GuidebookError::Network(format!("{url}: {err}"))
    }
}

async fn acquire(sem: &Arc<Semaphore>) -> std::result::Result<OwnedSemaphorePermit, FailureReason> {
    sem.clone()
        .acquire_owned()
        .await
        .map_err(|e| FailureReason::Task(e.to_string()))
}

// ---------------------------------------------------------------------------
// Per-host limits
// ---------------------------------------------------------------------------

/// Lazily created semaphore per host.
struct HostLimits {
    per_host: usize,
    hosts: Mutex<HashMap<String, Arc<Semaphore>>>,
}

impl HostLimits {
    fn new(per_host: usize) -> Self {
        Self {
            per_host,
            hosts: Mutex::new(HashMap::new()),
        }
    }

    fn for_url(&self, url: &Url) -> Arc<Semaphore> {
        let key = format!(
            "{}:{}",
            url.host_str().unwrap_or(""),
            url.port_or_known_default().unwrap_or(0)
        );
        let mut hosts = self.hosts.lock().unwrap_or_else(|e| e.into_inner());
        hosts
            .entry(key)
            .or_insert_with(|| Arc::new(Semaphore::new(self.per_host)))
            .clone()
    }
}
