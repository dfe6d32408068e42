// src/services/wayback.rs

//! Public archive (Wayback Machine) client.
//!
//! Each URL goes through a small state machine:
//!
//! ```text
//! save ─┬─ Success(url) ──┬─ clean ─────────────► done
//!       │                 └─ corrupted ─► sleep (long) ─► save
//!       ├─ RetryableFailure ────────────► sleep ─────────► save
//!       └─ FatalFailure ────────────────► InvalidUrl error
//! ```
//!
//! Running out of attempts yields [`AppError::Archive`] with every recorded
//! failure.

use std::sync::LazyLock;
use std::time::Duration;

use async_trait::async_trait;
use regex::Regex;
use reqwest::StatusCode;
use url::Url;

use crate::error::{AppError, Result};
use crate::models::WaybackConfig;

/// Base URL of the Wayback Machine.
pub const WAYBACK_ENDPOINT: &str = "https://web.archive.org";

/// Prefix of the placeholder archive URL returned in dry-run mode.
pub const DRY_RUN_PREFIX: &str = "dry-run:";

/// Result of asking the service to save a URL once.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SaveOutcome {
    /// The service returned an archive URL
    Success(String),
    /// Timeouts, busy service, malformed responses
    RetryableFailure(String),
    /// The service rejected the URL itself
    FatalFailure(String),
}

/// A service that snapshots a URL and returns its permanent archive URL.
#[async_trait]
pub trait SaveService: Send + Sync {
    async fn save(&self, url: &Url) -> SaveOutcome;
}

/// [`SaveService`] backed by the Wayback Machine "save page now" endpoint.
#[derive(Debug, Clone)]
pub struct WaybackMachine {
    client: reqwest::Client,
    endpoint: String,
}

impl WaybackMachine {
    pub fn new(client: reqwest::Client) -> Self {
        Self {
            client,
            endpoint: WAYBACK_ENDPOINT.to_string(),
        }
    }
}

#[async_trait]
impl SaveService for WaybackMachine {
    async fn save(&self, url: &Url) -> SaveOutcome {
        let request_url = format!("{}/save/{}", self.endpoint, url);
        log::debug!("GET {request_url}");

        match self.client.get(&request_url).send().await {
            Ok(response) => {
                let content_location = response
                    .headers()
                    .get(reqwest::header::CONTENT_LOCATION)
                    .and_then(|v| v.to_str().ok());
                classify_response(
                    response.status(),
                    content_location,
                    response.url(),
                    &self.endpoint,
                )
            }
            Err(e) if e.is_timeout() => {
                SaveOutcome::RetryableFailure(format!("request timed out: {e}"))
            }
            Err(e) => SaveOutcome::RetryableFailure(format!("request failed: {e}")),
        }
    }
}

/// Map a save response to a [`SaveOutcome`].
fn classify_response(
    status: StatusCode,
    content_location: Option<&str>,
    final_url: &Url,
    endpoint: &str,
) -> SaveOutcome {
    if status == StatusCode::BAD_REQUEST {
        return SaveOutcome::FatalFailure(format!("service rejected the URL ({status})"));
    }

    if status == StatusCode::REQUEST_TIMEOUT
        || status == StatusCode::TOO_MANY_REQUESTS
        || status.is_server_error()
    {
        return SaveOutcome::RetryableFailure(format!("service busy or unavailable ({status})"));
    }

    if !status.is_success() {
        return SaveOutcome::RetryableFailure(format!("unexpected response status {status}"));
    }

    // Only snapshots served by the archive itself count.
    let archive_prefix = format!("{endpoint}/web/");
    match content_location {
        Some(location) if location.starts_with("/web/") => {
            SaveOutcome::Success(format!("{endpoint}{location}"))
        }
        Some(location) if location.starts_with(&archive_prefix) => {
            SaveOutcome::Success(location.to_string())
        }
        Some(location) => SaveOutcome::RetryableFailure(format!(
            "archive location `{location}` is outside {endpoint}"
        )),
        None if final_url.as_str().starts_with(&archive_prefix) => {
            SaveOutcome::Success(final_url.to_string())
        }
        None => SaveOutcome::RetryableFailure(
            "response did not contain an archive location".to_string(),
        ),
    }
}

/// Returns true when an archive URL points at an unrelated Twitter hashflag
/// config file instead of the requested page.
pub fn is_corrupted(archive_url: &str) -> bool {
    static PATTERN: LazyLock<Option<Regex>> =
        LazyLock::new(|| Regex::new(r"/hashflag/config-[0-9-]+\.json").ok());
    PATTERN
        .as_ref()
        .is_some_and(|pattern| pattern.is_match(archive_url))
}

/// Attempt limits and backoff intervals.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RetryPolicy {
    pub max_attempts: u32,
    pub retry_backoff: Duration,
    pub corruption_backoff: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self::from(&WaybackConfig::default())
    }
}

impl From<&WaybackConfig> for RetryPolicy {
    fn from(config: &WaybackConfig) -> Self {
        Self {
            max_attempts: config.max_attempts.max(1),
            retry_backoff: Duration::from_secs(config.retry_backoff_secs),
            corruption_backoff: Duration::from_secs(config.corruption_backoff_secs),
        }
    }
}

/// What to do after one save attempt.
#[derive(Debug, Clone, PartialEq, Eq)]
enum Step {
    Done(String),
    Retry { reason: String, backoff: Duration },
    Abort(String),
}

fn next_step(outcome: SaveOutcome, policy: &RetryPolicy) -> Step {
    match outcome {
        SaveOutcome::Success(archive_url) if is_corrupted(&archive_url) => Step::Retry {
            reason: format!("save returned an unrelated asset: {archive_url}"),
            backoff: policy.corruption_backoff,
        },
        SaveOutcome::Success(archive_url) => Step::Done(archive_url),
        SaveOutcome::RetryableFailure(reason) => Step::Retry {
            reason,
            backoff: policy.retry_backoff,
        },
        SaveOutcome::FatalFailure(reason) => Step::Abort(reason),
    }
}

/// Saves URLs to the public archive with bounded retries.
pub struct PublicArchiveClient<S = WaybackMachine> {
    service: S,
    policy: RetryPolicy,
}

impl PublicArchiveClient<WaybackMachine> {
    /// Create a client for the Wayback Machine.
    pub fn wayback(config: &WaybackConfig) -> Result<Self> {
        let client = crate::utils::http::create_async_client(config)?;
        Ok(Self::new(WaybackMachine::new(client), RetryPolicy::from(config)))
    }
}

impl<S: SaveService> PublicArchiveClient<S> {
    pub fn new(service: S, policy: RetryPolicy) -> Self {
        Self { service, policy }
    }

    /// Save `url` and return its archive URL.
    ///
    /// `position` and `total` only label log lines. In dry-run mode the
    /// service is never contacted and a `dry-run:` placeholder is returned.
    pub async fn archive(
        &self,
        url: &str,
        position: usize,
        total: usize,
        dry_run: bool,
    ) -> Result<String> {
        if dry_run {
            log::info!("[{position}/{total}] dry run, not saving {url} to the wayback machine");
            return Ok(format!("{DRY_RUN_PREFIX}{url}"));
        }

        let parsed = validate_url(url)?;
        let max_attempts = self.policy.max_attempts;
        let mut errors = Vec::new();

        for attempt in 1..=max_attempts {
            log::info!(
                "[{position}/{total}] saving {url} to the wayback machine (attempt {attempt}/{max_attempts})"
            );

            match next_step(self.service.save(&parsed).await, &self.policy) {
                Step::Done(archive_url) => {
                    log::info!("[{position}/{total}] {url} archived as {archive_url}");
                    return Ok(archive_url);
                }
                Step::Abort(reason) => {
                    log::error!("[{position}/{total}] {url} cannot be archived: {reason}");
                    return Err(AppError::invalid_url(url, reason));
                }
                Step::Retry { reason, backoff } => {
                    log::warn!(
                        "[{position}/{total}] attempt {attempt}/{max_attempts} for {url} failed: {reason}"
                    );
                    errors.push(reason);
                    if attempt < max_attempts {
                        log::info!("sleeping {}s before retrying {url}", backoff.as_secs());
                        tokio::time::sleep(backoff).await;
                    }
                }
            }
        }

        Err(AppError::Archive {
            url: url.to_string(),
            attempts: max_attempts,
            errors,
        })
    }
}

/// Reject URLs the public archive could never save.
fn validate_url(url: &str) -> Result<Url> {
    let parsed = Url::parse(url).map_err(|e| AppError::invalid_url(url, e))?;
    if !matches!(parsed.scheme(), "http" | "https") {
        return Err(AppError::invalid_url(
            url,
            format!("unsupported scheme `{}`", parsed.scheme()),
        ));
    }
    if parsed.host_str().is_none() {
        return Err(AppError::invalid_url(url, "URL has no host"));
    }
    Ok(parsed)
}
