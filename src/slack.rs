//! Rate-limited Slack Web API client
//!
//! All outbound traffic funnels through [`SlackClient`], which owns the one
//! pacing gate for the whole run: every call waits until at least the
//! configured interval has passed since the previous dispatch, and 429
//! rejections are retried with the server-suggested delay plus a one second
//! buffer, up to a bounded attempt count.
//!
//! Exhausting the retry budget is a degradation, not an error: the count
//! operation returns 0, the listing operation an empty list, and the
//! workspace lookup `None`. Non-rate-limit failures propagate to the caller.

use async_trait::async_trait;
use serde::Deserialize;
use std::collections::HashMap;
use std::time::Duration;
use tokio::sync::Mutex;
use tokio::time::{sleep, Instant};

/// Extra seconds slept on top of the server-suggested Retry-After delay.
pub const RETRY_BUFFER_SECS: u64 = 1;

#[derive(Debug)]
pub enum SlackError {
    /// Explicit 429 rejection with the server-suggested delay in seconds.
    RateLimited { retry_after: u64 },
    /// API-level failure (`ok: false` envelope or unexpected payload).
    Api(String),
    /// Transport-level failure.
    Http(reqwest::Error),
}

impl From<reqwest::Error> for SlackError {
    fn from(err: reqwest::Error) -> Self {
        SlackError::Http(err)
    }
}

impl std::fmt::Display for SlackError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SlackError::RateLimited { retry_after } => {
                write!(f, "Rate limited, retry after {}s", retry_after)
            }
            SlackError::Api(msg) => write!(f, "Slack API error: {}", msg),
            SlackError::Http(e) => write!(f, "HTTP error: {}", e),
        }
    }
}

impl std::error::Error for SlackError {}

#[derive(Debug, Clone, Deserialize)]
pub struct CustomEmoji {
    pub name: String,
    pub url: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct WorkspaceInfo {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub domain: String,
}

/// Transport seam for the Slack Web API methods this tool needs.
#[async_trait]
pub trait SearchTransport: Send + Sync {
    /// Execute a count-only search, returning the total match count.
    async fn count_query(&self, query: &str) -> Result<u64, SlackError>;

    /// List the workspace's custom emojis.
    async fn list_custom_emojis(&self) -> Result<Vec<CustomEmoji>, SlackError>;

    /// Fetch workspace metadata.
    async fn workspace_info(&self) -> Result<WorkspaceInfo, SlackError>;
}

/// Injectable pacing state: the timestamp of the last dispatched call.
///
/// The timestamp is recorded immediately before dispatch, not after the
/// response, so pacing accounts only for the previous call's latency. The
/// mutex serializes concurrent callers through the single gate.
pub struct RatePacer {
    min_interval: Duration,
    last_call: Mutex<Option<Instant>>,
}

impl RatePacer {
    pub fn new(min_interval: Duration) -> Self {
        Self {
            min_interval,
            last_call: Mutex::new(None),
        }
    }

    pub fn from_secs_f64(secs: f64) -> Self {
        Self::new(Duration::from_secs_f64(secs.max(0.0)))
    }

    /// Block until the minimum interval since the last call has elapsed,
    /// then record the new last-call timestamp.
    pub async fn pace(&self) {
        let mut last = self.last_call.lock().await;
        if let Some(prev) = *last {
            let elapsed = prev.elapsed();
            if elapsed < self.min_interval {
                sleep(self.min_interval - elapsed).await;
            }
        }
        *last = Some(Instant::now());
    }
}

/// Retry- and pacing-aware wrapper around a [`SearchTransport`].
pub struct SlackClient {
    transport: Box<dyn SearchTransport>,
    pacer: RatePacer,
    max_retries: u32,
}

impl SlackClient {
    pub fn new(transport: Box<dyn SearchTransport>, pacer: RatePacer, max_retries: u32) -> Self {
        Self {
            transport,
            pacer,
            max_retries,
        }
    }

    /// Execute a count search with pacing and bounded 429 retry.
    ///
    /// Returns `Ok(0)` after exhausting retries; propagates non-rate-limit
    /// failures unchanged.
    pub async fn search_count(&self, query: &str) -> Result<u64, SlackError> {
        for attempt in 1..=self.max_retries {
            self.pacer.pace().await;

            match self.transport.count_query(query).await {
                Ok(total) => {
                    log::debug!("Found {} messages for query: {}", total, query);
                    return Ok(total);
                }
                Err(SlackError::RateLimited { retry_after }) => {
                    self.backoff(retry_after, attempt).await;
                }
                Err(e) => {
                    log::error!("Slack API error: {}", e);
                    return Err(e);
                }
            }
        }

        log::error!("Give up query after {} retries: {}", self.max_retries, query);
        Ok(0)
    }

    /// List custom emojis with pacing and bounded 429 retry.
    ///
    /// Returns `Ok(vec![])` after exhausting retries; propagates
    /// non-rate-limit failures unchanged.
    pub async fn custom_emojis(&self) -> Result<Vec<CustomEmoji>, SlackError> {
        for attempt in 1..=self.max_retries {
            self.pacer.pace().await;

            match self.transport.list_custom_emojis().await {
                Ok(emojis) => {
                    log::info!("Found {} custom emojis", emojis.len());
                    return Ok(emojis);
                }
                Err(SlackError::RateLimited { retry_after }) => {
                    self.backoff(retry_after, attempt).await;
                }
                Err(e) => {
                    log::error!("Slack API error: {}", e);
                    return Err(e);
                }
            }
        }

        log::error!("Give up custom emoji fetch after {} retries", self.max_retries);
        Ok(vec![])
    }

    /// Fetch workspace metadata. Any failure degrades to `None`.
    pub async fn workspace_info(&self) -> Option<WorkspaceInfo> {
        for attempt in 1..=self.max_retries {
            self.pacer.pace().await;

            match self.transport.workspace_info().await {
                Ok(info) => {
                    log::debug!("Workspace: {}", info.name);
                    return Some(info);
                }
                Err(SlackError::RateLimited { retry_after }) => {
                    self.backoff(retry_after, attempt).await;
                }
                Err(e) => {
                    log::warn!("Failed to get workspace info: {}", e);
                    return None;
                }
            }
        }

        log::warn!("Failed to get workspace info");
        None
    }

    async fn backoff(&self, retry_after: u64, attempt: u32) {
        let retry_secs = retry_after + RETRY_BUFFER_SECS;
        log::warn!(
            "Rate limited (429). Sleeping {}s (attempt {}/{})",
            retry_secs,
            attempt,
            self.max_retries
        );
        sleep(Duration::from_secs(retry_secs)).await;
    }
}

// ---- HTTP transport -------------------------------------------------------

#[derive(Debug, Deserialize)]
struct SearchEnvelope {
    ok: bool,
    #[serde(default)]
    error: Option<String>,
    #[serde(default)]
    messages: Option<SearchMessages>,
}

#[derive(Debug, Deserialize)]
struct SearchMessages {
    #[serde(default)]
    total: u64,
}

#[derive(Debug, Deserialize)]
struct EmojiListEnvelope {
    ok: bool,
    #[serde(default)]
    error: Option<String>,
    #[serde(default)]
    emoji: Option<HashMap<String, String>>,
}

#[derive(Debug, Deserialize)]
struct TeamInfoEnvelope {
    ok: bool,
    #[serde(default)]
    error: Option<String>,
    #[serde(default)]
    team: Option<WorkspaceInfo>,
}

/// Bearer-token reqwest transport against the Slack Web API.
pub struct HttpTransport {
    http: reqwest::Client,
    base_url: String,
    token: String,
}

impl HttpTransport {
    pub fn new(base_url: &str, token: &str) -> Result<Self, SlackError> {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(30))
            .build()?;

        Ok(Self {
            http,
            base_url: base_url.trim_end_matches('/').to_string(),
            token: token.to_string(),
        })
    }

    async fn call(
        &self,
        method: &str,
        params: &[(&str, &str)],
    ) -> Result<reqwest::Response, SlackError> {
        let url = format!("{}/{}", self.base_url, method);
        let response = self
            .http
            .get(&url)
            .bearer_auth(&self.token)
            .query(params)
            .send()
            .await?;

        if response.status() == reqwest::StatusCode::TOO_MANY_REQUESTS {
            let retry_after = response
                .headers()
                .get(reqwest::header::RETRY_AFTER)
                .and_then(|v| v.to_str().ok())
                .and_then(|s| s.parse().ok())
                .unwrap_or(1);
            return Err(SlackError::RateLimited { retry_after });
        }

        if !response.status().is_success() {
            return Err(SlackError::Api(format!("HTTP {}", response.status())));
        }

        Ok(response)
    }
}

#[async_trait]
impl SearchTransport for HttpTransport {
    async fn count_query(&self, query: &str) -> Result<u64, SlackError> {
        log::debug!("Searching messages: {}", query);
        let response = self
            .call("search.messages", &[("query", query), ("count", "1")])
            .await?;
        let envelope: SearchEnvelope = response.json().await?;

        if !envelope.ok {
            return Err(SlackError::Api(
                envelope.error.unwrap_or_else(|| "unknown error".to_string()),
            ));
        }

        Ok(envelope.messages.map(|m| m.total).unwrap_or(0))
    }

    async fn list_custom_emojis(&self) -> Result<Vec<CustomEmoji>, SlackError> {
        log::debug!("Fetching custom emojis");
        let response = self.call("emoji.list", &[]).await?;
        let envelope: EmojiListEnvelope = response.json().await?;

        if !envelope.ok {
            return Err(SlackError::Api(
                envelope.error.unwrap_or_else(|| "unknown error".to_string()),
            ));
        }

        Ok(envelope
            .emoji
            .unwrap_or_default()
            .into_iter()
            .map(|(name, url)| CustomEmoji { name, url })
            .collect())
    }

    async fn workspace_info(&self) -> Result<WorkspaceInfo, SlackError> {
        log::debug!("Fetching workspace info");
        let response = self.call("team.info", &[]).await?;
        let envelope: TeamInfoEnvelope = response.json().await?;

        if !envelope.ok {
            return Err(SlackError::Api(
                envelope.error.unwrap_or_else(|| "unknown error".to_string()),
            ));
        }

        envelope
            .team
            .ok_or_else(|| SlackError::Api("team.info returned no team".to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    #[ignore] // Run only when testing with a live workspace (SLACK_TOKEN set)
    async fn test_live_workspace_info() {
        let token = std::env::var("SLACK_TOKEN").expect("SLACK_TOKEN not set");
        let transport = HttpTransport::new("https://slack.com/api", &token).unwrap();

        let info = transport.workspace_info().await.unwrap();
        assert!(!info.name.is_empty());
    }
}
