use std::{
    future::Future,
    sync::Arc,
    time::{Duration, Instant},
};

use anyhow::anyhow;
use serde::Deserialize;
use tokio::sync::Mutex;
use tracing::{debug, error, info, trace};

use super::{PromptItem, PromptType};

/// Static JSON file listing every prompt template
pub static FEED_URL: &str =
    "https://raw.githubusercontent.com/NodeOps-app/awesome-templates/main/output.json";
/// How long a fetched feed is reused before downloading it again
pub const FEED_TTL: Duration = Duration::from_secs(5 * 60);
/// Characters of the prompt text used as the description
const DESCRIPTION_CHARS: usize = 100;
/// Category for prompts the feed left uncategorised
const DEFAULT_CATEGORY: &str = "General";
/// The feed writes absent values as this literal string
const NULL_SENTINEL: &str = "null";

/// Anything that can hand out the full prompt collection
pub trait PromptSource: Send + Sync {
    /// The current collection; empty when it cannot be loaded
    fn prompts(&self) -> impl Future<Output = Arc<Vec<PromptItem>>> + Send;
}

/// A prompt exactly as the feed publishes it
#[derive(Deserialize, Debug)]
#[serde(rename_all = "camelCase")]
struct RemotePrompt {
    title: String,
    #[serde(default)]
    category: Option<String>,
    prompt: String,
    #[serde(default)]
    prompt_type: Option<String>,
    #[serde(default)]
    tags: Option<String>,
}

impl RemotePrompt {
    fn into_prompt(self, index: usize) -> PromptItem {
        let skills = present(self.tags.as_deref())
            .map(|tags| {
                tags.split(',')
                    .map(str::trim)
                    .filter(|tag| !tag.is_empty())
                    .map(str::to_string)
                    .collect()
            })
            .unwrap_or_default();

        let category = present(self.category.as_deref())
            .unwrap_or(DEFAULT_CATEGORY)
            .to_string();

        let prompt_type = match self.prompt_type.as_deref() {
            Some("user") => Some(PromptType::User),
            Some("system") => Some(PromptType::System),
            _ => None,
        };

        let description = format!(
            "{}...",
            self.prompt.chars().take(DESCRIPTION_CHARS).collect::<String>()
        );

        PromptItem {
            id: index as u32 + 1,
            title: self.title,
            description,
            category,
            skills,
            prompt: self.prompt,
            prompt_type,
        }
    }
}

/// `None` for missing, empty or `"null"` values
fn present(value: Option<&str>) -> Option<&str> {
    value.filter(|v| !v.is_empty() && *v != NULL_SENTINEL)
}

/// Turn the raw feed body into prompt items, numbering them by position
pub fn parse_feed(body: &str) -> Result<Vec<PromptItem>, serde_json::Error> {
    let remote = serde_json::from_str::<Vec<RemotePrompt>>(body)?;
    Ok(remote
        .into_iter()
        .enumerate()
        .map(|(index, remote)| remote.into_prompt(index))
        .collect())
}

struct Snapshot {
    prompts: Arc<Vec<PromptItem>>,
    fetched_at: Instant,
}

/// Downloads the prompt feed and keeps the last good copy for [`FEED_TTL`]
pub struct FeedClient {
    client: reqwest::Client,
    url: String,
    ttl: Duration,
    snapshot: Mutex<Option<Snapshot>>,
}

impl FeedClient {
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            client: reqwest::Client::new(),
            url: url.into(),
            ttl: FEED_TTL,
            snapshot: Mutex::new(None),
        }
    }

    pub fn with_ttl(mut self, ttl: Duration) -> Self {
        self.ttl = ttl;
        self
    }

    /// Return the memoised feed or download it. Callers arriving while a download is running
    /// wait on the lock and then reuse its result. Failures yield an empty collection and are
    /// not memoised.
    pub async fn fetch_prompts(&self) -> Arc<Vec<PromptItem>> {
        let mut snapshot = self.snapshot.lock().await;

        if let Some(current) = snapshot.as_ref() {
            if current.fetched_at.elapsed() < self.ttl {
                debug!(count = current.prompts.len(), "Using memoised prompts");
                return Arc::clone(&current.prompts);
            }
        }

        match self.download().await {
            Ok(prompts) => {
                info!(count = prompts.len(), "Fetched prompts");
                let prompts = Arc::new(prompts);
                *snapshot = Some(Snapshot {
                    prompts: Arc::clone(&prompts),
                    fetched_at: Instant::now(),
                });
                prompts
            }
            Err(e) => {
                error!(%e, url = %self.url, "Error fetching prompts");
                Arc::new(Vec::new())
            }
        }
    }

    async fn download(&self) -> anyhow::Result<Vec<PromptItem>> {
        debug!(url = %self.url, "Fetching prompts");
        let resp = self.client.get(&self.url).send().await?;
        trace!(?resp, "raw response");

        if !resp.status().is_success() {
            return Err(anyhow!("Failed to fetch prompts: {}", resp.status()));
        }

        let body = resp.text().await?;
        Ok(parse_feed(&body)?)
    }
}

impl PromptSource for FeedClient {
    fn prompts(&self) -> impl Future<Output = Arc<Vec<PromptItem>>> + Send {
        self.fetch_prompts()
    }
}
