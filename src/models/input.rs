//! Declarative configuration document structures.
//!
//! These mirror the TOML file one to one and carry no derived state. They are
//! turned into a [`RunConfig`](super::RunConfig) by [`resolve`](super::resolve).

use serde::{Deserialize, Serialize};

/// Name of the namespaced root section in the configuration file.
pub const ROOT_SECTION: &str = "archive_pogchamp_emote";

/// Root of the configuration file.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConfigFile {
    /// The emote event being archived
    pub archive_pogchamp_emote: EmoteInput,

    /// Public archive client tuning
    #[serde(default)]
    pub wayback: WaybackConfig,
}

/// An emote id may be written as a TOML integer or string.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum EmoteId {
    Number(u64),
    Text(String),
}

impl EmoteId {
    /// The id as it appears in URLs and headers.
    pub fn as_string(&self) -> String {
        match self {
            EmoteId::Number(n) => n.to_string(),
            EmoteId::Text(s) => s.trim().to_string(),
        }
    }
}

/// The `[archive_pogchamp_emote]` section.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EmoteInput {
    pub twitch_emote_id: Option<EmoteId>,

    /// ISO `YYYY-MM-DD`
    pub date: Option<String>,

    /// The announcement post
    pub twitch_twitter_post_url: Option<String>,

    #[serde(default)]
    pub twitch_twitter_post_is_video: bool,

    pub streamer_name: Option<String>,

    pub streamer_twitch_url: Option<String>,

    #[serde(default)]
    pub streamer_social_media_urls: Option<Vec<String>>,

    /// Deprecated singular form of `streamer_social_media_urls`
    #[serde(default)]
    pub streamer_social_media_url: Option<String>,

    /// Extra provenance headers, in declared order
    #[serde(default)]
    pub warc_headers: toml::Table,

    #[serde(default)]
    pub additional_wpull_urls: Vec<String>,

    #[serde(default)]
    pub additional_wayback_urls: Vec<String>,

    #[serde(default)]
    pub additional_youtube_dl_urls: Vec<String>,
}

/// Retry and HTTP settings for the public archive client.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WaybackConfig {
    /// Attempts per URL before giving up
    #[serde(default = "defaults::max_attempts")]
    pub max_attempts: u32,

    /// Sleep after a transient failure, in seconds
    #[serde(default = "defaults::retry_backoff")]
    pub retry_backoff_secs: u64,

    /// Sleep after a corrupted save result, in seconds
    #[serde(default = "defaults::corruption_backoff")]
    pub corruption_backoff_secs: u64,

    /// Request timeout in seconds
    #[serde(default = "defaults::timeout")]
    pub timeout_secs: u64,

    /// User-Agent header for save requests
    #[serde(default = "defaults::user_agent")]
    pub user_agent: String,
}

impl Default for WaybackConfig {
    fn default() -> Self {
        Self {
            max_attempts: defaults::max_attempts(),
            retry_backoff_secs: defaults::retry_backoff(),
            corruption_backoff_secs: defaults::corruption_backoff(),
            timeout_secs: defaults::timeout(),
            user_agent: defaults::user_agent(),
        }
    }
}

mod defaults {
    pub fn max_attempts() -> u32 {
        5
    }
    pub fn retry_backoff() -> u64 {
        5 * 60
    }
    pub fn corruption_backoff() -> u64 {
        30 * 60
    }
    pub fn timeout() -> u64 {
        120
    }
    pub fn user_agent() -> String {
        format!(
            "{}/{} (+{})",
            env!("CARGO_PKG_NAME"),
            env!("CARGO_PKG_VERSION"),
            env!("CARGO_PKG_REPOSITORY")
        )
    }
}
