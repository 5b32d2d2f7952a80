// src/config.rs
use std::time::Duration;

use thiserror::Error;
use url::Url;

use crate::output::config::OutputConfig;

pub const DEFAULT_WINDOW_MIN: u64 = 1440;
pub const DEFAULT_MAX_POSTS: u64 = 30;
pub const DEFAULT_POST_DELAY_MS: u64 = 300;
pub const DEFAULT_FETCH_TIMEOUT_SECS: u64 = 30;
pub const DEFAULT_POST_TIMEOUT_SECS: u64 = 20;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("SLACK_WEBHOOK_URL is not set")]
    MissingWebhook,
    #[error("SLACK_WEBHOOK_URL is not a valid URL: {0}")]
    InvalidWebhook(String),
    #[error("{key} must be a non-negative integer, got {value:?}")]
    InvalidNumber { key: &'static str, value: String },
}

impl ConfigError {
    /// Process exit code for a configuration failure.
    pub fn exit_code(&self) -> u8 {
        match self {
            ConfigError::MissingWebhook => 1,
            ConfigError::InvalidWebhook(_) | ConfigError::InvalidNumber { .. } => 2,
        }
    }
}

/// Immutable snapshot of everything a run needs. Built once in `main`.
#[derive(Clone, Debug, PartialEq)]
pub struct RunConfig {
    pub feed_urls: Vec<String>,
    pub webhook_url: String,
    pub window_minutes: u64,
    pub max_posts: u64,
    pub dry_run: bool,
    pub post_summary: bool,
    pub post_delay: Duration,
    pub fetch_timeout: Duration,
    pub post_timeout: Duration,
    pub output: OutputConfig,
}

/// Command-line values that win over the environment.
#[derive(Clone, Debug, Default)]
pub struct Overrides {
    pub dry_run: bool,
    pub window_minutes: Option<u64>,
    pub max_posts: Option<u64>,
    pub no_summary_post: bool,
    pub json: bool,
}

impl RunConfig {
    pub fn from_env(overrides: &Overrides) -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok(), overrides)
    }

    pub fn from_lookup<F>(lookup: F, overrides: &Overrides) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).map(|v| v.trim().to_string()).unwrap_or_default();

        let webhook_url = get("SLACK_WEBHOOK_URL");
        if webhook_url.is_empty() {
            return Err(ConfigError::MissingWebhook);
        }
        Url::parse(&webhook_url).map_err(|e| ConfigError::InvalidWebhook(e.to_string()))?;

        let feed_urls = split_feed_urls(&get("FEED_URLS"));

        let window_minutes = match overrides.window_minutes {
            Some(v) => v,
            None => parse_u64("POST_WINDOW_MIN", &get("POST_WINDOW_MIN"), DEFAULT_WINDOW_MIN)?,
        };
        let max_posts = match overrides.max_posts {
            Some(v) => v,
            None => parse_u64("MAX_POSTS", &get("MAX_POSTS"), DEFAULT_MAX_POSTS)?,
        };
        let post_delay_ms = parse_u64("POST_DELAY_MS", &get("POST_DELAY_MS"), DEFAULT_POST_DELAY_MS)?;
        let fetch_timeout = parse_u64("FETCH_TIMEOUT_SECS", &get("FETCH_TIMEOUT_SECS"), DEFAULT_FETCH_TIMEOUT_SECS)?;
        let post_timeout = parse_u64("POST_TIMEOUT_SECS", &get("POST_TIMEOUT_SECS"), DEFAULT_POST_TIMEOUT_SECS)?;

        let dry_run = overrides.dry_run || is_truthy(&get("DRY_RUN"));
        let post_summary = !overrides.no_summary_post && parse_flag(&get("POST_SUMMARY"), true);

        let mut output = OutputConfig::from_lookup(&lookup);
        if overrides.json {
            output = output.json();
        }

        Ok(RunConfig {
            feed_urls,
            webhook_url,
            window_minutes,
            max_posts,
            dry_run,
            post_summary,
            post_delay: Duration::from_millis(post_delay_ms),
            fetch_timeout: Duration::from_secs(fetch_timeout),
            post_timeout: Duration::from_secs(post_timeout),
            output,
        })
    }
}

pub fn split_feed_urls(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .collect()
}

/// `1`, `true`, `yes`, `on` (any case) are true; everything else is false.
pub fn is_truthy(raw: &str) -> bool {
    matches!(raw.trim().to_ascii_lowercase().as_str(), "1" | "true" | "yes" | "on")
}

fn parse_flag(raw: &str, default: bool) -> bool {
    if raw.is_empty() { return default; }
    match raw.to_ascii_lowercase().as_str() {
        "0" | "false" | "no" | "off" => false,
        other => is_truthy(other) || default,
    }
}

fn parse_u64(key: &'static str, raw: &str, default: u64) -> Result<u64, ConfigError> {
    if raw.is_empty() {
        return Ok(default);
    }
    raw.parse::<u64>()
        .map_err(|_| ConfigError::InvalidNumber { key, value: raw.to_string() })
}
