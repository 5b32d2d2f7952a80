use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use tracing::Instrument;

use crate::entry::FeedEntry;
use crate::telemetry;
use crate::telemetry::ops::scan::Phase as ScanPhase;

mod fetch;
mod parse;
mod types;

pub use parse::parse_entries;
pub use types::FetchError;

const USER_AGENT: &str = concat!("feedpost/", env!("CARGO_PKG_VERSION"));

/// Where feed entries come from. One call per feed per run.
#[async_trait]
pub trait FeedSource: Send + Sync {
    async fn fetch_entries(&self, url: &str) -> Result<Vec<FeedEntry>, FetchError>;
}

/// Fetches over HTTP GET and parses the body as RSS or Atom.
pub struct HttpFeedSource {
    client: Client,
}

impl HttpFeedSource {
    pub fn new(timeout: Duration) -> Result<Self, FetchError> {
        let client = Client::builder()
            .user_agent(USER_AGENT)
            .timeout(timeout)
            .build()?;
        Ok(Self { client })
    }
}

#[async_trait]
impl FeedSource for HttpFeedSource {
    async fn fetch_entries(&self, url: &str) -> Result<Vec<FeedEntry>, FetchError> {
        let log = telemetry::scan();
        let body = fetch::fetch_feed(&self.client, url)
            .instrument(log.span(&ScanPhase::Fetch))
            .await?;
        log.debug_kv("fetched", [("url", url.to_string()), ("bytes", body.len().to_string())]);

        let _s = log.span(&ScanPhase::Parse).entered();
        parse_entries(&body)
    }
}


#[cfg(test)]
mod tests {
    use super::*;

    const RSS: &str = r#"<?xml version="1.0"?>
<rss version="2.0"><channel><title>t</title><link>https://x.example</link><description>d</description>
<item><title>One</title><link>https://x.example/1</link><pubDate>Mon, 01 Jan 2024 12:00:00 GMT</pubDate></item>
</channel></rss>"#;

    #[tokio::test]
    async fn http_source_fetches_and_parses() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("GET", "/feed.xml")
            .with_status(200)
            .with_header("content-type", "application/rss+xml")
            .with_body(RSS)
            .create_async()
            .await;

        let source = HttpFeedSource::new(Duration::from_secs(5)).unwrap();
        let entries = source
            .fetch_entries(&format!("{}/feed.xml", server.url()))
            .await
            .unwrap();

        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].title.as_deref(), Some("One"));
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn http_source_reports_non_success_status() {
        let mut server = mockito::Server::new_async().await;
        let _mock = server
            .mock("GET", "/gone.xml")
            .with_status(404)
            .create_async()
            .await;

        let source = HttpFeedSource::new(Duration::from_secs(5)).unwrap();
        let err = source
            .fetch_entries(&format!("{}/gone.xml", server.url()))
            .await
            .unwrap_err();
        assert!(matches!(err, FetchError::Status(s) if s.as_u16() == 404));
    }

    #[tokio::test]
    async fn http_source_rejects_malformed_url() {
        let source = HttpFeedSource::new(Duration::from_secs(5)).unwrap();
        let err = source.fetch_entries("not a url").await.unwrap_err();
        assert!(matches!(err, FetchError::InvalidUrl(_)));
    }
}
