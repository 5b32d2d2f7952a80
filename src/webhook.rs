use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client as HttpClient;
use serde::Serialize;

use crate::util::text::truncate_chars;

/// Status reported when the request never produced an HTTP response.
pub const TRANSPORT_FAILURE: i32 = -1;
pub const DETAIL_MAX_CHARS: usize = 200;

/// Result of one post attempt. Failures are values, never errors.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct PostOutcome {
    pub ok: bool,
    pub status: i32,
    pub detail: String,
}

impl PostOutcome {
    pub fn simulated() -> Self {
        Self { ok: true, status: 0, detail: "dry-run".to_string() }
    }

    pub fn transport(err: impl std::fmt::Display) -> Self {
        Self { ok: false, status: TRANSPORT_FAILURE, detail: excerpt(&err.to_string()) }
    }
}

#[async_trait]
pub trait Poster: Send + Sync {
    async fn post(&self, text: &str) -> PostOutcome;

    /// True when `post` never touches the network.
    fn is_dry_run(&self) -> bool { false }
}

#[derive(Serialize)]
struct WebhookPayload<'a> {
    text: &'a str,
}

/// Slack-style incoming webhook: `POST {"text": ...}`, 2xx is success.
#[derive(Clone)]
pub struct WebhookClient {
    http: HttpClient,
    url: String,
}

impl WebhookClient {
    pub fn new(url: impl Into<String>, timeout: Duration) -> Result<Self, reqwest::Error> {
        let http = HttpClient::builder().timeout(timeout).build()?;
        Ok(Self { http, url: url.into() })
    }
}

#[async_trait]
impl Poster for WebhookClient {
    async fn post(&self, text: &str) -> PostOutcome {
        let resp = match self.http.post(&self.url).json(&WebhookPayload { text }).send().await {
            Ok(resp) => resp,
            Err(e) => return PostOutcome::transport(e),
        };
        let status = resp.status();
        let body = resp.text().await.unwrap_or_default();
        PostOutcome {
            ok: status.is_success(),
            status: i32::from(status.as_u16()),
            detail: excerpt(&body),
        }
    }
}

/// Accepts every message without sending it.
#[derive(Clone, Copy, Debug, Default)]
pub struct DryRunPoster;

#[async_trait]
impl Poster for DryRunPoster {
    async fn post(&self, _text: &str) -> PostOutcome { PostOutcome::simulated() }

    fn is_dry_run(&self) -> bool { true }
}

fn excerpt(s: &str) -> String {
    truncate_chars(s.trim(), DETAIL_MAX_CHARS)
}


#[cfg(test)]
mod tests {
    use super::*;
    use mockito::Matcher;
    use serde_json::json;

    #[tokio::test]
    async fn posts_json_text_payload() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("POST", "/services/T/B/X")
            .match_header("content-type", "application/json")
            .match_body(Matcher::Json(json!({"text": "*New:* hello\nhttps://x"})))
            .with_status(200)
            .with_body("ok")
            .create_async()
            .await;

        let client = WebhookClient::new(format!("{}/services/T/B/X", server.url()), Duration::from_secs(5)).unwrap();
        let out = client.post("*New:* hello\nhttps://x").await;

        assert_eq!(out, PostOutcome { ok: true, status: 200, detail: "ok".into() });
        assert!(!client.is_dry_run());
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn non_2xx_is_a_failure_with_body_excerpt() {
        let mut server = mockito::Server::new_async().await;
        let long_body = format!("invalid_payload {}", "z".repeat(500));
        let _mock = server
            .mock("POST", "/hook")
            .with_status(400)
            .with_body(&long_body)
            .create_async()
            .await;

        let client = WebhookClient::new(format!("{}/hook", server.url()), Duration::from_secs(5)).unwrap();
        let out = client.post("x").await;

        assert!(!out.ok);
        assert_eq!(out.status, 400);
        assert!(out.detail.starts_with("invalid_payload"));
        assert_eq!(out.detail.chars().count(), DETAIL_MAX_CHARS + 1);
    }

    #[tokio::test]
    async fn transport_error_is_captured_not_raised() {
        // nothing listens on port 9 of the loopback
        let client = WebhookClient::new("http://127.0.0.1:9/hook", Duration::from_secs(2)).unwrap();
        let out = client.post("x").await;
        assert!(!out.ok);
        assert_eq!(out.status, TRANSPORT_FAILURE);
        assert!(!out.detail.is_empty());
    }

    #[tokio::test]
    async fn dry_run_always_succeeds() {
        let p = DryRunPoster;
        let out = p.post("anything").await;
        assert!(out.ok);
        assert!(p.is_dry_run());
    }
}
