// src/scan.rs
use std::io::{self, Write};
use std::time::Instant;

use anyhow::Result;
use chrono::{DateTime, Utc};
use tracing::Instrument;

use crate::config::RunConfig;
use crate::ingestion::{FeedSource, HttpFeedSource};
use crate::output::Emitter;
use crate::output::types::{Envelope, Meta};
use crate::pipeline::{process_feed, PostBudget, RunStats};
use crate::report::RunReport;
use crate::telemetry;
use crate::telemetry::ctx::OpMarker;
use crate::telemetry::ops::scan::{Phase as ScanPhase, Scan};
use crate::util::time::window_cutoff;
use crate::webhook::{DryRunPoster, Poster, WebhookClient};

/// Exit code when the run itself breaks (client setup, writing the summary).
/// Feed and post failures never reach this.
pub const RUN_FAILURE_EXIT: u8 = 3;

/// Scan every configured feed in order and tally the outcome.
pub async fn scan_feeds(
    cfg: &RunConfig,
    source: &dyn FeedSource,
    poster: &dyn Poster,
    now: DateTime<Utc>,
) -> RunReport {
    let log = telemetry::scan();
    let cutoff = window_cutoff(now, cfg.window_minutes);
    let mut budget = PostBudget::new(cfg.max_posts);
    let mut totals = RunStats::default();
    let mut feeds = Vec::with_capacity(cfg.feed_urls.len());

    for url in &cfg.feed_urls {
        let span = log.span_kv(&ScanPhase::Feed, [("url", url.clone())]);
        let report = process_feed(source, poster, url, cutoff, &mut budget, cfg.post_delay)
            .instrument(span)
            .await;
        log.feed_summary(url, &report.stats);
        totals.absorb(&report.stats);
        feeds.push(report);
    }
    log.totals(&totals);

    RunReport {
        now,
        cutoff,
        window_minutes: cfg.window_minutes,
        max_posts: cfg.max_posts,
        dry_run: cfg.dry_run,
        feeds,
        totals,
    }
}

/// Full run against the given collaborators: scan, optionally post the
/// summary, then write it to `out`. `None` when no feeds are configured.
pub async fn execute(
    cfg: &RunConfig,
    source: &dyn FeedSource,
    poster: &dyn Poster,
    summary_poster: Option<&dyn Poster>,
    out: &mut dyn Write,
) -> Result<Option<RunReport>> {
    let log = telemetry::scan();
    let root = log.root_span_kv([
        ("feeds", cfg.feed_urls.len().to_string()),
        ("window_min", cfg.window_minutes.to_string()),
        ("max_posts", cfg.max_posts.to_string()),
        ("dry_run", cfg.dry_run.to_string()),
    ]);

    if cfg.feed_urls.is_empty() {
        log.info("ℹ️  No feeds configured (FEED_URLS is empty); nothing to do");
        return Ok(None);
    }

    let started = Instant::now();
    let report = scan_feeds(cfg, source, poster, Utc::now()).instrument(root).await;
    let text = report.render_text();

    if let Some(summary_poster) = summary_poster {
        let outcome = summary_poster
            .post(&text)
            .instrument(log.span(&ScanPhase::Summary))
            .await;
        if outcome.ok {
            log.info_kv("📨 summary posted", [("status", outcome.status.to_string())]);
        } else {
            log.warn_kv("⚠️ summary post failed", [
                ("status", outcome.status.to_string()),
                ("detail", outcome.detail),
            ]);
        }
    }

    let meta = Some(Meta { duration_ms: Some(started.elapsed().as_millis()) });
    let env = Envelope::for_run(Scan::NAME, &report, cfg.dry_run, meta);
    Emitter::new(cfg.output).emit_to(&env, &text, out)?;

    Ok(Some(report))
}

/// Wire the HTTP feed source and webhook client from `cfg` and run once.
pub async fn run(cfg: &RunConfig) -> Result<Option<RunReport>> {
    let log = telemetry::scan();
    let source = HttpFeedSource::new(cfg.fetch_timeout)?;
    let webhook = WebhookClient::new(cfg.webhook_url.clone(), cfg.post_timeout)?;

    let poster: &dyn Poster = if cfg.dry_run {
        log.info("🧪 Dry run: entries are counted but not sent");
        &DryRunPoster
    } else {
        &webhook
    };
    // the summary goes out even on dry runs unless POST_SUMMARY is off
    let summary_poster: Option<&dyn Poster> = cfg.post_summary.then_some(&webhook as &dyn Poster);

    let mut stdout = io::stdout();
    execute(cfg, &source, poster, summary_poster, &mut stdout).await
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{ConfigError, Overrides};
    use crate::entry::FeedEntry;
    use crate::ingestion::fakes::StaticSource;
    use crate::webhook::fakes::RecordingPoster;
    use std::collections::HashMap;

    fn config(pairs: &[(&str, &str)]) -> RunConfig {
        let mut map: HashMap<String, String> =
            [("SLACK_WEBHOOK_URL", "https://hooks.example/x"), ("POST_DELAY_MS", "0")]
                .iter()
                .map(|(k, v)| (k.to_string(), v.to_string()))
                .collect();
        for (k, v) in pairs {
            map.insert(k.to_string(), v.to_string());
        }
        RunConfig::from_lookup(|k| map.get(k).cloned(), &Overrides::default()).unwrap()
    }

    fn recent(title: &str) -> FeedEntry {
        FeedEntry {
            title: Some(title.into()),
            link: Some(format!("https://blog.example/{title}")),
            published: Some((Utc::now() - chrono::Duration::minutes(5)).to_rfc3339()),
            ..Default::default()
        }
    }

    #[tokio::test]
    async fn cap_is_global_across_feeds() {
        let cfg = config(&[("FEED_URLS", "https://a.example/rss,https://b.example/rss"), ("MAX_POSTS", "3")]);
        let source = StaticSource::default()
            .with_feed("https://a.example/rss", vec![recent("a1"), recent("a2")])
            .with_feed("https://b.example/rss", vec![recent("b1"), recent("b2")]);
        let poster = RecordingPoster::new();

        let report = scan_feeds(&cfg, &source, &poster, Utc::now()).await;

        assert_eq!(report.totals.total_posted, 3);
        assert_eq!(report.totals.in_window, 4);
        assert_eq!(report.feeds[0].stats.posted, 2);
        assert_eq!(report.feeds[1].stats.posted, 1);
        assert_eq!(source.calls(), vec!["https://a.example/rss", "https://b.example/rss"]);
        let sum: u64 = report.feeds.iter().map(|f| f.stats.posted).sum();
        assert!(sum <= cfg.max_posts);
    }

    #[tokio::test]
    async fn failing_feed_does_not_stop_the_run() {
        let cfg = config(&[("FEED_URLS", "https://down.example/rss,https://ok.example/rss")]);
        let source = StaticSource::default().with_feed("https://ok.example/rss", vec![recent("x")]);
        let poster = RecordingPoster::new();
        let summary = RecordingPoster::new();
        let mut out: Vec<u8> = Vec::new();

        let report = execute(&cfg, &source, &poster, Some(&summary), &mut out)
            .await
            .unwrap()
            .unwrap();

        let down = &report.feeds[0].stats;
        assert_eq!((down.total, down.in_window, down.posted, down.errors), (0, 0, 0, 1));
        assert_eq!(report.feeds[1].stats.posted, 1);
        assert_eq!(report.totals.errors, 1);

        let printed = String::from_utf8(out).unwrap();
        assert!(printed.contains("[DEBUG] errors:"));
        assert!(printed.contains("- https://down.example/rss -> "));
        assert_eq!(summary.sent().len(), 1);
        assert_eq!(summary.sent()[0].trim_end(), printed.trim_end());
    }

    #[tokio::test]
    async fn empty_feed_list_is_a_no_op() {
        let cfg = config(&[]);
        let source = StaticSource::default();
        let poster = RecordingPoster::new();
        let summary = RecordingPoster::new();
        let mut out: Vec<u8> = Vec::new();

        let report = execute(&cfg, &source, &poster, Some(&summary), &mut out).await.unwrap();

        assert!(report.is_none());
        assert!(out.is_empty());
        assert!(summary.sent().is_empty());
        assert!(source.calls().is_empty());
    }

    #[tokio::test]
    async fn json_output_wraps_report_in_envelope() {
        let cfg = config(&[("FEED_URLS", "https://a.example/rss"), ("FEEDPOST_OUTPUT_FORMAT", "json")]);
        let source = StaticSource::default().with_feed("https://a.example/rss", vec![recent("a")]);
        let poster = RecordingPoster::new();
        let mut out: Vec<u8> = Vec::new();

        execute(&cfg, &source, &poster, None, &mut out).await.unwrap();

        let v: serde_json::Value = serde_json::from_slice(&out).unwrap();
        assert_eq!(v["op"], "scan");
        assert_eq!(v["apply"], true);
        assert_eq!(v["result"]["totals"]["total_posted"], 1);
        assert_eq!(v["result"]["feeds"][0]["url"], "https://a.example/rss");
    }

    struct ClosedPipe;

    impl Write for ClosedPipe {
        fn write(&mut self, _buf: &[u8]) -> io::Result<usize> {
            Err(io::Error::from(io::ErrorKind::BrokenPipe))
        }
        fn flush(&mut self) -> io::Result<()> {
            Ok(())
        }
    }

    #[tokio::test]
    async fn unwritable_output_fails_with_its_own_exit_code() {
        let cfg = config(&[("FEED_URLS", "https://a.example/rss")]);
        let source = StaticSource::default().with_feed("https://a.example/rss", vec![recent("a")]);
        let poster = RecordingPoster::new();

        let err = execute(&cfg, &source, &poster, None, &mut ClosedPipe).await.unwrap_err();
        let io_err = err.downcast_ref::<io::Error>().unwrap();
        assert_eq!(io_err.kind(), io::ErrorKind::BrokenPipe);

        let config_codes = [
            ConfigError::MissingWebhook.exit_code(),
            ConfigError::InvalidWebhook(String::new()).exit_code(),
            ConfigError::InvalidNumber { key: "MAX_POSTS", value: String::new() }.exit_code(),
        ];
        assert!(!config_codes.contains(&RUN_FAILURE_EXIT));
        assert_ne!(RUN_FAILURE_EXIT, 0);
    }

    #[tokio::test]
    async fn dry_run_sends_only_the_summary() {
        let mut server = mockito::Server::new_async().await;
        let hook = server
            .mock("POST", "/hook")
            .with_status(200)
            .with_body("ok")
            .expect(1)
            .create_async()
            .await;

        let webhook_url = format!("{}/hook", server.url());
        let cfg = config(&[
            ("FEED_URLS", "https://a.example/rss"),
            ("SLACK_WEBHOOK_URL", webhook_url.as_str()),
            ("DRY_RUN", "true"),
        ]);
        let source = StaticSource::default().with_feed("https://a.example/rss", vec![recent("a"), recent("b")]);
        let webhook = WebhookClient::new(cfg.webhook_url.clone(), cfg.post_timeout).unwrap();
        let mut out: Vec<u8> = Vec::new();

        let report = execute(&cfg, &source, &DryRunPoster, Some(&webhook), &mut out)
            .await
            .unwrap()
            .unwrap();

        assert!(report.dry_run);
        assert_eq!(report.totals.total_posted, 2);
        let printed = String::from_utf8(out).unwrap();
        assert!(printed.contains("- dry_run : true"));
        hook.assert_async().await;
    }
}
