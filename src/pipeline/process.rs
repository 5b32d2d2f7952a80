use std::time::Duration;

use chrono::{DateTime, Utc};
use serde::Serialize;
use tracing::Instrument;

use crate::format::make_item_text;
use crate::ingestion::FeedSource;
use crate::telemetry;
use crate::telemetry::ops::scan::Phase as ScanPhase;
use crate::util::text::sanitize;
use crate::util::time::entry_published_at;
use crate::webhook::Poster;

use super::stats::{FeedStats, PostBudget};

/// What one feed contributed to the run.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct FeedReport { pub url: String, pub stats: FeedStats, pub errors: Vec<String> }

/// Scan one feed and post its in-window entries while the budget lasts.
///
/// Entries are inspected in feed order. Once the budget is spent the scan
/// keeps going: in-window entries are still counted, just not posted, so the
/// statistics always cover the whole feed. A failed fetch yields a report
/// with `errors = 1` and no entries; a failed post counts as an error and
/// leaves the budget untouched.
pub async fn process_feed(
    source: &dyn FeedSource,
    poster: &dyn Poster,
    url: &str,
    cutoff: DateTime<Utc>,
    budget: &mut PostBudget,
    post_delay: Duration,
) -> FeedReport {
    let log = telemetry::scan();
    let mut stats = FeedStats::default();
    let mut errors = Vec::new();

    let entries = match source.fetch_entries(url).await {
        Ok(entries) => entries,
        Err(e) => {
            stats.errors += 1;
            log.warn_kv("⚠️ feed failed", [("url", url.to_string()), ("error", e.to_string())]);
            errors.push(format!("{url} -> {e}"));
            return FeedReport { url: url.to_string(), stats, errors };
        }
    };
    stats.total = entries.len() as u64;

    for entry in &entries {
        let Some(published) = entry_published_at(entry) else {
            stats.skipped_no_date += 1;
            continue;
        };
        if published < cutoff {
            stats.skipped_old += 1;
            continue;
        }

        stats.in_window += 1;
        if budget.is_exhausted() {
            continue;
        }

        let summary = sanitize(entry.summary_source().unwrap_or(""));
        let text = make_item_text(entry, &summary);
        let title = entry.title().unwrap_or("").to_string();
        let outcome = poster
            .post(&text)
            .instrument(log.span_kv(&ScanPhase::Post, [("title", title.clone())]))
            .await;

        if outcome.ok {
            stats.posted += 1;
            budget.consume();
            log.debug_kv("➕ posted", [("title", title), ("remaining", budget.remaining().to_string())]);
            if !poster.is_dry_run() && !post_delay.is_zero() {
                tokio::time::sleep(post_delay).await;
            }
        } else {
            stats.errors += 1;
            log.warn_kv("⚠️ post failed", [
                ("title", title),
                ("status", outcome.status.to_string()),
                ("detail", outcome.detail.clone()),
            ]);
            errors.push(format!("{url} -> post failed: status={} {}", outcome.status, outcome.detail));
        }
    }

    FeedReport { url: url.to_string(), stats, errors }
}
