use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::pipeline::{FeedReport, RunStats};

/// Everything a run did, in the order the feeds were scanned.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct RunReport {
    pub now: DateTime<Utc>,
    pub cutoff: DateTime<Utc>,
    pub window_minutes: u64,
    pub max_posts: u64,
    pub dry_run: bool,
    pub feeds: Vec<FeedReport>,
    pub totals: RunStats,
}

impl RunReport {
    pub fn errors(&self) -> impl Iterator<Item = &str> {
        self.feeds.iter().flat_map(|f| f.errors.iter().map(String::as_str))
    }

    /// Plain-text summary, also used as the webhook summary message.
    pub fn render_text(&self) -> String {
        let mut lines: Vec<String> = vec![format!(
            "[DEBUG] Feed scan summary\n\
             - now(UTC): {}\n\
             - window  : last {} min\n\
             - dry_run : {}\n\
             - max_posts: {}\n\
             - feeds   : {}",
            self.now.format("%Y-%m-%d %H:%M"),
            self.window_minutes,
            self.dry_run,
            self.max_posts,
            self.feeds.len(),
        )];

        for (idx, feed) in self.feeds.iter().enumerate() {
            let s = &feed.stats;
            lines.push(format!(
                "{}) {}\n   result: total={}, in_window={}, posted={}, skipped(no_date={}, old={}), errors={}",
                idx + 1, feed.url, s.total, s.in_window, s.posted, s.skipped_no_date, s.skipped_old, s.errors
            ));
        }

        lines.push(format!("\n[DEBUG] posted(total) = {}", self.totals.total_posted));

        let errors: Vec<&str> = self.errors().collect();
        if !errors.is_empty() {
            lines.push("\n[DEBUG] errors:".to_string());
            lines.extend(errors.into_iter().map(|e| format!("- {e}")));
        }
        lines.join("\n")
    }
}
