use chrono::{DateTime, Utc};
use serde::Serialize;
use uuid::Uuid;

use crate::report::RunReport;

pub const SCHEMA_VERSION: &str = "feedpost.v1";

#[derive(Debug, Clone, Serialize, Default)]
pub struct Meta {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub duration_ms: Option<u128>,
}

/// The report under the key that says whether anything was sent.
#[derive(Debug, Clone, Copy, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Payload<'a> {
    Plan(&'a RunReport),
    Result(&'a RunReport),
}

/// One JSON document per run: `plan` with `apply=false` for dry runs,
/// `result` with `apply=true` otherwise.
#[derive(Debug, Clone, Serialize)]
pub struct Envelope<'a> {
    pub schema_version: &'static str,
    pub time: DateTime<Utc>,
    pub request_id: Uuid,
    pub op: &'static str,
    pub apply: bool,
    #[serde(flatten)]
    pub payload: Payload<'a>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub meta: Option<Meta>,
}

impl<'a> Envelope<'a> {
    pub fn for_run(op: &'static str, report: &'a RunReport, dry_run: bool, meta: Option<Meta>) -> Self {
        let payload = if dry_run { Payload::Plan(report) } else { Payload::Result(report) };
        Envelope {
            schema_version: SCHEMA_VERSION,
            time: Utc::now(),
            request_id: Uuid::new_v4(),
            op,
            apply: !dry_run,
            payload,
            meta,
        }
    }
}

#[cfg(test)]
pub(crate) mod fixtures {
    use chrono::TimeZone;

    use super::*;
    use crate::pipeline::{FeedReport, FeedStats, RunStats};

    pub fn run_report(dry_run: bool) -> RunReport {
        let stats = FeedStats { total: 3, in_window: 2, posted: 1, skipped_no_date: 1, ..Default::default() };
        let mut totals = RunStats::default();
        totals.absorb(&stats);
        RunReport {
            now: Utc.with_ymd_and_hms(2024, 1, 1, 12, 0, 0).unwrap(),
            cutoff: Utc.with_ymd_and_hms(2023, 12, 31, 12, 0, 0).unwrap(),
            window_minutes: 1440,
            max_posts: 30,
            dry_run,
            feeds: vec![FeedReport { url: "https://a.example/rss".into(), stats, errors: vec![] }],
            totals,
        }
    }
}
