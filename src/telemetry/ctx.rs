use std::marker::PhantomData;
use tracing::{debug, error, info, warn, Span};

use crate::pipeline::{FeedStats, RunStats};
use crate::telemetry::ops::scan::Scan;

pub trait PhaseSpan {
    fn name(&self) -> &'static str;
    fn span(&self) -> Span;
}

pub trait OpMarker {
    const NAME: &'static str;
    type Phase: PhaseSpan;
    fn root_span() -> Span;
}

#[derive(Clone, Copy, Debug)]
enum Severity {
    Debug,
    Info,
    Warn,
    Error,
}

// JSON lines carry `op` and `details` as fields; compact lines append details to the message.
macro_rules! emit_at {
    ($level:ident, $json:expr, $op:expr, $msg:expr, $details:expr) => {
        match ($json, $details.is_empty()) {
            (true, true) => $level!(op = %$op, "{}", $msg),
            (true, false) => $level!(op = %$op, details = %$details, "{}", $msg),
            (false, true) => $level!("{}", $msg),
            (false, false) => $level!("{} {}", $msg, $details),
        }
    };
}

/// Logging handle for one operation. `json` is read from the environment once per handle.
pub struct LogCtx<O: OpMarker> {
    pub(crate) json: bool,
    pub(crate) _marker: PhantomData<O>,
}

impl<O: OpMarker> LogCtx<O> {
    /// Root span of the operation; logs `start` with the given fields.
    pub fn root_span_kv<'a, T>(&self, fields: T) -> Span
    where
        T: IntoIterator<Item = (&'a str, String)>,
    {
        self.emit(Severity::Info, "start", kv_to_string(fields));
        O::root_span()
    }

    pub fn span(&self, ph: &O::Phase) -> Span { ph.span() }

    pub fn span_kv<'a, T>(&self, ph: &O::Phase, fields: T) -> Span
    where
        T: IntoIterator<Item = (&'a str, String)>,
    {
        let details = kv_to_string(fields);
        debug!(op = O::NAME, phase = ph.name(), details = %details, "span_start");
        ph.span()
    }

    pub fn info(&self, msg: impl AsRef<str>) { self.emit(Severity::Info, msg.as_ref(), String::new()) }
    pub fn error(&self, msg: impl AsRef<str>) { self.emit(Severity::Error, msg.as_ref(), String::new()) }

    pub fn debug_kv<'a, D>(&self, msg: &str, kv: D)
    where
        D: IntoIterator<Item = (&'a str, String)>,
    {
        self.emit(Severity::Debug, msg, kv_to_string(kv))
    }

    pub fn info_kv<'a, D>(&self, msg: &str, kv: D)
    where
        D: IntoIterator<Item = (&'a str, String)>,
    {
        self.emit(Severity::Info, msg, kv_to_string(kv))
    }

    pub fn warn_kv<'a, D>(&self, msg: &str, kv: D)
    where
        D: IntoIterator<Item = (&'a str, String)>,
    {
        self.emit(Severity::Warn, msg, kv_to_string(kv))
    }

    fn emit(&self, severity: Severity, msg: &str, details: String) {
        match severity {
            Severity::Debug => emit_at!(debug, self.json, O::NAME, msg, details),
            Severity::Info => emit_at!(info, self.json, O::NAME, msg, details),
            Severity::Warn => emit_at!(warn, self.json, O::NAME, msg, details),
            Severity::Error => emit_at!(error, self.json, O::NAME, msg, details),
        }
    }
}

// Scan-specific helpers
impl LogCtx<Scan> {
    pub fn feed_summary(&self, url: &str, s: &FeedStats) {
        if self.json { info!(op = Scan::NAME, url, total = s.total, in_window = s.in_window, posted = s.posted, skipped_no_date = s.skipped_no_date, skipped_old = s.skipped_old, errors = s.errors, "feed_summary"); }
        else { info!("✅ Feed {} — total={} in_window={} posted={} skipped(no_date={}, old={}) errors={}", url, s.total, s.in_window, s.posted, s.skipped_no_date, s.skipped_old, s.errors); }
    }

    pub fn totals(&self, s: &RunStats) {
        if self.json { info!(op = Scan::NAME, feeds = s.feeds, total = s.total, in_window = s.in_window, posted = s.total_posted, skipped_no_date = s.skipped_no_date, skipped_old = s.skipped_old, errors = s.errors, "scan_totals"); }
        else { info!("📊 Scan totals — feeds={} total={} in_window={} posted={} skipped(no_date={}, old={}) errors={}", s.feeds, s.total, s.in_window, s.total_posted, s.skipped_no_date, s.skipped_old, s.errors); }
    }
}

fn kv_to_string<'a, T>(kv: T) -> String
where
    T: IntoIterator<Item = (&'a str, String)>,
{
    let mut parts: Vec<String> = Vec::new();
    for (k, v) in kv { parts.push(format!("{}={}", k, v)); }
    parts.join(" ")
}
