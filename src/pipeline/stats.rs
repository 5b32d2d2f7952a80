use serde::Serialize;

/// Per-feed counters. `total = in_window + skipped_no_date + skipped_old`;
/// `errors` is tallied on its own.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize)]
pub struct FeedStats { pub total: u64, pub in_window: u64, pub posted: u64, pub skipped_no_date: u64, pub skipped_old: u64, pub errors: u64 }

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize)]
pub struct RunStats { pub feeds: u64, pub total: u64, pub in_window: u64, pub total_posted: u64, pub skipped_no_date: u64, pub skipped_old: u64, pub errors: u64 }

impl RunStats {
    pub fn absorb(&mut self, feed: &FeedStats) {
        self.feeds += 1;
        self.total += feed.total;
        self.in_window += feed.in_window;
        self.total_posted += feed.posted;
        self.skipped_no_date += feed.skipped_no_date;
        self.skipped_old += feed.skipped_old;
        self.errors += feed.errors;
    }
}

/// Global cap on posts for one run, shared by every feed in order.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct PostBudget {
    max: u64,
    used: u64,
}

impl PostBudget {
    pub fn new(max: u64) -> Self { Self { max, used: 0 } }

    pub fn remaining(&self) -> u64 { self.max.saturating_sub(self.used) }

    pub fn is_exhausted(&self) -> bool { self.remaining() == 0 }

    /// Record one successful post. No-op once the cap is reached.
    pub fn consume(&mut self) {
        if !self.is_exhausted() {
            self.used += 1;
        }
    }
}
