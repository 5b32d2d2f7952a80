use tracing::Span;
use tracing::info_span;

use crate::telemetry::ctx::{OpMarker, PhaseSpan};

#[derive(Copy, Clone, Debug)]
pub struct Scan;

#[derive(Copy, Clone, Debug)]
pub enum Phase { Feed, Fetch, Parse, Post, Summary }

impl PhaseSpan for Phase {
    fn name(&self) -> &'static str { match self {
        Phase::Feed => "feed",
        Phase::Fetch => "fetch",
        Phase::Parse => "parse",
        Phase::Post => "post",
        Phase::Summary => "summary",
    }}
    fn span(&self) -> Span { match self {
        Phase::Feed => info_span!("feed"),
        Phase::Fetch => info_span!("fetch"),
        Phase::Parse => info_span!("parse"),
        Phase::Post => info_span!("post"),
        Phase::Summary => info_span!("summary"),
    }}
}

impl OpMarker for Scan {
    const NAME: &'static str = "scan";
    type Phase = Phase;
    fn root_span() -> Span { info_span!("scan") }
}
