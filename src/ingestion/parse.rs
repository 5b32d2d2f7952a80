use chrono::{DateTime, Datelike, Timelike, Utc};
use rss::{Channel, Item};

use crate::entry::{FeedEntry, TimeTuple};

use super::types::FetchError;

/// Entries of an RSS 2.0 channel, or of anything else `feed-rs` can read
/// (Atom, RSS 0.9x/1.0, JSON Feed). Native order is preserved.
pub fn parse_entries(body: &[u8]) -> Result<Vec<FeedEntry>, FetchError> {
    if let Ok(channel) = Channel::read_from(body) {
        return Ok(channel.items().iter().map(entry_from_rss_item).collect());
    }
    let feed = feed_rs::parser::parse(body)
        .map_err(|e| FetchError::Parse(e.to_string()))?;
    Ok(feed.entries.into_iter().map(entry_from_feed_rs).collect())
}

// RSS dates stay as text; the normalizer decides how to read them.
fn entry_from_rss_item(item: &Item) -> FeedEntry {
    let link = item.link().map(str::to_string).or_else(|| {
        item.guid()
            .filter(|g| g.is_permalink())
            .map(|g| g.value().to_string())
    });
    let dc_date = item
        .dublin_core_ext()
        .and_then(|dc| dc.dates().first().cloned());

    FeedEntry {
        title: item.title().map(str::to_string),
        link,
        summary: item.description().map(str::to_string),
        description: item.content().map(str::to_string),
        published: item.pub_date().map(str::to_string),
        updated: dc_date,
        created: None,
        published_parsed: None,
        updated_parsed: None,
    }
}

// feed-rs already resolved the dates to UTC, so they travel as tuples.
fn entry_from_feed_rs(entry: feed_rs::model::Entry) -> FeedEntry {
    FeedEntry {
        title: entry.title.map(|t| t.content),
        link: entry.links.first().map(|l| l.href.clone()),
        summary: entry.summary.map(|s| s.content),
        description: entry.content.and_then(|c| c.body),
        published: None,
        updated: None,
        created: None,
        published_parsed: entry.published.map(time_tuple),
        updated_parsed: entry.updated.map(time_tuple),
    }
}

/// `[year, month, day, hour, minute, second, weekday, yearday, 0]`
fn time_tuple(dt: DateTime<Utc>) -> TimeTuple {
    vec![
        i64::from(dt.year()),
        i64::from(dt.month()),
        i64::from(dt.day()),
        i64::from(dt.hour()),
        i64::from(dt.minute()),
        i64::from(dt.second()),
        i64::from(dt.weekday().num_days_from_monday()),
        i64::from(dt.ordinal()),
        0,
    ]
}
