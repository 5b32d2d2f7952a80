use chrono::{DateTime, Duration, NaiveDate, NaiveDateTime, TimeZone, Utc};

use crate::entry::FeedEntry;

// Offset-bearing layouts tried after RFC 2822 / RFC 3339.
const OFFSET_FORMATS: &[&str] = &[
    "%Y-%m-%dT%H:%M:%S%.f%z",
    "%Y-%m-%dT%H:%M%z",
    "%Y-%m-%d %H:%M:%S%.f%z",
    "%Y-%m-%d %H:%M:%S %z",
    "%a, %d %b %Y %H:%M %z",
    "%d %b %Y %H:%M:%S %z",
    "%a %b %d %H:%M:%S %z %Y",
];

// Layouts without a zone; the result is taken as UTC.
const NAIVE_FORMATS: &[&str] = &[
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%dT%H:%M",
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%d %H:%M",
    "%Y/%m/%d %H:%M:%S",
    "%Y/%m/%d %H:%M",
    "%a, %d %b %Y %H:%M:%S",
    "%a, %d %b %Y %H:%M",
    "%d %b %Y %H:%M:%S",
    "%d %B %Y %H:%M:%S",
    "%B %d, %Y %H:%M:%S",
    "%B %d, %Y %H:%M",
    "%b %d, %Y %H:%M",
    "%A, %d-%b-%y %H:%M:%S",
    "%a %b %e %H:%M:%S %Y",
    "%Y%m%dT%H%M%S",
];

const DATE_FORMATS: &[&str] = &[
    "%Y-%m-%d",
    "%Y/%m/%d",
    "%d %b %Y",
    "%d %B %Y",
    "%b %d, %Y",
    "%B %d, %Y",
    "%a, %d %b %Y",
];

/// Earliest instant still inside a trailing window of `minutes` ending at `now`.
pub fn window_cutoff(now: DateTime<Utc>, minutes: u64) -> DateTime<Utc> {
    let Some(window) = i64::try_from(minutes).ok().and_then(Duration::try_minutes) else {
        return DateTime::<Utc>::MIN_UTC;
    };
    now.checked_sub_signed(window).unwrap_or(DateTime::<Utc>::MIN_UTC)
}

/// Publication instant of an entry, or `None` when no field yields one.
///
/// Structured tuples (`published_parsed`, `updated_parsed`) win over the
/// free-text fields (`published`, `updated`, `created`). A candidate that
/// fails to convert is skipped, never reported.
pub fn entry_published_at(entry: &FeedEntry) -> Option<DateTime<Utc>> {
    let structured = [&entry.published_parsed, &entry.updated_parsed];
    if let Some(dt) = structured.into_iter().flatten().find_map(|t| from_time_tuple(t)) {
        return Some(dt);
    }

    let text = [&entry.published, &entry.updated, &entry.created];
    text.into_iter()
        .flatten()
        .filter(|s| !s.trim().is_empty())
        .find_map(|s| parse_date_text(s))
}

/// UTC instant from the first six components of a broken-down time.
pub fn from_time_tuple(t: &[i64]) -> Option<DateTime<Utc>> {
    let [year, month, day, hour, minute, second, ..] = t else { return None };
    let date = NaiveDate::from_ymd_opt(
        i32::try_from(*year).ok()?,
        u32::try_from(*month).ok()?,
        u32::try_from(*day).ok()?,
    )?;
    let dt = date.and_hms_opt(
        u32::try_from(*hour).ok()?,
        u32::try_from(*minute).ok()?,
        u32::try_from(*second).ok()?,
    )?;
    Some(Utc.from_utc_datetime(&dt))
}

/// Best-effort parse of a free-text date. Zoned input is converted to UTC;
/// zone-less input is read as UTC.
pub fn parse_date_text(raw: &str) -> Option<DateTime<Utc>> {
    let s = raw.trim();
    if s.is_empty() {
        return None;
    }

    if let Ok(dt) = DateTime::parse_from_rfc2822(s) {
        return Some(dt.with_timezone(&Utc));
    }
    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Some(dt.with_timezone(&Utc));
    }
    for fmt in OFFSET_FORMATS {
        if let Ok(dt) = DateTime::parse_from_str(s, fmt) {
            return Some(dt.with_timezone(&Utc));
        }
    }

    // "... UTC" / "... GMT" / trailing "Z" name the zone without an offset
    if let Some(dt) = parse_as_utc(strip_utc_suffix(s)) {
        return Some(dt);
    }
    // unknown zone names ("JST", "KST") are dropped and the rest read as UTC
    strip_zone_name(s).and_then(parse_as_utc)
}

fn parse_as_utc(s: &str) -> Option<DateTime<Utc>> {
    for fmt in NAIVE_FORMATS {
        if let Ok(ndt) = NaiveDateTime::parse_from_str(s, fmt) {
            return Some(Utc.from_utc_datetime(&ndt));
        }
    }
    DATE_FORMATS
        .iter()
        .find_map(|fmt| NaiveDate::parse_from_str(s, fmt).ok())
        .and_then(|nd| nd.and_hms_opt(0, 0, 0))
        .map(|ndt| Utc.from_utc_datetime(&ndt))
}

fn strip_zone_name(s: &str) -> Option<&str> {
    let (head, zone) = s.rsplit_once(char::is_whitespace)?;
    let is_zone = (1..=5).contains(&zone.len()) && zone.chars().all(|c| c.is_ascii_alphabetic());
    is_zone.then(|| head.trim_end())
}

fn strip_utc_suffix(s: &str) -> &str {
    for suffix in [" UTC", " GMT", " UT", "Z"] {
        if let Some(stripped) = s.strip_suffix(suffix) {
            return stripped.trim_end();
        }
    }
    s
}
