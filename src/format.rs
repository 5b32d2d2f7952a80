use crate::entry::FeedEntry;
use crate::util::text::truncate_chars;

pub const SUMMARY_MAX_CHARS: usize = 300;
pub const NO_TITLE: &str = "(no title)";

/// Message text for one entry. `summary` must already be sanitized; an empty
/// summary drops the third line.
pub fn make_item_text(entry: &FeedEntry, summary: &str) -> String {
    let title = entry.title().unwrap_or(NO_TITLE);
    let link = entry.link().unwrap_or("");
    let mut text = format!("*New:* {title}\n{link}");
    if !summary.is_empty() {
        text.push('\n');
        text.push_str(&truncate_chars(summary, SUMMARY_MAX_CHARS));
    }
    text
}
