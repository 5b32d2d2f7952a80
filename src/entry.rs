/// Broken-down UTC time: `[year, month, day, hour, minute, second, ...]`.
/// Anything past the sixth component is ignored.
pub type TimeTuple = Vec<i64>;

/// Read-only view of one feed item. Every field is optional; parsers fill in
/// whatever the source document carried.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct FeedEntry {
    pub title: Option<String>,
    pub link: Option<String>,
    pub summary: Option<String>,
    pub description: Option<String>,
    pub published: Option<String>,
    pub updated: Option<String>,
    pub created: Option<String>,
    pub published_parsed: Option<TimeTuple>,
    pub updated_parsed: Option<TimeTuple>,
}

impl FeedEntry {
    /// Non-empty title, if any.
    pub fn title(&self) -> Option<&str> { non_empty(&self.title) }
    pub fn link(&self) -> Option<&str> { non_empty(&self.link) }

    /// `summary`, falling back to `description`.
    pub fn summary_source(&self) -> Option<&str> {
        non_empty(&self.summary).or_else(|| non_empty(&self.description))
    }
}

fn non_empty(field: &Option<String>) -> Option<&str> {
    field.as_deref().filter(|s| !s.is_empty())
}
