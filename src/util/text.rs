use std::sync::OnceLock;

use regex::Regex;

fn tag_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"<[^>]+>").expect("valid tag regex"))
}

fn nbsp_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"&nbsp;?").expect("valid nbsp regex"))
}

fn ws_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"\s+").expect("valid whitespace regex"))
}

/// Strip markup from a summary: tags and `&nbsp;` become spaces, whitespace
/// runs collapse to one space, ends are trimmed.
pub fn sanitize(text: &str) -> String {
    if text.is_empty() {
        return String::new();
    }
    let s = tag_re().replace_all(text, " ");
    let s = nbsp_re().replace_all(&s, " ");
    ws_re().replace_all(&s, " ").trim().to_string()
}

/// First `max` characters of `s`, plus `…` when anything was cut.
pub fn truncate_chars(s: &str, max: usize) -> String {
    match s.char_indices().nth(max) {
        Some((idx, _)) => format!("{}…", &s[..idx]),
        None => s.to_string(),
    }
}
