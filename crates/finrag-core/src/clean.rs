use regex::Regex;
use std::sync::OnceLock;

fn url_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"http\S+").unwrap_or_else(|e| panic!("url pattern: {e}")))
}

fn whitespace_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"\s+").unwrap_or_else(|e| panic!("whitespace pattern: {e}")))
}

/// Remove URLs, collapse whitespace runs to one space, trim.
pub fn clean_text(text: &str) -> String {
    let without_urls = url_re().replace_all(text, "");
    let collapsed = whitespace_re().replace_all(&without_urls, " ");
    collapsed.trim().to_string()
}
