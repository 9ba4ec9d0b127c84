use std::sync::OnceLock;

use ratatui::prelude::*;
use regex::Regex;

use crate::app::Severity;
use crate::constants::PREVIEW_CHARS;
use crate::models::Category;

/// Display colour for a category label; unknown labels get a neutral grey
pub fn category_color(label: &str) -> Color {
    match Category::from_label(label) {
        Category::Tech => Color::Blue,
        Category::Lifestyle => Color::Magenta,
        Category::Travel => Color::Green,
        Category::Food => Color::Yellow,
        Category::Fashion => Color::Red,
        Category::Health => Color::Cyan,
        Category::Other => Color::Gray,
    }
}

pub fn severity_color(severity: Severity) -> Color {
    match severity {
        Severity::Success => Color::Green,
        Severity::Error => Color::Red,
    }
}

fn tag_pattern() -> &'static Regex {
    static TAGS: OnceLock<Regex> = OnceLock::new();
    TAGS.get_or_init(|| Regex::new(r"(?s)<!--.*?-->|<[^>]*>").expect("valid tag pattern"))
}

/// Text content of an HTML fragment: tags and comments removed, common
/// entities decoded.
pub fn strip_html(html: &str) -> String {
    let text = tag_pattern().replace_all(html, "");
    decode_entities(&text)
}

fn decode_entities(text: &str) -> String {
    if !text.contains('&') {
        return text.to_string();
    }
    text.replace("&nbsp;", " ")
        .replace("&lt;", "<")
        .replace("&gt;", ">")
        .replace("&quot;", "\"")
        .replace("&#39;", "'")
        .replace("&apos;", "'")
        .replace("&amp;", "&")
}

/// Table preview: first characters of the plain text, always followed by "..."
pub fn preview(html: &str) -> String {
    let text = strip_html(html);
    let flat = text.split_whitespace().collect::<Vec<_>>().join(" ");
    let head: String = flat.chars().take(PREVIEW_CHARS).collect();
    format!("{}...", head)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_category_color_case_insensitive_with_default() {
        assert_eq!(category_color("Tech"), Color::Blue);
        assert_eq!(category_color("TRAVEL"), Color::Green);
        assert_eq!(category_color("health"), Color::Cyan);
        assert_eq!(category_color("poetry"), Color::Gray);
        assert_eq!(category_color(""), Color::Gray);
    }

    #[test]
    fn test_strip_html() {
        assert_eq!(strip_html("<p>Hello <b>world</b></p>"), "Hello world");
        assert_eq!(strip_html("a<!-- <b>hidden</b> -->b"), "ab");
        assert_eq!(strip_html("Fish &amp; chips &lt;3"), "Fish & chips <3");
        assert_eq!(strip_html("&amp;lt;"), "&lt;");
        assert_eq!(strip_html(""), "");
    }

    #[test]
    fn test_preview_truncates_on_chars() {
        let long = format!("<p>{}</p>", "é".repeat(150));
        let p = preview(&long);
        assert_eq!(p.chars().count(), PREVIEW_CHARS + 3);
        assert!(p.ends_with("..."));

        assert_eq!(preview("<h1>Hi</h1>\n<p>there</p>"), "Hi there...");
    }
}
