// src/utils/text.rs

//! Text helpers: description normalization, identity digests, truncation.

use scraper::ElementRef;
use sha2::{Digest, Sha256};
use unicode_segmentation::UnicodeSegmentation;

/// Lower-case, trim and collapse whitespace runs to single spaces.
pub fn normalize_description(text: &str) -> String {
    text.to_lowercase()
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
}

/// Stable identity of a posting: `sha256(source | normalized description)`.
pub fn posting_id(source: &str, description: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(source.as_bytes());
    hasher.update(b"|");
    hasher.update(normalize_description(description).as_bytes());
    hex::encode(hasher.finalize())
}

/// Keep at most `limit` grapheme clusters of `text`.
pub fn truncate_graphemes(text: &str, limit: usize) -> &str {
    match text.grapheme_indices(true).nth(limit) {
        Some((idx, _)) => &text[..idx],
        None => text,
    }
}

/// Visible text of an element, one trimmed line per text node.
pub fn element_text(element: &ElementRef) -> String {
    element
        .text()
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .collect::<Vec<_>>()
        .join("\n")
}

/// Visible text of an element flattened to a single line.
pub fn inline_text(element: &ElementRef) -> String {
    element
        .text()
        .collect::<String>()
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_collapses_case_and_whitespace() {
        assert_eq!(
            normalize_description("  Python\n\tDeveloper   REMOTE "),
            "python developer remote"
        );
    }

    #[test]
    fn test_id_ignores_whitespace_and_case() {
        let a = posting_id("work.ua", "Шукаємо Python розробника.\n\nВіддалено");
        let b = posting_id("work.ua", "шукаємо   python РОЗРОБНИКА. віддалено  ");
        assert_eq!(a, b);
        assert_eq!(a.len(), 64);
    }

    #[test]
    fn test_id_differs_by_one_word() {
        let a = posting_id("work.ua", "Шукаємо Python розробника");
        let b = posting_id("work.ua", "Шукаємо Java розробника");
        assert_ne!(a, b);
    }

    #[test]
    fn test_id_depends_on_source() {
        assert_ne!(
            posting_id("work.ua", "same text"),
            posting_id("dou.ua", "same text")
        );
    }

    #[test]
    fn test_truncate_graphemes() {
        assert_eq!(truncate_graphemes("Привіт, світ", 6), "Привіт");
        assert_eq!(truncate_graphemes("short", 100), "short");
        assert_eq!(truncate_graphemes("", 3), "");
    }

    #[test]
    fn test_element_text_lines() {
        let html = scraper::Html::parse_fragment("<div> <p>One </p>\n<p> Two</p> </div>");
        let sel = scraper::Selector::parse("div").unwrap();
        let div = html.select(&sel).next().unwrap();
        assert_eq!(element_text(&div), "One\nTwo");
        assert_eq!(inline_text(&div), "One Two");
    }
}
