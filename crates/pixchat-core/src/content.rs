//! Inline image markup parsing for assistant replies
//!
//! Turns `Here it is ![cat](http://host/cat.png) enjoy` into an ordered list of
//! text and image segments. Only `![alt](url)` is recognised; every other
//! character passes through as text.

use regex::Regex;
use std::sync::OnceLock;

/// Alt text used when the markup leaves it empty
pub const DEFAULT_ALT: &str = "Image";

/// A piece of rendered assistant content
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Segment {
    Text(String),
    Image { url: String, alt: String },
}

impl Segment {
    pub fn text(text: impl Into<String>) -> Self {
        Segment::Text(text.into())
    }

    pub fn image(url: impl Into<String>, alt: impl Into<String>) -> Self {
        Segment::Image {
            url: url.into(),
            alt: alt.into(),
        }
    }
}

fn image_pattern() -> Option<&'static Regex> {
    static PATTERN: OnceLock<Option<Regex>> = OnceLock::new();
    PATTERN
        .get_or_init(|| Regex::new(r"!\[([^\]]*)\]\(([^)]*)\)").ok())
        .as_ref()
}

/// Split `text` into text and image segments, in source order.
///
/// Plain text comes back as a single [`Segment::Text`]; an empty input yields
/// no segments. Markup with an empty url is dropped without leaving text behind.
pub fn parse(text: &str) -> Vec<Segment> {
    if text.is_empty() {
        return Vec::new();
    }

    let Some(pattern) = image_pattern() else {
        tracing::warn!("image pattern unavailable, rendering content as plain text");
        return vec![Segment::text(text)];
    };

    let mut segments = Vec::new();
    let mut last_end = 0;
    let mut matched = false;

    for caps in pattern.captures_iter(text) {
        let (Some(whole), Some(alt), Some(url)) = (caps.get(0), caps.get(1), caps.get(2)) else {
            // Every capture group participates in a match
            return vec![Segment::text(text)];
        };
        matched = true;

        if whole.start() > last_end {
            segments.push(Segment::text(&text[last_end..whole.start()]));
        }

        if !url.as_str().is_empty() {
            let alt = if alt.as_str().is_empty() {
                DEFAULT_ALT
            } else {
                alt.as_str()
            };
            segments.push(Segment::image(url.as_str(), alt));
        }

        last_end = whole.end();
    }

    if !matched {
        return vec![Segment::text(text)];
    }

    if last_end < text.len() {
        segments.push(Segment::text(&text[last_end..]));
    }

    segments
}

#[cfg(test)]
mod tests {
    use super::*;

    fn has_inline_images(segments: &[Segment]) -> bool {
        segments
            .iter()
            .any(|segment| matches!(segment, Segment::Image { .. }))
    }

    #[test]
    fn test_plain_text_is_single_segment() {
        let segments = parse("just words, no pictures");
        assert_eq!(segments, vec![Segment::text("just words, no pictures")]);
        assert!(!has_inline_images(&segments));
    }

    #[test]
    fn test_empty_input() {
        assert!(parse("").is_empty());
    }

    #[test]
    fn test_image_with_surrounding_text() {
        let segments = parse("before ![cat](http://x/c.png) after");
        assert_eq!(
            segments,
            vec![
                Segment::text("before "),
                Segment::image("http://x/c.png", "cat"),
                Segment::text(" after"),
            ]
        );
    }

    #[test]
    fn test_leading_image_has_no_empty_text() {
        let segments = parse("![cat](http://x/c.png) nice");
        assert_eq!(
            segments,
            vec![
                Segment::image("http://x/c.png", "cat"),
                Segment::text(" nice"),
            ]
        );
    }

    #[test]
    fn test_empty_alt_defaults() {
        let segments = parse("![](http://x/a.png)");
        assert_eq!(segments, vec![Segment::image("http://x/a.png", "Image")]);
    }

    #[test]
    fn test_empty_url_is_dropped() {
        let segments = parse("left ![ghost]() right");
        assert_eq!(
            segments,
            vec![Segment::text("left "), Segment::text(" right")]
        );
        assert!(!has_inline_images(&segments));
    }

    #[test]
    fn test_only_empty_url_yields_nothing() {
        assert!(parse("![ghost]()").is_empty());
    }

    #[test]
    fn test_multiple_images_keep_order() {
        let text = "a ![one](http://x/1.png)b![two](http://x/2.png)\n![](http://x/3.png) end";
        let segments = parse(text);
        assert_eq!(
            segments,
            vec![
                Segment::text("a "),
                Segment::image("http://x/1.png", "one"),
                Segment::text("b"),
                Segment::image("http://x/2.png", "two"),
                Segment::text("\n"),
                Segment::image("http://x/3.png", "Image"),
                Segment::text(" end"),
            ]
        );
    }

    #[test]
    fn test_adjacent_images() {
        let segments = parse("![a](u1)![b](u2)");
        assert_eq!(
            segments,
            vec![Segment::image("u1", "a"), Segment::image("u2", "b")]
        );
    }

    #[test]
    fn test_unclosed_markup_stays_text() {
        let text = "look ![broken](http://x/a.png";
        assert_eq!(parse(text), vec![Segment::text(text)]);

        let spaced = "look ![spaced] (http://x/a.png)";
        assert_eq!(parse(spaced), vec![Segment::text(spaced)]);
    }

    #[test]
    fn test_plain_link_is_not_an_image() {
        let text = "see [docs](http://x/docs)";
        assert_eq!(parse(text), vec![Segment::text(text)]);
    }

    #[test]
    fn test_multibyte_text_is_preserved() {
        let segments = parse("café 📸 ![señal](http://x/ñ.png) ¡listo!");
        assert_eq!(
            segments,
            vec![
                Segment::text("café 📸 "),
                Segment::image("http://x/ñ.png", "señal"),
                Segment::text(" ¡listo!"),
            ]
        );
    }

    #[test]
    fn test_parse_is_idempotent() {
        let text = "x ![a](http://x/a.png) y ![](http://x/b.png) z ![c]()";
        assert_eq!(parse(text), parse(text));
    }
}
