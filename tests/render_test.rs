use std::path::PathBuf;

use aciss::render::{split_dropcap, split_markup_dropcap};
use aciss::{
    Chapter, ChapterFrontMatter, Error, RenderConfig, TextFormat, from_roman,
    render_chapter_document, render_front_matter, render_mockup, to_roman,
};
use proptest::prelude::*;

fn fixture(name: &str) -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .join("tests/fixtures")
        .join(name)
}

#[test]
fn test_sample_title_page() {
    let html = render_front_matter(&ChapterFrontMatter::sample(), &RenderConfig::default());
    let lines: Vec<&str> = html
        .lines()
        .filter_map(|l| l.trim().strip_prefix("<div class=\"title-line\">"))
        .filter_map(|l| l.strip_suffix("</div>"))
        .collect();
    assert_eq!(lines, vec!["MASTERING", "THE", "BUSINESS", "OF", "HAIRSTYLING"]);
    assert!(html.contains("<span class=\"dropcap\">P</span>icture this powerful scene:"));
    assert!(html.contains("\u{2014} Colossians 3:23"));
}

#[test]
fn test_load_json_fixture() {
    let front = ChapterFrontMatter::load(fixture("front_matter.json")).expect("Failed to load");
    assert_eq!(front.number, 12);
    assert_eq!(front.roman(), "XII");
    assert_eq!(front.format, TextFormat::Plain);

    let html = render_front_matter(&front, &RenderConfig::default());
    assert!(html.contains("<div class=\"title-line\">PROFESSIONAL</div>"));
    // Plain text is escaped, dropcap first
    assert!(html.contains("<span class=\"dropcap\">O</span>pen the appointment book &amp; look"));
}

#[test]
fn test_load_toml_fixture() {
    let front = ChapterFrontMatter::load(fixture("front_matter.toml")).expect("Failed to load");
    assert_eq!(front.number, 3);
    assert_eq!(front.title_lines, vec!["Color", "Theory"]);
    assert_eq!(front.epigraph.attribution, "\u{2014} Ecclesiastes 3:11");
}

#[test]
fn test_fixture_without_title_is_rejected() {
    let err = ChapterFrontMatter::from_json_str(
        r#"{"number": 1, "title_lines": [], "epigraph": {"text": "", "attribution": ""}, "introduction": ""}"#,
    )
    .unwrap_err();
    assert!(matches!(err, Error::InvalidChapter(_)));
}

#[test]
fn test_mockup_is_not_production_output() {
    let front = ChapterFrontMatter::sample();
    let mockup = render_mockup(&front);
    assert!(mockup.contains("Page 1 of 6"));

    let page = render_chapter_document(&Chapter::new(front), &RenderConfig::default());
    assert!(!page.contains("Page 1 of 6"));
    assert!(!page.contains("CSS:"));
}

fn title_line() -> impl Strategy<Value = String> {
    "[A-Za-z][A-Za-z&'<> ]{0,11}[A-Za-z]"
}

fn front_matter() -> impl Strategy<Value = ChapterFrontMatter> {
    (
        1u32..=40,
        prop::collection::vec(title_line(), 1..=6),
        "[^\\x00-\\x1f]{0,60}",
        "[^\\x00-\\x1f]{0,60}",
        "[^\\x00-\\x1f]{0,200}",
    )
        .prop_map(|(number, lines, quote, source, intro)| {
            ChapterFrontMatter::new(number)
                .with_title_lines(lines)
                .with_epigraph(quote, source)
                .with_introduction(intro)
        })
}

proptest! {
    #[test]
    fn prop_one_title_line_per_entry(front in front_matter()) {
        let html = render_front_matter(&front, &RenderConfig::default());
        prop_assert_eq!(html.matches("class=\"title-line\"").count(), front.title_lines.len());

        let mut last = 0;
        for line in &front.title_lines {
            let escaped = line
                .to_uppercase()
                .replace('&', "&amp;")
                .replace('<', "&lt;")
                .replace('>', "&gt;")
                .replace('\'', "&#39;");
            let needle = format!("<div class=\"title-line\">{escaped}</div>");
            let pos = html[last..].find(&needle).map(|p| p + last);
            prop_assert!(pos.is_some(), "missing {}", needle);
            last = pos.unwrap_or(last);
        }
    }

    #[test]
    fn prop_epigraph_parts_together(front in front_matter()) {
        let html = render_front_matter(&front, &RenderConfig::default());
        prop_assert_eq!(html.matches("class=\"bible-quote-text\"").count(), 1);
        prop_assert_eq!(html.matches("class=\"bible-quote-reference\"").count(), 1);
        let quote = html.find("class=\"bible-quote-text\"").unwrap_or(0);
        let reference = html.find("class=\"bible-quote-reference\"").unwrap_or(0);
        prop_assert!(quote < reference);
    }

    #[test]
    fn prop_dropcap_round_trip(text in "\\PC{0,80}") {
        match split_dropcap(&text) {
            Some(cap) => {
                let joined = cap.joined();
                prop_assert_eq!(joined.as_str(), text.as_str());
                prop_assert_eq!(cap.letter.chars().count(), 1);
            }
            None => prop_assert!(text.is_empty()),
        }
    }

    #[test]
    fn prop_markup_dropcap_round_trip(text in "[A-Za-z][a-z <>/]{0,40}") {
        let cap = split_markup_dropcap(&text);
        prop_assert!(cap.is_some());
        if let Some(cap) = cap {
            let joined = cap.joined();
            prop_assert_eq!(joined.as_str(), text.as_str());
        }
    }

    #[test]
    fn prop_rendering_is_deterministic(front in front_matter()) {
        let config = RenderConfig::default();
        let chapter = Chapter::new(front);
        prop_assert_eq!(
            render_chapter_document(&chapter, &config),
            render_chapter_document(&chapter, &config)
        );
    }

    #[test]
    fn prop_roman_round_trip(n in 1u32..=3999) {
        prop_assert_eq!(from_roman(&to_roman(n)), Some(n));
    }
}
