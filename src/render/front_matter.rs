//! The chapter title page (`section.chap-title`).

use std::borrow::Cow;

use super::dropcap::{split_dropcap, split_markup_dropcap};
use crate::config::RenderConfig;
use crate::model::{ChapterFrontMatter, TextFormat};
use crate::util::escape_xml;

/// Render the title page of a chapter as an XHTML `section`.
///
/// The output exposes the styling hooks of the design system
/// (`chapter-number-brush`, `title-stack`, `title-bar`, `title-line`,
/// `bible-quote-container`, `introduction-heading`, `dropcap-first-letter`).
/// Rendering is pure: the same record and configuration always produce the
/// same markup.
///
/// # Example
///
/// ```
/// use aciss::ChapterFrontMatter;
/// use aciss::config::RenderConfig;
/// use aciss::render::render_front_matter;
///
/// let html = render_front_matter(&ChapterFrontMatter::sample(), &RenderConfig::default());
/// assert!(html.contains(r#"<div class="chapter-number-text">VI</div>"#));
/// assert_eq!(html.matches(r#"class="title-line""#).count(), 5);
/// ```
pub fn render_front_matter(front: &ChapterFrontMatter, config: &RenderConfig) -> String {
    let mut out = String::with_capacity(1024 + front.introduction.len());

    out.push_str("<section class=\"chap-title\">\n");

    // Numeral badge
    out.push_str("    <div class=\"chapter-number-container\">\n");
    out.push_str("        <div class=\"chapter-number-brush\">\n");
    out.push_str(&format!(
        "            <img class=\"brushstroke-img\" src=\"{}\" alt=\"\" />\n",
        escape_xml(&config.brushstroke_src)
    ));
    out.push_str(&format!(
        "            <div class=\"chapter-number-text\">{}</div>\n",
        escape_xml(&front.roman())
    ));
    out.push_str("        </div>\n    </div>\n");

    // Title stack
    out.push_str("    <div class=\"chapter-title-container\">\n");
    out.push_str("        <div class=\"title-stack\">\n");
    out.push_str("            <div class=\"title-bar\"></div>\n");
    out.push_str("            <div class=\"title-lines\">\n");
    for line in &front.title_lines {
        out.push_str(&format!(
            "                <div class=\"title-line\">{}</div>\n",
            escape_xml(&line.to_uppercase())
        ));
    }
    out.push_str("            </div>\n        </div>\n    </div>\n");

    // Epigraph
    out.push_str("    <div class=\"bible-quote-container\">\n");
    out.push_str(&format!(
        "        <div class=\"bible-quote-text\">{}</div>\n",
        emit(front.format, &front.epigraph.text)
    ));
    out.push_str(&format!(
        "        <div class=\"bible-quote-reference\">{}</div>\n",
        emit(front.format, &front.epigraph.attribution)
    ));
    out.push_str("    </div>\n");

    // Introduction
    out.push_str(&format!(
        "    <div class=\"introduction-heading\">{}</div>\n",
        escape_xml(&config.heading)
    ));
    out.push_str("    <div class=\"introduction-paragraph dropcap-first-letter\">\n        ");
    push_introduction(&mut out, front);
    out.push_str("\n    </div>\n");

    out.push_str("</section>\n");
    out
}

fn push_introduction(out: &mut String, front: &ChapterFrontMatter) {
    let text = front.introduction.as_str();
    let dropcap = match front.format {
        TextFormat::Plain => split_dropcap(text),
        TextFormat::Markup => split_markup_dropcap(text),
    };

    match dropcap {
        Some(cap) => {
            out.push_str(&format!(
                "<span class=\"dropcap\">{}</span>",
                emit(front.format, cap.letter)
            ));
            out.push_str(&emit(front.format, cap.rest));
        }
        None => out.push_str(&emit(front.format, text)),
    }
}

fn emit(format: TextFormat, text: &str) -> Cow<'_, str> {
    match format {
        TextFormat::Plain => escape_xml(text),
        TextFormat::Markup => Cow::Borrowed(text),
    }
}
