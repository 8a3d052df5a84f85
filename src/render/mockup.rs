//! Annotated design mockup of a chapter title page.
//!
//! The mockup is a standalone HTML page with inline styles that shows the
//! title page as it should look, with a callout under each region naming the
//! stylesheet class that implements it, followed by the requirement
//! checklists. It documents the layout for the people converting chapters
//! and is never part of the book itself.

use percent_encoding::{AsciiSet, CONTROLS, utf8_percent_encode};

use super::dropcap::split_dropcap;
use crate::model::ChapterFrontMatter;
use crate::util::escape_xml;

const ACCENT: &str = "#1797a6";
const DECORATIVE_FONT: &str = "\"Cinzel Decorative\", Georgia, serif";

const BRUSHSTROKE_SVG: &str = "<svg xmlns='http://www.w3.org/2000/svg' width='128' height='80' \
     viewBox='0 0 128 80'><path d='M15,40 Q35,15 65,35 Q95,55 115,40 Q105,25 85,30 Q65,35 45,25 \
     Q25,15 15,40 Z' fill='#654321' opacity='0.4'/></svg>";

/// Characters escaped inside an SVG `data:` URI.
const SVG_URI: &AsciiSet = &CONTROLS
    .add(b'"')
    .add(b'#')
    .add(b'%')
    .add(b'<')
    .add(b'>')
    .add(b'\'');

const VISUAL_ELEMENTS: [&str; 5] = [
    "Roman numeral with brushstroke background (TOP CENTERED)",
    "Vertical title stack with accent bar (left-aligned)",
    "Bible quote in pill-shaped container (centered)",
    "Introduction heading with underline (centered)",
    "Dropcap first letter with accent background",
];

const CONTENT_REQUIREMENTS: [&str; 5] = [
    "100% content preservation (every word)",
    "All footnotes and references maintained",
    "Case studies and examples kept intact",
    "Personal stories preserved word-for-word",
    "Implementation steps maintained exactly",
];

/// Render the annotated mockup page for a chapter.
pub fn render_mockup(front: &ChapterFrontMatter) -> String {
    let mut html = String::with_capacity(8192 + front.introduction.len());

    html.push_str("<!DOCTYPE html>\n<html lang=\"en\">\n<head>\n<meta charset=\"utf-8\"/>\n");
    html.push_str(&format!(
        "<title>Chapter {} Title Page Mockup</title>\n</head>\n",
        escape_xml(&front.roman())
    ));
    html.push_str(&format!(
        "<body style=\"{}\">\n",
        style(&[
            ("max-width", "56rem"),
            ("margin", "0 auto"),
            ("padding", "2rem"),
            ("background", "#ffffff"),
            ("font-family", "Georgia, serif"),
            ("min-height", "100vh"),
        ])
    ));

    push_template_banner(&mut html);
    push_numeral_badge(&mut html, front);
    push_title_stack(&mut html, front);
    push_epigraph(&mut html, front);
    push_heading(&mut html);
    push_dropcap_paragraph(&mut html, front);
    push_requirements(&mut html);
    push_page_indicator(&mut html);

    html.push_str("</body>\n</html>\n");
    html
}

/// Join CSS declarations into an escaped `style` attribute value.
fn style(decls: &[(&str, &str)]) -> String {
    let css: Vec<String> = decls.iter().map(|(k, v)| format!("{k}: {v}")).collect();
    escape_xml(&css.join("; ")).into_owned()
}

fn callout(html: &mut String, text: &str) {
    html.push_str(&format!(
        "<div class=\"annotation\" style=\"{}\">CSS: {}</div>\n",
        style(&[
            ("font-size", "0.75rem"),
            ("color", "#4b5563"),
            ("font-style", "italic"),
            ("margin-top", "0.5rem"),
            ("text-align", "center"),
        ]),
        escape_xml(text)
    ));
}

fn brushstroke_background() -> String {
    format!(
        "url(\"data:image/svg+xml,{}\")",
        utf8_percent_encode(BRUSHSTROKE_SVG, SVG_URI)
    )
}

fn push_template_banner(html: &mut String) {
    html.push_str(&format!(
        "<div class=\"annotation\" style=\"{}\">\n",
        style(&[
            ("background", "#eff6ff"),
            ("border-left", "4px solid #3b82f6"),
            ("padding", "1rem"),
            ("margin-bottom", "2rem"),
        ])
    ));
    html.push_str(
        "<h3 style=\"color: #1e40af; margin: 0 0 0.5rem 0\">ACISS Design System - Chapter Title Page Template</h3>\n",
    );
    html.push_str(
        "<p style=\"color: #1d4ed8; font-size: 0.875rem; margin: 0\">This visual mockup demonstrates \
         the exact layout and styling requirements for every chapter file. Every chapter must follow \
         this precise structure while preserving 100% of the original content.</p>\n</div>\n",
    );
}

fn push_numeral_badge(html: &mut String, front: &ChapterFrontMatter) {
    html.push_str(&format!(
        "<div class=\"chapter-number-container\" style=\"{}\">\n<div>\n",
        style(&[
            ("display", "flex"),
            ("justify-content", "center"),
            ("margin-bottom", "2rem"),
        ])
    ));
    let background = brushstroke_background();
    html.push_str(&format!(
        "<div class=\"chapter-number-brush\" style=\"{}\">\n",
        style(&[
            ("width", "8rem"),
            ("height", "5rem"),
            ("display", "flex"),
            ("align-items", "center"),
            ("justify-content", "center"),
            ("border-radius", "9999px"),
            ("background", "linear-gradient(135deg, #8B4513, #D2691E, #CD853F)"),
            ("background-image", background.as_str()),
            ("box-shadow", "0 6px 20px rgba(139, 69, 19, 0.4)"),
            ("border", "2px solid rgba(101, 67, 33, 0.3)"),
        ])
    ));
    html.push_str(&format!(
        "<span class=\"chapter-number-text\" style=\"{}\">{}</span>\n</div>\n",
        style(&[
            ("color", "#ffffff"),
            ("font-weight", "bold"),
            ("font-size", "2.25rem"),
            ("font-family", DECORATIVE_FONT),
            ("text-shadow", "3px 3px 6px rgba(0,0,0,0.7)"),
            ("letter-spacing", "3px"),
        ]),
        escape_xml(&front.roman())
    ));
    callout(html, ".chapter-number-brush + brushstroke.JPEG");
    html.push_str("</div>\n</div>\n");
}

fn push_title_stack(html: &mut String, front: &ChapterFrontMatter) {
    html.push_str(&format!(
        "<div class=\"title-stack\" style=\"{}\">\n",
        style(&[
            ("display", "flex"),
            ("align-items", "flex-start"),
            ("gap", "1.5rem"),
            ("margin-bottom", "2rem"),
        ])
    ));
    html.push_str(&format!(
        "<div class=\"title-bar\" style=\"{}\"></div>\n",
        style(&[
            ("width", "0.5rem"),
            ("height", "320px"),
            ("flex-shrink", "0"),
            ("border-radius", "9999px"),
            ("background-color", ACCENT),
            ("box-shadow", "0 2px 8px rgba(23, 151, 166, 0.3)"),
        ])
    ));
    html.push_str(&format!(
        "<div class=\"title-lines\" style=\"{}\">\n",
        style(&[("display", "flex"), ("flex-direction", "column"), ("gap", "0.25rem")])
    ));
    let line_style = style(&[
        ("font-family", DECORATIVE_FONT),
        ("font-size", "2.4rem"),
        ("font-weight", "bold"),
        ("line-height", "1.25"),
        ("color", ACCENT),
        ("text-transform", "uppercase"),
        ("letter-spacing", "0.05em"),
        ("margin", "0"),
        ("text-shadow", "1px 1px 2px rgba(0,0,0,0.1)"),
    ]);
    for line in &front.title_lines {
        html.push_str(&format!(
            "<h1 class=\"title-line\" style=\"{line_style}\">{}</h1>\n",
            escape_xml(&line.to_uppercase())
        ));
    }
    callout(html, ".title-bar, .title-stack \u{2192} .title-line (each line)");
    html.push_str("</div>\n</div>\n");
}

fn push_epigraph(html: &mut String, front: &ChapterFrontMatter) {
    html.push_str(&format!(
        "<div style=\"{}\">\n",
        style(&[("display", "flex"), ("justify-content", "center"), ("margin-bottom", "2rem")])
    ));
    let border = format!("2px solid {ACCENT}");
    html.push_str(&format!(
        "<div class=\"bible-quote-container\" style=\"{}\">\n",
        style(&[
            ("max-width", "42rem"),
            ("text-align", "center"),
            ("padding", "1.5rem 2rem"),
            ("background-color", "#e0f7fa"),
            ("border", border.as_str()),
            ("border-radius", "50px"),
            ("box-shadow", "0 4px 16px rgba(23, 151, 166, 0.2)"),
        ])
    ));
    html.push_str(&format!(
        "<blockquote class=\"bible-quote-text\" style=\"{}\">\u{201c}{}\u{201d}</blockquote>\n",
        style(&[
            ("font-size", "1.125rem"),
            ("font-style", "italic"),
            ("color", "#333333"),
            ("line-height", "1.6"),
            ("margin", "0 0 0.75rem 0"),
        ]),
        escape_xml(&front.epigraph.text)
    ));
    html.push_str(&format!(
        "<cite class=\"bible-quote-reference\" style=\"{}\">{}</cite>\n",
        style(&[
            ("display", "block"),
            ("text-align", "right"),
            ("color", ACCENT),
            ("font-style", "italic"),
            ("font-weight", "500"),
        ]),
        escape_xml(&front.epigraph.attribution)
    ));
    callout(html, ".bible-quote-container (pill shape)");
    html.push_str("</div>\n</div>\n");
}

fn push_heading(html: &mut String) {
    html.push_str("<div style=\"text-align: center; margin-bottom: 1.5rem\">\n");
    html.push_str(&format!(
        "<h2 class=\"introduction-heading\" style=\"{}\">Introduction</h2>\n",
        style(&[
            ("display", "inline-block"),
            ("font-family", "\"Montserrat\", Arial, sans-serif"),
            ("font-size", "1.2rem"),
            ("font-variant", "small-caps"),
            ("color", "#555555"),
            ("text-transform", "uppercase"),
            ("letter-spacing", "0.1em"),
            ("border-bottom", "2px solid rgba(23, 151, 166, 0.3)"),
        ])
    ));
    callout(html, ".introduction-heading");
    html.push_str("</div>\n");
}

fn push_dropcap_paragraph(html: &mut String, front: &ChapterFrontMatter) {
    html.push_str(&format!(
        "<div style=\"{}\">\n",
        style(&[("max-width", "56rem"), ("margin", "0 auto")])
    ));
    html.push_str(&format!(
        "<p class=\"introduction-paragraph dropcap-first-letter\" style=\"{}\">",
        style(&[
            ("text-align", "justify"),
            ("font-size", "1.15rem"),
            ("line-height", "1.8"),
            ("color", "#1a1a1a"),
        ])
    ));
    match split_dropcap(&front.introduction) {
        Some(cap) => {
            html.push_str(&format!(
                "<span class=\"dropcap\" style=\"{}\">{}</span>{}",
                style(&[
                    ("float", "left"),
                    ("font-family", DECORATIVE_FONT),
                    ("font-size", "4rem"),
                    ("font-weight", "bold"),
                    ("line-height", "1"),
                    ("color", "#ffffff"),
                    ("background-color", ACCENT),
                    ("padding", "0.1em 0.35em 0.2em 0.35em"),
                    ("margin", "0.25rem 0.75rem 0 0"),
                    ("border-radius", "8px"),
                    ("box-shadow", "0 3px 12px rgba(23, 151, 166, 0.4)"),
                    ("border", "2px solid rgba(255, 255, 255, 0.9)"),
                ]),
                escape_xml(cap.letter),
                escape_xml(cap.rest)
            ));
        }
        None => html.push_str(&escape_xml(&front.introduction)),
    }
    html.push_str("</p>\n");
    callout(html, ".dropcap-first-letter (first letter with accent background)");
    html.push_str("</div>\n");
}

fn push_checklist(html: &mut String, heading: &str, items: &[&str]) {
    html.push_str("<div>\n");
    html.push_str(&format!(
        "<h4 style=\"color: #374151; margin: 0 0 0.5rem 0\">{}</h4>\n<ul style=\"{}\">\n",
        escape_xml(heading),
        style(&[
            ("font-size", "0.875rem"),
            ("color", "#4b5563"),
            ("list-style", "none"),
            ("padding", "0"),
        ])
    ));
    for item in items {
        html.push_str(&format!("<li>\u{2022} {}</li>\n", escape_xml(item)));
    }
    html.push_str("</ul>\n</div>\n");
}

fn push_requirements(html: &mut String) {
    html.push_str(&format!(
        "<div class=\"annotation\" style=\"{}\">\n",
        style(&[
            ("margin-top", "4rem"),
            ("padding", "1.5rem"),
            ("background", "#f9fafb"),
            ("border", "2px solid #e5e7eb"),
            ("border-radius", "0.5rem"),
        ])
    ));
    html.push_str(
        "<h3 style=\"color: #1f2937; margin: 0 0 1rem 0\">ACISS Design System Requirements</h3>\n",
    );
    html.push_str(&format!(
        "<div style=\"{}\">\n",
        style(&[
            ("display", "grid"),
            ("grid-template-columns", "1fr 1fr"),
            ("gap", "1.5rem"),
        ])
    ));
    push_checklist(html, "Visual Elements:", &VISUAL_ELEMENTS);
    push_checklist(html, "Content Requirements:", &CONTENT_REQUIREMENTS);
    html.push_str("</div>\n");
    html.push_str(&format!(
        "<div style=\"{}\">\n<p style=\"font-size: 0.875rem; color: #854d0e; margin: 0\">\
         <strong>Critical:</strong> This visual structure must be applied to every chapter file \
         while preserving every single word from the original content. No truncation, \
         summarization, or content changes allowed.</p>\n</div>\n",
        style(&[
            ("margin-top", "1rem"),
            ("padding", "1rem"),
            ("background", "#fefce8"),
            ("border-left", "4px solid #facc15"),
        ])
    ));
    html.push_str("</div>\n");
}

fn push_page_indicator(html: &mut String) {
    html.push_str(&format!(
        "<div class=\"annotation\" style=\"{}\">\n",
        style(&[
            ("margin-top", "2rem"),
            ("text-align", "center"),
            ("font-size", "0.875rem"),
            ("color", "#4b5563"),
        ])
    ));
    html.push_str(&format!(
        "<span style=\"{}\"></span>\n",
        style(&[
            ("display", "inline-block"),
            ("width", "0.75rem"),
            ("height", "0.75rem"),
            ("border-radius", "9999px"),
            ("background", ACCENT),
        ])
    ));
    html.push_str(
        "<span>Page 1 of 6</span>\n<span style=\"font-size: 0.75rem; font-style: italic\">\
         (Title Page \u{2192} Body Content \u{2192} Endnotes \u{2192} Quiz &amp; Worksheet)</span>\n",
    );
    html.push_str("</div>\n");
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mockup_contains_all_regions() {
        let html = render_mockup(&ChapterFrontMatter::sample());
        for hook in [
            "chapter-number-brush",
            "title-stack",
            "title-bar",
            "bible-quote-container",
            "introduction-heading",
            "dropcap-first-letter",
        ] {
            assert!(html.contains(hook), "missing {hook}");
        }
        assert!(html.contains("ACISS Design System Requirements"));
        assert!(html.contains("Page 1 of 6"));
    }

    #[test]
    fn test_mockup_callouts() {
        let html = render_mockup(&ChapterFrontMatter::sample());
        assert!(html.contains("CSS: .chapter-number-brush + brushstroke.JPEG"));
        assert!(html.contains("CSS: .bible-quote-container (pill shape)"));
        assert!(html.contains("CSS: .dropcap-first-letter (first letter with accent background)"));
    }

    #[test]
    fn test_mockup_dropcap_and_titles() {
        let html = render_mockup(&ChapterFrontMatter::sample());
        assert!(html.contains(">P</span>icture this powerful scene:"));
        assert_eq!(html.matches("<h1 class=\"title-line\"").count(), 5);
        assert!(html.contains(">VI</span>"));
    }

    #[test]
    fn test_epigraph_quote_and_attribution_together() {
        let html = render_mockup(&ChapterFrontMatter::sample());
        let quote = html.find("Whatever you do, work at it").unwrap();
        let cite = html.find("Colossians 3:23").unwrap();
        let container_end = html[quote..].find("</div>").unwrap() + quote;
        assert!(quote < cite && cite < container_end);
    }

    #[test]
    fn test_brushstroke_uri_is_encoded() {
        let bg = brushstroke_background();
        assert!(bg.starts_with("url(\"data:image/svg+xml,%3Csvg"));
        assert!(bg.contains("%23654321"));
        assert!(!bg.contains('<'));
    }
}
