//! Full chapter documents with the six-page layout.

use super::front_matter::render_front_matter;
use crate::config::RenderConfig;
use crate::model::Chapter;
use crate::util::escape_xml;

/// Comment marking the title page.
pub const PAGE_TITLE: &str = "PAGE 1: TITLE PAGE";
/// Comment marking the body pages.
pub const PAGE_BODY: &str = "PAGES 2-4: BODY CONTENT";
/// Comment marking the endnotes page.
pub const PAGE_ENDNOTES: &str = "PAGE 5: ENDNOTES";
/// Comment marking the quiz and worksheet page.
pub const PAGE_QUIZ: &str = "PAGE 6: QUIZ & WORKSHEET";

/// All page comments, in document order.
pub const PAGE_COMMENTS: [&str; 4] = [PAGE_TITLE, PAGE_BODY, PAGE_ENDNOTES, PAGE_QUIZ];

/// Render a complete chapter XHTML document.
///
/// Layout:
///
/// ```text
/// PAGE 1     section.chap-title     (front matter)
/// PAGES 2-4  section.chap-body      > div.content-area
/// PAGE 5     aside.endnotes
/// PAGE 6     section.quiz-container, section.worksheet
///            section.closing
/// ```
///
/// Pages are separated by `div.page-break`. Body, endnotes, quiz, worksheet
/// and closing markup is inserted verbatim.
pub fn render_chapter_document(chapter: &Chapter, config: &RenderConfig) -> String {
    let front = &chapter.front;
    let mut doc = String::with_capacity(
        4096 + chapter.body.len() + chapter.endnotes.len() + chapter.quiz.len(),
    );

    doc.push_str("<?xml version=\"1.0\" encoding=\"utf-8\"?>\n<!DOCTYPE html>\n");
    doc.push_str(&format!(
        "<html xmlns=\"http://www.w3.org/1999/xhtml\" xml:lang=\"{lang}\" lang=\"{lang}\">\n",
        lang = escape_xml(&config.language)
    ));
    doc.push_str("<head>\n    <meta charset=\"utf-8\"/>\n");
    doc.push_str(&format!(
        "    <title>Chapter {} - {}</title>\n",
        escape_xml(&front.roman()),
        escape_xml(&chapter.title)
    ));
    doc.push_str(
        "    <meta name=\"viewport\" content=\"width=device-width, initial-scale=1\"/>\n",
    );
    for href in &config.stylesheets {
        doc.push_str(&format!(
            "    <link rel=\"stylesheet\" type=\"text/css\" href=\"{}\"/>\n",
            escape_xml(href)
        ));
    }
    doc.push_str("</head>\n<body class=\"chapter-page\">\n\n");

    doc.push_str(&format!("<!-- {PAGE_TITLE} -->\n"));
    doc.push_str(&render_front_matter(front, config));

    push_page_break(&mut doc, PAGE_BODY);
    doc.push_str("<section class=\"chap-body\">\n    <div class=\"content-area\">\n");
    push_fragment(&mut doc, &chapter.body, 8);
    doc.push_str("    </div>\n</section>\n");

    push_page_break(&mut doc, PAGE_ENDNOTES);
    doc.push_str("<aside class=\"endnotes\">\n");
    push_fragment(&mut doc, &chapter.endnotes, 4);
    doc.push_str("</aside>\n");

    push_page_break(&mut doc, PAGE_QUIZ);
    doc.push_str("<section class=\"quiz-container chap-quiz avoid-break\">\n");
    push_fragment(&mut doc, &chapter.quiz, 4);
    doc.push_str("</section>\n\n");

    doc.push_str("<section class=\"worksheet avoid-break\">\n");
    push_fragment(&mut doc, &chapter.worksheet, 4);
    doc.push_str("</section>\n\n");

    doc.push_str("<!-- CLOSING -->\n<section class=\"closing\">\n");
    push_fragment(&mut doc, &chapter.closing, 4);
    doc.push_str("</section>\n\n</body>\n</html>\n");

    doc
}

fn push_page_break(doc: &mut String, next_page: &str) {
    doc.push_str("\n<!-- PAGE BREAK -->\n<div class=\"page-break\"></div>\n\n");
    doc.push_str(&format!("<!-- {next_page} -->\n"));
}

/// Insert a verbatim fragment, indenting only its first line.
///
/// Later lines keep their original whitespace so `pre` blocks survive.
fn push_fragment(doc: &mut String, fragment: &str, indent: usize) {
    let fragment = fragment.trim();
    if fragment.is_empty() {
        return;
    }
    doc.push_str(&" ".repeat(indent));
    doc.push_str(fragment);
    doc.push('\n');
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::ChapterFrontMatter;

    fn sample_chapter() -> Chapter {
        Chapter::new(ChapterFrontMatter::sample())
            .with_body("<h2>Finances</h2>\n<p>Track every sale.</p>")
            .with_endnotes("<ol><li>Note one.</li></ol>")
            .with_quiz("<h2>Quiz</h2>")
            .with_worksheet("<h2>Worksheet</h2>")
            .with_closing("<p>Go build.</p>")
    }

    #[test]
    fn test_document_head() {
        let doc = render_chapter_document(&sample_chapter(), &RenderConfig::default());
        assert!(doc.starts_with("<?xml version=\"1.0\" encoding=\"utf-8\"?>\n<!DOCTYPE html>"));
        assert!(doc.contains("xmlns=\"http://www.w3.org/1999/xhtml\" xml:lang=\"en\" lang=\"en\""));
        assert!(doc.contains("<title>Chapter VI - MASTERING THE BUSINESS OF HAIRSTYLING</title>"));
        assert!(doc.contains("href=\"../styles/fonts.css\""));
        assert!(doc.contains("href=\"../styles/style.css\""));
        assert!(doc.contains("<body class=\"chapter-page\">"));
        assert!(doc.trim_end().ends_with("</html>"));
    }

    #[test]
    fn test_pages_in_order() {
        let doc = render_chapter_document(&sample_chapter(), &RenderConfig::default());
        let mut last = 0;
        for marker in PAGE_COMMENTS
            .iter()
            .map(|c| format!("<!-- {c} -->"))
            .chain(["<!-- CLOSING -->".to_string()])
        {
            let pos = doc.find(&marker).unwrap_or_else(|| panic!("missing {marker}"));
            assert!(pos > last, "{marker} out of order");
            last = pos;
        }
        assert_eq!(doc.matches("<div class=\"page-break\"></div>").count(), 3);
    }

    #[test]
    fn test_fragments_verbatim() {
        let doc = render_chapter_document(&sample_chapter(), &RenderConfig::default());
        assert!(doc.contains("<h2>Finances</h2>\n<p>Track every sale.</p>"));
        assert!(doc.contains("<ol><li>Note one.</li></ol>"));
        assert!(doc.contains("<section class=\"quiz-container chap-quiz avoid-break\">\n    <h2>Quiz</h2>"));
        assert!(doc.contains("<section class=\"worksheet avoid-break\">"));
        assert!(doc.contains("<section class=\"closing\">\n    <p>Go build.</p>"));
    }

    #[test]
    fn test_document_is_well_formed() {
        let doc = render_chapter_document(&sample_chapter(), &RenderConfig::default());
        let mut reader = quick_xml::Reader::from_str(&doc);
        loop {
            match reader.read_event() {
                Ok(quick_xml::events::Event::Eof) => break,
                Ok(_) => {}
                Err(e) => panic!("not well-formed: {e}"),
            }
        }
    }

    #[test]
    fn test_rendering_is_deterministic() {
        let chapter = sample_chapter();
        let config = RenderConfig::default();
        assert_eq!(
            render_chapter_document(&chapter, &config),
            render_chapter_document(&chapter, &config)
        );
    }
}
