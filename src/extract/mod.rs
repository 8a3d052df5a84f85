//! Lifting chapter content out of existing chapter pages.
//!
//! Chapter pages produced before the design system carry the same content
//! under different markup. [`extract_chapter`] finds each piece by its class
//! hook and keeps the inner markup untouched, so rebuilding the page never
//! rewrites a word of the text.

mod element;

use std::sync::LazyLock;

use regex::Regex;
use tracing::{debug, warn};

pub use element::{ElementSpan, Selector, find_element, find_elements};

use element::balanced_prefix;

use crate::error::Result;
use crate::model::{Chapter, ChapterFrontMatter, Epigraph, TextFormat};
use crate::render::{break_title_lines, title_words as split_title};
use crate::roman::from_roman;
use crate::util::{collapse_whitespace, decode_entities, strip_markup};

const NUMBER_TEXT: Selector<'static> = Selector::new("div", &["chapter-number-text"]);
const TITLE_WORD: Selector<'static> = Selector::new("h1", &["chapter-title-word"]);
const DOCUMENT_TITLE: Selector<'static> = Selector::new("title", &[]);
const QUOTE_TEXT: Selector<'static> = Selector::new("blockquote", &["bible-quote-text"]);
const QUOTE_REFERENCE: Selector<'static> = Selector::new("figcaption", &["bible-quote-reference"]);
const INTRODUCTION: Selector<'static> =
    Selector::new("div", &["introduction-paragraph", "dropcap-first-letter"]);
const BODY: Selector<'static> = Selector::new("section", &["chap-body"]);
const CONTENT_AREA: Selector<'static> = Selector::new("div", &["content-area"]);
const ENDNOTES: Selector<'static> = Selector::new("aside", &["endnotes"]);
const QUIZ: Selector<'static> = Selector::new("section", &["quiz-container"]);
const WORKSHEET: Selector<'static> = Selector::new("section", &["worksheet"]);
const CLOSING: Selector<'static> = Selector::new("section", &["image-quote"]);

/// Regions that may follow the chapter body; the body runs up to the first.
const AFTER_BODY: [Selector<'static>; 5] = [
    ENDNOTES,
    QUIZ,
    WORKSHEET,
    CLOSING,
    Selector::new("section", &["closing"]),
];

static TITLE_NUMERAL: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^Chapter\s+([IVXLC]+)\b").expect("valid regex"));
static TITLE_TEXT: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^Chapter\s+[IVXLC]+\s+[–—-]\s+(.+)$").expect("valid regex")
});
/// Comments and page-break divs left between regions by earlier layouts.
static PAGE_MARKUP: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"(?s)<!--.*?-->|<div class="page-break"\s*(?:/>|></div>)"#).expect("valid regex")
});

/// Content of an existing chapter page, split by page region.
///
/// Title words and the numeral are plain text; every other field holds the
/// inner markup of its element, trimmed. Regions missing from the page are
/// empty.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ExtractedChapter {
    pub roman: String,
    pub title_words: Vec<String>,
    pub quote_text: String,
    pub quote_reference: String,
    pub introduction: String,
    pub body: String,
    pub endnotes: String,
    pub quiz: String,
    pub worksheet: String,
    pub closing: String,
}

impl ExtractedChapter {
    /// Title used in the document `<title>`.
    pub fn full_title(&self) -> String {
        if self.title_words.is_empty() {
            "Chapter".to_string()
        } else {
            self.title_words.join(" ")
        }
    }

    /// Build a [`Chapter`] whose front matter carries the extracted markup verbatim.
    ///
    /// A page without title words gets the single title line "Chapter",
    /// matching [`full_title`](Self::full_title).
    pub fn into_chapter(self, max_title_lines: usize) -> Chapter {
        let number = from_roman(&self.roman).unwrap_or_else(|| {
            warn!(numeral = %self.roman, "Unrecognised chapter numeral, using 1");
            1
        });
        let title = self.full_title();
        let title_lines = if self.title_words.is_empty() {
            warn!(numeral = %self.roman, "Chapter has no title words, using \"Chapter\"");
            vec![title.clone()]
        } else {
            break_title_lines(&self.title_words, max_title_lines)
        };

        let front = ChapterFrontMatter {
            number,
            title_lines,
            epigraph: Epigraph::new(self.quote_text, self.quote_reference),
            introduction: self.introduction,
            format: TextFormat::Markup,
        };

        Chapter {
            front,
            title,
            body: self.body,
            endnotes: self.endnotes,
            quiz: self.quiz,
            worksheet: self.worksheet,
            closing: self.closing,
        }
    }
}

/// Split an existing chapter page into its regions.
///
/// Fails only when the page is not well-formed XML.
pub fn extract_chapter(xhtml: &str) -> Result<ExtractedChapter> {
    let document_title = find_element(xhtml, &DOCUMENT_TITLE)?
        .map(|span| element_text(span.inner(xhtml)))
        .unwrap_or_default();

    let roman = match find_element(xhtml, &NUMBER_TEXT)? {
        Some(span) => element_text(span.inner(xhtml)),
        None => TITLE_NUMERAL
            .captures(&document_title)
            .map(|caps| caps[1].to_string())
            .unwrap_or_else(|| "I".to_string()),
    };

    let mut title_words: Vec<String> = find_elements(xhtml, &TITLE_WORD, usize::MAX)?
        .iter()
        .map(|span| element_text(span.inner(xhtml)))
        .filter(|word| !word.is_empty())
        .collect();
    if title_words.is_empty()
        && let Some(caps) = TITLE_TEXT.captures(&document_title)
    {
        title_words = split_title(&caps[1]);
    }
    debug!(%roman, words = title_words.len(), "Extracted chapter heading");

    let extracted = ExtractedChapter {
        roman,
        title_words,
        quote_text: inner_of(xhtml, &QUOTE_TEXT)?,
        quote_reference: inner_of(xhtml, &QUOTE_REFERENCE)?,
        introduction: inner_of(xhtml, &INTRODUCTION)?,
        body: extract_body(xhtml)?,
        endnotes: inner_of(xhtml, &ENDNOTES)?,
        quiz: inner_of(xhtml, &QUIZ)?,
        worksheet: inner_of(xhtml, &WORKSHEET)?,
        closing: inner_of(xhtml, &CLOSING)?,
    };

    debug!(
        introduction = extracted.introduction.len(),
        body = extracted.body.len(),
        endnotes = extracted.endnotes.len(),
        quiz = extracted.quiz.len(),
        worksheet = extracted.worksheet.len(),
        closing = extracted.closing.len(),
        "Extracted chapter regions"
    );

    Ok(extracted)
}

fn inner_of(xhtml: &str, selector: &Selector<'_>) -> Result<String> {
    Ok(find_element(xhtml, selector)?
        .map(|span| span.inner(xhtml).trim().to_string())
        .unwrap_or_default())
}

/// Inner markup of `section.chap-body`, without a wrapping `div.content-area`,
/// followed by the sibling markup up to the next known region or the end of
/// the parent element.
fn extract_body(xhtml: &str) -> Result<String> {
    let Some(section) = find_element(xhtml, &BODY)? else {
        return Ok(String::new());
    };
    let body = unwrap_content_area(section.inner(xhtml).trim())?;

    let mut end = xhtml.len();
    for selector in &AFTER_BODY {
        if let Some(span) = find_elements(xhtml, selector, usize::MAX)?
            .into_iter()
            .find(|span| span.start >= section.end)
        {
            end = end.min(span.start);
        }
    }

    let trailing = PAGE_MARKUP.replace_all(balanced_prefix(&xhtml[section.end..end]), "");
    let trailing = trailing.trim();
    if trailing.is_empty() {
        return Ok(body);
    }
    debug!(bytes = trailing.len(), "Keeping markup between body and next region");
    if body.is_empty() {
        Ok(trailing.to_string())
    } else {
        Ok(format!("{body}\n{trailing}"))
    }
}

/// Drop a `div.content-area` that wraps the start of the body.
fn unwrap_content_area(body: &str) -> Result<String> {
    let Some(area) = find_element(body, &CONTENT_AREA)? else {
        return Ok(body.to_string());
    };
    if area.start != 0 {
        return Ok(body.to_string());
    }

    let inner = area.inner(body).trim();
    let trailing = body[area.end..].trim();
    if trailing.is_empty() {
        Ok(inner.to_string())
    } else {
        Ok(format!("{inner}\n{trailing}"))
    }
}

/// Plain text of an element's inner markup.
fn element_text(inner: &str) -> String {
    collapse_whitespace(&decode_entities(&strip_markup(inner)))
}

#[cfg(test)]
mod tests {
    use super::*;

    const LEGACY: &str = r#"<?xml version="1.0" encoding="utf-8"?>
<!DOCTYPE html>
<html xmlns="http://www.w3.org/1999/xhtml">
<head><title>Chapter VI &#8211; Mastering the Business of Hairstyling</title></head>
<body class="chap-title">
<section class="chap-title">
  <div class="chapter-number"><div class="chapter-number-text">VI</div></div>
  <div class="chapter-title-stack">
    <div class="chapter-title-vertical"></div>
    <div>
      <h1 class="chapter-title chapter-title-word">Mastering</h1>
      <h1 class="chapter-title chapter-title-word">the</h1>
      <h1 class="chapter-title chapter-title-word">Business</h1>
    </div>
  </div>
  <figure>
    <blockquote class="bible-quote-text">Whatever you do, work at it with <em>all</em> your heart.</blockquote>
    <figcaption class="bible-quote-reference">&#8212; Colossians 3:23</figcaption>
  </figure>
  <div class="introduction-paragraph dropcap-first-letter">
    Picture this powerful scene.
  </div>
</section>
<section class="chap-body">
  <div class="content-area">
    <h2>Money</h2>
    <p>Know your numbers &amp; margins.</p>
  </div>
</section>
<aside class="endnotes"><ol><li>First note.</li></ol></aside>
<section class="quiz-container chap-quiz"><h2>Quiz</h2></section>
<section class="worksheet"><p>Name ______</p></section>
<section class="image-quote"><p>Closing words.</p></section>
</body>
</html>"#;

    #[test]
    fn test_extract_heading() {
        let chapter = extract_chapter(LEGACY).unwrap();
        assert_eq!(chapter.roman, "VI");
        assert_eq!(chapter.title_words, vec!["Mastering", "the", "Business"]);
        assert_eq!(chapter.full_title(), "Mastering the Business");
    }

    #[test]
    fn test_extract_regions_keep_markup() {
        let chapter = extract_chapter(LEGACY).unwrap();
        assert_eq!(
            chapter.quote_text,
            "Whatever you do, work at it with <em>all</em> your heart."
        );
        assert_eq!(chapter.quote_reference, "&#8212; Colossians 3:23");
        assert_eq!(chapter.introduction, "Picture this powerful scene.");
        assert_eq!(chapter.body, "<h2>Money</h2>\n    <p>Know your numbers &amp; margins.</p>");
        assert_eq!(chapter.endnotes, "<ol><li>First note.</li></ol>");
        assert_eq!(chapter.quiz, "<h2>Quiz</h2>");
        assert_eq!(chapter.worksheet, "<p>Name ______</p>");
        assert_eq!(chapter.closing, "<p>Closing words.</p>");
    }

    #[test]
    fn test_title_fallback_to_document_title() {
        let page = r#"<html><head><title>Chapter XII - Growing Your Brand</title></head><body/></html>"#;
        let chapter = extract_chapter(page).unwrap();
        assert_eq!(chapter.roman, "XII");
        assert_eq!(chapter.title_words, vec!["Growing", "Your", "Brand"]);
        assert!(chapter.body.is_empty());
        assert!(chapter.endnotes.is_empty());
    }

    #[test]
    fn test_missing_everything() {
        let chapter = extract_chapter("<html><body><p>Loose text</p></body></html>").unwrap();
        assert_eq!(chapter.roman, "I");
        assert!(chapter.title_words.is_empty());
        assert_eq!(chapter.full_title(), "Chapter");
    }

    #[test]
    fn test_body_without_content_area() {
        let page = r#"<html><body><section class="chap-body"><p>Direct</p></section></body></html>"#;
        assert_eq!(extract_chapter(page).unwrap().body, "<p>Direct</p>");
    }

    #[test]
    fn test_body_keeps_following_siblings() {
        let page = r#"<html><body><div class="wrap">
<section class="chap-body"><div class="content-area"><p>Main.</p></div></section>
<section class="case-study"><p>Side.</p></section>
</div>
<aside class="endnotes"><p>Note.</p></aside>
</body></html>"#;
        assert_eq!(
            extract_chapter(page).unwrap().body,
            "<p>Main.</p>\n<section class=\"case-study\"><p>Side.</p></section>"
        );
    }

    #[test]
    fn test_body_ignores_page_breaks() {
        let page = r#"<html><body>
<section class="chap-body"><p>Main.</p></section>

<!-- PAGE BREAK -->
<div class="page-break"></div>

<!-- PAGE 5: ENDNOTES -->
<aside class="endnotes"><p>Note.</p></aside>
</body></html>"#;
        assert_eq!(extract_chapter(page).unwrap().body, "<p>Main.</p>");
    }

    #[test]
    fn test_into_chapter_without_title_words() {
        let page = r#"<html><head><title>Untitled</title></head><body>
<section class="chap-body"><p>Body.</p></section></body></html>"#;
        let chapter = extract_chapter(page).unwrap().into_chapter(6);
        assert_eq!(chapter.front.title_lines, vec!["Chapter"]);
        assert!(chapter.front.validate().is_ok());
    }

    #[test]
    fn test_into_chapter() {
        let chapter = extract_chapter(LEGACY).unwrap().into_chapter(6);
        assert_eq!(chapter.front.number, 6);
        assert_eq!(chapter.front.title_lines, vec!["Mastering", "the", "Business"]);
        assert_eq!(chapter.front.format, TextFormat::Markup);
        assert_eq!(chapter.title, "Mastering the Business");
        assert!(chapter.body.contains("Know your numbers"));
    }

    #[test]
    fn test_malformed_page_is_an_error() {
        assert!(extract_chapter("<html><body><div></span></body></html>").is_err());
    }
}
