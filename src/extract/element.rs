//! Locating elements in XHTML by tag name and class.

use quick_xml::Reader;
use quick_xml::events::{BytesStart, Event};

use crate::error::Result;

/// Byte offsets of an element within its source document.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ElementSpan {
    /// Offset of the opening `<`.
    pub start: usize,
    /// Offset just past the start tag.
    pub inner_start: usize,
    /// Offset of the closing tag (equal to `inner_start` for empty elements).
    pub inner_end: usize,
    /// Offset just past the closing tag.
    pub end: usize,
}

impl ElementSpan {
    pub fn inner<'a>(&self, src: &'a str) -> &'a str {
        &src[self.inner_start..self.inner_end]
    }

    pub fn outer<'a>(&self, src: &'a str) -> &'a str {
        &src[self.start..self.end]
    }
}

/// Matches elements by local tag name and required class tokens.
///
/// A tag of `*` matches any element.
#[derive(Debug, Clone, Copy)]
pub struct Selector<'a> {
    pub tag: &'a str,
    pub classes: &'a [&'a str],
}

impl<'a> Selector<'a> {
    pub const fn new(tag: &'a str, classes: &'a [&'a str]) -> Self {
        Self { tag, classes }
    }

    pub fn matches(&self, e: &BytesStart<'_>) -> bool {
        if self.tag != "*" && e.local_name().as_ref() != self.tag.as_bytes() {
            return false;
        }
        if self.classes.is_empty() {
            return true;
        }

        let Some(class_attr) = e
            .attributes()
            .flatten()
            .find(|a| a.key.as_ref() == b"class")
        else {
            return false;
        };
        let value = String::from_utf8_lossy(&class_attr.value);
        self.classes
            .iter()
            .all(|wanted| value.split_whitespace().any(|token| token == *wanted))
    }
}

/// Find the first element matching `selector`.
pub fn find_element(src: &str, selector: &Selector<'_>) -> Result<Option<ElementSpan>> {
    Ok(find_elements(src, selector, 1)?.into_iter().next())
}

/// Find up to `limit` outermost elements matching `selector`, in document order.
///
/// Matches nested inside an earlier match are not reported.
pub fn find_elements(src: &str, selector: &Selector<'_>, limit: usize) -> Result<Vec<ElementSpan>> {
    let mut reader = Reader::from_str(src);
    let mut spans = Vec::new();
    let mut depth = 0usize;
    // (depth, start, inner_start) of the match currently open
    let mut open: Option<(usize, usize, usize)> = None;

    while spans.len() < limit {
        let before = reader.buffer_position() as usize;
        match reader.read_event()? {
            Event::Start(e) => {
                depth += 1;
                if open.is_none() && selector.matches(&e) {
                    let inner_start = reader.buffer_position() as usize;
                    open = Some((depth, tag_open_at(src, before), inner_start));
                }
            }
            Event::Empty(e) => {
                if open.is_none() && selector.matches(&e) {
                    let end = reader.buffer_position() as usize;
                    spans.push(ElementSpan {
                        start: tag_open_at(src, before),
                        inner_start: end,
                        inner_end: end,
                        end,
                    });
                }
            }
            Event::End(_) => {
                if let Some((open_depth, start, inner_start)) = open
                    && open_depth == depth
                {
                    spans.push(ElementSpan {
                        start,
                        inner_start,
                        inner_end: tag_open_at(src, before),
                        end: reader.buffer_position() as usize,
                    });
                    open = None;
                }
                depth = depth.saturating_sub(1);
            }
            Event::Eof => break,
            _ => {}
        }
    }

    Ok(spans)
}

/// The leading part of `fragment` that closes no element it did not open.
///
/// Markup taken from the middle of a document may end with the closing tags
/// of its ancestors; everything from the first such tag on is cut.
pub(crate) fn balanced_prefix(fragment: &str) -> &str {
    let mut reader = Reader::from_str(fragment);
    let mut depth = 0usize;

    loop {
        let before = reader.buffer_position() as usize;
        match reader.read_event() {
            Ok(Event::Start(_)) => depth += 1,
            Ok(Event::End(_)) if depth == 0 => return &fragment[..tag_open_at(fragment, before)],
            Ok(Event::End(_)) => depth -= 1,
            Ok(Event::Eof) => return fragment,
            Ok(_) => {}
            Err(_) => return &fragment[..tag_open_at(fragment, before)],
        }
    }
}

/// Offset of the `<` that opens the markup read from `pos`.
fn tag_open_at(src: &str, pos: usize) -> usize {
    if src[pos..].starts_with('<') {
        pos
    } else {
        src[..pos].rfind('<').unwrap_or(pos)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const DOC: &str = r#"<html><body>
<div class="intro dropcap">Hello <b>there</b></div>
<h1 class="chapter-title chapter-title-word">ONE</h1>
<h1 class="chapter-title-word">TWO</h1>
<img class="brushstroke-img" src="a.jpg"/>
</body></html>"#;

    #[test]
    fn test_find_element_inner_and_outer() {
        let span = find_element(DOC, &Selector::new("div", &["dropcap"]))
            .unwrap()
            .unwrap();
        assert_eq!(span.inner(DOC), "Hello <b>there</b>");
        assert_eq!(
            span.outer(DOC),
            r#"<div class="intro dropcap">Hello <b>there</b></div>"#
        );
    }

    #[test]
    fn test_find_elements_in_order() {
        let spans = find_elements(DOC, &Selector::new("h1", &["chapter-title-word"]), usize::MAX)
            .unwrap();
        let words: Vec<&str> = spans.iter().map(|s| s.inner(DOC)).collect();
        assert_eq!(words, vec!["ONE", "TWO"]);
    }

    #[test]
    fn test_class_tokens_must_all_match() {
        assert!(
            find_element(DOC, &Selector::new("div", &["intro", "missing"]))
                .unwrap()
                .is_none()
        );
        // Substrings of a token do not match
        assert!(find_element(DOC, &Selector::new("div", &["drop"])).unwrap().is_none());
    }

    #[test]
    fn test_any_tag() {
        let span = find_element(DOC, &Selector::new("*", &["brushstroke-img"]))
            .unwrap()
            .unwrap();
        assert!(span.outer(DOC).starts_with("<img"));
    }

    #[test]
    fn test_empty_element() {
        let span = find_element(DOC, &Selector::new("img", &["brushstroke-img"]))
            .unwrap()
            .unwrap();
        assert_eq!(span.inner(DOC), "");
        assert_eq!(span.outer(DOC), r#"<img class="brushstroke-img" src="a.jpg"/>"#);
    }

    #[test]
    fn test_nested_same_tag() {
        let src = r#"<section class="chap-body"><div class="content-area"><div>x</div></div></section>"#;
        let span = find_element(src, &Selector::new("div", &["content-area"]))
            .unwrap()
            .unwrap();
        assert_eq!(span.inner(src), "<div>x</div>");
    }

    #[test]
    fn test_balanced_prefix() {
        let tail = "\n<section class=\"case\"><p>Kept.</p></section>\n</div>\n</body>";
        assert_eq!(
            balanced_prefix(tail),
            "\n<section class=\"case\"><p>Kept.</p></section>\n"
        );
        assert_eq!(balanced_prefix("<p>a</p><br/>"), "<p>a</p><br/>");
        assert_eq!(balanced_prefix("</body></html>"), "");
    }

    #[test]
    fn test_mismatched_tags_are_an_error() {
        assert!(find_element("<div><p></div>", &Selector::new("p", &[])).is_err());
    }
}
