//! Stylesheet coverage of the chapter styling hooks.

use std::collections::BTreeSet;

use cssparser::{ParseError, Parser, ParserInput, Token};
use serde::Serialize;

/// Classes a book stylesheet must define for chapter pages to render.
pub const REQUIRED_CLASSES: &[&str] = &[
    "chapter-number-container",
    "chapter-number-brush",
    "brushstroke-img",
    "chapter-number-text",
    "title-stack",
    "title-bar",
    "title-lines",
    "title-line",
    "bible-quote-container",
    "bible-quote-text",
    "bible-quote-reference",
    "introduction-heading",
    "dropcap-first-letter",
    "page-break",
    "avoid-break",
    "closing",
];

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct StylesheetReport {
    /// Every class used in a selector, sorted.
    pub defined_classes: BTreeSet<String>,
    /// Required classes with no selector in the stylesheet.
    pub missing_classes: Vec<String>,
    pub has_font_face: bool,
    pub has_font_family: bool,
}

impl StylesheetReport {
    pub fn is_complete(&self) -> bool {
        self.missing_classes.is_empty()
    }

    pub fn declares_fonts(&self) -> bool {
        self.has_font_face || self.has_font_family
    }
}

/// Check which required classes a stylesheet defines.
///
/// Classes are read from selectors with the CSS tokenizer, so a class name
/// that only appears in a comment, string or property value does not count.
///
/// ```
/// use aciss::compliance::check_stylesheet;
///
/// let report = check_stylesheet(".title-bar { width: 4px } /* .title-line */");
/// assert!(report.defined_classes.contains("title-bar"));
/// assert!(!report.defined_classes.contains("title-line"));
/// ```
pub fn check_stylesheet(css: &str) -> StylesheetReport {
    let mut report = StylesheetReport::default();
    let mut input = ParserInput::new(css);
    let mut parser = Parser::new(&mut input);
    scan(&mut parser, &mut report);

    report.missing_classes = REQUIRED_CLASSES
        .iter()
        .filter(|class| !report.defined_classes.contains(**class))
        .map(|class| class.to_string())
        .collect();
    report
}

fn scan<'i>(parser: &mut Parser<'i, '_>, report: &mut StylesheetReport) {
    let mut after_dot = false;

    loop {
        let token = match parser.next() {
            Ok(token) => token.clone(),
            Err(_) => break,
        };

        match &token {
            Token::Delim('.') => {
                after_dot = true;
                continue;
            }
            Token::Ident(name) if after_dot => {
                report.defined_classes.insert(name.to_string());
            }
            Token::Ident(name) if name.eq_ignore_ascii_case("font-family") => {
                report.has_font_family = true;
            }
            Token::AtKeyword(name) if name.eq_ignore_ascii_case("font-face") => {
                report.has_font_face = true;
            }
            Token::CurlyBracketBlock
            | Token::ParenthesisBlock
            | Token::SquareBracketBlock
            | Token::Function(_) => {
                let _ = parser.parse_nested_block(|nested| {
                    scan(nested, report);
                    Ok::<(), ParseError<'i, ()>>(())
                });
            }
            _ => {}
        }
        after_dot = false;
    }
}
