//! Content-preservation checks between an original page and its rework.
//!
//! Restyling a chapter may move, wrap and re-class any element, but the
//! reader-visible text must come out identical. Both documents are reduced
//! to their normalised text and compared.

use std::path::Path;
use std::sync::LazyLock;

use regex::Regex;
use serde::Serialize;
use similar::{ChangeTag, TextDiff};

use crate::error::Result;
use crate::extract::{Selector, find_elements};
use crate::util::{collapse_whitespace, decode_entities, read_document, strip_markup};

/// Characters of context shown on each side of the first difference.
const CONTEXT_CHARS: usize = 20;

/// Upper bound on the changed words listed in a report.
const MAX_CHANGED_WORDS: usize = 20;

/// Page chrome that rebuilding regenerates: the document head, the numeral
/// badge, the title stack and the introduction heading, in both the legacy
/// and current markup.
const CHROME: &[Selector<'static>] = &[
    Selector::new("head", &[]),
    Selector::new("*", &["chapter-number"]),
    Selector::new("*", &["chapter-number-container"]),
    Selector::new("*", &["chapter-number-text"]),
    Selector::new("*", &["chapter-title-stack"]),
    Selector::new("*", &["chapter-title-container"]),
    Selector::new("*", &["title-stack"]),
    Selector::new("*", &["chapter-title-word"]),
    Selector::new("*", &["title-line"]),
    Selector::new("*", &["introduction-heading"]),
];

static LINE_MARKER: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?m)^[ \t]*→[ \t]*").expect("valid regex"));
static WORKSHEET_RULE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\s*_{3,}\s*").expect("valid regex"));

/// Reduce an XHTML document or fragment to its normalised text.
///
/// Markup, comments, the XML declaration and DOCTYPE are removed, entities
/// decoded and whitespace collapsed. Worksheet fill-in rules (`____`) and
/// `→` markers at the start of a line are layout, not content, and are dropped.
pub fn extract_text(markup: &str) -> String {
    let stripped = strip_markup(markup);
    let text = decode_entities(&stripped);
    let text = LINE_MARKER.replace_all(&text, "");
    let text = WORKSHEET_RULE.replace_all(&text, " ");
    collapse_whitespace(&text)
}

/// Outcome of a preservation check.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Verdict {
    Preserved,
    Changed,
    /// No text could be extracted from the original.
    EmptyOriginal,
    /// No text could be extracted from the processed document.
    EmptyProcessed,
}

/// Where two texts first diverge, with surrounding context from each.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Difference {
    /// Character offset of the first differing character.
    pub offset: usize,
    pub original_context: String,
    pub processed_context: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PreservationReport {
    pub verdict: Verdict,
    /// Length of the original text, in characters.
    pub original_len: usize,
    /// Length of the processed text, in characters.
    pub processed_len: usize,
    pub first_difference: Option<Difference>,
    /// Words missing from the processed text (capped).
    pub removed_words: Vec<String>,
    /// Words present only in the processed text (capped).
    pub added_words: Vec<String>,
}

impl PreservationReport {
    pub fn is_preserved(&self) -> bool {
        self.verdict == Verdict::Preserved
    }

    /// One-line description for logs and CLI output.
    pub fn summary(&self) -> String {
        match self.verdict {
            Verdict::Preserved => format!("content preserved ({} chars)", self.original_len),
            Verdict::EmptyOriginal => "no text extracted from original".to_string(),
            Verdict::EmptyProcessed => "no text extracted from processed document".to_string(),
            Verdict::Changed => {
                let mut s = format!(
                    "content differs: original {} chars, processed {} chars",
                    self.original_len, self.processed_len
                );
                if let Some(diff) = &self.first_difference {
                    s.push_str(&format!(
                        "; first difference at {}: ...{}... vs ...{}...",
                        diff.offset, diff.original_context, diff.processed_context
                    ));
                }
                s
            }
        }
    }
}

/// Compare the text content of two documents.
///
/// ```
/// use aciss::preserve::verify_preservation;
///
/// let report = verify_preservation(
///     "<p>Every <b>word</b> counts.</p>",
///     "<div class=\"content-area\"><p>Every word counts.</p></div>",
/// );
/// assert!(report.is_preserved());
/// ```
pub fn verify_preservation(original: &str, processed: &str) -> PreservationReport {
    compare_texts(&extract_text(original), &extract_text(processed))
}

/// Compare the text content of two files on disk.
pub fn verify_files(original: impl AsRef<Path>, processed: impl AsRef<Path>) -> Result<PreservationReport> {
    let original = read_document(original)?;
    let processed = read_document(processed)?;
    Ok(verify_preservation(&original, &processed))
}

/// Normalised text of a chapter page without its chrome (document head,
/// numeral badge, title, introduction heading), which regeneration is free
/// to rewrite. Everything else on the page counts as content.
pub fn content_text(markup: &str) -> Result<String> {
    let mut spans = Vec::new();
    for selector in CHROME {
        spans.extend(find_elements(markup, selector, usize::MAX)?);
    }
    spans.sort_by_key(|span| span.start);

    let mut kept = String::with_capacity(markup.len());
    let mut pos = 0;
    for span in spans {
        // Chrome nested in chrome already removed
        if span.start < pos {
            continue;
        }
        kept.push_str(&markup[pos..span.start]);
        kept.push(' ');
        pos = span.end;
    }
    kept.push_str(&markup[pos..]);

    Ok(extract_text(&kept))
}

/// Compare two chapter pages, ignoring their chrome.
///
/// Used when a page is regenerated rather than edited in place.
pub fn verify_content_regions(original: &str, processed: &str) -> Result<PreservationReport> {
    Ok(compare_texts(
        &content_text(original)?,
        &content_text(processed)?,
    ))
}

/// Compare two already-normalised texts.
pub fn compare_texts(original: &str, processed: &str) -> PreservationReport {
    let original_len = original.chars().count();
    let processed_len = processed.chars().count();

    let verdict = if original.is_empty() {
        Verdict::EmptyOriginal
    } else if processed.is_empty() {
        Verdict::EmptyProcessed
    } else if original == processed {
        Verdict::Preserved
    } else {
        Verdict::Changed
    };

    let mut report = PreservationReport {
        verdict,
        original_len,
        processed_len,
        first_difference: None,
        removed_words: Vec::new(),
        added_words: Vec::new(),
    };

    if verdict == Verdict::Changed {
        report.first_difference = Some(first_difference(original, processed));
        let (removed, added) = changed_words(original, processed);
        report.removed_words = removed;
        report.added_words = added;
    }

    report
}

fn first_difference(original: &str, processed: &str) -> Difference {
    let a: Vec<char> = original.chars().collect();
    let b: Vec<char> = processed.chars().collect();

    let offset = a
        .iter()
        .zip(&b)
        .position(|(x, y)| x != y)
        .unwrap_or(a.len().min(b.len()));

    let context = |chars: &[char]| -> String {
        let start = offset.saturating_sub(CONTEXT_CHARS);
        let end = (offset + CONTEXT_CHARS).min(chars.len());
        chars.get(start..end).map(|s| s.iter().collect()).unwrap_or_default()
    };

    Difference {
        offset,
        original_context: context(&a),
        processed_context: context(&b),
    }
}

fn changed_words(original: &str, processed: &str) -> (Vec<String>, Vec<String>) {
    let diff = TextDiff::from_words(original, processed);
    let mut removed = Vec::new();
    let mut added = Vec::new();

    for change in diff.iter_all_changes() {
        let word = change.value().trim();
        if word.is_empty() {
            continue;
        }
        match change.tag() {
            ChangeTag::Delete if removed.len() < MAX_CHANGED_WORDS => removed.push(word.to_string()),
            ChangeTag::Insert if added.len() < MAX_CHANGED_WORDS => added.push(word.to_string()),
            _ => {}
        }
    }

    (removed, added)
}
