//! Structural checks on finished chapter pages and book assets.
//!
//! Nothing here modifies a file. Checks report what is missing so a batch
//! run can summarise it (see [`crate::batch::validate_directory`]).

mod stylesheet;

use std::collections::BTreeSet;
use std::path::{Path, PathBuf};
use std::sync::LazyLock;

use percent_encoding::percent_decode_str;
use quick_xml::Reader;
use quick_xml::events::Event;
use regex::Regex;
use serde::Serialize;

pub use stylesheet::{REQUIRED_CLASSES, StylesheetReport, check_stylesheet};

use crate::preserve::extract_text;
use crate::render::PAGE_COMMENTS;
use crate::util::decode_entities;

const XHTML_NAMESPACE: &str = "http://www.w3.org/1999/xhtml";

/// Styling hooks every chapter page must carry, with a description for reports.
pub const REQUIRED_HOOKS: &[(&str, &str)] = &[
    ("chapter-number-brush", "Roman numeral with brushstroke"),
    ("brushstroke-img", "Brushstroke background image"),
    ("title-stack", "Vertical title stack"),
    ("title-bar", "Accent bar beside title"),
    ("title-line", "Individual title lines"),
    ("bible-quote-container", "Bible quote container"),
    ("page-break", "Page break elements"),
];

/// Pages with more words than this count as substantial.
pub const SUBSTANTIAL_WORDS: usize = 1000;

/// Minimum `page-break-before` rules expected for the six-page layout.
pub const PAGE_STRUCTURE_MIN_BREAKS: usize = 5;

static CLASS_ATTR: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"\sclass\s*=\s*(?:"([^"]*)"|'([^']*)')"#).expect("valid regex")
});
static COMMENT: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?s)<!--(.*?)-->").expect("valid regex"));
static IMG_SRC: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"<img[^>]+src\s*=\s*["']([^"']+)["']"#).expect("valid regex")
});

/// Every class token used in a page.
pub fn class_tokens(markup: &str) -> BTreeSet<&str> {
    CLASS_ATTR
        .captures_iter(markup)
        .filter_map(|caps| caps.get(1).or_else(|| caps.get(2)))
        .flat_map(|value| value.as_str().split_whitespace())
        .collect()
}

fn comment_texts(markup: &str) -> BTreeSet<&str> {
    COMMENT
        .captures_iter(markup)
        .filter_map(|caps| caps.get(1))
        .map(|m| m.as_str().trim())
        .collect()
}

/// Missing hooks and page comments of one chapter page.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ComplianceReport {
    pub issues: Vec<String>,
}

impl ComplianceReport {
    pub fn is_compliant(&self) -> bool {
        self.issues.is_empty()
    }
}

/// Check a chapter page for the required hooks and page comments.
///
/// ```
/// use aciss::compliance::check_chapter;
///
/// let report = check_chapter("<html><body><p>Plain page</p></body></html>");
/// assert!(!report.is_compliant());
/// assert!(report.issues[0].contains("chapter-number-brush"));
/// ```
pub fn check_chapter(markup: &str) -> ComplianceReport {
    let classes = class_tokens(markup);
    let comments = comment_texts(markup);

    let mut issues: Vec<String> = REQUIRED_HOOKS
        .iter()
        .filter(|(class, _)| !classes.contains(class))
        .map(|(class, description)| format!("Missing {description} ({class})"))
        .collect();

    issues.extend(
        PAGE_COMMENTS
            .iter()
            .filter(|comment| !comments.contains(**comment))
            .map(|comment| format!("Missing page structure comment: {comment}")),
    );

    ComplianceReport { issues }
}

/// Document-level XHTML checks.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct XhtmlChecks {
    pub xml_declaration: bool,
    pub doctype: bool,
    pub xhtml_namespace: bool,
    pub title: bool,
    pub stylesheet_link: bool,
    pub body: bool,
    pub closing_html: bool,
    pub well_formed: bool,
    /// Parser message when the page is not well-formed.
    pub parse_error: Option<String>,
}

impl XhtmlChecks {
    pub fn is_valid(&self) -> bool {
        self.errors().is_empty()
    }

    /// Failed checks as messages.
    pub fn errors(&self) -> Vec<String> {
        let mut errors = Vec::new();
        let checks = [
            (self.xml_declaration, "Missing XML declaration"),
            (self.doctype, "Missing DOCTYPE"),
            (self.xhtml_namespace, "Missing XHTML namespace"),
            (self.title, "Missing title element"),
            (self.stylesheet_link, "Missing CSS stylesheet link"),
            (self.body, "Missing body element"),
            (self.closing_html, "Missing closing </html>"),
        ];
        for (ok, message) in checks {
            if !ok {
                errors.push(message.to_string());
            }
        }
        if !self.well_formed {
            match &self.parse_error {
                Some(e) => errors.push(format!("XML parsing error: {e}")),
                None => errors.push("Document is not well-formed".to_string()),
            }
        }
        errors
    }
}

/// Parse a page as XML and check its document structure.
pub fn check_xhtml(markup: &str) -> XhtmlChecks {
    let mut checks = XhtmlChecks {
        closing_html: markup.trim_end().ends_with("</html>"),
        ..Default::default()
    };

    let mut reader = Reader::from_str(markup);
    let mut depth = 0usize;

    loop {
        match reader.read_event() {
            Ok(Event::Decl(_)) => checks.xml_declaration = true,
            Ok(Event::DocType(_)) => checks.doctype = true,
            Ok(Event::Start(e)) => {
                depth += 1;
                match e.local_name().as_ref() {
                    b"html" => {
                        checks.xhtml_namespace = e.attributes().flatten().any(|a| {
                            a.key.as_ref() == b"xmlns" && a.value.as_ref() == XHTML_NAMESPACE.as_bytes()
                        });
                    }
                    b"title" => checks.title = true,
                    b"body" => checks.body = true,
                    _ => {}
                }
            }
            Ok(Event::Empty(e)) => match e.local_name().as_ref() {
                b"link" => {
                    if e.attributes()
                        .flatten()
                        .any(|a| a.key.as_ref() == b"rel" && a.value.as_ref() == b"stylesheet")
                    {
                        checks.stylesheet_link = true;
                    }
                }
                b"title" => checks.title = true,
                b"body" => checks.body = true,
                _ => {}
            },
            Ok(Event::End(_)) => depth = depth.saturating_sub(1),
            Ok(Event::Eof) => {
                checks.well_formed = depth == 0;
                if depth != 0 {
                    checks.parse_error = Some(format!("{depth} unclosed element(s) at end of document"));
                }
                break;
            }
            Ok(_) => {}
            Err(e) => {
                checks.parse_error = Some(e.to_string());
                break;
            }
        }
    }

    checks
}

/// Which recognisable parts a chapter page contains.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct SectionInventory {
    pub brush_badge: bool,
    pub title_stack: bool,
    pub title_bar: bool,
    pub title_lines: bool,
    pub epigraph: bool,
    pub footnotes: bool,
    pub case_studies: bool,
    pub quiz_or_worksheet: bool,
    pub closing: bool,
    /// `div.page-break` separators.
    pub page_break_elements: usize,
    /// `page-break-before` rules in inline styles or classes.
    pub page_break_rules: usize,
    pub word_count: usize,
}

impl SectionInventory {
    /// More than [`SUBSTANTIAL_WORDS`] words of text.
    pub fn is_substantial(&self) -> bool {
        self.word_count > SUBSTANTIAL_WORDS
    }

    pub fn has_page_structure(&self) -> bool {
        self.page_break_rules >= PAGE_STRUCTURE_MIN_BREAKS
    }

    /// Human-readable names of the parts found.
    pub fn found(&self) -> Vec<String> {
        let mut found: Vec<String> = [
            (self.brush_badge, "Chapter number with brush styling"),
            (self.title_stack, "Title stack structure"),
            (self.title_bar, "Title bar"),
            (self.title_lines, "Title lines"),
            (self.epigraph, "Bible quote sections"),
            (self.footnotes, "Footnotes"),
            (self.case_studies, "Case studies"),
            (self.quiz_or_worksheet, "Interactive sections (quiz/worksheet)"),
            (self.closing, "Closing section"),
        ]
        .into_iter()
        .filter(|(present, _)| *present)
        .map(|(_, name)| name.to_string())
        .collect();

        if self.page_break_elements > 0 {
            found.push(format!("Page breaks ({})", self.page_break_elements));
        }
        if self.has_page_structure() {
            found.push(format!("Page structure ({} page breaks)", self.page_break_rules));
        }
        found
    }
}

/// Inventory the parts of a chapter page.
pub fn detect_sections(markup: &str) -> SectionInventory {
    let classes = class_tokens(markup);

    SectionInventory {
        brush_badge: classes.contains("chapter-number-brush"),
        title_stack: classes.contains("title-stack"),
        title_bar: classes.contains("title-bar"),
        title_lines: classes.contains("title-lines"),
        epigraph: classes.contains("bible-quote-container"),
        footnotes: has_class_prefix(&classes, &["footnote", "endnote"]),
        case_studies: has_class_prefix(&classes, &["case-study"]),
        quiz_or_worksheet: has_class_prefix(&classes, &["quiz", "worksheet"]),
        closing: has_class_prefix(&classes, &["closing"]),
        page_break_elements: markup.matches("class=\"page-break\"").count(),
        page_break_rules: markup.matches("page-break-before").count(),
        word_count: extract_text(markup).split_whitespace().count(),
    }
}

fn has_class_prefix(classes: &BTreeSet<&str>, prefixes: &[&str]) -> bool {
    classes
        .iter()
        .any(|class| prefixes.iter().any(|p| class.starts_with(p)))
}

/// Image references under `../images/` that do not exist in `images_dir`.
///
/// Sources are entity- and percent-decoded before lookup. References outside
/// `../images/` are not checked.
pub fn check_image_references(markup: &str, images_dir: impl AsRef<Path>) -> Vec<PathBuf> {
    let images_dir = images_dir.as_ref();
    IMG_SRC
        .captures_iter(markup)
        .filter_map(|caps| {
            let src = decode_entities(&caps[1]).into_owned();
            let name = src.strip_prefix("../images/")?;
            let name = percent_decode_str(name).decode_utf8_lossy();
            let path = images_dir.join(&*name);
            (!path.exists()).then_some(path)
        })
        .collect()
}
