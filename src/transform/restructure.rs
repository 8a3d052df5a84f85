//! In-place restructuring of legacy chapter markup.
//!
//! Each rule rewrites one structural pattern and leaves all text untouched.
//! Every rule only matches the legacy form of its pattern, so running the
//! rewrite twice gives the same result as running it once.

use std::sync::LazyLock;

use regex::Regex;

use crate::render::{PAGE_BODY, PAGE_ENDNOTES, PAGE_QUIZ, PAGE_TITLE};

struct Rule {
    pattern: Regex,
    replacement: String,
}

impl Rule {
    fn new(pattern: &str, replacement: impl Into<String>) -> Self {
        Self {
            pattern: Regex::new(pattern).expect("valid regex"),
            replacement: replacement.into(),
        }
    }
}

fn page_break(next_page: &str, opening: &str) -> String {
    format!(
        "\n\n<!-- PAGE BREAK -->\n<div class=\"page-break\"></div>\n\n<!-- {next_page} -->\n{opening}"
    )
}

static RULES: LazyLock<Vec<Rule>> = LazyLock::new(|| {
    vec![
        // Vertical rule + word column becomes bar + line column; depth is unchanged.
        Rule::new(
            r#"(?s)<div class="chapter-title-stack">\s*<div class="chapter-title-vertical"[^>]*></div>\s*<div>"#,
            "<div class=\"title-stack\">\n            <div class=\"title-bar\"></div>\n            <div class=\"title-lines\">",
        ),
        Rule::new(
            r#"<h1 class="chapter-title chapter-title-word">([^<]+)</h1>"#,
            r#"<div class="title-line">${1}</div>"#,
        ),
        Rule::new(
            r#"(?s)</section>\s*<section class="chap-body""#,
            format!("</section>{}", page_break(PAGE_BODY, "<section class=\"chap-body\"")),
        ),
        Rule::new(
            r#"(?s)</section>\s*<aside class="endnotes""#,
            format!("</section>{}", page_break(PAGE_ENDNOTES, "<aside class=\"endnotes\"")),
        ),
        Rule::new(
            r#"(?s)</aside>\s*<section class="quiz-container"#,
            format!("</aside>{}", page_break(PAGE_QUIZ, "<section class=\"quiz-container")),
        ),
        Rule::new(r#"<body class="chap-title">"#, r#"<body class="chapter-page">"#),
        Rule::new(
            r#"<section class="quiz-container chap-quiz""#,
            r#"<section class="quiz-container chap-quiz avoid-break""#,
        ),
        Rule::new(
            r#"<section class="worksheet""#,
            r#"<section class="worksheet avoid-break""#,
        ),
        Rule::new(r#"<section class="image-quote""#, r#"<section class="closing""#),
    ]
});

static TITLE_SECTION: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r#"<section class="chap-title">"#).expect("valid regex"));

/// Rewrite legacy chapter markup into the current page structure.
///
/// ```
/// use aciss::transform::restructure;
///
/// let out = restructure(r#"<h1 class="chapter-title chapter-title-word">GROW</h1>"#);
/// assert_eq!(out, r#"<div class="title-line">GROW</div>"#);
/// ```
pub fn restructure(markup: &str) -> String {
    let mut content = markup.to_string();

    for rule in RULES.iter() {
        content = rule
            .pattern
            .replace_all(&content, rule.replacement.as_str())
            .into_owned();
    }

    let title_comment = format!("<!-- {PAGE_TITLE} -->");
    if !content.contains(&title_comment) {
        let replacement = format!("{title_comment}\n<section class=\"chap-title\">");
        content = TITLE_SECTION
            .replace_all(&content, replacement.as_str())
            .into_owned();
    }

    content
}
