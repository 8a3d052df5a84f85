//! Part divider pages.
//!
//! Part dividers carry little content; cleanup only normalises the head and
//! whitespace left behind by earlier editing.

use std::path::{Path, PathBuf};
use std::sync::LazyLock;

use regex::Regex;
use serde::Serialize;
use tracing::{info, warn};

use crate::error::Result;
use crate::preserve::{PreservationReport, verify_preservation};
use crate::util::{declare_utf8, read_document};

static BLANK_LINES: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(\n[ \t]*){3,}").expect("valid regex"));
static STYLESHEET_LINKS: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r#"<link rel="stylesheet" type="text/css" href="\.\./styles/fonts\.css"\s*/>\s*<link rel="stylesheet" type="text/css" href="\.\./styles/style\.css"\s*/>"#,
    )
    .expect("valid regex")
});
static META_CHARSET: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r#"<meta charset="utf-8"\s*/>"#).expect("valid regex"));
static EMPTY_COMMENT: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"<!--\s*-->").expect("valid regex"));
static DOCTYPE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)<!DOCTYPE[^>]*>").expect("valid regex"));

const LINKS: &str = "<link rel=\"stylesheet\" type=\"text/css\" href=\"../styles/fonts.css\" />\n    \
<link rel=\"stylesheet\" type=\"text/css\" href=\"../styles/style.css\" />";

/// Normalise a part divider page without touching its text.
///
/// ```
/// use aciss::part::clean_part_divider;
///
/// let page = "<!DOCTYPE html PUBLIC \"-//W3C//DTD XHTML 1.1//EN\">\n<html><body>\n\n\n\n<h1>Part One</h1><!-- --></body></html>";
/// assert_eq!(
///     clean_part_divider(page),
///     "<!DOCTYPE html>\n<html><body>\n\n<h1>Part One</h1></body></html>"
/// );
/// ```
pub fn clean_part_divider(markup: &str) -> String {
    let content = declare_utf8(markup);
    let content = EMPTY_COMMENT.replace_all(&content, "");
    let content = STYLESHEET_LINKS.replace_all(&content, LINKS);
    let content = META_CHARSET.replace_all(&content, r#"<meta charset="utf-8" />"#);
    let content = BLANK_LINES.replace_all(&content, "\n\n");
    DOCTYPE.replace_all(&content, "<!DOCTYPE html>").into_owned()
}

/// Result of cleaning one part divider file.
#[derive(Debug, Clone, Serialize)]
pub struct PartOutcome {
    pub input: PathBuf,
    pub output: PathBuf,
    pub preservation: PreservationReport,
}

impl PartOutcome {
    pub fn preserved(&self) -> bool {
        self.preservation.is_preserved()
    }
}

/// Clean `input` and write the result to `output`.
pub fn process_part_file(input: impl AsRef<Path>, output: impl AsRef<Path>) -> Result<PartOutcome> {
    let input = input.as_ref();
    let output = output.as_ref();

    let original = read_document(input)?;
    let processed = clean_part_divider(&original);
    if let Some(parent) = output.parent()
        && !parent.as_os_str().is_empty()
    {
        std::fs::create_dir_all(parent)?;
    }
    std::fs::write(output, &processed)?;

    let preservation = verify_preservation(&original, &processed);
    if preservation.is_preserved() {
        info!(input = %input.display(), "Cleaned part divider");
    } else {
        warn!(input = %input.display(), "{}", preservation.summary());
    }

    Ok(PartOutcome {
        input: input.to_path_buf(),
        output: output.to_path_buf(),
        preservation,
    })
}
