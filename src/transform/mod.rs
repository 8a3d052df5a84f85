//! Chapter page transformation.
//!
//! Two strategies turn a legacy chapter page into the current layout:
//!
//! - [`Strategy::Restructure`] rewrites the legacy markup in place with
//!   [`restructure`]
//! - [`Strategy::Rebuild`] extracts every region and renders a fresh page
//!
//! Either way the reader-visible content must survive, which
//! [`transform_file`] checks after writing.

mod restructure;

use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use tracing::{info, warn};

pub use restructure::restructure;

use crate::config::RenderConfig;
use crate::error::{Error, Result};
use crate::extract::extract_chapter;
use crate::preserve::{PreservationReport, verify_content_regions, verify_preservation};
use crate::render::render_chapter_document;
use crate::util::{declare_utf8, read_document};

/// How a legacy chapter page is brought to the current layout.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[cfg_attr(feature = "cli", derive(clap::ValueEnum))]
#[serde(rename_all = "lowercase")]
pub enum Strategy {
    /// Extract the content and render a new page around it.
    Rebuild,
    /// Rewrite the structural markup in place.
    #[default]
    Restructure,
}

impl Strategy {
    pub fn as_str(self) -> &'static str {
        match self {
            Strategy::Rebuild => "rebuild",
            Strategy::Restructure => "restructure",
        }
    }
}

impl fmt::Display for Strategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Strategy {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "rebuild" => Ok(Strategy::Rebuild),
            "restructure" => Ok(Strategy::Restructure),
            _ => Err(Error::UnknownStrategy(s.to_string())),
        }
    }
}

/// Transform a chapter page held in memory.
pub fn transform_chapter(markup: &str, strategy: Strategy, config: &RenderConfig) -> Result<String> {
    match strategy {
        Strategy::Restructure => Ok(declare_utf8(&restructure(markup)).into_owned()),
        Strategy::Rebuild => {
            let extracted = extract_chapter(markup)?;
            // Without a body region the page is not a chapter and rebuilding would drop its text
            if extracted.body.is_empty() {
                return Err(Error::MissingElement("section.chap-body".to_string()));
            }
            let chapter = extracted.into_chapter(config.max_title_lines);
            chapter.front.validate()?;
            Ok(render_chapter_document(&chapter, config))
        }
    }
}

/// Check that `processed` kept the content of `original`.
///
/// Restructured pages must keep all of their text; rebuilt pages regenerate
/// the chrome, so the text is compared with the chrome left out.
pub fn verify_transform(
    original: &str,
    processed: &str,
    strategy: Strategy,
) -> Result<PreservationReport> {
    match strategy {
        Strategy::Restructure => Ok(verify_preservation(original, processed)),
        Strategy::Rebuild => verify_content_regions(original, processed),
    }
}

/// Result of transforming one file.
#[derive(Debug, Clone, Serialize)]
pub struct TransformOutcome {
    pub input: PathBuf,
    pub output: PathBuf,
    pub strategy: Strategy,
    pub preservation: PreservationReport,
}

impl TransformOutcome {
    pub fn preserved(&self) -> bool {
        self.preservation.is_preserved()
    }
}

/// Transform `input` and write the result to `output`.
///
/// The output is written even when the preservation check fails; the
/// returned outcome records the difference.
pub fn transform_file(
    input: impl AsRef<Path>,
    output: impl AsRef<Path>,
    strategy: Strategy,
    config: &RenderConfig,
) -> Result<TransformOutcome> {
    let input = input.as_ref();
    let output = output.as_ref();

    let original = read_document(input)?;
    let processed = transform_chapter(&original, strategy, config)?;
    if let Some(parent) = output.parent()
        && !parent.as_os_str().is_empty()
    {
        std::fs::create_dir_all(parent)?;
    }
    std::fs::write(output, &processed)?;

    let preservation = verify_transform(&original, &processed, strategy)?;
    if preservation.is_preserved() {
        info!(
            input = %input.display(),
            output = %output.display(),
            %strategy,
            chars = preservation.original_len,
            "Transformed chapter"
        );
    } else {
        warn!(
            input = %input.display(),
            output = %output.display(),
            %strategy,
            "{}",
            preservation.summary()
        );
    }

    Ok(TransformOutcome {
        input: input.to_path_buf(),
        output: output.to_path_buf(),
        strategy,
        preservation,
    })
}
