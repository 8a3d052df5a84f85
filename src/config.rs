//! Configuration loaded from `aciss.toml`.
//!
//! Every section and field is optional; anything left out keeps the values the
//! book was produced with.

use std::path::Path;

use serde::Deserialize;

use crate::error::Result;
use crate::render::DEFAULT_MAX_TITLE_LINES;
use crate::transform::Strategy;

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct Config {
    pub render: RenderConfig,
    pub validate: ValidateConfig,
    pub batch: BatchConfig,
}

impl Config {
    /// Load configuration from a TOML file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path)?;
        let config = Self::from_toml_str(&content)?;
        tracing::debug!(path = %path.display(), "Loaded configuration");
        Ok(config)
    }

    pub fn from_toml_str(s: &str) -> Result<Self> {
        Ok(toml::from_str(s)?)
    }
}

/// Settings for chapter page generation.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct RenderConfig {
    /// Stylesheets linked from every generated chapter, in order.
    pub stylesheets: Vec<String>,
    /// Image placed behind the chapter numeral.
    pub brushstroke_src: String,
    /// Label of the section heading above the dropcap paragraph.
    pub heading: String,
    pub language: String,
    pub max_title_lines: usize,
}

impl Default for RenderConfig {
    fn default() -> Self {
        Self {
            stylesheets: vec![
                "../styles/fonts.css".to_string(),
                "../styles/style.css".to_string(),
            ],
            brushstroke_src: "../images/brushstroke.JPEG".to_string(),
            heading: "Introduction".to_string(),
            language: "en".to_string(),
            max_title_lines: DEFAULT_MAX_TITLE_LINES,
        }
    }
}

impl RenderConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_stylesheets<I, S>(mut self, hrefs: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.stylesheets = hrefs.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_brushstroke_src(mut self, src: impl Into<String>) -> Self {
        self.brushstroke_src = src.into();
        self
    }

    pub fn with_heading(mut self, heading: impl Into<String>) -> Self {
        self.heading = heading.into();
        self
    }

    pub fn with_language(mut self, language: impl Into<String>) -> Self {
        self.language = language.into();
        self
    }

    pub fn with_max_title_lines(mut self, max: usize) -> Self {
        self.max_title_lines = max;
        self
    }
}

/// Pass thresholds for directory validation, in percent.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct ValidateConfig {
    pub content_threshold: f64,
    pub compliance_threshold: f64,
}

impl Default for ValidateConfig {
    fn default() -> Self {
        Self {
            content_threshold: 95.0,
            compliance_threshold: 90.0,
        }
    }
}

/// File selection and transformation strategy for batch runs.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct BatchConfig {
    pub chapter_pattern: String,
    pub part_pattern: String,
    pub strategy: Strategy,
}

impl Default for BatchConfig {
    fn default() -> Self {
        Self {
            chapter_pattern: "*-chapter-*.xhtml".to_string(),
            part_pattern: "*-Part-*.xhtml".to_string(),
            strategy: Strategy::Restructure,
        }
    }
}
