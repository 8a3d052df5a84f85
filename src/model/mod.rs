//! Chapter data: the front-matter record and the full six-page chapter.

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::roman::to_roman;

/// How the text fields of a [`ChapterFrontMatter`] are emitted.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TextFormat {
    /// Plain text, escaped on output.
    #[default]
    Plain,
    /// XHTML fragments copied verbatim (used for content lifted from existing pages).
    Markup,
}

/// A quotation placed at the start of a chapter, with its source.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Epigraph {
    pub text: String,
    pub attribution: String,
}

impl Epigraph {
    pub fn new(text: impl Into<String>, attribution: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            attribution: attribution.into(),
        }
    }
}

/// Title-page metadata of a single chapter.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChapterFrontMatter {
    /// Chapter ordinal, displayed as a roman numeral.
    pub number: u32,
    /// Title display lines, stacked top to bottom in this order.
    pub title_lines: Vec<String>,
    pub epigraph: Epigraph,
    /// Opening paragraph; its first character becomes the dropcap.
    pub introduction: String,
    #[serde(default)]
    pub format: TextFormat,
}

impl ChapterFrontMatter {
    pub fn new(number: u32) -> Self {
        Self {
            number,
            title_lines: Vec::new(),
            epigraph: Epigraph::new("", ""),
            introduction: String::new(),
            format: TextFormat::Plain,
        }
    }

    pub fn with_title_line(mut self, line: impl Into<String>) -> Self {
        self.title_lines.push(line.into());
        self
    }

    pub fn with_title_lines<I, S>(mut self, lines: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.title_lines.extend(lines.into_iter().map(Into::into));
        self
    }

    pub fn with_epigraph(mut self, text: impl Into<String>, attribution: impl Into<String>) -> Self {
        self.epigraph = Epigraph::new(text, attribution);
        self
    }

    pub fn with_introduction(mut self, text: impl Into<String>) -> Self {
        self.introduction = text.into();
        self
    }

    pub fn with_format(mut self, format: TextFormat) -> Self {
        self.format = format;
        self
    }

    /// The chapter number as shown on the badge.
    pub fn roman(&self) -> String {
        to_roman(self.number)
    }

    /// The title lines joined into a single line of text.
    pub fn full_title(&self) -> String {
        self.title_lines.join(" ")
    }

    /// Check the record invariants: at least one non-blank title line.
    pub fn validate(&self) -> Result<()> {
        if self.title_lines.is_empty() {
            return Err(Error::InvalidChapter("title has no lines".into()));
        }
        if let Some(idx) = self.title_lines.iter().position(|l| l.trim().is_empty()) {
            return Err(Error::InvalidChapter(format!("title line {} is blank", idx + 1)));
        }
        Ok(())
    }

    /// Load a fixture from a JSON or TOML file, chosen by extension.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path)?;
        let is_toml = path
            .extension()
            .is_some_and(|ext| ext.eq_ignore_ascii_case("toml"));

        if is_toml {
            Self::from_toml_str(&content)
        } else {
            Self::from_json_str(&content)
        }
    }

    pub fn from_json_str(s: &str) -> Result<Self> {
        let front: Self = serde_json::from_str(s)?;
        front.validate()?;
        Ok(front)
    }

    pub fn from_toml_str(s: &str) -> Result<Self> {
        let front: Self = toml::from_str(s)?;
        front.validate()?;
        Ok(front)
    }

    /// The chapter VI title page used by the design mockup.
    pub fn sample() -> Self {
        Self::new(6)
            .with_title_lines(["MASTERING", "THE", "BUSINESS", "OF", "HAIRSTYLING"])
            .with_epigraph(
                "Whatever you do, work at it with all your heart, as working for the Lord, \
                 not for human masters.",
                "\u{2014} Colossians 3:23",
            )
            .with_introduction(
                "Picture this powerful scene: You stand poised behind your styling chair, ready \
                 to transform a simple canvas of hair into a masterpiece. As you begin to weave \
                 your magic, a sudden thought invades\u{2014}are your business skills as sharp as \
                 the tools in your hands? In the fast-paced world of hairstyling, where artistry \
                 and entrepreneurship dance an intricate duet, mastering the business side is as \
                 essential as perfecting your hands-on craft.",
            )
    }
}

/// A complete chapter: title page plus the raw markup of the later pages.
///
/// Everything after the title page is carried verbatim; the renderer only
/// rearranges it into the page structure.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Chapter {
    pub front: ChapterFrontMatter,
    /// Title used in the document `<title>`; defaults to the joined title lines.
    pub title: String,
    pub body: String,
    pub endnotes: String,
    pub quiz: String,
    pub worksheet: String,
    pub closing: String,
}

impl Chapter {
    pub fn new(front: ChapterFrontMatter) -> Self {
        Self {
            title: front.full_title(),
            front,
            body: String::new(),
            endnotes: String::new(),
            quiz: String::new(),
            worksheet: String::new(),
            closing: String::new(),
        }
    }

    pub fn with_body(mut self, body: impl Into<String>) -> Self {
        self.body = body.into();
        self
    }

    pub fn with_endnotes(mut self, endnotes: impl Into<String>) -> Self {
        self.endnotes = endnotes.into();
        self
    }

    pub fn with_quiz(mut self, quiz: impl Into<String>) -> Self {
        self.quiz = quiz.into();
        self
    }

    pub fn with_worksheet(mut self, worksheet: impl Into<String>) -> Self {
        self.worksheet = worksheet.into();
        self
    }

    pub fn with_closing(mut self, closing: impl Into<String>) -> Self {
        self.closing = closing.into();
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sample_is_valid() {
        let sample = ChapterFrontMatter::sample();
        assert!(sample.validate().is_ok());
        assert_eq!(sample.roman(), "VI");
        assert_eq!(sample.full_title(), "MASTERING THE BUSINESS OF HAIRSTYLING");
        assert!(sample.introduction.starts_with("Picture this powerful scene"));
        assert!(sample.introduction.ends_with("hands-on craft."));
    }

    #[test]
    fn test_validate_rejects_empty_title() {
        let front = ChapterFrontMatter::new(1);
        assert!(matches!(front.validate(), Err(Error::InvalidChapter(_))));

        let blank = ChapterFrontMatter::new(1).with_title_lines(["ONE", "  "]);
        let err = blank.validate().unwrap_err().to_string();
        assert!(err.contains("title line 2"), "{err}");
    }

    #[test]
    fn test_from_json_str() {
        let json = r#"{
            "number": 3,
            "title_lines": ["Finding", "Your Voice"],
            "epigraph": {"text": "Let your light shine.", "attribution": "Matthew 5:16"},
            "introduction": "Every stylist begins somewhere."
        }"#;
        let front = ChapterFrontMatter::from_json_str(json).unwrap();
        assert_eq!(front.number, 3);
        assert_eq!(front.title_lines, vec!["Finding", "Your Voice"]);
        assert_eq!(front.format, TextFormat::Plain);
    }

    #[test]
    fn test_from_toml_str() {
        let toml = r#"
            number = 2
            title_lines = ["CRAFT"]
            introduction = "It starts with a chair."
            format = "markup"

            [epigraph]
            text = "Commit to the Lord whatever you do."
            attribution = "Proverbs 16:3"
        "#;
        let front = ChapterFrontMatter::from_toml_str(toml).unwrap();
        assert_eq!(front.roman(), "II");
        assert_eq!(front.format, TextFormat::Markup);
        assert_eq!(front.epigraph.attribution, "Proverbs 16:3");
    }

    #[test]
    fn test_from_json_rejects_empty_title() {
        let json = r#"{"number": 1, "title_lines": [],
            "epigraph": {"text": "", "attribution": ""}, "introduction": ""}"#;
        assert!(ChapterFrontMatter::from_json_str(json).is_err());
    }

    #[test]
    fn test_chapter_title_defaults_to_joined_lines() {
        let chapter = Chapter::new(ChapterFrontMatter::sample()).with_body("<p>Body</p>");
        assert_eq!(chapter.title, "MASTERING THE BUSINESS OF HAIRSTYLING");
        assert_eq!(chapter.body, "<p>Body</p>");
    }
}
