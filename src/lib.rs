//! # aciss
//!
//! Chapter title pages and page structure for a print-styled EPUB.
//!
//! ## Features
//!
//! - Render chapter front matter (numeral badge, stacked title, epigraph,
//!   dropcap introduction) from a small record
//! - Render full six-page chapter documents and an annotated design mockup
//! - Bring legacy chapter pages to the current layout, by rewriting them in
//!   place or by extracting and regenerating them
//! - Verify that every word of the original text survives processing
//! - Check pages, stylesheets and images for the required styling hooks
//! - Process a whole text directory or a packaged EPUB
//!
//! ## Quick Start
//!
//! ```
//! use aciss::{ChapterFrontMatter, RenderConfig, render_front_matter};
//!
//! let front = ChapterFrontMatter::new(9)
//!     .with_title_lines(["GROWING", "YOUR", "BRAND"])
//!     .with_epigraph("A good name is more desirable than great riches.", "Proverbs 22:1")
//!     .with_introduction("Every stylist has a story.");
//!
//! let html = render_front_matter(&front, &RenderConfig::default());
//! assert!(html.contains(r#"<div class="chapter-number-text">IX</div>"#));
//! assert!(html.contains(r#"<span class="dropcap">E</span>very stylist has a story."#));
//! ```
//!
//! ## Processing existing pages
//!
//! ```no_run
//! use aciss::{Config, Strategy, transform_file};
//!
//! let config = Config::load("aciss.toml")?;
//! let outcome = transform_file(
//!     "text/9-chapter-i-roots.xhtml",
//!     "out/9-chapter-i-roots.xhtml",
//!     Strategy::Restructure,
//!     &config.render,
//! )?;
//! assert!(outcome.preserved());
//! # Ok::<(), aciss::Error>(())
//! ```

pub mod batch;
pub mod compliance;
pub mod config;
pub mod epub;
pub mod error;
pub mod extract;
pub mod model;
pub mod part;
pub mod preserve;
pub mod render;
pub mod roman;
pub mod transform;
pub(crate) mod util;

#[cfg(feature = "wasm")]
pub mod wasm;

pub use batch::{BatchSummary, ValidationSummary, process_directory, validate_directory};
pub use compliance::{
    check_chapter, check_image_references, check_stylesheet, check_xhtml, detect_sections,
};
pub use config::{BatchConfig, Config, RenderConfig, ValidateConfig};
pub use epub::process_epub;
pub use error::{Error, Result};
pub use extract::{ExtractedChapter, extract_chapter};
pub use model::{Chapter, ChapterFrontMatter, Epigraph, TextFormat};
pub use part::{clean_part_divider, process_part_file};
pub use preserve::{PreservationReport, extract_text, verify_preservation};
pub use render::{render_chapter_document, render_front_matter, render_mockup};
pub use roman::{from_roman, to_roman};
pub use transform::{Strategy, TransformOutcome, transform_chapter, transform_file};
pub use util::read_document;
