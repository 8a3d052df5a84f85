//! Chapter page generation.
//!
//! - [`front_matter`]: the title page section (numeral badge, title stack,
//!   epigraph, heading and dropcap paragraph)
//! - [`document`]: a full chapter document with the six-page layout
//! - [`mockup`]: the annotated, inline-styled design mockup
//!
//! All renderers are pure functions of their input and always succeed; input
//! validation happens when records are loaded (see
//! [`ChapterFrontMatter::validate`](crate::ChapterFrontMatter::validate)).

mod document;
mod dropcap;
mod front_matter;
mod mockup;
mod title;

pub use document::{
    PAGE_BODY, PAGE_COMMENTS, PAGE_ENDNOTES, PAGE_QUIZ, PAGE_TITLE, render_chapter_document,
};
pub use dropcap::{Dropcap, split_dropcap, split_markup_dropcap};
pub use front_matter::render_front_matter;
pub use mockup::render_mockup;
pub use title::{DEFAULT_MAX_TITLE_LINES, break_title_lines, title_words};
