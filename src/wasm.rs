//! WASM bindings for rendering and transforming chapter pages in the browser.
//!
//! Front-matter records are passed as JSON strings; reports come back as JSON.

use wasm_bindgen::prelude::*;

use crate::config::{Config, RenderConfig};
use crate::model::{Chapter, ChapterFrontMatter};
use crate::preserve::verify_preservation;
use crate::render::{render_chapter_document, render_mockup};
use crate::transform::{Strategy, transform_chapter};

/// Initialize panic hook for better error messages in the browser console.
#[wasm_bindgen(start)]
pub fn init() {
    #[cfg(feature = "wasm")]
    console_error_panic_hook::set_once();
}

fn js_error(e: impl std::fmt::Display) -> JsValue {
    JsValue::from_str(&e.to_string())
}

/// Render the annotated mockup for a JSON front-matter record.
#[wasm_bindgen]
pub fn mockup_from_json(json: &str) -> Result<String, JsValue> {
    let front = ChapterFrontMatter::from_json_str(json).map_err(js_error)?;
    Ok(render_mockup(&front))
}

/// Render a chapter page (front matter only) for a JSON front-matter record.
#[wasm_bindgen]
pub fn chapter_from_json(json: &str) -> Result<String, JsValue> {
    let front = ChapterFrontMatter::from_json_str(json).map_err(js_error)?;
    Ok(render_chapter_document(
        &Chapter::new(front),
        &RenderConfig::default(),
    ))
}

/// Transform a legacy chapter page. `strategy` is `"rebuild"` or `"restructure"`.
#[wasm_bindgen]
pub fn transform(markup: &str, strategy: &str) -> Result<String, JsValue> {
    let strategy: Strategy = strategy.parse().map_err(js_error)?;
    transform_chapter(markup, strategy, &Config::default().render).map_err(js_error)
}

/// Compare the text of two pages. Returns the preservation report as JSON.
#[wasm_bindgen]
pub fn verify(original: &str, processed: &str) -> Result<String, JsValue> {
    let report = verify_preservation(original, processed);
    serde_json::to_string(&report).map_err(js_error)
}

/// Process a whole EPUB. Takes raw EPUB bytes and returns the new EPUB bytes.
#[wasm_bindgen]
pub fn process_epub(data: &[u8], strategy: &str) -> Result<Vec<u8>, JsValue> {
    let mut config = Config::default();
    config.batch.strategy = strategy.parse().map_err(js_error)?;
    let (out, _summary) = crate::epub::process_epub_bytes(data, &config).map_err(js_error)?;
    Ok(out)
}
