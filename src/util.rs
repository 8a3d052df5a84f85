//! Text and markup helpers shared by the renderer, extractor and validators.

use std::borrow::Cow;
use std::path::Path;
use std::sync::LazyLock;

use regex::{Captures, Regex};

use crate::error::Result;

static XML_DECL_ENCODING: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"(?i)(<\?xml\b[^>]*?\bencoding\s*=\s*["'])([^"']*)"#).expect("valid regex")
});
static META_CHARSET: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"(?i)(<meta\b[^>]*?\bcharset\s*=\s*["']?)([A-Za-z0-9_:.\-]+)"#).expect("valid regex")
});

/// Read an XHTML/CSS document from disk as text.
///
/// Chapter files are nominally UTF-8, but files exported from word processors
/// regularly arrive as Windows-1252. See [`decode_text`].
pub fn read_document(path: impl AsRef<Path>) -> Result<String> {
    let bytes = std::fs::read(path)?;
    let hint = extract_xml_encoding(&bytes);
    Ok(decode_text(&bytes, hint).into_owned())
}

/// Decode bytes to a string.
///
/// UTF-8 is tried first (a BOM is handled by encoding_rs). Malformed input is
/// decoded with the encoding named in the XML declaration, if any, and
/// otherwise as Windows-1252.
pub fn decode_text<'a>(bytes: &'a [u8], hint_encoding: Option<&str>) -> Cow<'a, str> {
    let (result, _encoding, malformed) = encoding_rs::UTF_8.decode(bytes);

    if !malformed {
        return result;
    }

    if let Some(name) = hint_encoding
        && let Some(encoding) = encoding_rs::Encoding::for_label(name.as_bytes())
    {
        let (result, _, _) = encoding.decode(bytes);
        return result;
    }

    let (result, _, _) = encoding_rs::WINDOWS_1252.decode(bytes);
    result
}

/// Extract the encoding name from an `<?xml ... encoding="..." ?>` declaration.
///
/// Only the first 100 bytes are inspected.
pub fn extract_xml_encoding(bytes: &[u8]) -> Option<&str> {
    let prefix = &bytes[..bytes.len().min(100)];

    let xml_start = memchr::memmem::find(prefix, b"<?xml")?;
    let after_xml = &prefix[xml_start..];

    let enc_pos = after_xml
        .windows(9)
        .position(|w| w.eq_ignore_ascii_case(b"encoding="))?;
    let after_enc = &after_xml[enc_pos + 9..];

    let quote = *after_enc.first()?;
    if quote != b'"' && quote != b'\'' {
        return None;
    }

    let value_end = memchr::memchr(quote, &after_enc[1..])? + 1;
    std::str::from_utf8(&after_enc[1..value_end]).ok()
}

/// Rewrite the XML declaration and any `<meta>` charset to name UTF-8.
///
/// Documents are decoded on read and always written back as UTF-8, so a
/// declaration naming another encoding would no longer be true.
pub fn declare_utf8(markup: &str) -> Cow<'_, str> {
    let relabel = |caps: &Captures<'_>| {
        if encoding_rs::Encoding::for_label(caps[2].as_bytes()) == Some(encoding_rs::UTF_8) {
            caps[0].to_string()
        } else {
            format!("{}utf-8", &caps[1])
        }
    };

    match XML_DECL_ENCODING.replace(markup, relabel) {
        Cow::Borrowed(_) => META_CHARSET.replace_all(markup, relabel),
        Cow::Owned(declared) => Cow::Owned(META_CHARSET.replace_all(&declared, relabel).into_owned()),
    }
}

/// Escape text for use in XHTML content or attribute values.
pub fn escape_xml(s: &str) -> Cow<'_, str> {
    if !s.contains(['&', '<', '>', '"', '\'']) {
        return Cow::Borrowed(s);
    }

    let mut out = String::with_capacity(s.len() + 16);
    for c in s.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(c),
        }
    }
    Cow::Owned(out)
}

/// Decode character and entity references.
///
/// Handles the XML predefined entities, `&nbsp;` (decoded as a plain space so
/// it compares equal to ordinary whitespace) and numeric references. Unknown
/// named entities are left untouched.
pub fn decode_entities(s: &str) -> Cow<'_, str> {
    if !s.contains('&') {
        return Cow::Borrowed(s);
    }

    let mut out = String::with_capacity(s.len());
    let mut rest = s;

    while let Some(amp) = rest.find('&') {
        out.push_str(&rest[..amp]);
        let candidate = &rest[amp..];

        let decoded = candidate
            .find(';')
            .filter(|&semi| semi <= 12)
            .and_then(|semi| resolve_entity(&candidate[1..semi]).map(|c| (c, semi)));

        match decoded {
            Some((c, semi)) => {
                out.push(c);
                rest = &candidate[semi + 1..];
            }
            None => {
                out.push('&');
                rest = &candidate[1..];
            }
        }
    }
    out.push_str(rest);

    Cow::Owned(out)
}

fn resolve_entity(name: &str) -> Option<char> {
    match name {
        "quot" => Some('"'),
        "apos" => Some('\''),
        "lt" => Some('<'),
        "gt" => Some('>'),
        "amp" => Some('&'),
        "nbsp" => Some(' '),
        _ => {
            let digits = name.strip_prefix('#')?;
            let code = match digits.strip_prefix(['x', 'X']) {
                Some(hex) => u32::from_str_radix(hex, 16).ok()?,
                None => digits.parse().ok()?,
            };
            char::from_u32(code)
        }
    }
}

/// Elements whose boundaries separate words even when no whitespace
/// surrounds them in the source.
const BLOCK_ELEMENTS: &[&str] = &[
    "address", "article", "aside", "blockquote", "body", "br", "caption", "dd", "div", "dl",
    "dt", "figcaption", "figure", "footer", "h1", "h2", "h3", "h4", "h5", "h6", "head",
    "header", "hr", "html", "li", "main", "nav", "ol", "p", "pre", "section", "table", "tbody",
    "td", "tfoot", "th", "thead", "title", "tr", "ul",
];

/// Whether the tag starting `tag` (at its `<`) opens or closes a block element.
fn is_block_tag(tag: &str) -> bool {
    let name = tag[1..].trim_start_matches('/');
    let end = name
        .find(|c: char| !c.is_ascii_alphanumeric())
        .unwrap_or(name.len());
    let name = &name[..end];
    BLOCK_ELEMENTS
        .iter()
        .any(|block| block.eq_ignore_ascii_case(name))
}

/// Remove all markup from an XHTML string, keeping only character data.
///
/// Comments, processing instructions and declarations are dropped; CDATA
/// sections keep their contents. Entities are not decoded. Block element
/// tags become a single space, so `<p>a</p><p>b</p>` reads as two words
/// whether or not the source is minified; inline tags vanish.
/// An unterminated tag swallows the rest of the input.
pub fn strip_markup(html: &str) -> String {
    let bytes = html.as_bytes();
    let mut out = String::with_capacity(html.len());
    let mut pos = 0;

    while pos < bytes.len() {
        let Some(rel) = memchr::memchr(b'<', &bytes[pos..]) else {
            out.push_str(&html[pos..]);
            break;
        };
        let tag_start = pos + rel;
        out.push_str(&html[pos..tag_start]);

        let tail = &html[tag_start..];
        let skip = if let Some(body) = tail.strip_prefix("<!--") {
            body.find("-->").map(|end| 4 + end + 3)
        } else if let Some(body) = tail.strip_prefix("<![CDATA[") {
            body.find("]]>").map(|end| {
                out.push_str(&body[..end]);
                9 + end + 3
            })
        } else if let Some(body) = tail.strip_prefix("<?") {
            body.find("?>").map(|end| 2 + end + 2)
        } else {
            memchr::memchr(b'>', tail.as_bytes()).map(|end| {
                if is_block_tag(&tail[..end]) {
                    out.push(' ');
                }
                end + 1
            })
        };

        match skip {
            Some(len) => pos = tag_start + len,
            None => break,
        }
    }

    out
}

/// Collapse every whitespace run to a single space and trim the ends.
pub fn collapse_whitespace(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for word in s.split_whitespace() {
        if !out.is_empty() {
            out.push(' ');
        }
        out.push_str(word);
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_decode_text_utf8() {
        assert_eq!(decode_text("Colossians 3:23".as_bytes(), None), "Colossians 3:23");
    }

    #[test]
    fn test_decode_text_windows_1252_fallback() {
        // 0x97 is an em dash in Windows-1252 and invalid as UTF-8
        let bytes = b"\x97 Colossians";
        assert_eq!(decode_text(bytes, None), "\u{2014} Colossians");
    }

    #[test]
    fn test_extract_xml_encoding() {
        let doc = br#"<?xml version="1.0" encoding="windows-1252"?><html/>"#;
        assert_eq!(extract_xml_encoding(doc), Some("windows-1252"));
        assert_eq!(extract_xml_encoding(b"<html/>"), None);
        assert_eq!(extract_xml_encoding(b"<?xml version='1.0' encoding='utf-8'?>"), Some("utf-8"));
    }

    #[test]
    fn test_declare_utf8() {
        let doc = r#"<?xml version="1.0" encoding="windows-1252"?>
<html><head><meta http-equiv="Content-Type" content="text/html; charset=iso-8859-1"/></head></html>"#;
        assert_eq!(
            declare_utf8(doc),
            r#"<?xml version="1.0" encoding="utf-8"?>
<html><head><meta http-equiv="Content-Type" content="text/html; charset=utf-8"/></head></html>"#
        );

        let utf8 = r#"<?xml version="1.0" encoding="UTF-8"?><meta charset="utf-8"/>"#;
        assert_eq!(declare_utf8(utf8), utf8);
        assert!(matches!(declare_utf8("<html/>"), Cow::Borrowed(_)));
    }

    #[test]
    fn test_escape_xml() {
        assert_eq!(escape_xml("plain"), "plain");
        assert_eq!(escape_xml("A & B <c>"), "A &amp; B &lt;c&gt;");
        assert_eq!(escape_xml("\"q\""), "&quot;q&quot;");
    }

    #[test]
    fn test_decode_entities() {
        assert_eq!(decode_entities("a &amp; b"), "a & b");
        assert_eq!(decode_entities("&quot;hi&quot;"), "\"hi\"");
        assert_eq!(decode_entities("it&#x27;s"), "it's");
        assert_eq!(decode_entities("&#8212;"), "\u{2014}");
        assert_eq!(decode_entities("x&nbsp;y"), "x y");
        assert_eq!(decode_entities("AT&T"), "AT&T");
        assert_eq!(decode_entities("&unknown;"), "&unknown;");
    }

    #[test]
    fn test_strip_markup() {
        let html = r#"<?xml version="1.0"?><!DOCTYPE html><!-- PAGE 1 --><p class="x">Hello <b>world</b></p>"#;
        assert_eq!(strip_markup(html), " Hello world ");
        assert_eq!(strip_markup("<![CDATA[raw]]> text"), "raw text");
        assert_eq!(strip_markup("before <unterminated"), "before ");
    }

    #[test]
    fn test_strip_markup_block_boundaries() {
        assert_eq!(
            collapse_whitespace(&strip_markup("<section><p>end.</p></section><aside>Note.</aside>")),
            "end. Note."
        );
        assert_eq!(strip_markup("a<br/>b"), "a b");
        // Inline markup never splits a word
        assert_eq!(strip_markup("<span class=\"dropcap\">P</span>icture <em>this</em>"), "Picture this");
        assert_eq!(strip_markup("<DIV>x</DIV>"), " x ");
        // "b" and "bdi" are inline even though "body" is a block
        assert_eq!(strip_markup("<b>bo</b>ld"), "bold");
    }

    #[test]
    fn test_collapse_whitespace() {
        assert_eq!(collapse_whitespace("  a \n\t b  "), "a b");
        assert_eq!(collapse_whitespace(""), "");
    }
}
