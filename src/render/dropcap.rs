//! Dropcap extraction for the opening paragraph.

/// The first character of a paragraph split from the rest of its text.
///
/// `letter` followed by `rest` is always exactly the original text.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Dropcap<'a> {
    pub letter: &'a str,
    pub rest: &'a str,
}

impl Dropcap<'_> {
    /// Reassemble the original paragraph text.
    pub fn joined(&self) -> String {
        let mut out = String::with_capacity(self.letter.len() + self.rest.len());
        out.push_str(self.letter);
        out.push_str(self.rest);
        out
    }
}

/// Split off the first character of plain text.
///
/// Returns `None` for empty text.
///
/// ```
/// use aciss::render::split_dropcap;
///
/// let cap = split_dropcap("Picture this powerful scene...").unwrap();
/// assert_eq!(cap.letter, "P");
/// assert_eq!(cap.rest, "icture this powerful scene...");
/// ```
pub fn split_dropcap(text: &str) -> Option<Dropcap<'_>> {
    let first = text.chars().next()?;
    let (letter, rest) = text.split_at(first.len_utf8());
    Some(Dropcap { letter, rest })
}

/// Split off the first character of an XHTML fragment.
///
/// Only possible when the fragment opens with a literal character; fragments
/// that open with a tag, an entity or whitespace are left to the stylesheet's
/// `::first-letter` rule.
pub fn split_markup_dropcap(markup: &str) -> Option<Dropcap<'_>> {
    let first = markup.chars().next()?;
    if first == '<' || first == '&' || first.is_whitespace() {
        return None;
    }
    split_dropcap(markup)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_split_dropcap() {
        let cap = split_dropcap("Picture this").unwrap();
        assert_eq!(cap.letter, "P");
        assert_eq!(cap.rest, "icture this");
        assert_eq!(cap.joined(), "Picture this");
    }

    #[test]
    fn test_split_dropcap_multibyte() {
        let cap = split_dropcap("\u{c9}mile writes").unwrap();
        assert_eq!(cap.letter, "\u{c9}");
        assert_eq!(cap.rest, "mile writes");
    }

    #[test]
    fn test_split_dropcap_single_char_and_empty() {
        let cap = split_dropcap("A").unwrap();
        assert_eq!((cap.letter, cap.rest), ("A", ""));
        assert!(split_dropcap("").is_none());
    }

    #[test]
    fn test_split_markup_dropcap() {
        assert_eq!(split_markup_dropcap("Picture <em>this</em>").unwrap().letter, "P");
        assert!(split_markup_dropcap("<p>Picture</p>").is_none());
        assert!(split_markup_dropcap("&ldquo;Picture").is_none());
        assert!(split_markup_dropcap(" Picture").is_none());
    }
}
