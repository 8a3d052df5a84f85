//! Breaking a chapter title into stacked display lines.

/// Default cap on the number of stacked title lines.
pub const DEFAULT_MAX_TITLE_LINES: usize = 6;

/// Break title words into at most `max_lines` display lines.
///
/// Short titles get one word per line. Longer titles pull a short word
/// (three letters or fewer) up onto a line holding a single short word (four
/// letters or fewer), so "OF THE" style pairs share a line; anything beyond
/// `max_lines` is dropped.
///
/// ```
/// use aciss::render::break_title_lines;
///
/// let words = ["MASTERING", "THE", "BUSINESS", "OF", "HAIRSTYLING"];
/// assert_eq!(break_title_lines(&words, 6), words);
/// ```
pub fn break_title_lines<S: AsRef<str>>(words: &[S], max_lines: usize) -> Vec<String> {
    if words.len() <= max_lines {
        return words.iter().map(|w| w.as_ref().to_string()).collect();
    }

    let mut lines: Vec<String> = Vec::new();
    let mut current: Vec<&str> = Vec::new();

    for word in words.iter().map(AsRef::as_ref) {
        let joins_current =
            word.chars().count() <= 3 && current.len() == 1 && current[0].chars().count() <= 4;

        if joins_current {
            current.push(word);
        } else {
            if !current.is_empty() {
                lines.push(current.join(" "));
            }
            current = vec![word];
        }
    }
    if !current.is_empty() {
        lines.push(current.join(" "));
    }

    lines.truncate(max_lines);
    lines
}

/// Split a title string into words for [`break_title_lines`].
pub fn title_words(title: &str) -> Vec<String> {
    title.split_whitespace().map(str::to_string).collect()
}
