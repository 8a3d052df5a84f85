//! Roman numeral conversion for chapter badges.

use std::sync::LazyLock;

use regex::Regex;

/// Spine position of the first chapter file, so `9-chapter-i-...` is chapter 1.
pub const FIRST_CHAPTER_SPINE_INDEX: u32 = 9;

const NUMERALS: [(u32, &str); 13] = [
    (1000, "M"),
    (900, "CM"),
    (500, "D"),
    (400, "CD"),
    (100, "C"),
    (90, "XC"),
    (50, "L"),
    (40, "XL"),
    (10, "X"),
    (9, "IX"),
    (5, "V"),
    (4, "IV"),
    (1, "I"),
];

/// Format a chapter number as an uppercase roman numeral.
///
/// Numbers outside `1..=3999` have no standard numeral and are rendered as
/// plain decimal digits instead.
///
/// ```
/// use aciss::roman::to_roman;
///
/// assert_eq!(to_roman(6), "VI");
/// assert_eq!(to_roman(14), "XIV");
/// assert_eq!(to_roman(0), "0");
/// ```
pub fn to_roman(n: u32) -> String {
    if !(1..=3999).contains(&n) {
        return n.to_string();
    }

    let mut remaining = n;
    let mut out = String::new();
    for &(value, symbol) in &NUMERALS {
        while remaining >= value {
            out.push_str(symbol);
            remaining -= value;
        }
    }
    out
}

/// Parse a roman numeral, accepting either case.
///
/// Only canonical numerals are accepted: `IIII` or `VX` return `None`.
pub fn from_roman(s: &str) -> Option<u32> {
    let upper = s.trim().to_ascii_uppercase();
    if upper.is_empty() {
        return None;
    }

    let mut total = 0u32;
    let mut rest = upper.as_str();
    for &(value, symbol) in &NUMERALS {
        while let Some(tail) = rest.strip_prefix(symbol) {
            total += value;
            rest = tail;
        }
    }

    // Greedy parsing accepts some non-canonical spellings; re-rendering rejects them.
    (rest.is_empty() && to_roman(total) == upper).then_some(total)
}

static CHAPTER_FILENAME: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(\d+)-chapter-([ivxlc]+)").expect("valid regex"));

/// Derive the chapter number from a spine file name such as
/// `9-chapter-i-the-art-of-hair.xhtml`.
pub fn chapter_number_from_filename(name: &str) -> Option<u32> {
    let lower = name.to_lowercase();
    let caps = CHAPTER_FILENAME.captures(&lower)?;
    let spine_index: u32 = caps[1].parse().ok()?;
    spine_index
        .checked_sub(FIRST_CHAPTER_SPINE_INDEX - 1)
        .filter(|&n| n >= 1)
}
