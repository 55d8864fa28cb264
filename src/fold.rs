//! Text folding used by the filter engine and the highlighter.
//!
//! Matching is literal: queries are never compiled into patterns, so
//! characters such as `.`, `*` or `(` only ever match themselves.

use std::ops::Range;

use unicode_normalization::UnicodeNormalization;

/// Combining diacritical marks block (U+0300..U+036F).
fn is_diacritic(c: char) -> bool {
    ('\u{0300}'..='\u{036f}').contains(&c)
}

/// Decompose a string and drop its combining diacritics.
/// `"Été"` becomes `"Ete"`, `"ñ"` becomes `"n"`.
pub fn strip_diacritics(s: &str) -> String {
    s.nfd().filter(|c| !is_diacritic(*c)).collect()
}

/// Lowercase one char. Final sigma folds like any other sigma.
fn fold_char(c: char) -> impl Iterator<Item = char> {
    c.to_lowercase()
        .map(|lower| if lower == 'ς' { 'σ' } else { lower })
}

/// Lowercase a string char by char.
pub fn fold_case(s: &str) -> String {
    s.chars().flat_map(fold_char).collect()
}

/// Fold the first character of `name` for alphabet bucketing:
/// diacritics stripped, then uppercased. Returns `None` for empty input.
pub fn initial(name: &str) -> Option<String> {
    let first = name.chars().next()?;
    let stripped = strip_diacritics(first.encode_utf8(&mut [0u8; 4]));
    Some(stripped.to_uppercase())
}

/// Case-insensitive literal substring test. `needle` must already be folded.
pub fn contains_folded(haystack: &str, folded_needle: &str) -> bool {
    if folded_needle.is_empty() {
        return true;
    }
    fold_case(haystack).contains(folded_needle)
}

/// Byte ranges in `haystack` covering each non-overlapping case-insensitive
/// occurrence of `needle`, left to right.
///
/// Ranges always fall on char boundaries of the original string, even when
/// lowercasing changes the byte length of a character.
pub fn match_ranges(haystack: &str, needle: &str) -> Vec<Range<usize>> {
    let folded_needle = fold_case(needle);
    if folded_needle.is_empty() {
        return Vec::new();
    }

    // Folded text plus, for every folded byte, the original char span it came from.
    let mut folded = String::with_capacity(haystack.len());
    let mut origin: Vec<Range<usize>> = Vec::with_capacity(haystack.len());
    for (start, c) in haystack.char_indices() {
        let span = start..start + c.len_utf8();
        for lower in fold_char(c) {
            folded.push(lower);
            for _ in 0..lower.len_utf8() {
                origin.push(span.clone());
            }
        }
    }

    let mut ranges: Vec<Range<usize>> = Vec::new();
    let mut from = 0;
    while let Some(pos) = folded[from..].find(&folded_needle) {
        let begin = from + pos;
        let end = begin + folded_needle.len();
        let range = origin[begin].start..origin[end - 1].end;
        match ranges.last_mut() {
            // A multi-char fold can map two matches onto the same source char.
            Some(last) if range.start < last.end => last.end = last.end.max(range.end),
            _ => ranges.push(range),
        }
        from = end;
    }
    ranges
}
