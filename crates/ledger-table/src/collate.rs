//! Locale-style string collation.
//!
//! Approximates the default root collation used by browsers' `localeCompare`:
//! strings are ordered by base letters first (case and accents ignored), then
//! unaccented before accented, then lowercase before uppercase. Whitespace and
//! punctuation sort before digits, digits before letters.

use std::cmp::Ordering;

use unicode_normalization::UnicodeNormalization;
use unicode_normalization::char::is_combining_mark;

/// Compare two strings with locale-style ordering.
pub fn locale_compare(a: &str, b: &str) -> Ordering {
    let (a_letters, a_marked) = decompose(a);
    let (b_letters, b_marked) = decompose(b);

    let primary = a_letters
        .iter()
        .map(|&c| primary_weight(c))
        .cmp(b_letters.iter().map(|&c| primary_weight(c)));
    if primary != Ordering::Equal {
        return primary;
    }

    let secondary = a_marked.cmp(&b_marked);
    if secondary != Ordering::Equal {
        return secondary;
    }

    // Lowercase sorts before uppercase at the first case difference.
    let tertiary = a_letters
        .iter()
        .map(|c| c.is_uppercase())
        .cmp(b_letters.iter().map(|c| c.is_uppercase()));
    if tertiary != Ordering::Equal {
        return tertiary;
    }

    a.cmp(b)
}

/// Canonical decomposition split into base characters and, per base
/// character, whether combining marks followed it.
fn decompose(s: &str) -> (Vec<char>, Vec<bool>) {
    let mut letters = Vec::with_capacity(s.len());
    let mut marked = Vec::with_capacity(s.len());
    for c in s.nfd() {
        if is_combining_mark(c) {
            if let Some(last) = marked.last_mut() {
                *last = true;
            }
        } else {
            letters.push(c);
            marked.push(false);
        }
    }
    (letters, marked)
}

fn primary_weight(c: char) -> (u8, u32) {
    if c.is_whitespace() {
        (0, 0)
    } else if c.is_ascii_punctuation() {
        (1, c as u32)
    } else if c.is_numeric() {
        (3, c.to_digit(10).unwrap_or(c as u32))
    } else if c.is_alphabetic() {
        let lower = c.to_lowercase().next().unwrap_or(c);
        (4, lower as u32)
    } else {
        (2, c as u32)
    }
}
