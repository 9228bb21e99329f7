// /////////////////////////////////////////////////////////////////////////////
// Optimized Adaptive Pipeline RS
// Copyright (c) 2025 Michael Gardner, A Bit of Help, Inc.
// SPDX-License-Identifier: BSD-3-Clause
// See LICENSE file in the project root.
// /////////////////////////////////////////////////////////////////////////////

//! Text transforms used by the normalization stage: Unicode form
//! conversion, accent stripping, quote standardization. Grounded in
//! `original_source/rag_framework/steps/step_07_normalization.py`'s
//! `_normalize_text`, ported onto `unicode-normalization` instead of
//! Python's `unicodedata`.

use unicode_normalization::char::is_combining_mark;
use unicode_normalization::UnicodeNormalization;

/// Applies the Unicode normalization form named in config (`NFC`, `NFKC`,
/// `NFD`, or `NFKD`); `None` leaves the text untouched.
pub fn apply_unicode_form(text: &str, form: Option<&str>) -> String {
    match form {
        Some("NFC") => text.nfc().collect(),
        Some("NFKC") => text.nfkc().collect(),
        Some("NFD") => text.nfd().collect(),
        Some("NFKD") => text.nfkd().collect(),
        _ => text.to_string(),
    }
}

/// Decomposes accented characters and drops the combining marks, mirroring
/// the Python step's `NFD` + `category(char) != "Mn"` filter.
pub fn strip_accents(text: &str) -> String {
    text.nfd().filter(|c| !is_combining_mark(*c)).collect()
}

/// Collapses curly/guillemet double quotes to `"` and curly single quotes
/// to `'`.
pub fn standardize_quotes(text: &str) -> String {
    text.chars()
        .map(|c| match c {
            '\u{201C}' | '\u{201D}' | '\u{00AB}' | '\u{00BB}' => '"',
            '\u{2018}' | '\u{2019}' => '\'',
            other => other,
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn nfc_composes_combining_sequences() {
        let decomposed = "e\u{0301}";
        assert_eq!(apply_unicode_form(decomposed, Some("NFC")), "\u{00E9}");
    }

    #[test]
    fn strip_accents_removes_diacritics() {
        assert_eq!(strip_accents("café"), "cafe");
    }

    #[test]
    fn standardize_quotes_normalizes_curly_and_guillemets() {
        assert_eq!(standardize_quotes("\u{201C}hello\u{201D} \u{00AB}world\u{00BB}"), "\"hello\" \"world\"");
        assert_eq!(standardize_quotes("it\u{2019}s"), "it's");
    }
}
