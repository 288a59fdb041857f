//! Post-processing: deterministic cleanup of pdfium-extracted text.
//!
//! ## Why is post-processing necessary?
//!
//! Raw PDF text extraction is faithful to the *layout*, not to the *prose*:
//!
//! - Words hyphenated at line breaks come out as `convert-\nsion`
//! - Soft hyphens (U+00AD) and zero-width characters survive extraction
//! - Form feeds and stray control characters appear between content blocks
//! - Justified text produces runs of multiple spaces
//! - Windows-produced PDFs yield `\r\n` line endings
//!
//! This module applies cheap, deterministic regex/string rules that fix
//! extraction artefacts without touching content. Each rule is a pure
//! function (`&str → String`) and independently testable.
//!
//! ## Rule Order
//!
//! Rules must run in this specific order: normalise line endings before
//! dehyphenation so `-\r\n` breaks are seen as `-\n`, and strip invisible
//! characters before collapsing whitespace so a line holding only a
//! zero-width space becomes genuinely blank.

use once_cell::sync::Lazy;
use regex::Regex;

/// Apply all cleanup rules to raw extracted page text.
///
/// Rules (applied in order):
/// 1. Normalise line endings (CRLF/CR → LF)
/// 2. Strip control characters (form feeds etc., keeping `\n` and `\t`)
/// 3. Strip invisible Unicode (zero-width spaces, BOM, word joiners)
/// 4. Re-join words hyphenated across line breaks
/// 5. Collapse runs of spaces within lines
/// 6. Trim trailing whitespace per line
/// 7. Collapse 3+ consecutive blank lines down to 1
/// 8. Trim leading/trailing blank lines and end with exactly one newline
pub fn clean_text(input: &str) -> String {
    let s = normalise_line_endings(input);
    let s = remove_control_chars(&s);
    let s = remove_invisible_chars(&s);
    let s = rejoin_hyphenated_words(&s);
    let s = collapse_spaces(&s);
    let s = trim_trailing_whitespace(&s);
    let s = collapse_blank_lines(&s);
    ensure_final_newline(&s)
}

// ── Rule 1: Normalise line endings ───────────────────────────────────────────

fn normalise_line_endings(input: &str) -> String {
    input.replace("\r\n", "\n").replace('\r', "\n")
}

// ── Rule 2: Strip control characters ─────────────────────────────────────────

fn remove_control_chars(input: &str) -> String {
    input
        .chars()
        .filter(|&c| c == '\n' || c == '\t' || !c.is_control())
        .collect()
}

// ── Rule 3: Strip invisible Unicode ──────────────────────────────────────────

/// Zero-width spaces, BOM, joiners, word joiner, and soft hyphens — none of
/// these carry meaning in reflowable text, and soft hyphens in particular
/// break search inside reader apps.
const INVISIBLE: &[char] = &[
    '\u{200B}', '\u{200C}', '\u{200D}', '\u{2060}', '\u{FEFF}', '\u{00AD}',
];

fn remove_invisible_chars(input: &str) -> String {
    input.chars().filter(|c| !INVISIBLE.contains(c)).collect()
}

// ── Rule 4: Re-join hyphenated line breaks ───────────────────────────────────

/// `conver-\nsion` → `conversion`, but only when the continuation starts
/// lowercase: `state-\nOwned` keeps its hyphen because that is more likely a
/// genuine compound split across lines.
static RE_HYPHEN_BREAK: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(\p{L})-\n(\p{Ll})").unwrap());

fn rejoin_hyphenated_words(input: &str) -> String {
    RE_HYPHEN_BREAK.replace_all(input, "$1$2").to_string()
}

// ── Rule 5: Collapse runs of spaces ──────────────────────────────────────────

static RE_SPACE_RUN: Lazy<Regex> = Lazy::new(|| Regex::new(r"[ \t]{2,}").unwrap());

fn collapse_spaces(input: &str) -> String {
    RE_SPACE_RUN.replace_all(input, " ").to_string()
}

// ── Rule 6: Trim trailing whitespace per line ────────────────────────────────

fn trim_trailing_whitespace(input: &str) -> String {
    input
        .lines()
        .map(|line| line.trim_end())
        .collect::<Vec<_>>()
        .join("\n")
}

// ── Rule 7: Collapse excessive blank lines ───────────────────────────────────

static RE_BLANK_LINES: Lazy<Regex> = Lazy::new(|| Regex::new(r"\n{3,}").unwrap());

fn collapse_blank_lines(input: &str) -> String {
    RE_BLANK_LINES.replace_all(input, "\n\n").to_string()
}

// ── Rule 8: Ensure file ends with single newline ─────────────────────────────

fn ensure_final_newline(input: &str) -> String {
    let trimmed = input.trim_matches('\n');
    if trimmed.is_empty() {
        String::new()
    } else {
        format!("{}\n", trimmed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn crlf_is_normalised() {
        assert_eq!(clean_text("one\r\ntwo\rthree"), "one\ntwo\nthree\n");
    }

    #[test]
    fn form_feed_is_removed() {
        assert_eq!(clean_text("alpha\u{0C}beta"), "alphabeta\n");
    }

    #[test]
    fn tabs_survive_but_collapse() {
        assert_eq!(clean_text("a\t\tb"), "a b\n");
    }

    #[test]
    fn invisible_chars_are_stripped() {
        let dirty = "he\u{200B}llo\u{FEFF} wor\u{00AD}ld";
        assert_eq!(clean_text(dirty), "hello world\n");
    }

    #[test]
    fn hyphenated_break_is_rejoined() {
        assert_eq!(clean_text("conver-\nsion works"), "conversion works\n");
    }

    #[test]
    fn hyphen_before_uppercase_is_kept() {
        // More likely a real compound than a typesetting break.
        assert_eq!(clean_text("state-\nOwned"), "state-\nOwned\n");
    }

    #[test]
    fn hyphen_at_line_end_without_continuation_is_kept() {
        assert_eq!(clean_text("dash-\n1 item"), "dash-\n1 item\n");
    }

    #[test]
    fn space_runs_collapse_within_lines() {
        assert_eq!(clean_text("justified    text   here"), "justified text here\n");
    }

    #[test]
    fn trailing_whitespace_is_trimmed() {
        assert_eq!(clean_text("line one   \nline two\t\n"), "line one\nline two\n");
    }

    #[test]
    fn blank_line_runs_collapse_to_one() {
        assert_eq!(clean_text("para one\n\n\n\n\npara two"), "para one\n\npara two\n");
    }

    #[test]
    fn empty_input_stays_empty() {
        assert_eq!(clean_text(""), "");
        assert_eq!(clean_text("\n\n\n"), "");
        assert_eq!(clean_text("\u{200B}\n"), "");
    }

    #[test]
    fn clean_text_is_idempotent() {
        let once = clean_text("one  two-\nthree\r\n\n\n\nfour   ");
        let twice = clean_text(&once);
        assert_eq!(once, twice);
    }
}
