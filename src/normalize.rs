//! Text canonicalization for extracted page text.
//!
//! Every downstream stage (segmentation, chunking, page attribution) operates
//! on the normalized form, so the same function is applied to whole documents
//! and to individual pages. Normalization is idempotent: the character strip
//! runs before whitespace collapsing, so deleting a symbol can never leave a
//! doubled space behind for a second pass to find.

use regex::Regex;
use std::sync::LazyLock;

/// Characters allowed to survive normalization: word characters, whitespace,
/// and the punctuation used by Spanish regulatory text. Everything else is
/// deleted, not escaped.
static DISALLOWED: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[^\w\s.,;:()¿?¡!-]").expect("allow-list pattern compiles"));

static HORIZONTAL_WS: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[ \t]+").expect("horizontal whitespace pattern compiles"));

static EXCESS_NEWLINES: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\n{3,}").expect("newline run pattern compiles"));

/// Page-boundary tag in both its raw inserted form (`[PÁGINA 3]`) and its
/// normalized form (`PÁGINA 3`, brackets stripped by the allow-list).
pub static PAGE_TAG: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\[?PÁGINA +\d+\]?").expect("page tag pattern compiles"));

/// Marker line inserted between concatenated page texts by the builder.
pub fn page_marker(page: u32) -> String {
    format!("\n[PÁGINA {page}]\n")
}

/// Canonicalize raw extracted text.
///
/// Form feeds become paragraph breaks, characters outside the allow-list are
/// deleted, horizontal whitespace collapses to single spaces, and runs of
/// three or more newlines collapse to exactly two. Returns an empty string
/// for empty input; never fails.
pub fn normalize(raw: &str) -> String {
    if raw.is_empty() {
        return String::new();
    }
    let text = raw.replace('\u{000C}', "\n\n");
    let text = DISALLOWED.replace_all(&text, "");
    let text = HORIZONTAL_WS.replace_all(&text, " ");
    let text = EXCESS_NEWLINES.replace_all(&text, "\n\n");
    text.trim().to_string()
}
