//! Article-aware segmentation of normalized document text.
//!
//! Regulatory documents number their operative clauses as `Artículo N` (often
//! abbreviated `Art. N`). Each one is extracted as a self-contained unit
//! whose heading is reconstructed in canonical form, so retrieval always sees
//! `Artículo 21. …` no matter how the source formatted it.

use regex::Regex;
use std::sync::LazyLock;

use crate::normalize::PAGE_TAG;

/// Article heading: case-insensitive keyword, optional spaces, captured
/// numeral, then a separator run of periods or whitespace.
static ARTICLE_HEADING: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i:artículo|art\.) *(\d+)[.\s]+").expect("article heading pattern compiles")
});

/// One extracted article.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Article {
    /// Numeral token as it appeared in the heading.
    pub number: String,
    /// Reconstructed content: `"Artículo {number}. {body}"`.
    pub content: String,
}

/// Extract every numbered article from `text`, in document order.
///
/// An article body runs from the end of its heading to the next article
/// heading, the next page-boundary tag, or the end of input, whichever comes
/// first. Page tags terminate bodies so that a lone article cannot swallow
/// unrelated text from the pages that follow it; an article continuing across
/// a page break is truncated at the break and is attributed to its starting
/// page.
///
/// Duplicate numerals are kept as-is; uniqueness is not tracked.
pub fn segment_articles(text: &str) -> Vec<Article> {
    let headings: Vec<(usize, String)> = ARTICLE_HEADING
        .captures_iter(text)
        .map(|caps| {
            let whole = caps.get(0).expect("match has a whole group");
            (whole.end(), caps[1].to_string())
        })
        .collect();

    // Body boundaries: every heading start plus every page tag start.
    let mut boundaries: Vec<usize> = ARTICLE_HEADING.find_iter(text).map(|m| m.start()).collect();
    boundaries.extend(PAGE_TAG.find_iter(text).map(|m| m.start()));
    boundaries.sort_unstable();

    headings
        .into_iter()
        .map(|(body_start, number)| {
            let body_end = boundaries
                .iter()
                .copied()
                .find(|&b| b >= body_start)
                .unwrap_or(text.len());
            let body = text[body_start..body_end].trim();
            let content = if body.is_empty() {
                format!("Artículo {number}.")
            } else {
                format!("Artículo {number}. {body}")
            };
            Article { number, content }
        })
        .collect()
}

/// Best-effort page attribution: the first page whose normalized text
/// contains `content` verbatim.
///
/// Returns `None` when no page matches, which happens when content spans a
/// page break or when normalization differs between the per-page and
/// whole-document passes. Callers must treat a miss as "page unknown", never
/// as an error.
pub fn locate_page(content: &str, pages: &[(u32, String)]) -> Option<u32> {
    pages
        .iter()
        .find(|(_, text)| text.contains(content))
        .map(|(page, _)| *page)
}
