//! Overlapping window chunker for residual (non-article) text.
//!
//! Splits on the earliest-listed separator present in the text, greedily
//! recombines the pieces under the size budget, and carries a trailing
//! overlap window into the next chunk. Pieces still over budget recurse into
//! the remaining separators; once none remain, an oversized piece is emitted
//! as-is.
//!
//! Lengths are measured in characters, not bytes, so multibyte Spanish text
//! never splits inside a code point.

use std::collections::VecDeque;

/// Default window size in characters.
pub const DEFAULT_SIZE: usize = 1500;
/// Default overlap carried between consecutive windows, in characters.
pub const DEFAULT_OVERLAP: usize = 300;
/// Separators tried in order of preference.
pub const DEFAULT_SEPARATORS: &[&str] = &["\n\n", "\n", ". "];
/// Chunks shorter than this after trimming are dropped, never emitted.
const MIN_CHARS: usize = 100;

/// Split `text` into overlapping chunks, discarding any piece shorter than
/// 100 characters after trimming.
pub fn chunk(text: &str, size: usize, overlap: usize, separators: &[&str]) -> Vec<String> {
    split_recursive(text, size, overlap, separators)
        .into_iter()
        .filter(|piece| piece.trim().chars().count() >= MIN_CHARS)
        .collect()
}

/// [`chunk`] with the default size, overlap, and separator preferences.
pub fn chunk_default(text: &str) -> Vec<String> {
    chunk(text, DEFAULT_SIZE, DEFAULT_OVERLAP, DEFAULT_SEPARATORS)
}

fn split_recursive(text: &str, size: usize, overlap: usize, separators: &[&str]) -> Vec<String> {
    let (separator, rest) = pick_separator(text, separators);

    let mut chunks = Vec::new();
    let mut pending: Vec<&str> = Vec::new();

    for piece in text.split(separator).filter(|p| !p.is_empty()) {
        if piece.chars().count() < size {
            pending.push(piece);
            continue;
        }
        if !pending.is_empty() {
            chunks.extend(merge_pieces(&pending, separator, size, overlap));
            pending.clear();
        }
        if rest.is_empty() {
            // No finer separator left; emit the oversized piece whole.
            chunks.push(piece.trim().to_string());
        } else {
            chunks.extend(split_recursive(piece, size, overlap, rest));
        }
    }
    if !pending.is_empty() {
        chunks.extend(merge_pieces(&pending, separator, size, overlap));
    }
    chunks
}

/// The earliest-listed separator present in `text`, with the finer-grained
/// candidates that remain after it.
fn pick_separator<'a>(text: &str, separators: &'a [&'a str]) -> (&'a str, &'a [&'a str]) {
    for (i, sep) in separators.iter().copied().enumerate() {
        if text.contains(sep) {
            return (sep, &separators[i + 1..]);
        }
    }
    match separators.last() {
        Some(&last) => (last, &[]),
        None => (" ", &[]),
    }
}

/// Greedily recombine small pieces under the size budget. When a window is
/// flushed, its leading pieces are dropped until at most `overlap` characters
/// remain; those survivors open the next window.
fn merge_pieces(pieces: &[&str], separator: &str, size: usize, overlap: usize) -> Vec<String> {
    let sep_len = separator.chars().count();
    let mut chunks = Vec::new();
    let mut window: VecDeque<&str> = VecDeque::new();
    let mut total = 0usize;

    for &piece in pieces {
        let piece_len = piece.chars().count();
        let joined_len = total + piece_len + if window.is_empty() { 0 } else { sep_len };
        if joined_len > size && !window.is_empty() {
            push_window(&mut chunks, &window, separator);
            while total > overlap || (total + piece_len + sep_len > size && total > 0) {
                let dropped = match window.pop_front() {
                    Some(dropped) => dropped,
                    None => break,
                };
                total -= dropped.chars().count() + if window.is_empty() { 0 } else { sep_len };
            }
        }
        window.push_back(piece);
        total += piece_len + if window.len() > 1 { sep_len } else { 0 };
    }
    if !window.is_empty() {
        push_window(&mut chunks, &window, separator);
    }
    chunks
}

fn push_window(chunks: &mut Vec<String>, window: &VecDeque<&str>, separator: &str) {
    let joined = window
        .iter()
        .copied()
        .collect::<Vec<_>>()
        .join(separator)
        .trim()
        .to_string();
    if !joined.is_empty() {
        chunks.push(joined);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sentences(count: usize) -> String {
        (0..count)
            .map(|i| {
                format!(
                    "La cláusula administrativa número {i:03} regula un aspecto del procedimiento"
                )
            })
            .collect::<Vec<_>>()
            .join(". ")
    }

    /// Longest suffix of `a` (in characters) that is also a prefix of `b`.
    fn shared_overlap(a: &str, b: &str) -> usize {
        let a_chars: Vec<char> = a.chars().collect();
        let b_chars: Vec<char> = b.chars().collect();
        let max = a_chars.len().min(b_chars.len());
        (0..=max)
            .rev()
            .find(|&k| a_chars[a_chars.len() - k..] == b_chars[..k])
            .unwrap_or(0)
    }

    #[test]
    fn short_text_is_dropped_entirely() {
        assert!(chunk_default("demasiado corto para conservarse").is_empty());
    }

    #[test]
    fn medium_text_is_a_single_chunk() {
        let text = sentences(2);
        assert!(text.chars().count() >= 100);
        let chunks = chunk_default(&text);
        assert_eq!(chunks, vec![text]);
    }

    #[test]
    fn no_chunk_is_shorter_than_the_minimum() {
        let text = sentences(60);
        for piece in chunk_default(&text) {
            assert!(piece.trim().chars().count() >= 100, "short chunk: {piece:?}");
        }
    }

    #[test]
    fn chunks_respect_the_size_budget_when_separators_allow() {
        let text = sentences(60);
        for piece in chunk_default(&text) {
            assert!(piece.chars().count() <= DEFAULT_SIZE, "oversized chunk");
        }
    }

    #[test]
    fn consecutive_chunks_share_an_overlap_window() {
        let text = sentences(60);
        let chunks = chunk_default(&text);
        assert!(chunks.len() >= 2, "expected multiple chunks");
        for pair in chunks.windows(2) {
            let shared = shared_overlap(&pair[0], &pair[1]);
            assert!(shared > 0, "no overlap between consecutive chunks");
            assert!(shared <= DEFAULT_OVERLAP, "overlap exceeds the budget");
        }
    }

    #[test]
    fn paragraph_boundaries_are_preferred() {
        let first = sentences(2);
        let second = sentences(3);
        let text = format!("{first}\n\n{second}");
        let chunks = chunk(&text, 300, 50, DEFAULT_SEPARATORS);
        assert_eq!(chunks.len(), 2);
        assert_eq!(chunks[0], first);
        assert_eq!(chunks[1], second);
    }

    #[test]
    fn unsplittable_oversized_text_is_emitted_whole() {
        let text = "x".repeat(2000);
        let chunks = chunk_default(&text);
        assert_eq!(chunks.len(), 1);
        assert_eq!(chunks[0].chars().count(), 2000);
    }

    #[test]
    fn empty_input_yields_no_chunks() {
        assert!(chunk_default("").is_empty());
    }
}
