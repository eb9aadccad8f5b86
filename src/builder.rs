//! Document builder: turns a folder of PDFs into tagged text units.
//!
//! Per file: extract page texts, concatenate with page markers, normalize the
//! whole, pull out numbered articles, chunk what remains, and attach source
//! and page metadata. One bad file never aborts the batch.

use std::path::Path;

use anyhow::{bail, Result};
use tracing::{info, warn};
use walkdir::WalkDir;

use crate::chunk::{chunk, DEFAULT_SEPARATORS};
use crate::config::ChunkingConfig;
use crate::extract;
use crate::models::{ContentType, TextUnit};
use crate::normalize::{normalize, page_marker};
use crate::segment::{locate_page, segment_articles};

/// Build text units from every `.pdf` file directly inside `folder`.
///
/// Extraction failures are logged and the file is skipped; a folder holding
/// no PDFs, or where every PDF fails, yields an empty collection rather than
/// an error.
pub fn build_units(folder: &Path, chunking: &ChunkingConfig) -> Result<Vec<TextUnit>> {
    if !folder.is_dir() {
        bail!("documents folder does not exist: {}", folder.display());
    }

    let mut units = Vec::new();
    for entry in WalkDir::new(folder).max_depth(1).sort_by_file_name() {
        let entry = entry?;
        if !entry.file_type().is_file() || !is_pdf(entry.path()) {
            continue;
        }
        let name = entry.file_name().to_string_lossy().to_string();

        let pages = match extract::pdf_pages(entry.path()) {
            Ok(pages) => pages,
            Err(e) => {
                warn!(file = %name, error = %e, "skipping document");
                continue;
            }
        };

        let file_units = units_from_pages(&name, &entry.path().to_string_lossy(), &pages, chunking);
        info!(file = %name, units = file_units.len(), "document processed");
        units.extend(file_units);
    }

    info!(total = units.len(), "unit collection built");
    Ok(units)
}

pub(crate) fn is_pdf(path: &Path) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| ext.eq_ignore_ascii_case("pdf"))
}

/// Turn one document's raw page texts into tagged units.
///
/// Articles come out of the normalized whole, where inserted page markers
/// keep the page-boundary signal visible to the segmenter. The residual text
/// left after deleting each article's content string is chunked into general
/// units. Deleting by content string over-deletes when an article's text
/// repeats verbatim elsewhere in the document; that approximation is
/// intentional and documented behavior.
pub fn units_from_pages(
    source: &str,
    source_path: &str,
    pages: &[String],
    chunking: &ChunkingConfig,
) -> Vec<TextUnit> {
    let mut whole = String::new();
    let mut page_texts: Vec<(u32, String)> = Vec::new();
    for (i, raw) in pages.iter().enumerate() {
        if raw.trim().is_empty() {
            continue;
        }
        let page = i as u32 + 1;
        whole.push_str(&page_marker(page));
        whole.push_str(raw);
        page_texts.push((page, normalize(raw)));
    }
    let whole = normalize(&whole);

    let articles = segment_articles(&whole);
    info!(source, articles = articles.len(), "articles segmented");

    let mut units: Vec<TextUnit> = articles
        .iter()
        .map(|article| TextUnit {
            content: article.content.clone(),
            content_type: ContentType::Article,
            article_number: Some(article.number.clone()),
            source: source.to_string(),
            source_path: source_path.to_string(),
            page: locate_page(&article.content, &page_texts),
        })
        .collect();

    // Residual text: the whole minus every article's exact content.
    let mut residual = whole;
    for article in &articles {
        residual = residual.replace(&article.content, "");
    }

    for piece in chunk(&residual, chunking.size, chunking.overlap, DEFAULT_SEPARATORS) {
        let page = locate_page(&piece, &page_texts);
        units.push(TextUnit {
            content: piece,
            content_type: ContentType::General,
            article_number: None,
            source: source.to_string(),
            source_path: source_path.to_string(),
            page,
        });
    }

    units
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pdf_extension_matching_is_case_insensitive() {
        assert!(is_pdf(Path::new("decreto.pdf")));
        assert!(is_pdf(Path::new("DECRETO.PDF")));
        assert!(!is_pdf(Path::new("decreto.txt")));
        assert!(!is_pdf(Path::new("decreto")));
    }

    #[test]
    fn missing_folder_is_an_error() {
        assert!(build_units(Path::new("/no/existe/carpeta"), &ChunkingConfig::default()).is_err());
    }

    #[test]
    fn blank_pages_are_skipped_but_numbering_is_preserved() {
        let pages = vec![
            String::new(),
            "Artículo 1. Objeto de la convocatoria.".to_string(),
        ];
        let units =
            units_from_pages("bases.pdf", "/tmp/bases.pdf", &pages, &ChunkingConfig::default());
        assert_eq!(units.len(), 1);
        assert_eq!(units[0].page, Some(2));
        assert_eq!(units[0].content, "Artículo 1. Objeto de la convocatoria.");
    }
}
