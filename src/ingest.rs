//! Ingestion command: build units from the documents folder, build or update
//! the vector index, and persist it.
//!
//! Rebuilding and querying are mutually exclusive phases: a rebuild runs to
//! completion and persists before any question is answered against the new
//! index.

use std::collections::HashSet;

use anyhow::{Context, Result};
use tracing::warn;

use crate::builder;
use crate::config::Config;
use crate::embedding::EmbeddingProvider;
use crate::index::{self, VectorIndex};
use crate::models::ContentType;

/// Process every PDF in the documents folder and rebuild the index, or with
/// `merge` add the folder's units to the existing one.
pub async fn run_ingest(
    config: &Config,
    provider: &dyn EmbeddingProvider,
    merge: bool,
) -> Result<()> {
    std::fs::create_dir_all(&config.documents.folder).with_context(|| {
        format!(
            "failed to create documents folder {}",
            config.documents.folder.display()
        )
    })?;

    let units = builder::build_units(&config.documents.folder, &config.chunking)?;
    let articles = units
        .iter()
        .filter(|u| u.content_type == ContentType::Article)
        .count();
    let files: HashSet<&str> = units.iter().map(|u| u.source.as_str()).collect();

    println!("ingest {}", config.documents.folder.display());
    println!("  documents: {}", files.len());
    println!("  article units: {}", articles);
    println!("  general units: {}", units.len() - articles);

    let built = if merge {
        let existing = index::reload(&config.index.path, provider.model_name());
        index::update(existing, &units, provider, config.embedding.batch_size).await?
    } else {
        index::build(&units, provider, config.embedding.batch_size).await?
    };

    match built {
        Some(built) => {
            if let Err(e) = built.persist(&config.index.path) {
                warn!(error = %e, "index was built but not persisted");
            }
            println!("  units indexed: {}", built.len());
            println!("ok");
        }
        None => {
            println!("  no units to index; index unchanged");
        }
    }

    Ok(())
}

/// Reload the persisted index, or build it from the documents folder when no
/// usable index exists. This is what the interactive surface does on startup.
pub async fn initialize(
    config: &Config,
    provider: &dyn EmbeddingProvider,
) -> Result<Option<VectorIndex>> {
    if let Some(index) = index::reload(&config.index.path, provider.model_name()) {
        return Ok(Some(index));
    }

    if !config.documents.folder.is_dir() {
        warn!(
            folder = %config.documents.folder.display(),
            "documents folder missing, starting without an index"
        );
        return Ok(None);
    }

    let units = builder::build_units(&config.documents.folder, &config.chunking)?;
    let built = index::build(&units, provider, config.embedding.batch_size).await?;
    if let Some(ref index) = built {
        if let Err(e) = index.persist(&config.index.path) {
            warn!(error = %e, "index was built but not persisted");
        }
    }
    Ok(built)
}
