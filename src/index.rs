//! Vector index over text units: build, update, persist, reload, search.
//!
//! The index owns a searchable copy of every unit (content plus metadata)
//! together with its embedding vector. Search is brute-force cosine
//! similarity, which is plenty for a few thousand units. The persisted form
//! is a JSON blob that records the embedding model, so a model switch forces
//! a rebuild instead of comparing incompatible vectors.
//!
//! Persistence failures never crash the caller: a bad or missing blob simply
//! degrades to "no index".

use std::path::Path;

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::{info, warn};
use uuid::Uuid;

use crate::embedding::{cosine_similarity, EmbeddingProvider};
use crate::models::TextUnit;

/// A unit as stored by the index: the searchable copy plus its vector.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IndexedUnit {
    pub id: String,
    pub unit: TextUnit,
    pub embedding: Vec<f32>,
}

/// One retrieval hit: a stored unit and its similarity to the query.
/// Higher scores are more relevant.
#[derive(Debug, Clone)]
pub struct SearchHit {
    pub unit: TextUnit,
    pub score: f32,
}

/// Brute-force cosine similarity index, persisted as a JSON blob.
#[derive(Debug, Serialize, Deserialize)]
pub struct VectorIndex {
    model: String,
    built_at: DateTime<Utc>,
    entries: Vec<IndexedUnit>,
}

impl VectorIndex {
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Embed the query and return the `k` most similar stored units, ordered
    /// by descending similarity.
    pub async fn search(
        &self,
        query: &str,
        k: usize,
        provider: &dyn EmbeddingProvider,
    ) -> Result<Vec<SearchHit>> {
        let query_vec = provider
            .embed(&[query.to_string()])
            .await?
            .into_iter()
            .next()
            .context("empty embedding response for query")?;

        let mut scored: Vec<(f32, &IndexedUnit)> = self
            .entries
            .iter()
            .map(|entry| (cosine_similarity(&query_vec, &entry.embedding), entry))
            .collect();
        scored.sort_by(|a, b| b.0.partial_cmp(&a.0).unwrap_or(std::cmp::Ordering::Equal));
        scored.truncate(k);

        Ok(scored
            .into_iter()
            .map(|(score, entry)| SearchHit {
                unit: entry.unit.clone(),
                score,
            })
            .collect())
    }

    /// Write the index to `path` as JSON, creating parent directories.
    pub fn persist(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)
                    .with_context(|| format!("failed to create {}", parent.display()))?;
            }
        }
        let json = serde_json::to_string(self)?;
        std::fs::write(path, json)
            .with_context(|| format!("failed to write index to {}", path.display()))?;
        info!(path = %path.display(), units = self.entries.len(), "index persisted");
        Ok(())
    }
}

/// Build an index over `units`.
///
/// Returns `None` (with a logged warning) when there is nothing to index; an
/// empty index is never built.
pub async fn build(
    units: &[TextUnit],
    provider: &dyn EmbeddingProvider,
    batch_size: usize,
) -> Result<Option<VectorIndex>> {
    if units.is_empty() {
        warn!("no units provided for indexing");
        return Ok(None);
    }

    let entries = embed_units(units, provider, batch_size).await?;
    info!(units = entries.len(), model = provider.model_name(), "index built");
    Ok(Some(VectorIndex {
        model: provider.model_name().to_string(),
        built_at: Utc::now(),
        entries,
    }))
}

/// Add `new_units` to an existing index.
///
/// An absent index behaves as [`build`]; empty `new_units` returns the index
/// unchanged.
pub async fn update(
    existing: Option<VectorIndex>,
    new_units: &[TextUnit],
    provider: &dyn EmbeddingProvider,
    batch_size: usize,
) -> Result<Option<VectorIndex>> {
    if new_units.is_empty() {
        return Ok(existing);
    }
    let Some(mut index) = existing else {
        return build(new_units, provider, batch_size).await;
    };

    let entries = embed_units(new_units, provider, batch_size).await?;
    index.entries.extend(entries);
    index.built_at = Utc::now();
    info!(added = new_units.len(), total = index.entries.len(), "index updated");
    Ok(Some(index))
}

/// Load a persisted index.
///
/// Any failure (missing file, unreadable blob, embedding model mismatch) is
/// logged and degrades to `None`; the caller treats that as "no index" and
/// may rebuild.
pub fn reload(path: &Path, expected_model: &str) -> Option<VectorIndex> {
    let json = match std::fs::read_to_string(path) {
        Ok(json) => json,
        Err(e) => {
            info!(path = %path.display(), error = %e, "no persisted index available");
            return None;
        }
    };
    let index: VectorIndex = match serde_json::from_str(&json) {
        Ok(index) => index,
        Err(e) => {
            warn!(path = %path.display(), error = %e, "failed to parse persisted index");
            return None;
        }
    };
    if index.model != expected_model {
        warn!(
            stored = %index.model,
            configured = %expected_model,
            "embedding model changed, index must be rebuilt"
        );
        return None;
    }
    info!(path = %path.display(), units = index.entries.len(), "index loaded");
    Some(index)
}

async fn embed_units(
    units: &[TextUnit],
    provider: &dyn EmbeddingProvider,
    batch_size: usize,
) -> Result<Vec<IndexedUnit>> {
    let batch_size = batch_size.max(1);
    let mut entries = Vec::with_capacity(units.len());
    for batch in units.chunks(batch_size) {
        let texts: Vec<String> = batch.iter().map(|u| u.content.clone()).collect();
        let vectors = provider.embed(&texts).await?;
        for (unit, embedding) in batch.iter().zip(vectors) {
            entries.push(IndexedUnit {
                id: Uuid::new_v4().to_string(),
                unit: unit.clone(),
                embedding,
            });
        }
    }
    Ok(entries)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::ContentType;
    use async_trait::async_trait;

    /// Deterministic embedder: counts occurrences of a tiny fixed vocabulary.
    /// Texts that share vocabulary words point in similar directions.
    struct VocabEmbeddings;

    const VOCAB: [&str; 4] = ["plazo", "requisito", "importe", "resolución"];

    #[async_trait]
    impl EmbeddingProvider for VocabEmbeddings {
        fn model_name(&self) -> &str {
            "vocab-test"
        }

        fn dims(&self) -> usize {
            VOCAB.len()
        }

        async fn embed(&self, texts: &[String]) -> Result<Vec<Vec<f32>>> {
            Ok(texts
                .iter()
                .map(|text| {
                    let lower = text.to_lowercase();
                    VOCAB
                        .iter()
                        .map(|word| lower.matches(word).count() as f32)
                        .collect()
                })
                .collect())
        }
    }

    fn unit(content: &str) -> TextUnit {
        TextUnit {
            content: content.to_string(),
            content_type: ContentType::General,
            article_number: None,
            source: "bases.pdf".to_string(),
            source_path: "/tmp/bases.pdf".to_string(),
            page: Some(1),
        }
    }

    #[tokio::test]
    async fn building_over_nothing_yields_no_index() {
        let built = build(&[], &VocabEmbeddings, 8).await.unwrap();
        assert!(built.is_none());
    }

    #[tokio::test]
    async fn search_orders_by_descending_similarity() {
        let units = vec![
            unit("el plazo de presentación y el plazo de subsanación"),
            unit("el requisito económico de la entidad"),
        ];
        let index = build(&units, &VocabEmbeddings, 1).await.unwrap().unwrap();

        let hits = index.search("plazo", 2, &VocabEmbeddings).await.unwrap();
        assert_eq!(hits.len(), 2);
        assert!(hits[0].unit.content.contains("plazo"));
        assert!(hits[0].score > hits[1].score);
    }

    #[tokio::test]
    async fn update_without_an_index_builds_one() {
        let units = vec![unit("importe máximo de la ayuda")];
        let updated = update(None, &units, &VocabEmbeddings, 8).await.unwrap();
        assert_eq!(updated.map(|i| i.len()), Some(1));
    }

    #[tokio::test]
    async fn update_with_no_new_units_returns_the_index_unchanged() {
        let units = vec![unit("resolución de concesión"), unit("plazo de alegaciones")];
        let index = build(&units, &VocabEmbeddings, 8).await.unwrap();
        let updated = update(index, &[], &VocabEmbeddings, 8).await.unwrap().unwrap();
        assert_eq!(updated.len(), 2);
    }

    #[tokio::test]
    async fn update_appends_to_an_existing_index() {
        let index = build(&[unit("plazo inicial")], &VocabEmbeddings, 8).await.unwrap();
        let updated = update(index, &[unit("requisito nuevo")], &VocabEmbeddings, 8)
            .await
            .unwrap()
            .unwrap();
        assert_eq!(updated.len(), 2);
    }

    #[tokio::test]
    async fn persist_and_reload_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("indice.json");

        let index = build(&[unit("plazo de diez días")], &VocabEmbeddings, 8)
            .await
            .unwrap()
            .unwrap();
        index.persist(&path).unwrap();

        let reloaded = reload(&path, "vocab-test").unwrap();
        assert_eq!(reloaded.len(), 1);

        // A different embedding model invalidates the persisted blob.
        assert!(reload(&path, "otro-modelo").is_none());
        assert!(reload(&dir.path().join("no-existe.json"), "vocab-test").is_none());
    }
}
