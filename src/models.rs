//! Core data types flowing through the ingestion and query pipeline.

use serde::{Deserialize, Serialize};

/// Classification of a retrievable text unit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ContentType {
    /// A numbered legal article extracted as a self-contained unit.
    Article,
    /// Residual document text chunked into overlapping windows.
    General,
}

/// The atomic retrievable entity produced by the document builder.
///
/// Units are created once per ingestion pass and are immutable afterwards;
/// they disappear by being excluded from the next rebuild. After index
/// construction only the index's own copy survives.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TextUnit {
    /// Final normalized text. Article units start with their reconstructed
    /// heading (`"Artículo 21. …"`).
    pub content: String,
    pub content_type: ContentType,
    /// Numeral token from the article heading; only present for articles.
    /// Not unique across source documents, not numerically sorted.
    pub article_number: Option<String>,
    /// Originating file name.
    pub source: String,
    /// Originating file location.
    pub source_path: String,
    /// Best-effort page attribution; `None` when the lookup misses.
    pub page: Option<u32>,
}

/// Speaker of one conversation turn.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Role {
    User,
    Assistant,
}

/// One turn of an in-memory chat session. Never persisted.
#[derive(Debug, Clone)]
pub struct ChatTurn {
    pub role: Role,
    pub content: String,
}
