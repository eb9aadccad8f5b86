//! Query pipeline: preprocessing, retrieval, two-tier relevance filtering,
//! context assembly, and answer synthesis.
//!
//! Every failure mode maps to a user-facing string; the caller always gets an
//! answer, never an error. Distinct situations get distinct fixed messages so
//! a user can tell "no index" apart from "nothing relevant found".

use std::collections::HashSet;
use std::sync::LazyLock;

use regex::Regex;
use tracing::error;

use crate::config::RetrievalConfig;
use crate::embedding::EmbeddingProvider;
use crate::generate::CompletionProvider;
use crate::index::{SearchHit, VectorIndex};
use crate::models::{ChatTurn, ContentType, TextUnit};
use crate::normalize::PAGE_TAG;

/// Fixed synonym table for query expansion. Matching is exact-word.
const SYNONYMS: &[(&str, &[&str])] = &[
    ("fecha", &["plazo", "cuando"]),
    ("plazo", &["fecha", "periodo"]),
    ("requisito", &["condicion", "requerimiento"]),
    ("documento", &["documentacion", "papel"]),
    ("ayuda", &["subvencion", "financiacion"]),
];

pub const MSG_INDEX_UNAVAILABLE: &str = "La base de conocimiento no está disponible.";
pub const MSG_EMPTY_RETRIEVAL: &str =
    "No encontré información relevante para tu pregunta. ¿Podrías reformularla?";
pub const MSG_EMPTY_AFTER_FILTER: &str =
    "No encontré información suficientemente relevante. ¿Podrías reformular tu pregunta?";

/// Instruction sent with every completion request.
const SYSTEM_PROMPT: &str = "\
Eres un asistente especializado en normativa institucional. Al responder:

1. Si encuentras información en artículos específicos:
   - Cita el número de artículo y la página
   - Proporciona el texto exacto relevante
   - Explica el contexto si es necesario

2. Si la información involucra plazos o fechas:
   - Especifica si el plazo depende de algún evento o resolución
   - Menciona todas las condiciones relevantes
   - Indica si hay excepciones o casos especiales

3. Para cualquier tipo de información:
   - Cita la fuente y página exacta
   - Proporciona contexto cuando sea necesario
   - Si hay ambigüedad, menciona todas las interpretaciones posibles";

static PUNCTUATION: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[^\w\s]").expect("punctuation pattern compiles"));

/// Lowercase, strip punctuation, and expand the query through the synonym
/// table.
///
/// The cleaned query plus every synonym of every matching word form a
/// deduplicated set, joined by spaces. The internal order of the set carries
/// no meaning; only membership does.
pub fn preprocess_query(query: &str) -> String {
    let cleaned = PUNCTUATION
        .replace_all(&query.to_lowercase(), "")
        .to_string();

    let mut seen = HashSet::new();
    let mut terms = Vec::new();
    if seen.insert(cleaned.clone()) {
        terms.push(cleaned.clone());
    }
    for word in cleaned.split_whitespace() {
        if let Some((_, synonyms)) = SYNONYMS.iter().find(|(key, _)| *key == word) {
            for syn in *synonyms {
                if seen.insert((*syn).to_string()) {
                    terms.push((*syn).to_string());
                }
            }
        }
    }
    terms.join(" ")
}

/// Two-tier relevance filter.
///
/// Articles pass at a lower score threshold than general chunks, and every
/// surviving article precedes every surviving general chunk regardless of
/// relative score. That priority is deliberate content-type ordering, not a
/// relevance sort.
pub fn filter_by_relevance(hits: &[SearchHit], config: &RetrievalConfig) -> Vec<TextUnit> {
    let mut relevant = Vec::new();
    for hit in hits {
        if hit.unit.content_type == ContentType::Article && hit.score > config.article_threshold {
            relevant.push(hit.unit.clone());
        }
    }
    for hit in hits {
        if hit.unit.content_type == ContentType::General && hit.score > config.general_threshold {
            relevant.push(hit.unit.clone());
        }
    }
    relevant
}

/// Assemble the bounded context window: the first `limit` relevant units in
/// their given order, page tags stripped, each labeled with source and page.
pub fn build_context(units: &[TextUnit], limit: usize) -> String {
    units
        .iter()
        .take(limit)
        .map(|unit| {
            let content = PAGE_TAG.replace_all(&unit.content, "");
            let page = unit
                .page
                .map(|p| p.to_string())
                .unwrap_or_else(|| "N/A".to_string());
            format!(
                "[Fuente: {} - Página {}]:\n{}",
                unit.source,
                page,
                content.trim()
            )
        })
        .collect::<Vec<_>>()
        .join("\n\n")
}

/// Answer a question against the index.
///
/// `_history` is accepted as part of the query contract but is not currently
/// consulted by retrieval, ranking, or context assembly; it is an extension
/// point, kept so callers already thread the conversation through.
pub async fn answer(
    query: &str,
    index: Option<&VectorIndex>,
    _history: &[ChatTurn],
    embeddings: &dyn EmbeddingProvider,
    completions: &dyn CompletionProvider,
    config: &RetrievalConfig,
) -> String {
    let Some(index) = index else {
        return MSG_INDEX_UNAVAILABLE.to_string();
    };

    let effective_query = preprocess_query(query);

    let hits = match index
        .search(&effective_query, config.fetch_k, embeddings)
        .await
    {
        Ok(hits) => hits,
        Err(e) => {
            error!(error = %e, "retrieval failed");
            return format!("Lo siento, ocurrió un error al procesar tu consulta: {e}");
        }
    };
    if hits.is_empty() {
        return MSG_EMPTY_RETRIEVAL.to_string();
    }

    let relevant = filter_by_relevance(&hits, config);
    if relevant.is_empty() {
        return MSG_EMPTY_AFTER_FILTER.to_string();
    }

    let context = build_context(&relevant, config.context_limit);
    // The completion sees the raw question, not the expanded retrieval query.
    let user_message = format!("Contexto:\n{context}\n\nPregunta: {query}");

    match completions.complete(SYSTEM_PROMPT, &user_message).await {
        Ok(text) => text,
        Err(e) => {
            error!(error = %e, "completion failed");
            format!("Lo siento, ocurrió un error al procesar tu consulta: {e}")
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn hit(content_type: ContentType, score: f32, label: &str) -> SearchHit {
        SearchHit {
            unit: TextUnit {
                content: label.to_string(),
                content_type,
                article_number: match content_type {
                    ContentType::Article => Some("1".to_string()),
                    ContentType::General => None,
                },
                source: "bases.pdf".to_string(),
                source_path: "/tmp/bases.pdf".to_string(),
                page: None,
            },
            score,
        }
    }

    #[test]
    fn query_expansion_adds_synonyms_of_matched_words() {
        let expanded = preprocess_query("¿Cuál es la fecha límite?");
        assert!(expanded.contains("cuál es la fecha límite"));
        assert!(expanded.contains("plazo"));
        assert!(expanded.contains("cuando"));
        assert!(!expanded.contains('¿'));
        assert!(!expanded.contains('?'));
    }

    #[test]
    fn query_expansion_deduplicates_terms() {
        let expanded = preprocess_query("fecha plazo");
        let words: Vec<&str> = expanded.split_whitespace().collect();
        let unique: HashSet<&str> = words.iter().copied().collect();
        // "fecha plazo" + {plazo, cuando} + {fecha, periodo}: the repeated
        // words appear once beyond the original query string.
        assert_eq!(words.len(), unique.len() + 2);
        assert!(expanded.contains("cuando"));
        assert!(expanded.contains("periodo"));
    }

    #[test]
    fn unmatched_queries_pass_through_cleaned() {
        assert_eq!(preprocess_query("Importe de la BECA"), "importe de la beca");
    }

    #[test]
    fn filter_applies_per_type_thresholds_and_type_ordering() {
        let config = RetrievalConfig::default();
        let mut hits = vec![
            hit(ContentType::General, 0.90, "general fuerte"),
            hit(ContentType::Article, 0.04, "artículo débil pero admitido"),
            hit(ContentType::Article, 0.03, "artículo en el umbral"),
            hit(ContentType::Article, 0.01, "artículo descartado"),
            hit(ContentType::General, 0.05, "general en el umbral"),
            hit(ContentType::General, 0.02, "general descartado"),
            hit(ContentType::Article, 0.60, "artículo fuerte"),
        ];
        // Pad to the full retrieval window with sub-threshold noise.
        for i in 0..13 {
            hits.push(hit(ContentType::General, 0.001, &format!("ruido {i}")));
        }
        assert_eq!(hits.len(), 20);

        let relevant = filter_by_relevance(&hits, &config);
        let labels: Vec<&str> = relevant.iter().map(|u| u.content.as_str()).collect();
        assert_eq!(
            labels,
            vec![
                "artículo débil pero admitido",
                "artículo fuerte",
                "general fuerte",
            ]
        );

        // Thresholds are strict: boundary scores are excluded.
        assert!(!labels.contains(&"artículo en el umbral"));
        assert!(!labels.contains(&"general en el umbral"));

        // Every article precedes every general unit even when the general
        // unit scored higher.
        let first_general = labels.iter().position(|l| l.starts_with("general")).unwrap();
        let last_article = labels.iter().rposition(|l| l.starts_with("artículo")).unwrap();
        assert!(last_article < first_general);
    }

    #[test]
    fn context_strips_page_tags_and_labels_sources() {
        let mut unit = hit(ContentType::General, 0.5, "PÁGINA 2\nEl plazo será de diez días.").unit;
        unit.page = Some(2);
        let context = build_context(&[unit], 10);
        assert_eq!(
            context,
            "[Fuente: bases.pdf - Página 2]:\nEl plazo será de diez días."
        );
    }

    #[test]
    fn context_marks_unknown_pages() {
        let unit = hit(ContentType::General, 0.5, "Texto sin página conocida.").unit;
        let context = build_context(&[unit], 10);
        assert!(context.starts_with("[Fuente: bases.pdf - Página N/A]:"));
    }

    #[test]
    fn context_is_bounded_by_the_limit() {
        let units: Vec<TextUnit> = (0..15)
            .map(|i| hit(ContentType::General, 0.5, &format!("unidad {i}")).unit)
            .collect();
        let context = build_context(&units, 10);
        assert_eq!(context.matches("[Fuente:").count(), 10);
        assert!(!context.contains("unidad 10"));
    }
}
