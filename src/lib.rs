//! # Consulta
//!
//! A retrieval-augmented question answering assistant for regulatory PDF
//! documents. PDFs are split into retrievable units with special handling
//! for numbered legal articles, embedded into a vector index, and questions
//! are answered by forwarding the most relevant units to a completion model.
//!
//! ## Pipeline
//!
//! ```text
//! ┌──────────┐   ┌────────────────────┐   ┌──────────────┐
//! │  PDFs    │──▶│ normalize, segment │──▶│ vector index │
//! │ (folder) │   │ articles, chunk    │   │ (JSON blob)  │
//! └──────────┘   └────────────────────┘   └──────┬───────┘
//!                                                │ retrieve
//!                   ┌────────────────────────────┤
//!                   ▼                            ▼
//!             ┌───────────┐   two-tier     ┌───────────┐
//!             │   query   │──▶ filter ────▶│ completion │
//!             │ expansion │    + context   │  service   │
//!             └───────────┘                └───────────┘
//! ```
//!
//! ## Modules
//!
//! | Module | Purpose |
//! |--------|---------|
//! | [`config`] | TOML configuration parsing |
//! | [`models`] | Core data types |
//! | [`normalize`] | Text canonicalization |
//! | [`segment`] | Article segmentation and page attribution |
//! | [`chunk`] | Overlapping window chunker |
//! | [`extract`] | PDF page text extraction |
//! | [`builder`] | Per-document unit construction |
//! | [`embedding`] | Embedding provider abstraction |
//! | [`index`] | Vector index build/update/persist/search |
//! | [`generate`] | Completion service adapter |
//! | [`query`] | Retrieval, filtering, and answer synthesis |
//! | [`ingest`], [`ask`], [`chat`], [`docs`] | CLI commands |

pub mod ask;
pub mod builder;
pub mod chat;
pub mod chunk;
pub mod config;
pub mod docs;
pub mod embedding;
pub mod extract;
pub mod generate;
pub mod index;
pub mod ingest;
pub mod models;
pub mod normalize;
pub mod query;
pub mod segment;
