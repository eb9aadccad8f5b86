//! One-shot question command.

use anyhow::Result;

use crate::config::Config;
use crate::embedding::OpenAiEmbeddings;
use crate::generate::OpenAiChat;
use crate::ingest;
use crate::query;

pub async fn run_ask(config: &Config, question: &str) -> Result<()> {
    let embeddings = OpenAiEmbeddings::new(&config.embedding)?;
    let completions = OpenAiChat::new(&config.generation)?;

    let index = ingest::initialize(config, &embeddings).await?;
    let reply = query::answer(
        question,
        index.as_ref(),
        &[],
        &embeddings,
        &completions,
        &config.retrieval,
    )
    .await;
    println!("{reply}");
    Ok(())
}
