//! Interactive chat session over the indexed document collection.

use std::io::{BufRead, Write};

use anyhow::Result;

use crate::config::Config;
use crate::embedding::OpenAiEmbeddings;
use crate::generate::OpenAiChat;
use crate::index::VectorIndex;
use crate::ingest;
use crate::models::{ChatTurn, Role};
use crate::query;

/// State owned by one interactive session: the loaded index and the
/// conversation so far.
///
/// History is append-only, cleared only on explicit user request, and never
/// written to disk. There is no process-wide session state; everything lives
/// in this value.
pub struct Session {
    pub index: Option<VectorIndex>,
    pub history: Vec<ChatTurn>,
}

impl Session {
    pub fn new(index: Option<VectorIndex>) -> Self {
        Self {
            index,
            history: Vec::new(),
        }
    }

    pub fn clear_history(&mut self) {
        self.history.clear();
    }

    pub fn record_exchange(&mut self, question: &str, reply: &str) {
        self.history.push(ChatTurn {
            role: Role::User,
            content: question.to_string(),
        });
        self.history.push(ChatTurn {
            role: Role::Assistant,
            content: reply.to_string(),
        });
    }
}

pub async fn run_chat(config: &Config) -> Result<()> {
    let embeddings = OpenAiEmbeddings::new(&config.embedding)?;
    let completions = OpenAiChat::new(&config.generation)?;
    let mut session = Session::new(ingest::initialize(config, &embeddings).await?);

    println!(
        "Asistente de normativa. Escribe tu pregunta, /limpiar para borrar el historial, /salir para terminar."
    );

    let stdin = std::io::stdin();
    loop {
        print!("> ");
        std::io::stdout().flush()?;

        let mut line = String::new();
        if stdin.lock().read_line(&mut line)? == 0 {
            break;
        }
        let input = line.trim();
        match input {
            "" => continue,
            "/salir" => break,
            "/limpiar" => {
                session.clear_history();
                println!("Historial borrado.");
            }
            question => {
                let reply = query::answer(
                    question,
                    session.index.as_ref(),
                    &session.history,
                    &embeddings,
                    &completions,
                    &config.retrieval,
                )
                .await;
                println!("{reply}");
                session.record_exchange(question, &reply);
            }
        }
    }

    Ok(())
}
