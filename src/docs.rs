//! List the PDF documents currently available for ingestion.

use anyhow::Result;
use walkdir::WalkDir;

use crate::builder::is_pdf;
use crate::config::Config;

pub fn run_docs(config: &Config) -> Result<()> {
    let folder = &config.documents.folder;
    if !folder.is_dir() {
        println!("No hay documentos disponibles.");
        return Ok(());
    }

    let mut found = false;
    for entry in WalkDir::new(folder).max_depth(1).sort_by_file_name() {
        let entry = entry?;
        if entry.file_type().is_file() && is_pdf(entry.path()) {
            println!("{}", entry.file_name().to_string_lossy());
            found = true;
        }
    }
    if !found {
        println!("No hay documentos disponibles.");
    }
    Ok(())
}
