//! Corpus loading: scans a directory for PDF and plain-text documents,
//! extracts text, and chunks it into passages.
//!
//! PDFs are extracted with the `pdftotext` system binary (poppler).
//! Chunking splits on blank lines and discards fragments below the minimum
//! character threshold to drop headers, footers, and page-number noise.

use std::path::{Path, PathBuf};
use std::process::Command;

use colored::Colorize;

use crate::corpus::PassageStore;
use crate::errors::{AssistantError, Result};

/// Minimum passage length in characters; shorter fragments are noise
pub const MIN_PASSAGE_CHARS: usize = 50;

/// Load all supported documents under `dir` into a passage store.
///
/// Files are visited in lexicographic name order so passage ordinals are
/// stable across runs. Unreadable documents are skipped with a warning
/// rather than aborting the whole load.
pub fn load_corpus(dir: &Path, min_chars: usize) -> Result<PassageStore> {
    if !dir.is_dir() {
        return Err(AssistantError::Corpus(format!(
            "document directory not found: {}",
            dir.display()
        )));
    }

    let mut files: Vec<PathBuf> = std::fs::read_dir(dir)?
        .filter_map(|entry| entry.ok().map(|e| e.path()))
        .filter(|path| is_supported(path))
        .collect();
    files.sort();

    let mut passages = Vec::new();
    for path in &files {
        match extract_text(path) {
            Ok(text) => {
                let chunks = chunk_text(&text, min_chars);
                println!(
                    "    > Loaded '{}' ({} passages)",
                    path.file_name().unwrap_or_default().to_string_lossy(),
                    chunks.len()
                );
                passages.extend(chunks);
            }
            Err(e) => {
                eprintln!(
                    "{}: skipping {}: {}",
                    "Warning".yellow(),
                    path.display(),
                    e
                );
            }
        }
    }

    Ok(PassageStore::new(passages))
}

fn is_supported(path: &Path) -> bool {
    matches!(
        path.extension().and_then(|s| s.to_str()),
        Some("pdf") | Some("txt") | Some("md")
    )
}

fn extract_text(path: &Path) -> Result<String> {
    match path.extension().and_then(|s| s.to_str()) {
        Some("pdf") => extract_pdf_text(path),
        _ => Ok(std::fs::read_to_string(path)?),
    }
}

/// Extract PDF text via the `pdftotext` system binary
fn extract_pdf_text(path: &Path) -> Result<String> {
    let output = Command::new("pdftotext")
        .arg("-layout")
        .arg("-enc")
        .arg("UTF-8")
        .arg(path)
        .arg("-")
        .output()
        .map_err(|e| {
            AssistantError::Corpus(format!(
                "pdftotext failed to start: {} (is poppler installed?)",
                e
            ))
        })?;

    if !output.status.success() {
        let stderr = String::from_utf8_lossy(&output.stderr);
        return Err(AssistantError::Corpus(format!(
            "pdftotext failed: {}",
            stderr.trim()
        )));
    }

    let text = String::from_utf8_lossy(&output.stdout).to_string();
    if text.trim().is_empty() {
        return Err(AssistantError::Corpus(
            "pdftotext produced no text output".to_string(),
        ));
    }

    Ok(text)
}

/// Split extracted text into passages on blank lines, dropping short noise
fn chunk_text(text: &str, min_chars: usize) -> Vec<String> {
    text.split("\n\n")
        .map(str::trim)
        .filter(|chunk| chunk.chars().count() >= min_chars)
        .map(str::to_string)
        .collect()
}
