pub mod interrupt;
pub mod options;
pub mod output;
pub mod repl;

use crate::{FileReport, Normalizer};
use anyhow::{Context, Result};
use std::fs;
use std::path::Path;

pub const SOURCE_EXTENSION: &str = "phy";

pub fn has_source_extension(path: &Path) -> bool {
    path.extension().and_then(|e| e.to_str()) == Some(SOURCE_EXTENSION)
}

/// Read `path` and normalize its contents.
pub fn load_and_normalize(normalizer: &Normalizer, path: &Path, fuzzy: bool) -> Result<FileReport> {
    let source = fs::read_to_string(path)
        .with_context(|| format!("Failed to read file: {}", path.display()))?;

    let normalized = normalizer
        .normalize(&source, fuzzy)
        .with_context(|| format!("Failed to normalize {}", path.display()))?;

    tracing::info!(
        path = %path.display(),
        corrections = normalized.corrections.len(),
        "normalized file"
    );

    Ok(FileReport {
        path: path.to_path_buf(),
        source,
        normalized,
    })
}
