pub mod cli;
pub mod config;
pub mod dict;
pub mod exec;
pub mod normalizer;
pub mod scanner;

pub use config::Config;
pub use exec::{ExecError, Executor, RuntimeFailure};
pub use normalizer::dictionary::{Category, Dictionary, DictionaryBuilder, ReservedWord};
pub use normalizer::fuzzy::{FuzzyMatcher, FuzzyPolicy};
pub use normalizer::source_map::SourceMap;
pub use normalizer::{Correction, CorrectionKind, Normalized, Normalizer, Protection};
pub use scanner::{scan, ScanError, Span, SpanKind};

use std::path::PathBuf;

/// One input file after normalization.
#[derive(Debug, Clone)]
pub struct FileReport {
    pub path: PathBuf,
    pub source: String,
    pub normalized: Normalized,
}

impl FileReport {
    pub fn correction_count(&self) -> usize {
        self.normalized.corrections.len()
    }
}
