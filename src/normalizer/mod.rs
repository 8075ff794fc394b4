pub mod dictionary;
pub mod fuzzy;
pub mod source_map;

use crate::scanner::{self, ScanError, SpanKind};
use crate::Config;
use anyhow::{Context, Result};
use dictionary::{Category, Dictionary, DictionaryBuilder, ReservedWord};
use fuzzy::{FuzzyMatcher, FuzzyPolicy};
use regex::Regex;
use serde::Serialize;
use source_map::SourceMap;
use std::collections::HashSet;
use std::fmt;
use std::fs;

/// How one word span was resolved.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Resolution<'d> {
    Unchanged,
    Exact(&'d ReservedWord),
    Fuzzy {
        word: &'d ReservedWord,
        distance: usize,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum CorrectionKind {
    Exact,
    Fuzzy { distance: usize },
}

/// One rewritten word.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Correction {
    pub original: String,
    pub canonical: String,
    pub category: Category,
    pub offset: usize,
    pub corrected_offset: usize,
    pub line: usize,
    pub column: usize,
    #[serde(flatten)]
    pub kind: CorrectionKind,
}

impl fmt::Display for Correction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "corrected `{}` → `{}`", self.original, self.canonical)?;
        if let CorrectionKind::Fuzzy { distance } = self.kind {
            write!(f, " (approximate match, distance {})", distance)?;
        }
        Ok(())
    }
}

/// Result of one normalization pass.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Normalized {
    pub text: String,
    pub corrections: Vec<Correction>,
    pub source_map: SourceMap,
}

impl Normalized {
    pub fn is_unchanged(&self) -> bool {
        self.corrections.is_empty()
    }
}

/// Identifiers that must never be fuzzy-corrected.
#[derive(Debug, Clone, Default)]
pub struct Protection {
    words: HashSet<String>,
    patterns: Vec<Regex>,
}

impl Protection {
    pub fn new<I, S>(words: I, patterns: Vec<Regex>) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            words: words.into_iter().map(Into::into).collect(),
            patterns,
        }
    }

    pub fn is_protected(&self, word: &str) -> bool {
        self.words.contains(word) || self.patterns.iter().any(|p| p.is_match(word))
    }
}

/// Rewrites misspelled keywords into canonical ones.
///
/// Holds only read-only tables; every call to [`Normalizer::normalize`] is
/// independent, so one instance can serve a REPL and many files at once.
#[derive(Debug)]
pub struct Normalizer {
    dictionary: Dictionary,
    matcher: FuzzyMatcher,
    protection: Protection,
}

impl Normalizer {
    pub fn new(dictionary: Dictionary, policy: FuzzyPolicy) -> Self {
        Self {
            dictionary,
            matcher: FuzzyMatcher::new(policy),
            protection: Protection::default(),
        }
    }

    pub fn with_protection(mut self, protection: Protection) -> Self {
        self.protection = protection;
        self
    }

    /// Build the dictionary and protection rules described by `config`.
    pub fn from_config(config: &Config) -> Result<Self> {
        let mut builder = DictionaryBuilder::builtin();
        for (canonical, aliases) in &config.aliases {
            if builder.contains(canonical) {
                for alias in aliases {
                    builder.add_alias(canonical, alias)?;
                }
            } else {
                tracing::debug!(word = %canonical, "registering custom keyword");
                builder.add_keyword(canonical, Category::Custom, aliases.iter().cloned());
            }
        }
        let dictionary = builder.build().context("Invalid keyword aliases in configuration")?;

        let mut words: Vec<String> = config.protected.clone();
        if let Some(path) = &config.protected_words_file {
            if path.exists() {
                let content = fs::read_to_string(path).with_context(|| {
                    format!("Failed to read protected words: {}", path.display())
                })?;
                words.extend(
                    content
                        .lines()
                        .map(str::trim)
                        .filter(|w| !w.is_empty() && !w.starts_with('#'))
                        .map(String::from),
                );
            }
        }

        let mut patterns = Vec::new();
        for pattern in &config.ignore_patterns {
            match Regex::new(pattern) {
                Ok(re) => patterns.push(re),
                Err(e) => tracing::warn!("Invalid regex pattern '{}': {}", pattern, e),
            }
        }

        let protection = Protection::new(words, patterns);
        Ok(Self::new(dictionary, config.fuzzy_policy).with_protection(protection))
    }

    pub fn dictionary(&self) -> &Dictionary {
        &self.dictionary
    }

    pub fn policy(&self) -> &FuzzyPolicy {
        self.matcher.policy()
    }

    /// Exact alias first; the fuzzy matcher only on a miss, and only when
    /// enabled.
    pub fn resolve(&self, word: &str, fuzzy: bool) -> Resolution<'_> {
        if let Some(reserved) = self.dictionary.lookup(word) {
            return Resolution::Exact(reserved);
        }

        if !fuzzy || self.protection.is_protected(word) {
            return Resolution::Unchanged;
        }

        match self.matcher.find(word, &self.dictionary) {
            Some(found) => Resolution::Fuzzy {
                word: found.word,
                distance: found.distance,
            },
            None => Resolution::Unchanged,
        }
    }

    /// Rewrite `text`, leaving strings, comments and punctuation untouched.
    ///
    /// A scan error aborts the whole pass; nothing partial is returned.
    pub fn normalize(&self, text: &str, fuzzy: bool) -> Result<Normalized, ScanError> {
        let mut output = String::with_capacity(text.len());
        let mut corrections = Vec::new();
        let mut source_map = SourceMap::new(text);

        for span in scanner::scan(text) {
            let span = span?;
            if span.kind != SpanKind::Word {
                output.push_str(span.text);
                continue;
            }

            let (reserved, kind) = match self.resolve(span.text, fuzzy) {
                Resolution::Exact(reserved) if reserved.word != span.text => {
                    (reserved, CorrectionKind::Exact)
                }
                Resolution::Fuzzy { word, distance } => (word, CorrectionKind::Fuzzy { distance }),
                _ => {
                    output.push_str(span.text);
                    continue;
                }
            };

            tracing::debug!(
                original = span.text,
                canonical = %reserved.word,
                line = span.line,
                column = span.column,
                ?kind,
                "correcting word"
            );

            let corrected_offset = output.len();
            source_map.record(
                (span.start, span.text.len()),
                (corrected_offset, reserved.word.len()),
            );
            output.push_str(&reserved.word);
            corrections.push(Correction {
                original: span.text.to_string(),
                canonical: reserved.word.clone(),
                category: reserved.category,
                offset: span.start,
                corrected_offset,
                line: span.line,
                column: span.column,
                kind,
            });
        }

        source_map.finish(&output);
        Ok(Normalized {
            text: output,
            corrections,
            source_map,
        })
    }
}
