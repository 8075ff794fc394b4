use crate::dict::builtin::BUILTIN_KEYWORDS;
use fst::Map;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use thiserror::Error;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Category {
    Statement,
    Operator,
    Literal,
    Builtin,
    Custom,
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Category::Statement => write!(f, "statement keyword"),
            Category::Operator => write!(f, "operator word"),
            Category::Literal => write!(f, "literal constant"),
            Category::Builtin => write!(f, "built-in callable"),
            Category::Custom => write!(f, "custom word"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReservedWord {
    pub word: String,
    pub category: Category,
}

/// A string the fuzzy matcher may compare against: a canonical word or one
/// of its aliases, with the index of the word it resolves to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Candidate {
    pub text: String,
    pub word: usize,
}

#[derive(Debug, Error)]
pub enum DictionaryError {
    #[error("`{0}` is not a known keyword")]
    UnknownKeyword(String),

    #[error("alias `{alias}` maps to both `{first}` and `{second}`")]
    ConflictingAlias {
        alias: String,
        first: String,
        second: String,
    },

    #[error("failed to build alias index")]
    Index(#[from] fst::Error),
}

/// Immutable alias table. Built once, then shared read-only.
pub struct Dictionary {
    words: Vec<ReservedWord>,
    candidates: Vec<Candidate>,
    index: Map<Vec<u8>>,
}

impl Dictionary {
    /// The built-in keyword table with no extensions.
    pub fn builtin() -> Result<Self, DictionaryError> {
        DictionaryBuilder::builtin().build()
    }

    /// Exact, case-sensitive alias lookup.
    pub fn lookup(&self, word: &str) -> Option<&ReservedWord> {
        self.index
            .get(word.as_bytes())
            .map(|idx| &self.words[idx as usize])
    }

    pub fn reserved_words(&self) -> &[ReservedWord] {
        &self.words
    }

    /// Canonical words and aliases in declaration order.
    pub fn candidates(&self) -> &[Candidate] {
        &self.candidates
    }

    pub fn word(&self, idx: usize) -> &ReservedWord {
        &self.words[idx]
    }

    /// Misspellings registered for `canonical`, excluding the word itself.
    pub fn aliases_of(&self, canonical: &str) -> Vec<&str> {
        let Some(idx) = self.words.iter().position(|w| w.word == canonical) else {
            return Vec::new();
        };

        self.candidates
            .iter()
            .filter(|c| c.word == idx && c.text != canonical)
            .map(|c| c.text.as_str())
            .collect()
    }

    pub fn alias_count(&self) -> usize {
        self.index.len()
    }
}

impl fmt::Debug for Dictionary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Dictionary")
            .field("words", &self.words.len())
            .field("aliases", &self.index.len())
            .finish()
    }
}

#[derive(Debug, Clone)]
struct Entry {
    word: ReservedWord,
    aliases: Vec<String>,
}

/// Collects keywords and aliases before freezing them into a [`Dictionary`].
#[derive(Debug, Clone, Default)]
pub struct DictionaryBuilder {
    entries: Vec<Entry>,
}

impl DictionaryBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn builtin() -> Self {
        let mut builder = Self::new();
        for (canonical, category, aliases) in BUILTIN_KEYWORDS {
            builder.add_keyword(canonical, *category, aliases.iter().copied());
        }
        builder
    }

    pub fn contains(&self, canonical: &str) -> bool {
        self.entries.iter().any(|e| e.word.word == canonical)
    }

    /// Register a canonical word. Aliases of an already registered word are
    /// appended to it.
    pub fn add_keyword<I, S>(
        &mut self,
        canonical: &str,
        category: Category,
        aliases: I,
    ) -> &mut Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let idx = match self.entries.iter().position(|e| e.word.word == canonical) {
            Some(idx) => idx,
            None => {
                self.entries.push(Entry {
                    word: ReservedWord {
                        word: canonical.to_string(),
                        category,
                    },
                    aliases: Vec::new(),
                });
                self.entries.len() - 1
            }
        };

        let entry = &mut self.entries[idx];
        for alias in aliases {
            let alias = alias.into();
            if alias != canonical && !entry.aliases.contains(&alias) {
                entry.aliases.push(alias);
            }
        }
        self
    }

    /// Add one misspelling for an existing canonical word.
    pub fn add_alias(
        &mut self,
        canonical: &str,
        alias: &str,
    ) -> Result<&mut Self, DictionaryError> {
        let entry = self
            .entries
            .iter_mut()
            .find(|e| e.word.word == canonical)
            .ok_or_else(|| DictionaryError::UnknownKeyword(canonical.to_string()))?;

        if alias != canonical && !entry.aliases.iter().any(|a| a == alias) {
            entry.aliases.push(alias.to_string());
        }
        Ok(self)
    }

    pub fn build(self) -> Result<Dictionary, DictionaryError> {
        let mut keys: BTreeMap<String, usize> = BTreeMap::new();
        let mut candidates = Vec::new();
        let mut words = Vec::with_capacity(self.entries.len());

        for (idx, entry) in self.entries.into_iter().enumerate() {
            let spellings = std::iter::once(entry.word.word.clone()).chain(entry.aliases);
            for text in spellings {
                if let Some(&other) = keys.get(&text) {
                    // A canonical word may not double as another word's alias
                    let first: &ReservedWord = &words[other];
                    return Err(DictionaryError::ConflictingAlias {
                        first: first.word.clone(),
                        second: entry.word.word.clone(),
                        alias: text,
                    });
                }
                keys.insert(text.clone(), idx);
                candidates.push(Candidate { text, word: idx });
            }
            words.push(entry.word);
        }

        // BTreeMap iterates in byte order, which is what the fst builder needs
        let index = Map::from_iter(keys.iter().map(|(k, &v)| (k.as_bytes(), v as u64)))?;

        tracing::debug!(
            words = words.len(),
            aliases = index.len(),
            "built keyword dictionary"
        );

        Ok(Dictionary {
            words,
            candidates,
            index,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builtin_lookup() {
        let dict = Dictionary::builtin().unwrap();
        assert_eq!(dict.lookup("deff").unwrap().word, "def");
        assert_eq!(dict.lookup("nil").unwrap().word, "None");
        assert_eq!(dict.lookup("print").unwrap().word, "print");
        assert_eq!(dict.lookup("catch").unwrap().category, Category::Statement);
        assert!(dict.lookup("greet").is_none());
    }

    #[test]
    fn test_lookup_is_case_sensitive() {
        let dict = Dictionary::builtin().unwrap();
        assert!(dict.lookup("DEFF").is_none());
        assert_eq!(dict.lookup("TRUE").unwrap().word, "True");
        assert!(dict.lookup("True ").is_none());
    }

    #[test]
    fn test_candidates_follow_declaration_order() {
        let dict = Dictionary::builtin().unwrap();
        let texts: Vec<_> = dict
            .candidates()
            .iter()
            .take(5)
            .map(|c| c.text.as_str())
            .collect();
        assert_eq!(texts, vec!["def", "deff", "define", "defin", "if"]);
    }

    #[test]
    fn test_aliases_of() {
        let dict = Dictionary::builtin().unwrap();
        assert_eq!(dict.aliases_of("def"), vec!["deff", "define", "defin"]);
        assert!(dict.aliases_of("nonexistent").is_empty());
    }

    #[test]
    fn test_add_alias() {
        let mut builder = DictionaryBuilder::builtin();
        builder.add_alias("def", "dfe").unwrap();
        builder.add_alias("def", "deff").unwrap();
        let dict = builder.build().unwrap();
        assert_eq!(dict.lookup("dfe").unwrap().word, "def");
        assert_eq!(dict.aliases_of("def").iter().filter(|a| **a == "deff").count(), 1);
    }

    #[test]
    fn test_add_alias_unknown_keyword() {
        let mut builder = DictionaryBuilder::builtin();
        let err = builder.add_alias("nonexistent", "spelling").unwrap_err();
        assert!(matches!(err, DictionaryError::UnknownKeyword(_)));
    }

    #[test]
    fn test_add_keyword() {
        let mut builder = DictionaryBuilder::builtin();
        builder.add_keyword("len", Category::Custom, ["lenght", "lne"]);
        let dict = builder.build().unwrap();
        let len = dict.lookup("lenght").unwrap();
        assert_eq!(len.word, "len");
        assert_eq!(len.category, Category::Custom);
        assert_eq!(dict.lookup("len").unwrap().word, "len");
    }

    #[test]
    fn test_conflicting_alias() {
        let mut builder = DictionaryBuilder::builtin();
        builder.add_keyword("delete", Category::Custom, ["deff"]);
        match builder.build() {
            Err(DictionaryError::ConflictingAlias { alias, first, second }) => {
                assert_eq!(alias, "deff");
                assert_eq!(first, "def");
                assert_eq!(second, "delete");
            }
            other => panic!("expected conflict, got {:?}", other),
        }
    }

    #[test]
    fn test_alias_count() {
        let dict = Dictionary::builtin().unwrap();
        let expected: usize = BUILTIN_KEYWORDS.iter().map(|(_, _, a)| a.len() + 1).sum();
        assert_eq!(dict.alias_count(), expected);
    }
}
