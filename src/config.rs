use crate::normalizer::fuzzy::FuzzyPolicy;
use anyhow::{Context, Result};
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

pub const LOCAL_CONFIG_FILE: &str = ".kwfix.toml";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Unset means "inherit"; a file that says `fuzzy = false` overrides a
    /// lower layer that enabled it.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub fuzzy: Option<bool>,

    pub fuzzy_policy: FuzzyPolicy,

    /// Extra misspellings keyed by canonical word. Unknown canonical words
    /// become custom keywords.
    pub aliases: BTreeMap<String, Vec<String>>,

    pub protected: Vec<String>,
    pub protected_words_file: Option<PathBuf>,
    pub ignore_patterns: Vec<String>,

    pub python: String,
}

fn default_python() -> String {
    "python3".to_string()
}

fn default_ignore_patterns() -> Vec<String> {
    vec![
        r"^[A-Z][A-Z0-9_]+$".to_string(), // ALL_CAPS constants
        r"^__\w+__$".to_string(),         // dunder names
        r"^\w+_$".to_string(),            // class_, import_
    ]
}

impl Default for Config {
    fn default() -> Self {
        Self {
            fuzzy: None,
            fuzzy_policy: FuzzyPolicy::default(),
            aliases: BTreeMap::new(),
            protected: Vec::new(),
            protected_words_file: None,
            ignore_patterns: default_ignore_patterns(),
            python: default_python(),
        }
    }
}

impl Config {
    /// Load configuration with priority: CLI args > local config > global config > defaults
    pub fn load(fuzzy: bool, python: Option<String>) -> Result<Self> {
        let mut config = Self::load_files(
            Self::global_config_path().as_deref(),
            Path::new(LOCAL_CONFIG_FILE),
        )?;

        // Apply CLI overrides
        if fuzzy {
            config.fuzzy = Some(true);
        }
        if let Some(python) = python {
            config.python = python;
        }

        if config.protected_words_file.is_none() {
            config.protected_words_file = Self::default_protected_words_path();
        }

        Ok(config)
    }

    /// Defaults, then `global`, then `local`; missing files are skipped.
    pub fn load_files(global: Option<&Path>, local: &Path) -> Result<Self> {
        let mut config = Self::default();

        if let Some(global_path) = global {
            if global_path.exists() {
                tracing::debug!(path = %global_path.display(), "loading global config");
                config = config.merge(Self::from_file(global_path)?);
            }
        }

        if local.exists() {
            tracing::debug!(path = %local.display(), "loading local config");
            config = config.merge(Self::from_file(local)?);
        }

        Ok(config)
    }

    pub fn from_file(path: &Path) -> Result<Self> {
        let contents = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;
        toml::from_str(&contents)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))
    }

    pub fn fuzzy(&self) -> bool {
        self.fuzzy.unwrap_or(false)
    }

    fn merge(mut self, other: Self) -> Self {
        // Merge logic: other's values override self's if they differ from defaults
        if other.fuzzy.is_some() {
            self.fuzzy = other.fuzzy;
        }
        if other.fuzzy_policy != FuzzyPolicy::default() {
            self.fuzzy_policy = other.fuzzy_policy;
        }
        for (canonical, aliases) in other.aliases {
            let merged = self.aliases.entry(canonical).or_default();
            for alias in aliases {
                if !merged.contains(&alias) {
                    merged.push(alias);
                }
            }
        }
        self.protected.extend(other.protected);
        if other.protected_words_file.is_some() {
            self.protected_words_file = other.protected_words_file;
        }
        if other.ignore_patterns != default_ignore_patterns() {
            self.ignore_patterns = other.ignore_patterns;
        }
        if other.python != default_python() {
            self.python = other.python;
        }
        self
    }

    pub fn global_config_path() -> Option<PathBuf> {
        ProjectDirs::from("", "", "kwfix").map(|dirs| dirs.config_dir().join("config.toml"))
    }

    pub fn default_protected_words_path() -> Option<PathBuf> {
        ProjectDirs::from("", "", "kwfix").map(|dirs| dirs.config_dir().join("protected.txt"))
    }
}
