use crate::normalizer::fuzzy::{FuzzyMatcher, FuzzyPolicy};
use std::ffi::OsString;
use std::fmt;

/// Long options people commonly mistype, and what they meant.
const KNOWN_MISSPELLINGS: &[(&str, &str)] = &[
    ("halp", "help"),
    ("helap", "help"),
    ("hepl", "help"),
    ("fuzy", "fuzzy"),
    ("fuzz", "fuzzy"),
    ("fuzi", "fuzzy"),
    ("fzzy", "fuzzy"),
    ("interactiv", "interactive"),
    ("intractiv", "interactive"),
    ("interact", "interactive"),
];

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OptionRepair {
    pub from: String,
    pub to: String,
}

impl fmt::Display for OptionRepair {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Fixed option: --{} → --{}", self.from, self.to)
    }
}

/// Rewrites misspelled `--long` options before argument parsing.
///
/// `known` holds the accepted long option names without dashes. Short
/// options, positionals, non-UTF-8 arguments and everything after `--`
/// are passed through untouched. The first argument is the program name.
pub fn repair_options<I>(args: I, known: &[&str]) -> (Vec<OsString>, Vec<OptionRepair>)
where
    I: IntoIterator<Item = OsString>,
{
    let matcher = FuzzyMatcher::new(FuzzyPolicy {
        min_word_len: 3,
        ..FuzzyPolicy::default()
    });

    let mut repaired = Vec::new();
    let mut repairs = Vec::new();
    let mut passthrough = false;

    for (idx, arg) in args.into_iter().enumerate() {
        if idx == 0 || passthrough {
            repaired.push(arg);
            continue;
        }

        let Some(text) = arg.to_str() else {
            repaired.push(arg);
            continue;
        };
        if text == "--" {
            passthrough = true;
            repaired.push(arg);
            continue;
        }
        let Some(option) = text.strip_prefix("--") else {
            repaired.push(arg);
            continue;
        };

        let (name, value) = match option.split_once('=') {
            Some((name, value)) => (name, Some(value)),
            None => (option, None),
        };

        match repair_name(name, known, &matcher) {
            Some(fixed) => {
                tracing::debug!(from = name, to = fixed, "repaired option");
                let rebuilt = match value {
                    Some(value) => format!("--{}={}", fixed, value),
                    None => format!("--{}", fixed),
                };
                repairs.push(OptionRepair {
                    from: name.to_string(),
                    to: fixed.to_string(),
                });
                repaired.push(OsString::from(rebuilt));
            }
            None => repaired.push(arg),
        }
    }

    (repaired, repairs)
}

fn repair_name<'k>(name: &str, known: &[&'k str], matcher: &FuzzyMatcher) -> Option<&'k str> {
    if known.iter().any(|k| *k == name) {
        return None;
    }

    if let Some((_, fixed)) = KNOWN_MISSPELLINGS.iter().find(|(typo, _)| *typo == name) {
        if let Some(target) = known.iter().find(|k| *k == fixed) {
            return Some(*target);
        }
    }

    matcher
        .best_match(name, known.iter().map(|k| (*k, *k)))
        .map(|ranked| ranked.value)
}
