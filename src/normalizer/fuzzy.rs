use crate::normalizer::dictionary::{Dictionary, ReservedWord};
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;

/// How far a word may drift from a reference string and still be corrected.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct FuzzyPolicy {
    /// Words shorter than this (in characters) are never fuzzy-matched.
    pub min_word_len: usize,
    pub length_divisor: usize,
    pub min_distance: usize,
}

impl Default for FuzzyPolicy {
    fn default() -> Self {
        Self {
            min_word_len: 5,
            length_divisor: 3,
            min_distance: 1,
        }
    }
}

impl FuzzyPolicy {
    /// `max(min_distance, len / length_divisor)`
    pub fn max_distance(&self, len: usize) -> usize {
        let scaled = len.checked_div(self.length_divisor).unwrap_or(0);
        scaled.max(self.min_distance)
    }
}

/// Best candidate found for a word.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Ranked<'c, T> {
    pub reference: &'c str,
    pub value: T,
    pub distance: usize,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FuzzyMatch<'d> {
    pub word: &'d ReservedWord,
    pub reference: &'d str,
    pub distance: usize,
}

#[derive(Debug, Clone, Default)]
pub struct FuzzyMatcher {
    policy: FuzzyPolicy,
}

impl FuzzyMatcher {
    pub fn new(policy: FuzzyPolicy) -> Self {
        Self { policy }
    }

    pub fn policy(&self) -> &FuzzyPolicy {
        &self.policy
    }

    /// Closest canonical word for `word`, comparing against every canonical
    /// spelling and alias in the dictionary.
    pub fn find<'d>(&self, word: &str, dictionary: &'d Dictionary) -> Option<FuzzyMatch<'d>> {
        let candidates = dictionary
            .candidates()
            .iter()
            .map(|c| (c.text.as_str(), c.word));

        self.best_match(word, candidates).map(|ranked| FuzzyMatch {
            word: dictionary.word(ranked.value),
            reference: ranked.reference,
            distance: ranked.distance,
        })
    }

    /// Rank `candidates` against `word`.
    ///
    /// Lowest distance wins; ties go to the longer shared prefix, then the
    /// shorter reference, then the earlier candidate.
    pub fn best_match<'c, T, I>(&self, word: &str, candidates: I) -> Option<Ranked<'c, T>>
    where
        I: IntoIterator<Item = (&'c str, T)>,
    {
        let word: Vec<char> = word.chars().collect();
        if word.len() < self.policy.min_word_len {
            return None;
        }
        let limit = self.policy.max_distance(word.len());

        let mut best: Option<(Rank, Ranked<'c, T>)> = None;
        for (reference, value) in candidates {
            let reference_chars: Vec<char> = reference.chars().collect();
            if word.len().abs_diff(reference_chars.len()) > limit {
                continue;
            }

            let distance = edit_distance(&word, &reference_chars);
            if distance > limit {
                continue;
            }

            let rank = Rank {
                distance,
                prefix: common_prefix_len(&word, &reference_chars),
                len: reference_chars.len(),
            };
            let better = match &best {
                Some((current, _)) => rank.cmp(current) == Ordering::Less,
                None => true,
            };
            if better {
                best = Some((
                    rank,
                    Ranked {
                        reference,
                        value,
                        distance,
                    },
                ));
            }
        }

        best.map(|(_, ranked)| ranked)
    }
}

/// Ordering key; smaller is better. Equal keys keep the earlier candidate.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct Rank {
    distance: usize,
    prefix: usize,
    len: usize,
}

impl Ord for Rank {
    fn cmp(&self, other: &Self) -> Ordering {
        self.distance
            .cmp(&other.distance)
            .then_with(|| other.prefix.cmp(&self.prefix))
            .then_with(|| self.len.cmp(&other.len))
    }
}

impl PartialOrd for Rank {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

fn common_prefix_len(a: &[char], b: &[char]) -> usize {
    a.iter().zip(b).take_while(|(x, y)| x == y).count()
}

/// Levenshtein distance with unit costs, two rows at a time.
pub fn edit_distance(a: &[char], b: &[char]) -> usize {
    if a.is_empty() {
        return b.len();
    }
    if b.is_empty() {
        return a.len();
    }

    let mut prev: Vec<usize> = (0..=b.len()).collect();
    let mut row = vec![0; b.len() + 1];

    for (i, a_char) in a.iter().enumerate() {
        row[0] = i + 1;
        for (j, b_char) in b.iter().enumerate() {
            let cost = usize::from(a_char != b_char);
            row[j + 1] = (prev[j + 1] + 1) // deletion
                .min(row[j] + 1) // insertion
                .min(prev[j] + cost); // substitution
        }
        std::mem::swap(&mut prev, &mut row);
    }

    prev[b.len()]
}

/// [`edit_distance`] over string slices.
pub fn str_distance(a: &str, b: &str) -> usize {
    let a: Vec<char> = a.chars().collect();
    let b: Vec<char> = b.chars().collect();
    edit_distance(&a, &b)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn matcher() -> FuzzyMatcher {
        FuzzyMatcher::new(FuzzyPolicy::default())
    }

    fn resolve(word: &str) -> Option<(String, usize)> {
        let dict = Dictionary::builtin().unwrap();
        matcher()
            .find(word, &dict)
            .map(|m| (m.word.word.clone(), m.distance))
    }

    #[test]
    fn test_edit_distance() {
        assert_eq!(str_distance("hello", "hello"), 0);
        assert_eq!(str_distance("hello", "hallo"), 1);
        assert_eq!(str_distance("defff", "def"), 2);
        assert_eq!(str_distance("hepl", "help"), 2);
        assert_eq!(str_distance("", "abc"), 3);
        assert_eq!(str_distance("größe", "grösse"), 2);
    }

    #[test]
    fn test_max_distance() {
        let policy = FuzzyPolicy::default();
        assert_eq!(policy.max_distance(2), 1);
        assert_eq!(policy.max_distance(5), 1);
        assert_eq!(policy.max_distance(6), 2);
        assert_eq!(policy.max_distance(16), 5);

        let flat = FuzzyPolicy {
            length_divisor: 0,
            ..FuzzyPolicy::default()
        };
        assert_eq!(flat.max_distance(30), 1);
    }

    #[test]
    fn test_matches_through_aliases() {
        // `defff` is one edit from the alias `deff`, two from `def`
        assert_eq!(resolve("defff"), Some(("def".to_string(), 1)));
    }

    #[test]
    fn test_common_typos() {
        assert_eq!(resolve("printt"), Some(("print".to_string(), 1)));
        assert_eq!(resolve("prrint"), Some(("print".to_string(), 1)));
        assert_eq!(resolve("returnn"), Some(("return".to_string(), 1)));
        assert_eq!(resolve("exceptt"), Some(("except".to_string(), 1)));
    }

    #[test]
    fn test_rejects_distant_words() {
        assert_eq!(resolve("deffffff"), None);
        assert_eq!(resolve("deffffffffffffff"), None);
        assert_eq!(resolve("xyz_unknown_word"), None);
        assert_eq!(resolve("xyz123unknown"), None);
        assert_eq!(resolve("greet"), None);
    }

    #[test]
    fn test_short_words_never_match() {
        assert_eq!(resolve("a"), None);
        assert_eq!(resolve("de"), None);
        assert_eq!(resolve("int"), None);
        assert_eq!(resolve("file"), None);
    }

    #[test]
    fn test_tie_break_prefers_longer_prefix() {
        let candidates = [("abxdef", 1), ("abcdxf", 2)];
        let best = matcher().best_match("abcdef", candidates).unwrap();
        assert_eq!(best.value, 2);
        assert_eq!(best.distance, 1);
    }

    #[test]
    fn test_tie_break_prefers_shorter_reference() {
        let candidates = [("abcxef", 1), ("abcef", 2)];
        let best = matcher().best_match("abcdef", candidates).unwrap();
        // both one edit away, sharing `abc`
        assert_eq!(best.value, 2);
    }

    #[test]
    fn test_tie_break_falls_back_to_order() {
        let candidates = [("abcdx", 1), ("abcdy", 2)];
        let best = matcher().best_match("abcdz", candidates).unwrap();
        assert_eq!(best.value, 1);
    }

    #[test]
    fn test_custom_policy() {
        let loose = FuzzyMatcher::new(FuzzyPolicy {
            min_word_len: 3,
            length_divisor: 2,
            min_distance: 1,
        });
        let best = loose.best_match("hlep", [("help", ()), ("version", ())]).unwrap();
        assert_eq!(best.reference, "help");
        assert_eq!(best.distance, 2);
    }
}
