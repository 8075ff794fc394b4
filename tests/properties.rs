use kwfix::{scan, Dictionary, FuzzyPolicy, Normalizer, SpanKind};
use proptest::prelude::*;
use proptest::test_runner::Config as ProptestConfig;

fn normalizer() -> Normalizer {
    Normalizer::new(Dictionary::builtin().unwrap(), FuzzyPolicy::default())
}

/// Source-like text built from keywords, misspellings, identifiers,
/// literals and comments.
fn source_like() -> impl Strategy<Value = String> {
    let token = prop_oneof![
        prop::sample::select(vec![
            "def", "deff", "defff", "iff", "retrun", "returnn", "prin", "printt", "print",
            "klass", "nil", "None", "TRUE", "whille", "exceptt", "x", "größe", "_tmp", "42",
            "0xdeff", "(", ")", ":", "=", "+", ".", ",", " ", "  ", "\n", "\n    ",
        ])
        .prop_map(String::from),
        "[a-z_]{1,8}",
        // non-empty, so two adjacent literals never open a triple quote
        "\"[a-z ]{1,10}\"",
        "'[a-z ]{1,10}'",
        "#[a-z ]{0,12}\n",
    ];
    proptest::collection::vec(token, 0..40).prop_map(|tokens| tokens.concat())
}

fn protected_spans(text: &str) -> Vec<String> {
    scan(text)
        .filter_map(Result::ok)
        .filter(|s| matches!(s.kind, SpanKind::StringLiteral | SpanKind::Comment))
        .map(|s| s.text.to_string())
        .collect()
}

proptest! {
    #![proptest_config(ProptestConfig {
        cases: 128, .. ProptestConfig::default()
    })]

    #[test]
    fn spans_cover_input(s in "[ -~\n\tßé]{0,80}") {
        let mut covered = String::new();
        for span in scan(&s) {
            match span {
                Ok(span) => {
                    prop_assert_eq!(span.start, covered.len());
                    covered.push_str(span.text);
                }
                Err(e) => {
                    prop_assert_eq!(e.offset(), covered.len());
                    return Ok(());
                }
            }
        }
        prop_assert_eq!(covered, s);
    }

    #[test]
    fn normalizing_twice_changes_nothing(s in source_like(), fuzzy in any::<bool>()) {
        let normalizer = normalizer();
        let once = normalizer.normalize(&s, fuzzy).unwrap();
        let twice = normalizer.normalize(&once.text, fuzzy).unwrap();
        prop_assert_eq!(&twice.text, &once.text);
        prop_assert!(twice.corrections.is_empty());
    }

    #[test]
    fn strings_and_comments_survive(s in source_like(), fuzzy in any::<bool>()) {
        let result = normalizer().normalize(&s, fuzzy).unwrap();
        prop_assert_eq!(protected_spans(&result.text), protected_spans(&s));
    }

    #[test]
    fn normalization_is_deterministic(s in source_like()) {
        let normalizer = normalizer();
        prop_assert_eq!(
            normalizer.normalize(&s, true).unwrap(),
            normalizer.normalize(&s, true).unwrap()
        );
    }

    #[test]
    fn fuzzy_corrections_respect_threshold(s in source_like()) {
        let normalizer = normalizer();
        let policy = *normalizer.policy();
        for correction in normalizer.normalize(&s, true).unwrap().corrections {
            if let kwfix::CorrectionKind::Fuzzy { distance } = correction.kind {
                let len = correction.original.chars().count();
                prop_assert!(len >= policy.min_word_len);
                prop_assert!(distance <= policy.max_distance(len));
                prop_assert!(normalizer.dictionary().lookup(&correction.original).is_none());
            }
        }
    }

    #[test]
    fn corrections_point_at_original_words(s in source_like(), fuzzy in any::<bool>()) {
        let result = normalizer().normalize(&s, fuzzy).unwrap();
        for correction in &result.corrections {
            let end = correction.offset + correction.original.len();
            prop_assert_eq!(&s[correction.offset..end], correction.original.as_str());
            let corrected_end = correction.corrected_offset + correction.canonical.len();
            prop_assert_eq!(
                &result.text[correction.corrected_offset..corrected_end],
                correction.canonical.as_str()
            );
            prop_assert_eq!(
                result.source_map.to_original(correction.corrected_offset),
                correction.offset
            );
        }
    }
}
