use crate::normalizer::dictionary::{Category, Dictionary, ReservedWord};
use crate::normalizer::fuzzy::{FuzzyMatcher, FuzzyPolicy};
use anyhow::{bail, Result};
use colored::*;
use std::io::Write;

const CATEGORIES: &[Category] = &[
    Category::Statement,
    Category::Operator,
    Category::Literal,
    Category::Builtin,
    Category::Custom,
];

/// Print every keyword with its accepted misspellings, grouped by category.
pub fn list_keywords<W: Write>(out: &mut W, dictionary: &Dictionary, colored: bool) -> Result<()> {
    if colored {
        writeln!(out, "{}", "Known keywords:".bold())?;
    } else {
        writeln!(out, "Known keywords:")?;
    }

    for category in CATEGORIES {
        let words: Vec<&ReservedWord> = dictionary
            .reserved_words()
            .iter()
            .filter(|w| w.category == *category)
            .collect();
        if words.is_empty() {
            continue;
        }

        writeln!(out)?;
        let heading = format!("{}s", category);
        if colored {
            writeln!(out, "{}", heading.cyan().bold())?;
        } else {
            writeln!(out, "{}", heading)?;
        }

        for word in words {
            let aliases = dictionary.aliases_of(&word.word).join(", ");
            if colored {
                writeln!(out, "  {:<8} {}", word.word.green(), aliases.dimmed())?;
            } else {
                writeln!(out, "  {:<8} {}", word.word, aliases)?;
            }
        }
    }

    writeln!(out)?;
    writeln!(
        out,
        "{} keywords, {} accepted spellings",
        dictionary.reserved_words().len(),
        dictionary.alias_count()
    )?;
    Ok(())
}

/// Print one keyword. `query` may be the keyword itself or any alias of it.
pub fn show_keyword<W: Write>(
    out: &mut W,
    dictionary: &Dictionary,
    query: &str,
    colored: bool,
) -> Result<()> {
    let Some(word) = dictionary.lookup(query) else {
        let guess = FuzzyMatcher::new(FuzzyPolicy {
            min_word_len: 1,
            ..FuzzyPolicy::default()
        })
        .find(query, dictionary);
        match guess {
            Some(found) => {
                bail!("Unknown keyword `{}`; did you mean `{}`?", query, found.word.word)
            }
            None => bail!("Unknown keyword `{}`", query),
        }
    };

    if word.word != query {
        writeln!(out, "`{}` is accepted as `{}`", query, word.word)?;
    }

    if colored {
        writeln!(out, "{}", format!("Keyword: {}", word.word).bold())?;
    } else {
        writeln!(out, "Keyword: {}", word.word)?;
    }
    writeln!(out, "  Category: {}", word.category)?;

    let aliases = dictionary.aliases_of(&word.word);
    if aliases.is_empty() {
        writeln!(out, "  Aliases: (none)")?;
    } else {
        writeln!(out, "  Aliases: {}", aliases.join(", "))?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::normalizer::dictionary::DictionaryBuilder;

    fn render<F>(f: F) -> String
    where
        F: FnOnce(&mut Vec<u8>) -> Result<()>,
    {
        let mut out = Vec::new();
        f(&mut out).unwrap();
        String::from_utf8(out).unwrap()
    }

    #[test]
    fn test_list_keywords() {
        let dict = Dictionary::builtin().unwrap();
        let text = render(|out| list_keywords(out, &dict, false));
        assert!(text.contains("statement keywords"));
        assert!(text.contains("  def      deff, define, defin"));
        assert!(text.contains("built-in callables"));
        // no custom words registered
        assert!(!text.contains("custom words"));
        assert!(text.contains("24 keywords"));
    }

    #[test]
    fn test_list_includes_custom_words() {
        let mut builder = DictionaryBuilder::builtin();
        builder.add_keyword("len", Category::Custom, ["lenght"]);
        let dict = builder.build().unwrap();
        let text = render(|out| list_keywords(out, &dict, false));
        assert!(text.contains("custom words"));
        assert!(text.contains("lenght"));
    }

    #[test]
    fn test_show_keyword() {
        let dict = Dictionary::builtin().unwrap();
        let text = render(|out| show_keyword(out, &dict, "None", false));
        assert!(text.starts_with("Keyword: None"));
        assert!(text.contains("Category: literal constant"));
        assert!(text.contains("Aliases: none, NONE, null, nil"));
    }

    #[test]
    fn test_show_keyword_by_alias() {
        let dict = Dictionary::builtin().unwrap();
        let text = render(|out| show_keyword(out, &dict, "klass", false));
        assert!(text.starts_with("`klass` is accepted as `class`"));
    }

    #[test]
    fn test_show_unknown_keyword() {
        let dict = Dictionary::builtin().unwrap();
        let err = show_keyword(&mut Vec::new(), &dict, "whille", false).unwrap_err();
        assert_eq!(err.to_string(), "Unknown keyword `whille`; did you mean `while`?");

        let err = show_keyword(&mut Vec::new(), &dict, "zzzzzz", false).unwrap_err();
        assert_eq!(err.to_string(), "Unknown keyword `zzzzzz`");
    }
}
