//! String literal boundaries.
//!
//! Works on bytes: every delimiter that matters (quotes, backslash, newline)
//! is ASCII, and UTF-8 continuation bytes never collide with them.

const PREFIXES: [&str; 8] = ["r", "b", "u", "f", "rb", "br", "fr", "rf"];

/// Whether `word` may prefix a string literal (`r"..."`, `Rb'...'`, ...).
pub fn is_string_prefix(word: &str) -> bool {
    word.len() <= 2 && PREFIXES.iter().any(|p| p.eq_ignore_ascii_case(word))
}

pub fn is_quote(ch: char) -> bool {
    ch == '\'' || ch == '"'
}

/// Length in bytes of the literal opening at the start of `text`,
/// closing quote(s) included. `None` when the literal never closes.
///
/// `text` must start with a quote character.
pub fn literal_len(text: &str) -> Option<usize> {
    let bytes = text.as_bytes();
    let quote = *bytes.first()?;
    let triple = bytes.len() >= 3 && bytes[1] == quote && bytes[2] == quote;

    let mut i = if triple { 3 } else { 1 };
    while i < bytes.len() {
        match bytes[i] {
            b'\\' => {
                // a CRLF line continuation is one escaped newline
                i += if bytes[i + 1..].starts_with(b"\r\n") { 3 } else { 2 };
                continue;
            }
            b'\n' if !triple => return None,
            b if b == quote => {
                if !triple {
                    return Some(i + 1);
                }
                if bytes[i + 1..].starts_with(&[quote, quote]) {
                    return Some(i + 3);
                }
            }
            _ => {}
        }
        i += 1;
    }

    None
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_simple_literals() {
        assert_eq!(literal_len(r#""hi" + x"#), Some(4));
        assert_eq!(literal_len("'it''s'"), Some(4));
        assert_eq!(literal_len(r#""""#), Some(2));
    }

    #[test]
    fn test_escaped_quote() {
        assert_eq!(literal_len(r#""say \"deff\"" rest"#), Some(14));
        assert_eq!(literal_len(r"'a\\' b"), Some(5));
    }

    #[test]
    fn test_triple_quoted() {
        let text = "\"\"\"line one\n\"quoted\" line two\"\"\" tail";
        assert_eq!(literal_len(text), Some(text.len() - " tail".len()));
        assert_eq!(literal_len("''''''"), Some(6));
    }

    #[test]
    fn test_unterminated() {
        assert_eq!(literal_len("'never closed"), None);
        assert_eq!(literal_len("\"stops at\nnewline\""), None);
        assert_eq!(literal_len("\"\"\"open triple \"\""), None);
        assert_eq!(literal_len("'dangling escape\\"), None);
    }

    #[test]
    fn test_escaped_newline_continues() {
        assert_eq!(literal_len("'one \\\ntwo'"), Some(11));
        assert_eq!(literal_len("'one \\\r\ntwo' + x"), Some(12));
        assert_eq!(literal_len("'a\\\r\n"), None);
    }

    #[test]
    fn test_prefixes() {
        assert!(is_string_prefix("f"));
        assert!(is_string_prefix("Rb"));
        assert!(!is_string_prefix("fb"));
        assert!(!is_string_prefix("print"));
    }
}
