pub mod literal;

use thiserror::Error;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SpanKind {
    Word,
    StringLiteral,
    Comment,
    Other,
}

/// A classified slice of the scanned source.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Span<'a> {
    pub kind: SpanKind,
    pub text: &'a str,
    pub start: usize, // Byte offset where the span starts
    pub end: usize,   // Byte offset where the span ends
    pub line: usize,
    pub column: usize,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ScanError {
    #[error("unterminated string literal starting at line {line}, column {column}")]
    UnterminatedString {
        offset: usize,
        line: usize,
        column: usize,
    },
}

impl ScanError {
    pub fn offset(&self) -> usize {
        match self {
            ScanError::UnterminatedString { offset, .. } => *offset,
        }
    }
}

/// Lazily splits source text into spans that cover it exactly once.
///
/// A clone resumes from the same position; [`scan`] starts a fresh pass.
/// After yielding an error the scanner is exhausted.
#[derive(Debug, Clone)]
pub struct Scanner<'a> {
    source: &'a str,
    pos: usize,
    line: usize,
    column: usize,
    failed: bool,
}

pub fn scan(source: &str) -> Scanner<'_> {
    Scanner::new(source)
}

fn is_ident_start(ch: char) -> bool {
    ch == '_' || ch.is_alphabetic()
}

fn is_ident_char(ch: char) -> bool {
    ch == '_' || ch.is_alphanumeric()
}

fn ident_len(text: &str) -> usize {
    text.char_indices()
        .find(|&(_, ch)| !is_ident_char(ch))
        .map_or(text.len(), |(i, _)| i)
}

impl<'a> Scanner<'a> {
    pub fn new(source: &'a str) -> Self {
        Self {
            source,
            pos: 0,
            line: 1,
            column: 1,
            failed: false,
        }
    }

    /// Classify the span starting at the current position.
    fn classify(&self, rest: &str) -> Option<(SpanKind, usize)> {
        let first = rest.chars().next()?;

        if first == '#' {
            return Some((SpanKind::Comment, rest.find('\n').unwrap_or(rest.len())));
        }

        if literal::is_quote(first) {
            return literal::literal_len(rest).map(|len| (SpanKind::StringLiteral, len));
        }

        if is_ident_start(first) {
            let len = ident_len(rest);
            let after = rest[len..].chars().next();
            if after.is_some_and(literal::is_quote) && literal::is_string_prefix(&rest[..len]) {
                return literal::literal_len(&rest[len..])
                    .map(|lit| (SpanKind::StringLiteral, len + lit));
            }
            return Some((SpanKind::Word, len));
        }

        Some((SpanKind::Other, other_len(rest)))
    }

    fn advance(&mut self, text: &str) {
        for ch in text.chars() {
            if ch == '\n' {
                self.line += 1;
                self.column = 1;
            } else {
                self.column += 1;
            }
        }
        self.pos += text.len();
    }
}

/// Punctuation, whitespace and numeric literals up to the next word, quote
/// or comment marker.
fn other_len(text: &str) -> usize {
    let mut len = 0;
    while let Some(ch) = text[len..].chars().next() {
        if ch == '#' || literal::is_quote(ch) || is_ident_start(ch) {
            break;
        }
        if is_ident_char(ch) {
            // `1e10`, `0xff`, `3j`: letters inside a number are not words
            len += ident_len(&text[len..]);
        } else {
            len += ch.len_utf8();
        }
    }
    len
}

impl<'a> Iterator for Scanner<'a> {
    type Item = Result<Span<'a>, ScanError>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.failed || self.pos >= self.source.len() {
            return None;
        }

        let rest = &self.source[self.pos..];
        let Some((kind, len)) = self.classify(rest) else {
            self.failed = true;
            return Some(Err(ScanError::UnterminatedString {
                offset: self.pos,
                line: self.line,
                column: self.column,
            }));
        };

        let text = &rest[..len];
        let span = Span {
            kind,
            text,
            start: self.pos,
            end: self.pos + len,
            line: self.line,
            column: self.column,
        };
        self.advance(text);

        Some(Ok(span))
    }
}

impl std::iter::FusedIterator for Scanner<'_> {}

#[cfg(test)]
mod tests {
    use super::*;

    fn kinds(source: &str) -> Vec<(SpanKind, &str)> {
        scan(source)
            .map(|span| span.map(|s| (s.kind, s.text)))
            .collect::<Result<_, _>>()
            .unwrap()
    }

    #[test]
    fn test_words_and_punctuation() {
        assert_eq!(
            kinds("deff greet():"),
            vec![
                (SpanKind::Word, "deff"),
                (SpanKind::Other, " "),
                (SpanKind::Word, "greet"),
                (SpanKind::Other, "():"),
            ]
        );
    }

    #[test]
    fn test_string_and_comment_spans() {
        let spans = kinds("prin(\"iff\") # retrun here\nx");
        assert_eq!(
            spans,
            vec![
                (SpanKind::Word, "prin"),
                (SpanKind::Other, "("),
                (SpanKind::StringLiteral, "\"iff\""),
                (SpanKind::Other, ") "),
                (SpanKind::Comment, "# retrun here"),
                (SpanKind::Other, "\n"),
                (SpanKind::Word, "x"),
            ]
        );
    }

    #[test]
    fn test_string_prefix_belongs_to_literal() {
        let spans = kinds("f'{deff}' + rb\"x\" + fr");
        assert_eq!(spans[0], (SpanKind::StringLiteral, "f'{deff}'"));
        assert_eq!(spans[2], (SpanKind::StringLiteral, "rb\"x\""));
        assert_eq!(spans[4], (SpanKind::Word, "fr"));
    }

    #[test]
    fn test_numbers_are_not_words() {
        assert_eq!(
            kinds("x = 0xdeff + 1e5"),
            vec![
                (SpanKind::Word, "x"),
                (SpanKind::Other, " = 0xdeff + 1e5"),
            ]
        );
    }

    #[test]
    fn test_unicode_identifiers() {
        let spans = kinds("prin(größe)");
        assert_eq!(spans[2], (SpanKind::Word, "größe"));
    }

    #[test]
    fn test_spans_cover_input() {
        let source = "iff x:\n    '''doc\nstring'''  # note\n    retrun 1.5\n";
        let mut expected_start = 0;
        let mut rebuilt = String::new();
        for span in scan(source) {
            let span = span.unwrap();
            assert_eq!(span.start, expected_start);
            assert_eq!(&source[span.start..span.end], span.text);
            expected_start = span.end;
            rebuilt.push_str(span.text);
        }
        assert_eq!(rebuilt, source);
    }

    #[test]
    fn test_line_and_column() {
        let spans: Vec<_> = scan("a\n  retrun b").map(Result::unwrap).collect();
        let retrun = spans.iter().find(|s| s.text == "retrun").unwrap();
        assert_eq!((retrun.line, retrun.column), (2, 3));
    }

    #[test]
    fn test_unterminated_string_reports_opener() {
        let mut scanner = scan("iff x:\n    prin('oops)\n");
        let error = scanner.find_map(Result::err).unwrap();
        assert_eq!(
            error,
            ScanError::UnterminatedString {
                offset: 16,
                line: 2,
                column: 10,
            }
        );
        assert!(scanner.next().is_none());
    }

    #[test]
    fn test_restartable() {
        let scanner = scan("deff f(): pass");
        let first: Vec<_> = scanner.clone().collect();
        let second: Vec<_> = scanner.collect();
        assert_eq!(first, second);
    }

    #[test]
    fn test_empty_input() {
        assert!(scan("").next().is_none());
    }
}
