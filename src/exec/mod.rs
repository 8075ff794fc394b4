pub mod python;

use lazy_static::lazy_static;
use regex::Regex;
use std::fmt;
use std::io;
use thiserror::Error;

pub use python::{PythonRunner, PythonSession};

/// Runs corrected source text.
pub trait Executor {
    fn execute(&mut self, code: &str) -> Result<(), ExecError>;
}

#[derive(Debug, Error)]
pub enum ExecError {
    #[error("failed to start interpreter `{program}`")]
    Spawn {
        program: String,
        #[source]
        source: io::Error,
    },

    #[error("interpreter I/O failed")]
    Io(#[from] io::Error),

    #[error("{0}")]
    Runtime(RuntimeFailure),

    #[error("interpreter session has exited")]
    SessionClosed,
}

/// An exception raised by the executed code. `line` and `column` are
/// 1-based and refer to the corrected text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RuntimeFailure {
    pub message: String,
    pub line: Option<usize>,
    pub column: Option<usize>,
}

impl fmt::Display for RuntimeFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.message)
    }
}

lazy_static! {
    static ref FRAME: Regex = Regex::new(r#"^\s*File "<string>", line (\d+)"#).unwrap();
}

impl RuntimeFailure {
    /// Pull the location and final exception line out of a Python traceback
    /// for code passed with `-c`. `code` is the text that was executed; it is
    /// needed to turn a caret marker back into a column.
    pub fn from_traceback(stderr: &str, code: &str) -> Self {
        let lines: Vec<&str> = stderr.lines().collect();

        let frame = lines
            .iter()
            .enumerate()
            .rev()
            .find_map(|(idx, l)| FRAME.captures(l).map(|c| (idx, c[1].parse::<usize>().ok())));

        let message = lines
            .iter()
            .rev()
            .find(|l| !l.trim().is_empty() && !l.starts_with(char::is_whitespace))
            .map(|l| l.trim().to_string())
            .unwrap_or_default();

        let (line, column) = match frame {
            Some((idx, Some(line))) => {
                let column = caret_column(&lines[idx + 1..], code, line);
                (Some(line), column)
            }
            _ => (None, None),
        };

        Self {
            message,
            line,
            column,
        }
    }
}

// Python echoes the offending line indented and stripped, then marks it with
// `^` (or `~` then `^` on newer versions) on the following line.
fn caret_column(after_frame: &[&str], code: &str, line: usize) -> Option<usize> {
    let [shown, marker, ..] = after_frame else {
        return None;
    };
    let marker_start = marker.find(|c: char| c == '^' || c == '~')?;
    if !marker[..marker_start].trim().is_empty() {
        return None;
    }

    let shown_indent = shown.len() - shown.trim_start().len();
    let source = code.lines().nth(line.checked_sub(1)?)?;
    let source_indent = source.len() - source.trim_start().len();

    Some(source_indent + marker_start.checked_sub(shown_indent)? + 1)
}
