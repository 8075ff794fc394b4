use crate::cli::interrupt::Interrupt;
use crate::cli::output;
use crate::exec::{ExecError, Executor};
use crate::normalizer::Normalizer;
use anyhow::Result;
use std::io::{BufRead, Write};

pub const PRIMARY_PROMPT: &str = "kwfix>>> ";
pub const CONTINUATION_PROMPT: &str = "kwfix... ";

const EXIT_COMMANDS: &[&str] = &["exit", "quit", "exit()", "quit()"];

/// Collects input lines until a block is complete.
///
/// A line ending in `:` opens a block and indented lines continue it. An
/// empty line submits whatever is buffered; any other line completes the
/// block it belongs to.
#[derive(Debug, Default)]
pub struct BlockBuffer {
    lines: Vec<String>,
}

impl BlockBuffer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    pub fn clear(&mut self) {
        self.lines.clear();
    }

    pub fn push_line(&mut self, line: &str) -> Option<String> {
        if line.trim().is_empty() {
            return self.take();
        }

        self.lines.push(line.to_string());
        let opens = line.trim_end().ends_with(':');
        let indented = line.starts_with(&[' ', '\t'][..]);
        if opens || indented {
            return None;
        }
        self.take()
    }

    fn take(&mut self) -> Option<String> {
        if self.lines.is_empty() {
            return None;
        }
        let block = self.lines.join("\n");
        self.lines.clear();
        Some(block)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Flow {
    Continue,
    Exit,
}

pub struct Repl<'n, E> {
    normalizer: &'n Normalizer,
    executor: E,
    interrupt: Interrupt,
    fuzzy: bool,
    quiet: bool,
    colored: bool,
}

impl<'n, E: Executor> Repl<'n, E> {
    pub fn new(normalizer: &'n Normalizer, executor: E, fuzzy: bool) -> Self {
        Self {
            normalizer,
            executor,
            interrupt: Interrupt::new(),
            fuzzy,
            quiet: false,
            colored: false,
        }
    }

    pub fn quiet(mut self, quiet: bool) -> Self {
        self.quiet = quiet;
        self
    }

    pub fn colored(mut self, colored: bool) -> Self {
        self.colored = colored;
        self
    }

    /// Poll `interrupt` for Ctrl+C. Without one the REPL never sees it.
    pub fn interrupt(mut self, interrupt: Interrupt) -> Self {
        self.interrupt = interrupt;
        self
    }

    pub fn executor_mut(&mut self) -> &mut E {
        &mut self.executor
    }

    pub fn into_executor(self) -> E {
        self.executor
    }

    pub fn run<R: BufRead, W: Write>(&mut self, mut input: R, mut out: W) -> Result<()> {
        writeln!(out, "Welcome to kwfix, Python for bad spellers.")?;
        writeln!(out, "Type exit() or quit() to leave; an empty line runs a block.")?;

        let mut buffer = BlockBuffer::new();
        let mut line = String::new();
        loop {
            let prompt = if buffer.is_empty() {
                PRIMARY_PROMPT
            } else {
                CONTINUATION_PROMPT
            };
            write!(out, "{}", prompt)?;
            out.flush()?;

            line.clear();
            if input.read_line(&mut line)? == 0 {
                writeln!(out)?;
                break;
            }
            // Ctrl+C while typing throws away the unfinished block
            if self.interrupt.take() {
                writeln!(out, "KeyboardInterrupt")?;
                buffer.clear();
            }
            let entered = line.trim_end_matches(&['\n', '\r'][..]);

            if EXIT_COMMANDS.contains(&entered.trim().to_lowercase().as_str()) {
                break;
            }

            let Some(block) = buffer.push_line(entered) else {
                continue;
            };
            if self.submit(&block, &mut out)? == Flow::Exit {
                break;
            }
        }

        writeln!(out, "Goodbye!")?;
        Ok(())
    }

    fn submit<W: Write>(&mut self, block: &str, out: &mut W) -> Result<Flow> {
        let normalized = match self.normalizer.normalize(block, self.fuzzy) {
            Ok(normalized) => normalized,
            Err(e) => {
                writeln!(out, "{}", output::format_scan_error(&e, self.colored))?;
                return Ok(Flow::Continue);
            }
        };

        if !self.quiet {
            for correction in &normalized.corrections {
                writeln!(out, "{}", output::format_notice(correction, self.colored))?;
            }
        }
        out.flush()?;

        let result = self.executor.execute(&normalized.text);
        // an interrupt during execution was already reported by the interpreter
        self.interrupt.take();

        match result {
            Ok(()) => Ok(Flow::Continue),
            Err(ExecError::Runtime(failure)) => {
                let message =
                    output::format_runtime_error(&failure, &normalized.source_map, self.colored);
                writeln!(out, "{}", message)?;
                Ok(Flow::Continue)
            }
            Err(ExecError::SessionClosed) => Ok(Flow::Exit),
            Err(e) => Err(e.into()),
        }
    }
}
