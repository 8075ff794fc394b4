use super::{ExecError, Executor, RuntimeFailure};
use std::io::{self, BufRead, BufReader, Write};
use std::process::{Child, ChildStdin, ChildStdout, Command, Stdio};

/// Runs each submission in a fresh `python3 -c <code>` process that shares
/// kwfix's stdin and stdout, so `input()` reads the user's terminal or pipe.
#[derive(Debug, Clone)]
pub struct PythonRunner {
    program: String,
}

impl PythonRunner {
    pub fn new(program: impl Into<String>) -> Self {
        Self {
            program: program.into(),
        }
    }
}

fn spawn_error(program: &str) -> impl FnOnce(io::Error) -> ExecError + '_ {
    move |source| ExecError::Spawn {
        program: program.to_string(),
        source,
    }
}

impl Executor for PythonRunner {
    fn execute(&mut self, code: &str) -> Result<(), ExecError> {
        let child = Command::new(&self.program)
            .arg("-c")
            .arg(code)
            .stdin(Stdio::inherit())
            .stdout(Stdio::inherit())
            .stderr(Stdio::piped())
            .spawn()
            .map_err(spawn_error(&self.program))?;

        let output = child.wait_with_output()?;
        io::stderr().write_all(&output.stderr)?;

        if output.status.success() {
            return Ok(());
        }

        let stderr = String::from_utf8_lossy(&output.stderr);
        let mut failure = RuntimeFailure::from_traceback(&stderr, code);
        if failure.message.is_empty() {
            failure.message = format!("interpreter exited with {}", output.status);
        }
        tracing::debug!(line = ?failure.line, "python run failed");
        Err(ExecError::Runtime(failure))
    }
}

const MARKER: &[u8] = b"\x00kwfix:";

// Executes length-framed blocks from stdin in one namespace and answers each
// with a marker line on stdout. Code sees an empty stdin. SIGINT is ignored
// between blocks and raises KeyboardInterrupt inside them.
const DRIVER: &str = r#"
import os, signal, sys, traceback
chan = sys.stdin.buffer
sys.stdin = open(os.devnull)
namespace = {"__name__": "__main__", "__builtins__": __builtins__}
signal.signal(signal.SIGINT, signal.SIG_IGN)

def report(status):
    sys.stdout.flush()
    sys.stderr.flush()
    sys.__stdout__.write("\x00kwfix:" + status + "\n")
    sys.__stdout__.flush()

def describe(exc):
    line, col = "-", "-"
    if isinstance(exc, SyntaxError):
        line, col = exc.lineno or "-", exc.offset or "-"
    else:
        for frame in traceback.extract_tb(exc.__traceback__):
            if frame.filename == "<stdin>":
                line = frame.lineno
    tb = exc.__traceback__.tb_next if exc.__traceback__ else None
    traceback.print_exception(type(exc), exc, tb)
    message = traceback.format_exception_only(type(exc), exc)[-1].strip()
    return "error\t%s\t%s\t%s" % (line, col, message.replace("\n", " "))

while True:
    header = chan.readline()
    if not header:
        break
    source = chan.read(int(header)).decode("utf-8")
    signal.signal(signal.SIGINT, signal.default_int_handler)
    try:
        exec(compile(source, "<stdin>", "exec"), namespace)
        status = "ok"
    except SystemExit:
        status = "exit"
    except BaseException as exc:
        signal.signal(signal.SIGINT, signal.SIG_IGN)
        status = describe(exc)
    signal.signal(signal.SIGINT, signal.SIG_IGN)
    report(status)
    if status == "exit":
        break
"#;

#[derive(Debug, Clone, PartialEq, Eq)]
enum Status {
    Ok,
    Exit,
    Failed(RuntimeFailure),
}

fn parse_status(status: &str) -> Status {
    let mut fields = status.splitn(4, '\t');
    match fields.next() {
        Some("ok") => Status::Ok,
        Some("exit") => Status::Exit,
        _ => {
            let line = fields.next().and_then(|l| l.parse().ok());
            let column = fields.next().and_then(|c| c.parse().ok());
            Status::Failed(RuntimeFailure {
                message: fields.next().unwrap_or_default().to_string(),
                line,
                column,
            })
        }
    }
}

/// Splits a stdout line into user output and the driver's status, if the
/// line carries one. Output printed without a trailing newline ends up in
/// front of the marker.
fn split_marker(line: &[u8]) -> (&[u8], Option<String>) {
    match line.windows(MARKER.len()).position(|w| w == MARKER) {
        Some(at) => {
            let status = &line[at + MARKER.len()..];
            let status = String::from_utf8_lossy(status).trim_end().to_string();
            (&line[..at], Some(status))
        }
        None => (line, None),
    }
}

// `<byte length>\n<code>`
fn write_frame(stdin: &mut ChildStdin, code: &str) -> io::Result<()> {
    writeln!(stdin, "{}", code.len())?;
    stdin.write_all(code.as_bytes())?;
    stdin.flush()
}

/// One long-lived interpreter; definitions persist between blocks.
#[derive(Debug)]
pub struct PythonSession {
    child: Child,
    stdin: Option<ChildStdin>,
    stdout: BufReader<ChildStdout>,
    closed: bool,
}

impl PythonSession {
    pub fn spawn(program: &str) -> Result<Self, ExecError> {
        let mut child = Command::new(program)
            .args(["-u", "-c", DRIVER])
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::inherit())
            .spawn()
            .map_err(spawn_error(program))?;

        let (stdin, stdout) = match (child.stdin.take(), child.stdout.take()) {
            (Some(stdin), Some(stdout)) => (stdin, stdout),
            _ => {
                let _ = child.kill();
                let missing = io::Error::new(io::ErrorKind::Other, "interpreter pipes unavailable");
                return Err(missing.into());
            }
        };

        tracing::debug!(program, pid = child.id(), "started python session");
        Ok(Self {
            child,
            stdin: Some(stdin),
            stdout: BufReader::new(stdout),
            closed: false,
        })
    }

    pub fn is_closed(&self) -> bool {
        self.closed
    }

    fn send(&mut self, code: &str) -> Result<(), ExecError> {
        let stdin = self.stdin.as_mut().ok_or(ExecError::SessionClosed)?;
        match write_frame(stdin, code) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == io::ErrorKind::BrokenPipe => {
                self.closed = true;
                Err(ExecError::SessionClosed)
            }
            Err(e) => Err(e.into()),
        }
    }

    fn await_status(&mut self) -> Result<Status, ExecError> {
        let mut out = io::stdout();
        let mut line = Vec::new();
        loop {
            line.clear();
            if self.stdout.read_until(b'\n', &mut line)? == 0 {
                self.closed = true;
                return Err(ExecError::SessionClosed);
            }

            let (text, status) = split_marker(&line);
            out.write_all(text)?;
            if let Some(status) = status {
                out.flush()?;
                return Ok(parse_status(&status));
            }
        }
    }
}

impl Executor for PythonSession {
    fn execute(&mut self, code: &str) -> Result<(), ExecError> {
        if self.closed {
            return Err(ExecError::SessionClosed);
        }

        self.send(code)?;
        match self.await_status()? {
            Status::Ok => Ok(()),
            Status::Exit => {
                self.closed = true;
                Err(ExecError::SessionClosed)
            }
            Status::Failed(failure) => Err(ExecError::Runtime(failure)),
        }
    }
}

impl Drop for PythonSession {
    fn drop(&mut self) {
        // Closing stdin ends the driver loop
        drop(self.stdin.take());
        let _ = self.child.wait();
    }
}
