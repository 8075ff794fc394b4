use anyhow::{Context, Result};
use clap::{ArgAction, CommandFactory, Parser, Subcommand};
use clap_complete::{generate, Shell};
use kwfix::cli::interrupt::Interrupt;
use kwfix::cli::output::{self, OutputFormat};
use kwfix::cli::repl::Repl;
use kwfix::exec::{ExecError, Executor, PythonRunner, PythonSession};
use kwfix::{cli, dict, Config, FileReport, Normalizer};
use rayon::prelude::*;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(name = "kwfix")]
#[command(version, about = "Run Python code written with misspelled keywords", long_about = None)]
struct Cli {
    /// Source files to run (.phy)
    #[arg(value_name = "FILES")]
    files: Vec<PathBuf>,

    /// Also correct words that are close to a keyword. This is an approximate,
    /// text-only guess: names like `classes` or `returns` may be rewritten
    #[arg(short = 'z', long)]
    fuzzy: bool,

    /// Run the files, then keep the session open in the REPL
    #[arg(short, long, conflicts_with_all = ["emit", "fix", "check"])]
    interactive: bool,

    /// Print the corrected source instead of running it
    #[arg(long, conflicts_with_all = ["fix", "check"])]
    emit: bool,

    /// Rewrite the files in place
    #[arg(long, conflicts_with = "check")]
    fix: bool,

    /// Report corrections without running anything
    #[arg(long)]
    check: bool,

    /// Exit with code 0 even if corrections are found
    #[arg(long)]
    no_fail: bool,

    /// Report format for --check and --fix (text, json)
    #[arg(short = 'o', long, default_value = "text")]
    format: OutputFormat,

    /// Do not print correction notices
    #[arg(short, long)]
    quiet: bool,

    /// Disable colored output
    #[arg(long)]
    no_color: bool,

    /// Python interpreter to run corrected code with
    #[arg(long, value_name = "PATH", env = "KWFIX_PYTHON")]
    python: Option<String>,

    /// Increase log verbosity (-v debug, -vv trace)
    #[arg(short, long, action = ArgAction::Count)]
    verbose: u8,

    /// Generate shell completion script
    #[arg(long, value_name = "SHELL")]
    completion: Option<Shell>,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Inspect the keyword dictionary
    Dict {
        #[command(subcommand)]
        action: DictCommands,
    },
}

#[derive(Subcommand, Debug)]
enum DictCommands {
    /// List keywords and their accepted misspellings
    List,
    /// Show one keyword
    Show {
        /// Keyword or misspelling
        keyword: String,
    },
}

fn long_options() -> Vec<String> {
    let command = Cli::command();
    let mut names: Vec<String> = command
        .get_arguments()
        .filter_map(|arg| arg.get_long())
        .map(String::from)
        .collect();
    names.extend(["help".to_string(), "version".to_string()]);
    names
}

fn init_tracing(verbose: u8) {
    let default_level = match verbose {
        0 => "warn",
        1 => "debug",
        _ => "trace",
    };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .with_target(false)
        .init();
}

fn main() -> Result<()> {
    let known = long_options();
    let known: Vec<&str> = known.iter().map(String::as_str).collect();
    let (args, repairs) = cli::options::repair_options(std::env::args_os(), &known);
    for repair in &repairs {
        eprintln!("{}", repair);
    }

    let cli = Cli::parse_from(args);
    init_tracing(cli.verbose);
    let colored = !cli.no_color;

    // Handle shell completion generation
    if let Some(shell) = cli.completion {
        let mut cmd = Cli::command();
        generate(shell, &mut cmd, "kwfix", &mut io::stdout());
        return Ok(());
    }

    // Load configuration
    let config = Config::load(cli.fuzzy, cli.python.clone())?;
    let normalizer = Normalizer::from_config(&config)?;

    // Handle subcommands
    if let Some(command) = cli.command {
        return handle_command(command, &normalizer, colored);
    }

    for path in &cli.files {
        if !cli::has_source_extension(path) {
            output::print_warning(
                &format!("{} does not have a .{} extension", path.display(), cli::SOURCE_EXTENSION),
                colored,
            );
        }
    }

    let ok = if cli.check || cli.emit || cli.fix {
        process_files(&cli, &config, &normalizer)?
    } else {
        // from here on Ctrl+C belongs to the running program
        let interrupt = Interrupt::install()?;
        if cli.files.is_empty() || cli.interactive {
            run_interactive(&cli, &config, &normalizer, interrupt)?
        } else {
            run_files(&cli, &config, &normalizer, &interrupt)
        }
    };

    if !ok {
        std::process::exit(1);
    }
    Ok(())
}

fn handle_command(command: Commands, normalizer: &Normalizer, colored: bool) -> Result<()> {
    let mut stdout = io::stdout().lock();
    match command {
        Commands::Dict { action } => match action {
            DictCommands::List => {
                dict::manager::list_keywords(&mut stdout, normalizer.dictionary(), colored)?;
            }
            DictCommands::Show { keyword } => {
                let dictionary = normalizer.dictionary();
                dict::manager::show_keyword(&mut stdout, dictionary, &keyword, colored)?;
            }
        },
    }
    Ok(())
}

/// `--check`, `--emit` and `--fix`: nothing is executed. Returns false when
/// the run should fail.
fn process_files(cli: &Cli, config: &Config, normalizer: &Normalizer) -> Result<bool> {
    if cli.files.is_empty() {
        anyhow::bail!("No files specified. Use --help for usage information.");
    }
    let colored = !cli.no_color;

    let results: Vec<Result<FileReport>> = cli
        .files
        .par_iter()
        .map(|path| cli::load_and_normalize(normalizer, path, config.fuzzy()))
        .collect();

    let mut ok = true;
    let mut reports = Vec::with_capacity(results.len());
    for result in results {
        match result {
            Ok(report) => reports.push(report),
            Err(e) => {
                output::print_error(&e, colored);
                ok = false;
            }
        }
    }

    if cli.emit {
        for report in &reports {
            if !cli.quiet {
                output::print_notices(&report.path, &report.normalized.corrections, colored);
            }
            print!("{}", report.normalized.text);
        }
        return Ok(ok);
    }

    if cli.fix {
        for report in reports.iter().filter(|r| !r.normalized.is_unchanged()) {
            fs::write(&report.path, &report.normalized.text)
                .with_context(|| format!("Failed to write {}", report.path.display()))?;
            tracing::info!(path = %report.path.display(), "rewrote file");
        }
    }

    let total: usize = reports.iter().map(FileReport::correction_count).sum();
    let touched = reports.iter().filter(|r| r.correction_count() > 0).count();

    match cli.format {
        OutputFormat::Json => println!("{}", output::render_json_report(&reports)?),
        OutputFormat::Text => {
            for report in &reports {
                output::print_report(report, colored);
            }
            if cli.fix {
                output::print_fix_summary(total, touched, colored);
            } else {
                output::print_check_summary(total, touched, colored);
            }
        }
    }

    if cli.check && total > 0 && !cli.no_fail {
        ok = false;
    }
    Ok(ok)
}

/// Normalize one file and hand it to `executor`. Returns false on any
/// failure, which has already been reported.
fn run_file<E: Executor>(
    cli: &Cli,
    config: &Config,
    normalizer: &Normalizer,
    executor: &mut E,
    path: &Path,
) -> Result<bool> {
    let colored = !cli.no_color;
    let report = match cli::load_and_normalize(normalizer, path, config.fuzzy()) {
        Ok(report) => report,
        Err(e) => {
            output::print_error(&e, colored);
            return Ok(false);
        }
    };

    if !cli.quiet {
        output::print_notices(&report.path, &report.normalized.corrections, colored);
    }

    match executor.execute(&report.normalized.text) {
        Ok(()) => Ok(true),
        Err(ExecError::Runtime(failure)) => {
            eprintln!(
                "{}: {}",
                path.display(),
                output::format_runtime_error(&failure, &report.normalized.source_map, colored)
            );
            Ok(false)
        }
        // exit() in the file ends the session
        Err(ExecError::SessionClosed) => Ok(true),
        Err(e) => Err(e.into()),
    }
}

fn run_files(cli: &Cli, config: &Config, normalizer: &Normalizer, interrupt: &Interrupt) -> bool {
    let mut runner = PythonRunner::new(config.python.clone());
    let mut ok = true;
    for path in &cli.files {
        match run_file(cli, config, normalizer, &mut runner, path) {
            Ok(true) => {}
            Ok(false) => ok = false,
            Err(e) => {
                output::print_error(&e, !cli.no_color);
                return false;
            }
        }
        if interrupt.take() {
            tracing::info!("interrupted; skipping remaining files");
            return false;
        }
    }
    ok
}

fn run_interactive(
    cli: &Cli,
    config: &Config,
    normalizer: &Normalizer,
    interrupt: Interrupt,
) -> Result<bool> {
    let mut session = PythonSession::spawn(&config.python)
        .with_context(|| format!("Cannot start a Python session with `{}`", config.python))?;

    let mut ok = true;
    for path in &cli.files {
        ok &= run_file(cli, config, normalizer, &mut session, path)?;
        if session.is_closed() {
            return Ok(ok);
        }
    }

    // an interrupt while the files ran was reported by the interpreter
    interrupt.take();
    let mut repl = Repl::new(normalizer, session, config.fuzzy())
        .interrupt(interrupt)
        .quiet(cli.quiet)
        .colored(!cli.no_color);
    repl.run(io::stdin().lock(), io::stdout())?;
    Ok(ok)
}
