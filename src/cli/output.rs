use crate::exec::RuntimeFailure;
use crate::normalizer::source_map::SourceMap;
use crate::normalizer::{Correction, CorrectionKind};
use crate::scanner::ScanError;
use crate::FileReport;
use anyhow::Result;
use colored::*;
use serde::Serialize;
use std::fmt;
use std::path::Path;
use std::str::FromStr;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormat {
    Text,
    Json,
}

impl FromStr for OutputFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "text" => Ok(OutputFormat::Text),
            "json" => Ok(OutputFormat::Json),
            _ => Err(format!("Unknown format: {}", s)),
        }
    }
}

impl fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            OutputFormat::Text => write!(f, "text"),
            OutputFormat::Json => write!(f, "json"),
        }
    }
}

#[derive(Debug, Serialize)]
struct JsonCorrection<'a> {
    file: String,
    #[serde(flatten)]
    correction: &'a Correction,
}

#[derive(Debug, Serialize)]
struct JsonOutput<'a> {
    files_checked: usize,
    total_corrections: usize,
    corrections: Vec<JsonCorrection<'a>>,
}

fn plural<'a>(count: usize, one: &'a str, many: &'a str) -> &'a str {
    if count == 1 {
        one
    } else {
        many
    }
}

/// `corrected `prin` → `print``, as shown after each REPL block.
pub fn format_notice(correction: &Correction, colored: bool) -> String {
    if !colored {
        return correction.to_string();
    }

    let mut notice = format!(
        "{} `{}` → `{}`",
        "corrected".dimmed(),
        correction.original.yellow(),
        correction.canonical.green().bold()
    );
    if let CorrectionKind::Fuzzy { distance } = correction.kind {
        let approximate = format!(" (approximate match, distance {})", distance);
        notice.push_str(&approximate.dimmed().to_string());
    }
    notice
}

/// Notices for a file that is about to run, written to stderr.
pub fn print_notices(path: &Path, corrections: &[Correction], colored: bool) {
    for correction in corrections {
        let location = format!("{}:{}:{}", path.display(), correction.line, correction.column);
        if colored {
            eprintln!("{} {}", location.blue(), format_notice(correction, colored));
        } else {
            eprintln!("{} {}", location, format_notice(correction, colored));
        }
    }
}

pub fn print_report(report: &FileReport, colored: bool) {
    let corrections = &report.normalized.corrections;
    if corrections.is_empty() {
        return;
    }

    let file_name = report.path.display().to_string();
    if colored {
        println!("\n{}", file_name.bold().underline());
    } else {
        println!("\n{}", file_name);
    }

    for correction in corrections {
        let line_info = format!("{}:{}", correction.line, correction.column);
        let kind = match correction.kind {
            CorrectionKind::Exact => "exact".to_string(),
            CorrectionKind::Fuzzy { distance } => format!("fuzzy, distance {}", distance),
        };

        if colored {
            println!(
                "  {} {} {} {} {}",
                line_info.blue().bold(),
                correction.original.red().bold(),
                "→".dimmed(),
                correction.canonical.green(),
                format!("({}, {})", kind, correction.category).dimmed()
            );
        } else {
            println!(
                "  {} {} → {} ({}, {})",
                line_info, correction.original, correction.canonical, kind, correction.category
            );
        }
    }
}

pub fn render_json_report(reports: &[FileReport]) -> Result<String> {
    let corrections: Vec<JsonCorrection> = reports
        .iter()
        .flat_map(|report| {
            report.normalized.corrections.iter().map(|c| JsonCorrection {
                file: report.path.display().to_string(),
                correction: c,
            })
        })
        .collect();

    let output = JsonOutput {
        files_checked: reports.len(),
        total_corrections: corrections.len(),
        corrections,
    };

    Ok(serde_json::to_string_pretty(&output)?)
}

pub fn print_check_summary(total: usize, files: usize, colored: bool) {
    println!();
    if total == 0 {
        if colored {
            println!("{}", "✓ No corrections needed!".green().bold());
        } else {
            println!("✓ No corrections needed!");
        }
        return;
    }

    let correction_word = plural(total, "correction", "corrections");
    let file_word = plural(files, "file", "files");
    if colored {
        println!(
            "{} {} {} found in {} {}",
            "✗".red().bold(),
            total.to_string().red().bold(),
            correction_word,
            files,
            file_word
        );
    } else {
        println!("✗ {} {} found in {} {}", total, correction_word, files, file_word);
    }
}

pub fn print_fix_summary(total: usize, files: usize, colored: bool) {
    println!();
    if total == 0 {
        if colored {
            println!("{}", "✓ No corrections needed!".green().bold());
        } else {
            println!("✓ No corrections needed!");
        }
        return;
    }

    let correction_word = plural(total, "correction", "corrections");
    let file_word = plural(files, "file", "files");
    if colored {
        println!(
            "{} {} {} applied to {} {}",
            "✓".green().bold(),
            total.to_string().green().bold(),
            correction_word,
            files,
            file_word
        );
    } else {
        println!("✓ {} {} applied to {} {}", total, correction_word, files, file_word);
    }
}

pub fn print_warning(message: &str, colored: bool) {
    if colored {
        eprintln!("{} {}", "warning:".yellow().bold(), message);
    } else {
        eprintln!("warning: {}", message);
    }
}

pub fn print_error(error: &anyhow::Error, colored: bool) {
    if colored {
        eprintln!("{} {:#}", "error:".red().bold(), error);
    } else {
        eprintln!("error: {:#}", error);
    }
}

pub fn format_scan_error(error: &ScanError, colored: bool) -> String {
    if colored {
        format!("{} {}", "SyntaxError:".red().bold(), error)
    } else {
        format!("SyntaxError: {}", error)
    }
}

/// Describe a runtime failure. Interpreter locations refer to the corrected
/// text; when corrections moved the column, the user's column is added.
pub fn format_runtime_error(failure: &RuntimeFailure, map: &SourceMap, colored: bool) -> String {
    let message = if colored {
        failure.message.red().bold().to_string()
    } else {
        failure.message.clone()
    };

    let Some(line) = failure.line else {
        return message;
    };

    let text = if map.is_identity() { "" } else { " of the corrected text" };
    let location = match failure.column {
        Some(column) => {
            let original = map
                .original_column(line, column)
                .filter(|original| *original != column)
                .map(|original| format!(" (column {} in your text)", original))
                .unwrap_or_default();
            format!("at line {}, column {}{}{}", line, column, text, original)
        }
        None => format!("at line {}{}", line, text),
    };

    if colored {
        format!("{}\n  {}", message, location.dimmed())
    } else {
        format!("{}\n  {}", message, location)
    }
}
