use std::fs::File;
use std::io::{BufRead, BufReader, Read};
use std::path::Path;
use std::str::FromStr;

use super::types::EmailInput;
use crate::pipeline::analysis::AnalysisError;

/// Columns a CSV input must carry.
pub const REQUIRED_CSV_COLUMNS: [&str; 2] = ["date", "body"];

/// Layout of a batch input file.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputFormat {
    /// One `{"date", "body"}` object per line.
    Jsonl,
    /// Header row with `date` and `body` columns.
    Csv,
}

impl InputFormat {
    /// `.csv` files are CSV; anything else is read as JSONL.
    pub fn from_path(path: &Path) -> Self {
        match path.extension().and_then(|e| e.to_str()) {
            Some(ext) if ext.eq_ignore_ascii_case("csv") => Self::Csv,
            _ => Self::Jsonl,
        }
    }
}

impl FromStr for InputFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "jsonl" | "json" => Ok(Self::Jsonl),
            "csv" => Ok(Self::Csv),
            other => Err(format!("unknown input format '{other}' (expected jsonl or csv)")),
        }
    }
}

/// Read up to `max_emails` emails from a file. The format comes from the
/// file extension unless `format` is given.
pub fn load_email_inputs(
    path: &Path,
    format: Option<InputFormat>,
    max_emails: usize,
) -> Result<Vec<EmailInput>, AnalysisError> {
    let file = File::open(path)?;
    match format.unwrap_or_else(|| InputFormat::from_path(path)) {
        InputFormat::Jsonl => read_email_inputs(BufReader::new(file), max_emails),
        InputFormat::Csv => read_csv_inputs(BufReader::new(file), max_emails),
    }
}

/// Parse `{"date": ..., "body": ...}` lines. Blank lines are skipped;
/// a malformed line fails the whole read with its 1-based line number.
pub fn read_email_inputs<R: BufRead>(
    reader: R,
    max_emails: usize,
) -> Result<Vec<EmailInput>, AnalysisError> {
    let mut inputs = Vec::new();

    for (idx, line) in reader.lines().enumerate() {
        if inputs.len() >= max_emails {
            break;
        }
        let line = line?;
        if line.trim().is_empty() {
            continue;
        }
        let input: EmailInput =
            serde_json::from_str(&line).map_err(|e| AnalysisError::Input {
                line: idx + 1,
                reason: e.to_string(),
            })?;
        inputs.push(input);
    }

    tracing::debug!(count = inputs.len(), max_emails, "Loaded email inputs");
    Ok(inputs)
}

/// Parse a CSV file with a header row. Both `date` and `body` columns are
/// required; other columns are ignored. Quoted bodies may span lines, and an
/// empty `date` cell reads as no date.
pub fn read_csv_inputs<R: Read>(
    reader: R,
    max_emails: usize,
) -> Result<Vec<EmailInput>, AnalysisError> {
    let mut csv_reader = csv::ReaderBuilder::new()
        .trim(csv::Trim::Headers)
        .from_reader(reader);

    let headers = csv_reader.headers().map_err(|e| csv_error(e, 1))?;
    for column in REQUIRED_CSV_COLUMNS {
        if !headers.iter().any(|h| h == column) {
            return Err(AnalysisError::Input {
                line: 1,
                reason: format!("missing required column '{column}'"),
            });
        }
    }

    let mut inputs = Vec::new();
    for row in csv_reader.deserialize::<EmailInput>() {
        if inputs.len() >= max_emails {
            break;
        }
        let input = row.map_err(|e| csv_error(e, 0))?;
        inputs.push(input);
    }

    tracing::debug!(count = inputs.len(), max_emails, "Loaded CSV email inputs");
    Ok(inputs)
}

fn csv_error(err: csv::Error, fallback_line: usize) -> AnalysisError {
    let line = err
        .position()
        .map(|pos| pos.line() as usize)
        .unwrap_or(fallback_line);
    AnalysisError::Input {
        line,
        reason: err.to_string(),
    }
}
