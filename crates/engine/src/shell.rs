//! `trace_processor_shell` query runner
//!
//! Runs `<binary> --query-file <query.sql> <trace>` and parses the CSV the
//! shell prints for the last statement:
//!
//! ```text
//! "cpu","total_duration_ns"
//! 0,81237650
//! 1,"[NULL]"
//! ```
//!
//! The header row holds quoted column names. Cells are integers, floats,
//! quoted strings (`""` escapes a quote) or `[NULL]`, quoted or not.

use crate::process::{run_with_deadline, ProcessError};
use crate::runner::QueryRunner;
use std::io::{ErrorKind, Write};
use std::path::{Path, PathBuf};
use std::process::Command;
use std::time::{Duration, Instant};
use tracelab_core::{Error, QueryTable, Result, Scalar};
use tracing::{debug, info};

const NULL_MARKER: &str = "[NULL]";

/// Runner backed by the `trace_processor_shell` binary
#[derive(Debug, Clone)]
pub struct TraceProcessorShell {
    binary: PathBuf,
    timeout: Duration,
}

impl TraceProcessorShell {
    /// Runner using `binary`, killing it after `timeout`
    pub fn new(binary: impl Into<PathBuf>, timeout: Duration) -> Self {
        Self {
            binary: binary.into(),
            timeout,
        }
    }

    /// Path of the engine binary
    pub fn binary(&self) -> &Path {
        &self.binary
    }

    fn write_query_file(&self, query_text: &str) -> Result<tempfile::NamedTempFile> {
        let mut file = tempfile::Builder::new()
            .prefix("tracelab-query-")
            .suffix(".sql")
            .tempfile()?;
        file.write_all(query_text.as_bytes())?;
        file.flush()?;
        Ok(file)
    }
}

impl QueryRunner for TraceProcessorShell {
    fn execute(&self, trace_path: &Path, query_text: &str) -> Result<QueryTable> {
        if !trace_path.is_file() {
            return Err(Error::ArtifactNotFound {
                trace_id: trace_path
                    .file_stem()
                    .map(|s| s.to_string_lossy().into_owned())
                    .unwrap_or_default(),
                path: trace_path.display().to_string(),
            });
        }

        let query_file = self.write_query_file(query_text)?;
        let mut cmd = Command::new(&self.binary);
        cmd.arg("--query-file").arg(query_file.path()).arg(trace_path);

        debug!(binary = %self.binary.display(), trace = %trace_path.display(), "Starting engine");
        let started = Instant::now();
        let output = run_with_deadline(&mut cmd, None, self.timeout).map_err(|e| match e {
            ProcessError::Spawn(e)
                if matches!(e.kind(), ErrorKind::NotFound | ErrorKind::PermissionDenied) =>
            {
                Error::EngineUnavailable(format!("{}: {}", self.binary.display(), e))
            }
            ProcessError::Spawn(e) => {
                Error::EngineUnavailable(format!("failed to start {}: {}", self.binary.display(), e))
            }
            ProcessError::TimedOut => Error::EngineTimeout {
                secs: self.timeout.as_secs(),
            },
            ProcessError::Io(e) => Error::Io(e),
        })?;

        if !output.status.success() {
            let diagnostic = output.stderr_text();
            return Err(Error::Engine(if diagnostic.is_empty() {
                format!("engine exited with {}", output.status)
            } else {
                diagnostic
            }));
        }

        let stdout = String::from_utf8_lossy(&output.stdout);
        let table = parse_csv_output(&stdout)?;
        info!(
            rows = table.len(),
            elapsed_ms = started.elapsed().as_millis() as u64,
            "Engine query finished"
        );
        Ok(table)
    }
}

#[derive(Debug, PartialEq)]
struct Cell {
    text: String,
    quoted: bool,
}

fn parse_records(input: &str) -> Result<Vec<Vec<Cell>>> {
    let mut records = Vec::new();
    let mut record = Vec::new();
    let mut cell = String::new();
    let mut quoted = false;
    let mut in_quotes = false;
    let mut chars = input.chars().peekable();

    while let Some(c) = chars.next() {
        if in_quotes {
            match c {
                '"' if chars.peek() == Some(&'"') => {
                    chars.next();
                    cell.push('"');
                }
                '"' => in_quotes = false,
                _ => cell.push(c),
            }
            continue;
        }
        match c {
            '"' if cell.is_empty() && !quoted => {
                in_quotes = true;
                quoted = true;
            }
            ',' => record.push(Cell {
                text: std::mem::take(&mut cell),
                quoted: std::mem::replace(&mut quoted, false),
            }),
            '\r' => {}
            '\n' => {
                if !record.is_empty() || !cell.is_empty() || quoted {
                    record.push(Cell {
                        text: std::mem::take(&mut cell),
                        quoted: std::mem::replace(&mut quoted, false),
                    });
                    records.push(std::mem::take(&mut record));
                }
            }
            _ => cell.push(c),
        }
    }
    if in_quotes {
        return Err(Error::Engine("unterminated quoted field in engine output".into()));
    }
    if !record.is_empty() || !cell.is_empty() || quoted {
        record.push(Cell { text: cell, quoted });
        records.push(record);
    }
    Ok(records)
}

fn to_scalar(cell: Cell) -> Scalar {
    if cell.text == NULL_MARKER {
        return Scalar::Null;
    }
    if cell.quoted {
        return Scalar::Str(cell.text);
    }
    if let Ok(i) = cell.text.parse::<i64>() {
        return Scalar::Int(i);
    }
    match cell.text.parse::<f64>() {
        Ok(x) if x.is_finite() => Scalar::Float(x),
        _ => Scalar::Str(cell.text),
    }
}

/// Parse the shell's CSV output into a table
///
/// Empty output (a statement without a result set) yields an empty table
/// with no columns.
pub fn parse_csv_output(output: &str) -> Result<QueryTable> {
    let mut records = parse_records(output)?.into_iter();
    let columns: Vec<String> = match records.next() {
        Some(header) => header.into_iter().map(|c| c.text).collect(),
        None => return Ok(QueryTable::empty(Vec::new())),
    };
    let rows = records
        .map(|record| record.into_iter().map(to_scalar).collect())
        .collect();
    QueryTable::new(columns, rows)
}
