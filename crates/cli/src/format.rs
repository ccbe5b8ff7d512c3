//! Output formatting for the CLI.

use tracelab_core::{Error, QueryTable};
use tracelab_executor::{JobView, Output};

/// How results are printed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputMode {
    /// Tab-separated tables and short status lines
    Human,
    /// Pretty-printed JSON
    Json,
}

/// Format a command output.
pub fn format_output(output: &Output, mode: OutputMode) -> String {
    match mode {
        OutputMode::Json => to_json(output),
        OutputMode::Human => format_human(output),
    }
}

/// Format an error.
pub fn format_error(error: &Error, mode: OutputMode) -> String {
    match mode {
        OutputMode::Json => to_json(&serde_json::json!({
            "error": error.error_code(),
            "message": error.to_string(),
        })),
        OutputMode::Human => format!("(error) {}", error),
    }
}

fn to_json<T: serde::Serialize>(value: &T) -> String {
    serde_json::to_string_pretty(value).unwrap_or_else(|e| format!("(error) {}", e))
}

fn format_human(output: &Output) -> String {
    match output {
        Output::Pong { version } => format!("PONG {}", version),
        Output::Unit => "OK".to_string(),
        Output::QueryAdded { query_id } => query_id.to_string(),
        Output::Queries(queries) => {
            let lines: Vec<String> = queries
                .iter()
                .map(|q| {
                    let kind = if q.is_custom { "custom" } else { "predefined" };
                    format!("{}\t{}\t{}", q.query_id, kind, q.name)
                })
                .collect();
            or_empty(lines)
        }
        Output::Accepted(key) => format!("accepted {}", key),
        Output::Job(view) => format_job(view),
        Output::Devices(devices) => or_empty(devices.clone()),
        Output::CaptureStarted { trace_id } | Output::Captured { trace_id } => trace_id.to_string(),
    }
}

fn or_empty(lines: Vec<String>) -> String {
    if lines.is_empty() {
        "(empty list)".to_string()
    } else {
        lines.join("\n")
    }
}

fn format_job(view: &JobView) -> String {
    let mut out = match (&view.data, &view.error) {
        (Some(_), _) if view.cached => format!("{} (cached)", view.status),
        (_, Some(error)) => format!("{}: {}", view.status, error),
        _ => view.status.to_string(),
    };
    if let Some(table) = &view.data {
        out.push('\n');
        out.push_str(&format_table(table));
    }
    out
}

fn format_table(table: &QueryTable) -> String {
    let mut lines = Vec::with_capacity(table.len() + 1);
    lines.push(table.columns().join("\t"));
    for row in table.rows() {
        let cells: Vec<String> = row.iter().map(|cell| cell.to_string()).collect();
        lines.push(cells.join("\t"));
    }
    lines.join("\n")
}
