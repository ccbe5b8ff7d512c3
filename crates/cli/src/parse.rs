//! ArgMatches → Command conversion.
//!
//! - Most subcommands map to one `CliAction::Execute(Command)`
//! - `capture` records and waits for the trace: `CliAction::Capture`
//! - `run` dispatches, then waits for the job: `CliAction::Run`
//!
//! Each invocation is its own process, so nothing may be left running in
//! the background when the command returns.

use std::time::Duration;

use clap::ArgMatches;
use tracelab_core::{QueryId, TraceId};
use tracelab_executor::Command;

/// The result of parsing the command line.
#[derive(Debug, PartialEq)]
pub enum CliAction {
    /// A single command to execute.
    Execute(Command),
    /// Capture a trace and wait until it is published.
    Capture { device_id: String },
    /// Dispatch a query and wait for it to finish.
    ///
    /// `wait` is `None` when the engine deadline applies.
    Run {
        trace_id: TraceId,
        query_id: QueryId,
        wait: Option<Duration>,
    },
}

/// Convert clap ArgMatches into a CliAction.
pub fn matches_to_action(matches: &ArgMatches) -> Result<CliAction, String> {
    let (sub_name, sub_matches) = matches
        .subcommand()
        .ok_or_else(|| "No command provided".to_string())?;

    match sub_name {
        "ping" => Ok(CliAction::Execute(Command::Ping)),
        "devices" => Ok(CliAction::Execute(Command::ListDevices)),
        "capture" => Ok(CliAction::Capture {
            device_id: required(sub_matches, "device")?,
        }),
        "queries" => parse_queries(sub_matches),
        "run" => parse_run(sub_matches),
        other => Err(format!("Unknown command: {}", other)),
    }
}

fn required(matches: &ArgMatches, name: &str) -> Result<String, String> {
    matches
        .get_one::<String>(name)
        .cloned()
        .ok_or_else(|| format!("Missing argument: {}", name))
}

fn job_args(matches: &ArgMatches) -> Result<(TraceId, QueryId), String> {
    let trace_id = TraceId::parse(&required(matches, "trace")?).map_err(|e| e.to_string())?;
    let query_id = QueryId::from(required(matches, "query")?);
    Ok((trace_id, query_id))
}

fn parse_queries(matches: &ArgMatches) -> Result<CliAction, String> {
    let (sub, m) = matches.subcommand().ok_or("No queries subcommand")?;
    match sub {
        "list" => Ok(CliAction::Execute(Command::ListQueries)),
        "add" => Ok(CliAction::Execute(Command::AddQuery {
            name: required(m, "name")?,
            sql: required(m, "sql")?,
        })),
        "del" => Ok(CliAction::Execute(Command::DeleteQuery {
            query_id: QueryId::from(required(m, "query")?),
        })),
        other => Err(format!("Unknown queries subcommand: {}", other)),
    }
}

fn parse_run(matches: &ArgMatches) -> Result<CliAction, String> {
    let (trace_id, query_id) = job_args(matches)?;
    Ok(CliAction::Run {
        trace_id,
        query_id,
        wait: matches.get_one::<u64>("wait").map(|secs| Duration::from_secs(*secs)),
    })
}
