//! tracelab CLI: capture traces and run cached queries against them.
//!
//! `tracelab [flags] COMMAND` runs one command and exits. Results go to
//! stdout, errors to stderr as `(error) ...` with exit code 1.
//!
//! `capture` and `run` wait for their work to finish before exiting; a job
//! or capture still running at exit would be lost with the process.

mod commands;
mod format;
mod parse;

use std::path::Path;
use std::process;
use std::time::Duration;

use tracelab_core::{Error, JobStatus, QueryId, Result, TraceId};
use tracelab_executor::{LabConfig, Output, TraceLab, TraceLabBuilder};
use tracing_subscriber::EnvFilter;

use commands::build_cli;
use format::{format_error, format_output, OutputMode};
use parse::{matches_to_action, CliAction};

/// Extra time `run` waits past the tracker's deadline, so a timed-out job
/// is reported as failed rather than still processing
const RUN_SLACK: Duration = Duration::from_secs(1);

#[tokio::main]
async fn main() {
    let matches = build_cli().get_matches();
    init_logging(matches.get_count("verbose"));

    let mode = if matches.get_flag("json") {
        OutputMode::Json
    } else {
        OutputMode::Human
    };

    let action = match matches_to_action(&matches) {
        Ok(action) => action,
        Err(e) => {
            eprintln!("(error) {}", e);
            process::exit(2);
        }
    };

    let lab = match open_lab(&matches) {
        Ok(lab) => lab,
        Err(e) => {
            eprintln!("{}", format_error(&e, mode));
            process::exit(1);
        }
    };

    let exit_code = run(&lab, action, mode).await;
    process::exit(exit_code);
}

fn init_logging(verbosity: u8) {
    let default = match verbosity {
        0 => "warn",
        1 => "info",
        _ => "debug",
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn open_lab(matches: &clap::ArgMatches) -> Result<TraceLab> {
    let mut builder = match matches.get_one::<String>("config") {
        Some(path) => TraceLabBuilder::from_config(LabConfig::load(Path::new(path))?),
        None => TraceLab::builder(),
    };
    if let Some(dir) = matches.get_one::<String>("data-dir") {
        builder = builder.data_dir(dir);
    }
    builder.open()
}

async fn run(lab: &TraceLab, action: CliAction, mode: OutputMode) -> i32 {
    match perform(lab, action).await {
        Ok(output) => {
            let finished = match &output {
                Output::Job(view) => view.status == JobStatus::Complete,
                _ => true,
            };
            println!("{}", format_output(&output, mode));
            if finished {
                0
            } else {
                1
            }
        }
        Err(e) => {
            eprintln!("{}", format_error(&e, mode));
            1
        }
    }
}

async fn perform(lab: &TraceLab, action: CliAction) -> Result<Output> {
    match action {
        CliAction::Execute(cmd) => lab.executor().execute(cmd),
        CliAction::Capture { device_id } => {
            let trace_id = lab.capture(&device_id).await?;
            Ok(Output::Captured { trace_id })
        }
        CliAction::Run {
            trace_id,
            query_id,
            wait,
        } => {
            let wait = wait.unwrap_or_else(|| lab.executor().tracker().run_deadline() + RUN_SLACK);
            run_query(lab, &trace_id, &query_id, wait).await
        }
    }
}

async fn run_query(
    lab: &TraceLab,
    trace_id: &TraceId,
    query_id: &QueryId,
    wait: Duration,
) -> Result<Output> {
    let key = lab.executor().tracker().dispatch(trace_id, query_id)?;
    match lab.wait(&key, wait).await {
        Some(job) => Ok(Output::Job(job.into())),
        None => Err(Error::Internal(format!("job {} vanished", key))),
    }
}
