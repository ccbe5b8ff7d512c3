//! clap command tree

use clap::{value_parser, Arg, ArgAction, Command};

/// Build the `tracelab` command tree.
pub fn build_cli() -> Command {
    Command::new("tracelab")
        .version(env!("CARGO_PKG_VERSION"))
        .about("Capture performance traces and run cached SQL queries against them")
        .subcommand_required(true)
        .arg_required_else_help(true)
        .arg(
            Arg::new("config")
                .long("config")
                .short('c')
                .global(true)
                .help("TOML configuration file"),
        )
        .arg(
            Arg::new("data-dir")
                .long("data-dir")
                .global(true)
                .help("Data directory (overrides the config file)"),
        )
        .arg(
            Arg::new("json")
                .long("json")
                .global(true)
                .action(ArgAction::SetTrue)
                .help("Print output as JSON"),
        )
        .arg(
            Arg::new("verbose")
                .long("verbose")
                .short('v')
                .global(true)
                .action(ArgAction::Count)
                .help("Log more (-v info, -vv debug); RUST_LOG takes precedence"),
        )
        .subcommand(Command::new("ping").about("Check the lab opens"))
        .subcommand(Command::new("devices").about("List connected devices"))
        .subcommand(
            Command::new("capture")
                .about("Capture a trace from a device and print its id")
                .arg(Arg::new("device").required(true).help("Device serial")),
        )
        .subcommand(
            Command::new("queries")
                .about("Manage named queries")
                .subcommand_required(true)
                .subcommand(Command::new("list").about("List predefined and custom queries"))
                .subcommand(
                    Command::new("add")
                        .about("Save a custom query")
                        .arg(Arg::new("name").required(true).help("Display name"))
                        .arg(Arg::new("sql").required(true).help("SQL text")),
                )
                .subcommand(
                    Command::new("del")
                        .about("Delete a custom query")
                        .arg(Arg::new("query").required(true).help("Query id")),
                ),
        )
        .subcommand(
            Command::new("run")
                .about("Run a query against a trace and print the result")
                .arg(Arg::new("trace").required(true).help("Trace id"))
                .arg(Arg::new("query").required(true).help("Query id"))
                .arg(
                    Arg::new("wait")
                        .long("wait")
                        .short('w')
                        .value_name("SECS")
                        .value_parser(value_parser!(u64))
                        .help("Wait up to SECS seconds for the result (default: the engine deadline)"),
                ),
        )
}
