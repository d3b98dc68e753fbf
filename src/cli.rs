// Copyright (c) AlphaVelocity.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use clap::{Arg, ArgAction, Command, arg, crate_version, value_parser};

/// Receivable sources, reference tables and run parameters shared by `run` and `doctor`.
fn with_inputs(cmd: Command) -> Command {
    cmd.arg(
        arg!(--input <PATH> "Receivables CSV (repeatable)")
            .required(true)
            .action(ArgAction::Append),
    )
    .arg(
        Arg::new("partner_input")
            .long("partner-input")
            .value_name("PATH")
            .help("Partner (VOLTZ) receivables CSV (repeatable)")
            .action(ArgAction::Append),
    )
    .arg(arg!(--indices <PATH> "IGP-M index series CSV"))
    .arg(arg!(--recovery <PATH> "Recovery rate table CSV"))
    .arg(
        Arg::new("di_pre")
            .long("di-pre")
            .value_name("PATH")
            .help("DI-PRE curve CSV"),
    )
    .arg(
        Arg::new("data_base")
            .long("data-base")
            .value_name("YYYY-MM-DD")
            .help("Position date (defaults to today)"),
    )
    .arg(arg!(--spread <RATE> "Annual credit spread, e.g. 0.025"))
    .arg(arg!(--horizon <MONTHS> "Fair-value horizon in months").value_parser(value_parser!(i64)))
}

pub fn build_cli() -> Command {
    Command::new("fidcmark")
        .version(crate_version!())
        .about("Fair-value marking of FIDC receivable portfolios")
        .arg(arg!(--config <PATH> "Settings file (TOML)").global(true))
        .arg(
            Arg::new("log_json")
                .long("log-json")
                .help("Emit logs as JSON lines")
                .action(ArgAction::SetTrue)
                .global(true),
        )
        .subcommand(
            Command::new("map")
                .about("Show how a source file's columns map onto receivable fields")
                .arg(arg!(--input <PATH> "Receivables CSV").required(true))
                .arg(arg!(--partner "Treat the file as a partner (VOLTZ) source"))
                .arg(arg!(--json "Output JSON")),
        )
        .subcommand(
            with_inputs(Command::new("run").about("Age, correct and fair-value a portfolio"))
                .arg(arg!(--records "Print every record instead of the bucket summary"))
                .arg(arg!(--json "Output JSON"))
                .arg(arg!(--jsonl "Output JSON Lines"))
                .arg(arg!(--quiet "Suppress progress on stderr")),
        )
        .subcommand(
            with_inputs(Command::new("doctor").about("Report reference-data gaps that trigger defaults"))
                .arg(arg!(--json "Output JSON")),
        )
        .subcommand(Command::new("config").about("Print effective settings as TOML"))
}
