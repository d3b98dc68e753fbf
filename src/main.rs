// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use anyhow::Result;
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

use fidcmark::{cli, commands, config};

fn init_tracing(json: bool) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr);
    if json {
        builder.json().init();
    } else {
        builder.init();
    }
}

fn main() -> Result<()> {
    let cli = cli::build_cli();
    let matches = cli.get_matches();

    init_tracing(matches.get_flag("log_json"));
    let config_path = matches.get_one::<String>("config").map(PathBuf::from);
    let settings = config::load(config_path.as_deref())?;

    match matches.subcommand() {
        Some(("map", sub)) => commands::mapping::handle(sub)?,
        Some(("run", sub)) => commands::run::handle(&settings, sub)?,
        Some(("doctor", sub)) => commands::doctor::handle(sub)?,
        Some(("config", _)) => commands::settings::handle(&settings)?,
        _ => {
            cli::build_cli().print_help()?;
            println!();
        }
    }
    Ok(())
}
