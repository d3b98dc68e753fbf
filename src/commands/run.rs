// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use crate::commands::{importer, reports};
use crate::config::Settings;
use crate::engine::computer_for;
use crate::engine::pipeline::{PipelineInput, ProgressEvent};
use crate::models::FinalRecord;
use crate::utils::{maybe_print_json, parse_decimal};
use anyhow::{Context, Result};

pub fn handle(settings: &Settings, sub: &clap::ArgMatches) -> Result<()> {
    let json_flag = sub.get_flag("json");
    let jsonl_flag = sub.get_flag("jsonl");
    let quiet = sub.get_flag("quiet") || json_flag || jsonl_flag;

    let records = execute(settings, sub, |e| {
        if quiet {
            return;
        }
        match &e.details {
            Some(d) => eprintln!("[{:>3}%] {:?}: {} ({})", e.progress, e.step, e.message, d),
            None => eprintln!("[{:>3}%] {:?}: {}", e.progress, e.step, e.message),
        }
    })?;

    if sub.get_flag("records") {
        if !maybe_print_json(json_flag, jsonl_flag, &records)? {
            println!("{}", reports::records_table(&records));
        }
    } else {
        let summary = reports::summarize(&records);
        if !maybe_print_json(json_flag, jsonl_flag, &summary)? {
            println!("{}", reports::summary_table(&summary));
        }
    }
    Ok(())
}

/// Loads inputs, applies flag overrides and runs the configured engine.
pub fn execute<F>(settings: &Settings, sub: &clap::ArgMatches, mut on_progress: F) -> Result<Vec<FinalRecord>>
where
    F: FnMut(ProgressEvent),
{
    let mut settings = settings.clone();
    if let Some(raw) = sub.get_one::<String>("spread") {
        settings.fair_value.spread_percent = parse_decimal(raw.trim())?;
    }
    if let Some(h) = sub.get_one::<i64>("horizon") {
        settings.fair_value.prazo_horizonte = *h;
    }

    let inputs = importer::gather(sub)?;
    let input = PipelineInput {
        records: inputs.records,
        indices: inputs.indices,
        recovery_rates: inputs.recovery_rates,
        di_pre_rates: inputs.di_pre_rates,
        data_base: inputs.data_base,
        spread_percent: settings.fair_value.spread_percent,
    };

    let computer = computer_for(&settings)?;
    computer
        .compute(&input, &mut |e: ProgressEvent| on_progress(e))
        .context("Fair-value run failed")
}
