// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use crate::commands::importer::read_source;
use crate::engine::mapper::{self, FieldMapping, TargetField};
use crate::utils::{maybe_print_json, pretty_table};
use anyhow::Result;
use serde::Serialize;

#[derive(Debug, Serialize)]
pub struct MappingReport {
    pub source: String,
    pub mapping: FieldMapping,
    pub confidence: u8,
    pub missing_required: Vec<TargetField>,
    pub unmapped_columns: Vec<String>,
}

pub fn inspect(path: &str, is_partner: bool) -> Result<MappingReport> {
    let src = read_source(path, is_partner)?;
    let mapping = mapper::auto_map(src.columns.as_slice());
    let unmapped_columns = src
        .columns
        .iter()
        .filter(|c| !mapping.values().any(|v| v == *c))
        .cloned()
        .collect();
    Ok(MappingReport {
        source: src.name,
        confidence: mapper::confidence(&mapping),
        missing_required: mapper::missing_required(&mapping),
        mapping,
        unmapped_columns,
    })
}

pub fn handle(sub: &clap::ArgMatches) -> Result<()> {
    let path = sub.get_one::<String>("input").unwrap().trim();
    let report = inspect(path, sub.get_flag("partner"))?;
    if maybe_print_json(sub.get_flag("json"), false, &report)? {
        return Ok(());
    }

    let rows = TargetField::ALL
        .iter()
        .map(|f| {
            let required = if TargetField::REQUIRED.contains(f) { "yes" } else { "" };
            vec![
                f.name().to_string(),
                report.mapping.get(f).cloned().unwrap_or_else(|| "-".into()),
                required.to_string(),
            ]
        })
        .collect();
    println!("{}", pretty_table(&["Field", "Source column", "Required"], rows));
    println!("Confidence: {}%", report.confidence);
    if !report.missing_required.is_empty() {
        let names: Vec<&str> = report.missing_required.iter().map(|f| f.name()).collect();
        println!("Missing required: {}", names.join(", "));
    }
    if !report.unmapped_columns.is_empty() {
        println!("Unused columns: {}", report.unmapped_columns.join(", "));
    }
    Ok(())
}
