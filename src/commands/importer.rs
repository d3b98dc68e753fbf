// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

//! CSV stand-ins for the ingestion layer: receivable sources and the three
//! reference tables.

use crate::engine::mapper::{self, ApplyOptions};
use crate::models::{
    DiPreRate, EconomicIndex, MappedRecord, RateCategory, RawRow, RecoveryRate, SourceTable,
};
use crate::utils::{coerce_number, normalize_column, parse_date, parse_month_or_date};
use anyhow::{Context, Result, anyhow};
use chrono::{NaiveDate, Utc};
use csv::{ReaderBuilder, StringRecord};
use rust_decimal::Decimal;
use rust_decimal::prelude::ToPrimitive;
use std::fs;
use std::path::Path;
use tracing::{debug, warn};

/// Everything `run` and `doctor` need, loaded from the command line.
#[derive(Debug, Clone)]
pub struct RunInputs {
    pub records: Vec<MappedRecord>,
    pub indices: Vec<EconomicIndex>,
    pub recovery_rates: Vec<RecoveryRate>,
    pub di_pre_rates: Vec<DiPreRate>,
    pub data_base: NaiveDate,
}

fn sniff_delimiter(text: &str) -> u8 {
    let header = text.lines().next().unwrap_or("");
    if header.matches(';').count() > header.matches(',').count() {
        b';'
    } else {
        b','
    }
}

fn read_csv(path: &str) -> Result<(Vec<String>, Vec<StringRecord>)> {
    let text = fs::read_to_string(path).with_context(|| format!("Open CSV {}", path))?;
    let text = text.trim_start_matches('\u{feff}');
    let mut rdr = ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .delimiter(sniff_delimiter(text))
        .from_reader(text.as_bytes());
    let headers: Vec<String> = rdr
        .headers()
        .with_context(|| format!("Read header of {}", path))?
        .iter()
        .map(|h| h.trim().to_string())
        .collect();
    let mut rows = Vec::new();
    for result in rdr.records() {
        let rec = result.with_context(|| format!("Read row of {}", path))?;
        if rec.iter().all(|c| c.trim().is_empty()) {
            continue;
        }
        rows.push(rec);
    }
    Ok((headers, rows))
}

pub fn read_source(path: &str, is_partner: bool) -> Result<SourceTable> {
    let (columns, records) = read_csv(path)?;
    let rows: Vec<RawRow> = records
        .iter()
        .map(|rec| {
            columns
                .iter()
                .zip(rec.iter())
                .map(|(h, v)| (h.clone(), v.to_string()))
                .collect()
        })
        .collect();
    let name = Path::new(path)
        .file_name()
        .map(|n| n.to_string_lossy().to_string())
        .unwrap_or_else(|| path.to_string());
    debug!(source = %name, rows = rows.len(), is_partner, "source loaded");
    Ok(SourceTable {
        name,
        columns,
        rows,
        is_partner,
    })
}

/// Position of the first header matching any of `names`, after normalization.
fn column(headers: &[String], names: &[&str]) -> Option<usize> {
    let normalized: Vec<String> = headers.iter().map(|h| normalize_column(h)).collect();
    names
        .iter()
        .find_map(|n| normalized.iter().position(|h| h == n))
}

fn require(headers: &[String], names: &[&str], path: &str) -> Result<usize> {
    column(headers, names).ok_or_else(|| {
        anyhow!(
            "{}: missing column '{}' (found: {})",
            path,
            names[0],
            headers.join(", ")
        )
    })
}

fn cell(rec: &StringRecord, idx: usize) -> &str {
    rec.get(idx).unwrap_or("").trim()
}

pub fn load_indices(path: &str) -> Result<Vec<EconomicIndex>> {
    let (headers, rows) = read_csv(path)?;
    let date_col = require(&headers, &["data", "date", "mes", "competencia"], path)?;
    let value_col = require(&headers, &["valor", "value", "indice", "numero_indice"], path)?;
    let mut out = Vec::with_capacity(rows.len());
    for rec in &rows {
        let raw = cell(rec, date_col);
        match parse_month_or_date(raw) {
            Some(data) => out.push(EconomicIndex {
                data,
                valor: coerce_number(cell(rec, value_col)),
            }),
            None => warn!(path, date = raw, "skipping index row with unreadable date"),
        }
    }
    Ok(out)
}

pub fn load_recovery_rates(path: &str) -> Result<Vec<RecoveryRate>> {
    let (headers, rows) = read_csv(path)?;
    let empresa_col = require(&headers, &["empresa", "distribuidora"], path)?;
    let tipo_col = column(&headers, &["tipo", "tipo_cliente"]);
    let aging_col = require(&headers, &["aging", "faixa", "categoria", "aging_taxa"], path)?;
    let taxa_col = require(&headers, &["taxa_recuperacao", "taxa", "recuperacao"], path)?;
    let prazo_col = require(&headers, &["prazo_recebimento", "prazo", "meses"], path)?;

    let mut out = Vec::with_capacity(rows.len());
    for rec in &rows {
        let raw_category = cell(rec, aging_col);
        let aging = match raw_category.parse::<RateCategory>() {
            Ok(c) => c,
            Err(e) => {
                warn!(path, "skipping recovery row: {e}");
                continue;
            }
        };
        let mut taxa = coerce_number(cell(rec, taxa_col));
        if taxa > Decimal::ONE {
            taxa /= Decimal::ONE_HUNDRED;
        }
        out.push(RecoveryRate {
            empresa: cell(rec, empresa_col).to_string(),
            tipo: tipo_col.map(|c| cell(rec, c).to_string()).unwrap_or_default(),
            aging,
            taxa_recuperacao: taxa,
            prazo_recebimento: coerce_number(cell(rec, prazo_col)),
        });
    }
    Ok(out)
}

pub fn load_di_pre(path: &str) -> Result<Vec<DiPreRate>> {
    let (headers, rows) = read_csv(path)?;
    let dias_col = require(&headers, &["dias_corridos", "dias", "prazo_dias"], path)?;
    let t252_col = require(&headers, &["taxa_252", "252"], path)?;
    let t360_col = column(&headers, &["taxa_360", "360"]);
    let mut out = Vec::with_capacity(rows.len());
    for rec in &rows {
        let raw = cell(rec, dias_col);
        let Some(dias) = whole_days(raw) else {
            warn!(path, dias = raw, "skipping DI-PRE row with unreadable day count");
            continue;
        };
        out.push(DiPreRate::new(
            dias,
            coerce_number(cell(rec, t252_col)),
            t360_col
                .map(|c| coerce_number(cell(rec, c)))
                .unwrap_or(Decimal::ZERO),
        ));
    }
    Ok(out)
}

/// Plain integers, or spreadsheet numbers with a zero fraction (`90,0`).
fn whole_days(raw: &str) -> Option<i64> {
    if let Ok(d) = raw.parse::<i64>() {
        return Some(d);
    }
    if !raw.chars().any(|c| c.is_ascii_digit()) {
        return None;
    }
    let n = coerce_number(raw);
    if n.fract().is_zero() { n.to_i64() } else { None }
}

/// Maps every source file with its own auto-mapping and concatenates the
/// resulting records in argument order.
pub fn map_sources(sources: &[SourceTable], data_base: NaiveDate) -> Vec<MappedRecord> {
    let mut out = Vec::new();
    for src in sources {
        let mapping = mapper::auto_map(src.columns.as_slice());
        let missing = mapper::missing_required(&mapping);
        if !missing.is_empty() {
            let names: Vec<&str> = missing.iter().map(|f| f.name()).collect();
            warn!(source = %src.name, missing = %names.join(","), "required fields unmapped");
        }
        let opts = ApplyOptions {
            data_base,
            base_origem: src.name.clone(),
            is_partner: src.is_partner,
        };
        out.extend(mapper::apply(&src.rows, &mapping, &opts));
    }
    out
}

pub fn gather(sub: &clap::ArgMatches) -> Result<RunInputs> {
    let data_base = match sub.get_one::<String>("data_base") {
        Some(raw) => parse_date(raw.trim())?,
        None => Utc::now().date_naive(),
    };

    let mut sources = Vec::new();
    for path in sub.get_many::<String>("input").into_iter().flatten() {
        sources.push(read_source(path.trim(), false)?);
    }
    for path in sub.get_many::<String>("partner_input").into_iter().flatten() {
        sources.push(read_source(path.trim(), true)?);
    }

    let indices = match sub.get_one::<String>("indices") {
        Some(p) => load_indices(p.trim())?,
        None => Vec::new(),
    };
    let recovery_rates = match sub.get_one::<String>("recovery") {
        Some(p) => load_recovery_rates(p.trim())?,
        None => Vec::new(),
    };
    let di_pre_rates = match sub.get_one::<String>("di_pre") {
        Some(p) => load_di_pre(p.trim())?,
        None => Vec::new(),
    };

    Ok(RunInputs {
        records: map_sources(&sources, data_base),
        indices,
        recovery_rates,
        di_pre_rates,
        data_base,
    })
}
