// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use anyhow::{Context, Result};
use chrono::{NaiveDate, NaiveDateTime};
use comfy_table::{Cell, Table, presets::UTF8_FULL};
use once_cell::sync::Lazy;
use regex::Regex;
use rust_decimal::{Decimal, MathematicalOps};
use std::time::Duration;
use tracing::warn;

const UA: &str = concat!(
    "fidcmark/",
    env!("CARGO_PKG_VERSION"),
    " (+https://github.com/alphavelocity/fidcmark)"
);

static NUMERIC_NOISE: Lazy<Regex> = Lazy::new(|| Regex::new(r"[^0-9,.\-]").unwrap());
static SEPARATOR_RUN: Lazy<Regex> = Lazy::new(|| Regex::new(r"[\s\-_]+").unwrap());

const DATE_FORMATS: [&str; 4] = ["%Y-%m-%d", "%d/%m/%Y", "%d-%m-%Y", "%Y/%m/%d"];

pub fn http_client(timeout_secs: u64) -> reqwest::Result<reqwest::blocking::Client> {
    reqwest::blocking::Client::builder()
        .timeout(Duration::from_secs(timeout_secs))
        .user_agent(UA)
        .build()
}

pub fn parse_date(s: &str) -> Result<NaiveDate> {
    NaiveDate::parse_from_str(s, "%Y-%m-%d")
        .with_context(|| format!("Invalid date '{}', expected YYYY-MM-DD", s))
}

pub fn parse_decimal(s: &str) -> Result<Decimal> {
    s.parse::<Decimal>()
        .with_context(|| format!("Invalid decimal '{}'", s))
}

/// Lenient date parsing for spreadsheet cells. Accepts ISO dates (optionally
/// with a time part) and the day-first forms used by Brazilian exports.
pub fn parse_flexible_date(s: &str) -> Option<NaiveDate> {
    let s = s.trim();
    if s.is_empty() {
        return None;
    }
    for fmt in DATE_FORMATS {
        if let Ok(d) = NaiveDate::parse_from_str(s, fmt) {
            return Some(d);
        }
    }
    for fmt in ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M:%S%.f"] {
        if let Ok(dt) = NaiveDateTime::parse_from_str(s, fmt) {
            return Some(dt.date());
        }
    }
    // 2024-01-15T00:00:00.000Z and friends
    if s.len() > 10 && s.is_char_boundary(10) && s.as_bytes()[10] == b'T' {
        return NaiveDate::parse_from_str(&s[..10], "%Y-%m-%d").ok();
    }
    None
}

/// Month-granular dates (`YYYY-MM`, `MM/YYYY`) resolve to the first day.
pub fn parse_month_or_date(s: &str) -> Option<NaiveDate> {
    let s = s.trim();
    parse_flexible_date(s)
        .or_else(|| NaiveDate::parse_from_str(&format!("{}-01", s), "%Y-%m-%d").ok())
        .or_else(|| NaiveDate::parse_from_str(&format!("01/{}", s), "%d/%m/%Y").ok())
}

/// Coerces a spreadsheet cell into a number. Everything except digits,
/// comma, dot and minus is dropped; a comma is the decimal separator (dots
/// are then thousands separators). Anything still unparseable is zero.
pub fn coerce_number(raw: &str) -> Decimal {
    let cleaned = NUMERIC_NOISE.replace_all(raw, "");
    let normalized = if cleaned.contains(',') {
        cleaned.replace('.', "").replace(',', ".")
    } else {
        cleaned.into_owned()
    };
    normalized.parse::<Decimal>().unwrap_or(Decimal::ZERO)
}

/// Lowercases, trims and collapses whitespace/hyphen/underscore runs to `_`.
pub fn normalize_column(name: &str) -> String {
    let lower = name.trim().to_lowercase();
    SEPARATOR_RUN
        .replace_all(&lower, "_")
        .trim_matches('_')
        .to_string()
}

/// `base^exp` for a positive base; anything the decimal maths cannot
/// represent collapses to one (logged, `doctor` flags the due dates that get
/// there).
pub fn compound(base: Decimal, exp: Decimal) -> Decimal {
    if exp.is_zero() || base == Decimal::ONE || base <= Decimal::ZERO {
        return Decimal::ONE;
    }
    match base.checked_powd(exp) {
        Some(v) => v,
        None => {
            warn!(%base, %exp, "power overflows decimal range, using 1");
            Decimal::ONE
        }
    }
}

pub fn fmt_money(d: &Decimal) -> String {
    format!("{:.2}", d.round_dp(2))
}

pub fn pretty_table(headers: &[&str], rows: Vec<Vec<String>>) -> Table {
    let mut t = Table::new();
    t.load_preset(UTF8_FULL);
    t.set_header(headers.iter().map(|h| Cell::new(*h)));
    for r in rows {
        t.add_row(r.into_iter().map(Cell::new));
    }
    t
}

pub fn maybe_print_json<T: serde::Serialize>(
    json_flag: bool,
    jsonl_flag: bool,
    v: &T,
) -> Result<bool> {
    if json_flag {
        println!("{}", serde_json::to_string_pretty(v)?);
        return Ok(true);
    }
    if jsonl_flag {
        // If v is an array, stream each element; else stream single line
        let val = serde_json::to_value(v)?;
        if let Some(arr) = val.as_array() {
            for item in arr {
                println!("{}", serde_json::to_string(item)?);
            }
        } else {
            println!("{}", serde_json::to_string(&val)?);
        }
        return Ok(true);
    }
    Ok(false)
}
