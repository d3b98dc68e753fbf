// Copyright (c) AlphaVelocity.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use crate::commands::importer::{self, RunInputs};
use crate::engine::aging;
use crate::models::{RateCategory, RecoveryRate};
use crate::utils::{maybe_print_json, parse_flexible_date, pretty_table};
use anyhow::Result;
use serde::Serialize;
use std::collections::BTreeSet;

/// Due dates further than this from the position date are almost certainly
/// typos; compounding over them leaves the decimal range.
const MAX_PLAUSIBLE_DAYS: i64 = 36_500;

#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Serialize)]
pub struct Issue {
    pub kind: &'static str,
    pub detail: String,
}

impl Issue {
    fn new(kind: &'static str, detail: impl Into<String>) -> Self {
        Self {
            kind,
            detail: detail.into(),
        }
    }
}

fn company_match<'a>(
    rates: &'a [RecoveryRate],
    empresa: &str,
    category: RateCategory,
) -> Vec<&'a RecoveryRate> {
    let empresa = empresa.to_uppercase();
    rates
        .iter()
        .filter(|r| r.empresa.to_uppercase() == empresa && r.aging == category)
        .collect()
}

/// Reference-data gaps that make the pipeline fall back to defaults.
pub fn diagnose(inputs: &RunInputs) -> Vec<Issue> {
    let mut issues = Vec::new();

    if inputs.indices.is_empty() {
        issues.push(Issue::new(
            "no_index_series",
            "monetary correction factor is 1 for every record",
        ));
    } else if inputs.indices.len() < 13 {
        issues.push(Issue::new(
            "short_index_series",
            format!("{} points, 13 needed; monthly IPCA defaults to 0.4%", inputs.indices.len()),
        ));
    }
    if inputs.di_pre_rates.is_empty() {
        issues.push(Issue::new("no_di_pre_curve", "annual DI-PRE defaults to 12%"));
    }

    let mut lookups = BTreeSet::new();
    for r in &inputs.records {
        if !r.data_vencimento.is_empty() && parse_flexible_date(&r.data_vencimento).is_none() {
            issues.push(Issue::new(
                "unreadable_due_date",
                format!("{} contract '{}': '{}'", r.base_origem, r.contrato, r.data_vencimento),
            ));
        }
        let days = aging::days_overdue(&r.data_vencimento, &r.data_base);
        if days.abs() > MAX_PLAUSIBLE_DAYS {
            issues.push(Issue::new(
                "implausible_due_date",
                format!(
                    "{} contract '{}': '{}' is {} days from the position date",
                    r.base_origem, r.contrato, r.data_vencimento, days
                ),
            ));
        }
        if !r.is_partner() {
            let category = aging::bucket_to_rate_category(aging::classify_bucket(days));
            lookups.insert((r.empresa.to_uppercase(), r.tipo.to_lowercase(), category));
        }
    }

    for (empresa, tipo, category) in lookups {
        let candidates = company_match(&inputs.recovery_rates, &empresa, category);
        if candidates.is_empty() {
            issues.push(Issue::new(
                "no_recovery_rate",
                format!("{} / {} / {}: recovery 0, 6 months", empresa, tipo, category),
            ));
        } else if !candidates.iter().any(|c| c.tipo.to_lowercase() == tipo) {
            issues.push(Issue::new(
                "recovery_company_fallback",
                format!("{} / {} / {}: using company-wide rate", empresa, tipo, category),
            ));
        }
    }
    issues
}

pub fn handle(sub: &clap::ArgMatches) -> Result<()> {
    let inputs = importer::gather(sub)?;
    let issues = diagnose(&inputs);
    if maybe_print_json(sub.get_flag("json"), false, &issues)? {
        return Ok(());
    }
    if issues.is_empty() {
        println!("✅ doctor: no issues found");
    } else {
        let rows = issues
            .into_iter()
            .map(|i| vec![i.kind.to_string(), i.detail])
            .collect();
        println!("{}", pretty_table(&["Issue", "Detail"], rows));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{MappedRecord, PARTNER_NAME};
    use chrono::NaiveDate;
    use rust_decimal::Decimal;
    use rust_decimal_macros::dec;

    fn rec(empresa: &str, tipo: &str, due: &str) -> MappedRecord {
        MappedRecord {
            empresa: empresa.into(),
            tipo: tipo.into(),
            status: String::new(),
            situacao: String::new(),
            nome_cliente: String::new(),
            documento: String::new(),
            classe: String::new(),
            contrato: "1".into(),
            valor_principal: dec!(10),
            valor_nao_cedido: Decimal::ZERO,
            valor_terceiro: Decimal::ZERO,
            valor_cip: Decimal::ZERO,
            data_vencimento: due.into(),
            data_base: "2024-06-30".into(),
            base_origem: "src.csv".into(),
        }
    }

    #[test]
    fn reports_fallbacks_and_defaults() {
        let inputs = RunInputs {
            records: vec![
                rec("CEMIG", "Residencial", "2024-06-01"),
                rec("CEMIG", "Rural", "2024-06-01"),
                rec("COPEL", "Residencial", "2024-06-01"),
                rec("CEMIG", "Residencial", "amanhã"),
                rec(PARTNER_NAME, "Outros", "2020-01-01"),
            ],
            indices: vec![],
            recovery_rates: vec![RecoveryRate {
                empresa: "Cemig".into(),
                tipo: "residencial".into(),
                aging: RateCategory::PrimeiroAno,
                taxa_recuperacao: dec!(0.5),
                prazo_recebimento: dec!(6),
            }],
            di_pre_rates: vec![],
            data_base: NaiveDate::from_ymd_opt(2024, 6, 30).unwrap(),
        };
        let kinds: Vec<&str> = diagnose(&inputs).iter().map(|i| i.kind).collect();
        assert!(kinds.contains(&"no_index_series"));
        assert!(kinds.contains(&"no_di_pre_curve"));
        assert!(kinds.contains(&"unreadable_due_date"));
        assert!(kinds.contains(&"recovery_company_fallback")); // CEMIG / rural
        // COPEL primeiro ano, CEMIG a vencer (bad date)
        assert_eq!(kinds.iter().filter(|k| **k == "no_recovery_rate").count(), 2);
        assert!(!kinds.contains(&"implausible_due_date"));
    }

    #[test]
    fn flags_due_dates_centuries_away() {
        let inputs = RunInputs {
            records: vec![
                rec(PARTNER_NAME, "Outros", "01/01/0001"),
                rec("CEMIG", "Residencial", "2024-06-01"),
            ],
            indices: vec![],
            recovery_rates: vec![],
            di_pre_rates: vec![],
            data_base: NaiveDate::from_ymd_opt(2024, 6, 30).unwrap(),
        };
        let flagged: Vec<Issue> = diagnose(&inputs)
            .into_iter()
            .filter(|i| i.kind == "implausible_due_date")
            .collect();
        assert_eq!(flagged.len(), 1);
        assert!(flagged[0].detail.contains("01/01/0001"));
    }
}
