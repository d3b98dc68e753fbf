// Copyright (c) AlphaVelocity.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use crate::models::{AgingBucket, FinalRecord};
use crate::utils::{fmt_money, pretty_table};
use comfy_table::Table;
use rust_decimal::Decimal;
use serde::Serialize;
use std::collections::BTreeMap;

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct BucketSummary {
    pub aging: String,
    pub count: usize,
    pub valor_principal: Decimal,
    pub valor_corrigido: Decimal,
    pub valor_justo: Decimal,
    pub valor_justo_reajustado: Decimal,
}

impl BucketSummary {
    fn add(&mut self, r: &FinalRecord) {
        self.count += 1;
        self.valor_principal += r.mapped().valor_principal;
        self.valor_corrigido += r.corrected.valor_corrigido;
        self.valor_justo += r.valor_justo;
        self.valor_justo_reajustado += r.valor_justo_reajustado;
    }
}

/// One row per bucket present, in bucket order, followed by a total row.
pub fn summarize(records: &[FinalRecord]) -> Vec<BucketSummary> {
    let mut by_bucket: BTreeMap<AgingBucket, BucketSummary> = BTreeMap::new();
    let mut total = BucketSummary {
        aging: "Total".into(),
        ..Default::default()
    };
    for r in records {
        by_bucket
            .entry(r.aging())
            .or_insert_with(|| BucketSummary {
                aging: r.aging().label().to_string(),
                ..Default::default()
            })
            .add(r);
        total.add(r);
    }
    let mut rows: Vec<BucketSummary> = by_bucket.into_values().collect();
    rows.push(total);
    rows
}

pub fn summary_table(rows: &[BucketSummary]) -> Table {
    let data = rows
        .iter()
        .map(|s| {
            vec![
                s.aging.clone(),
                s.count.to_string(),
                fmt_money(&s.valor_principal),
                fmt_money(&s.valor_corrigido),
                fmt_money(&s.valor_justo),
                fmt_money(&s.valor_justo_reajustado),
            ]
        })
        .collect();
    pretty_table(
        &["Aging", "Records", "Principal", "Corrected", "Fair Value", "Adjusted FV"],
        data,
    )
}

pub fn records_table(records: &[FinalRecord]) -> Table {
    let data = records
        .iter()
        .map(|r| {
            let m = r.mapped();
            vec![
                m.empresa.clone(),
                m.contrato.clone(),
                m.data_vencimento.clone(),
                r.corrected.aged.dias_atraso.to_string(),
                r.aging().label().to_string(),
                fmt_money(&m.valor_principal),
                fmt_money(&r.corrected.valor_corrigido),
                format!("{:.4}", r.taxa_recuperacao),
                fmt_money(&r.valor_justo),
                fmt_money(&r.valor_justo_reajustado),
            ]
        })
        .collect();
    pretty_table(
        &[
            "Empresa", "Contrato", "Vencimento", "Dias", "Aging", "Principal", "Corrigido",
            "Taxa Rec.", "Valor Justo", "VJ Reajustado",
        ],
        data,
    )
}
