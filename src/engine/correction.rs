// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

//! Monetary correction. Distributor receivables accrue linear late interest
//! on the net amount; partner receivables first add contractual interest,
//! then compound late interest on that balance.

use crate::config::CorrectionParams;
use crate::models::{AgingRecord, CorrectedRecord, EconomicIndex};
use crate::utils::{compound, parse_flexible_date};
use chrono::NaiveDate;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;

const DAYS_PER_MONTH: Decimal = dec!(30);
const AVG_DAYS_PER_MONTH: Decimal = dec!(30.44);

/// Value of the series point closest to `date`. Ties keep the first point
/// seen; an empty series is the identity.
pub fn find_index(indices: &[EconomicIndex], date: NaiveDate) -> Decimal {
    let mut best: Option<(i64, Decimal)> = None;
    for idx in indices {
        let dist = (idx.data - date).num_days().abs();
        match best {
            Some((d, _)) if d <= dist => {}
            _ => best = Some((dist, idx.valor)),
        }
    }
    best.map(|(_, v)| v).unwrap_or(Decimal::ONE)
}

pub struct CorrectionEngine<'a> {
    params: &'a CorrectionParams,
    indices: &'a [EconomicIndex],
    indice_base: Decimal,
}

impl<'a> CorrectionEngine<'a> {
    pub fn new(params: &'a CorrectionParams, indices: &'a [EconomicIndex], data_base: NaiveDate) -> Self {
        Self {
            params,
            indices,
            indice_base: find_index(indices, data_base),
        }
    }

    /// Index ratio between the base date and the due date.
    fn correction_factor(&self, data_vencimento: &str) -> Decimal {
        let Some(due) = parse_flexible_date(data_vencimento) else {
            return Decimal::ONE;
        };
        let indice_vencimento = find_index(self.indices, due);
        if indice_vencimento.is_zero() {
            return Decimal::ONE;
        }
        self.indice_base / indice_vencimento
    }

    pub fn correct_standard(&self, aged: AgingRecord) -> CorrectedRecord {
        let p = self.params;
        let r = &aged.record;
        let valor_liquido = (r.valor_principal - r.valor_nao_cedido - r.valor_terceiro - r.valor_cip)
            .max(Decimal::ZERO);

        let (multa, juros_moratorios, fator_correcao, correcao_monetaria) = if aged.dias_atraso > 0 {
            let multa = valor_liquido * p.taxa_multa;
            let juros = valor_liquido * p.taxa_juros_mensal * (Decimal::from(aged.dias_atraso) / DAYS_PER_MONTH);
            let fator = self.correction_factor(&r.data_vencimento);
            let correcao = (valor_liquido * (fator - Decimal::ONE)).max(Decimal::ZERO);
            (multa, juros, fator, correcao)
        } else {
            (Decimal::ZERO, Decimal::ZERO, Decimal::ONE, Decimal::ZERO)
        };

        let valor_corrigido = valor_liquido + multa + juros_moratorios + correcao_monetaria;
        CorrectedRecord {
            aged,
            valor_liquido,
            multa,
            juros_moratorios,
            fator_correcao,
            correcao_monetaria,
            valor_corrigido,
            juros_remuneratorios: None,
            saldo_devedor_vencimento: None,
            saldo_corrigido_igpm: None,
        }
    }

    pub fn correct_partner(&self, aged: AgingRecord) -> CorrectedRecord {
        let p = self.params;
        let valor_liquido = aged.record.valor_principal;
        let juros_remuneratorios = valor_liquido * p.taxa_juros_remuneratorios;
        let saldo_devedor_vencimento = valor_liquido + juros_remuneratorios;

        let overdue = aged.dias_atraso > 0;
        let (fator_correcao, correcao_monetaria, saldo_corrigido_igpm) = if overdue {
            let fator = self.correction_factor(&aged.record.data_vencimento);
            let correcao = saldo_devedor_vencimento * (fator - Decimal::ONE);
            (fator, correcao, saldo_devedor_vencimento + correcao)
        } else {
            (Decimal::ONE, Decimal::ZERO, saldo_devedor_vencimento)
        };

        // Penalty and late interest run on the balance before index correction.
        let (multa, juros_moratorios) = if overdue {
            let months = Decimal::from(aged.dias_atraso) / AVG_DAYS_PER_MONTH;
            let growth = compound(Decimal::ONE + p.taxa_juros_mensal, months) - Decimal::ONE;
            (
                saldo_devedor_vencimento * p.taxa_multa,
                saldo_devedor_vencimento * growth,
            )
        } else {
            (Decimal::ZERO, Decimal::ZERO)
        };

        let valor_corrigido = saldo_corrigido_igpm + multa + juros_moratorios;
        CorrectedRecord {
            aged,
            valor_liquido,
            multa,
            juros_moratorios,
            fator_correcao,
            correcao_monetaria,
            valor_corrigido,
            juros_remuneratorios: Some(juros_remuneratorios),
            saldo_devedor_vencimento: Some(saldo_devedor_vencimento),
            saldo_corrigido_igpm: Some(saldo_corrigido_igpm),
        }
    }

    pub fn process_standard(&self, records: Vec<AgingRecord>) -> Vec<CorrectedRecord> {
        records.into_iter().map(|r| self.correct_standard(r)).collect()
    }

    pub fn process_partner(&self, records: Vec<AgingRecord>) -> Vec<CorrectedRecord> {
        records.into_iter().map(|r| self.correct_partner(r)).collect()
    }
}
