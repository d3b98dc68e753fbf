// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

//! Fair value: recovery-weighted corrected value, grown by expected
//! inflation until receipt and discounted at DI-PRE plus spread, then
//! haircut by the aging remuneration discount.

use crate::config::FairValueParams;
use crate::models::{
    AgingBucket, CorrectedRecord, DiPreRate, EconomicIndex, FinalRecord, RateCategory, RecoveryRate,
};
use crate::utils::compound;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;

pub const DEFAULT_DI_PRE_ANUAL: Decimal = dec!(0.12);
pub const DEFAULT_IPCA_MENSAL: Decimal = dec!(0.004);
const MORA_POR_MES: Decimal = dec!(0.01);
const IPCA_WINDOW: usize = 13;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Recovery {
    pub taxa: Decimal,
    pub prazo: Decimal, // months
}

const PARTNER_RECOVERY_DEFAULT: Recovery = Recovery { taxa: dec!(0.15), prazo: dec!(36) };
const NO_RECOVERY: Recovery = Recovery { taxa: dec!(0), prazo: dec!(6) };

/// Contractual recovery curve for the partner's receivables.
const PARTNER_RECOVERY: [(RateCategory, Recovery); 7] = [
    (RateCategory::AVencer, Recovery { taxa: dec!(0.90), prazo: dec!(3) }),
    (RateCategory::PrimeiroAno, Recovery { taxa: dec!(0.65), prazo: dec!(6) }),
    (RateCategory::SegundoAno, Recovery { taxa: dec!(0.45), prazo: dec!(12) }),
    (RateCategory::TerceiroAno, Recovery { taxa: dec!(0.30), prazo: dec!(18) }),
    (RateCategory::QuartoAno, Recovery { taxa: dec!(0.22), prazo: dec!(24) }),
    (RateCategory::QuintoAno, Recovery { taxa: dec!(0.18), prazo: dec!(30) }),
    (RateCategory::DemaisAnos, Recovery { taxa: dec!(0.15), prazo: dec!(36) }),
];

/// Remuneration haircut per fine-grained aging bucket.
pub fn remuneration_discount(bucket: AgingBucket) -> Decimal {
    match bucket {
        AgingBucket::NotDue => dec!(0.065),
        AgingBucket::Days1To30 => dec!(0.065),
        AgingBucket::Days31To59 => dec!(0.08),
        AgingBucket::Days60To89 => dec!(0.10),
        AgingBucket::Days90To119 => dec!(0.15),
        AgingBucket::Days120To359 => dec!(0.22),
        AgingBucket::Days360To719 => dec!(0.30),
        AgingBucket::Days720To1080 => dec!(0.40),
        AgingBucket::Over1080 => dec!(0.50),
    }
}

/// Annual DI-PRE rate (as a fraction) at the vertex nearest the horizon.
pub fn di_pre_anual(rates: &[DiPreRate], prazo_horizonte: i64) -> Decimal {
    if let Some(exact) = rates.iter().find(|r| r.meses_futuros == prazo_horizonte) {
        return exact.taxa_252 / Decimal::ONE_HUNDRED;
    }
    let mut best: Option<(i64, &DiPreRate)> = None;
    for r in rates {
        let dist = (r.meses_futuros - prazo_horizonte).abs();
        match best {
            Some((d, _)) if d <= dist => {}
            _ => best = Some((dist, r)),
        }
    }
    best.map(|(_, r)| r.taxa_252 / Decimal::ONE_HUNDRED)
        .unwrap_or(DEFAULT_DI_PRE_ANUAL)
}

/// Curve and spread are compounded together before going monthly.
pub fn monthly_discount_rate(di_pre_anual: Decimal, spread_percent: Decimal) -> Decimal {
    let annual = (Decimal::ONE + di_pre_anual) * (Decimal::ONE + spread_percent);
    compound(annual, Decimal::ONE / dec!(12)) - Decimal::ONE
}

/// Monthly inflation implied by the last twelve months of the series.
pub fn ipca_mensal(indices: &[EconomicIndex]) -> Decimal {
    if indices.len() < IPCA_WINDOW {
        return DEFAULT_IPCA_MENSAL;
    }
    let mut sorted: Vec<&EconomicIndex> = indices.iter().collect();
    sorted.sort_by_key(|i| i.data);
    let latest = sorted[sorted.len() - 1].valor;
    let year_ago = sorted[sorted.len() - IPCA_WINDOW].valor;
    if year_ago <= Decimal::ZERO || latest <= Decimal::ZERO {
        return DEFAULT_IPCA_MENSAL;
    }
    let annual = latest / year_ago - Decimal::ONE;
    compound(Decimal::ONE + annual, Decimal::ONE / dec!(12)) - Decimal::ONE
}

pub fn find_recovery_rate(
    rates: &[RecoveryRate],
    empresa: &str,
    tipo: &str,
    category: RateCategory,
    is_partner: bool,
) -> Recovery {
    if is_partner {
        return PARTNER_RECOVERY
            .iter()
            .find(|(c, _)| *c == category)
            .map(|(_, r)| *r)
            .unwrap_or(PARTNER_RECOVERY_DEFAULT);
    }
    let empresa = empresa.to_uppercase();
    let tipo = tipo.to_lowercase();
    let as_recovery = |r: &RecoveryRate| Recovery {
        taxa: r.taxa_recuperacao,
        prazo: r.prazo_recebimento,
    };
    let same_company = |r: &&RecoveryRate| r.empresa.to_uppercase() == empresa && r.aging == category;

    rates
        .iter()
        .filter(same_company)
        .find(|r| r.tipo.to_lowercase() == tipo)
        .or_else(|| rates.iter().find(same_company))
        .map(as_recovery)
        .unwrap_or(NO_RECOVERY)
}

pub struct FairValueEngine<'a> {
    recovery_rates: &'a [RecoveryRate],
    ipca_mensal: Decimal,
    taxa_desconto_mensal: Decimal,
}

impl<'a> FairValueEngine<'a> {
    pub fn new(
        params: &FairValueParams,
        recovery_rates: &'a [RecoveryRate],
        di_pre_rates: &[DiPreRate],
        indices: &[EconomicIndex],
    ) -> Self {
        let di_pre = di_pre_anual(di_pre_rates, params.prazo_horizonte);
        Self {
            recovery_rates,
            ipca_mensal: ipca_mensal(indices),
            taxa_desconto_mensal: monthly_discount_rate(di_pre, params.spread_percent),
        }
    }

    pub fn taxa_desconto_mensal(&self) -> Decimal {
        self.taxa_desconto_mensal
    }

    pub fn ipca_mensal(&self) -> Decimal {
        self.ipca_mensal
    }

    pub fn value(&self, corrected: CorrectedRecord) -> FinalRecord {
        let aged = &corrected.aged;
        let rec = &aged.record;
        let Recovery { taxa, prazo } = find_recovery_rate(
            self.recovery_rates,
            &rec.empresa,
            &rec.tipo,
            aged.aging_taxa,
            rec.is_partner(),
        );

        let valor_corrigido = corrected.valor_corrigido;
        let valor_recuperavel = valor_corrigido * taxa;
        let fator_correcao_recebimento = compound(Decimal::ONE + self.ipca_mensal, prazo);
        let mora = prazo * MORA_POR_MES;
        let fator_desconto = compound(Decimal::ONE + self.taxa_desconto_mensal, prazo);
        let valor_justo = if fator_desconto > Decimal::ZERO {
            valor_corrigido * taxa * (fator_correcao_recebimento + mora) / fator_desconto
        } else {
            Decimal::ZERO
        };

        let desconto_aging = remuneration_discount(aged.aging);
        let valor_justo_reajustado = valor_justo * (Decimal::ONE - desconto_aging);

        FinalRecord {
            corrected,
            taxa_recuperacao: taxa,
            prazo_recebimento: prazo,
            valor_recuperavel,
            valor_justo,
            desconto_aging,
            valor_justo_reajustado,
        }
    }

    pub fn process(&self, records: Vec<CorrectedRecord>) -> Vec<FinalRecord> {
        records.into_iter().map(|r| self.value(r)).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn rate(empresa: &str, tipo: &str, aging: RateCategory, taxa: Decimal, prazo: i64) -> RecoveryRate {
        RecoveryRate {
            empresa: empresa.into(),
            tipo: tipo.into(),
            aging,
            taxa_recuperacao: taxa,
            prazo_recebimento: Decimal::from(prazo),
        }
    }

    fn monthly_series(n: u32, start: Decimal, step: Decimal) -> Vec<EconomicIndex> {
        (0..n)
            .map(|i| EconomicIndex {
                data: NaiveDate::from_ymd_opt(2023 + (i / 12) as i32, i % 12 + 1, 1).unwrap(),
                valor: start + step * Decimal::from(i),
            })
            .collect()
    }

    #[test]
    fn di_pre_exact_nearest_and_default() {
        assert_eq!(di_pre_anual(&[], 6), DEFAULT_DI_PRE_ANUAL);
        let curve = vec![
            DiPreRate::new(90, dec!(10.5), dec!(10.3)),
            DiPreRate::new(270, dec!(11.0), dec!(10.8)),
            DiPreRate::new(180, dec!(10.8), dec!(10.6)),
        ];
        assert_eq!(curve[2].meses_futuros, 6);
        assert_eq!(di_pre_anual(&curve, 6), dec!(0.108));
        // 3 and 9 months are equally far from 6 without the exact vertex: first seen wins
        assert_eq!(di_pre_anual(&curve[..2], 6), dec!(0.105));
        assert_eq!(di_pre_anual(&curve, 12), dec!(0.11));
    }

    #[test]
    fn ipca_needs_thirteen_points() {
        assert_eq!(ipca_mensal(&[]), DEFAULT_IPCA_MENSAL);
        assert_eq!(ipca_mensal(&monthly_series(12, dec!(100), dec!(1))), DEFAULT_IPCA_MENSAL);
        let mut zero_start = monthly_series(13, dec!(0), dec!(1));
        assert_eq!(ipca_mensal(&zero_start), DEFAULT_IPCA_MENSAL);
        let mut zero_latest = monthly_series(13, dec!(100), dec!(1));
        zero_latest[12].valor = Decimal::ZERO;
        assert_eq!(ipca_mensal(&zero_latest), DEFAULT_IPCA_MENSAL);
        // flat series -> no inflation; shuffled input is sorted first
        zero_start = monthly_series(13, dec!(100), dec!(0));
        zero_start.reverse();
        assert_eq!(ipca_mensal(&zero_start), Decimal::ZERO);
        // 100 -> 112 over twelve months
        let v = ipca_mensal(&monthly_series(13, dec!(100), dec!(1)));
        assert!((v - dec!(0.0094888)).abs() < dec!(0.000001));
    }

    #[test]
    fn recovery_resolution_order() {
        let rates = vec![
            rate("CEMIG", "Comercial", RateCategory::SegundoAno, dec!(0.2), 12),
            rate("cemig", "residencial", RateCategory::SegundoAno, dec!(0.4), 9),
        ];
        let exact = find_recovery_rate(&rates, "Cemig", "RESIDENCIAL", RateCategory::SegundoAno, false);
        assert_eq!(exact, Recovery { taxa: dec!(0.4), prazo: dec!(9) });
        let fallback = find_recovery_rate(&rates, "CEMIG", "Rural", RateCategory::SegundoAno, false);
        assert_eq!(fallback, Recovery { taxa: dec!(0.2), prazo: dec!(12) });
        let none = find_recovery_rate(&rates, "CEMIG", "Rural", RateCategory::TerceiroAno, false);
        assert_eq!(none, NO_RECOVERY);

        let mut reversed = rates.clone();
        reversed.reverse();
        let exact = find_recovery_rate(&reversed, "Cemig", "RESIDENCIAL", RateCategory::SegundoAno, false);
        assert_eq!(exact.taxa, dec!(0.4));
    }

    #[test]
    fn partner_uses_builtin_table() {
        let rates = vec![rate("VOLTZ", "Outros", RateCategory::SegundoAno, dec!(0.99), 1)];
        let r = find_recovery_rate(&rates, "VOLTZ", "Outros", RateCategory::SegundoAno, true);
        assert_eq!(r, Recovery { taxa: dec!(0.45), prazo: dec!(12) });
        for c in RateCategory::ALL {
            assert!(find_recovery_rate(&[], "VOLTZ", "", c, true).taxa > Decimal::ZERO);
        }
    }

    #[test]
    fn discount_table_spans_expected_range() {
        assert_eq!(remuneration_discount(AgingBucket::NotDue), dec!(0.065));
        assert_eq!(remuneration_discount(AgingBucket::Over1080), dec!(0.50));
        let mut prev = Decimal::ZERO;
        for b in AgingBucket::ALL {
            let d = remuneration_discount(b);
            assert!(d >= prev);
            prev = d;
        }
    }

    #[test]
    fn monthly_discount_rate_combines_spread_first() {
        let m = monthly_discount_rate(dec!(0.12), dec!(0.025));
        // (1.12 * 1.025)^(1/12) - 1
        assert!((m - dec!(0.0115682)).abs() < dec!(0.000001));
    }
}
