// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;

/// Literal company name of the fintech partner whose receivables follow
/// their own correction and recovery terms.
pub const PARTNER_NAME: &str = "VOLTZ";

/// One spreadsheet row as handed over by the ingestion layer.
pub type RawRow = HashMap<String, String>;

/// A decoded source file: its header row plus the rows below it.
#[derive(Debug, Clone, Default)]
pub struct SourceTable {
    pub name: String,
    pub columns: Vec<String>,
    pub rows: Vec<RawRow>,
    pub is_partner: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MappedRecord {
    pub empresa: String,
    pub tipo: String,
    pub status: String,
    pub situacao: String,
    pub nome_cliente: String,
    pub documento: String,
    pub classe: String,
    pub contrato: String,
    pub valor_principal: Decimal,
    pub valor_nao_cedido: Decimal,
    pub valor_terceiro: Decimal,
    pub valor_cip: Decimal,
    pub data_vencimento: String, // ISO when parseable, trimmed source text otherwise
    pub data_base: String,       // YYYY-MM-DD
    pub base_origem: String,
}

impl MappedRecord {
    pub fn is_partner(&self) -> bool {
        self.empresa == PARTNER_NAME
    }
}

/// Nine ordered days-overdue classes. Every integer lands in exactly one.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum AgingBucket {
    #[serde(rename = "A vencer")]
    NotDue,
    #[serde(rename = "De 1 a 30 dias")]
    Days1To30,
    #[serde(rename = "De 31 a 59 dias")]
    Days31To59,
    #[serde(rename = "De 60 a 89 dias")]
    Days60To89,
    #[serde(rename = "De 90 a 119 dias")]
    Days90To119,
    #[serde(rename = "De 120 a 359 dias")]
    Days120To359,
    #[serde(rename = "De 360 a 719 dias")]
    Days360To719,
    #[serde(rename = "De 720 a 1080 dias")]
    Days720To1080,
    #[serde(rename = "Maior que 1080 dias")]
    Over1080,
}

impl AgingBucket {
    pub const ALL: [AgingBucket; 9] = [
        AgingBucket::NotDue,
        AgingBucket::Days1To30,
        AgingBucket::Days31To59,
        AgingBucket::Days60To89,
        AgingBucket::Days90To119,
        AgingBucket::Days120To359,
        AgingBucket::Days360To719,
        AgingBucket::Days720To1080,
        AgingBucket::Over1080,
    ];

    pub fn label(self) -> &'static str {
        match self {
            AgingBucket::NotDue => "A vencer",
            AgingBucket::Days1To30 => "De 1 a 30 dias",
            AgingBucket::Days31To59 => "De 31 a 59 dias",
            AgingBucket::Days60To89 => "De 60 a 89 dias",
            AgingBucket::Days90To119 => "De 90 a 119 dias",
            AgingBucket::Days120To359 => "De 120 a 359 dias",
            AgingBucket::Days360To719 => "De 360 a 719 dias",
            AgingBucket::Days720To1080 => "De 720 a 1080 dias",
            AgingBucket::Over1080 => "Maior que 1080 dias",
        }
    }
}

impl fmt::Display for AgingBucket {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Coarse grouping of aging buckets used by recovery-rate tables.
///
/// The classifier only ever produces five of these; `QuartoAno` and
/// `QuintoAno` exist because partner and uploaded recovery tables carry them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum RateCategory {
    #[serde(rename = "A vencer")]
    AVencer,
    #[serde(rename = "Primeiro ano")]
    PrimeiroAno,
    #[serde(rename = "Segundo ano")]
    SegundoAno,
    #[serde(rename = "Terceiro ano")]
    TerceiroAno,
    #[serde(rename = "Quarto ano")]
    QuartoAno,
    #[serde(rename = "Quinto ano")]
    QuintoAno,
    #[serde(rename = "Demais anos")]
    DemaisAnos,
}

impl RateCategory {
    pub const ALL: [RateCategory; 7] = [
        RateCategory::AVencer,
        RateCategory::PrimeiroAno,
        RateCategory::SegundoAno,
        RateCategory::TerceiroAno,
        RateCategory::QuartoAno,
        RateCategory::QuintoAno,
        RateCategory::DemaisAnos,
    ];

    pub fn label(self) -> &'static str {
        match self {
            RateCategory::AVencer => "A vencer",
            RateCategory::PrimeiroAno => "Primeiro ano",
            RateCategory::SegundoAno => "Segundo ano",
            RateCategory::TerceiroAno => "Terceiro ano",
            RateCategory::QuartoAno => "Quarto ano",
            RateCategory::QuintoAno => "Quinto ano",
            RateCategory::DemaisAnos => "Demais anos",
        }
    }
}

impl fmt::Display for RateCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for RateCategory {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.split_whitespace().collect::<Vec<_>>().join(" ");
        RateCategory::ALL
            .into_iter()
            .find(|c| c.label().eq_ignore_ascii_case(&wanted))
            .ok_or_else(|| format!("Unknown rate category '{}'", s))
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AgingRecord {
    #[serde(flatten)]
    pub record: MappedRecord,
    pub dias_atraso: i64,
    pub aging: AgingBucket,
    pub aging_taxa: RateCategory,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CorrectedRecord {
    #[serde(flatten)]
    pub aged: AgingRecord,
    pub valor_liquido: Decimal,
    pub multa: Decimal,
    pub juros_moratorios: Decimal,
    pub fator_correcao: Decimal,
    pub correcao_monetaria: Decimal,
    pub valor_corrigido: Decimal,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub juros_remuneratorios: Option<Decimal>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub saldo_devedor_vencimento: Option<Decimal>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub saldo_corrigido_igpm: Option<Decimal>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FinalRecord {
    #[serde(flatten)]
    pub corrected: CorrectedRecord,
    pub taxa_recuperacao: Decimal,
    pub prazo_recebimento: Decimal, // months
    pub valor_recuperavel: Decimal,
    pub valor_justo: Decimal,
    pub desconto_aging: Decimal,
    pub valor_justo_reajustado: Decimal,
}

impl FinalRecord {
    pub fn mapped(&self) -> &MappedRecord {
        &self.corrected.aged.record
    }

    pub fn aging(&self) -> AgingBucket {
        self.corrected.aged.aging
    }
}

/// One point of a monthly price-index series (IGP-M or IPCA).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EconomicIndex {
    pub data: NaiveDate,
    pub valor: Decimal,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RecoveryRate {
    pub empresa: String,
    pub tipo: String,
    pub aging: RateCategory,
    pub taxa_recuperacao: Decimal, // 0..1
    pub prazo_recebimento: Decimal, // months
}

/// A vertex of the DI x PRE forward curve.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DiPreRate {
    pub dias_corridos: i64,
    pub taxa_252: Decimal,
    pub taxa_360: Decimal,
    pub meses_futuros: i64,
}

impl DiPreRate {
    /// Builds a vertex, bucketing calendar days into whole months (half up).
    pub fn new(dias_corridos: i64, taxa_252: Decimal, taxa_360: Decimal) -> Self {
        Self {
            dias_corridos,
            taxa_252,
            taxa_360,
            meses_futuros: (dias_corridos + 15).div_euclid(30),
        }
    }
}
