// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

//! Column mapping: guesses which source column feeds each target field and
//! turns raw rows into [`MappedRecord`]s.

use crate::models::{MappedRecord, PARTNER_NAME, RawRow};
use crate::utils::{coerce_number, normalize_column, parse_flexible_date};
use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashSet};
use std::fmt;

/// `tipo` used when a row leaves it blank.
pub const DEFAULT_TIPO: &str = "Outros";

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TargetField {
    Empresa,
    Tipo,
    Status,
    Situacao,
    NomeCliente,
    Documento,
    Classe,
    Contrato,
    ValorPrincipal,
    ValorNaoCedido,
    ValorTerceiro,
    ValorCip,
    DataVencimento,
}

impl TargetField {
    /// Declaration order is matching order.
    pub const ALL: [TargetField; 13] = [
        TargetField::Empresa,
        TargetField::Tipo,
        TargetField::Status,
        TargetField::Situacao,
        TargetField::NomeCliente,
        TargetField::Documento,
        TargetField::Classe,
        TargetField::Contrato,
        TargetField::ValorPrincipal,
        TargetField::ValorNaoCedido,
        TargetField::ValorTerceiro,
        TargetField::ValorCip,
        TargetField::DataVencimento,
    ];

    pub const REQUIRED: [TargetField; 4] = [
        TargetField::Empresa,
        TargetField::Tipo,
        TargetField::ValorPrincipal,
        TargetField::DataVencimento,
    ];

    pub fn name(self) -> &'static str {
        match self {
            TargetField::Empresa => "empresa",
            TargetField::Tipo => "tipo",
            TargetField::Status => "status",
            TargetField::Situacao => "situacao",
            TargetField::NomeCliente => "nome_cliente",
            TargetField::Documento => "documento",
            TargetField::Classe => "classe",
            TargetField::Contrato => "contrato",
            TargetField::ValorPrincipal => "valor_principal",
            TargetField::ValorNaoCedido => "valor_nao_cedido",
            TargetField::ValorTerceiro => "valor_terceiro",
            TargetField::ValorCip => "valor_cip",
            TargetField::DataVencimento => "data_vencimento",
        }
    }

    /// Synonyms in priority order. Reordering changes mapping results.
    pub fn synonyms(self) -> &'static [&'static str] {
        match self {
            TargetField::Empresa => &["empresa", "distribuidora", "concessionaria", "cedente"],
            TargetField::Tipo => &["tipo", "tipo_cliente", "tipo_de_cliente", "categoria"],
            TargetField::Status => &["status", "status_conta"],
            TargetField::Situacao => &["situacao", "situação", "situacao_conta"],
            TargetField::NomeCliente => &["nome_cliente", "nome", "cliente", "sacado"],
            TargetField::Documento => &["documento", "cpf_cnpj", "cpf", "cnpj"],
            TargetField::Classe => &["classe", "classe_consumo", "subclasse"],
            TargetField::Contrato => &[
                "contrato",
                "numero_contrato",
                "conta_contrato",
                "instalacao",
                "unidade_consumidora",
            ],
            TargetField::ValorPrincipal => &[
                "valor_principal",
                "valor_fatura",
                "valor_original",
                "valor_debito",
                "principal",
            ],
            TargetField::ValorNaoCedido => &["valor_nao_cedido", "valor_não_cedido", "nao_cedido"],
            TargetField::ValorTerceiro => &["valor_terceiro", "valor_terceiros", "terceiros"],
            TargetField::ValorCip => &["valor_cip", "contribuicao_iluminacao", "cip"],
            TargetField::DataVencimento => &[
                "data_vencimento",
                "vencimento",
                "dt_vencimento",
                "data_venc",
            ],
        }
    }
}

impl fmt::Display for TargetField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Target field -> original source column name. May be partial.
pub type FieldMapping = BTreeMap<TargetField, String>;

#[derive(Debug, Clone)]
pub struct ApplyOptions {
    pub data_base: NaiveDate,
    pub base_origem: String,
    pub is_partner: bool,
}

fn matches(column: &str, synonym: &str) -> bool {
    column == synonym || column.contains(synonym) || synonym.contains(column)
}

/// Greedy, order-sensitive match of source columns onto target fields. A
/// source column is never assigned to more than one target.
pub fn auto_map<S: AsRef<str>>(source_columns: &[S]) -> FieldMapping {
    let normalized: Vec<(String, &str)> = source_columns
        .iter()
        .map(|c| (normalize_column(c.as_ref()), c.as_ref()))
        .filter(|(n, _)| !n.is_empty())
        .collect();
    let mut taken: HashSet<usize> = HashSet::new();
    let mut mapping = FieldMapping::new();

    for target in TargetField::ALL {
        'synonyms: for synonym in target.synonyms() {
            let synonym = normalize_column(synonym);
            for (idx, (column, original)) in normalized.iter().enumerate() {
                if taken.contains(&idx) {
                    continue;
                }
                if matches(column, &synonym) {
                    taken.insert(idx);
                    mapping.insert(target, original.to_string());
                    break 'synonyms;
                }
            }
        }
    }
    mapping
}

pub fn missing_required(mapping: &FieldMapping) -> Vec<TargetField> {
    TargetField::REQUIRED
        .into_iter()
        .filter(|f| !mapping.contains_key(f))
        .collect()
}

/// Share of target fields mapped, rounded to a whole percentage.
pub fn confidence(mapping: &FieldMapping) -> u8 {
    let total = TargetField::ALL.len();
    let mapped = TargetField::ALL
        .iter()
        .filter(|f| mapping.contains_key(f))
        .count();
    ((200 * mapped + total) / (2 * total)) as u8
}

fn text(row: &RawRow, mapping: &FieldMapping, field: TargetField) -> String {
    mapping
        .get(&field)
        .and_then(|col| row.get(col))
        .map(|v| v.trim().to_string())
        .unwrap_or_default()
}

fn number(row: &RawRow, mapping: &FieldMapping, field: TargetField) -> Decimal {
    mapping
        .get(&field)
        .and_then(|col| row.get(col))
        .map(|v| coerce_number(v))
        .unwrap_or(Decimal::ZERO)
}

pub fn apply(rows: &[RawRow], mapping: &FieldMapping, opts: &ApplyOptions) -> Vec<MappedRecord> {
    let data_base = opts.data_base.format("%Y-%m-%d").to_string();
    rows.iter()
        .map(|row| {
            let raw_due = text(row, mapping, TargetField::DataVencimento);
            let data_vencimento = match parse_flexible_date(&raw_due) {
                Some(d) => d.format("%Y-%m-%d").to_string(),
                None => raw_due,
            };
            let mut tipo = text(row, mapping, TargetField::Tipo);
            if tipo.is_empty() {
                tipo = DEFAULT_TIPO.to_string();
            }
            let mut rec = MappedRecord {
                empresa: text(row, mapping, TargetField::Empresa),
                tipo,
                status: text(row, mapping, TargetField::Status),
                situacao: text(row, mapping, TargetField::Situacao),
                nome_cliente: text(row, mapping, TargetField::NomeCliente),
                documento: text(row, mapping, TargetField::Documento),
                classe: text(row, mapping, TargetField::Classe),
                contrato: text(row, mapping, TargetField::Contrato),
                valor_principal: number(row, mapping, TargetField::ValorPrincipal),
                valor_nao_cedido: number(row, mapping, TargetField::ValorNaoCedido),
                valor_terceiro: number(row, mapping, TargetField::ValorTerceiro),
                valor_cip: number(row, mapping, TargetField::ValorCip),
                data_vencimento,
                data_base: data_base.clone(),
                base_origem: opts.base_origem.clone(),
            };
            if opts.is_partner {
                rec.empresa = PARTNER_NAME.to_string();
                rec.valor_nao_cedido = Decimal::ZERO;
                rec.valor_terceiro = Decimal::ZERO;
                rec.valor_cip = Decimal::ZERO;
            }
            rec
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn row(pairs: &[(&str, &str)]) -> RawRow {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    fn opts(is_partner: bool) -> ApplyOptions {
        ApplyOptions {
            data_base: NaiveDate::from_ymd_opt(2024, 6, 30).unwrap(),
            base_origem: "carteira.csv".into(),
            is_partner,
        }
    }

    #[test]
    fn maps_typical_distributor_header() {
        let cols = [
            "Distribuidora",
            "Tipo Cliente",
            "Nome do Cliente",
            "CPF/CNPJ",
            "Valor Principal",
            "Valor Não Cedido",
            "Valor Terceiros",
            "Valor CIP",
            "Data Vencimento",
        ];
        let m = auto_map(&cols);
        assert_eq!(m[&TargetField::Empresa], "Distribuidora");
        assert_eq!(m[&TargetField::Tipo], "Tipo Cliente");
        assert_eq!(m[&TargetField::ValorPrincipal], "Valor Principal");
        assert_eq!(m[&TargetField::ValorNaoCedido], "Valor Não Cedido");
        assert_eq!(m[&TargetField::ValorTerceiro], "Valor Terceiros");
        assert_eq!(m[&TargetField::ValorCip], "Valor CIP");
        assert_eq!(m[&TargetField::DataVencimento], "Data Vencimento");
        assert!(missing_required(&m).is_empty());
    }

    #[test]
    fn assigned_column_is_not_reused() {
        // "valor_principal" contains "cip" but is already taken by valor_principal
        let m = auto_map(&["valor_principal"]);
        assert_eq!(m.len(), 1);
        assert_eq!(m[&TargetField::ValorPrincipal], "valor_principal");
        assert!(!m.contains_key(&TargetField::ValorCip));
    }

    #[test]
    fn earlier_target_wins_a_shared_column() {
        // "tipo" is the first synonym for Tipo; Classe never sees the column
        let m = auto_map(&["tipo_classe"]);
        assert_eq!(m.get(&TargetField::Tipo).map(String::as_str), Some("tipo_classe"));
        assert!(!m.contains_key(&TargetField::Classe));
    }

    #[test]
    fn missing_and_confidence() {
        let m = auto_map(&["empresa", "valor_principal"]);
        let missing = missing_required(&m);
        assert_eq!(missing, vec![TargetField::Tipo, TargetField::DataVencimento]);
        assert_eq!(confidence(&m), 15); // 2/13
        assert_eq!(confidence(&FieldMapping::new()), 0);
        let full = auto_map(&TargetField::ALL.map(|f| f.name()));
        assert_eq!(confidence(&full), 100);
    }

    #[test]
    fn apply_coerces_and_defaults() {
        let m = auto_map(&["empresa", "tipo", "valor_principal", "valor_cip", "vencimento"]);
        let rows = vec![row(&[
            ("empresa", " CEMIG "),
            ("tipo", ""),
            ("valor_principal", "R$ 1.500,75"),
            ("valor_cip", "12,5"),
            ("vencimento", "15/01/2024"),
        ])];
        let out = apply(&rows, &m, &opts(false));
        let r = &out[0];
        assert_eq!(r.empresa, "CEMIG");
        assert_eq!(r.tipo, DEFAULT_TIPO);
        assert_eq!(r.valor_principal, dec!(1500.75));
        assert_eq!(r.valor_cip, dec!(12.5));
        assert_eq!(r.valor_terceiro, Decimal::ZERO);
        assert_eq!(r.data_vencimento, "2024-01-15");
        assert_eq!(r.data_base, "2024-06-30");
        assert_eq!(r.base_origem, "carteira.csv");
        assert_eq!(r.nome_cliente, "");
    }

    #[test]
    fn apply_forces_partner_fields() {
        let m = auto_map(&["empresa", "valor_principal", "valor_terceiro", "vencimento"]);
        let rows = vec![row(&[
            ("empresa", "Outra"),
            ("valor_principal", "100"),
            ("valor_terceiro", "40"),
            ("vencimento", "garbage"),
        ])];
        let out = apply(&rows, &m, &opts(true));
        assert_eq!(out[0].empresa, PARTNER_NAME);
        assert!(out[0].is_partner());
        assert_eq!(out[0].valor_terceiro, Decimal::ZERO);
        assert_eq!(out[0].data_vencimento, "garbage");
    }
}
