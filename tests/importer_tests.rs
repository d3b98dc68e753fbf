// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use chrono::NaiveDate;
use fidcmark::commands::importer;
use fidcmark::models::{PARTNER_NAME, RateCategory};
use rust_decimal_macros::dec;
use std::io::Write;
use tempfile::NamedTempFile;

fn csv(contents: &str) -> NamedTempFile {
    let mut file = NamedTempFile::new().unwrap();
    write!(file, "{}", contents).unwrap();
    file.flush().unwrap();
    file
}

fn path(file: &NamedTempFile) -> &str {
    file.path().to_str().unwrap()
}

#[test]
fn source_reader_handles_bom_semicolons_and_blank_rows() {
    let file = csv("\u{feff}Empresa;Valor Principal;Vencimento\nCEMIG;1.234,56;15/01/2024\n;;\nCOPEL;10;2024-02-01\n");
    let src = importer::read_source(path(&file), false).unwrap();
    assert_eq!(src.columns, vec!["Empresa", "Valor Principal", "Vencimento"]);
    assert_eq!(src.rows.len(), 2);
    assert_eq!(src.rows[0]["Valor Principal"], "1.234,56");
    assert!(!src.is_partner);
}

#[test]
fn mapped_sources_keep_argument_order_and_partner_overrides() {
    let standard = csv("Empresa,Tipo,Valor Principal,Data Vencimento,Valor CIP\nCEMIG,,100,15/01/2024,5\n");
    let partner = csv("Empresa,Tipo,Valor Principal,Data Vencimento,Valor CIP\nACME,Rural,200,2024-01-15,7\n");
    let sources = vec![
        importer::read_source(path(&standard), false).unwrap(),
        importer::read_source(path(&partner), true).unwrap(),
    ];
    let data_base = NaiveDate::from_ymd_opt(2024, 6, 30).unwrap();
    let records = importer::map_sources(&sources, data_base);

    assert_eq!(records.len(), 2);
    assert_eq!(records[0].empresa, "CEMIG");
    assert_eq!(records[0].tipo, "Outros");
    assert_eq!(records[0].valor_cip, dec!(5));
    assert_eq!(records[0].data_vencimento, "2024-01-15");
    assert_eq!(records[0].data_base, "2024-06-30");

    assert_eq!(records[1].empresa, PARTNER_NAME);
    assert_eq!(records[1].tipo, "Rural");
    assert_eq!(records[1].valor_cip, dec!(0));
    assert_eq!(records[1].valor_principal, dec!(200));
}

#[test]
fn index_loader_accepts_month_and_day_dates() {
    let file = csv("Data;Valor\n01/2024;1.100,50\n2024-02-15;1110\nsem data;1\n");
    let indices = importer::load_indices(path(&file)).unwrap();
    assert_eq!(indices.len(), 2);
    assert_eq!(indices[0].data, NaiveDate::from_ymd_opt(2024, 1, 1).unwrap());
    assert_eq!(indices[0].valor, dec!(1100.50));
    assert_eq!(indices[1].data, NaiveDate::from_ymd_opt(2024, 2, 15).unwrap());
}

#[test]
fn index_loader_requires_value_column() {
    let file = csv("data,observacao\n2024-01-01,x\n");
    let err = importer::load_indices(path(&file)).unwrap_err();
    assert!(err.to_string().contains("valor"));
}

#[test]
fn recovery_loader_normalizes_percentages() {
    let file = csv(
        "Empresa,Tipo,Aging,Taxa Recuperacao,Prazo Recebimento\n\
         CEMIG,Residencial,primeiro ano,65,6\n\
         CEMIG,Rural,DEMAIS  ANOS,0.1,36\n\
         CEMIG,Rural,Sexto ano,0.1,36\n",
    );
    let rates = importer::load_recovery_rates(path(&file)).unwrap();
    assert_eq!(rates.len(), 2);
    assert_eq!(rates[0].aging, RateCategory::PrimeiroAno);
    assert_eq!(rates[0].taxa_recuperacao, dec!(0.65));
    assert_eq!(rates[1].aging, RateCategory::DemaisAnos);
    assert_eq!(rates[1].taxa_recuperacao, dec!(0.1));
    assert_eq!(rates[1].prazo_recebimento, dec!(36));
}

#[test]
fn di_pre_loader_reads_spreadsheet_day_counts() {
    let file = csv("dias_corridos;taxa_252;taxa_360\n90,0;10,50;10,30\n1.260;12,00;11,80\n;1;1\n");
    let curve = importer::load_di_pre(path(&file)).unwrap();
    // `1.260` has a fractional part once read as a decimal and is skipped
    assert_eq!(curve.len(), 1);
    assert_eq!(curve[0].dias_corridos, 90);
    assert_eq!(curve[0].meses_futuros, 3);
    assert_eq!(curve[0].taxa_252, dec!(10.50));
}

#[test]
fn di_pre_loader_buckets_days_into_months() {
    let file = csv("dias_corridos,taxa_252,taxa_360\n21,10.65,10.80\n45,10.70,10.85\n180,11.20,11.40\nx,1,1\n");
    let curve = importer::load_di_pre(path(&file)).unwrap();
    assert_eq!(curve.len(), 3);
    assert_eq!(curve[0].meses_futuros, 1);
    assert_eq!(curve[1].meses_futuros, 2);
    assert_eq!(curve[2].meses_futuros, 6);
    assert_eq!(curve[2].taxa_252, dec!(11.20));
}
