// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use crate::models::{AgingBucket, AgingRecord, MappedRecord, RateCategory};
use crate::utils::parse_flexible_date;

/// Whole days from `due` to `base`. Unparseable dates count as zero.
pub fn days_overdue(due: &str, base: &str) -> i64 {
    match (parse_flexible_date(due), parse_flexible_date(base)) {
        (Some(d), Some(b)) => (b - d).num_days(),
        _ => 0,
    }
}

pub fn classify_bucket(days: i64) -> AgingBucket {
    match days {
        i64::MIN..=0 => AgingBucket::NotDue,
        1..=30 => AgingBucket::Days1To30,
        31..=59 => AgingBucket::Days31To59,
        60..=89 => AgingBucket::Days60To89,
        90..=119 => AgingBucket::Days90To119,
        120..=359 => AgingBucket::Days120To359,
        360..=719 => AgingBucket::Days360To719,
        720..=1080 => AgingBucket::Days720To1080,
        _ => AgingBucket::Over1080,
    }
}

pub fn bucket_to_rate_category(bucket: AgingBucket) -> RateCategory {
    match bucket {
        AgingBucket::NotDue => RateCategory::AVencer,
        AgingBucket::Days1To30
        | AgingBucket::Days31To59
        | AgingBucket::Days60To89
        | AgingBucket::Days90To119
        | AgingBucket::Days120To359 => RateCategory::PrimeiroAno,
        AgingBucket::Days360To719 => RateCategory::SegundoAno,
        AgingBucket::Days720To1080 => RateCategory::TerceiroAno,
        AgingBucket::Over1080 => RateCategory::DemaisAnos,
    }
}

pub fn age(record: MappedRecord) -> AgingRecord {
    let dias_atraso = days_overdue(&record.data_vencimento, &record.data_base);
    let aging = classify_bucket(dias_atraso);
    AgingRecord {
        record,
        dias_atraso,
        aging,
        aging_taxa: bucket_to_rate_category(aging),
    }
}

pub fn process(records: Vec<MappedRecord>) -> Vec<AgingRecord> {
    records.into_iter().map(age).collect()
}
