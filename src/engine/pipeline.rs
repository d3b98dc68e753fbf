// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use crate::config::{CorrectionParams, FairValueParams};
use crate::engine::aging;
use crate::engine::correction::CorrectionEngine;
use crate::engine::fair_value::FairValueEngine;
use crate::error::FidcResult;
use crate::models::{
    AgingRecord, CorrectedRecord, DiPreRate, EconomicIndex, FinalRecord, MappedRecord, RecoveryRate,
};
use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum PipelineStep {
    Validating,
    Aging,
    Correction,
    FairValue,
    Remuneration,
    Complete,
    Error,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProgressEvent {
    pub step: PipelineStep,
    pub progress: u8,
    pub message: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub details: Option<String>,
}

impl ProgressEvent {
    pub fn new(step: PipelineStep, progress: u8, message: impl Into<String>) -> Self {
        Self {
            step,
            progress: progress.min(100),
            message: message.into(),
            details: None,
        }
    }

    pub fn with_details(mut self, details: impl Into<String>) -> Self {
        self.details = Some(details.into());
        self
    }
}

/// Receives progress events synchronously, on the pipeline's own thread.
pub trait ProgressSink {
    fn emit(&mut self, event: ProgressEvent);
}

impl<F: FnMut(ProgressEvent)> ProgressSink for F {
    fn emit(&mut self, event: ProgressEvent) {
        self(event)
    }
}

/// Sink for callers that do not care about progress.
pub struct Silent;

impl ProgressSink for Silent {
    fn emit(&mut self, _event: ProgressEvent) {}
}

/// Everything a fair-value run needs. Also the payload shipped to a remote
/// engine, hence the camelCase keys.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PipelineInput {
    pub records: Vec<MappedRecord>,
    pub indices: Vec<EconomicIndex>,
    pub recovery_rates: Vec<RecoveryRate>,
    pub di_pre_rates: Vec<DiPreRate>,
    pub data_base: NaiveDate,
    pub spread_percent: Decimal,
}

pub trait FairValueComputer {
    fn compute(
        &self,
        input: &PipelineInput,
        sink: &mut dyn ProgressSink,
    ) -> FidcResult<Vec<FinalRecord>>;
}

/// In-process engine.
#[derive(Debug, Clone, Default)]
pub struct LocalComputer {
    pub correction: CorrectionParams,
    pub prazo_horizonte: i64,
}

impl LocalComputer {
    pub fn new(correction: CorrectionParams, prazo_horizonte: i64) -> Self {
        Self {
            correction,
            prazo_horizonte,
        }
    }
}

impl FairValueComputer for LocalComputer {
    fn compute(
        &self,
        input: &PipelineInput,
        sink: &mut dyn ProgressSink,
    ) -> FidcResult<Vec<FinalRecord>> {
        Ok(run(input, &self.correction, self.prazo_horizonte, sink))
    }
}

fn is_valid(r: &MappedRecord) -> bool {
    r.valor_principal > Decimal::ZERO && !r.data_vencimento.trim().is_empty()
}

/// Splits by branch, corrects each side and restores input order.
pub fn correct_all(engine: &CorrectionEngine<'_>, aged: Vec<AgingRecord>) -> Vec<CorrectedRecord> {
    let (partner, standard): (Vec<_>, Vec<_>) = aged
        .into_iter()
        .enumerate()
        .partition(|(_, r)| r.record.is_partner());
    let (partner_pos, partner_recs): (Vec<usize>, Vec<AgingRecord>) = partner.into_iter().unzip();
    let (standard_pos, standard_recs): (Vec<usize>, Vec<AgingRecord>) = standard.into_iter().unzip();

    let mut tagged: Vec<(usize, CorrectedRecord)> = standard_pos
        .into_iter()
        .zip(engine.process_standard(standard_recs))
        .chain(partner_pos.into_iter().zip(engine.process_partner(partner_recs)))
        .collect();
    tagged.sort_by_key(|(pos, _)| *pos);
    tagged.into_iter().map(|(_, r)| r).collect()
}

/// Runs validation, aging, correction and fair value in order. Never fails:
/// malformed records resolve to defaults.
pub fn run(
    input: &PipelineInput,
    correction: &CorrectionParams,
    prazo_horizonte: i64,
    sink: &mut dyn ProgressSink,
) -> Vec<FinalRecord> {
    let total = input.records.len();
    sink.emit(ProgressEvent::new(
        PipelineStep::Validating,
        5,
        format!("Validating {} records", total),
    ));
    let valid: Vec<MappedRecord> = input.records.iter().filter(|r| is_valid(r)).cloned().collect();
    let dropped = total - valid.len();
    debug!(total, dropped, "validation finished");
    sink.emit(
        ProgressEvent::new(
            PipelineStep::Validating,
            15,
            format!("{} records valid, {} dropped", valid.len(), dropped),
        )
        .with_details("dropped records have a non-positive principal or no due date"),
    );

    sink.emit(ProgressEvent::new(PipelineStep::Aging, 30, "Classifying aging buckets"));
    let aged = aging::process(valid);

    let partners = aged.iter().filter(|r| r.record.is_partner()).count();
    sink.emit(
        ProgressEvent::new(PipelineStep::Correction, 50, "Applying monetary correction")
            .with_details(format!("{} standard, {} partner", aged.len() - partners, partners)),
    );
    let engine = CorrectionEngine::new(correction, &input.indices, input.data_base);
    let corrected = correct_all(&engine, aged);

    let params = FairValueParams {
        spread_percent: input.spread_percent,
        prazo_horizonte,
    };
    let fv = FairValueEngine::new(&params, &input.recovery_rates, &input.di_pre_rates, &input.indices);
    sink.emit(
        ProgressEvent::new(PipelineStep::FairValue, 70, "Discounting to fair value").with_details(
            format!(
                "monthly discount {:.6}, monthly IPCA {:.6}",
                fv.taxa_desconto_mensal(),
                fv.ipca_mensal()
            ),
        ),
    );
    let finals = fv.process(corrected);

    sink.emit(ProgressEvent::new(
        PipelineStep::Remuneration,
        90,
        "Applying remuneration discount",
    ));

    info!(records = finals.len(), dropped, "fair-value run complete");
    sink.emit(ProgressEvent::new(
        PipelineStep::Complete,
        100,
        format!("{} records valued", finals.len()),
    ));
    finals
}
