// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use crate::engine::pipeline::{
    FairValueComputer, PipelineInput, PipelineStep, ProgressEvent, ProgressSink,
};
use crate::error::{FidcError, FidcResult};
use crate::models::FinalRecord;
use crate::utils::http_client;
use tracing::{info, warn};

/// Hands the whole run to a hosted engine and relays its answer. One
/// request, no retry, no partial results.
pub struct RemoteComputer {
    endpoint: String,
    client: reqwest::blocking::Client,
}

impl RemoteComputer {
    pub fn new(endpoint: impl Into<String>, timeout_secs: u64) -> FidcResult<Self> {
        Ok(Self {
            endpoint: endpoint.into(),
            client: http_client(timeout_secs)?,
        })
    }

    fn call(&self, input: &PipelineInput) -> FidcResult<Vec<FinalRecord>> {
        let resp = self.client.post(&self.endpoint).json(input).send()?;
        let status = resp.status();
        if !status.is_success() {
            let body = resp.text().unwrap_or_default();
            return Err(FidcError::RemoteStatus {
                status: status.as_u16(),
                body,
            });
        }
        let text = resp.text()?;
        Ok(serde_json::from_str(&text)?)
    }
}

impl FairValueComputer for RemoteComputer {
    fn compute(
        &self,
        input: &PipelineInput,
        sink: &mut dyn ProgressSink,
    ) -> FidcResult<Vec<FinalRecord>> {
        sink.emit(
            ProgressEvent::new(
                PipelineStep::Validating,
                5,
                format!("Sending {} records to the remote engine", input.records.len()),
            )
            .with_details(self.endpoint.clone()),
        );
        match self.call(input) {
            Ok(records) => {
                info!(records = records.len(), endpoint = %self.endpoint, "remote run complete");
                sink.emit(ProgressEvent::new(
                    PipelineStep::Complete,
                    100,
                    format!("{} records valued", records.len()),
                ));
                Ok(records)
            }
            Err(err) => {
                warn!(endpoint = %self.endpoint, "remote run failed: {err}");
                sink.emit(ProgressEvent::new(PipelineStep::Error, 100, err.to_string()));
                Err(err)
            }
        }
    }
}
