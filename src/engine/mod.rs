// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

pub mod aging;
pub mod correction;
pub mod fair_value;
pub mod mapper;
pub mod pipeline;
pub mod remote;

use crate::config::{EngineMode, Settings};
use crate::error::{FidcError, FidcResult};
use pipeline::{FairValueComputer, LocalComputer};
use remote::RemoteComputer;

/// Picks the engine named in the settings.
pub fn computer_for(settings: &Settings) -> FidcResult<Box<dyn FairValueComputer>> {
    match settings.engine.mode {
        EngineMode::Local => Ok(Box::new(LocalComputer::new(
            settings.correction.clone(),
            settings.fair_value.prazo_horizonte,
        ))),
        EngineMode::Remote => {
            let url = settings
                .engine
                .remote_url
                .as_deref()
                .filter(|u| !u.trim().is_empty())
                .ok_or(FidcError::MissingRemoteUrl)?;
            Ok(Box::new(RemoteComputer::new(url, settings.engine.timeout_secs)?))
        }
    }
}
