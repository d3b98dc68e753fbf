// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use crate::error::{FidcError, FidcResult};
use directories::ProjectDirs;
use once_cell::sync::Lazy;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::debug;

static APP: Lazy<(&str, &str, &str)> =
    Lazy::new(|| ("com.alphavelocity", "Fidcmark", "fidcmark"));

const CONFIG_FILE: &str = "fidcmark.toml";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CorrectionParams {
    pub taxa_multa: Decimal,
    pub taxa_juros_mensal: Decimal,
    pub taxa_juros_remuneratorios: Decimal, // partner contracts only
}

impl Default for CorrectionParams {
    fn default() -> Self {
        Self {
            taxa_multa: dec!(0.02),
            taxa_juros_mensal: dec!(0.01),
            taxa_juros_remuneratorios: dec!(0.0465),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FairValueParams {
    pub spread_percent: Decimal,
    pub prazo_horizonte: i64, // months
}

impl Default for FairValueParams {
    fn default() -> Self {
        Self {
            spread_percent: dec!(0.025),
            prazo_horizonte: 6,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EngineMode {
    #[default]
    Local,
    Remote,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineSettings {
    pub mode: EngineMode,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub remote_url: Option<String>,
    pub timeout_secs: u64,
}

impl Default for EngineSettings {
    fn default() -> Self {
        Self {
            mode: EngineMode::Local,
            remote_url: None,
            timeout_secs: 60,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub correction: CorrectionParams,
    pub fair_value: FairValueParams,
    pub engine: EngineSettings,
}

pub fn default_config_path() -> Option<PathBuf> {
    let proj = ProjectDirs::from(APP.0, APP.1, APP.2)?;
    Some(proj.config_dir().join(CONFIG_FILE))
}

pub fn parse(text: &str, origin: &str) -> FidcResult<Settings> {
    toml::from_str(text).map_err(|e| FidcError::Config {
        path: origin.to_string(),
        reason: e.to_string(),
    })
}

fn read(path: &Path) -> FidcResult<Settings> {
    let text = fs::read_to_string(path).map_err(|e| FidcError::Config {
        path: path.display().to_string(),
        reason: e.to_string(),
    })?;
    parse(&text, &path.display().to_string())
}

/// Explicit path first, then the platform config dir, then defaults.
pub fn load(explicit: Option<&Path>) -> FidcResult<Settings> {
    if let Some(path) = explicit {
        debug!(path = %path.display(), "loading settings");
        return read(path);
    }
    match default_config_path() {
        Some(path) if path.exists() => {
            debug!(path = %path.display(), "loading settings");
            read(&path)
        }
        _ => {
            debug!("no settings file found, using defaults");
            Ok(Settings::default())
        }
    }
}

pub fn to_toml(settings: &Settings) -> FidcResult<String> {
    toml::to_string_pretty(settings).map_err(|e| FidcError::Config {
        path: "<settings>".into(),
        reason: e.to_string(),
    })
}
