// Copyright (c) AlphaVelocity.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use crate::config::{self, Settings};
use anyhow::Result;

pub fn handle(settings: &Settings) -> Result<()> {
    if let Some(path) = config::default_config_path() {
        println!("# default location: {}", path.display());
    }
    print!("{}", config::to_toml(settings)?);
    Ok(())
}
