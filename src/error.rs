// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum FidcError {
    #[error("Remote fair-value service unreachable: {0}")]
    RemoteTransport(#[from] reqwest::Error),

    #[error("Remote fair-value service answered {status}: {body}")]
    RemoteStatus { status: u16, body: String },

    #[error("Remote fair-value service returned an unreadable payload: {0}")]
    RemoteDecode(#[from] serde_json::Error),

    #[error("Remote engine selected but no remote_url configured")]
    MissingRemoteUrl,

    #[error("Invalid configuration in {path}: {reason}")]
    Config { path: String, reason: String },
}

pub type FidcResult<T> = Result<T, FidcError>;
