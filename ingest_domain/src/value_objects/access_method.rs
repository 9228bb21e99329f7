// /////////////////////////////////////////////////////////////////////////////
// Optimized Adaptive Pipeline RS
// Copyright (c) 2025 Michael Gardner, A Bit of Help, Inc.
// SPDX-License-Identifier: BSD-3-Clause
// See LICENSE file in the project root.
// /////////////////////////////////////////////////////////////////////////////

//! How a named provider is reached.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, Eq, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AccessMethod {
    Local,
    OpenAiCompatible,
    HuggingFaceInferenceApi,
}

impl std::str::FromStr for AccessMethod {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "local" => Ok(AccessMethod::Local),
            "openai_compatible" => Ok(AccessMethod::OpenAiCompatible),
            "huggingface_inference_api" => Ok(AccessMethod::HuggingFaceInferenceApi),
            other => Err(format!("unknown access method '{other}'")),
        }
    }
}
