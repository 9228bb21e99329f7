// /////////////////////////////////////////////////////////////////////////////
// Optimized Adaptive Pipeline RS
// Copyright (c) 2025 Michael Gardner, A Bit of Help, Inc.
// SPDX-License-Identifier: BSD-3-Clause
// See LICENSE file in the project root.
// /////////////////////////////////////////////////////////////////////////////

//! Named fallback-chain presets (`speed`, `memory`, `compromise`, `quality`,
//! `custom`) selected by `FallbackManager` construction. The actual
//! ordered extractor-name lists live in `ingest_pipeline::extraction`, since
//! they name concrete infrastructure extractors the domain layer must not
//! depend on.

use serde::{Deserialize, Serialize};
use std::fmt::{self, Display};

#[derive(Debug, Clone, Copy, Eq, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ExtractionProfile {
    Speed,
    Memory,
    Compromise,
    Quality,
    Custom,
}

impl ExtractionProfile {
    pub fn as_str(&self) -> &'static str {
        match self {
            ExtractionProfile::Speed => "speed",
            ExtractionProfile::Memory => "memory",
            ExtractionProfile::Compromise => "compromise",
            ExtractionProfile::Quality => "quality",
            ExtractionProfile::Custom => "custom",
        }
    }
}

impl Display for ExtractionProfile {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl std::str::FromStr for ExtractionProfile {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "speed" => Ok(ExtractionProfile::Speed),
            "memory" => Ok(ExtractionProfile::Memory),
            "compromise" => Ok(ExtractionProfile::Compromise),
            "quality" => Ok(ExtractionProfile::Quality),
            "custom" => Ok(ExtractionProfile::Custom),
            other => Err(format!("unknown extraction profile '{other}'")),
        }
    }
}
