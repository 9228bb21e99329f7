// /////////////////////////////////////////////////////////////////////////////
// Optimized Adaptive Pipeline RS
// Copyright (c) 2025 Michael Gardner, A Bit of Help, Inc.
// SPDX-License-Identifier: BSD-3-Clause
// See LICENSE file in the project root.
// /////////////////////////////////////////////////////////////////////////////

//! Identifies a single end-to-end pipeline run, from the first extraction
//! attempt through the storage report. Used to correlate audit records,
//! metrics, and log lines for one invocation.

use crate::error::IngestError;
use crate::value_objects::generic_id::{GenericId, IdCategory};
use serde::{Deserialize, Serialize};
use std::fmt::{self, Display};
use ulid::Ulid;

#[derive(Debug, Clone, Copy, Eq, PartialEq, Ord, PartialOrd, Hash, Serialize, Deserialize)]
pub struct RunId(GenericId<RunMarker>);

#[derive(Debug, Clone, Eq, PartialEq, Ord, PartialOrd, Hash, Serialize, Deserialize)]
struct RunMarker;

impl IdCategory for RunMarker {
    fn category_name() -> &'static str {
        "run"
    }

    fn validate_id(ulid: &Ulid) -> Result<(), IngestError> {
        if ulid.0 == 0 {
            return Err(IngestError::validation("run_id", "cannot be nil ULID"));
        }
        Ok(())
    }
}

impl RunId {
    pub fn new() -> Self {
        Self(GenericId::new())
    }

    pub fn from_string(s: &str) -> Result<Self, IngestError> {
        Ok(Self(GenericId::from_string(s)?))
    }

    pub fn timestamp_ms(&self) -> u64 {
        self.0.timestamp_ms()
    }
}

impl Default for RunId {
    fn default() -> Self {
        Self::new()
    }
}

impl Display for RunId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn two_ids_are_distinct_and_display() {
        let a = RunId::new();
        let b = RunId::new();
        assert_ne!(a, b);
        assert!(!a.to_string().is_empty());
    }

    #[test]
    fn roundtrips_through_string() {
        let a = RunId::new();
        let parsed = RunId::from_string(&a.to_string()).unwrap();
        assert_eq!(a, parsed);
    }
}
