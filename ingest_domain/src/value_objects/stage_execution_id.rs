// /////////////////////////////////////////////////////////////////////////////
// Optimized Adaptive Pipeline RS
// Copyright (c) 2025 Michael Gardner, A Bit of Help, Inc.
// SPDX-License-Identifier: BSD-3-Clause
// See LICENSE file in the project root.
// /////////////////////////////////////////////////////////////////////////////

//! Identifies one stage's execution within a run, for per-stage status
//! records and log correlation.

use crate::error::IngestError;
use crate::value_objects::generic_id::{GenericId, IdCategory};
use serde::{Deserialize, Serialize};
use std::fmt::{self, Display};
use ulid::Ulid;

#[derive(Debug, Clone, Copy, Eq, PartialEq, Ord, PartialOrd, Hash, Serialize, Deserialize)]
pub struct StageExecutionId(GenericId<StageExecutionMarker>);

#[derive(Debug, Clone, Eq, PartialEq, Ord, PartialOrd, Hash, Serialize, Deserialize)]
struct StageExecutionMarker;

impl IdCategory for StageExecutionMarker {
    fn category_name() -> &'static str {
        "stage_execution"
    }

    fn validate_id(ulid: &Ulid) -> Result<(), IngestError> {
        if ulid.0 == 0 {
            return Err(IngestError::validation("stage_execution_id", "cannot be nil ULID"));
        }
        Ok(())
    }
}

impl StageExecutionId {
    pub fn new() -> Self {
        Self(GenericId::new())
    }
}

impl Default for StageExecutionId {
    fn default() -> Self {
        Self::new()
    }
}

impl Display for StageExecutionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_ids_are_unique() {
        assert_ne!(StageExecutionId::new(), StageExecutionId::new());
    }
}
