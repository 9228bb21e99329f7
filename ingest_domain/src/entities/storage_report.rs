// /////////////////////////////////////////////////////////////////////////////
// Optimized Adaptive Pipeline RS
// Copyright (c) 2025 Michael Gardner, A Bit of Help, Inc.
// SPDX-License-Identifier: BSD-3-Clause
// See LICENSE file in the project root.
// /////////////////////////////////////////////////////////////////////////////

//! Summary of an upsert run against a vector store backend.

use crate::value_objects::DistanceMetric;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StorageReport {
    pub provider: String,
    pub stored_count: u64,
    pub failed_count: u64,
    pub deleted_count: u64,
    pub collection_identifier: String,
    pub distance_metric: DistanceMetric,
}

impl StorageReport {
    pub fn empty(provider: impl Into<String>, collection_identifier: impl Into<String>, distance_metric: DistanceMetric) -> Self {
        Self {
            provider: provider.into(),
            stored_count: 0,
            failed_count: 0,
            deleted_count: 0,
            collection_identifier: collection_identifier.into(),
            distance_metric,
        }
    }
}
