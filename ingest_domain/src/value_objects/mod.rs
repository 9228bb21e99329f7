// /////////////////////////////////////////////////////////////////////////////
// Optimized Adaptive Pipeline RS
// Copyright (c) 2025 Michael Gardner, A Bit of Help, Inc.
// SPDX-License-Identifier: BSD-3-Clause
// See LICENSE file in the project root.
// /////////////////////////////////////////////////////////////////////////////

//! Value objects: small, immutable, self-validating types with no identity
//! of their own.

pub mod access_method;
pub mod chunking_strategy;
pub mod content_hash;
pub mod distance_metric;
pub mod extraction_profile;
pub mod generic_id;
pub mod run_id;
pub mod sensitivity;
pub mod stage_execution_id;

pub use access_method::AccessMethod;
pub use chunking_strategy::ChunkingStrategy;
pub use content_hash::ContentHash;
pub use distance_metric::DistanceMetric;
pub use extraction_profile::ExtractionProfile;
pub use generic_id::{GenericId, IdCategory};
pub use run_id::RunId;
pub use sensitivity::Sensitivity;
pub use stage_execution_id::StageExecutionId;
