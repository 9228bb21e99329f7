// /////////////////////////////////////////////////////////////////////////////
// Optimized Adaptive Pipeline RS
// Copyright (c) 2025 Michael Gardner, A Bit of Help, Inc.
// SPDX-License-Identifier: BSD-3-Clause
// See LICENSE file in the project root.
// /////////////////////////////////////////////////////////////////////////////

//! Enrichment subsystem: compliance metadata (content hash,
//! timestamp, sensitivity, document type, regulatory tags) attached to
//! every chunk before audit and embedding.

pub mod classifier;
pub mod stage;

pub use stage::EnrichmentStage;
