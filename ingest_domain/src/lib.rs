// /////////////////////////////////////////////////////////////////////////////
// Optimized Adaptive Pipeline RS
// Copyright (c) 2025 Michael Gardner, A Bit of Help, Inc.
// SPDX-License-Identifier: BSD-3-Clause
// See LICENSE file in the project root.
// /////////////////////////////////////////////////////////////////////////////

//! # Ingest Domain
//!
//! Pure, reusable business logic for the document-ingestion pipeline:
//! entities, value objects, and the service ports that infrastructure
//! adapters implement. No I/O, no async runtime dependency beyond the
//! `async_trait`-shaped ports themselves, no knowledge of YAML, HTTP, or any
//! concrete extractor/provider/backend.
//!
//! Following the layering this workspace is built on (domain → application/
//! infrastructure → bootstrap), this crate sits at the bottom: everything
//! here should be understandable, and testable, without starting a Tokio
//! runtime, touching the filesystem, or making a network call.

pub mod blackboard;
pub mod entities;
pub mod error;
pub mod services;
pub mod value_objects;

pub use blackboard::{Blackboard, BlackboardKey};
pub use error::{ErrorCategory, IngestError};
