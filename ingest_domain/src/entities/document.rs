// /////////////////////////////////////////////////////////////////////////////
// Optimized Adaptive Pipeline RS
// Copyright (c) 2025 Michael Gardner, A Bit of Help, Inc.
// SPDX-License-Identifier: BSD-3-Clause
// See LICENSE file in the project root.
// /////////////////////////////////////////////////////////////////////////////

//! A successful extraction, promoted to the blackboard. Read-only once
//! created.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::PathBuf;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Document {
    pub file_path: PathBuf,
    pub text: String,
    pub original_length: usize,
    pub cleaned_length: usize,
    pub extraction_method: String,
    pub confidence_score: f64,
    pub metadata: HashMap<String, serde_json::Value>,
    pub extracted_json_path: Option<PathBuf>,
}

impl Document {
    pub fn new(file_path: PathBuf, original_text: String, cleaned_text: String, extraction_method: impl Into<String>, confidence_score: f64) -> Self {
        Self {
            file_path,
            original_length: original_text.chars().count(),
            cleaned_length: cleaned_text.chars().count(),
            text: cleaned_text,
            extraction_method: extraction_method.into(),
            confidence_score: confidence_score.clamp(0.0, 1.0),
            metadata: HashMap::new(),
            extracted_json_path: None,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.text.is_empty()
    }
}
