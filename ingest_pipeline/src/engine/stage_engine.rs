// /////////////////////////////////////////////////////////////////////////////
// Optimized Adaptive Pipeline RS
// Copyright (c) 2025 Michael Gardner, A Bit of Help, Inc.
// SPDX-License-Identifier: BSD-3-Clause
// See LICENSE file in the project root.
// /////////////////////////////////////////////////////////////////////////////

//! Sequential stage orchestration over the blackboard. Grounded in
//! `adaptive_pipeline_domain::services::pipeline_service`'s stage
//! orchestration concept, simplified from its event/observer machinery
//! since a single in-process run has no listeners to notify: the engine's
//! only job is running each enabled stage in order and deciding whether a
//! failure aborts the run.

use ingest_domain::services::Stage;
use ingest_domain::{Blackboard, IngestError};
use std::sync::Arc;

/// Runs a fixed, ordered list of stages against one blackboard.
///
/// `validate_config` runs for every stage at construction time — a
/// misconfigured stage is a startup error, never a mid-run surprise.
pub struct StageEngine {
    stages: Vec<Arc<dyn Stage>>,
}

impl StageEngine {
    pub fn new(stages: Vec<Arc<dyn Stage>>) -> Result<Self, IngestError> {
        for stage in &stages {
            stage
                .validate_config()
                .map_err(|e| IngestError::stage_fatal(stage.name(), e))?;
        }
        Ok(Self { stages })
    }

    pub fn stage_names(&self) -> Vec<&str> {
        self.stages.iter().map(|s| s.name()).collect()
    }

    /// Runs every stage in declared order. A fatal `StageError` aborts the
    /// run immediately; a non-fatal one is logged and the run continues
    /// with the blackboard as it stood before that stage.
    pub async fn run(&self, mut board: Blackboard) -> Result<Blackboard, IngestError> {
        for stage in &self.stages {
            let before = board.clone();
            match stage.execute(board).await {
                Ok(next) => {
                    tracing::debug!(stage = stage.name(), "stage completed");
                    board = next;
                }
                Err(err) if err.fatal => {
                    tracing::error!(stage = stage.name(), error = %err.source, "fatal stage failure, aborting run");
                    return Err(IngestError::stage_fatal(err.stage, err.source));
                }
                Err(err) => {
                    tracing::warn!(stage = stage.name(), error = %err.source, "recoverable stage failure, continuing");
                    board = before;
                }
            }
        }
        Ok(board)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use ingest_domain::services::StageError;
    use std::sync::atomic::{AtomicUsize, Ordering};

    struct CountingStage {
        label: &'static str,
        calls: Arc<AtomicUsize>,
        fail: Option<bool>,
    }

    #[async_trait]
    impl Stage for CountingStage {
        fn name(&self) -> &str {
            self.label
        }

        fn validate_config(&self) -> Result<(), IngestError> {
            Ok(())
        }

        async fn execute(&self, board: Blackboard) -> Result<Blackboard, StageError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            match self.fail {
                Some(true) => Err(StageError::fatal(self.label, IngestError::configuration("boom"))),
                Some(false) => Err(StageError::recoverable(self.label, IngestError::configuration("meh"))),
                None => Ok(board),
            }
        }
    }

    #[tokio::test]
    async fn runs_all_stages_in_order_when_none_fail() {
        let calls = Arc::new(AtomicUsize::new(0));
        let engine = StageEngine::new(vec![
            Arc::new(CountingStage { label: "a", calls: calls.clone(), fail: None }),
            Arc::new(CountingStage { label: "b", calls: calls.clone(), fail: None }),
        ])
        .unwrap();
        engine.run(Blackboard::new()).await.unwrap();
        assert_eq!(calls.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn aborts_on_fatal_stage_error() {
        let calls = Arc::new(AtomicUsize::new(0));
        let engine = StageEngine::new(vec![
            Arc::new(CountingStage { label: "a", calls: calls.clone(), fail: Some(true) }),
            Arc::new(CountingStage { label: "b", calls: calls.clone(), fail: None }),
        ])
        .unwrap();
        let err = engine.run(Blackboard::new()).await.unwrap_err();
        assert!(err.to_string().contains("stage 'a' failed"));
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn continues_past_recoverable_stage_error() {
        let calls = Arc::new(AtomicUsize::new(0));
        let engine = StageEngine::new(vec![
            Arc::new(CountingStage { label: "a", calls: calls.clone(), fail: Some(false) }),
            Arc::new(CountingStage { label: "b", calls: calls.clone(), fail: None }),
        ])
        .unwrap();
        engine.run(Blackboard::new()).await.unwrap();
        assert_eq!(calls.load(Ordering::SeqCst), 2);
    }
}
