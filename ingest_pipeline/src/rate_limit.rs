// /////////////////////////////////////////////////////////////////////////////
// Optimized Adaptive Pipeline RS
// Copyright (c) 2025 Michael Gardner, A Bit of Help, Inc.
// SPDX-License-Identifier: BSD-3-Clause
// See LICENSE file in the project root.
// /////////////////////////////////////////////////////////////////////////////

//! Rate-limit/retry wrapper shared by every outbound LLM and embedding call:
//! a preventive delay before each attempt, then
//! on a recognised rate-limit error a backoff sleep and retry up to
//! `max_retries`, doubling the delay each attempt when `exponential_backoff`
//! is set. Non-rate-limit errors propagate immediately; exhausting retries
//! re-raises the last error.

use crate::config::RateLimitConfig;
use ingest_domain::IngestError;
use std::future::Future;
use std::time::Duration;

/// Runs `call` under the rate-limit contract described above. `call` is
/// invoked fresh on every attempt since the underlying request can't be
/// replayed.
pub async fn with_retry<F, Fut, T>(config: &RateLimitConfig, mut call: F) -> Result<T, IngestError>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T, IngestError>>,
{
    if config.delay_between_requests_ms > 0 {
        tokio::time::sleep(Duration::from_millis(config.delay_between_requests_ms)).await;
    }

    let mut attempt = 0u32;
    loop {
        match call().await {
            Ok(value) => return Ok(value),
            Err(err) if is_rate_limit(&err) => {
                if attempt >= config.max_retries {
                    return Err(err);
                }
                let delay = backoff_delay(config, attempt);
                tracing::warn!(attempt = attempt + 1, max_retries = config.max_retries, delay_secs = delay.as_secs(), "rate limited, retrying");
                tokio::time::sleep(delay).await;
                attempt += 1;
            }
            Err(err) => return Err(err),
        }
    }
}

fn is_rate_limit(err: &IngestError) -> bool {
    err.is_rate_limit() || err.to_string().to_lowercase().contains("rate")
}

fn backoff_delay(config: &RateLimitConfig, attempt: u32) -> Duration {
    let base = config.retry_delay_base_secs;
    let secs = if config.exponential_backoff {
        base.saturating_mul(1u64 << attempt.min(16))
    } else {
        base
    };
    Duration::from_secs(secs)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicU32, Ordering};
    use std::sync::Arc;
    use std::time::Instant;

    fn fast_config(max_retries: u32) -> RateLimitConfig {
        RateLimitConfig {
            delay_between_requests_ms: 0,
            retry_delay_base_secs: 0,
            max_retries,
            exponential_backoff: true,
        }
    }

    #[tokio::test]
    async fn succeeds_immediately_without_retry() {
        let config = fast_config(3);
        let calls = Arc::new(AtomicU32::new(0));
        let calls_clone = calls.clone();
        let result: Result<u32, IngestError> = with_retry(&config, || {
            let calls = calls_clone.clone();
            async move {
                calls.fetch_add(1, Ordering::SeqCst);
                Ok(42)
            }
        })
        .await;
        assert_eq!(result.unwrap(), 42);
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn retries_on_rate_limit_then_succeeds() {
        let config = fast_config(3);
        let calls = Arc::new(AtomicU32::new(0));
        let calls_clone = calls.clone();
        let result: Result<u32, IngestError> = with_retry(&config, || {
            let calls = calls_clone.clone();
            async move {
                let n = calls.fetch_add(1, Ordering::SeqCst);
                if n < 2 {
                    Err(IngestError::RateLimited { retry_after_secs: 1 })
                } else {
                    Ok(7)
                }
            }
        })
        .await;
        assert_eq!(result.unwrap(), 7);
        assert_eq!(calls.load(Ordering::SeqCst), 3);
    }

    #[tokio::test]
    async fn propagates_non_rate_limit_errors_immediately() {
        let config = fast_config(5);
        let calls = Arc::new(AtomicU32::new(0));
        let calls_clone = calls.clone();
        let result: Result<u32, IngestError> = with_retry(&config, || {
            let calls = calls_clone.clone();
            async move {
                calls.fetch_add(1, Ordering::SeqCst);
                Err(IngestError::EmbeddingProvider("bad request".to_string()))
            }
        })
        .await;
        assert!(result.is_err());
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn exhausts_retries_and_returns_last_error() {
        let config = fast_config(2);
        let calls = Arc::new(AtomicU32::new(0));
        let calls_clone = calls.clone();
        let result: Result<u32, IngestError> = with_retry(&config, || {
            let calls = calls_clone.clone();
            async move {
                calls.fetch_add(1, Ordering::SeqCst);
                Err(IngestError::RateLimited { retry_after_secs: 1 })
            }
        })
        .await;
        assert!(result.is_err());
        assert_eq!(calls.load(Ordering::SeqCst), 3); // initial + 2 retries
    }

    #[tokio::test]
    async fn exponential_backoff_doubles_each_attempt() {
        let config = RateLimitConfig {
            delay_between_requests_ms: 0,
            retry_delay_base_secs: 1,
            max_retries: 2,
            exponential_backoff: true,
        };
        let calls = Arc::new(AtomicU32::new(0));
        let calls_clone = calls.clone();
        let start = Instant::now();
        let _: Result<u32, IngestError> = with_retry(&config, || {
            let calls = calls_clone.clone();
            async move {
                calls.fetch_add(1, Ordering::SeqCst);
                Err(IngestError::RateLimited { retry_after_secs: 1 })
            }
        })
        .await;
        // attempt 0 -> sleep 1s, attempt 1 -> sleep 2s: >= 3s total (scenario 6).
        assert!(start.elapsed() >= Duration::from_secs(3));
    }
}
