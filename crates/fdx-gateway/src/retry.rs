//! Retry logic with exponential backoff for authority calls.
//!
//! Retries only errors flagged retryable by [`GatewayError::is_retryable`]
//! (transport failures, malformed responses). Everything else is returned
//! immediately.

use std::time::Duration;

use crate::error::GatewayError;

/// Maximum number of retry attempts after the initial request.
pub(crate) const MAX_RETRIES: u32 = 3;

/// Base delay between retries (doubles each attempt: 200ms, 400ms, 800ms).
const BASE_DELAY_MS: u64 = 200;

/// Run an authority call with exponential backoff retry.
///
/// The closure `f` is called up to `MAX_RETRIES + 1` times. Delays:
/// 200ms, then 400ms, then 800ms.
pub(crate) async fn retry_call<T, F, Fut>(endpoint: &str, f: F) -> Result<T, GatewayError>
where
    F: Fn() -> Fut,
    Fut: std::future::Future<Output = Result<T, GatewayError>>,
{
    // Retry attempts with backoff, then one final attempt without retry.
    for attempt in 0..MAX_RETRIES {
        match f().await {
            Ok(value) => return Ok(value),
            Err(e) if e.is_retryable() => {
                let delay = Duration::from_millis(BASE_DELAY_MS * 2u64.pow(attempt));
                tracing::warn!(
                    endpoint,
                    attempt = attempt + 1,
                    max_retries = MAX_RETRIES,
                    "authority call failed, retrying in {delay:?}: {e}"
                );
                tokio::time::sleep(delay).await;
            }
            Err(e) => return Err(e),
        }
    }
    // Final attempt, no more retries.
    f().await
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicU32, Ordering};
    use std::sync::Arc;

    fn transient() -> GatewayError {
        GatewayError::Transient {
            endpoint: "http://test/submit".into(),
            reason: "connection refused".into(),
        }
    }

    #[tokio::test(start_paused = true)]
    async fn exhausts_all_attempts_on_transient_failure() {
        let calls = Arc::new(AtomicU32::new(0));
        let cc = calls.clone();

        let result: Result<(), _> = retry_call("http://test/submit", || {
            let cc = cc.clone();
            async move {
                cc.fetch_add(1, Ordering::SeqCst);
                Err(transient())
            }
        })
        .await;

        assert!(result.is_err());
        assert_eq!(calls.load(Ordering::SeqCst), MAX_RETRIES + 1);
    }

    #[tokio::test(start_paused = true)]
    async fn succeeds_after_transient_failures() {
        let calls = Arc::new(AtomicU32::new(0));
        let cc = calls.clone();

        let result = retry_call("http://test/submit", || {
            let cc = cc.clone();
            async move {
                if cc.fetch_add(1, Ordering::SeqCst) < 2 {
                    Err(transient())
                } else {
                    Ok(42u16)
                }
            }
        })
        .await;

        assert_eq!(result.unwrap(), 42);
        assert_eq!(calls.load(Ordering::SeqCst), 3);
    }

    #[tokio::test]
    async fn non_retryable_errors_return_immediately() {
        let calls = Arc::new(AtomicU32::new(0));
        let cc = calls.clone();

        let result: Result<(), _> = retry_call("http://test/submit", || {
            let cc = cc.clone();
            async move {
                cc.fetch_add(1, Ordering::SeqCst);
                Err(GatewayError::Config {
                    reason: "bad base url".into(),
                })
            }
        })
        .await;

        assert!(matches!(result, Err(GatewayError::Config { .. })));
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }
}
