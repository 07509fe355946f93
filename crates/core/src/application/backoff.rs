// Backoff after failed dispatches
use super::constants::MILLIS_PER_RETRY_SECOND;
use crate::port::TransportError;
use std::time::Duration;
use tracing::info;

/// Backoff policy
///
/// Determines how much longer than its pacing interval a queue waits after
/// a failed dispatch:
/// - 429 with a `retry-after` hint: the hint, in seconds, added on top
/// - anything else: nothing added, the queue resumes at its normal pace
///
/// The extension applies to the next dispatch only. There is no exponential
/// growth and no ceiling.
#[derive(Debug, Clone, Copy, Default)]
pub struct BackoffPolicy;

impl BackoffPolicy {
    pub fn new() -> Self {
        Self
    }

    /// Extra delay derived from the failure
    ///
    /// # Example
    /// ```text
    /// 429 + "retry-after: 2"  -> 2000ms
    /// 429 without the header  -> 0ms
    /// 503 + "retry-after: 2"  -> 0ms
    /// ```
    pub fn extension(&self, error: &TransportError) -> Duration {
        let Some(response) = error.as_not_ok() else {
            return Duration::ZERO;
        };
        if !response.is_rate_limited() {
            return Duration::ZERO;
        }

        match response.retry_after_secs() {
            Some(secs) => {
                // Float-to-int casts saturate, so absurd hints cannot overflow
                let extension =
                    Duration::from_millis((secs * MILLIS_PER_RETRY_SECOND).round() as u64);
                info!(
                    retry_after_secs = secs,
                    extension_ms = extension.as_millis() as u64,
                    "Rate limited upstream, extending queue delay"
                );
                extension
            }
            None => Duration::ZERO,
        }
    }
}
