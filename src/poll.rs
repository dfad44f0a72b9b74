//! Shared bounded polling loop for remote generation jobs.
//!
//! Both vendor clients poll a status endpoint at a fixed interval with a
//! bounded attempt count. The loop is parameterized by interval, attempt
//! budget and a status probe, and tolerates transient network errors during
//! a poll by logging and continuing rather than aborting.

use std::future::Future;
use std::time::Duration;

use crate::error::GenError;

/// Interval and attempt budget for one polling loop.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PollConfig {
    pub interval: Duration,
    pub max_attempts: u32,
}

impl PollConfig {
    pub const fn new(interval: Duration, max_attempts: u32) -> Self {
        Self {
            interval,
            max_attempts,
        }
    }

    /// Total wall-clock budget in minutes, derived from the actual interval.
    pub fn budget_minutes(&self) -> u64 {
        self.interval.as_secs() * u64::from(self.max_attempts) / 60
    }
}

/// One observation of a remote job's status.
#[derive(Debug, Clone, PartialEq)]
pub enum PollStatus<T> {
    /// Job still pending or in progress; keep polling.
    Pending,
    /// Terminal success with the result payload.
    Completed(T),
    /// Terminal failure with the remote error message.
    Failed(String),
}

/// How a polling loop ended without a completed job.
#[derive(Debug)]
pub enum PollError {
    /// The remote job reported a terminal failure.
    Failed(String),
    /// The attempt budget was exhausted without a terminal status.
    TimedOut,
    /// A non-transient error aborted the loop.
    Fatal(GenError),
}

/// Poll `probe` until it reports a terminal status or the budget runs out.
///
/// Transient network errors (connection failures, timeouts, 5xx gateway
/// responses) consume an attempt but do not abort the loop.
pub async fn poll_until_terminal<T, F, Fut>(
    config: PollConfig,
    mut probe: F,
) -> Result<T, PollError>
where
    F: FnMut(u32) -> Fut,
    Fut: Future<Output = Result<PollStatus<T>, GenError>>,
{
    for attempt in 1..=config.max_attempts {
        match probe(attempt).await {
            Ok(PollStatus::Completed(value)) => return Ok(value),
            Ok(PollStatus::Failed(message)) => return Err(PollError::Failed(message)),
            Ok(PollStatus::Pending) => {
                log::debug!(
                    "Job still processing (attempt {}/{})",
                    attempt,
                    config.max_attempts
                );
            }
            Err(GenError::Http(ref e)) if is_transient_network_error(e) => {
                log::warn!(
                    "Transient network error while polling (attempt {}/{}): {}. Continuing...",
                    attempt,
                    config.max_attempts,
                    e
                );
            }
            Err(e) => return Err(PollError::Fatal(e)),
        }

        tokio::time::sleep(config.interval).await;
    }

    Err(PollError::TimedOut)
}

/// Determine if a reqwest error is a transient network error worth tolerating.
///
/// Returns true for connection errors, timeouts, body transfer failures and
/// gateway-class server statuses. Returns false for errors that are unlikely
/// to resolve on a later poll.
pub fn is_transient_network_error(error: &reqwest::Error) -> bool {
    if error.is_connect() || error.is_timeout() || error.is_body() {
        return true;
    }

    // 502 Bad Gateway, 503 Service Unavailable, 504 Gateway Timeout
    if let Some(status) = error.status() {
        if matches!(status.as_u16(), 502 | 503 | 504) {
            return true;
        }
    }

    false
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicU32, Ordering};

    fn fast_config(max_attempts: u32) -> PollConfig {
        PollConfig::new(Duration::from_millis(1), max_attempts)
    }

    #[test]
    fn test_budget_minutes_from_actual_interval() {
        // 5s * 240 attempts = 20 minutes
        let cfg = PollConfig::new(Duration::from_secs(5), 240);
        assert_eq!(cfg.budget_minutes(), 20);

        // 5s * 180 attempts = 15 minutes
        let cfg = PollConfig::new(Duration::from_secs(5), 180);
        assert_eq!(cfg.budget_minutes(), 15);

        // 30s * 30 attempts = 15 minutes, not 30 * 5 / 60
        let cfg = PollConfig::new(Duration::from_secs(30), 30);
        assert_eq!(cfg.budget_minutes(), 15);
    }

    #[tokio::test]
    async fn test_completes_on_first_terminal_status() {
        let result: Result<&str, _> = poll_until_terminal(fast_config(10), |_| async {
            Ok(PollStatus::Completed("done"))
        })
        .await;
        assert_eq!(result.unwrap(), "done");
    }

    #[tokio::test]
    async fn test_pending_then_completed() {
        let calls = AtomicU32::new(0);
        let result: Result<u32, _> = poll_until_terminal(fast_config(10), |_| {
            let n = calls.fetch_add(1, Ordering::SeqCst);
            async move {
                if n < 3 {
                    Ok(PollStatus::Pending)
                } else {
                    Ok(PollStatus::Completed(n))
                }
            }
        })
        .await;
        assert_eq!(result.unwrap(), 3);
        assert_eq!(calls.load(Ordering::SeqCst), 4);
    }

    #[tokio::test]
    async fn test_failed_status_stops_polling() {
        let calls = AtomicU32::new(0);
        let result: Result<(), _> = poll_until_terminal(fast_config(10), |_| {
            calls.fetch_add(1, Ordering::SeqCst);
            async { Ok(PollStatus::Failed("remote error".to_string())) }
        })
        .await;
        match result {
            Err(PollError::Failed(msg)) => assert_eq!(msg, "remote error"),
            other => panic!("expected Failed, got {:?}", other.map(|_| ())),
        }
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_budget_exhaustion_times_out() {
        let calls = AtomicU32::new(0);
        let result: Result<(), _> = poll_until_terminal(fast_config(5), |_| {
            calls.fetch_add(1, Ordering::SeqCst);
            async { Ok(PollStatus::Pending) }
        })
        .await;
        assert!(matches!(result, Err(PollError::TimedOut)));
        // Exactly max_attempts probes, no infinite loop
        assert_eq!(calls.load(Ordering::SeqCst), 5);
    }

    #[tokio::test]
    async fn test_non_transient_error_aborts() {
        let result: Result<(), _> = poll_until_terminal(fast_config(10), |_| async {
            Err(GenError::Api("bad response".to_string()))
        })
        .await;
        assert!(matches!(result, Err(PollError::Fatal(GenError::Api(_)))));
    }
}
