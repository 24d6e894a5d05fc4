//! Connection acquisition with a fixed retry policy.

use crate::error::ConnectionError;
use crate::store::{Connection, StoreError};
use async_trait::async_trait;
use std::time::Duration;
use tracing::{debug, info, warn};

/// Default number of connection attempts.
pub const DEFAULT_CONNECT_ATTEMPTS: u32 = 5;
/// Default delay between connection attempts.
pub const DEFAULT_CONNECT_DELAY: Duration = Duration::from_secs(2);

/// Opens new store connections.
#[async_trait]
pub trait Connector: Send + Sync {
    type Connection: Connection;

    /// Human-readable target, without credentials.
    fn endpoint(&self) -> String;

    /// Make one connection attempt.
    async fn connect(&self) -> Result<Self::Connection, StoreError>;
}

/// Waits between connection attempts.
#[async_trait]
pub trait Sleeper: Send + Sync {
    async fn sleep(&self, duration: Duration);
}

/// [`Sleeper`] backed by the Tokio timer.
#[derive(Debug, Clone, Copy, Default)]
pub struct TokioSleeper;

#[async_trait]
impl Sleeper for TokioSleeper {
    async fn sleep(&self, duration: Duration) {
        tokio::time::sleep(duration).await;
    }
}

/// Fixed-delay retry policy: no backoff growth, no jitter.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    pub max_attempts: u32,
    pub delay: Duration,
}

impl RetryPolicy {
    /// A policy with at least one attempt.
    pub fn new(max_attempts: u32, delay: Duration) -> Self {
        Self {
            max_attempts: max_attempts.max(1),
            delay,
        }
    }
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self::new(DEFAULT_CONNECT_ATTEMPTS, DEFAULT_CONNECT_DELAY)
    }
}

/// Acquire a connection, retrying failed attempts.
///
/// Waits `policy.delay` after every failed attempt except the last. When all
/// `policy.max_attempts` attempts fail, returns a [`ConnectionError`] holding
/// the last underlying error.
pub async fn acquire<C, S>(
    connector: &C,
    policy: &RetryPolicy,
    sleeper: &S,
) -> Result<C::Connection, ConnectionError>
where
    C: Connector,
    S: Sleeper,
{
    let endpoint = connector.endpoint();
    let max_attempts = policy.max_attempts.max(1);
    debug!("Connecting to {}", endpoint);

    let mut attempt = 1;
    loop {
        match connector.connect().await {
            Ok(connection) => {
                if attempt > 1 {
                    info!("Connected to {} after {} attempts", endpoint, attempt);
                } else {
                    info!("Connected to {}", endpoint);
                }
                return Ok(connection);
            }
            Err(e) if attempt < max_attempts => {
                warn!(
                    "Failed to connect to '{}' (attempt {}/{}): {}. Retrying in {:?}...",
                    endpoint, attempt, max_attempts, e, policy.delay
                );
                sleeper.sleep(policy.delay).await;
                attempt += 1;
            }
            Err(e) => {
                warn!(
                    "Failed to connect to '{}' (attempt {}/{}): {}",
                    endpoint, attempt, max_attempts, e
                );
                return Err(ConnectionError {
                    endpoint,
                    attempts: attempt,
                    last_error: e,
                });
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::memory::{MemoryConnector, MemoryStore};
    use std::sync::Mutex;

    /// Records requested sleeps instead of waiting.
    #[derive(Default)]
    struct RecordingSleeper {
        sleeps: Mutex<Vec<Duration>>,
    }

    #[async_trait]
    impl Sleeper for RecordingSleeper {
        async fn sleep(&self, duration: Duration) {
            self.sleeps.lock().unwrap().push(duration);
        }
    }

    #[tokio::test]
    async fn test_first_attempt_succeeds() {
        let connector = MemoryConnector::new(MemoryStore::new());
        let sleeper = RecordingSleeper::default();

        let result = acquire(&connector, &RetryPolicy::default(), &sleeper).await;

        assert!(result.is_ok());
        assert_eq!(connector.attempts(), 1);
        assert!(sleeper.sleeps.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_recovers_on_fourth_attempt() {
        let connector = MemoryConnector::new(MemoryStore::new()).failing_first(3);
        let sleeper = RecordingSleeper::default();

        let result = acquire(&connector, &RetryPolicy::default(), &sleeper).await;

        assert!(result.is_ok());
        assert_eq!(connector.attempts(), 4);
        assert_eq!(
            *sleeper.sleeps.lock().unwrap(),
            vec![Duration::from_secs(2); 3]
        );
    }

    #[tokio::test]
    async fn test_exhausted_budget_fails() {
        let connector = MemoryConnector::new(MemoryStore::new()).failing_first(5);
        let sleeper = RecordingSleeper::default();

        let err = acquire(&connector, &RetryPolicy::default(), &sleeper)
            .await
            .err()
            .expect("acquire should fail");

        assert_eq!(err.attempts, 5);
        assert_eq!(connector.attempts(), 5);
        assert!(matches!(err.last_error, StoreError::Connect(_)));
        // No wait after the final attempt.
        assert_eq!(sleeper.sleeps.lock().unwrap().len(), 4);
    }

    #[tokio::test]
    async fn test_zero_attempts_still_tries_once() {
        let connector = MemoryConnector::new(MemoryStore::new());
        let sleeper = RecordingSleeper::default();
        let policy = RetryPolicy::new(0, Duration::from_millis(1));

        assert_eq!(policy.max_attempts, 1);
        assert!(acquire(&connector, &policy, &sleeper).await.is_ok());
    }
}
