//! Session Bootstrap
//!
//! Exchanges the host credential for the initial balance and statistics.
//! The handshake is idempotent, so transient failures are retried.

use backoff::backoff::Backoff;
use shared::errors::ServiceError;
use shared::Credential;
use tracing::{info, warn};

use crate::domain::Session;
use crate::errors::BootstrapError;
use crate::retry_strategy::RetryStrategy;
use crate::settlement_client::SettlementApi;

pub async fn bootstrap<A>(
    api: &A,
    credential: Option<&Credential>,
    retry: &RetryStrategy,
) -> Result<Session, BootstrapError>
where
    A: SettlementApi + ?Sized,
{
    let credential = credential.ok_or_else(ServiceError::empty_credential)?;
    let mut backoff = retry.create_backoff();
    let mut attempt = 0;

    loop {
        match api.handshake(credential).await {
            Ok(session) => {
                info!(
                    attempt,
                    balance = %session.balance,
                    games = session.stats.games_played,
                    "Session bootstrapped"
                );
                return Ok(session);
            }
            Err(error) if retry.is_retryable_error(&error) && retry.should_retry(attempt) => {
                attempt += 1;
                let delay = backoff.next_backoff().unwrap_or(backoff.max_interval);
                warn!(
                    attempt,
                    error = %error,
                    backoff_ms = delay.as_millis() as u64,
                    "Handshake failed, retrying"
                );
                tokio::time::sleep(delay).await;
            }
            Err(error) => {
                warn!(attempt, error = %error, "Handshake failed");
                metrics::counter!("bootstrap_failures_total").increment(1);
                return Err(BootstrapError { reason: error });
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{SessionStats, WagerOutcome, WagerRequest};
    use async_trait::async_trait;
    use chrono::Utc;
    use shared::Amount;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Mutex;

    /// Replays scripted handshake results in order
    struct ScriptedHandshake {
        replies: Mutex<Vec<Result<f64, ServiceError>>>,
        calls: AtomicUsize,
    }

    impl ScriptedHandshake {
        fn new(mut replies: Vec<Result<f64, ServiceError>>) -> Self {
            replies.reverse();
            Self {
                replies: Mutex::new(replies),
                calls: AtomicUsize::new(0),
            }
        }
    }

    #[async_trait]
    impl SettlementApi for ScriptedHandshake {
        async fn handshake(&self, credential: &Credential) -> Result<Session, ServiceError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            let reply = self.replies.lock().unwrap().pop().expect("unexpected handshake");
            reply.map(|balance| Session {
                credential: credential.clone(),
                balance: Amount::new(balance).unwrap(),
                username: None,
                stats: SessionStats::default(),
                refreshed_at: Utc::now(),
            })
        }

        async fn play(&self, _request: &WagerRequest) -> Result<WagerOutcome, ServiceError> {
            unreachable!("bootstrap never plays")
        }
    }

    fn credential() -> Credential {
        Credential::new("user=1").unwrap()
    }

    #[tokio::test]
    async fn test_missing_credential_makes_no_call() {
        let api = ScriptedHandshake::new(vec![]);
        let error = bootstrap(&api, None, &RetryStrategy::new(2)).await.unwrap_err();
        assert_eq!(error.reason.code, "VALIDATION_EMPTY_CREDENTIAL");
        assert_eq!(api.calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn test_transient_failures_are_retried() {
        let api = ScriptedHandshake::new(vec![
            Err(ServiceError::transport("connection refused")),
            Err(ServiceError::http_status(502)),
            Ok(20.5),
        ]);
        let session = bootstrap(&api, Some(&credential()), &RetryStrategy::new(2))
            .await
            .unwrap();
        assert_eq!(session.balance.as_f64(), 20.5);
        assert_eq!(api.calls.load(Ordering::SeqCst), 3);
    }

    #[tokio::test(start_paused = true)]
    async fn test_retries_are_bounded() {
        let api = ScriptedHandshake::new(vec![
            Err(ServiceError::transport("down")),
            Err(ServiceError::transport("down")),
        ]);
        let error = bootstrap(&api, Some(&credential()), &RetryStrategy::new(1))
            .await
            .unwrap_err();
        assert_eq!(error.reason.code, "NETWORK_TRANSPORT");
        assert_eq!(api.calls.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn test_rejection_is_not_retried() {
        let api = ScriptedHandshake::new(vec![Err(ServiceError::rejected(Some(
            "Invalid authentication".to_string(),
        )))]);
        let error = bootstrap(&api, Some(&credential()), &RetryStrategy::new(5))
            .await
            .unwrap_err();
        assert_eq!(error.reason.user_message(), "Invalid authentication");
        assert_eq!(api.calls.load(Ordering::SeqCst), 1);
    }
}
