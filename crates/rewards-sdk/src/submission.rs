//! Idempotent relay submission
//!
//! A relayed mint is keyed by its action id, so resubmitting the same signed
//! request can never mint twice. The pipeline leans on that:
//!
//! 1. Transport failures (timeouts, refused connections, 5xx) are retried
//!    with a fixed backoff up to `max_attempts`.
//! 2. Ledger rejections are terminal and surfaced unchanged, except an
//!    `AuthorizationReplayed` after an earlier attempt whose outcome was
//!    lost: that means the earlier attempt landed.
//! 3. A returned receipt is confirmed by polling for it until a deadline.
//!    When no receipt shows up, the outcome is unknown and the pipeline asks
//!    whether the action id was consumed instead of assuming failure.

use async_trait::async_trait;
use rewards_ledger::ActionId;
use std::time::Duration;
use tracing::{info, warn};

use crate::api::{ActionStatus, Receipt, RelayMintRequest};
use crate::error::{Result, SdkError};

/// Endpoint that executes relayed requests on the ledger
#[async_trait]
pub trait Bundler: Send + Sync {
    async fn submit_relay_mint(&self, request: &RelayMintRequest) -> Result<Receipt>;

    async fn receipt(&self, tx_hash: &str) -> Result<Option<Receipt>>;

    async fn action_status(&self, action_id: &ActionId) -> Result<ActionStatus>;
}

#[derive(Debug, Clone)]
pub struct PipelineConfig {
    pub max_attempts: u32,
    pub retry_backoff: Duration,
    pub confirmation_timeout: Duration,
    pub poll_interval: Duration,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            retry_backoff: Duration::from_secs(2),
            confirmation_timeout: Duration::from_secs(30),
            poll_interval: Duration::from_secs(1),
        }
    }
}

impl PipelineConfig {
    pub fn with_max_attempts(mut self, attempts: u32) -> Self {
        self.max_attempts = attempts.max(1);
        self
    }

    pub fn with_retry_backoff(mut self, backoff: Duration) -> Self {
        self.retry_backoff = backoff;
        self
    }

    pub fn with_confirmation_timeout(mut self, timeout: Duration) -> Self {
        self.confirmation_timeout = timeout;
        self
    }

    pub fn with_poll_interval(mut self, interval: Duration) -> Self {
        self.poll_interval = interval;
        self
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SubmissionOutcome {
    /// Receipt was returned and found again on the relayer
    Confirmed(Receipt),
    /// No receipt is available, but the action id is consumed on the ledger
    ConsumedWithoutReceipt { action_id: ActionId, used_at: Option<u64> },
}

impl SubmissionOutcome {
    pub fn action_consumed(&self) -> bool {
        match self {
            SubmissionOutcome::Confirmed(receipt) => receipt.success,
            SubmissionOutcome::ConsumedWithoutReceipt { .. } => true,
        }
    }
}

pub struct SubmissionPipeline<B: Bundler> {
    bundler: B,
    config: PipelineConfig,
}

impl<B: Bundler> SubmissionPipeline<B> {
    pub fn new(bundler: B, config: PipelineConfig) -> Self {
        Self { bundler, config }
    }

    pub fn bundler(&self) -> &B {
        &self.bundler
    }

    pub async fn submit(&self, request: &RelayMintRequest) -> Result<SubmissionOutcome> {
        let mut outcome_lost = false;
        let mut last_error = String::new();

        for attempt in 1..=self.config.max_attempts {
            match self.bundler.submit_relay_mint(request).await {
                Ok(receipt) => {
                    info!(
                        "Action {} executed in block {} ({})",
                        request.action_id, receipt.block_number, receipt.tx_hash
                    );
                    return self.confirm(request, receipt).await;
                }
                Err(SdkError::Rejected { kind, message }) => {
                    if outcome_lost && kind == "AuthorizationReplayed" {
                        info!(
                            "Action {} was consumed by an earlier attempt",
                            request.action_id
                        );
                        return self.resolve_unknown(&request.action_id).await;
                    }
                    warn!("Action {} rejected: {} ({})", request.action_id, message, kind);
                    return Err(SdkError::Rejected { kind, message });
                }
                Err(e) if e.is_retryable() => {
                    warn!(
                        "Attempt {}/{} for action {} failed: {}",
                        attempt, self.config.max_attempts, request.action_id, e
                    );
                    outcome_lost = true;
                    last_error = e.to_string();

                    if let Ok(status) = self.bundler.action_status(&request.action_id).await {
                        if status.used {
                            return Ok(SubmissionOutcome::ConsumedWithoutReceipt {
                                action_id: status.action_id,
                                used_at: status.used_at,
                            });
                        }
                    }

                    if attempt < self.config.max_attempts {
                        tokio::time::sleep(self.config.retry_backoff).await;
                    }
                }
                Err(e) => return Err(e),
            }
        }

        Err(SdkError::RetriesExhausted {
            attempts: self.config.max_attempts,
            last_error,
        })
    }

    async fn confirm(&self, request: &RelayMintRequest, receipt: Receipt) -> Result<SubmissionOutcome> {
        let deadline = tokio::time::Instant::now() + self.config.confirmation_timeout;

        loop {
            match self.bundler.receipt(&receipt.tx_hash).await {
                Ok(Some(found)) => return Ok(SubmissionOutcome::Confirmed(found)),
                Ok(None) => {}
                Err(e) if e.is_retryable() => {
                    warn!("Receipt poll for {} failed: {}", receipt.tx_hash, e);
                }
                Err(e) => return Err(e),
            }

            if tokio::time::Instant::now() >= deadline {
                warn!(
                    "No receipt for {} within {:?}; checking action {}",
                    receipt.tx_hash, self.config.confirmation_timeout, request.action_id
                );
                return self.resolve_unknown(&request.action_id).await;
            }
            tokio::time::sleep(self.config.poll_interval).await;
        }
    }

    async fn resolve_unknown(&self, action_id: &ActionId) -> Result<SubmissionOutcome> {
        let status = self.bundler.action_status(action_id).await?;
        if status.used {
            return Ok(SubmissionOutcome::ConsumedWithoutReceipt {
                action_id: status.action_id,
                used_at: status.used_at,
            });
        }
        Err(SdkError::RetriesExhausted {
            attempts: self.config.max_attempts,
            last_error: format!("outcome of action {} unknown and not consumed", action_id),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rewards_ledger::Address;
    use rewards_network::NetworkError;
    use std::sync::Mutex;

    /// Scripted bundler: pops one submit result per call and records how
    /// many mints actually landed
    #[derive(Default)]
    struct MockBundler {
        submits: Mutex<Vec<Result<Receipt>>>,
        submit_calls: Mutex<u32>,
        consumed: Mutex<bool>,
        status_failures: Mutex<u32>,
        receipts_visible: bool,
    }

    impl MockBundler {
        fn scripted(results: Vec<Result<Receipt>>) -> Self {
            let mut results = results;
            results.reverse();
            Self {
                submits: Mutex::new(results),
                receipts_visible: true,
                ..Default::default()
            }
        }

        fn calls(&self) -> u32 {
            *self.submit_calls.lock().unwrap()
        }
    }

    #[async_trait]
    impl Bundler for MockBundler {
        async fn submit_relay_mint(&self, _request: &RelayMintRequest) -> Result<Receipt> {
            *self.submit_calls.lock().unwrap() += 1;
            let next = self
                .submits
                .lock()
                .unwrap()
                .pop()
                .unwrap_or_else(|| Err(timeout()));
            next
        }

        async fn receipt(&self, tx_hash: &str) -> Result<Option<Receipt>> {
            if !self.receipts_visible {
                return Ok(None);
            }
            Ok(Some(receipt(tx_hash)))
        }

        async fn action_status(&self, action_id: &ActionId) -> Result<ActionStatus> {
            {
                let mut failures = self.status_failures.lock().unwrap();
                if *failures > 0 {
                    *failures -= 1;
                    return Err(timeout());
                }
            }
            let used = *self.consumed.lock().unwrap();
            Ok(ActionStatus {
                action_id: *action_id,
                used,
                used_at: used.then_some(1_000),
            })
        }
    }

    fn timeout() -> SdkError {
        SdkError::Network(NetworkError::Timeout("request timed out".into()))
    }

    fn receipt(tx_hash: &str) -> Receipt {
        Receipt {
            tx_hash: tx_hash.to_string(),
            block_number: 7,
            success: true,
            error: None,
            error_kind: None,
            gas_used: 21_000,
        }
    }

    fn rejected(kind: &str) -> SdkError {
        SdkError::Rejected {
            kind: kind.to_string(),
            message: "rejected".to_string(),
        }
    }

    fn request() -> RelayMintRequest {
        RelayMintRequest {
            to: Address([0xaa; 20]),
            amount: 10,
            deadline: 2_000,
            action_id: ActionId([9; 32]),
            signature: format!("0x{}", "11".repeat(65)),
        }
    }

    fn fast_config() -> PipelineConfig {
        PipelineConfig::default()
            .with_max_attempts(3)
            .with_retry_backoff(Duration::from_millis(1))
            .with_confirmation_timeout(Duration::from_millis(20))
            .with_poll_interval(Duration::from_millis(1))
    }

    #[tokio::test]
    async fn test_receipt_is_confirmed() {
        let bundler = MockBundler::scripted(vec![Ok(receipt("0xabc"))]);
        let pipeline = SubmissionPipeline::new(bundler, fast_config());

        let outcome = pipeline.submit(&request()).await.unwrap();
        assert_eq!(outcome, SubmissionOutcome::Confirmed(receipt("0xabc")));
        assert_eq!(pipeline.bundler().calls(), 1);
    }

    #[tokio::test]
    async fn test_timed_out_submission_that_landed_is_not_resubmitted() {
        let bundler = MockBundler::scripted(vec![Err(timeout())]);
        // The relayer executed the mint but the response was lost
        *bundler.consumed.lock().unwrap() = true;
        let pipeline = SubmissionPipeline::new(bundler, fast_config());

        let outcome = pipeline.submit(&request()).await.unwrap();
        assert!(outcome.action_consumed());
        assert!(matches!(
            outcome,
            SubmissionOutcome::ConsumedWithoutReceipt { used_at: Some(1_000), .. }
        ));
        assert_eq!(pipeline.bundler().calls(), 1);
    }

    #[tokio::test]
    async fn test_replay_after_lost_outcome_counts_as_consumed() {
        let bundler = MockBundler::scripted(vec![
            Err(timeout()),
            Err(rejected("AuthorizationReplayed")),
        ]);
        // The first attempt landed, but the status check after it failed too
        *bundler.consumed.lock().unwrap() = true;
        *bundler.status_failures.lock().unwrap() = 1;
        let pipeline = SubmissionPipeline::new(bundler, fast_config());

        let outcome = pipeline.submit(&request()).await.unwrap();
        assert!(outcome.action_consumed());
        assert_eq!(pipeline.bundler().calls(), 2);
    }

    #[tokio::test]
    async fn test_rejection_is_not_retried() {
        let bundler = MockBundler::scripted(vec![Err(rejected("AuthorizationExpired"))]);
        let pipeline = SubmissionPipeline::new(bundler, fast_config());

        let err = pipeline.submit(&request()).await.unwrap_err();
        assert_eq!(err.rejection_kind(), Some("AuthorizationExpired"));
        assert_eq!(pipeline.bundler().calls(), 1);
    }

    #[tokio::test]
    async fn test_replay_on_first_attempt_is_a_rejection() {
        let bundler = MockBundler::scripted(vec![Err(rejected("AuthorizationReplayed"))]);
        let pipeline = SubmissionPipeline::new(bundler, fast_config());

        let err = pipeline.submit(&request()).await.unwrap_err();
        assert_eq!(err.rejection_kind(), Some("AuthorizationReplayed"));
    }

    #[tokio::test]
    async fn test_transport_failures_exhaust_attempts() {
        let bundler = MockBundler::scripted(vec![Err(timeout()), Err(timeout()), Err(timeout())]);
        let pipeline = SubmissionPipeline::new(bundler, fast_config());

        let err = pipeline.submit(&request()).await.unwrap_err();
        assert!(matches!(err, SdkError::RetriesExhausted { attempts: 3, .. }));
        assert_eq!(pipeline.bundler().calls(), 3);
    }

    #[tokio::test]
    async fn test_missing_receipt_falls_back_to_action_status() {
        let mut bundler = MockBundler::scripted(vec![Ok(receipt("0xdef"))]);
        bundler.receipts_visible = false;
        *bundler.consumed.lock().unwrap() = true;
        let pipeline = SubmissionPipeline::new(bundler, fast_config());

        let outcome = pipeline.submit(&request()).await.unwrap();
        assert!(matches!(outcome, SubmissionOutcome::ConsumedWithoutReceipt { .. }));
    }
}
