/// Batch reconciliation job files
///
/// A job is a JSON file `{users, points, points_to_well_rate}`. Running it
/// splits the cohort into batches of at most 200, submits each batch as its
/// own atomic reconcile and writes `<stem>-result.json` next to the input.
///
/// Reconcile batches carry no idempotency key, so a batch whose response is
/// lost is reported as failed and never resubmitted automatically.
use rewards_ledger::constants::MAX_BATCH_SIZE;
use rewards_ledger::{Address, Amount};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::{error, info, warn};

use crate::api::ReconcileResponse;
use crate::client::RelayerClient;
use crate::error::{Result, SdkError};

fn default_rate() -> Amount {
    rewards_ledger::constants::DEFAULT_REDEMPTION_RATE
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct JobFile {
    pub users: Vec<Address>,
    pub points: Vec<Amount>,
    #[serde(default = "default_rate")]
    pub points_to_well_rate: Amount,
}

impl JobFile {
    pub fn validate(&self) -> Result<()> {
        if self.users.len() != self.points.len() {
            return Err(SdkError::InvalidInput(format!(
                "users ({}) and points ({}) must have the same length",
                self.users.len(),
                self.points.len()
            )));
        }
        if self.users.is_empty() {
            return Err(SdkError::InvalidInput("job has no users".into()));
        }
        if self.points_to_well_rate == 0 {
            return Err(SdkError::InvalidInput("points_to_well_rate must be positive".into()));
        }
        Ok(())
    }

    /// Split into `(users, points)` chunks of at most `MAX_BATCH_SIZE`
    pub fn batches(&self) -> Vec<(&[Address], &[Amount])> {
        self.users
            .chunks(MAX_BATCH_SIZE)
            .zip(self.points.chunks(MAX_BATCH_SIZE))
            .collect()
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct JobResult {
    pub success: bool,
    pub transaction_hash: Option<String>,
    pub block_number: Option<u64>,
    pub gas_used: u64,
    pub users_reconciled: usize,
    pub total_points: Amount,
    #[serde(rename = "totalWELL")]
    pub total_well: Amount,
    pub users: Vec<Address>,
    pub points: Vec<Amount>,
    pub error: Option<String>,
}

impl JobResult {
    pub fn failed(job: &JobFile, error: String) -> Self {
        Self {
            success: false,
            users: job.users.clone(),
            points: job.points.clone(),
            error: Some(error),
            ..Default::default()
        }
    }
}

/// Outcome of one submitted batch
#[derive(Debug)]
pub enum BatchOutcome {
    Executed(ReconcileResponse),
    Failed(String),
}

/// Combine per-batch outcomes into one job result. Hashes are joined with
/// commas, the block number is the last executed batch's.
pub fn aggregate(job: &JobFile, outcomes: &[BatchOutcome]) -> JobResult {
    let mut result = JobResult {
        success: !outcomes.is_empty(),
        users: job.users.clone(),
        points: job.points.clone(),
        ..Default::default()
    };
    let mut hashes = Vec::new();
    let mut errors = Vec::new();

    for outcome in outcomes {
        match outcome {
            BatchOutcome::Executed(response) => {
                hashes.push(response.receipt.tx_hash.clone());
                result.block_number = Some(response.receipt.block_number);
                result.gas_used = result.gas_used.saturating_add(response.receipt.gas_used);
                result.users_reconciled += response.summary.users_reconciled;
                result.total_points = result.total_points.saturating_add(response.summary.total_points);
                result.total_well = result.total_well.saturating_add(response.summary.total_tokens);
            }
            BatchOutcome::Failed(message) => {
                result.success = false;
                errors.push(message.clone());
            }
        }
    }

    if !hashes.is_empty() {
        result.transaction_hash = Some(hashes.join(","));
    }
    if !errors.is_empty() {
        result.error = Some(errors.join("; "));
    }
    result
}

pub fn load_job(path: &Path) -> Result<JobFile> {
    let contents = std::fs::read_to_string(path)?;
    let job: JobFile =
        serde_json::from_str(&contents).map_err(|e| SdkError::Serialization(e.to_string()))?;
    job.validate()?;
    Ok(job)
}

/// `jobs/batch.json` -> `jobs/batch-result.json`
pub fn result_path(job_path: &Path) -> PathBuf {
    let stem = job_path
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_else(|| "job".to_string());
    job_path.with_file_name(format!("{}-result.json", stem))
}

pub fn write_result(path: &Path, result: &JobResult) -> Result<()> {
    let json =
        serde_json::to_string_pretty(result).map_err(|e| SdkError::Serialization(e.to_string()))?;
    std::fs::write(path, json)?;
    Ok(())
}

/// Submit every batch of `job` in order. A failed batch does not stop later
/// ones: each batch is independent and atomic on the ledger.
pub async fn run_job(client: &RelayerClient, job: &JobFile) -> JobResult {
    if let Err(e) = job.validate() {
        return JobResult::failed(job, e.to_string());
    }

    match client.rate().await {
        Ok(rate) if rate != job.points_to_well_rate => warn!(
            "Job assumes {} points per token but the ledger rate is {}",
            job.points_to_well_rate, rate
        ),
        Ok(_) => {}
        Err(e) => warn!("Could not read ledger rate: {}", e),
    }

    let batches = job.batches();
    let mut outcomes = Vec::with_capacity(batches.len());

    for (index, (users, points)) in batches.into_iter().enumerate() {
        match client.reconcile(users, points).await {
            Ok(response) => {
                info!(
                    "Batch {}: {} users reconciled in block {}",
                    index + 1,
                    response.summary.users_reconciled,
                    response.receipt.block_number
                );
                outcomes.push(BatchOutcome::Executed(response));
            }
            Err(e) => {
                error!("Batch {} failed: {}", index + 1, e);
                outcomes.push(BatchOutcome::Failed(format!("batch {}: {}", index + 1, e)));
            }
        }
    }

    aggregate(job, &outcomes)
}

/// Load, run and record a job file; returns the result and where it was written
pub async fn run_job_file(client: &RelayerClient, path: &Path) -> Result<(JobResult, PathBuf)> {
    let job = load_job(path)?;
    info!("Reconciling {} users from {}", job.users.len(), path.display());

    let result = run_job(client, &job).await;
    let out = result_path(path);
    write_result(&out, &result)?;
    Ok((result, out))
}
