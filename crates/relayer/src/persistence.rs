use rewards_ledger::LedgerState;
use rewards_sdk::api::Receipt;
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use tracing::{error, info, warn};

use crate::error::{RelayerError, Result};
use crate::points_service::PointsBook;

/// Everything the relayer needs to resume after a restart
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Snapshot {
    pub ledger: LedgerState,
    pub receipts: BTreeMap<String, Receipt>,
    pub block_number: u64,
    pub points: PointsBook,
}

/// Borrowed view of a `Snapshot`; serializes to the same JSON
#[derive(Serialize)]
pub struct SnapshotRef<'a> {
    pub ledger: &'a LedgerState,
    pub receipts: &'a BTreeMap<String, Receipt>,
    pub block_number: u64,
    pub points: &'a PointsBook,
}

#[derive(Serialize, Deserialize)]
struct SnapshotFile<S> {
    snapshot: S,
    checksum: String,
}

fn compute_checksum<S: Serialize>(snapshot: &S) -> Result<String> {
    let bytes = serde_json::to_vec(snapshot)
        .map_err(|e| RelayerError::Persistence(format!("Serialize failed: {}", e)))?;
    let mut hasher = Sha256::new();
    hasher.update(b"rewards_relayer_state_v1:");
    hasher.update(&bytes);
    Ok(hex::encode(hasher.finalize()))
}

pub struct SnapshotStore {
    path: PathBuf,
}

impl SnapshotStore {
    pub fn new(dir: &Path) -> Self {
        if let Err(e) = std::fs::create_dir_all(dir) {
            warn!("Failed to create state directory {}: {}", dir.display(), e);
        }
        Self {
            path: dir.join("ledger_state.json"),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// `Ok(None)` only when no snapshot exists. An unreadable, unparseable or
    /// tampered file is an error and is left on disk untouched.
    pub fn load(&self) -> Result<Option<Snapshot>> {
        if !self.path.exists() {
            return Ok(None);
        }

        let data = std::fs::read_to_string(&self.path).map_err(|e| {
            error!("Failed to read {}: {}", self.path.display(), e);
            RelayerError::Persistence(format!("Read {} failed: {}", self.path.display(), e))
        })?;
        let file: SnapshotFile<Snapshot> = serde_json::from_str(&data).map_err(|e| {
            error!("Failed to parse {}: {}", self.path.display(), e);
            RelayerError::Persistence(format!("Parse {} failed: {}", self.path.display(), e))
        })?;

        if compute_checksum(&file.snapshot)? != file.checksum {
            error!("Checksum mismatch in {}", self.path.display());
            return Err(RelayerError::Persistence(format!(
                "Checksum mismatch in {}",
                self.path.display()
            )));
        }

        info!(
            "Loaded ledger snapshot at block {} ({} receipts, verified)",
            file.snapshot.block_number,
            file.snapshot.receipts.len()
        );
        Ok(Some(file.snapshot))
    }

    pub fn save(&self, snapshot: &SnapshotRef<'_>) -> Result<()> {
        let file = SnapshotFile {
            snapshot,
            checksum: compute_checksum(snapshot)?,
        };
        let json = serde_json::to_string_pretty(&file)
            .map_err(|e| RelayerError::Persistence(format!("Serialize failed: {}", e)))?;

        let temp_path = self.path.with_extension("tmp");
        std::fs::write(&temp_path, &json)
            .map_err(|e| RelayerError::Persistence(format!("Write failed: {}", e)))?;
        std::fs::rename(&temp_path, &self.path)
            .map_err(|e| RelayerError::Persistence(format!("Rename failed: {}", e)))?;

        Ok(())
    }
}
