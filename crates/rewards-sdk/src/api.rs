/// Request and response bodies of the relayer HTTP API
use rewards_ledger::{ActionId, Address, Amount, BadgeId, BatchSummary, Domain, Role};
use serde::{Deserialize, Serialize};

use crate::error::{Result, SdkError};

/// A signed mint authorization ready to be relayed
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RelayMintRequest {
    pub to: Address,
    pub amount: Amount,
    pub deadline: u64,
    pub action_id: ActionId,
    /// 65-byte `r || s || v`, hex encoded with `0x` prefix
    pub signature: String,
}

impl RelayMintRequest {
    pub fn signature_bytes(&self) -> Result<Vec<u8>> {
        let trimmed = self.signature.trim_start_matches("0x");
        hex::decode(trimmed).map_err(|e| SdkError::InvalidInput(format!("signature: {}", e)))
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuthorizeMintRequest {
    pub to: Address,
    pub amount: Amount,
}

/// Outcome of one ledger execution on the relayer
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Receipt {
    pub tx_hash: String,
    pub block_number: u64,
    pub success: bool,
    pub error: Option<String>,
    pub error_kind: Option<String>,
    pub gas_used: u64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RelayMintResponse {
    pub receipt: Receipt,
    pub action_id: ActionId,
    pub deadline: u64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ActionStatus {
    pub action_id: ActionId,
    pub used: bool,
    pub used_at: Option<u64>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReconcileRequest {
    pub users: Vec<Address>,
    pub points: Vec<Amount>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReconcileResponse {
    pub receipt: Receipt,
    pub summary: BatchSummary,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TriggerResponse {
    pub batches: Vec<ReconcileResponse>,
    pub users_reconciled: usize,
    pub total_points: Amount,
    pub total_tokens: Amount,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PendingStatus {
    pub pending_users: usize,
    pub pending_points: Amount,
    pub last_run: Option<u64>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PointsAward {
    pub user: Address,
    pub points: Amount,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PointsBalance {
    pub user: Address,
    pub total_points: Amount,
    pub points_reconciled: Amount,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RateBody {
    pub rate: Amount,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PauseRequest {
    pub reason: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RoleRequest {
    pub role: Role,
    pub account: Address,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BadgeMintRequest {
    pub to: Address,
    pub id: BadgeId,
    pub amount: Amount,
    #[serde(default)]
    pub soulbound: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AccountResponse {
    pub address: Address,
    pub balance: Amount,
    pub allowance_to_engine: Amount,
    pub roles: Vec<Role>,
    pub badges: Vec<BadgeHolding>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BadgeHolding {
    pub id: BadgeId,
    pub amount: Amount,
    pub soulbound: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RedeemCheck {
    pub user: Address,
    pub amount: Amount,
    pub can_redeem: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InfoResponse {
    pub chain_id: u64,
    pub domain: Domain,
    pub relay_minter: Address,
    pub engine: Address,
    pub backend_signer: Address,
    pub operator: Address,
    pub signer_available: bool,
    pub redemption_rate: Amount,
    pub total_supply: Amount,
    pub paused: bool,
    pub block_number: u64,
}

/// Error body returned with every non-2xx response
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorBody {
    pub success: bool,
    pub error: String,
    pub kind: String,
}
