use rewards_ledger::{
    ActionId, Address, Amount, BadgeId, Checkpoint, Context, EventRecord, InitializeParams,
    RewardsLedger, Role,
};
use rewards_sdk::api::{
    AccountResponse, ActionStatus, BadgeHolding, InfoResponse, PendingStatus, PointsBalance,
    Receipt, ReconcileRequest, ReconcileResponse, RedeemCheck, RelayMintRequest,
    RelayMintResponse, TriggerResponse,
};
use rewards_sdk::AuthorizationSigner;
use serde::Serialize;
use sha2::{Digest, Sha256};
use std::collections::{BTreeMap, VecDeque};
use tokio::sync::RwLock;
use tracing::{error, info, warn};

use crate::config::RelayerConfig;
use crate::error::{RelayerError, Result};
use crate::persistence::{SnapshotRef, SnapshotStore};
use crate::points_service::PointsBook;

pub const BASE_GAS: u64 = 21_000;
pub const GAS_PER_WRITE: u64 = 3_000;

/// Most events returned by one audit log query
pub const MAX_EVENTS_PER_PAGE: usize = 1_000;

/// Receipts kept for lookup; the oldest block's receipt is evicted first
pub const MAX_RECEIPTS: usize = 10_000;

pub fn now() -> u64 {
    std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .map(|d| d.as_secs())
        .unwrap_or(0)
}

/// Ledger plus the relayer's own bookkeeping, guarded by one lock
struct HostState {
    ledger: RewardsLedger,
    receipts: BTreeMap<String, Receipt>,
    /// Receipt hashes in block order
    receipt_order: VecDeque<String>,
    block_number: u64,
    points: PointsBook,
}

/// Host state as it was before a change, for undoing it
struct HostCheckpoint {
    ledger: Checkpoint,
    block_number: u64,
    points: PointsBook,
}

impl HostState {
    fn new(
        ledger: RewardsLedger,
        receipts: BTreeMap<String, Receipt>,
        block_number: u64,
        points: PointsBook,
    ) -> Self {
        let mut ordered: Vec<&Receipt> = receipts.values().collect();
        ordered.sort_by_key(|r| r.block_number);
        let receipt_order = ordered.into_iter().map(|r| r.tx_hash.clone()).collect();
        Self {
            ledger,
            receipts,
            receipt_order,
            block_number,
            points,
        }
    }

    fn snapshot(&self) -> SnapshotRef<'_> {
        SnapshotRef {
            ledger: self.ledger.state(),
            receipts: &self.receipts,
            block_number: self.block_number,
            points: &self.points,
        }
    }

    fn checkpoint(&self) -> HostCheckpoint {
        HostCheckpoint {
            ledger: self.ledger.checkpoint(),
            block_number: self.block_number,
            points: self.points.clone(),
        }
    }

    fn restore(&mut self, checkpoint: HostCheckpoint) {
        self.ledger.restore(checkpoint.ledger);
        while let Some(hash) = self.receipt_order.back() {
            let newer = self
                .receipts
                .get(hash)
                .map_or(true, |r| r.block_number > checkpoint.block_number);
            if !newer {
                break;
            }
            if let Some(hash) = self.receipt_order.pop_back() {
                self.receipts.remove(&hash);
            }
        }
        self.block_number = checkpoint.block_number;
        self.points = checkpoint.points;
    }

    fn record_receipt(&mut self, receipt: Receipt) {
        self.receipt_order.push_back(receipt.tx_hash.clone());
        self.receipts.insert(receipt.tx_hash.clone(), receipt);
        while self.receipt_order.len() > MAX_RECEIPTS {
            if let Some(oldest) = self.receipt_order.pop_front() {
                self.receipts.remove(&oldest);
            }
        }
    }

    /// Run one ledger call as `caller`. A failed call leaves no trace: no
    /// block, no receipt. A successful one is assigned the next block.
    fn execute<T, F>(&mut self, caller: Address, request: &impl Serialize, op: F) -> Result<(Receipt, T)>
    where
        F: FnOnce(&mut RewardsLedger, &Context) -> rewards_ledger::Result<T>,
    {
        let body = serde_json::to_vec(request)
            .map_err(|e| RelayerError::Internal(format!("Serialize failed: {}", e)))?;
        let ctx = Context::new(caller, now());
        let events_before = self.ledger.last_event_seq();

        let output = op(&mut self.ledger, &ctx)?;

        self.block_number += 1;
        let writes = self.ledger.last_event_seq().saturating_sub(events_before);
        let receipt = Receipt {
            tx_hash: tx_hash(self.block_number, &body),
            block_number: self.block_number,
            success: true,
            error: None,
            error_kind: None,
            gas_used: BASE_GAS.saturating_add(GAS_PER_WRITE.saturating_mul(writes)),
        };
        self.record_receipt(receipt.clone());
        Ok((receipt, output))
    }
}

/// `0x` + SHA-256 of the block number and the canonical request body
pub fn tx_hash(block_number: u64, body: &[u8]) -> String {
    let mut hasher = Sha256::new();
    hasher.update(block_number.to_be_bytes());
    hasher.update(body);
    format!("0x{}", hex::encode(hasher.finalize()))
}

pub struct LedgerService {
    inner: RwLock<HostState>,
    store: SnapshotStore,
    operator: Address,
    signer: Option<AuthorizationSigner>,
    chain_id: u64,
}

impl LedgerService {
    /// Restore from the snapshot under `config.state_path`, or bootstrap a
    /// fresh ledger with the operator as ADMIN and BACKEND
    pub fn new(config: &RelayerConfig) -> Result<Self> {
        let operator = config.operator();
        let store = SnapshotStore::new(&config.state_path);

        let host = match store.load()? {
            Some(snapshot) => {
                let ledger = RewardsLedger::from_state(snapshot.ledger);
                if ledger.backend_signer() != config.backend_signer {
                    warn!(
                        "Restored ledger trusts backend signer {}; configured {} is ignored",
                        ledger.backend_signer(),
                        config.backend_signer
                    );
                }
                HostState::new(ledger, snapshot.receipts, snapshot.block_number, snapshot.points)
            }
            None => {
                let params = InitializeParams {
                    redemption_rate: config.initial_rate,
                    ..InitializeParams::new(
                        operator,
                        config.backend_signer,
                        config.chain_id,
                        config.verifying_contract,
                        config.engine,
                        now(),
                    )
                };
                let mut ledger = RewardsLedger::initialize(params)?;
                ledger.grant_role(&Context::new(operator, now()), Role::Backend, operator)?;
                let host = HostState::new(ledger, BTreeMap::new(), 0, PointsBook::default());
                store.save(&host.snapshot())?;
                info!(
                    "Initialized new ledger (operator {}) at {}",
                    operator,
                    store.path().display()
                );
                host
            }
        };

        let chain_id = host.ledger.domain().chain_id;
        let signer = config.signer_key.as_ref().map(|key| {
            AuthorizationSigner::new((**key).clone(), host.ledger.domain().clone())
                .with_ttl(config.authorization_ttl_secs)
        });
        if let Some(signer) = &signer {
            if signer.address() != host.ledger.backend_signer() {
                warn!(
                    "Signer key {} is not the ledger's backend signer {} - /mint/authorize will be rejected",
                    signer.address(),
                    host.ledger.backend_signer()
                );
            }
        }

        let service = Self {
            inner: RwLock::new(host),
            store,
            operator,
            signer,
            chain_id,
        };
        Ok(service)
    }

    /// Apply `change` and write the snapshot. If either fails the host state
    /// is rolled back, so nothing is acknowledged that would not survive a
    /// restart.
    fn commit<T>(
        &self,
        host: &mut HostState,
        change: impl FnOnce(&mut HostState) -> Result<T>,
    ) -> Result<T> {
        let checkpoint = host.checkpoint();
        let result = change(host).and_then(|output| {
            self.store.save(&host.snapshot()).map_err(|e| {
                error!("Failed to persist ledger state, change rolled back: {}", e);
                e
            })?;
            Ok(output)
        });
        if result.is_err() {
            host.restore(checkpoint);
        }
        result
    }

    async fn execute<T, F>(&self, request: &impl Serialize, op: F) -> Result<(Receipt, T)>
    where
        F: FnOnce(&mut RewardsLedger, &Context) -> rewards_ledger::Result<T>,
    {
        let mut host = self.inner.write().await;
        let operator = self.operator;
        self.commit(&mut *host, |host| host.execute(operator, request, op))
    }

    pub async fn info(&self) -> InfoResponse {
        let host = self.inner.read().await;
        let ledger = &host.ledger;
        InfoResponse {
            chain_id: self.chain_id,
            domain: ledger.domain().clone(),
            relay_minter: ledger.domain().verifying_contract,
            engine: ledger.engine(),
            backend_signer: ledger.backend_signer(),
            operator: self.operator,
            signer_available: self.signer.is_some(),
            redemption_rate: ledger.get_rate(),
            total_supply: ledger.total_supply(),
            paused: ledger.is_paused(),
            block_number: host.block_number,
        }
    }

    pub async fn relay_mint(&self, request: RelayMintRequest) -> Result<RelayMintResponse> {
        let signature = request
            .signature_bytes()
            .map_err(|e| RelayerError::InvalidRequest(e.to_string()))?;

        let (receipt, ()) = self
            .execute(&request, |ledger, ctx| {
                ledger.mint_with_sig(
                    ctx,
                    request.to,
                    request.amount,
                    request.deadline,
                    request.action_id,
                    &signature,
                )
            })
            .await?;

        info!(
            "Relayed mint of {} to {} (action {}, block {})",
            request.amount, request.to, request.action_id, receipt.block_number
        );
        Ok(RelayMintResponse {
            receipt,
            action_id: request.action_id,
            deadline: request.deadline,
        })
    }

    pub async fn authorize_mint(&self, to: Address, amount: Amount) -> Result<RelayMintResponse> {
        let signer = self.signer.as_ref().ok_or(RelayerError::SignerUnavailable)?;
        let request = signer
            .authorize(to, amount, now())
            .map_err(|e| RelayerError::InvalidRequest(e.to_string()))?;
        self.relay_mint(request).await
    }

    pub async fn action_status(&self, action_id: &ActionId) -> ActionStatus {
        let host = self.inner.read().await;
        let used_at = host.ledger.action_used_at(action_id);
        ActionStatus {
            action_id: *action_id,
            used: used_at.is_some(),
            used_at,
        }
    }

    pub async fn receipt(&self, tx_hash: &str) -> Option<Receipt> {
        self.inner.read().await.receipts.get(tx_hash).cloned()
    }

    pub async fn reconcile(&self, request: ReconcileRequest) -> Result<ReconcileResponse> {
        let (receipt, summary) = self
            .execute(&request, |ledger, ctx| {
                ledger.batch_reconcile(ctx, &request.users, &request.points)
            })
            .await?;
        Ok(ReconcileResponse { receipt, summary })
    }

    pub async fn award_points(&self, user: Address, points: Amount) -> Result<PointsBalance> {
        let mut host = self.inner.write().await;
        self.commit(&mut *host, |host| host.points.award(user, points))
    }

    pub async fn points_of(&self, user: &Address) -> PointsBalance {
        self.inner.read().await.points.balance_of(user)
    }

    pub async fn reconcile_status(&self) -> PendingStatus {
        self.inner.read().await.points.status()
    }

    /// Convert every user's pending points, one atomic batch per chunk. A
    /// failed batch is logged and left pending; later batches still run.
    pub async fn reconcile_pending(&self) -> Result<TriggerResponse> {
        let mut host = self.inner.write().await;
        let operator = self.operator;
        let response = self.commit(&mut *host, |host| {
            let rate = host.ledger.get_rate();
            let batches = host.points.pending_batches(rate);

            let mut response = TriggerResponse {
                batches: Vec::with_capacity(batches.len()),
                users_reconciled: 0,
                total_points: 0,
                total_tokens: 0,
            };

            for batch in batches {
                let request = ReconcileRequest {
                    users: batch.iter().map(|(user, _)| *user).collect(),
                    points: batch.iter().map(|(_, points)| *points).collect(),
                };

                match host.execute(operator, &request, |ledger, ctx| {
                    ledger.batch_reconcile(ctx, &request.users, &request.points)
                }) {
                    Ok((receipt, summary)) => {
                        host.points.mark_reconciled(&batch, rate);
                        response.users_reconciled += summary.users_reconciled;
                        response.total_points = response.total_points.saturating_add(summary.total_points);
                        response.total_tokens = response.total_tokens.saturating_add(summary.total_tokens);
                        response.batches.push(ReconcileResponse { receipt, summary });
                    }
                    Err(e) => {
                        error!("Reconcile batch of {} users failed: {}", batch.len(), e);
                    }
                }
            }

            host.points.set_last_run(now());
            Ok(response)
        })?;

        info!(
            "Reconciled {} users in {} batches ({} tokens)",
            response.users_reconciled,
            response.batches.len(),
            response.total_tokens
        );
        Ok(response)
    }

    pub async fn account(&self, address: &Address) -> AccountResponse {
        let host = self.inner.read().await;
        let ledger = &host.ledger;
        AccountResponse {
            address: *address,
            balance: ledger.balance_of(address),
            allowance_to_engine: ledger.allowance(address, &ledger.engine()),
            roles: ledger.state().access.roles_of(address),
            badges: ledger
                .badge_holdings(address)
                .into_iter()
                .map(|(id, amount)| BadgeHolding {
                    id,
                    amount,
                    soulbound: ledger.is_soulbound(id),
                })
                .collect(),
        }
    }

    pub async fn redeem_check(&self, user: Address, amount: Amount) -> RedeemCheck {
        let host = self.inner.read().await;
        RedeemCheck {
            user,
            amount,
            can_redeem: host.ledger.can_user_redeem(&user, amount),
        }
    }

    pub async fn rate(&self) -> Amount {
        self.inner.read().await.ledger.get_rate()
    }

    pub async fn set_rate(&self, rate: Amount) -> Result<Receipt> {
        let (receipt, ()) = self
            .execute(&rate.to_string(), |ledger, ctx| ledger.set_rate(ctx, rate))
            .await?;
        Ok(receipt)
    }

    pub async fn pause(&self, reason: Option<String>) -> Result<Receipt> {
        let (receipt, ()) = self
            .execute(&("pause", &reason), |ledger, ctx| ledger.pause(ctx))
            .await?;
        warn!(
            "Ledger paused: {}",
            reason.as_deref().unwrap_or("no reason given")
        );
        Ok(receipt)
    }

    pub async fn unpause(&self) -> Result<Receipt> {
        let (receipt, ()) = self
            .execute(&"unpause", |ledger, ctx| ledger.unpause(ctx))
            .await?;
        info!("Ledger unpaused");
        Ok(receipt)
    }

    pub async fn grant_role(&self, role: Role, account: Address) -> Result<Receipt> {
        let (receipt, ()) = self
            .execute(&("grant", role, account), |ledger, ctx| {
                ledger.grant_role(ctx, role, account)
            })
            .await?;
        Ok(receipt)
    }

    pub async fn revoke_role(&self, role: Role, account: Address) -> Result<Receipt> {
        let (receipt, ()) = self
            .execute(&("revoke", role, account), |ledger, ctx| {
                ledger.revoke_role(ctx, role, account)
            })
            .await?;
        Ok(receipt)
    }

    pub async fn mint_badge(
        &self,
        to: Address,
        id: BadgeId,
        amount: Amount,
        soulbound: bool,
    ) -> Result<Receipt> {
        let (receipt, ()) = self
            .execute(&("badge", to, id, amount.to_string(), soulbound), |ledger, ctx| {
                ledger.mint_badge(ctx, to, id, amount, soulbound)
            })
            .await?;
        Ok(receipt)
    }

    pub async fn events_since(&self, seq: u64) -> Vec<EventRecord> {
        let host = self.inner.read().await;
        host.ledger
            .events_since(seq)
            .iter()
            .take(MAX_EVENTS_PER_PAGE)
            .cloned()
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use k256::ecdsa::SigningKey;
    use rewards_ledger::LedgerError;
    use std::sync::Arc;

    const ALICE: Address = Address([0xaa; 20]);
    const BOB: Address = Address([0xbb; 20]);

    fn config(dir: &std::path::Path, with_signer: bool) -> RelayerConfig {
        let signer = SigningKey::from_slice(&[0x42; 32]).unwrap();
        let operator = SigningKey::from_slice(&[0x07; 32]).unwrap();
        RelayerConfig {
            host: "127.0.0.1".into(),
            port: 0,
            chain_id: 31337,
            backend_signer: rewards_ledger::eip712::signing_key_address(&signer),
            operator_key: Arc::new(operator),
            signer_key: with_signer.then(|| Arc::new(signer)),
            verifying_contract: Address([0x10; 20]),
            engine: Address([0x11; 20]),
            initial_rate: 100,
            state_path: dir.to_path_buf(),
            reconcile_interval_secs: 60,
            authorization_ttl_secs: 300,
            api_key: None,
        }
    }

    async fn signer(service: &LedgerService) -> AuthorizationSigner {
        let domain = service.info().await.domain;
        AuthorizationSigner::new(SigningKey::from_slice(&[0x42; 32]).unwrap(), domain)
    }

    #[tokio::test]
    async fn test_authorize_mint_relays_and_records_receipt() {
        let dir = tempfile::tempdir().unwrap();
        let service = LedgerService::new(&config(dir.path(), true)).unwrap();

        let response = service.authorize_mint(ALICE, 50).await.unwrap();
        assert_eq!(response.receipt.block_number, 1);
        assert!(response.receipt.gas_used > BASE_GAS);

        assert_eq!(service.account(&ALICE).await.balance, 50);
        assert!(service.action_status(&response.action_id).await.used);
        assert_eq!(
            service.receipt(&response.receipt.tx_hash).await,
            Some(response.receipt)
        );
    }

    #[tokio::test]
    async fn test_authorize_without_signer_is_unavailable() {
        let dir = tempfile::tempdir().unwrap();
        let service = LedgerService::new(&config(dir.path(), false)).unwrap();

        let err = service.authorize_mint(ALICE, 50).await.unwrap_err();
        assert!(matches!(err, RelayerError::SignerUnavailable));
    }

    #[tokio::test]
    async fn test_failed_call_consumes_no_block() {
        let dir = tempfile::tempdir().unwrap();
        let service = LedgerService::new(&config(dir.path(), false)).unwrap();

        let err = service
            .reconcile(ReconcileRequest {
                users: vec![ALICE],
                points: vec![],
            })
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            RelayerError::Ledger(LedgerError::ArrayLengthMismatch { .. })
        ));
        assert_eq!(service.info().await.block_number, 0);
    }

    #[tokio::test]
    async fn test_reconcile_pending_carries_remainder() {
        let dir = tempfile::tempdir().unwrap();
        let service = LedgerService::new(&config(dir.path(), false)).unwrap();

        service.award_points(ALICE, 250).await.unwrap();
        service.award_points(BOB, 50).await.unwrap();

        let response = service.reconcile_pending().await.unwrap();
        assert_eq!(response.batches.len(), 1);
        assert_eq!(response.total_tokens, 2);
        assert_eq!(service.account(&ALICE).await.balance, 2);
        assert_eq!(service.points_of(&ALICE).await.points_reconciled, 200);

        let status = service.reconcile_status().await;
        assert_eq!(status.pending_points, 100);
        assert!(status.last_run.is_some());
    }

    #[tokio::test]
    async fn test_state_survives_restart() {
        let dir = tempfile::tempdir().unwrap();
        let tx_hash = {
            let service = LedgerService::new(&config(dir.path(), true)).unwrap();
            service.authorize_mint(ALICE, 75).await.unwrap().receipt.tx_hash
        };

        let restored = LedgerService::new(&config(dir.path(), true)).unwrap();
        assert_eq!(restored.account(&ALICE).await.balance, 75);
        assert!(restored.receipt(&tx_hash).await.is_some());
        assert_eq!(restored.info().await.block_number, 1);
    }

    #[tokio::test]
    async fn test_pause_blocks_relayed_mints() {
        let dir = tempfile::tempdir().unwrap();
        let service = LedgerService::new(&config(dir.path(), true)).unwrap();

        service.pause(Some("incident".into())).await.unwrap();
        let err = service.authorize_mint(ALICE, 1).await.unwrap_err();
        assert!(matches!(err, RelayerError::Ledger(LedgerError::Paused)));

        service.unpause().await.unwrap();
        service.authorize_mint(ALICE, 1).await.unwrap();
    }

    #[tokio::test]
    async fn test_corrupt_snapshot_stops_startup() {
        let dir = tempfile::tempdir().unwrap();
        let request = {
            let service = LedgerService::new(&config(dir.path(), false)).unwrap();
            let request = signer(&service).await.authorize(ALICE, 30, now()).unwrap();
            service.relay_mint(request.clone()).await.unwrap();
            let err = service.relay_mint(request.clone()).await.unwrap_err();
            assert!(matches!(
                err,
                RelayerError::Ledger(LedgerError::AuthorizationReplayed(_))
            ));
            request
        };

        let path = dir.path().join("ledger_state.json");
        let mut data = std::fs::read_to_string(&path).unwrap();
        data.push_str(" x");
        std::fs::write(&path, &data).unwrap();

        let err = LedgerService::new(&config(dir.path(), false))
            .err()
            .expect("corrupt snapshot must not bootstrap a fresh ledger");
        assert!(matches!(err, RelayerError::Persistence(_)));
        assert_eq!(std::fs::read_to_string(&path).unwrap(), data);

        // Repaired file restores the consumed action
        std::fs::write(&path, data.trim_end_matches(" x")).unwrap();
        let restored = LedgerService::new(&config(dir.path(), false)).unwrap();
        assert_eq!(restored.account(&ALICE).await.balance, 30);
        assert!(matches!(
            restored.relay_mint(request).await,
            Err(RelayerError::Ledger(LedgerError::AuthorizationReplayed(_)))
        ));
    }

    #[tokio::test]
    async fn test_failed_write_rolls_back_mint() {
        let dir = tempfile::tempdir().unwrap();
        let service = LedgerService::new(&config(dir.path(), false)).unwrap();
        let request = signer(&service).await.authorize(ALICE, 30, now()).unwrap();

        let blocked = dir.path().join("ledger_state.tmp");
        std::fs::create_dir(&blocked).unwrap();

        let err = service.relay_mint(request.clone()).await.unwrap_err();
        assert!(matches!(err, RelayerError::Persistence(_)));
        assert_eq!(service.account(&ALICE).await.balance, 0);
        assert!(!service.action_status(&request.action_id).await.used);
        assert_eq!(service.info().await.block_number, 0);
        assert!(service.events_since(0).await.iter().all(|r| !matches!(
            r.event,
            rewards_ledger::LedgerEvent::RelayMinted { .. }
        )));

        std::fs::remove_dir(&blocked).unwrap();
        let response = service.relay_mint(request).await.unwrap();
        assert_eq!(response.receipt.block_number, 1);
        assert_eq!(service.account(&ALICE).await.balance, 30);
    }

    #[tokio::test]
    async fn test_failed_write_rolls_back_points_and_reconcile() {
        let dir = tempfile::tempdir().unwrap();
        let service = LedgerService::new(&config(dir.path(), false)).unwrap();
        service.award_points(ALICE, 250).await.unwrap();

        let blocked = dir.path().join("ledger_state.tmp");
        std::fs::create_dir(&blocked).unwrap();

        assert!(matches!(
            service.award_points(BOB, 100).await,
            Err(RelayerError::Persistence(_))
        ));
        assert_eq!(service.points_of(&BOB).await.total_points, 0);

        assert!(matches!(
            service.reconcile_pending().await,
            Err(RelayerError::Persistence(_))
        ));
        assert_eq!(service.account(&ALICE).await.balance, 0);
        assert_eq!(service.points_of(&ALICE).await.points_reconciled, 0);
        assert!(service.reconcile_status().await.last_run.is_none());
    }

    #[tokio::test]
    async fn test_unwritable_state_path_fails_startup() {
        let dir = tempfile::tempdir().unwrap();
        let file = dir.path().join("not-a-dir");
        std::fs::write(&file, b"").unwrap();

        assert!(matches!(
            LedgerService::new(&config(&file, false)),
            Err(RelayerError::Persistence(_))
        ));
    }

    #[test]
    fn test_receipts_are_bounded() {
        let params = InitializeParams::new(
            Address([1; 20]),
            Address([2; 20]),
            31337,
            Address([0x10; 20]),
            Address([0x11; 20]),
            now(),
        );
        let ledger = RewardsLedger::initialize(params).unwrap();
        let mut host = HostState::new(ledger, BTreeMap::new(), 0, PointsBook::default());

        for block in 1..=(MAX_RECEIPTS as u64 + 5) {
            host.record_receipt(Receipt {
                tx_hash: tx_hash(block, b"{}"),
                block_number: block,
                success: true,
                error: None,
                error_kind: None,
                gas_used: BASE_GAS,
            });
        }

        assert_eq!(host.receipts.len(), MAX_RECEIPTS);
        assert!(!host.receipts.contains_key(&tx_hash(5, b"{}")));
        assert!(host.receipts.contains_key(&tx_hash(6, b"{}")));
    }

    #[test]
    fn test_tx_hash_depends_on_block() {
        assert_ne!(tx_hash(1, b"{}"), tx_hash(2, b"{}"));
        assert_eq!(tx_hash(1, b"{}").len(), 66);
    }
}
