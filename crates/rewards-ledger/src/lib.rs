//! Rewards ledger
//!
//! Deterministic core of the rewards system: role-gated WELL token ledger,
//! EIP-712 relayed minting with one-time action ids, voucher redemption,
//! atomic batch point reconciliation and soulbound achievement badges.
//!
//! Every operation runs to completion or fails with no state change.

macro_rules! require {
    ($cond:expr, $err:expr) => {
        if !$cond {
            return Err($err);
        }
    };
}

pub mod constants;
pub mod eip712;
pub mod errors;
pub mod events;
pub mod instructions;
pub mod state;
pub mod types;

use std::collections::BTreeMap;

pub use eip712::{Domain, MintAuthorization};
pub use errors::{LedgerError, Result};
pub use events::{EventRecord, LedgerEvent};
pub use instructions::batch_reconcile::BatchSummary;
pub use instructions::initialize::InitializeParams;
pub use instructions::redeem::{RedemptionHook, RedemptionRecord};
pub use state::{Checkpoint, LedgerState};
pub use types::{ActionId, Address, Amount, BadgeId, Context, Role};

use instructions::{access, badge, token, update_config};

/// Ledger facade. Owns the state and the redemption reentrancy flag
#[derive(Debug, Clone)]
pub struct RewardsLedger {
    state: LedgerState,
    redeeming: bool,
}

impl RewardsLedger {
    pub fn initialize(params: InitializeParams) -> Result<Self> {
        let state = instructions::initialize::handler(params)?;
        Ok(Self::from_state(state))
    }

    /// Restore from a snapshot
    pub fn from_state(state: LedgerState) -> Self {
        Self {
            state,
            redeeming: false,
        }
    }

    pub fn state(&self) -> &LedgerState {
        &self.state
    }

    pub fn into_state(self) -> LedgerState {
        self.state
    }

    pub fn checkpoint(&self) -> Checkpoint {
        self.state.checkpoint()
    }

    /// Roll back to `checkpoint`, dropping events recorded since
    pub fn restore(&mut self, checkpoint: Checkpoint) {
        self.state.restore(checkpoint);
    }

    // AccessControl

    pub fn has_role(&self, role: Role, account: &Address) -> bool {
        self.state.access.has_role(role, account)
    }

    pub fn grant_role(&mut self, ctx: &Context, role: Role, account: Address) -> Result<()> {
        access::grant_role(&mut self.state, ctx, role, account)
    }

    pub fn revoke_role(&mut self, ctx: &Context, role: Role, account: Address) -> Result<()> {
        access::revoke_role(&mut self.state, ctx, role, account)
    }

    pub fn renounce_role(&mut self, ctx: &Context, role: Role) -> Result<()> {
        access::renounce_role(&mut self.state, ctx, role)
    }

    pub fn pause(&mut self, ctx: &Context) -> Result<()> {
        access::pause(&mut self.state, ctx)
    }

    pub fn unpause(&mut self, ctx: &Context) -> Result<()> {
        access::unpause(&mut self.state, ctx)
    }

    pub fn is_paused(&self) -> bool {
        self.state.config.paused
    }

    // TokenLedger

    pub fn name(&self) -> &'static str {
        constants::TOKEN_NAME
    }

    pub fn symbol(&self) -> &'static str {
        constants::TOKEN_SYMBOL
    }

    pub fn decimals(&self) -> u8 {
        constants::TOKEN_DECIMALS
    }

    pub fn balance_of(&self, account: &Address) -> Amount {
        self.state.token.balance_of(account)
    }

    pub fn allowance(&self, owner: &Address, spender: &Address) -> Amount {
        self.state.token.allowance(owner, spender)
    }

    pub fn total_supply(&self) -> Amount {
        self.state.token.total_supply()
    }

    pub fn mint(&mut self, ctx: &Context, to: Address, amount: Amount) -> Result<()> {
        token::mint(&mut self.state, ctx, to, amount)
    }

    pub fn burn(&mut self, ctx: &Context, amount: Amount) -> Result<()> {
        token::burn(&mut self.state, ctx, amount)
    }

    pub fn burn_from(&mut self, ctx: &Context, from: Address, amount: Amount) -> Result<()> {
        token::burn_from(&mut self.state, ctx, from, amount)
    }

    pub fn transfer(&mut self, ctx: &Context, to: Address, amount: Amount) -> Result<()> {
        token::transfer(&mut self.state, ctx, to, amount)
    }

    pub fn transfer_from(
        &mut self,
        ctx: &Context,
        from: Address,
        to: Address,
        amount: Amount,
    ) -> Result<()> {
        token::transfer_from(&mut self.state, ctx, from, to, amount)
    }

    pub fn approve(&mut self, ctx: &Context, spender: Address, amount: Amount) -> Result<()> {
        token::approve(&mut self.state, ctx, spender, amount)
    }

    // RelayAuthorizer

    pub fn mint_with_sig(
        &mut self,
        ctx: &Context,
        to: Address,
        amount: Amount,
        deadline: u64,
        action_id: ActionId,
        signature: &[u8],
    ) -> Result<()> {
        instructions::mint_with_sig::handler(
            &mut self.state,
            ctx,
            to,
            amount,
            deadline,
            action_id,
            signature,
        )
    }

    pub fn is_action_used(&self, action_id: &ActionId) -> bool {
        self.state.used_actions.is_used(action_id)
    }

    pub fn action_used_at(&self, action_id: &ActionId) -> Option<u64> {
        self.state.used_actions.used_at(action_id)
    }

    pub fn backend_signer(&self) -> Address {
        self.state.config.backend_signer
    }

    pub fn domain(&self) -> &Domain {
        &self.state.config.domain
    }

    pub fn set_backend_signer(&mut self, ctx: &Context, signer: Address) -> Result<()> {
        update_config::set_backend_signer(&mut self.state, ctx, signer)
    }

    // RedemptionEngine

    pub fn engine(&self) -> Address {
        self.state.config.engine
    }

    pub fn redeem(&mut self, ctx: &Context, voucher_id: &str, amount: Amount) -> Result<RedemptionRecord> {
        instructions::redeem::handler(self, ctx, voucher_id, amount, None)
    }

    pub fn redeem_with_hook<H: RedemptionHook>(
        &mut self,
        ctx: &Context,
        voucher_id: &str,
        amount: Amount,
        hook: &mut H,
    ) -> Result<RedemptionRecord> {
        instructions::redeem::handler(
            self,
            ctx,
            voucher_id,
            amount,
            Some(hook as &mut dyn RedemptionHook),
        )
    }

    pub fn can_user_redeem(&self, user: &Address, amount: Amount) -> bool {
        instructions::redeem::can_user_redeem(&self.state, user, amount)
    }

    pub fn set_rate(&mut self, ctx: &Context, new_rate: Amount) -> Result<()> {
        update_config::set_rate(&mut self.state, ctx, new_rate)
    }

    pub fn get_rate(&self) -> Amount {
        self.state.config.redemption_rate
    }

    pub fn batch_reconcile(
        &mut self,
        ctx: &Context,
        users: &[Address],
        points: &[Amount],
    ) -> Result<BatchSummary> {
        instructions::batch_reconcile::handler(&mut self.state, ctx, users, points)
    }

    // BadgeLedger

    pub fn mint_badge(
        &mut self,
        ctx: &Context,
        to: Address,
        id: BadgeId,
        amount: Amount,
        soulbound: bool,
    ) -> Result<()> {
        badge::mint_badge(&mut self.state, ctx, to, id, amount, soulbound)
    }

    pub fn mint_badge_batch(
        &mut self,
        ctx: &Context,
        to: Address,
        ids: &[BadgeId],
        amounts: &[Amount],
        soulbound: &[bool],
    ) -> Result<()> {
        badge::mint_badge_batch(&mut self.state, ctx, to, ids, amounts, soulbound)
    }

    pub fn set_soulbound(&mut self, ctx: &Context, id: BadgeId) -> Result<()> {
        badge::set_soulbound(&mut self.state, ctx, id)
    }

    pub fn safe_transfer_from(
        &mut self,
        ctx: &Context,
        from: Address,
        to: Address,
        id: BadgeId,
        amount: Amount,
    ) -> Result<()> {
        badge::safe_transfer_from(&mut self.state, ctx, from, to, id, amount)
    }

    pub fn safe_batch_transfer_from(
        &mut self,
        ctx: &Context,
        from: Address,
        to: Address,
        ids: &[BadgeId],
        amounts: &[Amount],
    ) -> Result<()> {
        badge::safe_batch_transfer_from(&mut self.state, ctx, from, to, ids, amounts)
    }

    pub fn burn_badge(&mut self, ctx: &Context, from: Address, id: BadgeId, amount: Amount) -> Result<()> {
        badge::burn_badge(&mut self.state, ctx, from, id, amount)
    }

    pub fn burn_badge_batch(
        &mut self,
        ctx: &Context,
        from: Address,
        ids: &[BadgeId],
        amounts: &[Amount],
    ) -> Result<()> {
        badge::burn_badge_batch(&mut self.state, ctx, from, ids, amounts)
    }

    pub fn set_approval_for_all(&mut self, ctx: &Context, operator: Address, approved: bool) -> Result<()> {
        badge::set_approval_for_all(&mut self.state, ctx, operator, approved)
    }

    pub fn badge_balance_of(&self, account: &Address, id: BadgeId) -> Amount {
        self.state.badges.balance_of(account, id)
    }

    pub fn badge_balance_of_batch(&self, accounts: &[Address], ids: &[BadgeId]) -> Result<Vec<Amount>> {
        require!(
            accounts.len() == ids.len(),
            LedgerError::ArrayLengthMismatch {
                left: accounts.len(),
                right: ids.len(),
            }
        );
        Ok(accounts
            .iter()
            .zip(ids)
            .map(|(account, id)| self.state.badges.balance_of(account, *id))
            .collect())
    }

    pub fn badge_holdings(&self, account: &Address) -> BTreeMap<BadgeId, Amount> {
        self.state.badges.holdings(account)
    }

    pub fn badge_total_supply(&self, id: BadgeId) -> Amount {
        self.state.badges.total_supply(id)
    }

    pub fn is_soulbound(&self, id: BadgeId) -> bool {
        self.state.badges.is_soulbound(id)
    }

    pub fn is_approved_for_all(&self, owner: &Address, operator: &Address) -> bool {
        self.state.badges.is_approved_for_all(owner, operator)
    }

    // Audit log

    pub fn events_since(&self, seq: u64) -> &[EventRecord] {
        self.state.events.since(seq)
    }

    pub fn last_event_seq(&self) -> u64 {
        self.state.events.last_seq()
    }
}
