/// Redeem - burn tokens against an off-chain voucher
/// The caller must have approved the redemption engine for at least `amount`.
/// Redemptions are non-reentrant: a redeem issued from inside a redemption
/// hook fails before any precondition is evaluated.
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::errors::{LedgerError, Result};
use crate::events::LedgerEvent;
use crate::state::{Checkpoint, LedgerState};
use crate::types::{Address, Amount, Context};
use crate::RewardsLedger;

use super::{require_not_paused, token};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RedemptionRecord {
    pub user: Address,
    pub amount: Amount,
    pub voucher_id: String,
    pub timestamp: u64,
}

/// Callback run after a redemption's effects, e.g. voucher issuance.
/// Returning an error rolls the whole redemption back.
pub trait RedemptionHook {
    fn on_redeem(&mut self, ledger: &mut RewardsLedger, record: &RedemptionRecord) -> Result<()>;
}

impl<F> RedemptionHook for F
where
    F: FnMut(&mut RewardsLedger, &RedemptionRecord) -> Result<()>,
{
    fn on_redeem(&mut self, ledger: &mut RewardsLedger, record: &RedemptionRecord) -> Result<()> {
        self(ledger, record)
    }
}

/// Holds the reentrancy flag for the duration of one redemption. Dropping it
/// clears the flag and, unless committed, restores the checkpoint, so an
/// error or a panic in the hook leaves the ledger as it was.
struct RedemptionGuard<'a> {
    ledger: &'a mut RewardsLedger,
    checkpoint: Option<Checkpoint>,
}

impl<'a> RedemptionGuard<'a> {
    fn enter(ledger: &'a mut RewardsLedger, with_checkpoint: bool) -> Self {
        ledger.redeeming = true;
        let checkpoint = with_checkpoint.then(|| ledger.state.checkpoint());
        Self { ledger, checkpoint }
    }

    fn commit(&mut self) {
        self.checkpoint = None;
    }
}

impl Drop for RedemptionGuard<'_> {
    fn drop(&mut self) {
        if let Some(checkpoint) = self.checkpoint.take() {
            self.ledger.state.restore(checkpoint);
        }
        self.ledger.redeeming = false;
    }
}

pub fn handler(
    ledger: &mut RewardsLedger,
    ctx: &Context,
    voucher_id: &str,
    amount: Amount,
    hook: Option<&mut dyn RedemptionHook>,
) -> Result<RedemptionRecord> {
    if ledger.redeeming {
        warn!("Nested redeem by {} rejected", ctx.caller);
        return Err(LedgerError::ReentrancyDetected);
    }

    let mut guard = RedemptionGuard::enter(ledger, hook.is_some());
    let outcome = match (apply(&mut guard.ledger.state, ctx, voucher_id, amount), hook) {
        (Ok(record), Some(hook)) => hook.on_redeem(&mut *guard.ledger, &record).map(|_| record),
        (outcome, _) => outcome,
    };

    match &outcome {
        Ok(_) => guard.commit(),
        Err(e) if guard.checkpoint.is_some() => {
            warn!("Redemption by {} rolled back: {}", ctx.caller, e)
        }
        Err(_) => {}
    }
    outcome
}

fn apply(
    state: &mut LedgerState,
    ctx: &Context,
    voucher_id: &str,
    amount: Amount,
) -> Result<RedemptionRecord> {
    require_not_paused(state)?;
    require!(
        amount > 0,
        LedgerError::InvalidAmount("redemption amount must be positive".to_string())
    );

    let user = ctx.caller;
    let engine = state.config.engine;

    let balance = state.token.balance_of(&user);
    require!(
        balance >= amount,
        LedgerError::InsufficientBalance {
            have: balance,
            need: amount,
        }
    );
    state.token.check_allowance(&user, &engine, amount)?;

    state.token.spend_allowance(&user, &engine, amount)?;
    token::burn_unchecked(state, ctx.timestamp, user, amount)?;

    state.events.emit(
        ctx.timestamp,
        LedgerEvent::Redeemed {
            user,
            amount,
            voucher_id: voucher_id.to_string(),
        },
    );

    info!("Redeemed {} by {} for voucher {}", amount, user, voucher_id);

    Ok(RedemptionRecord {
        user,
        amount,
        voucher_id: voucher_id.to_string(),
        timestamp: ctx.timestamp,
    })
}

/// True iff `redeem(amount)` would pass its amount, balance and allowance checks
pub fn can_user_redeem(state: &LedgerState, user: &Address, amount: Amount) -> bool {
    amount > 0
        && state.token.balance_of(user) >= amount
        && state.token.allowance(user, &state.config.engine) >= amount
}
