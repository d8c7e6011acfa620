/// Achievement badges. Soulbound ids can be minted and burned but never
/// moved between two accounts; the flag is sticky once set
use tracing::info;

use crate::errors::{LedgerError, Result};
use crate::events::LedgerEvent;
use crate::state::LedgerState;
use crate::types::{Address, Amount, BadgeId, Context, Role};

use super::{require_nonzero_address, require_not_paused, require_role};

pub fn mint_badge(
    state: &mut LedgerState,
    ctx: &Context,
    to: Address,
    id: BadgeId,
    amount: Amount,
    soulbound: bool,
) -> Result<()> {
    mint_badge_batch(state, ctx, to, &[id], &[amount], &[soulbound])
}

pub fn mint_badge_batch(
    state: &mut LedgerState,
    ctx: &Context,
    to: Address,
    ids: &[BadgeId],
    amounts: &[Amount],
    soulbound: &[bool],
) -> Result<()> {
    require_role(state, &ctx.caller, Role::Admin)?;
    require_nonzero_address(&to)?;
    require!(
        ids.len() == soulbound.len(),
        LedgerError::ArrayLengthMismatch {
            left: ids.len(),
            right: soulbound.len(),
        }
    );
    require!(!ids.is_empty(), LedgerError::EmptyBatch);

    state.badges.update(None, Some(&to), ids, amounts)?;

    for (&id, &flag) in ids.iter().zip(soulbound) {
        if flag {
            mark_soulbound(state, ctx.timestamp, id);
        }
    }

    state.events.emit(
        ctx.timestamp,
        LedgerEvent::BadgeTransfer {
            operator: ctx.caller,
            from: Address::ZERO,
            to,
            ids: ids.to_vec(),
            amounts: amounts.to_vec(),
        },
    );
    info!("Minted badges {:?} x {:?} to {}", ids, amounts, to);
    Ok(())
}

pub fn set_soulbound(state: &mut LedgerState, ctx: &Context, id: BadgeId) -> Result<()> {
    require_role(state, &ctx.caller, Role::Admin)?;
    mark_soulbound(state, ctx.timestamp, id);
    Ok(())
}

fn mark_soulbound(state: &mut LedgerState, timestamp: u64, id: BadgeId) {
    if state.badges.mark_soulbound(id) {
        state.events.emit(
            timestamp,
            LedgerEvent::SoulboundStatusChanged { id, soulbound: true },
        );
        info!("Badge {} is now soulbound", id);
    }
}

pub fn safe_transfer_from(
    state: &mut LedgerState,
    ctx: &Context,
    from: Address,
    to: Address,
    id: BadgeId,
    amount: Amount,
) -> Result<()> {
    safe_batch_transfer_from(state, ctx, from, to, &[id], &[amount])
}

pub fn safe_batch_transfer_from(
    state: &mut LedgerState,
    ctx: &Context,
    from: Address,
    to: Address,
    ids: &[BadgeId],
    amounts: &[Amount],
) -> Result<()> {
    require_not_paused(state)?;
    require_owner_or_operator(state, &ctx.caller, &from)?;
    require_nonzero_address(&to)?;

    state.badges.update(Some(&from), Some(&to), ids, amounts)?;

    state.events.emit(
        ctx.timestamp,
        LedgerEvent::BadgeTransfer {
            operator: ctx.caller,
            from,
            to,
            ids: ids.to_vec(),
            amounts: amounts.to_vec(),
        },
    );
    info!("Moved badges {:?} from {} to {}", ids, from, to);
    Ok(())
}

pub fn burn_badge(
    state: &mut LedgerState,
    ctx: &Context,
    from: Address,
    id: BadgeId,
    amount: Amount,
) -> Result<()> {
    burn_badge_batch(state, ctx, from, &[id], &[amount])
}

pub fn burn_badge_batch(
    state: &mut LedgerState,
    ctx: &Context,
    from: Address,
    ids: &[BadgeId],
    amounts: &[Amount],
) -> Result<()> {
    require_not_paused(state)?;
    require_owner_or_operator(state, &ctx.caller, &from)?;

    state.badges.update(Some(&from), None, ids, amounts)?;

    state.events.emit(
        ctx.timestamp,
        LedgerEvent::BadgeTransfer {
            operator: ctx.caller,
            from,
            to: Address::ZERO,
            ids: ids.to_vec(),
            amounts: amounts.to_vec(),
        },
    );
    info!("Burned badges {:?} from {}", ids, from);
    Ok(())
}

pub fn set_approval_for_all(
    state: &mut LedgerState,
    ctx: &Context,
    operator: Address,
    approved: bool,
) -> Result<()> {
    require_not_paused(state)?;
    require_nonzero_address(&operator)?;

    state.badges.set_approval(&ctx.caller, &operator, approved);

    state.events.emit(
        ctx.timestamp,
        LedgerEvent::ApprovalForAll {
            owner: ctx.caller,
            operator,
            approved,
        },
    );
    info!("{} set operator {} to {}", ctx.caller, operator, approved);
    Ok(())
}

fn require_owner_or_operator(state: &LedgerState, caller: &Address, owner: &Address) -> Result<()> {
    require_nonzero_address(owner)?;
    if caller == owner || state.badges.is_approved_for_all(owner, caller) {
        return Ok(());
    }
    Err(LedgerError::Unauthorized {
        account: *caller,
        required: "owner or approved operator".to_string(),
    })
}
