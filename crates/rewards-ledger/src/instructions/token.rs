/// Fungible token primitives. Zero address never appears as an account;
/// it stands in as the source of mints and the destination of burns in the
/// `Transfer` event
use tracing::info;

use crate::errors::Result;
use crate::events::LedgerEvent;
use crate::state::LedgerState;
use crate::types::{Address, Amount, Context, Role};

use super::{require_nonzero_address, require_not_paused, require_role_or_admin};

/// ADMIN or MINTER only. Not gated by pause; zero amounts are accepted
pub fn mint(state: &mut LedgerState, ctx: &Context, to: Address, amount: Amount) -> Result<()> {
    require_role_or_admin(state, &ctx.caller, Role::Minter)?;
    require_nonzero_address(&to)?;

    state.token.credit(&to, amount)?;

    state.events.emit(
        ctx.timestamp,
        LedgerEvent::Transfer {
            from: Address::ZERO,
            to,
            value: amount,
        },
    );
    info!("Minted {} to {} (minter {})", amount, to, ctx.caller);
    Ok(())
}

pub fn burn(state: &mut LedgerState, ctx: &Context, amount: Amount) -> Result<()> {
    require_not_paused(state)?;
    burn_unchecked(state, ctx.timestamp, ctx.caller, amount)
}

/// Spend `allowance[from][caller]`, then burn from `from`
pub fn burn_from(state: &mut LedgerState, ctx: &Context, from: Address, amount: Amount) -> Result<()> {
    require_not_paused(state)?;
    require_nonzero_address(&from)?;

    state.token.check_allowance(&from, &ctx.caller, amount)?;
    state.token.debit(&from, amount)?;
    state.token.spend_allowance(&from, &ctx.caller, amount)?;

    state.events.emit(
        ctx.timestamp,
        LedgerEvent::Transfer {
            from,
            to: Address::ZERO,
            value: amount,
        },
    );
    info!("Burned {} from {} (spender {})", amount, from, ctx.caller);
    Ok(())
}

pub(crate) fn burn_unchecked(
    state: &mut LedgerState,
    timestamp: u64,
    from: Address,
    amount: Amount,
) -> Result<()> {
    require_nonzero_address(&from)?;
    state.token.debit(&from, amount)?;

    state.events.emit(
        timestamp,
        LedgerEvent::Transfer {
            from,
            to: Address::ZERO,
            value: amount,
        },
    );
    info!("Burned {} from {}", amount, from);
    Ok(())
}

pub fn transfer(state: &mut LedgerState, ctx: &Context, to: Address, amount: Amount) -> Result<()> {
    require_not_paused(state)?;
    move_tokens(state, ctx.timestamp, ctx.caller, to, amount)
}

pub fn transfer_from(
    state: &mut LedgerState,
    ctx: &Context,
    from: Address,
    to: Address,
    amount: Amount,
) -> Result<()> {
    require_not_paused(state)?;
    require_nonzero_address(&from)?;
    require_nonzero_address(&to)?;

    state.token.check_allowance(&from, &ctx.caller, amount)?;
    move_tokens(state, ctx.timestamp, from, to, amount)?;
    state.token.spend_allowance(&from, &ctx.caller, amount)
}

fn move_tokens(
    state: &mut LedgerState,
    timestamp: u64,
    from: Address,
    to: Address,
    amount: Amount,
) -> Result<()> {
    require_nonzero_address(&from)?;
    require_nonzero_address(&to)?;

    state.token.move_balance(&from, &to, amount)?;

    state.events.emit(
        timestamp,
        LedgerEvent::Transfer {
            from,
            to,
            value: amount,
        },
    );
    info!("Transferred {} from {} to {}", amount, from, to);
    Ok(())
}

pub fn approve(state: &mut LedgerState, ctx: &Context, spender: Address, amount: Amount) -> Result<()> {
    require_not_paused(state)?;
    require_nonzero_address(&ctx.caller)?;
    require_nonzero_address(&spender)?;

    state.token.set_allowance(&ctx.caller, &spender, amount);

    state.events.emit(
        ctx.timestamp,
        LedgerEvent::Approval {
            owner: ctx.caller,
            spender,
            value: amount,
        },
    );
    info!("{} approved {} for {}", ctx.caller, spender, amount);
    Ok(())
}
