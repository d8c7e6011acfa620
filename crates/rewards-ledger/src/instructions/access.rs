/// Role administration and the global pause switch
use tracing::{info, warn};

use crate::errors::{LedgerError, Result};
use crate::events::LedgerEvent;
use crate::state::LedgerState;
use crate::types::{Address, Context, Role};

use super::{require_nonzero_address, require_role, require_role_or_admin};

pub fn grant_role(state: &mut LedgerState, ctx: &Context, role: Role, account: Address) -> Result<()> {
    require_role(state, &ctx.caller, Role::Admin)?;
    require_nonzero_address(&account)?;

    if !state.access.add(role, account) {
        return Ok(());
    }

    state.events.emit(
        ctx.timestamp,
        LedgerEvent::RoleGranted {
            role,
            account,
            sender: ctx.caller,
        },
    );
    info!("Granted {} to {}", role, account);
    Ok(())
}

pub fn revoke_role(state: &mut LedgerState, ctx: &Context, role: Role, account: Address) -> Result<()> {
    require_role(state, &ctx.caller, Role::Admin)?;
    remove_member(state, ctx, role, account);
    Ok(())
}

/// Caller drops its own membership
pub fn renounce_role(state: &mut LedgerState, ctx: &Context, role: Role) -> Result<()> {
    remove_member(state, ctx, role, ctx.caller);
    Ok(())
}

fn remove_member(state: &mut LedgerState, ctx: &Context, role: Role, account: Address) {
    if !state.access.remove(role, &account) {
        return;
    }

    state.events.emit(
        ctx.timestamp,
        LedgerEvent::RoleRevoked {
            role,
            account,
            sender: ctx.caller,
        },
    );
    info!("Revoked {} from {}", role, account);

    if role == Role::Admin && state.access.member_count(Role::Admin) == 0 {
        warn!(
            "Last ADMIN {} removed; admin-gated operations are now permanently frozen",
            account
        );
    }
}

pub fn pause(state: &mut LedgerState, ctx: &Context) -> Result<()> {
    require_role_or_admin(state, &ctx.caller, Role::Pauser)?;
    require!(!state.config.paused, LedgerError::Paused);

    state.config.paused = true;
    state.events.emit(ctx.timestamp, LedgerEvent::Paused { account: ctx.caller });
    warn!("Ledger paused by {}", ctx.caller);
    Ok(())
}

pub fn unpause(state: &mut LedgerState, ctx: &Context) -> Result<()> {
    require_role_or_admin(state, &ctx.caller, Role::Pauser)?;
    require!(state.config.paused, LedgerError::NotPaused);

    state.config.paused = false;
    state.events.emit(ctx.timestamp, LedgerEvent::Unpaused { account: ctx.caller });
    info!("Ledger unpaused by {}", ctx.caller);
    Ok(())
}
