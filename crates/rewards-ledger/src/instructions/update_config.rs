use tracing::{info, warn};

use crate::errors::{LedgerError, Result};
use crate::events::LedgerEvent;
use crate::state::LedgerState;
use crate::types::{Address, Amount, Context, Role};

use super::{require_nonzero_address, require_role};

/// ADMIN only. A zero rate is rejected and the previous rate stays
pub fn set_rate(state: &mut LedgerState, ctx: &Context, new_rate: Amount) -> Result<()> {
    require_role(state, &ctx.caller, Role::Admin)?;
    require!(
        new_rate > 0,
        LedgerError::InvalidAmount("redemption rate must be positive".to_string())
    );

    let old_rate = state.config.redemption_rate;
    state.config.redemption_rate = new_rate;

    state.events.emit(ctx.timestamp, LedgerEvent::RateUpdated { old_rate, new_rate });
    info!("Updated redemption_rate from {} to {}", old_rate, new_rate);
    Ok(())
}

/// ADMIN only. Authorizations signed by the previous signer stop verifying
pub fn set_backend_signer(state: &mut LedgerState, ctx: &Context, new_signer: Address) -> Result<()> {
    require_role(state, &ctx.caller, Role::Admin)?;
    require_nonzero_address(&new_signer)?;

    let old_signer = state.config.backend_signer;
    state.config.backend_signer = new_signer;

    state.events.emit(
        ctx.timestamp,
        LedgerEvent::BackendSignerUpdated {
            old_signer,
            new_signer,
        },
    );
    warn!("Updated backend_signer from {} to {}", old_signer, new_signer);
    Ok(())
}
