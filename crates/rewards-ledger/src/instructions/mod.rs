pub mod access;
pub mod badge;
pub mod batch_reconcile;
pub mod initialize;
pub mod mint_with_sig;
pub mod redeem;
pub mod token;
pub mod update_config;

use crate::errors::{LedgerError, Result};
use crate::state::LedgerState;
use crate::types::{Address, Role};

pub(crate) fn require_role(state: &LedgerState, account: &Address, role: Role) -> Result<()> {
    require!(
        state.access.has_role(role, account),
        LedgerError::missing_role(*account, role)
    );
    Ok(())
}

/// Passes if the account holds `role` or ADMIN; reports `role` as missing
pub(crate) fn require_role_or_admin(
    state: &LedgerState,
    account: &Address,
    role: Role,
) -> Result<()> {
    if state.access.has_role(Role::Admin, account) {
        return Ok(());
    }
    require_role(state, account, role)
}

pub(crate) fn require_not_paused(state: &LedgerState) -> Result<()> {
    require!(!state.config.paused, LedgerError::Paused);
    Ok(())
}

pub(crate) fn require_nonzero_address(account: &Address) -> Result<()> {
    require!(!account.is_zero(), LedgerError::ZeroAddress);
    Ok(())
}
