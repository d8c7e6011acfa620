/// Mint with signature - execute a backend-signed EIP-712 mint authorization
/// Each action id is honoured at most once. The id is marked before the mint
/// and the mark is removed again if the mint fails, so a failed call leaves no trace
use tracing::{info, warn};

use crate::eip712::{recover_signer, MintAuthorization};
use crate::errors::{LedgerError, Result};
use crate::events::LedgerEvent;
use crate::state::LedgerState;
use crate::types::{ActionId, Address, Amount, Context};

use super::{require_not_paused, token};

pub fn handler(
    state: &mut LedgerState,
    ctx: &Context,
    to: Address,
    amount: Amount,
    deadline: u64,
    action_id: ActionId,
    signature: &[u8],
) -> Result<()> {
    require_not_paused(state)?;

    let message = MintAuthorization {
        to,
        amount,
        deadline,
        action_id,
    };

    let signer = recover_signer(&state.config.domain, &message, signature)?;
    if signer != state.config.backend_signer {
        warn!(
            "Rejected authorization {}: signed by {}, expected {}",
            action_id, signer, state.config.backend_signer
        );
        return Err(LedgerError::InvalidSignature);
    }

    require!(
        ctx.timestamp <= deadline,
        LedgerError::AuthorizationExpired {
            deadline,
            now: ctx.timestamp,
        }
    );

    require!(
        state.used_actions.mark(action_id, ctx.timestamp),
        LedgerError::AuthorizationReplayed(action_id)
    );

    let minter = Context::new(state.config.relay_minter(), ctx.timestamp);
    if let Err(e) = token::mint(state, &minter, to, amount) {
        state.used_actions.unmark(&action_id);
        return Err(e);
    }

    state.events.emit(
        ctx.timestamp,
        LedgerEvent::RelayMinted {
            to,
            amount,
            action_id,
        },
    );

    info!("Relay mint executed");
    info!("Action: {}", action_id);
    info!("Recipient: {}, amount: {}", to, amount);

    Ok(())
}
