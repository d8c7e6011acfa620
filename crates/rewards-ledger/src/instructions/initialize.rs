/// Initialize - build the ledger state, grant the bootstrap roles and wire
/// the relay minter and redemption engine identities in as minters
use tracing::info;

use crate::constants::DEFAULT_REDEMPTION_RATE;
use crate::eip712::Domain;
use crate::errors::{LedgerError, Result};
use crate::events::{EventLog, LedgerEvent};
use crate::state::{AccessControl, BadgeLedger, GlobalConfig, LedgerState, TokenLedger, UsedActions};
use crate::types::{Address, Amount, Role};

use super::require_nonzero_address;

#[derive(Debug, Clone)]
pub struct InitializeParams {
    pub admin: Address,
    pub backend_signer: Address,
    pub chain_id: u64,
    /// Relay minter identity, also the EIP-712 verifying contract
    pub verifying_contract: Address,
    /// Redemption engine identity
    pub engine: Address,
    pub redemption_rate: Amount,
    pub timestamp: u64,
}

impl InitializeParams {
    pub fn new(
        admin: Address,
        backend_signer: Address,
        chain_id: u64,
        verifying_contract: Address,
        engine: Address,
        timestamp: u64,
    ) -> Self {
        Self {
            admin,
            backend_signer,
            chain_id,
            verifying_contract,
            engine,
            redemption_rate: DEFAULT_REDEMPTION_RATE,
            timestamp,
        }
    }
}

pub fn handler(params: InitializeParams) -> Result<LedgerState> {
    require_nonzero_address(&params.admin)?;
    require_nonzero_address(&params.backend_signer)?;
    require_nonzero_address(&params.verifying_contract)?;
    require_nonzero_address(&params.engine)?;
    require!(
        params.redemption_rate > 0,
        LedgerError::InvalidAmount("redemption rate must be positive".to_string())
    );

    let mut state = LedgerState {
        config: GlobalConfig {
            paused: false,
            redemption_rate: params.redemption_rate,
            backend_signer: params.backend_signer,
            domain: Domain::relay_minter(params.chain_id, params.verifying_contract),
            engine: params.engine,
            initialized_at: params.timestamp,
        },
        access: AccessControl::new(),
        token: TokenLedger::default(),
        used_actions: UsedActions::default(),
        badges: BadgeLedger::default(),
        events: EventLog::default(),
    };

    let grants = [
        (Role::Admin, params.admin),
        (Role::Minter, params.verifying_contract),
        (Role::Minter, params.engine),
    ];
    for (role, account) in grants {
        if state.access.add(role, account) {
            state.events.emit(
                params.timestamp,
                LedgerEvent::RoleGranted {
                    role,
                    account,
                    sender: params.admin,
                },
            );
        }
    }

    info!("Ledger initialized");
    info!("Admin: {}", params.admin);
    info!("Backend signer: {}", params.backend_signer);
    info!("Relay minter: {}", params.verifying_contract);
    info!("Redemption engine: {}", params.engine);
    info!("Chain id: {}, rate: {}", params.chain_id, params.redemption_rate);

    Ok(state)
}
