use serde::{Deserialize, Serialize};

use crate::eip712::Domain;
use crate::types::{Address, Amount};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GlobalConfig {
    /// Whether user-facing balance mutations are halted
    pub paused: bool,

    /// Points required per token unit, never zero
    pub redemption_rate: Amount,

    /// Address whose EIP-712 signatures authorize relayed mints
    pub backend_signer: Address,

    /// Signing domain; its verifying contract is the relay minter identity
    pub domain: Domain,

    /// Identity the redemption engine spends allowances and mints under
    pub engine: Address,

    /// Unix time of initialization
    pub initialized_at: u64,
}

impl GlobalConfig {
    pub fn relay_minter(&self) -> Address {
        self.domain.verifying_contract
    }
}
