#![allow(dead_code)]

use k256::ecdsa::SigningKey;
use rewards_ledger::eip712::{sign_authorization, signing_key_address};
use rewards_ledger::{
    ActionId, Address, Amount, Context, InitializeParams, MintAuthorization, RewardsLedger, Role,
};

pub const NOW: u64 = 1_700_000_000;

pub const ADMIN: Address = Address([0x01; 20]);
pub const BACKEND: Address = Address([0x02; 20]);
pub const PAUSER: Address = Address([0x03; 20]);
pub const RELAY_MINTER: Address = Address([0x10; 20]);
pub const ENGINE: Address = Address([0x11; 20]);
pub const ALICE: Address = Address([0xaa; 20]);
pub const BOB: Address = Address([0xbb; 20]);
pub const CAROL: Address = Address([0xcc; 20]);

pub struct Fixture {
    pub ledger: RewardsLedger,
    pub signer: SigningKey,
}

pub fn signer_key() -> SigningKey {
    SigningKey::from_slice(&[0x42; 32]).unwrap()
}

pub fn ctx(caller: Address) -> Context {
    Context::new(caller, NOW)
}

pub fn ctx_at(caller: Address, timestamp: u64) -> Context {
    Context::new(caller, timestamp)
}

pub fn action(n: u8) -> ActionId {
    ActionId([n; 32])
}

impl Fixture {
    pub fn new() -> Self {
        let signer = signer_key();
        let params = InitializeParams::new(
            ADMIN,
            signing_key_address(&signer),
            31337,
            RELAY_MINTER,
            ENGINE,
            NOW,
        );
        let mut ledger = RewardsLedger::initialize(params).unwrap();
        ledger.grant_role(&ctx(ADMIN), Role::Backend, BACKEND).unwrap();
        ledger.grant_role(&ctx(ADMIN), Role::Pauser, PAUSER).unwrap();
        Self { ledger, signer }
    }

    pub fn funded(holders: &[(Address, Amount)]) -> Self {
        let mut fx = Self::new();
        for (who, amount) in holders {
            fx.ledger.mint(&ctx(ADMIN), *who, *amount).unwrap();
        }
        fx
    }

    pub fn sign(&self, to: Address, amount: Amount, deadline: u64, action_id: ActionId) -> [u8; 65] {
        let message = MintAuthorization {
            to,
            amount,
            deadline,
            action_id,
        };
        sign_authorization(&self.signer, self.ledger.domain(), &message).unwrap()
    }

    pub fn assert_conserved(&self) {
        let sum = self.ledger.state().token.sum_of_balances();
        assert_eq!(
            sum,
            Some(self.ledger.total_supply()),
            "sum of balances must equal total supply"
        );
    }
}
