/// Backend-side signing of relayed mint authorizations
/// Every authorization gets a fresh random action id and a short deadline,
/// so a leaked signature is useless after the TTL and can only ever mint once
use k256::ecdsa::SigningKey;
use rand::RngCore;
use rewards_ledger::eip712::{sign_authorization, signing_key_address};
use rewards_ledger::{ActionId, Address, Amount, Domain, MintAuthorization};
use std::path::Path;

use crate::api::RelayMintRequest;
use crate::error::{Result, SdkError};

pub const DEFAULT_AUTHORIZATION_TTL_SECS: u64 = 300;

pub fn random_action_id() -> ActionId {
    let mut bytes = [0u8; 32];
    rand::thread_rng().fill_bytes(&mut bytes);
    ActionId(bytes)
}

pub fn generate_signing_key() -> SigningKey {
    SigningKey::random(&mut rand::rngs::OsRng)
}

pub fn parse_signing_key(hex_key: &str) -> Result<SigningKey> {
    let bytes = hex::decode(hex_key.trim().trim_start_matches("0x"))
        .map_err(|e| SdkError::Crypto(format!("Invalid key hex: {}", e)))?;
    SigningKey::from_slice(&bytes).map_err(|e| SdkError::Crypto(format!("Invalid key: {}", e)))
}

/// Reads a hex-encoded secp256k1 secret key
pub fn load_signing_key(path: &Path) -> Result<SigningKey> {
    let contents = std::fs::read_to_string(path)?;
    parse_signing_key(&contents)
}

pub fn save_signing_key(key: &SigningKey, path: &Path) -> Result<()> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    std::fs::write(path, format!("0x{}", hex::encode(key.to_bytes())))?;
    Ok(())
}

pub struct AuthorizationSigner {
    key: SigningKey,
    domain: Domain,
    ttl_secs: u64,
}

impl AuthorizationSigner {
    pub fn new(key: SigningKey, domain: Domain) -> Self {
        Self {
            key,
            domain,
            ttl_secs: DEFAULT_AUTHORIZATION_TTL_SECS,
        }
    }

    pub fn with_ttl(mut self, ttl_secs: u64) -> Self {
        self.ttl_secs = ttl_secs;
        self
    }

    pub fn address(&self) -> Address {
        signing_key_address(&self.key)
    }

    pub fn domain(&self) -> &Domain {
        &self.domain
    }

    /// Sign a mint of `amount` to `to`, valid until `now + ttl`
    pub fn authorize(&self, to: Address, amount: Amount, now: u64) -> Result<RelayMintRequest> {
        let deadline = now
            .checked_add(self.ttl_secs)
            .ok_or_else(|| SdkError::InvalidInput("deadline overflows".into()))?;
        self.sign(to, amount, deadline, random_action_id())
    }

    pub fn sign(
        &self,
        to: Address,
        amount: Amount,
        deadline: u64,
        action_id: ActionId,
    ) -> Result<RelayMintRequest> {
        if to.is_zero() {
            return Err(SdkError::InvalidInput("recipient is the zero address".into()));
        }

        let message = MintAuthorization {
            to,
            amount,
            deadline,
            action_id,
        };
        let signature = sign_authorization(&self.key, &self.domain, &message)
            .map_err(|e| SdkError::Crypto(e.to_string()))?;

        Ok(RelayMintRequest {
            to,
            amount,
            deadline,
            action_id,
            signature: format!("0x{}", hex::encode(signature)),
        })
    }
}
