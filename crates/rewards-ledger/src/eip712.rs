//! EIP-712 typed-data hashing and secp256k1 signer recovery for relayed mints
//!
//! Signatures are 65 bytes `r || s || v`. Recovery ids are accepted as
//! `0/1` or `27/28`; high-s signatures are rejected as malleable.

use k256::ecdsa::{RecoveryId, Signature, SigningKey, VerifyingKey};
use serde::{Deserialize, Serialize};
use sha3::{Digest, Keccak256};

use crate::constants::{DOMAIN_NAME, DOMAIN_VERSION, EIP712_DOMAIN_TYPE, MINT_TYPE};
use crate::errors::{LedgerError, Result};
use crate::types::{ActionId, Address, Amount};

pub const SIGNATURE_LENGTH: usize = 65;

pub fn keccak256(data: &[u8]) -> [u8; 32] {
    Keccak256::digest(data).into()
}

fn u256_word(value: u128) -> [u8; 32] {
    let mut word = [0u8; 32];
    word[16..].copy_from_slice(&value.to_be_bytes());
    word
}

/// Signing domain of the relayed minter
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Domain {
    pub name: String,
    pub version: String,
    pub chain_id: u64,
    pub verifying_contract: Address,
}

impl Domain {
    pub fn relay_minter(chain_id: u64, verifying_contract: Address) -> Self {
        Self {
            name: DOMAIN_NAME.to_string(),
            version: DOMAIN_VERSION.to_string(),
            chain_id,
            verifying_contract,
        }
    }

    pub fn separator(&self) -> [u8; 32] {
        let mut encoded = Vec::with_capacity(32 * 5);
        encoded.extend_from_slice(&keccak256(EIP712_DOMAIN_TYPE.as_bytes()));
        encoded.extend_from_slice(&keccak256(self.name.as_bytes()));
        encoded.extend_from_slice(&keccak256(self.version.as_bytes()));
        encoded.extend_from_slice(&u256_word(self.chain_id as u128));
        encoded.extend_from_slice(&self.verifying_contract.to_word());
        keccak256(&encoded)
    }
}

/// `Mint(address to,uint256 amount,uint256 deadline,bytes32 actionId)`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct MintAuthorization {
    pub to: Address,
    pub amount: Amount,
    pub deadline: u64,
    pub action_id: ActionId,
}

impl MintAuthorization {
    pub fn type_hash() -> [u8; 32] {
        keccak256(MINT_TYPE.as_bytes())
    }

    pub fn struct_hash(&self) -> [u8; 32] {
        let mut encoded = Vec::with_capacity(32 * 5);
        encoded.extend_from_slice(&Self::type_hash());
        encoded.extend_from_slice(&self.to.to_word());
        encoded.extend_from_slice(&u256_word(self.amount));
        encoded.extend_from_slice(&u256_word(self.deadline as u128));
        encoded.extend_from_slice(self.action_id.as_bytes());
        keccak256(&encoded)
    }

    /// `keccak256(0x19 0x01 || domainSeparator || structHash)`
    pub fn signing_digest(&self, domain: &Domain) -> [u8; 32] {
        let mut encoded = Vec::with_capacity(66);
        encoded.extend_from_slice(&[0x19, 0x01]);
        encoded.extend_from_slice(&domain.separator());
        encoded.extend_from_slice(&self.struct_hash());
        keccak256(&encoded)
    }
}

/// Ethereum-style address of a public key: last 20 bytes of the keccak of
/// the uncompressed point without its prefix byte
pub fn address_of(key: &VerifyingKey) -> Address {
    let point = key.to_encoded_point(false);
    let hash = keccak256(&point.as_bytes()[1..]);
    let mut out = [0u8; 20];
    out.copy_from_slice(&hash[12..]);
    Address(out)
}

pub fn signing_key_address(key: &SigningKey) -> Address {
    address_of(key.verifying_key())
}

/// Recover the address that signed `message` under `domain`
pub fn recover_signer(
    domain: &Domain,
    message: &MintAuthorization,
    signature: &[u8],
) -> Result<Address> {
    if signature.len() != SIGNATURE_LENGTH {
        return Err(LedgerError::InvalidSignature);
    }

    let sig = Signature::from_slice(&signature[..64]).map_err(|_| LedgerError::InvalidSignature)?;
    if sig.normalize_s().is_some() {
        return Err(LedgerError::InvalidSignature);
    }

    let v = match signature[64] {
        v @ (0 | 1) => v,
        v @ (27 | 28) => v - 27,
        _ => return Err(LedgerError::InvalidSignature),
    };
    let recovery_id = RecoveryId::from_byte(v).ok_or(LedgerError::InvalidSignature)?;

    let digest = message.signing_digest(domain);
    let key = VerifyingKey::recover_from_prehash(&digest, &sig, recovery_id)
        .map_err(|_| LedgerError::InvalidSignature)?;

    Ok(address_of(&key))
}

/// Produce a 65-byte `r || s || v` signature with `v` in `{27, 28}`
pub fn sign_authorization(
    key: &SigningKey,
    domain: &Domain,
    message: &MintAuthorization,
) -> Result<[u8; SIGNATURE_LENGTH]> {
    let digest = message.signing_digest(domain);
    let (sig, recovery_id) = key
        .sign_prehash_recoverable(&digest)
        .map_err(|_| LedgerError::InvalidSignature)?;

    let mut out = [0u8; SIGNATURE_LENGTH];
    out[..64].copy_from_slice(&sig.to_bytes());
    out[64] = recovery_id.to_byte() + 27;
    Ok(out)
}
