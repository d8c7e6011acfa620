use serde::{de, Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// Token quantity, encoded as `uint256` on the wire
pub type Amount = u128;

/// Achievement badge type identifier
pub type BadgeId = u64;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ParseIdError {
    #[error("Invalid hex: {0}")]
    InvalidHex(String),

    #[error("Expected {expected} bytes, got {got}")]
    InvalidLength { expected: usize, got: usize },

    #[error("Unknown role: {0}")]
    UnknownRole(String),
}

fn parse_hex<const N: usize>(s: &str) -> Result<[u8; N], ParseIdError> {
    let trimmed = s.strip_prefix("0x").or_else(|| s.strip_prefix("0X")).unwrap_or(s);
    let bytes = hex::decode(trimmed).map_err(|e| ParseIdError::InvalidHex(e.to_string()))?;
    bytes.try_into().map_err(|b: Vec<u8>| ParseIdError::InvalidLength {
        expected: N,
        got: b.len(),
    })
}

/// 20-byte account address. The zero address stands for "nobody"
/// (mint source, burn destination) and is never a valid account
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default)]
pub struct Address(pub [u8; 20]);

impl Address {
    pub const ZERO: Address = Address([0u8; 20]);

    pub fn is_zero(&self) -> bool {
        self.0.iter().all(|&b| b == 0)
    }

    pub fn as_bytes(&self) -> &[u8; 20] {
        &self.0
    }

    /// Left-padded 32-byte ABI word
    pub fn to_word(&self) -> [u8; 32] {
        let mut word = [0u8; 32];
        word[12..].copy_from_slice(&self.0);
        word
    }
}

impl fmt::Display for Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "0x{}", hex::encode(self.0))
    }
}

impl fmt::Debug for Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(self, f)
    }
}

impl FromStr for Address {
    type Err = ParseIdError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        parse_hex::<20>(s).map(Address)
    }
}

impl From<[u8; 20]> for Address {
    fn from(bytes: [u8; 20]) -> Self {
        Address(bytes)
    }
}

impl Serialize for Address {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for Address {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(de::Error::custom)
    }
}

/// One-time identifier of a signed mint authorization
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default)]
pub struct ActionId(pub [u8; 32]);

impl ActionId {
    pub fn as_bytes(&self) -> &[u8; 32] {
        &self.0
    }
}

impl fmt::Display for ActionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "0x{}", hex::encode(self.0))
    }
}

impl fmt::Debug for ActionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(self, f)
    }
}

impl FromStr for ActionId {
    type Err = ParseIdError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        parse_hex::<32>(s).map(ActionId)
    }
}

impl From<[u8; 32]> for ActionId {
    fn from(bytes: [u8; 32]) -> Self {
        ActionId(bytes)
    }
}

impl Serialize for ActionId {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for ActionId {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(de::Error::custom)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Role {
    /// Grants and revokes every role, including itself
    Admin,
    /// May mint tokens directly
    Minter,
    /// Off-chain backend allowed to run batch reconciliation
    Backend,
    /// May pause and unpause
    Pauser,
}

impl Role {
    pub const ALL: [Role; 4] = [Role::Admin, Role::Minter, Role::Backend, Role::Pauser];

    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Admin => "ADMIN",
            Role::Minter => "MINTER",
            Role::Backend => "BACKEND",
            Role::Pauser => "PAUSER",
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Role {
    type Err = ParseIdError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let upper = s.trim().to_ascii_uppercase();
        let name = upper.strip_suffix("_ROLE").unwrap_or(&upper);
        match name {
            "ADMIN" | "DEFAULT_ADMIN" => Ok(Role::Admin),
            "MINTER" => Ok(Role::Minter),
            "BACKEND" => Ok(Role::Backend),
            "PAUSER" => Ok(Role::Pauser),
            _ => Err(ParseIdError::UnknownRole(s.to_string())),
        }
    }
}

/// Execution context of a single ledger operation
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Context {
    /// Account on whose behalf the operation runs
    pub caller: Address,
    /// Current unix time in seconds
    pub timestamp: u64,
}

impl Context {
    pub fn new(caller: Address, timestamp: u64) -> Self {
        Self { caller, timestamp }
    }
}
