/// Maximum number of entries accepted by a single batch reconciliation
pub const MAX_BATCH_SIZE: usize = 200;

/// Default redemption rate: 100 points = 1 token unit
pub const DEFAULT_REDEMPTION_RATE: u128 = 100;

/// EIP-712 domain name of the relayed minter
/// MUST stay in sync with previously issued signatures
pub const DOMAIN_NAME: &str = "RelayMinter";

/// EIP-712 domain version
pub const DOMAIN_VERSION: &str = "1";

pub const EIP712_DOMAIN_TYPE: &str =
    "EIP712Domain(string name,string version,uint256 chainId,address verifyingContract)";

pub const MINT_TYPE: &str = "Mint(address to,uint256 amount,uint256 deadline,bytes32 actionId)";

/// Token metadata
pub const TOKEN_NAME: &str = "Wellness Token";
pub const TOKEN_SYMBOL: &str = "WELL";
pub const TOKEN_DECIMALS: u8 = 18;
