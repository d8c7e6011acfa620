use k256::ecdsa::SigningKey;
use rewards_ledger::eip712::signing_key_address;
use rewards_ledger::{Address, Amount};
use rewards_sdk::authorization::{generate_signing_key, load_signing_key, save_signing_key};
use std::path::{Path, PathBuf};
use std::str::FromStr;
use std::sync::Arc;

/// Default identities: the first two deployment addresses of a local devnet
pub const DEFAULT_VERIFYING_CONTRACT: &str = "0x5fbdb2315678afecb367f032d93f642f64180aa3";
pub const DEFAULT_ENGINE_ADDRESS: &str = "0xe7f1725e7734ce288f8367e1bb143e90bb3f0512";

#[derive(Clone)]
pub struct RelayerConfig {
    pub host: String,
    pub port: u16,
    pub chain_id: u64,
    /// Sends every ledger call the relayer makes; bootstrapped as ADMIN and BACKEND
    pub operator_key: Arc<SigningKey>,
    /// Signs `/mint/authorize` requests when configured
    pub signer_key: Option<Arc<SigningKey>>,
    pub backend_signer: Address,
    pub verifying_contract: Address,
    pub engine: Address,
    pub initial_rate: Amount,
    pub state_path: PathBuf,
    pub reconcile_interval_secs: u64,
    pub authorization_ttl_secs: u64,
    /// Required in the `x-api-key` header of operator routes
    pub api_key: Option<String>,
}

impl RelayerConfig {
    pub fn from_env() -> anyhow::Result<Self> {
        let host = std::env::var("HOST").unwrap_or_else(|_| "0.0.0.0".to_string());
        let port = env_or("PORT", 8080);
        let chain_id = env_or("CHAIN_ID", 31337);

        let operator_path = std::env::var("OPERATOR_KEY_PATH")
            .unwrap_or_else(|_| "~/.config/rewards/operator.key".to_string());
        let operator_key = load_or_create_key(&expand(&operator_path))?;

        let signer_key = match std::env::var("SIGNER_KEY_PATH") {
            Ok(path) => {
                let path = expand(&path);
                let key = load_signing_key(&path).map_err(|e| {
                    anyhow::anyhow!("Failed to read signer key from {}: {}", path.display(), e)
                })?;
                tracing::info!("Authorization signer loaded: {}", signing_key_address(&key));
                Some(key)
            }
            Err(_) => {
                tracing::warn!("SIGNER_KEY_PATH not set - /mint/authorize is disabled");
                None
            }
        };

        let backend_signer = match std::env::var("BACKEND_SIGNER") {
            Ok(s) => Address::from_str(&s)
                .map_err(|e| anyhow::anyhow!("Invalid BACKEND_SIGNER: {}", e))?,
            Err(_) => resolve_backend_signer(&operator_key, signer_key.as_ref()),
        };

        let verifying_contract = address_var("VERIFYING_CONTRACT", DEFAULT_VERIFYING_CONTRACT)?;
        let engine = address_var("ENGINE_ADDRESS", DEFAULT_ENGINE_ADDRESS)?;

        let initial_rate = env_or("INITIAL_RATE", rewards_ledger::constants::DEFAULT_REDEMPTION_RATE);
        let state_path = std::env::var("STATE_PATH")
            .map(|p| expand(&p))
            .unwrap_or_else(|_| PathBuf::from("relayer_state"));
        let reconcile_interval_secs = env_or("RECONCILE_INTERVAL_SECS", 86_400);
        let authorization_ttl_secs = env_or(
            "AUTHORIZATION_TTL_SECS",
            rewards_sdk::authorization::DEFAULT_AUTHORIZATION_TTL_SECS,
        );

        let api_key = std::env::var("RELAYER_API_KEY")
            .ok()
            .filter(|k| !k.trim().is_empty());
        if api_key.is_none() {
            tracing::warn!("RELAYER_API_KEY not set - operator routes are disabled");
        }

        Ok(Self {
            host,
            port,
            chain_id,
            operator_key: Arc::new(operator_key),
            signer_key: signer_key.map(Arc::new),
            backend_signer,
            verifying_contract,
            engine,
            initial_rate,
            state_path,
            reconcile_interval_secs,
            authorization_ttl_secs,
            api_key,
        })
    }

    pub fn operator(&self) -> Address {
        signing_key_address(&self.operator_key)
    }
}

fn env_or<T: FromStr>(name: &str, default: T) -> T {
    std::env::var(name)
        .ok()
        .and_then(|s| s.parse().ok())
        .unwrap_or(default)
}

fn address_var(name: &str, default: &str) -> anyhow::Result<Address> {
    let raw = std::env::var(name).unwrap_or_else(|_| default.to_string());
    Address::from_str(&raw).map_err(|e| anyhow::anyhow!("Invalid {}: {}", name, e))
}

fn expand(path: &str) -> PathBuf {
    PathBuf::from(shellexpand::tilde(path).to_string())
}

/// The signer key's address when one is configured, otherwise the operator's
pub fn resolve_backend_signer(operator: &SigningKey, signer: Option<&SigningKey>) -> Address {
    signing_key_address(signer.unwrap_or(operator))
}

fn load_or_create_key(path: &Path) -> anyhow::Result<SigningKey> {
    if path.exists() {
        return load_signing_key(path)
            .map_err(|e| anyhow::anyhow!("Failed to read operator key from {}: {}", path.display(), e));
    }

    let key = generate_signing_key();
    save_signing_key(&key, path)
        .map_err(|e| anyhow::anyhow!("Failed to write operator key to {}: {}", path.display(), e))?;
    tracing::warn!(
        "No operator key at {} - generated a new one ({})",
        path.display(),
        signing_key_address(&key)
    );
    Ok(key)
}
