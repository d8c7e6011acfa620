//! HTTP transport used by the SDK and CLI to reach a rewards relayer.
//!
//! ```rust,no_run
//! use rewards_network::{Config, RelayHttpClient};
//!
//! #[tokio::main]
//! async fn main() -> rewards_network::Result<()> {
//!     let config = Config::default().with_base_url("http://127.0.0.1:8080");
//!     let client = RelayHttpClient::new(config)?;
//!
//!     let health: serde_json::Value = client.get_json("/health").await?;
//!     println!("relayer: {}", health);
//!
//!     Ok(())
//! }
//! ```

pub mod config;
pub mod error;
pub mod http_client;

pub use config::{Config, API_KEY_HEADER, DEFAULT_RELAYER_URL};
pub use error::{NetworkError, Result};
pub use http_client::RelayHttpClient;

pub fn local_client() -> Result<RelayHttpClient> {
    RelayHttpClient::new(Config::default())
}
