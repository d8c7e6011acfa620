use anyhow::{anyhow, Result};
use chrono::{DateTime, Utc};
use clap::{Parser, Subcommand};
use colored::Colorize;
use rewards_ledger::{ActionId, Address, Amount, Domain};
use rewards_network::Config;
use rewards_sdk::api::RelayMintRequest;
use rewards_sdk::authorization::{generate_signing_key, load_signing_key, save_signing_key};
use rewards_sdk::reconcile::run_job_file;
use rewards_sdk::{AuthorizationSigner, PipelineConfig, RelayerClient, SubmissionOutcome, SubmissionPipeline};
use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser, Debug)]
#[command(name = "rewards")]
#[command(about = "Operate a rewards relayer: reconcile points, sign and relay mints")]
struct Args {
    /// Relayer base URL
    #[arg(short, long, global = true, default_value = rewards_network::DEFAULT_RELAYER_URL)]
    relayer: String,

    /// Request timeout in seconds
    #[arg(long, global = true, default_value = "30")]
    timeout: u64,

    /// Operator API key for reconcile and other operator routes
    #[arg(long, global = true, env = "RELAYER_API_KEY", hide_env_values = true)]
    api_key: Option<String>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Run a batch reconciliation job file and write <stem>-result.json next to it
    Reconcile {
        #[arg(long, value_name = "JOB_FILE")]
        job: PathBuf,
    },
    /// Sign a mint authorization offline and print it as JSON
    SignMint {
        #[command(flatten)]
        mint: MintArgs,

        /// Chain id of the signing domain
        #[arg(long, default_value = "31337")]
        chain_id: u64,

        /// Relay minter (verifying contract) address
        #[arg(long)]
        verifying_contract: String,
    },
    /// Sign a mint authorization against the relayer's domain and submit it
    RelayMint {
        #[command(flatten)]
        mint: MintArgs,

        /// Submission attempts before giving up
        #[arg(long, default_value = "3")]
        attempts: u32,
    },
    /// Submit a pre-signed authorization from a JSON file
    Submit {
        #[arg(value_name = "REQUEST_FILE")]
        request: PathBuf,
    },
    /// Show whether an action id has been consumed
    ActionStatus {
        #[arg(value_name = "ACTION_ID")]
        action_id: String,
    },
    /// Show relayer, ledger and pending reconciliation status
    Status,
    /// Generate a new secp256k1 key file
    Keygen {
        #[arg(long, value_name = "PATH")]
        out: PathBuf,
    },
}

#[derive(clap::Args, Debug)]
struct MintArgs {
    /// Hex key file of the backend signer
    #[arg(short, long)]
    key: PathBuf,

    #[arg(long)]
    to: String,

    #[arg(long)]
    amount: Amount,

    /// Authorization lifetime in seconds
    #[arg(long, default_value = "300")]
    ttl: u64,
}

impl MintArgs {
    fn signer(&self, domain: Domain) -> Result<AuthorizationSigner> {
        let key = load_signing_key(&self.key)
            .map_err(|e| anyhow!("Failed to read key from {}: {}", self.key.display(), e))?;
        Ok(AuthorizationSigner::new(key, domain).with_ttl(self.ttl))
    }

    fn authorize(&self, domain: Domain) -> Result<RelayMintRequest> {
        let to = parse_address(&self.to)?;
        let request = self.signer(domain)?.authorize(to, self.amount, unix_now())?;
        Ok(request)
    }
}

fn parse_address(raw: &str) -> Result<Address> {
    Address::from_str(raw).map_err(|e| anyhow!("Invalid address {}: {}", raw, e))
}

fn unix_now() -> u64 {
    Utc::now().timestamp().max(0) as u64
}

fn format_time(timestamp: u64) -> String {
    i64::try_from(timestamp)
        .ok()
        .and_then(|ts| DateTime::<Utc>::from_timestamp(ts, 0))
        .map(|dt| dt.format("%Y-%m-%d %H:%M:%S UTC").to_string())
        .unwrap_or_else(|| "unknown".to_string())
}

fn client(args: &Args) -> Result<RelayerClient> {
    let mut config = Config::default()
        .with_base_url(&args.relayer)
        .with_timeout(args.timeout);
    if let Some(key) = &args.api_key {
        config = config.with_api_key(key);
    }
    Ok(RelayerClient::new(config)?)
}

async fn submit(client: RelayerClient, request: &RelayMintRequest, attempts: u32) -> Result<()> {
    println!("  To:        {}", request.to);
    println!("  Amount:    {}", request.amount);
    println!("  Action id: {}", request.action_id);
    println!("  Deadline:  {}", format_time(request.deadline));
    println!();

    let pipeline = SubmissionPipeline::new(
        client,
        PipelineConfig::default()
            .with_max_attempts(attempts)
            .with_retry_backoff(Duration::from_secs(2)),
    );

    match pipeline.submit(request).await {
        Ok(SubmissionOutcome::Confirmed(receipt)) => {
            println!("{}", "✓ Minted".green().bold());
            println!("  Tx hash:   {}", receipt.tx_hash);
            println!("  Block:     {}", receipt.block_number);
            println!("  Gas used:  {}", receipt.gas_used);
        }
        Ok(SubmissionOutcome::ConsumedWithoutReceipt { action_id, used_at }) => {
            println!("{}", "✓ Minted (receipt unavailable)".green().bold());
            println!("  Action {} consumed at {}", action_id, used_at.map(format_time).unwrap_or_default());
        }
        Err(e) => {
            println!("{}", "✗ Not minted".red().bold());
            return Err(e.into());
        }
    }
    Ok(())
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "rewards_sdk=info,rewards_network=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let args = Args::parse();

    match &args.command {
        Command::Reconcile { job } => {
            let client = client(&args)?;
            println!();
            println!("  Job:     {}", job.display());
            println!("  Relayer: {}", client.base_url());
            println!();

            let (result, out) = run_job_file(&client, job).await?;
            if result.success {
                println!("{}", "✓ Reconciliation succeeded".green().bold());
            } else {
                println!("{}", "✗ Reconciliation failed".red().bold());
            }
            println!("  Users reconciled: {}", result.users_reconciled);
            println!("  Total points:     {}", result.total_points);
            println!("  Total WELL:       {}", result.total_well);
            if let Some(hash) = &result.transaction_hash {
                println!("  Transactions:     {}", hash);
            }
            if let Some(error) = &result.error {
                println!("  Error:            {}", error.red());
            }
            println!("  Result written to {}", out.display());

            if !result.success {
                return Err(anyhow!("one or more batches failed"));
            }
        }
        Command::SignMint {
            mint,
            chain_id,
            verifying_contract,
        } => {
            let domain = Domain::relay_minter(*chain_id, parse_address(verifying_contract)?);
            let request = mint.authorize(domain)?;
            println!("{}", serde_json::to_string_pretty(&request)?);
        }
        Command::RelayMint { mint, attempts } => {
            let client = client(&args)?;
            let info = client.info().await?;
            let request = mint.authorize(info.domain)?;
            submit(client, &request, *attempts).await?;
        }
        Command::Submit { request } => {
            let contents = std::fs::read_to_string(request)
                .map_err(|e| anyhow!("Failed to read {}: {}", request.display(), e))?;
            let request: RelayMintRequest = serde_json::from_str(&contents)?;
            submit(client(&args)?, &request, 3).await?;
        }
        Command::ActionStatus { action_id } => {
            let action_id =
                ActionId::from_str(action_id).map_err(|e| anyhow!("Invalid action id: {}", e))?;
            let status = client(&args)?.action_status(&action_id).await?;
            if status.used {
                println!(
                    "{} {} (at {})",
                    "CONSUMED".yellow().bold(),
                    status.action_id,
                    status.used_at.map(format_time).unwrap_or_default()
                );
            } else {
                println!("{} {}", "UNUSED".green().bold(), status.action_id);
            }
        }
        Command::Status => {
            let client = client(&args)?;
            let info = client.info().await?;
            let pending = client.reconcile_status().await?;

            println!();
            println!("  Chain id:        {}", info.chain_id);
            println!("  Relay minter:    {}", info.relay_minter);
            println!("  Engine:          {}", info.engine);
            println!("  Backend signer:  {}", info.backend_signer);
            println!("  Operator:        {}", info.operator);
            println!("  Rate:            {} points per token", info.redemption_rate);
            println!("  Total supply:    {}", info.total_supply);
            println!("  Block:           {}", info.block_number);
            if info.paused {
                println!("  State:           {}", "PAUSED".red().bold());
            } else {
                println!("  State:           {}", "active".green());
            }
            println!();
            println!("  Pending users:   {}", pending.pending_users);
            println!("  Pending points:  {}", pending.pending_points);
            println!(
                "  Last reconcile:  {}",
                pending.last_run.map(format_time).unwrap_or_else(|| "never".to_string())
            );
        }
        Command::Keygen { out } => {
            let key = generate_signing_key();
            save_signing_key(&key, out)?;
            println!(
                "Wrote key for {} to {}",
                rewards_ledger::eip712::signing_key_address(&key),
                out.display()
            );
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_reconcile_args() {
        let args = Args::try_parse_from(["rewards", "reconcile", "--job", "daily.json"]).unwrap();
        assert_eq!(args.relayer, rewards_network::DEFAULT_RELAYER_URL);
        assert!(matches!(args.command, Command::Reconcile { job } if job == PathBuf::from("daily.json")));
    }

    #[test]
    fn test_relayer_flag_is_global() {
        let args = Args::try_parse_from([
            "rewards",
            "action-status",
            "0x01",
            "--relayer",
            "http://relayer:9000",
        ])
        .unwrap();
        assert_eq!(args.relayer, "http://relayer:9000");
    }

    #[test]
    fn test_api_key_reaches_client_config() {
        let args = Args::try_parse_from([
            "rewards",
            "reconcile",
            "--job",
            "daily.json",
            "--api-key",
            "operator-secret",
        ])
        .unwrap();

        let client = client(&args).unwrap();
        assert_eq!(
            client.config().api_key.as_deref(),
            Some("operator-secret")
        );
    }

    #[test]
    fn test_sign_mint_offline() {
        let dir = tempfile::tempdir().unwrap();
        let key_path = dir.path().join("signer.key");
        save_signing_key(&generate_signing_key(), &key_path).unwrap();

        let args = Args::try_parse_from([
            "rewards",
            "sign-mint",
            "--key",
            key_path.to_str().unwrap(),
            "--to",
            "0xaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaa",
            "--amount",
            "25",
            "--verifying-contract",
            "0x1010101010101010101010101010101010101010",
        ])
        .unwrap();

        let Command::SignMint { mint, chain_id, verifying_contract } = args.command else {
            panic!("expected sign-mint");
        };
        let domain = Domain::relay_minter(chain_id, parse_address(&verifying_contract).unwrap());
        let request = mint.authorize(domain).unwrap();
        assert_eq!(request.amount, 25);
        assert!(request.deadline > unix_now());
    }

    #[test]
    fn test_format_time() {
        assert_eq!(format_time(0), "1970-01-01 00:00:00 UTC");
    }
}
