// Presale Deploy CLI
//
// Deploys the token and presale contracts to a configured network and,
// on live runs, verifies them on the block explorer afterwards.

use std::fs;
use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{anyhow, Context, Result};
use clap::{Parser, Subcommand};
use ethers::abi::Token;
use ethers::middleware::SignerMiddleware;
use ethers::signers::Signer;
use ethers::types::{Address, U256};
use ethers::utils::to_checksum;

use presale_deploy::config::{wallet_from_mnemonic, ACCOUNT_COUNT};
use presale_deploy::time::{current_time, to_unix};
use presale_deploy::units::{to_bn, to_wei_str, DEFAULT_DECIMALS};
use presale_deploy::verify::{verify_all, ExplorerClient, SourceMeta};
use presale_deploy::{ArtifactStore, DeployContext, FileAddressBook, Network, NetworkRegistry, Secrets};

/// Deployment and verification harness for the token presale contracts
#[derive(Parser)]
#[clap(author, version, about, long_about = None)]
struct Cli {
    /// Target network (hardhat, bsctestnet, bscmainnet)
    #[clap(short, long, default_value = "hardhat")]
    network: String,

    /// Directory holding compiled contract artifacts
    #[clap(long, default_value = "artifacts")]
    artifacts: PathBuf,

    /// Contract address registry file
    #[clap(long, default_value = "contract-addresses.json")]
    registry: PathBuf,

    /// Print receipts, record addresses and verify on the explorer
    #[clap(long)]
    live: bool,

    /// Flattened Solidity source for explorer verification (live runs)
    #[clap(long)]
    source: Option<PathBuf>,

    /// Fully qualified contract name for verification,
    /// e.g. contracts/PreSale.sol:PreSale
    #[clap(long)]
    contract_path: Option<String>,

    /// Long compiler version for verification
    #[clap(long, default_value = "v0.8.4+commit.c7e474f2")]
    compiler_version: String,

    #[clap(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Print the signer addresses derived from the configured mnemonic
    Accounts,

    /// Deploy the token contract (no constructor arguments)
    DeployToken {
        /// Contract name of the token artifact
        #[clap(long, default_value = "CatDoge")]
        name: String,
    },

    /// Deploy the presale contract
    DeployPresale {
        /// Contract name of the presale artifact
        #[clap(long, default_value = "PreSale")]
        name: String,

        /// Tokens delivered per unit of native currency (no decimals)
        #[clap(long)]
        rate: String,

        /// Wallet receiving raised funds (defaults to the signer)
        #[clap(long)]
        wallet: Option<String>,

        /// Address of the token being sold (defaults to the address
        /// recorded for --token-name)
        #[clap(long)]
        token: Option<String>,

        /// Registry name of the token contract
        #[clap(long, default_value = "CatDoge")]
        token_name: String,

        /// Opening time, RFC 3339 or "MM/DD/YYYY HH:MM:SS"
        /// (defaults to now + 1000 seconds)
        #[clap(long)]
        opening: Option<String>,

        /// Closing time, same formats as --opening
        #[clap(long)]
        closing: String,

        /// Per-buyer cap in native currency
        #[clap(long, default_value = "10")]
        cap: String,

        /// Minimum buy limit in native currency
        #[clap(long, default_value = "0.01")]
        min_buy: String,
    },
}

type Client = SignerMiddleware<ethers::providers::Provider<ethers::providers::Http>, ethers::signers::LocalWallet>;

#[tokio::main]
async fn main() -> Result<()> {
    env_logger::init();

    let cli = Cli::parse();
    let secrets = Secrets::from_env();
    let networks = NetworkRegistry::new(&secrets);
    let network = networks
        .get(&cli.network)
        .ok_or_else(|| anyhow!("unknown network: {}", cli.network))?
        .clone();

    match &cli.command {
        Commands::Accounts => accounts(&network, &secrets),
        Commands::DeployToken { name } => {
            let mut ctx = deploy_context(&cli, &network, &secrets)?;
            ctx.deploy(name, Vec::new()).await?;
            finish(&cli, &network, &secrets, &ctx).await
        }
        Commands::DeployPresale {
            name,
            rate,
            wallet,
            token,
            token_name,
            opening,
            closing,
            cap,
            min_buy,
        } => {
            let mut ctx = deploy_context(&cli, &network, &secrets)?;
            let signer_addr = ctx.signer_address()?;

            let wallet = match wallet {
                Some(raw) => parse_address(raw)?,
                None => signer_addr,
            };
            let token = match token {
                Some(raw) => parse_address(raw)?,
                None => ctx
                    .attach(token_name, None)
                    .with_context(|| format!("pass --token or deploy {token_name} first"))?
                    .address(),
            };
            let opening_time = match opening {
                Some(raw) => to_unix(raw)?,
                None => current_time(1000),
            };
            let closing_time = to_unix(closing)?;

            let args = vec![
                Token::Uint(to_bn(rate)?),
                Token::Address(wallet),
                Token::Address(token),
                Token::Uint(U256::from(opening_time)),
                Token::Uint(U256::from(closing_time)),
                Token::Uint(to_wei_str(cap, DEFAULT_DECIMALS)?),
                Token::Uint(to_wei_str(min_buy, DEFAULT_DECIMALS)?),
            ];

            ctx.deploy(name, args).await?;
            finish(&cli, &network, &secrets, &ctx).await
        }
    }
}

/// Print the first few signer addresses, like the task runner's
/// `accounts` task did.
fn accounts(network: &Network, secrets: &Secrets) -> Result<()> {
    let mnemonic = secrets.mnemonic_for(network);
    if mnemonic.is_empty() {
        anyhow::bail!("no mnemonic configured for network {}", network.name);
    }
    for index in 0..ACCOUNT_COUNT {
        let wallet = wallet_from_mnemonic(mnemonic, index, network.chain_id)?;
        println!("{}", to_checksum(&wallet.address(), None));
    }
    Ok(())
}

fn deploy_context(cli: &Cli, network: &Network, secrets: &Secrets) -> Result<DeployContext<Client>> {
    let mnemonic = secrets.mnemonic_for(network);
    if mnemonic.is_empty() {
        anyhow::bail!("no mnemonic configured for network {}", network.name);
    }
    let wallet = wallet_from_mnemonic(mnemonic, 0, network.chain_id)?;
    let provider = network.provider()?;
    let client = Arc::new(SignerMiddleware::new((*provider).clone(), wallet));

    let book = FileAddressBook::open(&cli.registry)?;
    let mut ctx = DeployContext::new(
        client,
        ArtifactStore::new(&cli.artifacts),
        Box::new(book),
    );
    if cli.live {
        ctx.set_live();
    }
    Ok(ctx)
}

/// Best-effort verification of everything the run deployed, then exit
/// successfully. Only live runs with recorded deployments verify.
async fn finish(cli: &Cli, network: &Network, secrets: &Secrets, ctx: &DeployContext<Client>) -> Result<()> {
    if !cli.live || ctx.records().is_empty() {
        return Ok(());
    }

    let Some(source) = &cli.source else {
        log::warn!("skipping verification: no --source given");
        return Ok(());
    };
    let Some(contract_path) = &cli.contract_path else {
        log::warn!("skipping verification: no --contract-path given");
        return Ok(());
    };

    let meta = SourceMeta {
        source_code: fs::read_to_string(source)
            .with_context(|| format!("failed to read source {}", source.display()))?,
        contract_name: contract_path.clone(),
        // Compiler settings from the project's build configuration
        compiler_version: cli.compiler_version.clone(),
        optimizer_enabled: true,
        optimizer_runs: 200,
    };

    let client = ExplorerClient::for_network(network, secrets.explorer_api_key.clone())?;
    verify_all(&client, ctx.records(), &meta).await;
    Ok(())
}

fn parse_address(raw: &str) -> Result<Address> {
    raw.parse::<Address>()
        .map_err(|e| anyhow!("invalid address {raw}: {e}"))
}
