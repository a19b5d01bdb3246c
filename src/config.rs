// Network configurations, secrets and wallet derivation.
//
// This module provides the per-network settings the deploy scripts and
// tests select by name, mirroring what the project previously kept in a
// task-runner config file.

use std::collections::HashMap;
use std::env;
use std::sync::Arc;

use anyhow::{Context, Result};
use ethers::providers::{Http, Provider};
use ethers::signers::{coins_bip39::English, LocalWallet, MnemonicBuilder, Signer};

/// Number of accounts derived from the mnemonic for local use.
pub const ACCOUNT_COUNT: u32 = 10;

/// Network configuration
#[derive(Debug, Clone)]
pub struct Network {
    /// Chain ID
    pub chain_id: u64,

    /// Network name, as selected on the command line
    pub name: String,

    /// JSON-RPC endpoint
    pub rpc_url: String,

    /// Block-explorer verification API endpoint, if the network has one
    pub explorer_api_url: Option<String>,

    /// Native currency symbol
    pub currency_symbol: String,

    /// Whether this is a simulated development chain that accepts
    /// time-warp and mining requests
    pub dev: bool,
}

impl Network {
    /// Local development chain (hardhat-style node on the default port).
    pub fn hardhat() -> Self {
        Self {
            chain_id: 31337,
            name: "hardhat".to_string(),
            rpc_url: "http://127.0.0.1:8545".to_string(),
            explorer_api_url: None,
            currency_symbol: "BNB".to_string(),
            dev: true,
        }
    }

    /// Binance Smart Chain testnet, through the configured node provider.
    pub fn bsc_testnet(node_api_key: &str) -> Self {
        Self {
            chain_id: 97,
            name: "bsctestnet".to_string(),
            rpc_url: format!("https://speedy-nodes-nyc.moralis.io/{node_api_key}/bsc/testnet"),
            explorer_api_url: Some("https://api-testnet.bscscan.com/api".to_string()),
            currency_symbol: "BNB".to_string(),
            dev: false,
        }
    }

    /// Binance Smart Chain mainnet, through the configured node provider.
    pub fn bsc_mainnet(node_api_key: &str) -> Self {
        Self {
            chain_id: 56,
            name: "bscmainnet".to_string(),
            rpc_url: format!("https://speedy-nodes-nyc.moralis.io/{node_api_key}/bsc/mainnet"),
            explorer_api_url: Some("https://api.bscscan.com/api".to_string()),
            currency_symbol: "BNB".to_string(),
            dev: false,
        }
    }

    /// Connect a provider to this network's RPC endpoint.
    pub fn provider(&self) -> Result<Arc<Provider<Http>>> {
        let provider = Provider::<Http>::try_from(self.rpc_url.as_str())
            .with_context(|| format!("invalid RPC URL for network {}", self.name))?;
        Ok(Arc::new(provider))
    }
}

/// Registry of the networks this harness knows how to target.
pub struct NetworkRegistry {
    configs: HashMap<String, Network>,
}

impl NetworkRegistry {
    /// Create a registry with the default network configurations.
    pub fn new(secrets: &Secrets) -> Self {
        let mut configs = HashMap::new();
        for network in [
            Network::hardhat(),
            Network::bsc_testnet(&secrets.node_api_key),
            Network::bsc_mainnet(&secrets.node_api_key),
        ] {
            configs.insert(network.name.clone(), network);
        }
        Self { configs }
    }

    /// Look up a network configuration by name.
    pub fn get(&self, name: &str) -> Option<&Network> {
        self.configs.get(name)
    }

    /// Add or replace a network configuration.
    pub fn add(&mut self, network: Network) {
        self.configs.insert(network.name.clone(), network);
    }
}

/// Opaque secrets, read from the environment once at process start.
#[derive(Clone)]
pub struct Secrets {
    /// Signing mnemonic for test networks and the local chain
    pub mnemonic: String,

    /// Signing mnemonic for mainnet deployments
    pub mnemonic_mainnet: String,

    /// Explorer verification API key
    pub explorer_api_key: String,

    /// Upstream node-provider API key
    pub node_api_key: String,
}

impl Secrets {
    /// Read all secrets from the environment. Missing variables become
    /// empty strings and only fail later, at the point of use.
    pub fn from_env() -> Self {
        Self {
            mnemonic: env::var("MNEMONIC").unwrap_or_default(),
            mnemonic_mainnet: env::var("MNEMONIC_MAINNET").unwrap_or_default(),
            explorer_api_key: env::var("BSCSCAN_API_KEY").unwrap_or_default(),
            node_api_key: env::var("MORALIS_API_KEY").unwrap_or_default(),
        }
    }

    /// The mnemonic that signs on the given network. Mainnet uses its
    /// own mnemonic; everything else shares the test one.
    pub fn mnemonic_for(&self, network: &Network) -> &str {
        if network.chain_id == 56 {
            &self.mnemonic_mainnet
        } else {
            &self.mnemonic
        }
    }
}

/// Derive a wallet from a mnemonic at the given account index, on the
/// standard m/44'/60'/0'/0 path, bound to the network's chain id.
pub fn wallet_from_mnemonic(mnemonic: &str, index: u32, chain_id: u64) -> Result<LocalWallet> {
    let wallet = MnemonicBuilder::<English>::default()
        .phrase(mnemonic)
        .index(index)
        .context("invalid account index")?
        .build()
        .context("failed to derive wallet from mnemonic")?;
    Ok(wallet.with_chain_id(chain_id))
}
