// Best-effort source verification against a block-explorer API.
//
// Replays recorded deployments one at a time, in recording order, with
// fixed delays to respect the explorer's rate limits and indexing lag.
// A failure for one contract never aborts the rest: explorer
// verification is not required for the contracts to function on-chain.

use std::time::Duration;

use anyhow::{bail, Context, Result};
use ethers::abi;
use ethers::utils::to_checksum;
use reqwest::Client;
use serde::Deserialize;

use crate::config::Network;
use crate::deploy::DeployRecord;
use crate::error::HarnessError;
use crate::time::{delay, from_min, from_sec};

/// Delay before the first submission, giving the explorer's indexer
/// time to observe the deployments.
pub const WARMUP_DELAY_MS: u64 = from_min(2);

/// Delay between consecutive submissions.
pub const INTER_CALL_DELAY_MS: u64 = from_sec(30);

/// Compiler metadata the explorer needs alongside the address and
/// constructor arguments.
#[derive(Debug, Clone)]
pub struct SourceMeta {
    /// Flattened Solidity source
    pub source_code: String,

    /// Fully qualified contract name, e.g. `contracts/PreSale.sol:PreSale`
    pub contract_name: String,

    /// Long compiler version, e.g. `v0.8.4+commit.c7e474f2`
    pub compiler_version: String,

    /// Whether the optimizer was enabled
    pub optimizer_enabled: bool,

    /// Optimizer runs setting
    pub optimizer_runs: u32,
}

/// Explorer verification API client.
pub struct ExplorerClient {
    api_key: String,
    base_url: String,
    client: Client,
}

#[derive(Debug, Deserialize)]
struct ExplorerResponse {
    status: String,
    message: String,
    result: String,
}

impl ExplorerClient {
    /// Create a client against an explicit API endpoint.
    pub fn new(base_url: impl Into<String>, api_key: impl Into<String>) -> Self {
        let client = Client::builder()
            .timeout(Duration::from_secs(30))
            .build()
            .expect("Failed to create HTTP client");

        Self {
            api_key: api_key.into(),
            base_url: base_url.into(),
            client,
        }
    }

    /// Create a client for the given network's explorer.
    pub fn for_network(network: &Network, api_key: impl Into<String>) -> Result<Self> {
        match &network.explorer_api_url {
            Some(url) => Ok(Self::new(url.clone(), api_key)),
            None => bail!("network {} has no explorer API", network.name),
        }
    }

    /// Submit one contract for verification. Returns the explorer's
    /// submission id on acceptance.
    pub async fn verify_contract(&self, record: &DeployRecord, meta: &SourceMeta) -> Result<String> {
        let address = to_checksum(&record.address, None);
        let args_hex = hex::encode(abi::encode(&record.args));

        // The explorer API spells this field "constructorArguements".
        let form = [
            ("module", "contract".to_string()),
            ("action", "verifysourcecode".to_string()),
            ("apikey", self.api_key.clone()),
            ("contractaddress", address.clone()),
            ("sourceCode", meta.source_code.clone()),
            ("codeformat", "solidity-single-file".to_string()),
            ("contractname", meta.contract_name.clone()),
            ("compilerversion", meta.compiler_version.clone()),
            (
                "optimizationUsed",
                if meta.optimizer_enabled { "1" } else { "0" }.to_string(),
            ),
            ("runs", meta.optimizer_runs.to_string()),
            ("constructorArguements", args_hex),
        ];

        let response = self
            .client
            .post(&self.base_url)
            .form(&form)
            .send()
            .await
            .context("explorer API unreachable")?;

        if !response.status().is_success() {
            bail!("explorer API request failed: {}", response.status());
        }

        let body: ExplorerResponse = response
            .json()
            .await
            .context("malformed explorer API response")?;

        if body.status != "1" {
            return Err(HarnessError::Verification {
                address,
                message: format!("{}: {}", body.message, body.result),
            }
            .into());
        }

        Ok(body.result)
    }
}

/// Submit every recorded deployment for verification, in order.
///
/// One warm-up delay before the first submission, one inter-call delay
/// between consecutive submissions, none after the last. Per-contract
/// failures are logged and tolerated; the function always completes.
pub async fn verify_all(client: &ExplorerClient, records: &[DeployRecord], meta: &SourceMeta) {
    if records.is_empty() {
        return;
    }

    println!("***********************************");
    println!("Begin verification...");
    println!("(This will take some time. You can already interact with the contracts while you wait.)");

    let total = records.len();
    for (i, (record, pause)) in records.iter().zip(pause_schedule(total)).enumerate() {
        delay(pause).await;

        println!("***********************************");
        println!(
            "Working on contract: {} ({} out of {total})",
            to_checksum(&record.address, None),
            i + 1
        );

        match client.verify_contract(record, meta).await {
            Ok(submission_id) => println!("Submitted for verification (id: {submission_id})"),
            Err(e) => log::warn!("verification of {} failed: {e:#}", record.name),
        }
    }

    println!("...Finished!");
}

/// Pause (in milliseconds) applied before each submission: the warm-up
/// delay first, then one inter-call delay per remaining submission.
fn pause_schedule(count: usize) -> impl Iterator<Item = u64> {
    (0..count).map(|i| {
        if i == 0 {
            WARMUP_DELAY_MS
        } else {
            INTER_CALL_DELAY_MS
        }
    })
}
