// Chain-time control for a simulated development node.
//
// Moves the perceived block timestamp and height so that time-gated
// contract logic (presale open/close windows) can be exercised
// deterministically. Refuses to touch a real network.

use std::sync::Arc;

use anyhow::{Context, Result};
use ethers::providers::{Http, Middleware, Provider};
use ethers::types::U256;

use crate::config::Network;
use crate::error::HarnessError;

/// Driver for the simulated ledger's clock and block height.
///
/// Calls are applied strictly in call order; nothing is batched. Test
/// scenarios depend on exact time-then-mine sequencing.
pub struct ChainTime {
    provider: Arc<Provider<Http>>,
    dev: bool,
}

impl ChainTime {
    /// Bind the controller to a provider, noting whether the target
    /// network is a simulated development chain.
    pub fn new(provider: Arc<Provider<Http>>, network: &Network) -> Self {
        Self {
            provider,
            dev: network.dev,
        }
    }

    /// Shift the node's clock forward by `secs` seconds.
    ///
    /// The new timestamp is only observable by `block.timestamp` reads
    /// once the next block is mined; see [`advance_time_and_block`].
    ///
    /// [`advance_time_and_block`]: ChainTime::advance_time_and_block
    pub async fn advance_time(&self, secs: u64) -> Result<()> {
        self.ensure_dev("evm_increaseTime")?;
        log::debug!("advancing chain time by {secs}s");
        self.provider
            .request::<_, serde_json::Value>("evm_increaseTime", [secs])
            .await
            .context("evm_increaseTime request failed")?;
        Ok(())
    }

    /// Mine one empty block.
    pub async fn advance_block(&self) -> Result<()> {
        self.ensure_dev("evm_mine")?;
        self.provider
            .request::<_, serde_json::Value>("evm_mine", ())
            .await
            .context("evm_mine request failed")?;
        Ok(())
    }

    /// Mine `count` empty blocks, one request at a time.
    pub async fn advance_block_by(&self, count: u64) -> Result<()> {
        self.ensure_dev("evm_mine")?;
        for _ in 0..count {
            self.advance_block().await?;
        }
        Ok(())
    }

    /// Mine empty blocks until the chain reaches `height`. Does nothing
    /// if the chain is already at or past it.
    pub async fn advance_block_to(&self, height: u64) -> Result<()> {
        self.ensure_dev("evm_mine")?;
        let current = self
            .provider
            .get_block_number()
            .await
            .context("failed to read block number")?
            .as_u64();
        for _ in current..height {
            self.advance_block().await?;
        }
        Ok(())
    }

    /// Shift the clock forward, then mine one block so the new
    /// timestamp becomes observable. Time first, then block.
    pub async fn advance_time_and_block(&self, secs: u64) -> Result<()> {
        self.advance_time(secs).await?;
        self.advance_block().await?;
        Ok(())
    }

    /// Timestamp of the latest block.
    pub async fn latest_timestamp(&self) -> Result<U256> {
        let block = self
            .provider
            .get_block(ethers::types::BlockNumber::Latest)
            .await
            .context("failed to read latest block")?
            .context("node returned no latest block")?;
        Ok(block.timestamp)
    }

    fn ensure_dev(&self, op: &'static str) -> Result<(), HarnessError> {
        if self.dev {
            Ok(())
        } else {
            Err(HarnessError::Unsupported(op))
        }
    }
}
