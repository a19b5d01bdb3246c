// Contract deployment with receipt reporting and durable address
// bookkeeping. One context object per script run owns the signer
// client, the live-mode flag, the address book and the recorded
// constructor arguments.

use std::sync::Arc;

use anyhow::{Context, Result};
use ethers::abi::Token;
use ethers::contract::{Contract, ContractFactory};
use ethers::providers::Middleware;
use ethers::types::Address;
use ethers::utils::to_checksum;

use crate::artifact::ArtifactStore;
use crate::registry::AddressBook;

/// One confirmed deployment: the address and the ordered constructor
/// arguments it was created with. Read back by the verifier.
#[derive(Debug, Clone)]
pub struct DeployRecord {
    pub name: String,
    pub address: Address,
    pub args: Vec<Token>,
}

/// Deployment context for one script run.
///
/// Deployments run strictly sequentially through `&mut self`: a later
/// constructor routinely takes the address of an earlier contract, so
/// there is no parallel submission by design.
pub struct DeployContext<M> {
    client: Arc<M>,
    artifacts: ArtifactStore,
    book: Box<dyn AddressBook>,
    live: bool,
    records: Vec<DeployRecord>,
}

impl<M: Middleware + 'static> DeployContext<M> {
    pub fn new(client: Arc<M>, artifacts: ArtifactStore, book: Box<dyn AddressBook>) -> Self {
        Self {
            client,
            artifacts,
            book,
            live: false,
            records: Vec::new(),
        }
    }

    /// Switch the context to live mode: print receipts, persist
    /// addresses and keep constructor arguments for verification.
    pub fn set_live(&mut self) {
        self.live = true;
    }

    pub fn is_live(&self) -> bool {
        self.live
    }

    /// Address of the configured signing identity, which doubles as
    /// the default funds wallet. Fails loudly if the client carries no
    /// signer instead of falling back to the zero address.
    pub fn signer_address(&self) -> Result<Address> {
        self.client
            .default_sender()
            .context("client has no signing identity configured")
    }

    /// Deployments recorded so far, in deployment order.
    pub fn records(&self) -> &[DeployRecord] {
        &self.records
    }

    /// Deploy the named contract with the given ordered constructor
    /// arguments and wait for confirmation.
    ///
    /// A failed submission or confirmation surfaces the transport error
    /// unmodified and records nothing; there is no retry and no
    /// cleanup.
    pub async fn deploy(&mut self, name: &str, args: Vec<Token>) -> Result<Contract<M>> {
        let artifact = self.artifacts.load(name)?;
        let factory = ContractFactory::new(artifact.abi, artifact.bytecode, Arc::clone(&self.client));

        log::debug!("deploying {name} with {} constructor argument(s)", args.len());
        let deployer = factory
            .deploy_tokens(args.clone())
            .with_context(|| format!("constructor arguments for {name} do not match its ABI"))?;

        if self.live {
            println!("***********************************");
            println!("Contract: {name}");
            println!("...waiting for confirmation");
        }

        let (contract, receipt) = deployer
            .send_with_receipt()
            .await
            .with_context(|| format!("deployment of {name} failed"))?;

        if self.live {
            println!("Address:  {}", to_checksum(&contract.address(), None));
            println!("TX hash:  {:?}", receipt.transaction_hash);
            println!("Confirmed!");
            self.record_confirmed(name, contract.address(), args)?;
        }

        Ok(contract)
    }

    /// Get a handle to an already-deployed contract: at the explicit
    /// address if one is given, otherwise at the address the book
    /// recorded for this name.
    ///
    /// Not meant for assertions against a contract deployed in the same
    /// test; use the handle `deploy` returns for that.
    pub fn attach(&self, name: &str, address: Option<Address>) -> Result<Contract<M>> {
        let artifact = self.artifacts.load(name)?;
        let address = match address {
            Some(address) => address,
            None => self
                .book
                .lookup(name)?
                .with_context(|| format!("no recorded address for contract {name}"))?,
        };
        Ok(Contract::new(address, artifact.abi, Arc::clone(&self.client)))
    }

    fn record_confirmed(&mut self, name: &str, address: Address, args: Vec<Token>) -> Result<()> {
        self.book.record(name, address)?;
        self.records.push(DeployRecord {
            name: name.to_string(),
            address,
            args,
        });
        Ok(())
    }
}
