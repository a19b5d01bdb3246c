// Presale Deploy
//
// Off-chain harness for deploying, testing and explorer-verifying the
// token and presale contracts. The contracts themselves are external;
// this crate consumes their compiled artifacts and drives them through
// an EVM JSON-RPC provider.

pub mod artifact;
pub mod chain;
pub mod config;
pub mod deploy;
pub mod error;
pub mod registry;
pub mod time;
pub mod units;
pub mod verify;

pub use artifact::ArtifactStore;
pub use chain::ChainTime;
pub use config::{Network, NetworkRegistry, Secrets};
pub use deploy::{DeployContext, DeployRecord};
pub use error::HarnessError;
pub use registry::{AddressBook, FileAddressBook, MemoryAddressBook};
