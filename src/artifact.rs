// Compiled-contract artifacts (ABI + creation bytecode), resolved by
// contract name from a build output directory.

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use ethers::abi::Abi;
use ethers::types::Bytes;
use serde::Deserialize;

/// One compiled contract, as emitted by the Solidity toolchain.
#[derive(Debug, Clone, Deserialize)]
pub struct Artifact {
    /// Contract ABI
    pub abi: Abi,

    /// 0x-prefixed creation bytecode
    pub bytecode: Bytes,
}

/// Loads artifacts by contract name from a build output directory.
pub struct ArtifactStore {
    dir: PathBuf,
}

impl ArtifactStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    /// Resolve and parse the artifact for the EXACT contract name.
    ///
    /// Looks for `<dir>/<name>.json` first, then the nested
    /// `<dir>/<name>.sol/<name>.json` layout build tools produce.
    pub fn load(&self, name: &str) -> Result<Artifact> {
        let path = self
            .candidates(name)
            .into_iter()
            .find(|p| p.is_file())
            .with_context(|| {
                format!(
                    "no artifact for contract {name} under {} (was the contract compiled?)",
                    self.dir.display()
                )
            })?;
        Self::parse(&path)
    }

    fn candidates(&self, name: &str) -> [PathBuf; 2] {
        [
            self.dir.join(format!("{name}.json")),
            self.dir.join(format!("{name}.sol")).join(format!("{name}.json")),
        ]
    }

    fn parse(path: &Path) -> Result<Artifact> {
        let raw = fs::read_to_string(path)
            .with_context(|| format!("failed to read artifact {}", path.display()))?;
        let artifact = serde_json::from_str(&raw)
            .with_context(|| format!("malformed artifact {}", path.display()))?;
        Ok(artifact)
    }
}
