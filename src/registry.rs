// Name -> deployed-address bookkeeping behind an injectable storage
// strategy, so scripts and tests pick file-backed or in-memory storage
// instead of sharing one hard-coded file path.

use std::collections::BTreeMap;
use std::fs;
use std::path::PathBuf;

use anyhow::{Context, Result};
use ethers::types::Address;
use ethers::utils::to_checksum;

/// Storage for deployed contract addresses, keyed by contract name.
///
/// At most one address per name: recording an existing name overwrites
/// it, it never merges.
pub trait AddressBook {
    /// Resolve the recorded address for a contract name, if any.
    fn lookup(&self, name: &str) -> Result<Option<Address>>;

    /// Record (or overwrite) the address for a contract name.
    fn record(&mut self, name: &str, address: Address) -> Result<()>;
}

/// JSON-file-backed address book. The whole file is rewritten on every
/// record, matching the registry's overwrite-not-merge semantics.
pub struct FileAddressBook {
    path: PathBuf,
    entries: BTreeMap<String, String>,
}

impl FileAddressBook {
    /// Open the registry file, creating an empty book if the file does
    /// not exist yet.
    pub fn open(path: impl Into<PathBuf>) -> Result<Self> {
        let path = path.into();
        let entries = match fs::read_to_string(&path) {
            Ok(raw) => serde_json::from_str(&raw)
                .with_context(|| format!("malformed address registry at {}", path.display()))?,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => BTreeMap::new(),
            Err(e) => {
                return Err(e)
                    .with_context(|| format!("failed to read address registry at {}", path.display()))
            }
        };
        Ok(Self { path, entries })
    }

    /// Number of recorded entries.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether the book has no entries.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    fn flush(&self) -> Result<()> {
        let data = serde_json::to_string_pretty(&self.entries)?;
        fs::write(&self.path, data)
            .with_context(|| format!("failed to write address registry at {}", self.path.display()))?;
        Ok(())
    }
}

impl AddressBook for FileAddressBook {
    fn lookup(&self, name: &str) -> Result<Option<Address>> {
        match self.entries.get(name) {
            Some(raw) => {
                let address = raw
                    .parse::<Address>()
                    .with_context(|| format!("registry entry for {name} is not an address: {raw}"))?;
                Ok(Some(address))
            }
            None => Ok(None),
        }
    }

    fn record(&mut self, name: &str, address: Address) -> Result<()> {
        self.entries
            .insert(name.to_string(), to_checksum(&address, None));
        self.flush()
    }
}

/// In-memory address book for tests and one-shot local runs.
#[derive(Default)]
pub struct MemoryAddressBook {
    entries: BTreeMap<String, Address>,
}

impl MemoryAddressBook {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of recorded entries.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether the book has no entries.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl AddressBook for MemoryAddressBook {
    fn lookup(&self, name: &str) -> Result<Option<Address>> {
        Ok(self.entries.get(name).copied())
    }

    fn record(&mut self, name: &str, address: Address) -> Result<()> {
        self.entries.insert(name.to_string(), address);
        Ok(())
    }
}
