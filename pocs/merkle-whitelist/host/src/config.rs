use std::collections::HashSet;

use alloy_primitives::B256;
use serde::Deserialize;

use crate::error::WhitelistError;
use crate::leaf::WhitelistEntry;
use crate::whitelist::Whitelist;

/// Whitelist definition loaded from TOML.
///
/// ```toml
/// expected_root = "0x..."   # optional
///
/// [[entries]]
/// address = "0xf39Fd6e51aad88F6F4ce6aB8827279cffFb92266"
/// amount = "5000000000000000000"
/// ```
#[derive(Debug, Deserialize)]
pub struct WhitelistConfig {
    /// Root the whitelist is expected to commit to. When present, building a
    /// tree with a different root is an error.
    pub expected_root: Option<B256>,
    #[serde(default)]
    pub entries: Vec<EntryConfig>,
}

/// One whitelist row. Widths are checked when the entry is parsed.
#[derive(Debug, Deserialize)]
pub struct EntryConfig {
    pub address: String,
    /// Amount in wei, decimal or `0x` hex.
    pub amount: String,
}

/// Errors from config loading and validation.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("failed to read config file: {0}")]
    Io(#[from] std::io::Error),

    #[error("failed to parse config: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("entry {index}: {source}")]
    Entry {
        index: usize,
        #[source]
        source: WhitelistError,
    },

    #[error("validation error: {0}")]
    Validation(String),
}

impl WhitelistConfig {
    /// Load and validate a config from a TOML file.
    pub fn load(path: &std::path::Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)?;
        let config: Self = toml::from_str(&content)?;
        config.validate()?;
        Ok(config)
    }

    /// Validate configuration invariants.
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.to_whitelist().map(|_| ())
    }

    /// Parse every entry into a [`Whitelist`], preserving file order.
    pub fn to_whitelist(&self) -> Result<Whitelist, ConfigError> {
        if self.entries.is_empty() {
            return Err(ConfigError::Validation(WhitelistError::EmptySet.to_string()));
        }

        let mut seen = HashSet::with_capacity(self.entries.len());
        let mut whitelist = Whitelist::new();
        for (index, row) in self.entries.iter().enumerate() {
            let entry = WhitelistEntry::parse(&row.address, &row.amount)
                .map_err(|source| ConfigError::Entry { index, source })?;
            if !seen.insert(entry.address) {
                return Err(ConfigError::Validation(format!(
                    "entry {index}: address {} is listed more than once",
                    entry.address
                )));
            }
            whitelist.add_entry(entry);
        }
        Ok(whitelist)
    }

    /// Check a freshly built root against `expected_root`, if one is pinned.
    pub fn check_root(&self, root: B256) -> Result<(), ConfigError> {
        match self.expected_root {
            Some(expected) if expected != root => Err(ConfigError::Validation(format!(
                "root mismatch: config pins {expected}, tree has {root}"
            ))),
            _ => Ok(()),
        }
    }
}
