//! CLI configuration file
//!
//! Everything has a default, so the CLI runs without a config file. When
//! `--config` is not given, `cpamm.toml` in the working directory is used if
//! it exists.

use anyhow::{Context, Result};
use pool_ledger::{Address, InMemoryBank, PauseSwitch, Pool, SettlementMode};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

pub const DEFAULT_CONFIG_FILE: &str = "cpamm.toml";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CliConfig {
    /// Where the pool snapshot is kept between invocations
    pub state_path: PathBuf,
    /// env_logger filter used when neither `--verbose` nor RUST_LOG is set
    pub log_level: String,
    pub pool: PoolConfig,
    /// Accounts funded in the bank when a pool is created
    #[serde(rename = "account")]
    pub accounts: Vec<AccountConfig>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PoolConfig {
    pub asset_a: String,
    pub asset_b: String,
    pub address: String,
    pub admin: String,
    pub mode: SettlementMode,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AccountConfig {
    pub name: String,
    #[serde(default)]
    pub balance_a: u64,
    #[serde(default)]
    pub balance_b: u64,
    /// Grant the pool an unlimited allowance on both assets
    #[serde(default = "default_true")]
    pub approve_pool: bool,
}

fn default_true() -> bool {
    true
}

impl Default for CliConfig {
    fn default() -> Self {
        let accounts = ["alice", "bob", "mallory"]
            .into_iter()
            .map(|name| AccountConfig {
                name: name.to_string(),
                balance_a: 1_000_000_000,
                balance_b: 1_000_000_000,
                approve_pool: true,
            })
            .collect();

        Self {
            state_path: PathBuf::from("cpamm-state.json"),
            log_level: "info".to_string(),
            pool: PoolConfig::default(),
            accounts,
        }
    }
}

impl Default for PoolConfig {
    fn default() -> Self {
        Self {
            asset_a: "TKA".to_string(),
            asset_b: "TKB".to_string(),
            address: "pool".to_string(),
            admin: "admin".to_string(),
            mode: SettlementMode::Audited,
        }
    }
}

impl CliConfig {
    /// Load the config at `path`, or the default file, or built-in defaults
    pub fn load(path: Option<&Path>) -> Result<Self> {
        match path {
            Some(path) => Self::from_file(path),
            None => {
                let default_path = Path::new(DEFAULT_CONFIG_FILE);
                if default_path.exists() {
                    Self::from_file(default_path)
                } else {
                    Ok(Self::default())
                }
            }
        }
    }

    pub fn from_file(path: &Path) -> Result<Self> {
        let data = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;
        toml::from_str(&data)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))
    }

    /// Build an empty pool with the configured accounts funded and approved
    pub fn build_pool(&self) -> Result<Pool> {
        let asset_a = parse_address(&self.pool.asset_a)?;
        let asset_b = parse_address(&self.pool.asset_b)?;
        let address = parse_address(&self.pool.address)?;
        let admin = parse_address(&self.pool.admin)?;

        let mut bank = InMemoryBank::new();
        for account in &self.accounts {
            let owner = parse_address(&account.name)?;
            bank.mint(&asset_a, &owner, u128::from(account.balance_a))?;
            bank.mint(&asset_b, &owner, u128::from(account.balance_b))?;
            if account.approve_pool {
                bank.approve(&asset_a, &owner, &address, u128::MAX);
                bank.approve(&asset_b, &owner, &address, u128::MAX);
            }
        }

        let pool = Pool::new(asset_a, asset_b, address, admin, bank, PauseSwitch::default())
            .context("Invalid pool definition in config")?;
        Ok(pool.with_mode(self.pool.mode))
    }
}

/// Parse a base58 address or a short account label
pub fn parse_address(s: &str) -> Result<Address> {
    s.parse::<Address>()
        .with_context(|| format!("Invalid address: {s}"))
}
