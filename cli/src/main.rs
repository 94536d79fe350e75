//! cpamm - drive a constant-product pool ledger from the command line
//!
//! The pool lives in a JSON state file between invocations. Every command
//! loads it, applies one operation and writes it back only if the operation
//! succeeded.

use anyhow::Result;
use clap::{Parser, Subcommand};
use colored::Colorize;
use pool_ledger::{Direction, Pool, PoolEvent, Side};
use serde_json::Value;
use std::path::PathBuf;

mod admin;
mod config;
mod liquidity;
mod scenario;
mod store;
mod trading;

use config::CliConfig;

#[derive(Parser)]
#[command(name = "cpamm")]
#[command(
    about = "Constant-product pool ledger - deposit, swap, withdraw and audit",
    long_about = None
)]
#[command(version)]
struct Cli {
    /// Config file (defaults to ./cpamm.toml when present)
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Pool state file (overrides the config)
    #[arg(short, long, global = true)]
    state: Option<PathBuf>,

    /// Verbose output
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Print machine-readable JSON instead of text
    #[arg(long, global = true)]
    json: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Create a fresh pool from the config and fund its accounts
    Init {
        /// Overwrite an existing state file
        #[arg(long)]
        force: bool,
    },

    /// Show reserves, shares, balances and recent events
    Show {
        /// Only show this account
        account: Option<String>,

        /// Number of recent events to list
        #[arg(long, default_value = "5")]
        events: usize,
    },

    /// Deposit both assets and mint LP shares
    Deposit {
        amount_a: u64,
        amount_b: u64,

        /// Liquidity provider
        #[arg(long)]
        from: String,
    },

    /// Burn LP shares for a proportional cut of the reserves
    Withdraw {
        shares: u64,

        #[arg(long)]
        from: String,
    },

    /// Swap an exact input amount
    Swap {
        /// a-to-b or b-to-a
        direction: Direction,

        amount_in: u64,

        /// Reject the swap if it pays out less than this
        #[arg(long, default_value = "0")]
        min_out: u64,

        #[arg(long)]
        from: String,
    },

    /// Preview a swap without executing it
    Quote {
        direction: Direction,
        amount_in: u64,
    },

    /// Spot price of one unit of a side (scaled by 1e18)
    Price {
        /// a or b
        side: Side,
    },

    /// Hand the admin role to another account
    TransferAdmin {
        new_admin: String,

        #[arg(long)]
        from: String,
    },

    /// Halt every mutating operation
    Pause {
        #[arg(long)]
        from: String,
    },

    /// Lift a pause
    Resume {
        #[arg(long)]
        from: String,
    },

    /// Privileged withdrawal of pool funds
    Drain {
        side: Side,
        amount: u64,

        #[arg(long)]
        from: String,
    },

    /// Credit an account in the in-memory bank
    Mint {
        side: Side,
        account: String,
        amount: u64,
    },

    /// Set an account's allowance for the pool
    Approve {
        side: Side,
        owner: String,
        amount: u64,
    },

    /// Run a scripted list of steps against a fresh pool
    Scenario {
        file: PathBuf,
    },
}

/// Resolved settings shared by every command
pub struct Context {
    pub config: CliConfig,
    pub state_path: PathBuf,
    pub json: bool,
}

impl Context {
    pub fn load_pool(&self) -> Result<Pool> {
        store::load(&self.state_path)
    }

    /// Load the pool, apply `op`, and persist only on success
    pub fn apply<T>(
        &self,
        op: impl FnOnce(&mut Pool) -> pool_ledger::Result<T>,
    ) -> Result<(Pool, T)> {
        let mut pool = self.load_pool()?;
        let value = op(&mut pool)?;
        if let Err(violation) = pool.check_invariants() {
            log::warn!("ledger invariant broken: {violation}");
        }
        store::save(&self.state_path, &pool)?;
        Ok((pool, value))
    }

    /// Print `value` as JSON, or run `human` to print text
    pub fn emit(&self, value: Value, human: impl FnOnce()) -> Result<()> {
        if self.json {
            println!("{}", serde_json::to_string_pretty(&value)?);
        } else {
            human();
        }
        Ok(())
    }
}

/// One-line human rendering of an event
pub fn describe_event(event: &PoolEvent) -> String {
    match event {
        PoolEvent::LiquidityAdded { provider, amount_a, amount_b, shares_minted } => {
            format!(
                "LiquidityAdded   {} +{} A +{} B -> {} shares",
                provider, amount_a, amount_b, shares_minted
            )
        }
        PoolEvent::LiquidityRemoved { provider, shares_burned, amount_a, amount_b } => {
            format!(
                "LiquidityRemoved {} -{} shares -> {} A {} B",
                provider, shares_burned, amount_a, amount_b
            )
        }
        PoolEvent::Swap { trader, direction, amount_in, amount_out } => {
            format!("Swap             {trader} {direction} {amount_in} in, {amount_out} out")
        }
        PoolEvent::AdminTransferred { previous_admin, new_admin } => {
            format!("AdminTransferred {previous_admin} -> {new_admin}")
        }
        PoolEvent::Paused { by } => format!("Paused           by {by}"),
        PoolEvent::Resumed { by } => format!("Resumed          by {by}"),
        PoolEvent::PrivilegedWithdrawal { caller, asset, amount } => {
            format!("PrivilegedWithdrawal {caller} took {amount} {asset}")
        }
    }
}

pub fn print_last_event(pool: &Pool) {
    if let Some(event) = pool.events().last() {
        println!("{} {}", "Event:".bright_cyan(), describe_event(event));
    }
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let config = CliConfig::load(cli.config.as_deref())?;
    let level = if cli.verbose { "debug" } else { config.log_level.as_str() };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(level)).init();

    let state_path = cli.state.clone().unwrap_or_else(|| config.state_path.clone());
    if cli.verbose && !cli.json {
        println!("{} {}", "State:".bright_cyan(), state_path.display());
        println!("{} {:?}", "Mode:".bright_cyan(), config.pool.mode);
    }

    let ctx = Context {
        config,
        state_path,
        json: cli.json,
    };

    match cli.command {
        Commands::Init { force } => admin::init(&ctx, force)?,
        Commands::Show { account, events } => liquidity::show(&ctx, account, events)?,
        Commands::Deposit { amount_a, amount_b, from } => {
            liquidity::deposit(&ctx, amount_a, amount_b, &from)?
        }
        Commands::Withdraw { shares, from } => liquidity::withdraw(&ctx, shares, &from)?,
        Commands::Swap { direction, amount_in, min_out, from } => {
            trading::swap(&ctx, direction, amount_in, min_out, &from)?
        }
        Commands::Quote { direction, amount_in } => trading::quote(&ctx, direction, amount_in)?,
        Commands::Price { side } => trading::price(&ctx, side)?,
        Commands::TransferAdmin { new_admin, from } => {
            admin::transfer_admin(&ctx, &new_admin, &from)?
        }
        Commands::Pause { from } => admin::pause(&ctx, &from)?,
        Commands::Resume { from } => admin::resume(&ctx, &from)?,
        Commands::Drain { side, amount, from } => admin::drain(&ctx, side, amount, &from)?,
        Commands::Mint { side, account, amount } => admin::mint(&ctx, side, &account, amount)?,
        Commands::Approve { side, owner, amount } => admin::approve(&ctx, side, &owner, amount)?,
        Commands::Scenario { file } => scenario::run(&ctx, &file)?,
    }

    Ok(())
}
