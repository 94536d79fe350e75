//! Scripted scenarios
//!
//! A scenario is a TOML file with a list of `[[step]]` tables run in order
//! against a fresh pool built from the config. Each step may state the
//! outcome it expects (`expect = "slippage_exceeded"`), the values the
//! operation returns, and the reserves and true balances afterwards. The
//! ledger invariants are checked after every step.
//!
//! ```toml
//! mode = "audited"
//!
//! [[step]]
//! action = "deposit"
//! caller = "alice"
//! amount_a = 100
//! amount_b = 400
//! expect_out = 200
//!
//! [[step]]
//! action = "swap"
//! caller = "bob"
//! direction = "a_to_b"
//! amount = 10
//! min_out = 37
//! expect = "slippage_exceeded"
//! ```

use anyhow::{bail, Context as _, Result};
use colored::Colorize;
use log::debug;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use thiserror::Error;

use crate::config::{parse_address, CliConfig};
use crate::Context;
use pool_ledger::{Direction, InvariantViolation, LedgerError, Pool, SettlementMode, Side};

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Script {
    /// Overrides the configured settlement mode
    pub mode: Option<SettlementMode>,
    #[serde(rename = "step", default)]
    pub steps: Vec<Step>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Action {
    Deposit,
    Withdraw,
    Swap,
    Quote,
    Price,
    TransferAdmin,
    Pause,
    Resume,
    Drain,
    Mint,
    Approve,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Step {
    pub action: Action,
    pub caller: Option<String>,
    /// New admin, or the account for `mint` and `approve`
    pub target: Option<String>,
    pub side: Option<Side>,
    pub direction: Option<Direction>,
    pub amount_a: Option<u64>,
    pub amount_b: Option<u64>,
    pub shares: Option<u64>,
    pub amount: Option<u64>,
    #[serde(default)]
    pub min_out: u64,

    /// "ok" (the default) or the snake_case name of the expected error
    pub expect: Option<String>,
    pub expect_out: Option<Expected>,
    pub expect_reserves: Option<[u64; 2]>,
    pub expect_held: Option<[u64; 2]>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum Expected {
    One(u64),
    Many(Vec<u64>),
}

impl Expected {
    fn values(&self) -> Vec<u128> {
        match self {
            Expected::One(v) => vec![u128::from(*v)],
            Expected::Many(vs) => vs.iter().copied().map(u128::from).collect(),
        }
    }
}

#[derive(Debug, Error)]
pub enum StepFailure {
    #[error("expected {expected}, got {actual}")]
    Outcome { expected: String, actual: String },

    #[error("expected output {expected:?}, got {actual:?}")]
    Output { expected: Vec<u128>, actual: Vec<u128> },

    #[error("expected reserves {expected:?}, got {actual:?}")]
    Reserves { expected: (u128, u128), actual: (u128, u128) },

    #[error("expected true balances {expected:?}, got {actual:?}")]
    Held { expected: (u128, u128), actual: (u128, u128) },

    #[error("ledger invariant broken: {0}")]
    Invariant(#[from] InvariantViolation),
}

#[derive(Debug, Serialize)]
pub struct StepReport {
    pub index: usize,
    pub action: Action,
    pub outcome: String,
    pub output: Vec<String>,
    pub failure: Option<String>,
}

impl Script {
    pub fn from_file(path: &Path) -> Result<Self> {
        let data = fs::read_to_string(path)
            .with_context(|| format!("Failed to read scenario: {}", path.display()))?;
        toml::from_str(&data)
            .with_context(|| format!("Failed to parse scenario: {}", path.display()))
    }

    /// Run every step against a fresh pool and report each outcome
    ///
    /// A step that fails its expectations does not stop the run; a step that
    /// is missing a required field does.
    pub fn execute(&self, config: &CliConfig) -> Result<Vec<StepReport>> {
        let mut pool = config.build_pool()?;
        if let Some(mode) = self.mode {
            pool.mode = mode;
        }

        let mut reports = Vec::with_capacity(self.steps.len());
        for (i, step) in self.steps.iter().enumerate() {
            let index = i + 1;
            let result =
                apply(&mut pool, step).with_context(|| format!("step {index} is malformed"))?;
            debug!("step {index} {:?}: {:?}", step.action, result);

            let outcome = match &result {
                Ok(_) => "ok".to_string(),
                Err(err) => err.kind().to_string(),
            };
            let output = result.as_ref().map(Clone::clone).unwrap_or_default();
            let failure = check(&pool, step, &outcome, &output).err();

            reports.push(StepReport {
                index,
                action: step.action,
                outcome,
                output: output.iter().map(u128::to_string).collect(),
                failure: failure.map(|f| f.to_string()),
            });
        }
        Ok(reports)
    }
}

fn required<T: Clone>(field: &Option<T>, name: &str) -> Result<T> {
    match field {
        Some(value) => Ok(value.clone()),
        None => bail!("missing `{name}`"),
    }
}

fn address_field(field: &Option<String>, name: &str) -> Result<pool_ledger::Address> {
    parse_address(&required(field, name)?)
}

/// Apply one step. The outer error is a malformed step, the inner one the
/// ledger's verdict.
fn apply(pool: &mut Pool, step: &Step) -> Result<std::result::Result<Vec<u128>, LedgerError>> {
    let amount = |name: &'static str| required(&step.amount, name).map(u128::from);

    let result = match step.action {
        Action::Deposit => {
            let caller = address_field(&step.caller, "caller")?;
            let a = u128::from(required(&step.amount_a, "amount_a")?);
            let b = u128::from(required(&step.amount_b, "amount_b")?);
            pool.deposit(a, b, &caller).map(|minted| vec![minted])
        }
        Action::Withdraw => {
            let caller = address_field(&step.caller, "caller")?;
            let shares = u128::from(required(&step.shares, "shares")?);
            pool.withdraw(shares, &caller).map(|(a, b)| vec![a, b])
        }
        Action::Swap => {
            let caller = address_field(&step.caller, "caller")?;
            let direction = required(&step.direction, "direction")?;
            let amount_in = amount("amount")?;
            pool.swap_exact_in(direction, amount_in, u128::from(step.min_out), &caller)
                .map(|out| vec![out])
        }
        Action::Quote => {
            let direction = required(&step.direction, "direction")?;
            pool.quote(direction, amount("amount")?).map(|q| vec![q.amount_out])
        }
        Action::Price => {
            let side = required(&step.side, "side")?;
            pool.price_of(side).map(|p| vec![p])
        }
        Action::TransferAdmin => {
            let caller = address_field(&step.caller, "caller")?;
            let target = address_field(&step.target, "target")?;
            pool.transfer_admin(&caller, &target).map(|()| Vec::new())
        }
        Action::Pause => {
            let caller = address_field(&step.caller, "caller")?;
            pool.pause(&caller).map(|()| Vec::new())
        }
        Action::Resume => {
            let caller = address_field(&step.caller, "caller")?;
            pool.resume(&caller).map(|()| Vec::new())
        }
        Action::Drain => {
            let caller = address_field(&step.caller, "caller")?;
            let side = required(&step.side, "side")?;
            pool.privileged_withdraw(side, amount("amount")?, &caller)
                .map(|()| Vec::new())
        }
        Action::Mint => {
            let target = address_field(&step.target, "target")?;
            let asset = pool.asset(required(&step.side, "side")?);
            pool.bank
                .mint(&asset, &target, amount("amount")?)
                .map(|()| Vec::new())
                .map_err(LedgerError::from)
        }
        Action::Approve => {
            let target = address_field(&step.target, "target")?;
            let asset = pool.asset(required(&step.side, "side")?);
            let spender = pool.address;
            pool.bank.approve(&asset, &target, &spender, amount("amount")?);
            Ok(Vec::new())
        }
    };
    Ok(result)
}

fn check(
    pool: &Pool,
    step: &Step,
    outcome: &str,
    output: &[u128],
) -> std::result::Result<(), StepFailure> {
    let expected = step.expect.as_deref().unwrap_or("ok");
    if expected != outcome {
        return Err(StepFailure::Outcome {
            expected: expected.to_string(),
            actual: outcome.to_string(),
        });
    }

    if let Some(want) = &step.expect_out {
        let want = want.values();
        if want != output {
            return Err(StepFailure::Output {
                expected: want,
                actual: output.to_vec(),
            });
        }
    }

    if let Some([a, b]) = step.expect_reserves {
        let want = (u128::from(a), u128::from(b));
        if want != pool.reserves() {
            return Err(StepFailure::Reserves {
                expected: want,
                actual: pool.reserves(),
            });
        }
    }

    if let Some([a, b]) = step.expect_held {
        let want = (u128::from(a), u128::from(b));
        let held = (pool.true_balance(Side::A), pool.true_balance(Side::B));
        if want != held {
            return Err(StepFailure::Held {
                expected: want,
                actual: held,
            });
        }
    }

    pool.check_invariants()?;
    Ok(())
}

pub fn run(ctx: &Context, path: &Path) -> Result<()> {
    let script = Script::from_file(path)?;
    let reports = script.execute(&ctx.config)?;
    let failed = reports.iter().filter(|r| r.failure.is_some()).count();

    if ctx.json {
        println!("{}", serde_json::to_string_pretty(&reports)?);
    } else {
        println!("{} {}", "=== Scenario ===".bright_green().bold(), path.display());
        for report in &reports {
            let output = if report.output.is_empty() {
                String::new()
            } else {
                format!(" -> {}", report.output.join(", "))
            };
            let line = format!(
                "[{}] {:?}: {}{}",
                report.index, report.action, report.outcome, output
            );
            match &report.failure {
                None => println!("  {} {}", "✓".green(), line),
                Some(reason) => println!("  {} {} {}", "✗".red(), line, reason.red()),
            }
        }
        println!();
        if failed == 0 {
            println!("{}", format!("All {} steps passed", reports.len()).green().bold());
        }
    }

    if failed > 0 {
        bail!("{} of {} steps failed", failed, reports.len());
    }
    Ok(())
}
