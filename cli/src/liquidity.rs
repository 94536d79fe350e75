//! Liquidity provider operations and pool inspection

use anyhow::{Context as _, Result};
use colored::Colorize;
use serde_json::json;

use crate::config::parse_address;
use crate::{describe_event, print_last_event, Context};
use pool_ledger::{AssetTransfer, Side};

pub fn deposit(ctx: &Context, amount_a: u64, amount_b: u64, from: &str) -> Result<()> {
    let provider = parse_address(from)?;
    let (pool, minted) = ctx
        .apply(|pool| pool.deposit(u128::from(amount_a), u128::from(amount_b), &provider))
        .context("Deposit rejected")?;

    let event = serde_json::to_value(pool.events().last())?;
    ctx.emit(
        json!({
            "shares_minted": minted.to_string(),
            "event": event,
        }),
        || {
            println!("{}", "=== Deposit ===".bright_green().bold());
            println!("{} {}", "Provider:".bright_cyan(), provider);
            println!("{} {} A, {} B", "Deposited:".bright_cyan(), amount_a, amount_b);
            println!("{} {}", "Shares minted:".bright_cyan(), minted);
            if minted == 0 {
                let note = "Deposit too small to mint a share; funds accrue to the pool";
                println!("{}", note.yellow());
            }
            print_last_event(&pool);
        },
    )
}

pub fn withdraw(ctx: &Context, shares: u64, from: &str) -> Result<()> {
    let provider = parse_address(from)?;
    let (pool, (amount_a, amount_b)) = ctx
        .apply(|pool| pool.withdraw(u128::from(shares), &provider))
        .context("Withdrawal rejected")?;

    let event = serde_json::to_value(pool.events().last())?;
    ctx.emit(
        json!({
            "amount_a": amount_a.to_string(),
            "amount_b": amount_b.to_string(),
            "event": event,
        }),
        || {
            println!("{}", "=== Withdraw ===".bright_green().bold());
            println!("{} {}", "Provider:".bright_cyan(), provider);
            println!("{} {}", "Shares burned:".bright_cyan(), shares);
            println!("{} {} A, {} B", "Received:".bright_cyan(), amount_a, amount_b);
            print_last_event(&pool);
        },
    )
}

pub fn show(ctx: &Context, account: Option<String>, recent: usize) -> Result<()> {
    let pool = ctx.load_pool()?;
    let account = account.as_deref().map(parse_address).transpose()?;

    let (reserve_a, reserve_b) = pool.reserves();
    let (true_a, true_b) = (pool.true_balance(Side::A), pool.true_balance(Side::B));
    let providers: Vec<_> = pool
        .ledger
        .shares
        .iter()
        .filter(|(owner, _)| account.map_or(true, |a| a == **owner))
        .map(|(owner, shares)| (*owner, *shares))
        .collect();
    let skip = pool.events().len().saturating_sub(recent);
    let events = &pool.events()[skip..];
    let events_json = serde_json::to_value(events)?;
    let shares_json: serde_json::Map<String, serde_json::Value> = providers
        .iter()
        .map(|(owner, shares)| (owner.to_string(), json!(shares.to_string())))
        .collect();

    ctx.emit(
        json!({
            "asset_a": pool.asset_a,
            "asset_b": pool.asset_b,
            "admin": pool.admin,
            "mode": pool.mode,
            "paused": pool.is_paused(),
            "reserves": [reserve_a.to_string(), reserve_b.to_string()],
            "true_balances": [true_a.to_string(), true_b.to_string()],
            "total_shares": pool.total_shares().to_string(),
            "shares": shares_json,
            "events": events_json,
        }),
        || {
            println!("{}", "=== Pool ===".bright_green().bold());
            println!("{} {} / {}", "Pair:".bright_cyan(), pool.asset_a, pool.asset_b);
            println!("{} {}", "Admin:".bright_cyan(), pool.admin);
            println!("{} {:?}", "Mode:".bright_cyan(), pool.mode);
            if pool.is_paused() {
                println!("{} {}", "Status:".bright_cyan(), "PAUSED".red().bold());
            } else {
                println!("{} {}", "Status:".bright_cyan(), "live".green());
            }
            println!("{} {} A, {} B", "Reserves:".bright_cyan(), reserve_a, reserve_b);
            if (true_a, true_b) != (reserve_a, reserve_b) {
                println!(
                    "{} {} A, {} B {}",
                    "Held:".bright_cyan(),
                    true_a,
                    true_b,
                    "(books out of sync with bank)".red()
                );
            }
            println!("{} {}", "Total shares:".bright_cyan(), pool.total_shares());

            if !providers.is_empty() {
                println!("\n{}", "Providers:".bright_yellow());
                for (owner, shares) in &providers {
                    let name = owner.to_string();
                    let a = pool.bank.balance_of(&pool.asset_a, owner);
                    let b = pool.bank.balance_of(&pool.asset_b, owner);
                    println!("  {name:<12} {shares:>16} shares   wallet {a} A, {b} B");
                }
            }

            if !events.is_empty() {
                println!("\n{}", "Recent events:".bright_yellow());
                for event in events {
                    println!("  {}", describe_event(event));
                }
            }
        },
    )
}
