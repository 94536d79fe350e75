//! Pool creation, administration and bank maintenance

use anyhow::{bail, Context as _, Result};
use colored::Colorize;
use log::info;
use serde_json::json;

use crate::config::parse_address;
use crate::{print_last_event, store, Context};
use pool_ledger::{AssetTransfer, SettlementMode, Side};

pub fn init(ctx: &Context, force: bool) -> Result<()> {
    if ctx.state_path.exists() && !force {
        bail!(
            "Pool state already exists at {}\n\
             Pass --force to replace it",
            ctx.state_path.display()
        );
    }

    let pool = ctx.config.build_pool()?;
    store::save(&ctx.state_path, &pool)?;
    info!("initialised pool {} at {}", pool.address, ctx.state_path.display());

    ctx.emit(
        json!({
            "state": ctx.state_path.display().to_string(),
            "asset_a": pool.asset_a,
            "asset_b": pool.asset_b,
            "admin": pool.admin,
            "mode": pool.mode,
            "accounts": ctx.config.accounts.iter().map(|a| a.name.clone()).collect::<Vec<_>>(),
        }),
        || {
            println!("{}", "=== Pool Initialised ===".bright_green().bold());
            println!("{} {}", "State:".bright_cyan(), ctx.state_path.display());
            println!("{} {} / {}", "Pair:".bright_cyan(), pool.asset_a, pool.asset_b);
            println!("{} {}", "Admin:".bright_cyan(), pool.admin);
            println!("{} {:?}", "Mode:".bright_cyan(), pool.mode);
            if pool.mode == SettlementMode::Audited {
                println!(
                    "{}",
                    "Audited mode: privileged withdrawals are unguarded and do not update reserves"
                        .yellow()
                );
            }
            for account in &ctx.config.accounts {
                println!(
                    "  {:<12} {} A, {} B",
                    account.name, account.balance_a, account.balance_b
                );
            }
        },
    )
}

pub fn transfer_admin(ctx: &Context, new_admin: &str, from: &str) -> Result<()> {
    let caller = parse_address(from)?;
    let new_admin = parse_address(new_admin)?;
    let (pool, ()) = ctx
        .apply(|pool| pool.transfer_admin(&caller, &new_admin))
        .context("Admin transfer rejected")?;

    let event = serde_json::to_value(pool.events().last())?;
    ctx.emit(json!({ "admin": pool.admin, "event": event }), || {
        println!("{} {}", "New admin:".bright_cyan(), pool.admin);
        print_last_event(&pool);
    })
}

pub fn pause(ctx: &Context, from: &str) -> Result<()> {
    let caller = parse_address(from)?;
    let (pool, ()) = ctx.apply(|pool| pool.pause(&caller)).context("Pause rejected")?;

    let event = serde_json::to_value(pool.events().last())?;
    ctx.emit(json!({ "paused": true, "event": event }), || {
        println!("{}", "Pool paused".red().bold());
        print_last_event(&pool);
    })
}

pub fn resume(ctx: &Context, from: &str) -> Result<()> {
    let caller = parse_address(from)?;
    let (pool, ()) = ctx.apply(|pool| pool.resume(&caller)).context("Resume rejected")?;

    let event = serde_json::to_value(pool.events().last())?;
    ctx.emit(json!({ "paused": false, "event": event }), || {
        println!("{}", "Pool resumed".green().bold());
        print_last_event(&pool);
    })
}

pub fn drain(ctx: &Context, side: Side, amount: u64, from: &str) -> Result<()> {
    let caller = parse_address(from)?;
    let (pool, ()) = ctx
        .apply(|pool| pool.privileged_withdraw(side, u128::from(amount), &caller))
        .context("Privileged withdrawal rejected")?;

    let booked = pool.ledger.reserve(side);
    let held = pool.true_balance(side);
    let event = serde_json::to_value(pool.events().last())?;
    ctx.emit(
        json!({
            "side": side,
            "amount": amount.to_string(),
            "reserve": booked.to_string(),
            "true_balance": held.to_string(),
            "event": event,
        }),
        || {
            println!("{}", "=== Privileged Withdrawal ===".bright_red().bold());
            println!("{} {}", "Caller:".bright_cyan(), caller);
            println!("{} {} {}", "Taken:".bright_cyan(), amount, side);
            println!("{} {}", "Recorded reserve:".bright_cyan(), booked);
            println!("{} {}", "Actually held:".bright_cyan(), held);
            if booked != held {
                println!("{}", "Reserves are stale; swaps now misprice".red());
            }
            print_last_event(&pool);
        },
    )
}

pub fn mint(ctx: &Context, side: Side, account: &str, amount: u64) -> Result<()> {
    let owner = parse_address(account)?;
    let (pool, ()) = ctx
        .apply(|pool| {
            let asset = pool.asset(side);
            Ok(pool.bank.mint(&asset, &owner, u128::from(amount))?)
        })
        .context("Mint failed")?;

    let balance = pool.bank.balance_of(&pool.asset(side), &owner);
    ctx.emit(
        json!({ "account": owner, "side": side, "balance": balance.to_string() }),
        || {
            println!("{} {} {} to {}", "Minted:".bright_cyan(), amount, side, owner);
            println!("{} {}", "Balance:".bright_cyan(), balance);
        },
    )
}

pub fn approve(ctx: &Context, side: Side, owner: &str, amount: u64) -> Result<()> {
    let owner = parse_address(owner)?;
    let (pool, ()) = ctx.apply(|pool| {
        let (asset, spender) = (pool.asset(side), pool.address);
        pool.bank.approve(&asset, &owner, &spender, u128::from(amount));
        Ok(())
    })?;

    ctx.emit(
        json!({ "owner": owner, "side": side, "allowance": amount.to_string() }),
        || {
            println!(
                "{} {} may pull {} {} from {}",
                "Approved:".bright_cyan(),
                pool.address,
                amount,
                side,
                owner
            );
        },
    )
}
