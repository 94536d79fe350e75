//! Swaps, quotes and prices

use anyhow::{Context as _, Result};
use colored::Colorize;
use serde_json::json;

use crate::config::parse_address;
use crate::{print_last_event, Context};
use pool_ledger::{Direction, Side, SCALE};

pub fn swap(
    ctx: &Context,
    direction: Direction,
    amount_in: u64,
    min_out: u64,
    from: &str,
) -> Result<()> {
    let trader = parse_address(from)?;
    let (pool, amount_out) = ctx
        .apply(|pool| {
            pool.swap_exact_in(direction, u128::from(amount_in), u128::from(min_out), &trader)
        })
        .context("Swap rejected")?;

    let (reserve_a, reserve_b) = pool.reserves();
    let event = serde_json::to_value(pool.events().last())?;
    ctx.emit(
        json!({
            "amount_out": amount_out.to_string(),
            "reserves": [reserve_a.to_string(), reserve_b.to_string()],
            "event": event,
        }),
        || {
            println!("{}", "=== Swap ===".bright_green().bold());
            println!("{} {}", "Trader:".bright_cyan(), trader);
            println!("{} {}", "Direction:".bright_cyan(), direction);
            println!("{} {} {}", "Paid:".bright_cyan(), amount_in, direction.input());
            println!("{} {} {}", "Received:".bright_cyan(), amount_out, direction.output());
            println!("{} {} A, {} B", "Reserves:".bright_cyan(), reserve_a, reserve_b);
            print_last_event(&pool);
        },
    )
}

pub fn quote(ctx: &Context, direction: Direction, amount_in: u64) -> Result<()> {
    let pool = ctx.load_pool()?;
    let quote = pool
        .quote(direction, u128::from(amount_in))
        .context("Cannot quote swap")?;

    ctx.emit(
        json!({
            "amount_in": quote.amount_in.to_string(),
            "raw_out": quote.raw_out.to_string(),
            "amount_out": quote.amount_out.to_string(),
            "k": quote.k.to_string(),
            "new_reserve_in": quote.new_reserve_in.to_string(),
            "new_reserve_out": quote.new_reserve_out.to_string(),
        }),
        || {
            println!("{}", "=== Quote ===".bright_green().bold());
            println!("{} {}", "Direction:".bright_cyan(), direction);
            println!("{} {}", "Amount in:".bright_cyan(), quote.amount_in);
            println!("{} {}", "Before fee:".bright_cyan(), quote.raw_out);
            println!("{} {}", "Amount out:".bright_cyan(), quote.amount_out.to_string().bold());
            if let Some(k_after) = quote.new_reserve_in.checked_mul(quote.new_reserve_out) {
                println!("{} {} -> {}", "k:".bright_cyan(), quote.k, k_after);
            }
        },
    )
}

pub fn price(ctx: &Context, side: Side) -> Result<()> {
    let pool = ctx.load_pool()?;
    let scaled = pool.price_of(side).context("Cannot price pool")?;

    ctx.emit(
        json!({
            "side": side,
            "price_scaled": scaled.to_string(),
            "scale": SCALE.to_string(),
        }),
        || {
            println!("{}", "=== Price ===".bright_green().bold());
            println!(
                "{} 1 {} = {} {}",
                "Spot:".bright_cyan(),
                side,
                format_scaled(scaled),
                side.other()
            );
            println!("{} {}", "Raw (1e18):".bright_cyan(), scaled);
        },
    )
}

/// Render a 1e18-scaled fixed point value with trailing zeros trimmed
fn format_scaled(value: u128) -> String {
    let whole = value / SCALE;
    let frac = value % SCALE;
    if frac == 0 {
        return whole.to_string();
    }
    let digits = format!("{frac:018}");
    format!("{whole}.{}", digits.trim_end_matches('0'))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_scaled() {
        assert_eq!(format_scaled(4 * SCALE), "4");
        assert_eq!(format_scaled(SCALE / 4), "0.25");
        assert_eq!(format_scaled(364 * SCALE / 110), "3.30909090909090909");
        assert_eq!(format_scaled(0), "0");
    }
}
