//! Constant product AMM math (x·y=k)

use crate::{AmmError, FEE_DENOMINATOR, FEE_NUMERATOR, SCALE};

/// Result of an exact-in swap quote
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Quote {
    /// Input amount the quote was computed for
    pub amount_in: u128,

    /// Output before the fee is withheld
    pub raw_out: u128,

    /// Output paid to the trader after the fee
    pub amount_out: u128,

    /// Invariant computed from the reserves before the trade
    pub k: u128,

    /// Input-side reserve after the trade
    pub new_reserve_in: u128,

    /// Output-side reserve after the trade
    pub new_reserve_out: u128,
}

/// Floor square root (Babylonian iteration)
pub fn isqrt(y: u128) -> u128 {
    if y == 0 {
        return 0;
    }
    let mut z = y;
    let mut x = y / 2 + 1;
    while x < z {
        z = x;
        x = (y / x + x) / 2;
    }
    z
}

/// Shares minted for the first deposit into an empty pool
///
/// `floor(sqrt(amount_a * amount_b))` sets the share unit scale.
pub fn initial_shares(amount_a: u128, amount_b: u128) -> Result<u128, AmmError> {
    if amount_a == 0 || amount_b == 0 {
        return Err(AmmError::InvalidAmount);
    }
    let product = amount_a.checked_mul(amount_b).ok_or(AmmError::Overflow)?;
    Ok(isqrt(product))
}

/// Shares minted for a deposit into a pool that already has a supply
///
/// The weaker side of the contribution decides:
/// `min(a * T / Ra, b * T / Rb)`. The full amounts are still taken by the
/// caller, so an off-ratio deposit donates the excess to the pool.
pub fn proportional_shares(
    amount_a: u128,
    amount_b: u128,
    reserve_a: u128,
    reserve_b: u128,
    total_shares: u128,
) -> Result<u128, AmmError> {
    if amount_a == 0 || amount_b == 0 {
        return Err(AmmError::InvalidAmount);
    }
    if reserve_a == 0 || reserve_b == 0 {
        return Err(AmmError::DivisionByZero);
    }

    let by_a = amount_a
        .checked_mul(total_shares)
        .ok_or(AmmError::Overflow)?
        / reserve_a;
    let by_b = amount_b
        .checked_mul(total_shares)
        .ok_or(AmmError::Overflow)?
        / reserve_b;

    Ok(by_a.min(by_b))
}

/// Amounts of both assets redeemed by burning `shares`
///
/// A zero share supply is not guarded away: it surfaces as `DivisionByZero`.
pub fn redeem(
    shares: u128,
    reserve_a: u128,
    reserve_b: u128,
    total_shares: u128,
) -> Result<(u128, u128), AmmError> {
    if total_shares == 0 {
        return Err(AmmError::DivisionByZero);
    }

    let amount_a = shares.checked_mul(reserve_a).ok_or(AmmError::Overflow)? / total_shares;
    let amount_b = shares.checked_mul(reserve_b).ok_or(AmmError::Overflow)? / total_shares;

    Ok((amount_a, amount_b))
}

/// Quote an exact-in swap
///
/// - k = Rin · Rout (reserves before the input lands)
/// - raw_out = Rout - floor(k / (Rin + Δin))
/// - amount_out = floor(raw_out · 997 / 1000)
///
/// The fee stays in the output reserve, so k grows with every trade.
pub fn quote_exact_in(
    reserve_in: u128,
    reserve_out: u128,
    amount_in: u128,
) -> Result<Quote, AmmError> {
    if amount_in == 0 {
        return Err(AmmError::InvalidAmount);
    }
    if reserve_in == 0 || reserve_out == 0 {
        return Err(AmmError::InsufficientLiquidity);
    }

    let k = reserve_in.checked_mul(reserve_out).ok_or(AmmError::Overflow)?;
    let new_reserve_in = reserve_in.checked_add(amount_in).ok_or(AmmError::Overflow)?;

    // k / new_reserve_in <= reserve_out because new_reserve_in >= reserve_in
    let raw_out = reserve_out - k / new_reserve_in;
    let amount_out = raw_out
        .checked_mul(FEE_NUMERATOR)
        .ok_or(AmmError::Overflow)?
        / FEE_DENOMINATOR;

    Ok(Quote {
        amount_in,
        raw_out,
        amount_out,
        k,
        new_reserve_in,
        new_reserve_out: reserve_out - amount_out,
    })
}

/// Spot price of one unit of the denominator asset, scaled by `SCALE`
pub fn spot_price(numerator_reserve: u128, denominator_reserve: u128) -> Result<u128, AmmError> {
    if numerator_reserve == 0 || denominator_reserve == 0 {
        return Err(AmmError::InsufficientLiquidity);
    }
    let scaled = numerator_reserve.checked_mul(SCALE).ok_or(AmmError::Overflow)?;
    Ok(scaled / denominator_reserve)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_isqrt_exact_and_floor() {
        assert_eq!(isqrt(0), 0);
        assert_eq!(isqrt(1), 1);
        assert_eq!(isqrt(3), 1);
        assert_eq!(isqrt(4), 2);
        assert_eq!(isqrt(40_000), 200);
        assert_eq!(isqrt(40_001), 200);
        assert_eq!(isqrt(u128::MAX), u64::MAX as u128);
    }

    #[test]
    fn test_first_deposit_shares() {
        assert_eq!(initial_shares(100, 400), Ok(200));
        assert_eq!(initial_shares(2, 3), Ok(2));
        assert_eq!(initial_shares(0, 400), Err(AmmError::InvalidAmount));
        assert_eq!(initial_shares(u128::MAX, 2), Err(AmmError::Overflow));
    }

    #[test]
    fn test_matching_ratio_deposit() {
        // 50/100 and 200/400 of a 200-share pool
        assert_eq!(proportional_shares(50, 200, 100, 400, 200), Ok(100));
    }

    #[test]
    fn test_off_ratio_deposit_takes_weaker_side() {
        // A-side justifies 200 shares, B-side only 5
        assert_eq!(proportional_shares(100, 10, 100, 400, 200), Ok(5));
    }

    #[test]
    fn test_redeem_floors() {
        assert_eq!(redeem(100, 150, 600, 300), Ok((50, 200)));
        assert_eq!(redeem(1, 10, 10, 3), Ok((3, 3)));
        assert_eq!(redeem(1, 10, 10, 0), Err(AmmError::DivisionByZero));
    }

    #[test]
    fn test_swap_quote_reference_values() {
        let q = quote_exact_in(100, 400, 10).unwrap();
        assert_eq!(q.k, 40_000);
        assert_eq!(q.raw_out, 37);
        assert_eq!(q.amount_out, 36);
        assert_eq!(q.new_reserve_in, 110);
        assert_eq!(q.new_reserve_out, 364);
    }

    #[test]
    fn test_invariant_increases_with_fees() {
        let q = quote_exact_in(1_000_000, 3_000_000, 25_000).unwrap();
        assert!(q.new_reserve_in * q.new_reserve_out > q.k);
    }

    #[test]
    fn test_quote_rejects_empty_pool_and_zero_input() {
        assert_eq!(quote_exact_in(0, 400, 10), Err(AmmError::InsufficientLiquidity));
        assert_eq!(quote_exact_in(100, 400, 0), Err(AmmError::InvalidAmount));
    }

    #[test]
    fn test_huge_input_never_empties_output_reserve() {
        let q = quote_exact_in(1, 1_000, 1_000_000_000).unwrap();
        assert_eq!(q.raw_out, 1_000);
        assert_eq!(q.amount_out, 997);
        assert_eq!(q.new_reserve_out, 3);
    }

    #[test]
    fn test_spot_price() {
        assert_eq!(spot_price(400, 100), Ok(4 * SCALE));
        assert_eq!(spot_price(100, 400), Ok(SCALE / 4));
        assert_eq!(spot_price(0, 400), Err(AmmError::InsufficientLiquidity));
        assert_eq!(spot_price(u128::MAX, 1), Err(AmmError::Overflow));
    }
}
