//! AMM Model - Pure constant product math (x·y=k)
//!
//! Every formula the pool ledger settles with lives here exactly once:
//! share minting, proportional redemption, the exact-in swap quote and the
//! fixed-point spot price. All arithmetic is unsigned, checked, and uses
//! floor division only. The pool never rounds in the trader's favour.
//!
//! The ledger crate and the Kani harnesses import these functions directly.

#![no_std]
#![forbid(unsafe_code)]

pub mod math;

pub use math::{
    initial_shares, isqrt, proportional_shares, quote_exact_in, redeem, spot_price, Quote,
};

/// Fixed-point scale for spot prices (1e18)
pub const SCALE: u128 = 1_000_000_000_000_000_000;

/// Fraction of the raw output paid to the trader (997 / 1000 = 30 bps fee)
pub const FEE_NUMERATOR: u128 = 997;

/// Fee denominator
pub const FEE_DENOMINATOR: u128 = 1_000;

/// Error types for AMM math
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AmmError {
    /// Zero or otherwise disallowed quantity
    InvalidAmount,
    /// A reserve required by the formula is zero
    InsufficientLiquidity,
    /// Arithmetic overflow
    Overflow,
    /// Division by a zero share supply
    DivisionByZero,
}
