//! Kani harnesses for the constant product math
//!
//! Run with: cargo kani -p proofs-kani
//! Run one: cargo kani -p proofs-kani --harness a1_k_strictly_increases
//!
//! Outside of `cargo kani` this crate compiles to nothing.

#![no_std]

#[cfg(kani)]
mod amm;

#[cfg(kani)]
mod shares;
