//! Reserve and share bookkeeping

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::{Address, Direction, Side};

/// The pool's books: two reserves and the LP share registry
///
/// Fields are public so harnesses can seed states that ordinary
/// operations cannot reach.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Ledger {
    pub reserve_a: u128,
    pub reserve_b: u128,
    pub total_shares: u128,
    /// Entries are created on first deposit and kept at zero afterwards
    pub shares: BTreeMap<Address, u128>,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum InvariantViolation {
    #[error("one-sided pool: reserves ({reserve_a}, {reserve_b}), {total_shares} shares")]
    ReservePositivity {
        reserve_a: u128,
        reserve_b: u128,
        total_shares: u128,
    },

    #[error("share supply {total_shares} does not match sum of balances {sum}")]
    ShareConservation { total_shares: u128, sum: u128 },
}

impl Ledger {
    pub fn reserve(&self, side: Side) -> u128 {
        match side {
            Side::A => self.reserve_a,
            Side::B => self.reserve_b,
        }
    }

    pub(crate) fn reserve_mut(&mut self, side: Side) -> &mut u128 {
        match side {
            Side::A => &mut self.reserve_a,
            Side::B => &mut self.reserve_b,
        }
    }

    /// (reserve_in, reserve_out) for a swap direction
    pub fn reserves_for(&self, direction: Direction) -> (u128, u128) {
        (self.reserve(direction.input()), self.reserve(direction.output()))
    }

    pub fn share_balance(&self, provider: &Address) -> u128 {
        self.shares.get(provider).copied().unwrap_or(0)
    }

    /// Σ shareBalance[p], saturating
    pub fn sum_of_shares(&self) -> u128 {
        self.shares
            .values()
            .fold(0u128, |acc, balance| acc.saturating_add(*balance))
    }

    /// x · y, or `None` if it does not fit in u128
    pub fn product(&self) -> Option<u128> {
        self.reserve_a.checked_mul(self.reserve_b)
    }

    pub fn is_initialized(&self) -> bool {
        self.reserve_a > 0 && self.reserve_b > 0
    }

    /// Reserve positivity and share conservation
    pub fn check_invariants(&self) -> Result<(), InvariantViolation> {
        let one_sided = (self.reserve_a == 0) != (self.reserve_b == 0);
        let unbacked = self.total_shares > 0 && !self.is_initialized();
        if one_sided || unbacked {
            return Err(InvariantViolation::ReservePositivity {
                reserve_a: self.reserve_a,
                reserve_b: self.reserve_b,
                total_shares: self.total_shares,
            });
        }

        let sum = self.sum_of_shares();
        if sum != self.total_shares {
            return Err(InvariantViolation::ShareConservation {
                total_shares: self.total_shares,
                sum,
            });
        }

        Ok(())
    }
}
