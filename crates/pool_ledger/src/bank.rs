//! Asset transfer collaborator
//!
//! The pool never holds balances itself: every inbound and outbound movement
//! goes through an [`AssetTransfer`] implementation, which may refuse it.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::Address;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TransferError {
    #[error("{owner} holds {available} of {asset}, needs {required}")]
    InsufficientBalance {
        asset: Address,
        owner: Address,
        available: u128,
        required: u128,
    },

    #[error("{spender} may move {available} of {asset} for {owner}, needs {required}")]
    InsufficientAllowance {
        asset: Address,
        owner: Address,
        spender: Address,
        available: u128,
        required: u128,
    },

    #[error("balance of {owner} in {asset} would overflow")]
    Overflow { asset: Address, owner: Address },
}

/// Token-ledger style transfer interface
///
/// Implementations must either move the full amount or fail without any
/// change to their own state.
pub trait AssetTransfer {
    /// Move `amount` from `owner` to `destination` on behalf of `spender`
    fn transfer_from(
        &mut self,
        asset: &Address,
        spender: &Address,
        owner: &Address,
        destination: &Address,
        amount: u128,
    ) -> Result<(), TransferError>;

    /// Move `amount` owned by `source` to `destination`
    fn transfer(
        &mut self,
        asset: &Address,
        source: &Address,
        destination: &Address,
        amount: u128,
    ) -> Result<(), TransferError>;

    /// Current balance of `owner`
    fn balance_of(&self, asset: &Address, owner: &Address) -> u128;
}

/// In-memory multi-asset token ledger with allowances
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct InMemoryBank {
    /// asset -> owner -> balance
    balances: BTreeMap<Address, BTreeMap<Address, u128>>,
    /// asset -> owner -> spender -> allowance
    allowances: BTreeMap<Address, BTreeMap<Address, BTreeMap<Address, u128>>>,
}

impl InMemoryBank {
    pub fn new() -> Self {
        Self::default()
    }

    /// Credit `amount` of `asset` to `owner` out of thin air
    pub fn mint(
        &mut self,
        asset: &Address,
        owner: &Address,
        amount: u128,
    ) -> Result<(), TransferError> {
        let balance = self.balance_of(asset, owner);
        let new_balance = balance.checked_add(amount).ok_or(TransferError::Overflow {
            asset: *asset,
            owner: *owner,
        })?;
        self.set_balance(asset, owner, new_balance);
        Ok(())
    }

    /// Set the allowance `spender` has over `owner`'s `asset`
    pub fn approve(&mut self, asset: &Address, owner: &Address, spender: &Address, amount: u128) {
        self.allowances
            .entry(*asset)
            .or_default()
            .entry(*owner)
            .or_default()
            .insert(*spender, amount);
    }

    pub fn allowance(&self, asset: &Address, owner: &Address, spender: &Address) -> u128 {
        self.allowances
            .get(asset)
            .and_then(|owners| owners.get(owner))
            .and_then(|spenders| spenders.get(spender))
            .copied()
            .unwrap_or(0)
    }

    /// Sum of every balance held in `asset`
    pub fn supply_of(&self, asset: &Address) -> u128 {
        self.balances
            .get(asset)
            .map(|owners| owners.values().fold(0u128, |acc, b| acc.saturating_add(*b)))
            .unwrap_or(0)
    }

    fn set_balance(&mut self, asset: &Address, owner: &Address, amount: u128) {
        self.balances.entry(*asset).or_default().insert(*owner, amount);
    }

    /// Validate then apply a move; nothing is written unless both legs fit
    fn move_balance(
        &mut self,
        asset: &Address,
        source: &Address,
        destination: &Address,
        amount: u128,
    ) -> Result<(), TransferError> {
        let available = self.balance_of(asset, source);
        if available < amount {
            return Err(TransferError::InsufficientBalance {
                asset: *asset,
                owner: *source,
                available,
                required: amount,
            });
        }
        if source == destination {
            return Ok(());
        }
        let credited = self
            .balance_of(asset, destination)
            .checked_add(amount)
            .ok_or(TransferError::Overflow {
                asset: *asset,
                owner: *destination,
            })?;

        self.set_balance(asset, source, available - amount);
        self.set_balance(asset, destination, credited);
        Ok(())
    }
}

impl AssetTransfer for InMemoryBank {
    fn transfer_from(
        &mut self,
        asset: &Address,
        spender: &Address,
        owner: &Address,
        destination: &Address,
        amount: u128,
    ) -> Result<(), TransferError> {
        let allowed = self.allowance(asset, owner, spender);
        if allowed < amount {
            return Err(TransferError::InsufficientAllowance {
                asset: *asset,
                owner: *owner,
                spender: *spender,
                available: allowed,
                required: amount,
            });
        }
        self.move_balance(asset, owner, destination, amount)?;
        self.approve(asset, owner, spender, allowed - amount);
        Ok(())
    }

    fn transfer(
        &mut self,
        asset: &Address,
        source: &Address,
        destination: &Address,
        amount: u128,
    ) -> Result<(), TransferError> {
        self.move_balance(asset, source, destination, amount)
    }

    fn balance_of(&self, asset: &Address, owner: &Address) -> u128 {
        self.balances
            .get(asset)
            .and_then(|owners| owners.get(owner))
            .copied()
            .unwrap_or(0)
    }
}
