//! Observable pool events
//!
//! Each successful mutating operation appends exactly one event to the
//! pool's log. Failed operations append nothing.

use serde::{Deserialize, Serialize};

use crate::{Address, Direction};

/// Amounts are written as decimal strings. Internally tagged enums are
/// decoded through serde's buffered content, which cannot carry a `u128`
/// above `u64::MAX`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum PoolEvent {
    LiquidityAdded {
        provider: Address,
        #[serde(with = "amount_str")]
        amount_a: u128,
        #[serde(with = "amount_str")]
        amount_b: u128,
        #[serde(with = "amount_str")]
        shares_minted: u128,
    },
    LiquidityRemoved {
        provider: Address,
        #[serde(with = "amount_str")]
        shares_burned: u128,
        #[serde(with = "amount_str")]
        amount_a: u128,
        #[serde(with = "amount_str")]
        amount_b: u128,
    },
    Swap {
        trader: Address,
        direction: Direction,
        #[serde(with = "amount_str")]
        amount_in: u128,
        #[serde(with = "amount_str")]
        amount_out: u128,
    },
    AdminTransferred {
        previous_admin: Address,
        new_admin: Address,
    },
    Paused {
        by: Address,
    },
    Resumed {
        by: Address,
    },
    PrivilegedWithdrawal {
        caller: Address,
        asset: Address,
        #[serde(with = "amount_str")]
        amount: u128,
    },
}

mod amount_str {
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S>(amount: &u128, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.collect_str(amount)
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<u128, D::Error>
    where
        D: Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(serde::de::Error::custom)
    }
}
