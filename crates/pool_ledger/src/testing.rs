//! Fixtures for tests and demos
//!
//! A pool over two labelled assets whose bank has already funded and
//! approved three traders.

use crate::{Address, InMemoryBank, PauseSwitch, Pool, SettlementMode};

/// Balance of each asset minted to every fixture account
pub const GENESIS: u128 = 1_000_000_000;

pub fn addr(label: &str) -> Address {
    match Address::from_label(label) {
        Ok(address) => address,
        Err(err) => panic!("bad fixture label {label:?}: {err}"),
    }
}

pub fn token_a() -> Address {
    addr("TKA")
}

pub fn token_b() -> Address {
    addr("TKB")
}

pub fn pool_account() -> Address {
    addr("pool")
}

pub fn admin() -> Address {
    addr("admin")
}

pub fn alice() -> Address {
    addr("alice")
}

pub fn bob() -> Address {
    addr("bob")
}

pub fn mallory() -> Address {
    addr("mallory")
}

/// Bank where alice, bob and mallory hold `GENESIS` of both assets and have
/// approved the pool for unlimited pulls
pub fn funded_bank() -> InMemoryBank {
    let mut bank = InMemoryBank::new();
    for owner in [alice(), bob(), mallory()] {
        for asset in [token_a(), token_b()] {
            if let Err(err) = bank.mint(&asset, &owner, GENESIS) {
                panic!("fixture mint failed: {err}");
            }
            bank.approve(&asset, &owner, &pool_account(), u128::MAX);
        }
    }
    bank
}

pub fn funded_pool() -> Pool {
    funded_pool_with_mode(SettlementMode::Audited)
}

pub fn funded_pool_with_mode(mode: SettlementMode) -> Pool {
    match Pool::new(
        token_a(),
        token_b(),
        pool_account(),
        admin(),
        funded_bank(),
        PauseSwitch::default(),
    ) {
        Ok(pool) => pool.with_mode(mode),
        Err(err) => panic!("fixture pool rejected: {err}"),
    }
}
