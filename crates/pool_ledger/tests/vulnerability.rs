//! Reproduction of the audited defects, and their remediated counterparts
//!
//! - Unguarded privileged withdrawal drains the pool without touching reserves
//! - Swaps then price against stale reserves
//! - Audited swaps pull the input before the slippage check

use std::cell::RefCell;
use std::rc::Rc;

use pool_ledger::testing::*;
use pool_ledger::*;

fn drained_pool(mode: SettlementMode) -> Pool {
    let mut pool = funded_pool_with_mode(mode);
    pool.deposit(1_000, 4_000, &alice()).unwrap();
    pool
}

// ============================================================================
// Privileged withdrawal (audited)
// ============================================================================

#[test]
fn test_anyone_can_drain_and_reserves_go_stale() {
    let mut pool = drained_pool(SettlementMode::Audited);
    assert!(!pool.is_admin(&mallory()));

    pool.privileged_withdraw(Side::B, 3_000, &mallory()).unwrap();

    assert_eq!(pool.reserves(), (1_000, 4_000), "books are not decremented");
    assert_eq!(pool.true_balance(Side::B), 1_000);
    assert_eq!(pool.bank.balance_of(&token_b(), &mallory()), GENESIS + 3_000);
    assert_eq!(
        pool.events().last(),
        Some(&PoolEvent::PrivilegedWithdrawal {
            caller: mallory(),
            asset: token_b(),
            amount: 3_000,
        })
    );
    // The books still look healthy
    assert_eq!(pool.check_invariants(), Ok(()));
}

#[test]
fn test_swap_after_drain_prices_against_stale_reserves() {
    let mut pool = drained_pool(SettlementMode::Audited);
    pool.privileged_withdraw(Side::B, 3_000, &mallory()).unwrap();

    // Stale: k = 1000 * 4000, 4e6 / 1100 = 3636, raw = 364, out = 362
    let out = pool.swap_exact_in(Direction::AToB, 100, 0, &bob()).unwrap();
    assert_eq!(out, 362);

    // Against the true balances (1000, 1000) the same trade pays 90
    let honest = amm_model::quote_exact_in(1_000, 1_000, 100).unwrap();
    assert_eq!(honest.amount_out, 90);

    assert_eq!(pool.reserves(), (1_100, 3_638));
    assert_eq!(pool.true_balance(Side::B), 638);
}

#[test]
fn test_swap_beyond_true_balance_fails_and_rolls_back_input() {
    let mut pool = drained_pool(SettlementMode::Audited);
    pool.privileged_withdraw(Side::B, 3_000, &mallory()).unwrap();
    let before = pool.snapshot();

    // Quoted output (3626) exceeds what the pool really holds (1000)
    let result = pool.swap_exact_in(Direction::AToB, 10_000, 0, &bob());

    assert!(matches!(
        result,
        Err(LedgerError::TransferFailed(TransferError::InsufficientBalance { .. }))
    ));
    assert_eq!(pool.snapshot(), before);
    assert_eq!(pool.bank.balance_of(&token_a(), &bob()), GENESIS);
}

#[test]
fn test_withdraw_after_drain_fails_atomically() {
    let mut pool = drained_pool(SettlementMode::Audited);
    pool.privileged_withdraw(Side::B, 3_000, &mallory()).unwrap();
    let before = pool.snapshot();

    // Books promise 4000 B, bank holds 1000
    let result = pool.withdraw(2_000, &alice());

    assert!(matches!(result, Err(LedgerError::TransferFailed(_))));
    assert_eq!(pool.snapshot(), before);
    assert_eq!(pool.share_balance(&alice()), 2_000);
}

#[test]
fn test_drain_can_take_any_amount_the_pool_holds() {
    let mut pool = drained_pool(SettlementMode::Audited);

    pool.privileged_withdraw(Side::A, 1_000, &mallory()).unwrap();
    pool.privileged_withdraw(Side::B, 4_000, &mallory()).unwrap();

    assert_eq!(pool.true_balance(Side::A), 0);
    assert_eq!(pool.true_balance(Side::B), 0);
    assert_eq!(pool.reserves(), (1_000, 4_000));

    let result = pool.privileged_withdraw(Side::A, 1, &mallory());
    assert!(matches!(result, Err(LedgerError::TransferFailed(_))));
}

// ============================================================================
// Privileged withdrawal (remediated)
// ============================================================================

#[test]
fn test_remediated_drain_is_admin_only_and_booked() {
    let mut pool = drained_pool(SettlementMode::Remediated);

    assert_eq!(
        pool.privileged_withdraw(Side::B, 3_000, &mallory()),
        Err(LedgerError::Unauthorized)
    );

    pool.privileged_withdraw(Side::B, 3_000, &admin()).unwrap();

    assert_eq!(pool.reserves(), (1_000, 1_000));
    assert_eq!(pool.true_balance(Side::B), 1_000);

    let out = pool.swap_exact_in(Direction::AToB, 100, 0, &bob()).unwrap();
    assert_eq!(out, 90);
}

#[test]
fn test_remediated_drain_cannot_empty_a_side() {
    let mut pool = drained_pool(SettlementMode::Remediated);

    assert_eq!(
        pool.privileged_withdraw(Side::A, 1_000, &admin()),
        Err(LedgerError::InsufficientLiquidity)
    );
    assert_eq!(pool.reserves(), (1_000, 4_000));
}

// ============================================================================
// Call ordering
// ============================================================================

/// Bank that logs every call to a log shared across clones, so calls made
/// inside a rolled-back transaction stay visible
#[derive(Clone)]
struct RecordingBank {
    inner: InMemoryBank,
    calls: Rc<RefCell<Vec<&'static str>>>,
}

impl AssetTransfer for RecordingBank {
    fn transfer_from(
        &mut self,
        asset: &Address,
        spender: &Address,
        owner: &Address,
        destination: &Address,
        amount: u128,
    ) -> std::result::Result<(), TransferError> {
        self.calls.borrow_mut().push("transfer_from");
        self.inner.transfer_from(asset, spender, owner, destination, amount)
    }

    fn transfer(
        &mut self,
        asset: &Address,
        source: &Address,
        destination: &Address,
        amount: u128,
    ) -> std::result::Result<(), TransferError> {
        self.calls.borrow_mut().push("transfer");
        self.inner.transfer(asset, source, destination, amount)
    }

    fn balance_of(&self, asset: &Address, owner: &Address) -> u128 {
        self.inner.balance_of(asset, owner)
    }
}

fn recording_pool(mode: SettlementMode) -> (Pool<RecordingBank>, Rc<RefCell<Vec<&'static str>>>) {
    let calls = Rc::new(RefCell::new(Vec::new()));
    let bank = RecordingBank {
        inner: funded_bank(),
        calls: Rc::clone(&calls),
    };
    let mut pool = Pool::new(
        token_a(),
        token_b(),
        pool_account(),
        admin(),
        bank,
        PauseSwitch::default(),
    )
    .unwrap()
    .with_mode(mode);
    pool.deposit(100, 400, &alice()).unwrap();
    calls.borrow_mut().clear();
    (pool, calls)
}

#[test]
fn test_audited_swap_pulls_input_before_slippage_check() {
    let (mut pool, calls) = recording_pool(SettlementMode::Audited);

    let result = pool.swap_exact_in(Direction::AToB, 10, 1_000, &bob());

    assert!(matches!(result, Err(LedgerError::SlippageExceeded { .. })));
    assert_eq!(*calls.borrow(), vec!["transfer_from"]);
    // ...but the pull was undone
    assert_eq!(pool.true_balance(Side::A), 100);
    assert_eq!(pool.bank.inner.balance_of(&token_a(), &bob()), GENESIS);
}

#[test]
fn test_remediated_swap_checks_slippage_first() {
    let (mut pool, calls) = recording_pool(SettlementMode::Remediated);

    let result = pool.swap_exact_in(Direction::AToB, 10, 1_000, &bob());

    assert!(matches!(result, Err(LedgerError::SlippageExceeded { .. })));
    assert!(calls.borrow().is_empty());

    pool.swap_exact_in(Direction::AToB, 10, 36, &bob()).unwrap();
    assert_eq!(*calls.borrow(), vec!["transfer_from", "transfer"]);
}

#[test]
fn test_withdraw_pays_each_asset_by_direct_transfer() {
    let (mut pool, calls) = recording_pool(SettlementMode::Audited);

    pool.withdraw(100, &alice()).unwrap();

    assert_eq!(*calls.borrow(), vec!["transfer", "transfer"]);
    assert_eq!(pool.reserves(), (50, 200));
    assert_eq!(pool.bank.inner.balance_of(&token_a(), &alice()), GENESIS - 50);
    assert_eq!(pool.bank.inner.balance_of(&token_b(), &alice()), GENESIS - 200);
}
