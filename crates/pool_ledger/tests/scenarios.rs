//! Reference scenarios for liquidity, swaps and prices
//! Run with: cargo test -p pool_ledger --test scenarios

use pool_ledger::testing::*;
use pool_ledger::*;

#[test]
fn test_first_deposit_sets_share_scale() {
    let mut pool = funded_pool();

    let minted = pool.deposit(100, 400, &alice()).unwrap();

    assert_eq!(minted, 200);
    assert_eq!(pool.reserves(), (100, 400));
    assert_eq!(pool.total_shares(), 200);
    assert_eq!(
        pool.events(),
        &[PoolEvent::LiquidityAdded {
            provider: alice(),
            amount_a: 100,
            amount_b: 400,
            shares_minted: 200,
        }]
    );
}

#[test]
fn test_second_deposit_at_matching_ratio() {
    let mut pool = funded_pool();
    pool.deposit(100, 400, &alice()).unwrap();

    let minted = pool.deposit(50, 200, &bob()).unwrap();

    assert_eq!(minted, 100);
    assert_eq!(pool.reserves(), (150, 600));
    assert_eq!(pool.total_shares(), 300);
    assert_eq!(pool.share_balance(&bob()), 100);
    assert_eq!(pool.check_invariants(), Ok(()));
}

#[test]
fn test_swap_a_to_b_reference() {
    let mut pool = funded_pool();
    pool.deposit(100, 400, &alice()).unwrap();

    let quote = pool.quote(Direction::AToB, 10).unwrap();
    assert_eq!(quote.k, 40_000);
    assert_eq!(quote.raw_out, 37);
    assert_eq!(quote.amount_out, 36);

    let out = pool.swap_exact_in(Direction::AToB, 10, 36, &bob()).unwrap();

    assert_eq!(out, 36);
    assert_eq!(pool.reserves(), (110, 364));
    assert_eq!(pool.true_balance(Side::A), 110);
    assert_eq!(pool.true_balance(Side::B), 364);
    assert_eq!(
        pool.events().last(),
        Some(&PoolEvent::Swap {
            trader: bob(),
            direction: Direction::AToB,
            amount_in: 10,
            amount_out: 36,
        })
    );
}

#[test]
fn test_swap_b_to_a() {
    let mut pool = funded_pool();
    pool.deposit(100, 400, &alice()).unwrap();

    // k = 40_000, 40_000 / 440 = 90, raw = 10, out = floor(9.97) = 9
    let out = pool.swap_exact_in(Direction::BToA, 40, 0, &bob()).unwrap();

    assert_eq!(out, 9);
    assert_eq!(pool.reserves(), (91, 440));
}

#[test]
fn test_slippage_guard_leaves_reserves_unchanged() {
    let mut pool = funded_pool();
    pool.deposit(100, 400, &alice()).unwrap();
    let before = pool.snapshot();

    let result = pool.swap_exact_in(Direction::AToB, 10, 37, &bob());

    assert_eq!(
        result,
        Err(LedgerError::SlippageExceeded {
            amount_out: 36,
            min_amount_out: 37,
        })
    );
    assert_eq!(pool.snapshot(), before);
    assert_eq!(pool.bank.balance_of(&token_a(), &bob()), GENESIS);
}

#[test]
fn test_k_grows_with_every_swap() {
    let mut pool = funded_pool();
    pool.deposit(1_000_000, 3_000_000, &alice()).unwrap();

    let mut k = pool.ledger.product().unwrap();
    for (i, amount) in [10u128, 5_000, 77_777, 1, 250_000].into_iter().enumerate() {
        let direction = if i % 2 == 0 { Direction::AToB } else { Direction::BToA };
        pool.swap_exact_in(direction, amount, 0, &bob()).unwrap();

        let next = pool.ledger.product().unwrap();
        assert!(next > k, "k must grow: {k} -> {next}");
        k = next;
    }
}

#[test]
fn test_round_trip_never_returns_more() {
    let mut pool = funded_pool();
    pool.deposit(100, 400, &alice()).unwrap();

    let minted = pool.deposit(50, 201, &bob()).unwrap();
    assert_eq!(minted, 100);

    let (a, b) = pool.withdraw(minted, &bob()).unwrap();

    assert_eq!((a, b), (50, 200));
    assert_eq!(pool.check_invariants(), Ok(()));
}

#[test]
fn test_round_trip_exact_at_matching_ratio() {
    let mut pool = funded_pool();
    pool.deposit(100, 400, &alice()).unwrap();

    let minted = pool.deposit(50, 200, &bob()).unwrap();
    let (a, b) = pool.withdraw(minted, &bob()).unwrap();

    assert_eq!((a, b), (50, 200));
}

#[test]
fn test_off_ratio_deposit_loses_excess_to_pool() {
    let mut pool = funded_pool();
    pool.deposit(100, 400, &alice()).unwrap();

    // A-side justifies 200 shares, B-side only 5; the full 100 A is still taken
    let minted = pool.deposit(100, 10, &bob()).unwrap();
    assert_eq!(minted, 5);
    assert_eq!(pool.reserves(), (200, 410));
    assert_eq!(pool.bank.balance_of(&token_a(), &bob()), GENESIS - 100);

    let (a, b) = pool.withdraw(5, &bob()).unwrap();
    assert_eq!((a, b), (4, 10));

    // The excess accrues to the remaining provider
    let (a, b) = pool.withdraw(200, &alice()).unwrap();
    assert_eq!((a, b), (196, 400));
    assert_eq!(pool.reserves(), (0, 0));
}

#[test]
fn test_price_tracks_reserves() {
    let mut pool = funded_pool();
    pool.deposit(100, 400, &alice()).unwrap();

    assert_eq!(pool.price_of(Side::A).unwrap(), 4 * SCALE);
    assert_eq!(pool.price_of(Side::B).unwrap(), SCALE / 4);

    pool.swap_exact_in(Direction::AToB, 10, 0, &bob()).unwrap();

    // 364 * 1e18 / 110
    assert_eq!(pool.price_of(Side::A).unwrap(), 364 * SCALE / 110);
}

#[test]
fn test_zero_share_supply_divides_by_zero() {
    let mut pool = funded_pool();
    pool.deposit(1_000, 4_000, &alice()).unwrap();

    // Break share conservation: alice still holds 2000, supply says 0
    pool.ledger.total_shares = 0;
    let before = pool.snapshot();

    let result = pool.withdraw(10, &alice());

    assert_eq!(result, Err(LedgerError::DivisionByZero));
    assert_eq!(pool.snapshot(), before);
}

#[test]
fn test_shares_entry_survives_full_exit() {
    let mut pool = funded_pool();
    pool.deposit(100, 400, &alice()).unwrap();
    pool.deposit(50, 200, &bob()).unwrap();
    pool.withdraw(100, &bob()).unwrap();

    assert_eq!(pool.ledger.shares.get(&bob()), Some(&0));
    assert_eq!(pool.ledger.sum_of_shares(), pool.total_shares());
}

#[test]
fn test_admin_handover_event() {
    let mut pool = funded_pool();
    pool.transfer_admin(&admin(), &bob()).unwrap();

    assert_eq!(pool.admin, bob());
    assert_eq!(
        pool.drain_events(),
        vec![PoolEvent::AdminTransferred {
            previous_admin: admin(),
            new_admin: bob(),
        }]
    );
}

#[test]
fn test_snapshot_json_round_trip() {
    let mut pool = funded_pool();
    pool.deposit(100, 400, &alice()).unwrap();
    pool.swap_exact_in(Direction::AToB, 10, 0, &bob()).unwrap();

    let json = serde_json::to_string(&pool.snapshot()).unwrap();
    let restored: PoolSnapshot = serde_json::from_str(&json).unwrap();

    assert_eq!(restored, pool.snapshot());
}

#[test]
fn test_snapshot_round_trip_with_amounts_beyond_u64() {
    let big = u64::MAX as u128 + 10;
    let mut pool = funded_pool();
    pool.bank.mint(&token_a(), &alice(), 4 * big).unwrap();
    pool.bank.mint(&token_b(), &alice(), 4 * big).unwrap();

    pool.deposit(big, 4, &alice()).unwrap();
    let shares = pool.share_balance(&alice());
    pool.withdraw(shares, &alice()).unwrap();

    let json = serde_json::to_string(&pool.snapshot()).unwrap();
    let restored: PoolSnapshot = serde_json::from_str(&json).unwrap();
    assert_eq!(restored, pool.snapshot());

    let events = serde_json::to_value(pool.events()).unwrap();
    assert_eq!(events[0]["amount_a"], big.to_string());
    assert_eq!(events[1]["event"], "liquidity_removed");
}
