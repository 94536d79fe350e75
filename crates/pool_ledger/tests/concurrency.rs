//! Serialised access through SharedPool

use std::thread;

use pool_ledger::testing::*;
use pool_ledger::*;

#[test]
fn test_threads_see_whole_transactions_only() {
    let shared = SharedPool::new(funded_pool());
    shared.with(|pool| pool.deposit(1_000_000, 4_000_000, &alice())).unwrap();
    let k0 = shared.with(|pool| pool.ledger.product()).unwrap();

    let traders = [alice(), bob(), mallory()];
    let handles: Vec<_> = (0..6)
        .map(|t| {
            let shared = shared.clone();
            let trader = traders[t % traders.len()];
            thread::spawn(move || {
                for i in 0..50u128 {
                    let direction = if (t as u128 + i) % 2 == 0 {
                        Direction::AToB
                    } else {
                        Direction::BToA
                    };
                    shared
                        .with(|pool| {
                            let result = pool.swap_exact_in(direction, 100 + i, 0, &trader);
                            assert_eq!(pool.check_invariants(), Ok(()));
                            result
                        })
                        .unwrap();
                }
            })
        })
        .collect();

    for handle in handles {
        handle.join().unwrap();
    }

    shared.with(|pool| {
        assert_eq!(pool.events().len(), 1 + 6 * 50);
        assert!(pool.ledger.product().unwrap() > k0);
        assert_eq!(pool.true_balance(Side::A), pool.reserves().0);
        assert_eq!(pool.true_balance(Side::B), pool.reserves().1);
    });
}

#[test]
fn test_pause_from_another_handle_blocks_traders() {
    let shared = SharedPool::new(funded_pool());
    shared.with(|pool| pool.deposit(1_000, 4_000, &alice())).unwrap();

    let admin_handle = shared.clone();
    thread::spawn(move || admin_handle.with(|pool| pool.pause(&admin())))
        .join()
        .unwrap()
        .unwrap();

    let result = shared.with(|pool| pool.swap_exact_in(Direction::AToB, 10, 0, &bob()));
    assert_eq!(result, Err(LedgerError::Paused));
}

#[test]
fn test_panic_under_lock_keeps_committed_operations_only() {
    let shared = SharedPool::new(funded_pool());
    shared.with(|pool| pool.deposit(1_000, 4_000, &alice())).unwrap();

    let worker = shared.clone();
    let outcome = thread::spawn(move || {
        worker.with(|pool| {
            pool.swap_exact_in(Direction::AToB, 100, 0, &bob()).unwrap();
            let rejected = pool.swap_exact_in(Direction::AToB, 100, u128::MAX, &bob());
            assert!(rejected.is_err());
            panic!("worker gave up");
        })
    })
    .join();
    assert!(outcome.is_err());

    shared.with(|pool| {
        assert_eq!(pool.events().len(), 2);
        assert!(matches!(pool.events().last(), Some(PoolEvent::Swap { .. })));
        assert_eq!(pool.check_invariants(), Ok(()));
        assert_eq!(pool.true_balance(Side::A), pool.reserves().0);
        assert_eq!(pool.true_balance(Side::B), pool.reserves().1);
    });
}
