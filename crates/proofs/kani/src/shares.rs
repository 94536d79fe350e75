//! Kani proofs for share minting and redemption
//!
//! - **S1**: isqrt returns the floor square root
//! - **S2**: A deposit followed by a full redemption never returns more
//! - **S3**: Redeeming the whole supply returns the whole reserves
//! - **S4**: Off-ratio deposits mint the weaker side

use amm_model::{initial_shares, isqrt, proportional_shares, redeem, AmmError};

/// S1: r² <= n < (r + 1)²
#[kani::proof]
#[kani::unwind(70)]
fn s1_isqrt_is_floor_root() {
    let n: u64 = kani::any();
    let r = isqrt(n as u128);
    assert!(r * r <= n as u128);
    assert!((r + 1) * (r + 1) > n as u128);
}

/// S2: round-trip bound for a deposit into an existing pool
#[kani::proof]
fn s2_round_trip_never_profits() {
    let ra: u32 = kani::any();
    let rb: u32 = kani::any();
    let total: u32 = kani::any();
    let a: u32 = kani::any();
    let b: u32 = kani::any();

    kani::assume(ra > 0 && rb > 0 && total > 0);
    kani::assume(a > 0 && b > 0);

    let minted = proportional_shares(a as u128, b as u128, ra as u128, rb as u128, total as u128);
    if let Ok(minted) = minted {
        let new_ra = ra as u128 + a as u128;
        let new_rb = rb as u128 + b as u128;
        let new_total = total as u128 + minted;

        if let Ok((out_a, out_b)) = redeem(minted, new_ra, new_rb, new_total) {
            assert!(out_a <= a as u128, "S2: must not redeem more A than deposited");
            assert!(out_b <= b as u128, "S2: must not redeem more B than deposited");
        }
    }
}

/// S3: the last provider takes everything
#[kani::proof]
fn s3_full_supply_redeems_full_reserves() {
    let ra: u64 = kani::any();
    let rb: u64 = kani::any();
    let total: u64 = kani::any();

    kani::assume(total > 0);

    let result = redeem(total as u128, ra as u128, rb as u128, total as u128);
    assert_eq!(result, Ok((ra as u128, rb as u128)));
}

/// S4: minted shares never exceed either side's ratio
#[kani::proof]
fn s4_weaker_side_decides() {
    let ra: u32 = kani::any();
    let rb: u32 = kani::any();
    let total: u32 = kani::any();
    let a: u32 = kani::any();
    let b: u32 = kani::any();

    kani::assume(ra > 0 && rb > 0);
    kani::assume(a > 0 && b > 0);

    let minted = proportional_shares(a as u128, b as u128, ra as u128, rb as u128, total as u128);
    if let Ok(minted) = minted {
        assert!(minted * ra as u128 <= a as u128 * total as u128);
        assert!(minted * rb as u128 <= b as u128 * total as u128);
    }
}

/// Zero supply is a defined failure, not a panic
#[kani::proof]
fn s5_zero_supply_is_division_by_zero() {
    let shares: u64 = kani::any();
    let ra: u64 = kani::any();
    let rb: u64 = kani::any();

    assert_eq!(
        redeem(shares as u128, ra as u128, rb as u128, 0),
        Err(AmmError::DivisionByZero)
    );
}

/// First deposit with non-zero sides always mints at least one share
#[kani::proof]
#[kani::unwind(70)]
fn s6_first_deposit_mints() {
    let a: u32 = kani::any();
    let b: u32 = kani::any();

    kani::assume(a > 0 && b > 0);

    let minted = initial_shares(a as u128, b as u128);
    assert!(matches!(minted, Ok(s) if s >= 1));
}
