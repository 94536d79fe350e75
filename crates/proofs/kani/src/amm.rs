//! Kani proofs for the exact-in swap quote
//!
//! - **A1: k Strictly Increases** - the fee makes x·y grow on every trade
//! - **A2: Reserves Stay Positive** - a trade never empties the output side
//! - **A3: No Panic** - large reserves return `Overflow`, never abort
//! - **A4: Deterministic** - same inputs always produce same outputs
//! - **A5: Floor Bias** - the trader never receives more than the raw output
//! - **A6: Monotone in Size** - a larger input never pays out less

use amm_model::{quote_exact_in, spot_price, AmmError, FEE_DENOMINATOR, FEE_NUMERATOR};

/// A1: reserve_in' · reserve_out' > reserve_in · reserve_out
#[kani::proof]
#[kani::unwind(70)]
fn a1_k_strictly_increases() {
    let rin: u64 = kani::any();
    let rout: u64 = kani::any();
    let dx: u64 = kani::any();

    kani::assume(rin > 0 && rin < 1_000_000);
    kani::assume(rout > 0 && rout < 1_000_000);
    kani::assume(dx > 0 && dx < 1_000_000);

    if let Ok(q) = quote_exact_in(rin as u128, rout as u128, dx as u128) {
        let k1 = q.new_reserve_in * q.new_reserve_out;
        assert!(k1 > q.k, "A1: k must strictly increase: k0={}, k1={}", q.k, k1);
    }
}

/// A2: the output reserve stays strictly positive
#[kani::proof]
#[kani::unwind(70)]
fn a2_output_reserve_stays_positive() {
    let rin: u64 = kani::any();
    let rout: u64 = kani::any();
    let dx: u64 = kani::any();

    kani::assume(rin > 0);
    kani::assume(rout > 0);
    kani::assume(dx > 0);

    if let Ok(q) = quote_exact_in(rin as u128, rout as u128, dx as u128) {
        assert!(q.new_reserve_out > 0, "A2: output reserve must remain positive");
        assert!(q.amount_out < rout as u128);
    }
}

/// A3: overflow is reported, not panicked on
#[kani::proof]
#[kani::unwind(70)]
fn a3_no_panic_on_large_reserves() {
    let rin: u128 = kani::any();
    let rout: u128 = kani::any();
    let dx: u128 = kani::any();

    kani::assume(rin > 0 && rout > 0 && dx > 0);

    match quote_exact_in(rin, rout, dx) {
        Ok(q) => assert!(q.amount_out <= q.raw_out),
        Err(e) => assert!(e == AmmError::Overflow),
    }
}

/// A4: Determinism
#[kani::proof]
#[kani::unwind(70)]
fn a4_determinism() {
    let rin: u64 = kani::any();
    let rout: u64 = kani::any();
    let dx: u64 = kani::any();

    let r1 = quote_exact_in(rin as u128, rout as u128, dx as u128);
    let r2 = quote_exact_in(rin as u128, rout as u128, dx as u128);

    assert_eq!(r1, r2, "A4: quote_exact_in must be deterministic");
}

/// A5: amount_out is exactly floor(raw_out · 997 / 1000)
#[kani::proof]
#[kani::unwind(70)]
fn a5_fee_is_floored() {
    let rin: u64 = kani::any();
    let rout: u64 = kani::any();
    let dx: u64 = kani::any();

    kani::assume(rin > 0 && rout > 0 && dx > 0);

    if let Ok(q) = quote_exact_in(rin as u128, rout as u128, dx as u128) {
        assert!(q.amount_out * FEE_DENOMINATOR <= q.raw_out * FEE_NUMERATOR);
        assert!((q.amount_out + 1) * FEE_DENOMINATOR > q.raw_out * FEE_NUMERATOR);
        if q.raw_out > 0 {
            assert!(q.amount_out < q.raw_out, "A5: fee must withhold at least one unit");
        }
    }
}

/// A6: bigger input, no smaller output
#[kani::proof]
#[kani::unwind(70)]
fn a6_output_monotone_in_input() {
    let rin: u32 = kani::any();
    let rout: u32 = kani::any();
    let small: u32 = kani::any();
    let large: u32 = kani::any();

    kani::assume(rin > 0 && rout > 0);
    kani::assume(small > 0 && large > small);

    let a = quote_exact_in(rin as u128, rout as u128, small as u128);
    let b = quote_exact_in(rin as u128, rout as u128, large as u128);

    if let (Ok(a), Ok(b)) = (a, b) {
        assert!(b.amount_out >= a.amount_out, "A6: output must be monotone in input");
    }
}

/// Spot prices of both sides multiply to at most SCALE²
#[kani::proof]
fn a7_spot_prices_reciprocal_bound() {
    let ra: u32 = kani::any();
    let rb: u32 = kani::any();

    kani::assume(ra > 0 && rb > 0);

    let pa = spot_price(rb as u128, ra as u128);
    let pb = spot_price(ra as u128, rb as u128);

    if let (Ok(pa), Ok(pb)) = (pa, pb) {
        let scale = amm_model::SCALE;
        assert!(pa / scale * (pb / scale) <= 1);
    }
}
