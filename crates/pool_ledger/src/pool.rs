//! Pool Ledger state machine
//!
//! Every mutating operation is one transaction: the ledger and the bank are
//! checkpointed, the operation runs, and on any error both are restored
//! before the error is returned. Events are only appended on success.
//!
//! In [`SettlementMode::Audited`] the operations keep the orderings and
//! defects of the audited contract:
//! - swaps pull the input before pricing the output,
//! - withdrawals update the books before paying out,
//! - `privileged_withdraw` has no access control and leaves the reserves
//!   untouched, so later swaps price against stale reserves.
//!
//! [`SettlementMode::Remediated`] is the hardened alternative.

use amm_model::Quote;
use log::{debug, info, warn};
use serde::{Deserialize, Serialize};

use crate::{
    Address, AssetTransfer, Direction, InMemoryBank, InvariantViolation, Ledger, LedgerError,
    PauseGate, PauseSwitch, PoolEvent, Result, Side,
};

/// Which rendition of the settlement rules the pool runs
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SettlementMode {
    /// Faithful reproduction, hazards included
    #[default]
    Audited,
    /// Slippage checked before the input is pulled; privileged withdrawal
    /// restricted to the admin and reflected in the reserves
    Remediated,
}

#[derive(Debug, Clone)]
pub struct Pool<B = InMemoryBank, G = PauseSwitch> {
    pub asset_a: Address,
    pub asset_b: Address,
    /// Account that holds the pool's tokens in the bank
    pub address: Address,
    pub admin: Address,
    pub mode: SettlementMode,
    pub ledger: Ledger,
    pub bank: B,
    pub gate: G,
    pub(crate) events: Vec<PoolEvent>,
}

/// Full serialisable state of a pool
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PoolSnapshot<B = InMemoryBank, G = PauseSwitch> {
    pub asset_a: Address,
    pub asset_b: Address,
    pub address: Address,
    pub admin: Address,
    pub mode: SettlementMode,
    pub ledger: Ledger,
    pub bank: B,
    pub gate: G,
    pub events: Vec<PoolEvent>,
}

// ============================================================================
// Construction and Queries
// ============================================================================

impl<B, G> Pool<B, G>
where
    B: AssetTransfer + Clone,
    G: PauseGate,
{
    /// Create an empty pool for the pair (asset_a, asset_b)
    ///
    /// Fails with `InvalidAddress` for a null admin, pool or asset, or when
    /// both assets are the same.
    pub fn new(
        asset_a: Address,
        asset_b: Address,
        address: Address,
        admin: Address,
        bank: B,
        gate: G,
    ) -> Result<Self> {
        let any_null = [asset_a, asset_b, address, admin].iter().any(Address::is_null);
        if any_null || asset_a == asset_b {
            return Err(LedgerError::InvalidAddress);
        }

        Ok(Self {
            asset_a,
            asset_b,
            address,
            admin,
            mode: SettlementMode::default(),
            ledger: Ledger::default(),
            bank,
            gate,
            events: Vec::new(),
        })
    }

    pub fn with_mode(mut self, mode: SettlementMode) -> Self {
        self.mode = mode;
        self
    }

    pub fn asset(&self, side: Side) -> Address {
        match side {
            Side::A => self.asset_a,
            Side::B => self.asset_b,
        }
    }

    /// (reserve_a, reserve_b) as recorded in the books
    pub fn reserves(&self) -> (u128, u128) {
        (self.ledger.reserve_a, self.ledger.reserve_b)
    }

    pub fn total_shares(&self) -> u128 {
        self.ledger.total_shares
    }

    pub fn share_balance(&self, provider: &Address) -> u128 {
        self.ledger.share_balance(provider)
    }

    /// Tokens the bank actually credits to the pool, which drifts from the
    /// recorded reserve after an audited privileged withdrawal
    pub fn true_balance(&self, side: Side) -> u128 {
        self.bank.balance_of(&self.asset(side), &self.address)
    }

    /// Admin capability check
    pub fn is_admin(&self, caller: &Address) -> bool {
        *caller == self.admin
    }

    pub fn is_paused(&self) -> bool {
        self.gate.is_paused()
    }

    pub fn events(&self) -> &[PoolEvent] {
        &self.events
    }

    pub fn drain_events(&mut self) -> Vec<PoolEvent> {
        std::mem::take(&mut self.events)
    }

    pub fn check_invariants(&self) -> core::result::Result<(), InvariantViolation> {
        self.ledger.check_invariants()
    }

    /// Preview an exact-in swap against the recorded reserves
    pub fn quote(&self, direction: Direction, amount_in: u128) -> Result<Quote> {
        let (reserve_in, reserve_out) = self.ledger.reserves_for(direction);
        Ok(amm_model::quote_exact_in(reserve_in, reserve_out, amount_in)?)
    }

    /// Spot price of one unit of `side`, in units of the other side, scaled by 1e18
    pub fn price_of(&self, side: Side) -> Result<u128> {
        let (numerator, denominator) = match side {
            Side::A => (self.ledger.reserve_b, self.ledger.reserve_a),
            Side::B => (self.ledger.reserve_a, self.ledger.reserve_b),
        };
        Ok(amm_model::spot_price(numerator, denominator)?)
    }
}

// ============================================================================
// Transaction Plumbing
// ============================================================================

impl<B, G> Pool<B, G>
where
    B: AssetTransfer + Clone,
    G: PauseGate,
{
    fn ensure_live(&self) -> Result<()> {
        if self.gate.is_paused() {
            return Err(LedgerError::Paused);
        }
        Ok(())
    }

    /// Run `op` all-or-nothing and emit its event on success
    fn transact<T>(
        &mut self,
        operation: &'static str,
        op: impl FnOnce(&mut Self) -> Result<(T, PoolEvent)>,
    ) -> Result<T> {
        let ledger = self.ledger.clone();
        let bank = self.bank.clone();

        match op(self) {
            Ok((value, event)) => {
                debug!("{operation}: {event:?}");
                self.events.push(event);
                Ok(value)
            }
            Err(err) => {
                self.ledger = ledger;
                self.bank = bank;
                warn!("{operation} rolled back: {err}");
                Err(err)
            }
        }
    }

    /// Pull `amount` of `side` from `owner` into the pool
    fn pull(&mut self, side: Side, owner: &Address, amount: u128) -> Result<()> {
        let asset = self.asset(side);
        self.bank
            .transfer_from(&asset, &self.address, owner, &self.address, amount)?;
        Ok(())
    }

    /// Pay `amount` of `side` from the pool to `destination`
    fn pay(&mut self, side: Side, destination: &Address, amount: u128) -> Result<()> {
        let asset = self.asset(side);
        self.bank.transfer(&asset, &self.address, destination, amount)?;
        Ok(())
    }
}

// ============================================================================
// Liquidity
// ============================================================================

impl<B, G> Pool<B, G>
where
    B: AssetTransfer + Clone,
    G: PauseGate,
{
    /// Deposit both assets and mint LP shares
    ///
    /// The first deposit mints `floor(sqrt(a·b))`. Later deposits mint the
    /// smaller of the two per-side ratios while still taking the full
    /// amounts, so an off-ratio depositor loses the excess to the pool.
    pub fn deposit(&mut self, amount_a: u128, amount_b: u128, provider: &Address) -> Result<u128> {
        self.ensure_live()?;
        if amount_a == 0 || amount_b == 0 {
            return Err(LedgerError::InvalidAmount);
        }
        let provider = *provider;

        self.transact("deposit", |pool| {
            pool.pull(Side::A, &provider, amount_a)?;
            pool.pull(Side::B, &provider, amount_b)?;

            let ledger = &mut pool.ledger;
            let minted = if ledger.total_shares == 0 {
                amm_model::initial_shares(amount_a, amount_b)?
            } else {
                amm_model::proportional_shares(
                    amount_a,
                    amount_b,
                    ledger.reserve_a,
                    ledger.reserve_b,
                    ledger.total_shares,
                )?
            };

            ledger.reserve_a = ledger.reserve_a.checked_add(amount_a).ok_or(LedgerError::Overflow)?;
            ledger.reserve_b = ledger.reserve_b.checked_add(amount_b).ok_or(LedgerError::Overflow)?;
            ledger.total_shares = ledger
                .total_shares
                .checked_add(minted)
                .ok_or(LedgerError::Overflow)?;
            let balance = ledger.shares.entry(provider).or_insert(0);
            *balance = balance.checked_add(minted).ok_or(LedgerError::Overflow)?;

            let event = PoolEvent::LiquidityAdded {
                provider,
                amount_a,
                amount_b,
                shares_minted: minted,
            };
            Ok((minted, event))
        })
    }

    /// Burn `share_amount` LP shares for a proportional cut of both reserves
    ///
    /// Books are updated before the payouts. A zero share supply is not
    /// guarded and surfaces as `DivisionByZero`.
    pub fn withdraw(&mut self, share_amount: u128, provider: &Address) -> Result<(u128, u128)> {
        self.ensure_live()?;
        if share_amount == 0 {
            return Err(LedgerError::InvalidAmount);
        }
        let available = self.ledger.share_balance(provider);
        if available < share_amount {
            return Err(LedgerError::InsufficientShares {
                requested: share_amount,
                available,
            });
        }
        let provider = *provider;

        self.transact("withdraw", |pool| {
            let ledger = &mut pool.ledger;
            let (amount_a, amount_b) = amm_model::redeem(
                share_amount,
                ledger.reserve_a,
                ledger.reserve_b,
                ledger.total_shares,
            )?;

            ledger.shares.insert(provider, available - share_amount);
            ledger.total_shares = ledger.total_shares.checked_sub(share_amount).ok_or(
                LedgerError::InsufficientShares {
                    requested: share_amount,
                    available: ledger.total_shares,
                },
            )?;
            ledger.reserve_a = ledger
                .reserve_a
                .checked_sub(amount_a)
                .ok_or(LedgerError::InsufficientLiquidity)?;
            ledger.reserve_b = ledger
                .reserve_b
                .checked_sub(amount_b)
                .ok_or(LedgerError::InsufficientLiquidity)?;

            pool.pay(Side::A, &provider, amount_a)?;
            pool.pay(Side::B, &provider, amount_b)?;

            let event = PoolEvent::LiquidityRemoved {
                provider,
                shares_burned: share_amount,
                amount_a,
                amount_b,
            };
            Ok(((amount_a, amount_b), event))
        })
    }
}

// ============================================================================
// Swaps
// ============================================================================

impl<B, G> Pool<B, G>
where
    B: AssetTransfer + Clone,
    G: PauseGate,
{
    /// Swap exactly `amount_in` of the input side for at least `min_amount_out`
    ///
    /// # Process (audited)
    /// 1. Pull the input from the trader
    /// 2. Price the output against the reserves as recorded before the input
    /// 3. Reject if below `min_amount_out` (the pull is rolled back)
    /// 4. Update both reserves
    /// 5. Pay the output
    ///
    /// The remediated mode swaps steps 1 and 2-3.
    pub fn swap_exact_in(
        &mut self,
        direction: Direction,
        amount_in: u128,
        min_amount_out: u128,
        trader: &Address,
    ) -> Result<u128> {
        self.ensure_live()?;
        if amount_in == 0 {
            return Err(LedgerError::InvalidAmount);
        }
        if !self.ledger.is_initialized() {
            return Err(LedgerError::InsufficientLiquidity);
        }
        let trader = *trader;
        let pull_first = self.mode == SettlementMode::Audited;

        self.transact("swap", |pool| {
            if pull_first {
                pool.pull(direction.input(), &trader, amount_in)?;
            }

            let quote = pool.quote(direction, amount_in)?;
            if quote.amount_out < min_amount_out {
                return Err(LedgerError::SlippageExceeded {
                    amount_out: quote.amount_out,
                    min_amount_out,
                });
            }

            if !pull_first {
                pool.pull(direction.input(), &trader, amount_in)?;
            }

            *pool.ledger.reserve_mut(direction.input()) = quote.new_reserve_in;
            *pool.ledger.reserve_mut(direction.output()) = quote.new_reserve_out;
            pool.pay(direction.output(), &trader, quote.amount_out)?;

            let event = PoolEvent::Swap {
                trader,
                direction,
                amount_in,
                amount_out: quote.amount_out,
            };
            Ok((quote.amount_out, event))
        })
    }
}

// ============================================================================
// Administration
// ============================================================================

impl<B, G> Pool<B, G>
where
    B: AssetTransfer + Clone,
    G: PauseGate,
{
    pub fn transfer_admin(&mut self, caller: &Address, new_admin: &Address) -> Result<()> {
        self.ensure_live()?;
        if !self.is_admin(caller) {
            return Err(LedgerError::Unauthorized);
        }
        if new_admin.is_null() {
            return Err(LedgerError::InvalidAddress);
        }
        let new_admin = *new_admin;

        self.transact("transfer_admin", |pool| {
            let previous_admin = pool.admin;
            pool.admin = new_admin;
            info!("admin transferred from {previous_admin} to {new_admin}");
            Ok(((), PoolEvent::AdminTransferred { previous_admin, new_admin }))
        })
    }

    /// Stop all mutating operations. Admin only.
    pub fn pause(&mut self, caller: &Address) -> Result<()> {
        if !self.is_admin(caller) {
            return Err(LedgerError::Unauthorized);
        }
        if self.gate.is_paused() {
            return Err(LedgerError::Paused);
        }
        let by = *caller;

        self.transact("pause", |pool| {
            pool.gate.set_paused(true);
            info!("pool paused by {by}");
            Ok(((), PoolEvent::Paused { by }))
        })
    }

    /// Lift a pause. Admin only, and callable while paused.
    pub fn resume(&mut self, caller: &Address) -> Result<()> {
        if !self.is_admin(caller) {
            return Err(LedgerError::Unauthorized);
        }
        if !self.gate.is_paused() {
            return Err(LedgerError::NotPaused);
        }
        let by = *caller;

        self.transact("resume", |pool| {
            pool.gate.set_paused(false);
            info!("pool resumed by {by}");
            Ok(((), PoolEvent::Resumed { by }))
        })
    }

    /// Move `amount` of `side` out of the pool to `caller`
    ///
    /// Audited: anyone may call it and the reserves are not decremented.
    /// Remediated: admin only, and the reserve must stay positive.
    pub fn privileged_withdraw(
        &mut self,
        side: Side,
        amount: u128,
        caller: &Address,
    ) -> Result<()> {
        self.ensure_live()?;
        let caller = *caller;
        let audited = self.mode == SettlementMode::Audited;

        self.transact("privileged_withdraw", |pool| {
            if !audited {
                if !pool.is_admin(&caller) {
                    return Err(LedgerError::Unauthorized);
                }
                let remaining = pool
                    .ledger
                    .reserve(side)
                    .checked_sub(amount)
                    .filter(|r| *r > 0)
                    .ok_or(LedgerError::InsufficientLiquidity)?;
                *pool.ledger.reserve_mut(side) = remaining;
            }

            pool.pay(side, &caller, amount)?;

            let asset = pool.asset(side);
            warn!("privileged withdrawal of {amount} {asset} by {caller}");
            Ok(((), PoolEvent::PrivilegedWithdrawal { caller, asset, amount }))
        })
    }
}

// ============================================================================
// Snapshots
// ============================================================================

impl<B: Clone, G: Clone> Pool<B, G> {
    pub fn snapshot(&self) -> PoolSnapshot<B, G> {
        PoolSnapshot {
            asset_a: self.asset_a,
            asset_b: self.asset_b,
            address: self.address,
            admin: self.admin,
            mode: self.mode,
            ledger: self.ledger.clone(),
            bank: self.bank.clone(),
            gate: self.gate.clone(),
            events: self.events.clone(),
        }
    }

    pub fn from_snapshot(snapshot: PoolSnapshot<B, G>) -> Self {
        Self {
            asset_a: snapshot.asset_a,
            asset_b: snapshot.asset_b,
            address: snapshot.address,
            admin: snapshot.admin,
            mode: snapshot.mode,
            ledger: snapshot.ledger,
            bank: snapshot.bank,
            gate: snapshot.gate,
            events: snapshot.events,
        }
    }
}
