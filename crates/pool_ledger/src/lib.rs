//! Constant-product pool ledger
//!
//! A deterministic state machine over two reserves and an LP share
//! registry. Token movements go through an [`AssetTransfer`] collaborator,
//! pausing through a [`PauseGate`]; the books themselves are a [`Ledger`].
//!
//! ```
//! use pool_ledger::{testing::*, Direction};
//!
//! let mut pool = funded_pool();
//! assert_eq!(pool.deposit(100, 400, &alice()).unwrap(), 200);
//! assert_eq!(pool.swap_exact_in(Direction::AToB, 10, 36, &bob()).unwrap(), 36);
//! ```

#![forbid(unsafe_code)]

pub mod address;
pub mod bank;
pub mod error;
pub mod events;
pub mod gate;
pub mod ledger;
pub mod pool;
pub mod shared;
pub mod testing;


pub use address::{Address, AddressParseError, Direction, ParseEnumError, Side};
pub use amm_model::{Quote, SCALE};
pub use bank::{AssetTransfer, InMemoryBank, TransferError};
pub use error::{LedgerError, Result};
pub use events::PoolEvent;
pub use gate::{PauseGate, PauseSwitch};
pub use ledger::{InvariantViolation, Ledger};
pub use pool::{Pool, PoolSnapshot, SettlementMode};
pub use shared::SharedPool;
